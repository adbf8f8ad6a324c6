use crate::core::{IfaceMask, Priority};
use crate::time::Duration;

/// Mailbox capacity of a single subscription
pub const MAX_PAYLOADS: usize = 8;

/// Number of bus driver slots a broker can serve
pub const MAX_BUSES: usize = 3;

/// Number of redundant CAN interfaces per bus
pub const NUM_IFACES: u8 = 2;

/// Broker configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub struct Config {
    /// Priority of outbound transfers
    pub priority: Priority,
    /// Transmission deadline passed to the driver with every outbound transfer
    pub timeout: Duration,
    /// Interfaces outbound transfers are sent on
    pub iface_mask: IfaceMask,
    /// Maximum number of simultaneously open handles
    pub handle_slot_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            priority: Priority::HIGHEST,
            timeout: Duration::from_millis(10),
            iface_mask: IfaceMask::all(NUM_IFACES),
            handle_slot_count: 32,
        }
    }
}
