//! Broker shared by the scripting and bus-processing contexts
//!
//! ## Examples
//!
//! ```
//! use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex as Mutex;
//! use canscript::broker::Broker;
//! use canscript::config::Config;
//! use canscript::core::{DataTypeId, NodeId, Signature};
//! use canscript::interface::Interface;
//! use canscript::transfer::Transfer;
//!
//! struct Driver;
//!
//! impl Interface for Driver {
//!     fn broadcast(&self, mut transfer: Transfer<'_>) -> bool {
//!         // Queue the frames here
//!         transfer.advance_transfer_id();
//!         true
//!     }
//!
//!     fn request(&self, _destination: NodeId, mut transfer: Transfer<'_>) -> bool {
//!         transfer.advance_transfer_id();
//!         true
//!     }
//! }
//!
//! static DRIVER: Driver = Driver;
//!
//! let mut broker = Broker::<Mutex>::new(Config::default());
//! broker.attach(0, &DRIVER).unwrap();
//!
//! let mut handle = broker
//!     .handle(0, Signature::new(0x0b2a812620a11d40), DataTypeId::new(1030))
//!     .unwrap();
//! assert!(handle.broadcast(&[0x00, 0x3c]));
//! ```
//! The driver pushes inbound transfers through an [`RxPort`] obtained from the same broker,
//! typically from a higher-priority context. The broker is `Sync` when the mutex is.

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::config::{Config, MAX_BUSES};
use crate::core::{DataTypeId, Signature};
use crate::dispatch::RxPort;
use crate::handle::Handle;
use crate::interface::Interface;
use crate::lifecycle;
use crate::locks::Locks;
use crate::stats::Stats;
use crate::table::HandleSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AttachError {
    InvalidBus,
    AlreadyAttached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandleError {
    /// No driver is attached at the requested bus index
    InvalidBus,
    NoHandleSlotLeft,
}

pub struct Broker<'d, M: RawMutex> {
    pub(crate) locks: Locks<'d, M>,
    pub(crate) config: Config,
}

impl<'d, M: RawMutex> Broker<'d, M> {
    pub fn new(config: Config) -> Self {
        Self {
            locks: Locks::new(config.handle_slot_count),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Installs the driver of a bus.
    ///
    /// Drivers are attached once, before any handle is created.
    pub fn attach(
        &mut self,
        bus: usize,
        interface: &'d (dyn Interface + Sync),
    ) -> Result<(), AttachError> {
        if bus >= MAX_BUSES {
            return Err(AttachError::InvalidBus);
        }
        if !self.locks.attach(bus, interface) {
            return Err(AttachError::AlreadyAttached);
        }
        debug!("attached driver to bus {}", bus);
        Ok(())
    }

    pub fn is_attached(&self, bus: usize) -> bool {
        self.locks.is_attached(bus)
    }

    /// Opens a handle bound to a bus, a data type and its signature.
    pub fn handle(
        &self,
        bus: usize,
        signature: Signature,
        data_type: DataTypeId,
    ) -> Result<Handle<'_, M>, HandleError> {
        if !self.locks.is_attached(bus) {
            return Err(HandleError::InvalidBus);
        }
        let slot = HandleSlot::new(bus, signature, data_type);
        let key = self
            .locks
            .with_table(|table| table.insert(slot))
            .ok_or(HandleError::NoHandleSlotLeft)?;

        debug!("opened handle for {} on bus {}", data_type.into_u16(), bus);
        Ok(Handle::new(self, key, bus, signature, data_type))
    }

    /// Inbound port of a bus, for its driver
    pub fn rx_port(&self, bus: usize) -> Option<RxPort<'_, M>> {
        self.locks.is_attached(bus).then(|| RxPort::new(self, bus))
    }

    /// Destroys every live subscription.
    ///
    /// Inbound dispatch on every bus is frozen for the duration of the teardown, so no
    /// transfer is delivered to a subscription being destroyed. Handles stay open.
    pub fn destroy_all(&self) {
        let destroyed = self.locks.with_all(
            lifecycle::destroy_every,
            |bus, registry, destroyed| {
                debug_assert_eq!(registry.len(), destroyed[bus]);
                registry.clear();
            },
        );
        info!(
            "destroyed {} subscriptions",
            destroyed.iter().sum::<usize>()
        );
    }

    /// Inbound delivery counters
    pub fn stats(&self) -> Stats {
        self.locks.with_table(|table| table.stats)
    }

    /// Number of open handles
    pub fn handle_count(&self) -> usize {
        self.locks.with_table(|table| table.len())
    }

    /// Number of live subscriptions across all buses
    pub fn subscription_count(&self) -> usize {
        self.locks.with_table(|table| table.cleanup_len())
    }

    /// Number of subscriptions registered for dispatch on a bus
    pub fn registration_count(&self, bus: usize) -> usize {
        self.locks
            .with_registry(bus, |registry| registry.len())
            .unwrap_or(0)
    }
}
