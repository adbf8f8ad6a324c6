//! Transfer objects exchanged with the driver

use canscript_core::{DataTypeId, IfaceMask, NodeId, Priority, Signature, TransferId, TransferKind};

use crate::time::Duration;

/// Outbound transfer
///
/// The `transfer_id` slot belongs to the sender. A driver must advance it exactly once for
/// every transfer it queues, before returning. The broker relies on this to correlate a later
/// response with the request that caused it.
///
/// A transfer not sent within `timeout` should be dropped by the driver.
#[derive(Debug)]
pub struct Transfer<'a> {
    pub kind: TransferKind,
    pub signature: Signature,
    pub data_type: DataTypeId,
    pub transfer_id: &'a mut TransferId,
    pub priority: Priority,
    pub payload: &'a [u8],
    pub iface_mask: IfaceMask,
    pub canfd: bool,
    pub timeout: Duration,
}

impl Transfer<'_> {
    /// Advances the sender's transfer identifier.
    ///
    /// Helper for drivers: call once after the transfer was queued.
    pub fn advance_transfer_id(&mut self) {
        *self.transfer_id = self.transfer_id.next();
    }
}

/// Inbound transfer, reassembled by the driver
///
/// `payload` is the decoded transfer payload without the tail bytes or CRC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxTransfer<'a> {
    pub kind: TransferKind,
    pub data_type: DataTypeId,
    pub source: NodeId,
    pub transfer_id: TransferId,
    pub priority: Priority,
    pub payload: &'a [u8],
    pub canfd: bool,
}
