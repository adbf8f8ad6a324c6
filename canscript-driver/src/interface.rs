//! Outbound channel from the broker to the driver

use canscript_core::NodeId;

use crate::transfer::Transfer;

/// DroneCAN interface of a single bus driver
///
/// Both methods are called from the scripting context while the broker holds its locks, so
/// they must not block: queue the transfer and return. Return `false` if the transfer could
/// not be queued (e.g. the TX queue is full).
///
/// On success the driver must advance `transfer.transfer_id` exactly once, see
/// [`Transfer::advance_transfer_id`].
pub trait Interface {
    /// Queues a broadcast transfer.
    fn broadcast(&self, transfer: Transfer<'_>) -> bool;

    /// Queues a request transfer addressed to `destination`.
    fn request(&self, destination: NodeId, transfer: Transfer<'_>) -> bool;
}

impl<T: Interface + ?Sized> Interface for &T {
    fn broadcast(&self, transfer: Transfer<'_>) -> bool {
        (**self).broadcast(transfer)
    }

    fn request(&self, destination: NodeId, transfer: Transfer<'_>) -> bool {
        (**self).request(destination, transfer)
    }
}
