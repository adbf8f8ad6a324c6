//! Inbound side of the broker
//!
//! A bus driver delivers reassembled transfers through the [`RxPort`] of its bus, from the
//! bus-processing context. Each transfer is offered to every subscription registered for its
//! kind and data type, in registration order, with the driver lock and the handle lock held
//! for the whole pass. A subscription being destroyed elsewhere is therefore never seen half
//! way.

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::broker::Broker;
use crate::core::{DataTypeId, Signature, TransferKind};
use crate::transfer::RxTransfer;

/// Inbound port of a single bus
pub struct RxPort<'a, M: RawMutex> {
    broker: &'a Broker<'a, M>,
    bus: usize,
}

impl<M: RawMutex> Clone for RxPort<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: RawMutex> Copy for RxPort<'_, M> {}

impl<'a, M: RawMutex> RxPort<'a, M> {
    pub(crate) fn new(broker: &'a Broker<'a, M>, bus: usize) -> Self {
        Self { broker, bus }
    }

    pub fn bus(&self) -> usize {
        self.bus
    }

    /// Signature to validate an inbound transfer with, if any subscription is interested in it
    ///
    /// Drivers call it on the first frame of a transfer to decide whether to reassemble it.
    pub fn accepts(&self, kind: TransferKind, data_type: DataTypeId) -> Option<Signature> {
        self.broker
            .locks
            .with_registry(self.bus, |registry| registry.signature(kind, data_type))
            .flatten()
    }

    /// Delivers an inbound transfer to the matching subscriptions.
    ///
    /// Returns the number of mailboxes the transfer was queued in. Transfers nobody accepts
    /// are dropped silently and counted in [`Broker::stats`].
    pub fn push(&self, transfer: &RxTransfer<'_>) -> usize {
        self.broker
            .locks
            .with_bus(self.bus, |guard| {
                let mut delivered = 0;
                for registration in guard.registry.matching(transfer.kind, transfer.data_type) {
                    let slot = unwrap!(guard.table.get_mut(registration.handle));
                    let current = slot.transfer_id;
                    let subscription = unwrap!(slot.subscription.as_mut());
                    match subscription.accept(transfer, current) {
                        Ok(()) => {
                            slot.canfd = transfer.canfd;
                            guard.table.stats.record_delivery();
                            delivered += 1;
                        }
                        Err(rejection) => {
                            trace!(
                                "dropped {} from {}: {:?}",
                                transfer.data_type.into_u16(),
                                transfer.source.into_u8(),
                                rejection
                            );
                            guard.table.stats.record_rejection(rejection);
                        }
                    }
                }
                delivered
            })
            .unwrap_or(0)
    }
}
