//! Scripting-side handle
//!
//! A handle is bound to one bus and one data type. It sends broadcasts and requests through the
//! bus driver and owns at most one subscription. Dropping the handle closes it.

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::broker::Broker;
use crate::config::Config;
use crate::core::{DataTypeId, NodeId, Signature, TransferId, TransferKind};
use crate::lifecycle;
use crate::locks::BusGuard;
use crate::mailbox::Message;
use crate::subscription::Subscription;
use crate::table::HandleSlot;
use crate::transfer::Transfer;
use crate::utils::Key;

pub struct Handle<'a, M: RawMutex> {
    broker: &'a Broker<'a, M>,
    key: Option<Key>,
    bus: usize,
    signature: Signature,
    data_type: DataTypeId,
}

impl<'a, M: RawMutex> Handle<'a, M> {
    pub(crate) fn new(
        broker: &'a Broker<'a, M>,
        key: Key,
        bus: usize,
        signature: Signature,
        data_type: DataTypeId,
    ) -> Self {
        Self {
            broker,
            key: Some(key),
            bus,
            signature,
            data_type,
        }
    }

    pub fn bus(&self) -> usize {
        self.bus
    }

    pub fn signature(&self) -> Signature {
        self.signature
    }

    pub fn data_type(&self) -> DataTypeId {
        self.data_type
    }

    pub fn is_closed(&self) -> bool {
        self.key.is_none()
    }

    /// Sends a broadcast transfer. Returns the driver verdict.
    pub fn broadcast(&mut self, payload: &[u8]) -> bool {
        let config = self.broker.config;
        self.with_slot(|guard, key| {
            let slot = unwrap!(guard.table.get_mut(key));
            let transfer = outbound(&config, TransferKind::Broadcast, slot, payload);
            guard.interface.broadcast(transfer)
        })
        .unwrap_or(false)
    }

    /// Sends a request to `target` and subscribes to its response.
    ///
    /// Any previous subscription is destroyed first. If the driver rejects the transfer, the
    /// response subscription stays in place and `false` is returned.
    pub fn request(&mut self, target: NodeId, payload: &[u8]) -> bool {
        let config = self.broker.config;
        self.with_slot(|guard, key| {
            let subscription = Subscription::response(target);
            if !lifecycle::replace(guard.registry, guard.table, key, subscription) {
                return false;
            }
            let slot = unwrap!(guard.table.get_mut(key));
            let transfer = outbound(&config, TransferKind::Request, slot, payload);
            let sent = guard.interface.request(target, transfer);
            if !sent {
                trace!("request to {} rejected by driver", target.into_u8());
            }
            sent
        })
        .unwrap_or(false)
    }

    /// Subscribes to broadcasts of the handle's data type from any node.
    ///
    /// Any previous subscription is destroyed first, with its queued payloads.
    pub fn subscribe(&mut self) -> bool {
        self.with_slot(|guard, key| {
            lifecycle::replace(guard.registry, guard.table, key, Subscription::broadcast())
        })
        .unwrap_or(false)
    }

    /// Takes the oldest received payload.
    ///
    /// A response subscription is destroyed once its payload was taken.
    pub fn check_message(&mut self) -> Option<Message> {
        let key = self.key?;
        let (message, kind) = self.broker.locks.with_table(|table| {
            let subscription = table.subscription_mut(key)?;
            Some((subscription.pop()?, subscription.kind()))
        })?;

        if kind == TransferKind::Response {
            self.destroy();
        }
        Some(message)
    }

    /// Number of payloads waiting in the mailbox
    pub fn pending(&self) -> usize {
        self.key
            .and_then(|key| {
                self.broker
                    .locks
                    .with_table(|table| table.subscription(key).map(|sub| sub.pending()))
            })
            .unwrap_or(0)
    }

    /// Kind of the current subscription, if any
    pub fn subscription(&self) -> Option<TransferKind> {
        let key = self.key?;
        self.broker
            .locks
            .with_table(|table| table.subscription(key).map(|sub| sub.kind()))
    }

    /// Source of the last accepted transfer, or the request target while a response is pending
    pub fn node_id(&self) -> Option<NodeId> {
        let key = self.key?;
        self.broker
            .locks
            .with_table(|table| table.subscription(key).and_then(|sub| sub.node_id()))
    }

    /// Identifier the next outbound transfer will carry
    pub fn transfer_id(&self) -> Option<TransferId> {
        let key = self.key?;
        self.broker
            .locks
            .with_table(|table| table.get(key).map(|slot| slot.transfer_id))
    }

    /// Transport mode of the last accepted inbound transfer
    pub fn canfd(&self) -> bool {
        self.key
            .and_then(|key| {
                self.broker
                    .locks
                    .with_table(|table| table.get(key).map(|slot| slot.canfd))
            })
            .unwrap_or(false)
    }

    /// Selects the transport mode of outbound transfers.
    ///
    /// The next accepted inbound transfer overrides it. Returns `false` on a closed handle.
    pub fn set_canfd(&mut self, canfd: bool) -> bool {
        self.with_slot(|guard, key| {
            unwrap!(guard.table.get_mut(key)).canfd = canfd;
        })
        .is_some()
    }

    /// Destroys the current subscription, if any. The handle stays usable.
    pub fn destroy(&mut self) -> bool {
        self.with_slot(|guard, key| lifecycle::destroy(guard.registry, guard.table, key))
            .unwrap_or(false)
    }

    /// Destroys the subscription and releases the handle slot.
    ///
    /// Every later operation fails. Closing twice is a no-op.
    pub fn close(&mut self) {
        let Some(key) = self.key.take() else {
            return;
        };
        let released = self.broker.locks.with_bus(self.bus, |guard| {
            lifecycle::destroy(guard.registry, guard.table, key);
            guard.table.remove(key)
        });
        debug_assert!(matches!(released, Some(Some(_))));
        debug!(
            "closed handle for {} on bus {}",
            self.data_type.into_u16(),
            self.bus
        );
    }

    fn with_slot<R>(&self, f: impl FnOnce(BusGuard<'_, 'a>, Key) -> R) -> Option<R> {
        let key = self.key?;
        self.broker.locks.with_bus(self.bus, |guard| f(guard, key))
    }
}

impl<M: RawMutex> Drop for Handle<'_, M> {
    fn drop(&mut self) {
        self.close();
    }
}

fn outbound<'t>(
    config: &Config,
    kind: TransferKind,
    slot: &'t mut HandleSlot,
    payload: &'t [u8],
) -> Transfer<'t> {
    Transfer {
        kind,
        signature: slot.signature,
        data_type: slot.data_type,
        transfer_id: &mut slot.transfer_id,
        priority: config.priority,
        payload,
        iface_mask: config.iface_mask,
        canfd: slot.canfd,
        timeout: config.timeout,
    }
}
