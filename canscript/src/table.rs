//! Handle state shared with the bus-processing context
//!
//! Everything a dispatch needs to know about a handle lives here rather than in the
//! scripting-side [`Handle`](crate::handle::Handle): the transfer identifier slot, the
//! transport flag and the subscription itself. The whole table sits behind the single handle
//! lock.

use crate::core::{DataTypeId, Signature, TransferId};
use crate::stats::Stats;
use crate::subscription::Subscription;
use crate::utils::{Arena, Key};

pub(crate) struct HandleSlot {
    pub bus: usize,
    pub signature: Signature,
    pub data_type: DataTypeId,
    pub transfer_id: TransferId,
    pub canfd: bool,
    pub subscription: Option<Subscription>,
}

impl HandleSlot {
    pub fn new(bus: usize, signature: Signature, data_type: DataTypeId) -> Self {
        Self {
            bus,
            signature,
            data_type,
            transfer_id: TransferId::default(),
            canfd: false,
            subscription: None,
        }
    }
}

pub(crate) struct HandleTable {
    slots: Arena<HandleSlot>,
    pub(crate) cleanup_head: Option<Key>,
    pub(crate) stats: Stats,
}

impl HandleTable {
    pub const fn new(slot_count: usize) -> Self {
        Self {
            slots: Arena::new(slot_count),
            cleanup_head: None,
            stats: Stats::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn insert(&mut self, slot: HandleSlot) -> Option<Key> {
        self.slots.insert(slot).ok()
    }

    /// Releases a handle slot. The subscription must have been destroyed already.
    pub fn remove(&mut self, key: Key) -> Option<HandleSlot> {
        let slot = self.slots.remove(key)?;
        debug_assert!(slot.subscription.is_none());
        Some(slot)
    }

    pub fn get(&self, key: Key) -> Option<&HandleSlot> {
        self.slots.get(key)
    }

    pub fn get_mut(&mut self, key: Key) -> Option<&mut HandleSlot> {
        self.slots.get_mut(key)
    }

    pub fn subscription(&self, key: Key) -> Option<&Subscription> {
        self.slots.get(key)?.subscription.as_ref()
    }

    pub fn subscription_mut(&mut self, key: Key) -> Option<&mut Subscription> {
        self.slots.get_mut(key)?.subscription.as_mut()
    }
}
