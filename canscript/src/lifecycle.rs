//! Subscription lifetime management
//!
//! A subscription is owned by its handle slot, registered in the registry of the handle's bus
//! and linked into the global cleanup list. The cleanup list threads through the handle
//! table by key, so bulk teardown can reach every live subscription without scanning slots.
//!
//! Creating or destroying a subscription touches both the registry and the table. The
//! functions here take both by `&mut`, which only the lock helper can provide, and only with
//! the bus lock taken first.

use crate::config::MAX_BUSES;
use crate::registry::{Registration, Registry};
use crate::subscription::{CleanupLink, Subscription};
use crate::table::HandleTable;
use crate::utils::Key;

impl HandleTable {
    /// Installs a subscription into an empty handle slot and links it at the cleanup list head.
    fn attach_subscription(&mut self, key: Key, mut subscription: Subscription) {
        debug_assert!(self.subscription(key).is_none());

        subscription.cleanup = CleanupLink {
            prev: None,
            next: self.cleanup_head,
        };
        if let Some(head) = self.cleanup_head {
            let head = unwrap!(self.subscription_mut(head));
            head.cleanup.prev = Some(key);
        }
        let slot = unwrap!(self.get_mut(key));
        slot.subscription = Some(subscription);
        self.cleanup_head = Some(key);
    }

    /// Takes the subscription out of its handle slot and unlinks it from the cleanup list.
    fn detach_subscription(&mut self, key: Key) -> Option<Subscription> {
        let subscription = self.get_mut(key)?.subscription.take()?;
        let link = subscription.cleanup;

        match link.prev {
            Some(prev) => {
                let prev = unwrap!(self.subscription_mut(prev));
                prev.cleanup.next = link.next;
            }
            None => self.cleanup_head = link.next,
        }
        if let Some(next) = link.next {
            let next = unwrap!(self.subscription_mut(next));
            next.cleanup.prev = link.prev;
        }

        Some(subscription)
    }

    /// Number of live subscriptions
    pub fn cleanup_len(&self) -> usize {
        let mut count = 0;
        let mut cursor = self.cleanup_head;
        while let Some(key) = cursor {
            count += 1;
            cursor = unwrap!(self.subscription(key)).cleanup.next;
        }
        count
    }
}

/// Destroys the subscription of a handle, if any.
///
/// The queued payloads are dropped together with the subscription.
pub(crate) fn destroy(registry: &mut Registry, table: &mut HandleTable, key: Key) -> bool {
    let Some(subscription) = table.detach_subscription(key) else {
        return false;
    };
    let data_type = unwrap!(table.get(key)).data_type;
    let unregistered = registry.unregister(subscription.kind(), data_type, key);
    debug_assert!(unregistered);

    debug!(
        "destroyed {:?} subscription to {}, {} payloads discarded",
        subscription.kind(),
        data_type.into_u16(),
        subscription.pending()
    );
    true
}

/// Destroys the current subscription of a handle and installs a new one.
///
/// Fails if the handle is gone or the registry could not grow. The handle is left without a
/// subscription in that case.
pub(crate) fn replace(
    registry: &mut Registry,
    table: &mut HandleTable,
    key: Key,
    subscription: Subscription,
) -> bool {
    destroy(registry, table, key);

    let Some(slot) = table.get(key) else {
        return false;
    };
    let registration = Registration {
        kind: subscription.kind(),
        data_type: slot.data_type,
        signature: slot.signature,
        handle: key,
    };
    if registry.register(registration).is_err() {
        warn!(
            "no memory to register subscription to {}",
            registration.data_type.into_u16()
        );
        return false;
    }

    table.attach_subscription(key, subscription);
    true
}

/// Destroys every live subscription by walking the cleanup list.
///
/// Must run with all bus locks held. Registry entries are not touched; the caller clears each
/// registry before releasing its lock. Returns the number of destroyed subscriptions per bus.
pub(crate) fn destroy_every(table: &mut HandleTable) -> [usize; MAX_BUSES] {
    let mut destroyed = [0; MAX_BUSES];
    while let Some(key) = table.cleanup_head {
        unwrap!(table.detach_subscription(key));
        let bus = unwrap!(table.get(key)).bus;
        destroyed[bus] += 1;
    }
    destroyed
}
