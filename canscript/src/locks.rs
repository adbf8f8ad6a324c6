//! Two-level locking
//!
//! Every bus has a driver lock guarding its registry. A single handle lock guards the handle
//! table, including every subscription and mailbox. Whenever both are needed, the driver lock
//! is taken first. The handle lock alone may be taken at any time, but never followed by a
//! driver lock. Bulk teardown takes all driver locks in ascending bus order, then the handle
//! lock.
//!
//! The helpers below are the only way to reach the guarded state, so the order cannot be
//! violated by the rest of the crate.

use core::cell::RefCell;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::config::MAX_BUSES;
use crate::interface::Interface;
use crate::registry::Registry;
use crate::table::HandleTable;

pub(crate) struct Bus<'d, M: RawMutex> {
    interface: Option<&'d (dyn Interface + Sync)>,
    registry: Mutex<M, RefCell<Registry>>,
}

impl<M: RawMutex> Bus<'_, M> {
    fn new() -> Self {
        Self {
            interface: None,
            registry: Mutex::new(RefCell::new(Registry::new())),
        }
    }
}

/// State reachable with a driver lock and the handle lock held
pub(crate) struct BusGuard<'a, 'd> {
    pub interface: &'d (dyn Interface + Sync),
    pub registry: &'a mut Registry,
    pub table: &'a mut HandleTable,
}

pub(crate) struct Locks<'d, M: RawMutex> {
    buses: [Bus<'d, M>; MAX_BUSES],
    table: Mutex<M, RefCell<HandleTable>>,
}

impl<'d, M: RawMutex> Locks<'d, M> {
    pub fn new(handle_slot_count: usize) -> Self {
        Self {
            buses: core::array::from_fn(|_| Bus::new()),
            table: Mutex::new(RefCell::new(HandleTable::new(handle_slot_count))),
        }
    }

    /// Installs a bus driver. Returns `false` if the slot is taken.
    pub fn attach(&mut self, bus: usize, interface: &'d (dyn Interface + Sync)) -> bool {
        let slot = &mut self.buses[bus];
        if slot.interface.is_some() {
            return false;
        }
        slot.interface = Some(interface);
        true
    }

    pub fn is_attached(&self, bus: usize) -> bool {
        self.buses
            .get(bus)
            .is_some_and(|slot| slot.interface.is_some())
    }

    /// Runs `f` with the driver lock of `bus` and the handle lock held.
    ///
    /// Returns `None` if no driver is attached to the bus.
    pub fn with_bus<R>(&self, bus: usize, f: impl FnOnce(BusGuard<'_, 'd>) -> R) -> Option<R> {
        let slot = self.buses.get(bus)?;
        let interface = slot.interface?;
        let result = slot.registry.lock(|registry| {
            let mut registry = registry.borrow_mut();
            self.table.lock(|table| {
                let mut table = table.borrow_mut();
                f(BusGuard {
                    interface,
                    registry: &mut registry,
                    table: &mut table,
                })
            })
        });
        Some(result)
    }

    /// Runs `f` with the driver lock of `bus` held.
    pub fn with_registry<R>(&self, bus: usize, f: impl FnOnce(&Registry) -> R) -> Option<R> {
        let slot = self.buses.get(bus)?;
        slot.interface?;
        Some(slot.registry.lock(|registry| f(&registry.borrow())))
    }

    /// Runs `f` with the handle lock held.
    pub fn with_table<R>(&self, f: impl FnOnce(&mut HandleTable) -> R) -> R {
        self.table.lock(|table| f(&mut table.borrow_mut()))
    }

    /// Runs `f` with every driver lock and the handle lock held.
    ///
    /// `on_unlock` is called for each bus, innermost first, right before its driver lock is
    /// released.
    pub fn with_all<R>(
        &self,
        f: impl FnOnce(&mut HandleTable) -> R,
        mut on_unlock: impl FnMut(usize, &mut Registry, &R),
    ) -> R {
        self.lock_from(0, f, &mut on_unlock)
    }

    fn lock_from<R, F, U>(&self, bus: usize, f: F, on_unlock: &mut U) -> R
    where
        F: FnOnce(&mut HandleTable) -> R,
        U: FnMut(usize, &mut Registry, &R),
    {
        match self.buses.get(bus) {
            Some(slot) => slot.registry.lock(|registry| {
                let result = self.lock_from(bus + 1, f, on_unlock);
                on_unlock(bus, &mut registry.borrow_mut(), &result);
                result
            }),
            None => self.with_table(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DataTypeId, NodeId, Signature};
    use crate::table::HandleSlot;
    use crate::transfer::Transfer;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    struct Silent;

    impl Interface for Silent {
        fn broadcast(&self, _transfer: Transfer<'_>) -> bool {
            true
        }

        fn request(&self, _destination: NodeId, _transfer: Transfer<'_>) -> bool {
            true
        }
    }

    static SILENT: Silent = Silent;

    #[test]
    fn test_unattached_bus() {
        let mut locks = Locks::<NoopRawMutex>::new(4);
        assert!(locks.with_bus(0, |_| ()).is_none());
        assert!(locks.with_registry(1, |_| ()).is_none());
        assert!(locks.with_bus(MAX_BUSES, |_| ()).is_none());

        assert!(locks.attach(1, &SILENT));
        assert!(!locks.attach(1, &SILENT));
        assert!(locks.is_attached(1));
        assert!(!locks.is_attached(0));
        assert!(locks.with_bus(1, |_| ()).is_some());
        assert!(locks.with_bus(0, |_| ()).is_none());
    }

    #[test]
    fn test_with_all_visits_every_bus() {
        let mut locks = Locks::<NoopRawMutex>::new(4);
        locks.attach(0, &SILENT);
        locks.attach(2, &SILENT);
        locks.with_table(|table| {
            table.insert(HandleSlot::new(0, Signature::new(1), DataTypeId::new(1)));
        });

        let mut visited = alloc::vec::Vec::new();
        let len = locks.with_all(
            |table| table.len(),
            |bus, registry, len| {
                assert_eq!(registry.len(), 0);
                assert_eq!(*len, 1);
                visited.push(bus);
            },
        );
        assert_eq!(len, 1);
        assert_eq!(visited, [2, 1, 0]);
    }
}
