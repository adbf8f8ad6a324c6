//! Per-bus dispatch registry
//!
//! Maps a (transfer kind, data type) pair to the subscriptions interested in it. Entries are
//! non-owning: they name the handle whose subscription should receive the transfer. The
//! registry is guarded by the bus lock.
//!
//! Entries live in a vector sorted by key, so a lookup is a binary search and subscriptions
//! sharing a key are visited in registration order. Growth is fallible.

use alloc::vec::Vec;

use crate::core::{DataTypeId, Signature, TransferKind};
use crate::utils::Key;

#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistrationError {
    OutOfMemory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Registration {
    pub kind: TransferKind,
    pub data_type: DataTypeId,
    pub signature: Signature,
    pub handle: Key,
}

impl Registration {
    fn key(&self) -> (TransferKind, DataTypeId) {
        (self.kind, self.data_type)
    }
}

#[derive(Default)]
pub(crate) struct Registry {
    entries: Vec<Registration>,
}

impl Registry {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn register(&mut self, registration: Registration) -> Result<(), RegistrationError> {
        self.entries
            .try_reserve(1)
            .map_err(|_| RegistrationError::OutOfMemory)?;
        let key = registration.key();
        let pos = self.entries.partition_point(|entry| entry.key() <= key);
        self.entries.insert(pos, registration);
        Ok(())
    }

    /// Removes the registration of `handle` under the given key.
    pub fn unregister(&mut self, kind: TransferKind, data_type: DataTypeId, handle: Key) -> bool {
        let range = self.range(kind, data_type);
        let start = range.start;
        match self.entries[range].iter().position(|entry| entry.handle == handle) {
            Some(offset) => {
                self.entries.remove(start + offset);
                true
            }
            None => false,
        }
    }

    /// Registrations matching an inbound transfer, in registration order
    pub fn matching(&self, kind: TransferKind, data_type: DataTypeId) -> &[Registration] {
        &self.entries[self.range(kind, data_type)]
    }

    /// Signature a driver should use to accept a transfer, if anyone is interested in it
    pub fn signature(&self, kind: TransferKind, data_type: DataTypeId) -> Option<Signature> {
        self.matching(kind, data_type)
            .first()
            .map(|entry| entry.signature)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn range(&self, kind: TransferKind, data_type: DataTypeId) -> core::ops::Range<usize> {
        let key = (kind, data_type);
        let start = self.entries.partition_point(|entry| entry.key() < key);
        let end = start + self.entries[start..].partition_point(|entry| entry.key() <= key);
        start..end
    }
}
