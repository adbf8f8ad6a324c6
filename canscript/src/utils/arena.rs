use alloc::vec::Vec;

pub const MAX_CAPACITY: usize = u16::MAX as usize + 1;

/// Stable reference into an [`Arena`]
///
/// The generation tells a reused slot from the one the key was issued for, so a stale key
/// never aliases a newer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Key {
    index: u16,
    generation: u16,
}

enum Slot<T> {
    Occupied { generation: u16, value: T },
    Vacant { generation: u16, next_free: Option<u16> },
}

/// Slot storage with fallible growth up to a fixed capacity
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<u16>,
    len: usize,
    capacity: usize,
}

impl<T> Arena<T> {
    pub const fn new(capacity: usize) -> Self {
        let capacity = if capacity > MAX_CAPACITY {
            MAX_CAPACITY
        } else {
            capacity
        };
        Self {
            slots: Vec::new(),
            free_head: None,
            len: 0,
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Stores the value. Returns it back if the arena is full or the allocation failed.
    pub fn insert(&mut self, value: T) -> Result<Key, T> {
        if let Some(index) = self.free_head {
            let slot = &mut self.slots[usize::from(index)];
            let (generation, next_free) = match *slot {
                Slot::Vacant {
                    generation,
                    next_free,
                } => (generation, next_free),
                Slot::Occupied { .. } => unreachable!(),
            };
            *slot = Slot::Occupied { generation, value };
            self.free_head = next_free;
            self.len += 1;
            return Ok(Key { index, generation });
        }

        if self.slots.len() >= self.capacity || self.slots.try_reserve(1).is_err() {
            return Err(value);
        }
        let index = unwrap!(u16::try_from(self.slots.len()));
        self.slots.push(Slot::Occupied {
            generation: 0,
            value,
        });
        self.len += 1;
        Ok(Key {
            index,
            generation: 0,
        })
    }

    pub fn remove(&mut self, key: Key) -> Option<T> {
        let slot = self.slots.get_mut(usize::from(key.index))?;
        match slot {
            Slot::Occupied { generation, .. } if *generation == key.generation => {}
            _ => return None,
        }

        let vacant = Slot::Vacant {
            generation: key.generation.wrapping_add(1),
            next_free: self.free_head,
        };
        let value = match core::mem::replace(slot, vacant) {
            Slot::Occupied { value, .. } => value,
            Slot::Vacant { .. } => unreachable!(),
        };
        self.free_head = Some(key.index);
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, key: Key) -> Option<&T> {
        match self.slots.get(usize::from(key.index))? {
            Slot::Occupied { generation, value } if *generation == key.generation => Some(value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, key: Key) -> Option<&mut T> {
        match self.slots.get_mut(usize::from(key.index))? {
            Slot::Occupied { generation, value } if *generation == key.generation => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_limit() {
        let mut arena = Arena::new(2);
        let a = arena.insert('a').unwrap();
        let b = arena.insert('b').unwrap();
        assert_eq!(arena.insert('c'), Err('c'));
        assert_eq!(arena.len(), 2);

        assert_eq!(arena.remove(a), Some('a'));
        let c = arena.insert('c').unwrap();
        assert_eq!(arena.get(b), Some(&'b'));
        assert_eq!(arena.get(c), Some(&'c'));
    }

    #[test]
    fn test_stale_key() {
        let mut arena = Arena::new(4);
        let a = arena.insert(1).unwrap();
        assert_eq!(arena.remove(a), Some(1));
        assert_eq!(arena.remove(a), None);

        // The slot is reused under a new generation
        let b = arena.insert(2).unwrap();
        assert_ne!(a, b);
        assert_eq!(arena.get(a), None);
        assert_eq!(arena.get_mut(a), None);
        assert_eq!(arena.get(b), Some(&2));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_free_list_order() {
        let mut arena = Arena::new(3);
        let keys = [0, 1, 2].map(|v| arena.insert(v).unwrap());
        arena.remove(keys[0]);
        arena.remove(keys[2]);

        // Most recently freed slot goes first
        let k = arena.insert(20).unwrap();
        assert_eq!(k.index, keys[2].index);
        let k = arena.insert(10).unwrap();
        assert_eq!(k.index, keys[0].index);
        assert_eq!(arena.insert(30), Err(30));
    }
}
