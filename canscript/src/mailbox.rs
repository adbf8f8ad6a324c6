//! Bounded FIFO of received payloads
//!
//! Each subscription owns one mailbox. The bus-processing context appends, the scripting
//! context drains, both under the handle lock. When the mailbox is full, new payloads are
//! dropped; queued ones are never overwritten.

use alloc::vec::Vec;
use heapless::Deque;

use crate::config::MAX_PAYLOADS;
use crate::core::NodeId;

/// A received payload together with its sender
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub payload: Vec<u8>,
    pub source: NodeId,
}

impl Message {
    /// Copies the payload into a new allocation.
    ///
    /// Returns `None` if the allocation failed.
    pub(crate) fn try_copy(payload: &[u8], source: NodeId) -> Option<Self> {
        let mut buffer = Vec::new();
        buffer.try_reserve_exact(payload.len()).ok()?;
        buffer.extend_from_slice(payload);
        Some(Self {
            payload: buffer,
            source,
        })
    }
}

#[derive(Default)]
pub(crate) struct Mailbox {
    queue: Deque<Message, MAX_PAYLOADS>,
}

impl Mailbox {
    pub fn new() -> Self {
        Self {
            queue: Deque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_full(&self) -> bool {
        self.queue.is_full()
    }

    /// Appends to the tail. Hands the message back if the mailbox is full.
    pub fn push(&mut self, message: Message) -> Result<(), Message> {
        self.queue.push_back(message)
    }

    /// Removes the oldest message.
    pub fn pop(&mut self) -> Option<Message> {
        self.queue.pop_front()
    }
}
