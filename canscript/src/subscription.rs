//! Registered interest of a handle in inbound transfers

use crate::core::{NodeId, TransferId, TransferKind};
use crate::mailbox::{Mailbox, Message};
use crate::transfer::RxTransfer;
use crate::utils::Key;

/// Reason an inbound transfer was not queued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rejection {
    MailboxFull,
    KindMismatch,
    NodeMismatch,
    TransferIdMismatch,
    OutOfMemory,
}

/// Links of the global cleanup list
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CleanupLink {
    pub prev: Option<Key>,
    pub next: Option<Key>,
}

pub(crate) struct Subscription {
    kind: TransferKind,
    node_id: Option<NodeId>,
    mailbox: Mailbox,
    pub(crate) cleanup: CleanupLink,
}

impl Subscription {
    /// Subscription to broadcasts from any node
    pub fn broadcast() -> Self {
        Self {
            kind: TransferKind::Broadcast,
            node_id: None,
            mailbox: Mailbox::new(),
            cleanup: Default::default(),
        }
    }

    /// Subscription to the response of a request sent to `target`
    pub fn response(target: NodeId) -> Self {
        Self {
            kind: TransferKind::Response,
            node_id: Some(target),
            mailbox: Mailbox::new(),
            cleanup: Default::default(),
        }
    }

    pub fn kind(&self) -> TransferKind {
        self.kind
    }

    /// Source of the last accepted transfer, or the request target
    pub fn node_id(&self) -> Option<NodeId> {
        self.node_id
    }

    pub fn pending(&self) -> usize {
        self.mailbox.len()
    }

    /// Queues an inbound transfer.
    ///
    /// `current` is the owning handle's transfer identifier. The driver advanced it right after
    /// the request was sent, so a matching response carries `current - 1`.
    pub fn accept(
        &mut self,
        transfer: &RxTransfer<'_>,
        current: TransferId,
    ) -> Result<(), Rejection> {
        if self.mailbox.is_full() {
            return Err(Rejection::MailboxFull);
        }

        if self.kind == TransferKind::Response {
            if transfer.kind != TransferKind::Response {
                return Err(Rejection::KindMismatch);
            }
            if self.node_id != Some(transfer.source) {
                return Err(Rejection::NodeMismatch);
            }
            if transfer.transfer_id.next() != current {
                return Err(Rejection::TransferIdMismatch);
            }
        }

        let message = Message::try_copy(transfer.payload, transfer.source)
            .ok_or(Rejection::OutOfMemory)?;
        self.node_id = Some(transfer.source);
        unwrap!(self.mailbox.push(message).ok());
        Ok(())
    }

    pub fn pop(&mut self) -> Option<Message> {
        self.mailbox.pop()
    }
}
