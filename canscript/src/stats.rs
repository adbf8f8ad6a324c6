use crate::subscription::Rejection;

/// Inbound delivery counters
///
/// Drops are expected on a busy bus and are not reported to scripts. The counters are the
/// only place they surface.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Stats {
    pub delivered: u32,
    pub mailbox_full: u32,
    pub kind_mismatch: u32,
    pub node_mismatch: u32,
    pub transfer_id_mismatch: u32,
    pub out_of_memory: u32,
}

impl Stats {
    pub const fn new() -> Self {
        Self {
            delivered: 0,
            mailbox_full: 0,
            kind_mismatch: 0,
            node_mismatch: 0,
            transfer_id_mismatch: 0,
            out_of_memory: 0,
        }
    }

    /// Total number of dropped transfers
    pub fn dropped(&self) -> u32 {
        self.mailbox_full
            .wrapping_add(self.kind_mismatch)
            .wrapping_add(self.node_mismatch)
            .wrapping_add(self.transfer_id_mismatch)
            .wrapping_add(self.out_of_memory)
    }

    pub(crate) fn record_delivery(&mut self) {
        self.delivered = self.delivered.wrapping_add(1);
    }

    pub(crate) fn record_rejection(&mut self, rejection: Rejection) {
        let counter = match rejection {
            Rejection::MailboxFull => &mut self.mailbox_full,
            Rejection::KindMismatch => &mut self.kind_mismatch,
            Rejection::NodeMismatch => &mut self.node_mismatch,
            Rejection::TransferIdMismatch => &mut self.transfer_id_mismatch,
            Rejection::OutOfMemory => &mut self.out_of_memory,
        };
        *counter = counter.wrapping_add(1);
    }
}
