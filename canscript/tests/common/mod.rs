#![allow(dead_code)]

use canscript::broker::Broker;
use canscript::config::Config;
use canscript::core::{DataTypeId, NodeId, Priority, Signature, TransferId, TransferKind};
use canscript::interface::Interface;
use canscript::transfer::{RxTransfer, Transfer};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use std::boxed::Box;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::vec::Vec;

pub const SIGNATURE: Signature = Signature::new(0x0b2a_8126_20a1_1d40);
pub const DATA_TYPE: DataTypeId = DataTypeId::new(1030);

pub type TestBroker = Broker<'static, CriticalSectionRawMutex>;

/// Outbound transfer as seen by the driver
#[derive(Debug, Clone, PartialEq)]
pub struct Sent {
    pub kind: TransferKind,
    pub destination: Option<NodeId>,
    pub signature: Signature,
    pub data_type: DataTypeId,
    pub transfer_id: TransferId,
    pub priority: Priority,
    pub payload: Vec<u8>,
    pub iface_mask: u8,
    pub canfd: bool,
    pub timeout_ms: u64,
}

/// Driver that records every transfer and advances the transfer identifier on success
pub struct RecordingDriver {
    sent: Mutex<Vec<Sent>>,
    offline: AtomicBool,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            offline: AtomicBool::new(false),
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    fn record(&self, destination: Option<NodeId>, mut transfer: Transfer<'_>) -> bool {
        if self.offline.load(Ordering::SeqCst) {
            return false;
        }
        self.sent.lock().unwrap().push(Sent {
            kind: transfer.kind,
            destination,
            signature: transfer.signature,
            data_type: transfer.data_type,
            transfer_id: *transfer.transfer_id,
            priority: transfer.priority,
            payload: transfer.payload.to_vec(),
            iface_mask: transfer.iface_mask.into_bits(),
            canfd: transfer.canfd,
            timeout_ms: transfer.timeout.as_millis(),
        });
        transfer.advance_transfer_id();
        true
    }
}

impl Interface for RecordingDriver {
    fn broadcast(&self, transfer: Transfer<'_>) -> bool {
        self.record(None, transfer)
    }

    fn request(&self, destination: NodeId, transfer: Transfer<'_>) -> bool {
        self.record(Some(destination), transfer)
    }
}

/// Broker with a recording driver attached to bus 0
pub fn setup(config: Config) -> (&'static TestBroker, &'static RecordingDriver) {
    let driver: &'static RecordingDriver = Box::leak(Box::new(RecordingDriver::new()));
    let mut broker = TestBroker::new(config);
    broker.attach(0, driver).unwrap();
    (Box::leak(Box::new(broker)), driver)
}

pub fn node(id: u8) -> NodeId {
    NodeId::new(id).unwrap()
}

pub fn broadcast(source: u8, transfer_id: u8, payload: &[u8]) -> RxTransfer<'_> {
    RxTransfer {
        kind: TransferKind::Broadcast,
        data_type: DATA_TYPE,
        source: node(source),
        transfer_id: TransferId::new(transfer_id),
        priority: Priority::MEDIUM,
        payload,
        canfd: false,
    }
}

pub fn response(source: u8, transfer_id: TransferId, payload: &[u8]) -> RxTransfer<'_> {
    RxTransfer {
        kind: TransferKind::Response,
        data_type: DATA_TYPE,
        source: node(source),
        transfer_id,
        priority: Priority::MEDIUM,
        payload,
        canfd: false,
    }
}
