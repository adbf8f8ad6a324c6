mod common;

use canscript::config::Config;
use canscript::core::{TransferId, TransferKind};
use common::{DATA_TYPE, RecordingDriver, SIGNATURE, TestBroker, broadcast, node, response, setup};
use std::boxed::Box;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

fn two_bus_broker() -> &'static TestBroker {
    let first: &'static RecordingDriver = Box::leak(Box::new(RecordingDriver::new()));
    let second: &'static RecordingDriver = Box::leak(Box::new(RecordingDriver::new()));
    let mut broker = TestBroker::new(Config::default());
    broker.attach(0, first).unwrap();
    broker.attach(2, second).unwrap();
    Box::leak(Box::new(broker))
}

#[test]
fn test_destroy_all() {
    let broker = two_bus_broker();
    let port = broker.rx_port(0).unwrap();

    let mut first = broker.handle(0, SIGNATURE, DATA_TYPE).unwrap();
    let mut second = broker.handle(0, SIGNATURE, DATA_TYPE).unwrap();
    let mut third = broker.handle(2, SIGNATURE, DATA_TYPE).unwrap();
    let idle = broker.handle(2, SIGNATURE, DATA_TYPE).unwrap();
    assert!(first.subscribe());
    assert!(second.subscribe());
    assert!(third.request(node(5), &[]));
    port.push(&broadcast(10, 0, &[1]));
    assert_eq!(broker.subscription_count(), 3);
    assert_eq!(broker.registration_count(0), 2);
    assert_eq!(broker.registration_count(2), 1);

    broker.destroy_all();
    assert_eq!(broker.subscription_count(), 0);
    assert_eq!(broker.registration_count(0), 0);
    assert_eq!(broker.registration_count(2), 0);
    assert_eq!(broker.handle_count(), 4);
    assert_eq!(first.subscription(), None);
    assert_eq!(first.check_message(), None);
    assert_eq!(third.subscription(), None);
    assert_eq!(port.push(&broadcast(10, 1, &[2])), 0);

    // Handles stay usable
    assert!(first.subscribe());
    assert_eq!(port.push(&broadcast(10, 2, &[3])), 1);
    assert_eq!(first.check_message().unwrap().payload, [3]);

    broker.destroy_all();
    broker.destroy_all();
    drop((first, second, third, idle));
    assert_eq!(broker.handle_count(), 0);
}

#[test]
fn test_destroy_all_without_subscriptions() {
    let (broker, _) = setup(Config::default());
    broker.destroy_all();
    assert_eq!(broker.subscription_count(), 0);

    let mut handle = broker.handle(0, SIGNATURE, DATA_TYPE).unwrap();
    broker.destroy_all();
    assert!(handle.broadcast(&[]));
}

#[test]
fn test_concurrent_dispatch() {
    const ROUNDS: usize = 2_000;

    let (broker, _) = setup(Config::default());
    let done: &'static AtomicBool = Box::leak(Box::new(AtomicBool::new(false)));

    let bus = thread::spawn(move || {
        let port = broker.rx_port(0).unwrap();
        let mut round: usize = 0;
        while !done.load(Ordering::SeqCst) {
            let id = TransferId::new(round as u8);
            port.push(&response(7, id, &[7]));
            port.push(&response(5, id, &[5]));
            port.push(&broadcast(10, round as u8, &[10]));
            round = round.wrapping_add(1);
        }
    });

    let teardown = thread::spawn(move || {
        for _ in 0..ROUNDS / 10 {
            broker.destroy_all();
            thread::yield_now();
        }
    });

    let mut requester = broker.handle(0, SIGNATURE, DATA_TYPE).unwrap();
    let mut listener = broker.handle(0, SIGNATURE, DATA_TYPE).unwrap();
    let mut responses = 0;
    for _ in 0..ROUNDS {
        requester.request(node(5), &[]);
        listener.subscribe();
        for _ in 0..4 {
            if let Some(message) = requester.check_message() {
                assert_eq!(message.source, node(5));
                assert_eq!(message.payload, [5]);
                responses += 1;
            }
            if let Some(message) = listener.check_message() {
                assert_eq!(message.source, node(10));
                assert_eq!(message.payload, [10]);
            }
        }
        assert!(requester.pending() <= 8);
        assert!(listener.pending() <= 8);
    }

    teardown.join().unwrap();
    done.store(true, Ordering::SeqCst);
    bus.join().unwrap();

    assert!(responses <= ROUNDS);
    assert_eq!(broker.subscription_count(), broker.registration_count(0));
    if requester.subscription() == Some(TransferKind::Response) {
        assert!(broker.subscription_count() >= 1);
    }
}
