//! Concurrent subscribe/dispose/emit tests.

use crossbeam_channel::unbounded;
use event_hub::{EventHub, ExecutionContext, SubscribeOptions, SubscriberId};
use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);
const QUIET: Duration = Duration::from_millis(50);

fn quiet_hub() -> EventHub {
    let hub = EventHub::new().unwrap();
    hub.set_logger(None);
    hub
}

/// Subscribe `count` background subscribers from `count` threads at once,
/// each sleeping a random amount first. Returns the ids and the receiver all
/// deliveries are reported on.
fn subscribe_concurrently(
    hub: &EventHub,
    delays_us: &[u64],
    context: ExecutionContext,
) -> (Vec<SubscriberId>, crossbeam_channel::Receiver<SubscriberId>) {
    let (tx, rx) = unbounded();
    let barrier = Arc::new(Barrier::new(delays_us.len()));

    let handles: Vec<_> = delays_us
        .iter()
        .map(|&delay| {
            let hub = hub.clone();
            let tx = tx.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                thread::sleep(Duration::from_micros(delay));
                let id_slot = Arc::new(parking_lot::Mutex::new(None::<SubscriberId>));
                let slot = id_slot.clone();
                let subscription = hub.on(
                    "shared",
                    SubscribeOptions::new().on(context),
                    move |_: Option<&u64>| {
                        if let Some(id) = *slot.lock() {
                            tx.send(id).unwrap();
                        }
                    },
                );
                *id_slot.lock() = Some(subscription.id());
                subscription.id()
            })
        })
        .collect();

    let ids = handles.into_iter().map(|h| h.join().unwrap()).collect();
    (ids, rx)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_every_subscriber_receives_exactly_once(
        delays_us in prop::collection::vec(0u64..500, 1..24),
        on_main in any::<bool>(),
    ) {
        let hub = quiet_hub();
        let context = if on_main { ExecutionContext::Main } else { ExecutionContext::Background };
        let (ids, rx) = subscribe_concurrently(&hub, &delays_us, context);

        prop_assert_eq!(hub.subscriber_count("shared"), delays_us.len());

        hub.emit("shared", 1u64);

        let mut counts: HashMap<SubscriberId, usize> = HashMap::new();
        for _ in 0..ids.len() {
            let id = rx.recv_timeout(WAIT).unwrap();
            *counts.entry(id).or_default() += 1;
        }
        prop_assert!(rx.recv_timeout(QUIET).is_err());

        prop_assert_eq!(counts.len(), ids.len());
        for id in &ids {
            prop_assert_eq!(counts.get(id), Some(&1));
        }
    }

    #[test]
    fn prop_concurrent_dispose_loses_nothing(
        delays_us in prop::collection::vec(0u64..300, 2..16),
    ) {
        let hub = quiet_hub();
        let barrier = Arc::new(Barrier::new(delays_us.len()));

        // Half the threads subscribe and keep; the other half subscribe and
        // dispose, racing against emissions from the main test thread.
        let handles: Vec<_> = delays_us
            .iter()
            .enumerate()
            .map(|(i, &delay)| {
                let hub = hub.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    thread::sleep(Duration::from_micros(delay));
                    let subscription = hub.on(
                        "churn",
                        SubscribeOptions::new().on(ExecutionContext::Background),
                        |_: Option<&u64>| {},
                    );
                    if i % 2 == 1 {
                        subscription.dispose();
                        subscription.dispose();
                    }
                })
            })
            .collect();

        for n in 0..10u64 {
            hub.emit("churn", n);
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let kept = delays_us.len().div_ceil(2);
        prop_assert_eq!(hub.subscriber_count("churn"), kept);
    }
}

#[test]
fn test_emit_from_many_threads() {
    let hub = quiet_hub();
    let (tx, rx) = unbounded();
    let _sub = hub.on(
        "n",
        SubscribeOptions::new().on(ExecutionContext::Background),
        move |v: Option<&u64>| tx.send(*v.unwrap()).unwrap(),
    );

    let handles: Vec<_> = (0..8u64)
        .map(|t| {
            let hub = hub.clone();
            thread::spawn(move || {
                for i in 0..25u64 {
                    hub.emit("n", t * 100 + i);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut received: Vec<u64> = (0..200).map(|_| rx.recv_timeout(WAIT).unwrap()).collect();
    received.sort_unstable();
    let mut expected: Vec<u64> = (0..8u64)
        .flat_map(|t| (0..25u64).map(move |i| t * 100 + i))
        .collect();
    expected.sort_unstable();
    assert_eq!(received, expected);
}
