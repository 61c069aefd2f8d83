use super::EventQueue;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

const PRODUCERS: usize = 8;
const ITEMS_PER_PRODUCER: usize = 4096;

fn tag(producer: usize, seq: usize) -> u64 {
    ((producer as u64) << 32) | seq as u64
}

#[test]
fn fifo_order_single_consumer() {
    let queue = EventQueue::new();
    for i in 0..100 {
        queue.push(i);
    }

    let pulled: Vec<_> = std::iter::from_fn(|| queue.pull()).collect();
    assert_eq!(pulled, (0..100).collect::<Vec<_>>());
}

#[test]
fn pull_on_empty_returns_none() {
    let queue = EventQueue::<u64>::new();
    assert_eq!(queue.pull(), None);
    assert!(queue.is_empty());
}

#[test]
fn pull_all_on_empty_returns_empty_vec() {
    let queue = EventQueue::<u64>::new();
    assert!(queue.pull_all().is_empty());
}

#[test]
fn pull_all_removes_everything_in_order() {
    let queue = EventQueue::new();
    for i in 0..10 {
        queue.push(i);
    }

    assert_eq!(queue.pull_all(), (0..10).collect::<Vec<_>>());
    assert_eq!(queue.pull(), None);
    assert_eq!(queue.len(), 0);
}

#[test]
fn drain_yields_in_order_and_removes() {
    let queue = EventQueue::new();
    for i in 0..10 {
        queue.push(i);
    }

    let drained: Vec<_> = queue.drain().collect();
    assert_eq!(drained, (0..10).collect::<Vec<_>>());
    assert!(queue.is_empty());
}

#[test]
fn drain_is_bounded_by_snapshot() {
    let queue = EventQueue::new();
    for i in 0..3 {
        queue.push(i);
    }

    let mut drain = queue.drain();
    assert_eq!(drain.next(), Some(0));

    // Items pushed after the drain started are not part of this pass.
    queue.push(100);
    queue.push(101);

    assert_eq!(drain.next(), Some(1));
    assert_eq!(drain.next(), Some(2));
    assert_eq!(drain.next(), None);

    assert_eq!(queue.len(), 2);
}

#[test]
fn drain_is_restartable() {
    let queue = EventQueue::new();
    for i in 0..6 {
        queue.push(i);
    }

    let mut first = queue.drain();
    assert_eq!(first.next(), Some(0));
    assert_eq!(first.next(), Some(1));
    drop(first);

    // An abandoned drain leaves the remainder for the next pass.
    let second: Vec<_> = queue.drain().collect();
    assert_eq!(second, vec![2, 3, 4, 5]);
    assert!(queue.is_empty());
}

#[test]
fn drain_on_empty_is_empty() {
    let queue = EventQueue::<u64>::new();
    assert_eq!(queue.drain().count(), 0);
}

#[test]
fn multi_producer_single_consumer_preserves_per_producer_order() {
    let queue = Arc::new(EventQueue::new());

    let handles: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for seq in 0..ITEMS_PER_PRODUCER {
                    queue.push(tag(p, seq));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let pulled: Vec<_> = std::iter::from_fn(|| queue.pull()).collect();
    assert_eq!(pulled.len(), PRODUCERS * ITEMS_PER_PRODUCER);

    // Global order must embed each producer's push order as a subsequence.
    let mut next_seq = [0u64; PRODUCERS];
    for item in pulled {
        let producer = (item >> 32) as usize;
        let seq = item & 0xFFFF_FFFF;
        assert_eq!(seq, next_seq[producer]);
        next_seq[producer] += 1;
    }
}

#[test]
fn concurrent_mixed_consumers_neither_lose_nor_duplicate() {
    let queue = Arc::new(EventQueue::new());
    let total = PRODUCERS * ITEMS_PER_PRODUCER;

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for seq in 0..ITEMS_PER_PRODUCER {
                    queue.push(tag(p, seq));
                }
            })
        })
        .collect();

    // Consumers race the producers using all three dequeue shapes and keep
    // going until every pushed item is accounted for.
    let consumed = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let consumers: Vec<_> = (0..4)
        .map(|c| {
            let queue = Arc::clone(&queue);
            let consumed = Arc::clone(&consumed);
            thread::spawn(move || {
                loop {
                    let batch: Vec<u64> = match c % 3 {
                        0 => queue.pull().into_iter().collect(),
                        1 => queue.pull_all(),
                        _ => queue.drain().collect(),
                    };

                    let mut consumed = consumed.lock();
                    consumed.extend(batch);
                    if consumed.len() >= total {
                        break;
                    }
                }
            })
        })
        .collect();

    for handle in producers {
        handle.join().unwrap();
    }
    for handle in consumers {
        handle.join().unwrap();
    }

    let consumed = consumed.lock();
    assert_eq!(consumed.len(), total);

    let unique: HashSet<_> = consumed.iter().copied().collect();
    assert_eq!(unique.len(), total, "duplicate delivery detected");

    for p in 0..PRODUCERS {
        for seq in 0..ITEMS_PER_PRODUCER {
            assert!(unique.contains(&tag(p, seq)), "lost item {p}/{seq}");
        }
    }

    assert!(queue.is_empty());
}
