//! Stress tests that push the heaps to their limits
//!
//! These tests perform large numbers of operations in various patterns
//! to catch edge cases and verify correctness under load.

use fibheap::binary::IndexedBinaryHeap;
use fibheap::config::HeapConfig;
use fibheap::fibonacci::FibonacciHeap;
use fibheap::forest::FibonacciForest;
use fibheap::{DecreaseKeyHeap, Heap, MergeableHeap};

/// Linear congruential generator for reproducible workloads
struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Lcg { state: seed }
    }

    fn next(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        self.state >> 33
    }
}

/// Test massive numbers of inserts and pops
fn test_massive_operations<H: Heap<i32, i32>>() {
    let mut heap = H::new();

    for i in 0..10_000 {
        heap.push(i, i);
    }
    assert_eq!(heap.len(), 10_000);

    for i in 0..10_000 {
        assert_eq!(heap.pop(), Some((i, i)));
    }
    assert!(heap.is_empty());
}

/// Test many decrease_key operations
fn test_many_decrease_keys<H: DecreaseKeyHeap<i32, i32>>() {
    let mut heap = H::new();
    let mut handles = Vec::new();

    for i in 0..500 {
        handles.push(heap.push_with_handle(10000 + i, i));
    }

    // Force tree structure before decreasing
    heap.push(-1, -1);
    assert_eq!(heap.pop(), Some((-1, -1)));

    for (i, handle) in handles.iter().enumerate().rev() {
        assert!(heap.decrease_key(handle, i as i32).is_ok());
    }

    for i in 0..500 {
        assert_eq!(heap.pop(), Some((i, i)));
    }
}

/// Test alternating insert and pop
fn test_alternating_ops<H: Heap<i32, i32>>() {
    let mut heap = H::new();

    for i in 0..2000 {
        heap.push(i * 2, i);
        heap.push(i * 2 + 1, i + 1000);
        assert!(heap.pop().is_some());
    }
    assert_eq!(heap.len(), 2000);

    let mut last = i32::MIN;
    while let Some((priority, _)) = heap.pop() {
        assert!(priority >= last);
        last = priority;
    }
}

/// Test unite with large heaps
fn test_large_unite<H: MergeableHeap<i32, i32>>() {
    let mut heap1 = H::new();
    let mut heap2 = H::new();

    for i in 0..500 {
        heap1.push(i * 2, i);
        heap2.push(i * 2 + 1, i + 1000);
    }

    let mut heap = heap1.unite(heap2);
    assert_eq!(heap.len(), 1000);

    for expected in 0..1000 {
        assert_eq!(heap.pop().map(|(p, _)| p), Some(expected));
    }
}

/// Test with very large priorities
fn test_large_priorities<H: Heap<i32, i64>>() {
    let mut heap = H::new();

    heap.push(1_000_000_000, 1);
    heap.push(-1_000_000_000, 2);
    heap.push(i64::MAX, 3);
    heap.push(i64::MIN, 4);

    assert_eq!(heap.pop(), Some((i64::MIN, 4)));
    assert_eq!(heap.pop(), Some((-1_000_000_000, 2)));
    assert_eq!(heap.pop(), Some((1_000_000_000, 1)));
    assert_eq!(heap.pop(), Some((i64::MAX, 3)));
}

/// Random interleaving checked against a sorted vector
fn test_random_workload<H: DecreaseKeyHeap<usize, u64>>(seed: u64) {
    let mut rng = Lcg::new(seed);
    let mut heap = H::new();
    let mut live: Vec<(H::Handle, u64, usize)> = Vec::new();

    for id in 0..20_000 {
        match rng.next() % 10 {
            0..=4 => {
                let priority = rng.next() % 1_000_000;
                live.push((heap.push_with_handle(priority, id), priority, id));
            }
            5..=7 if !live.is_empty() => {
                let index = rng.next() as usize % live.len();
                let (handle, old, _) = live[index];
                let new = old.saturating_sub(rng.next() % 10_000);
                heap.decrease_key(&handle, new).unwrap();
                live[index].1 = new;
            }
            _ => {
                let expected = live.iter().map(|&(_, p, _)| p).min();
                let popped = heap.pop();
                assert_eq!(popped.map(|(p, _)| p), expected);
                if let Some((_, item)) = popped {
                    let index = live.iter().position(|&(_, _, id)| id == item).unwrap();
                    live.swap_remove(index);
                }
            }
        }
        assert_eq!(heap.len(), live.len());
    }
}

#[test]
fn test_fibonacci_massive() {
    test_massive_operations::<FibonacciHeap<i32, i32>>();
}

#[test]
fn test_fibonacci_many_decrease_keys() {
    test_many_decrease_keys::<FibonacciHeap<i32, i32>>();
}

#[test]
fn test_fibonacci_alternating() {
    test_alternating_ops::<FibonacciHeap<i32, i32>>();
}

#[test]
fn test_fibonacci_large_unite() {
    test_large_unite::<FibonacciHeap<i32, i32>>();
}

#[test]
fn test_fibonacci_large_priorities() {
    test_large_priorities::<FibonacciHeap<i32, i64>>();
}

#[test]
fn test_fibonacci_random_workload() {
    test_random_workload::<FibonacciHeap<usize, u64>>(0x5eed);
    test_random_workload::<FibonacciHeap<usize, u64>>(42);
}

#[test]
fn test_binary_massive() {
    test_massive_operations::<IndexedBinaryHeap<i32, i32>>();
}

#[test]
fn test_binary_many_decrease_keys() {
    test_many_decrease_keys::<IndexedBinaryHeap<i32, i32>>();
}

#[test]
fn test_binary_alternating() {
    test_alternating_ops::<IndexedBinaryHeap<i32, i32>>();
}

#[test]
fn test_binary_large_unite() {
    test_large_unite::<IndexedBinaryHeap<i32, i32>>();
}

#[test]
fn test_binary_large_priorities() {
    test_large_priorities::<IndexedBinaryHeap<i32, i64>>();
}

#[test]
fn test_binary_random_workload() {
    test_random_workload::<IndexedBinaryHeap<usize, u64>>(0x5eed);
}

#[test]
fn test_fibonacci_invariants_under_churn() {
    let mut rng = Lcg::new(7);
    let mut heap = FibonacciHeap::with_config(HeapConfig::default().with_capacity(4096));
    let mut handles = Vec::new();

    for round in 0..20 {
        for i in 0..200 {
            handles.push(heap.insert(rng.next() % 100_000, round * 200 + i));
        }
        for _ in 0..50 {
            heap.extract_min().unwrap();
        }
        handles.retain(|h| heap.get(h).is_some());
        for _ in 0..100 {
            let handle = handles[rng.next() as usize % handles.len()];
            let current = *heap.get(&handle).unwrap().0;
            heap.decrease_key(&handle, current / 2).unwrap();
        }
        heap.check_invariants().unwrap();
    }

    assert_eq!(heap.len(), 20 * 150);
    let mut last = 0;
    while let Ok((priority, _)) = heap.extract_min() {
        assert!(priority >= last);
        last = priority;
    }
    heap.check_invariants().unwrap();
}

#[test]
fn test_fibonacci_chained_unites() {
    let mut heaps: Vec<FibonacciHeap<u32, u32>> = (0..16)
        .map(|h| {
            let mut heap = FibonacciHeap::default();
            for i in 0..(h * 10) {
                heap.insert(i * 16 + h, h);
            }
            // Give each heap some tree structure
            heap.insert(0, u32::MAX);
            heap.extract_min().unwrap();
            heap
        })
        .collect();

    while heaps.len() > 1 {
        let a = heaps.pop().unwrap();
        let b = heaps.pop().unwrap();
        let united = a.unite(b);
        united.check_invariants().unwrap();
        heaps.insert(0, united);
    }

    let mut heap = heaps.pop().unwrap();
    let total: u32 = (0..16).map(|h| h * 10).sum();
    assert_eq!(heap.len(), total as usize);

    let mut last = 0;
    while let Ok((priority, _)) = heap.extract_min() {
        assert!(priority >= last);
        last = priority;
    }
}

#[test]
fn test_forest_random_workload() {
    let mut rng = Lcg::new(0xf0f0);
    let mut forest = FibonacciForest::default();
    // Each heap alongside the (handle, priority, item) triples it holds
    let mut heaps: Vec<_> = (0..8).map(|_| (forest.new_heap(), Vec::new())).collect();

    for id in 0..20_000u32 {
        let pick = rng.next() as usize % heaps.len();
        match rng.next() % 20 {
            0..=9 => {
                let priority = rng.next() % 1_000_000;
                let (heap, live) = &mut heaps[pick];
                live.push((forest.insert(*heap, priority, id).unwrap(), priority, id));
            }
            10..=14 => {
                let (heap, live) = &mut heaps[pick];
                if live.is_empty() {
                    continue;
                }
                let index = rng.next() as usize % live.len();
                let new = live[index].1.saturating_sub(rng.next() % 10_000);
                forest.decrease_key(*heap, &live[index].0, new).unwrap();
                live[index].1 = new;
            }
            15..=18 => {
                let (heap, live) = &mut heaps[pick];
                let expected = live.iter().map(|&(_, p, _)| p).min();
                let popped = forest.extract_min(*heap).ok();
                assert_eq!(popped.map(|(p, _)| p), expected);
                if let Some((_, item)) = popped {
                    let index = live.iter().position(|&(_, _, id)| id == item).unwrap();
                    live.swap_remove(index);
                }
            }
            _ if heaps.len() > 1 => {
                let (a, mut live_a) = heaps.swap_remove(pick);
                let other = rng.next() as usize % heaps.len();
                let (b, live_b) = heaps.swap_remove(other);
                let nodes = forest.node_count();
                let united = forest.unite(a, b).unwrap();
                assert_eq!(forest.node_count(), nodes);
                live_a.extend(live_b);
                heaps.push((united, live_a));
                heaps.push((forest.new_heap(), Vec::new()));
            }
            _ => {}
        }
    }

    forest.check_invariants().unwrap();
    for (heap, live) in &heaps {
        assert_eq!(forest.len(*heap), Ok(live.len()));
        for (handle, priority, item) in live {
            assert!(forest.contains(*heap, handle));
            assert_eq!(forest.get(handle), Some((priority, item)));
        }
    }
}

