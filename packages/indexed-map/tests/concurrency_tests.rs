//! Concurrency tests
//!
//! Many OS threads hammer one map. Assertions only cover what the
//! consistency contract promises: no phantom gaps for memberships nobody
//! removes, and full index consistency once writers have drained.

mod common;

use common::*;
use indexed_map::IndexedMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

const WRITERS: i64 = 16;

fn concurrent_put(m: &Arc<IndexedMap<Animal>>, offset: i64, per_thread: i64) {
    let handles: Vec<_> = (0..WRITERS)
        .map(|t| {
            let m = Arc::clone(m);
            thread::spawn(move || {
                let start = offset + t * per_thread;
                for a in animals(start, per_thread) {
                    m.put_int(a.id, a);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_insert_then_update() {
    let m = Arc::new(animal_map());
    let per_thread = 2_000;
    let total = (WRITERS * per_thread) as usize;

    // Fresh inserts, then the same records again (Refresh path)
    concurrent_put(&m, 0, per_thread);
    concurrent_put(&m, 0, per_thread);
    assert_eq!(m.size(), total);
    assert_eq!(m.get_by_index("Type", "one").unwrap().len(), total / 2);
    assert_eq!(m.get_by_index("Type", "two").unwrap().len(), total / 2);

    // A second, disjoint key range
    concurrent_put(&m, total as i64, per_thread);
    assert_eq!(m.size(), total * 2);
    assert_eq!(m.get_by_index("Type", "one").unwrap().len(), total);
}

#[test]
fn test_no_phantom_reads_for_untouched_membership() {
    let m = Arc::new(animal_map());
    m.put_int(1, Animal::new(1, "animal", "one"));
    assert!(!m.get_by_index("Type", "one").unwrap().is_empty());

    let done = Arc::new(AtomicBool::new(false));
    let misses = Arc::new(AtomicU64::new(0));
    let reads = Arc::new(AtomicU64::new(0));

    let writers: Vec<_> = (0..8i64)
        .map(|t| {
            let m = Arc::clone(&m);
            thread::spawn(move || {
                for i in 0..500 {
                    let n = 10 + t * 500 + i;
                    m.put_int(n, Animal::new(n, "other", &format!("two{}", n)));
                    // Unchanged value: a Refresh, never a removal from "one"
                    m.put_int(1, Animal::new(1, "animal", "one"));
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..8)
        .map(|_| {
            let m = Arc::clone(&m);
            let done = Arc::clone(&done);
            let misses = Arc::clone(&misses);
            let reads = Arc::clone(&reads);
            thread::spawn(move || {
                while !done.load(Ordering::Acquire) {
                    if m.get_by_index("Type", "one").unwrap().is_empty() {
                        misses.fetch_add(1, Ordering::Relaxed);
                    }
                    reads.fetch_add(1, Ordering::Relaxed);
                }
            })
        })
        .collect();

    for handle in writers {
        handle.join().unwrap();
    }
    done.store(true, Ordering::Release);
    for handle in readers {
        handle.join().unwrap();
    }

    assert!(reads.load(Ordering::Relaxed) > 0);
    assert_eq!(misses.load(Ordering::Relaxed), 0);
    assert_eq!(m.size(), 1 + 8 * 500);
}

#[test]
fn test_index_visible_before_primary_on_put() {
    // Whenever a reader sees a key through the primary store, every index
    // write for that put has already happened.
    let m = Arc::new(animal_map());
    let done = Arc::new(AtomicBool::new(false));
    let violations = Arc::new(AtomicU64::new(0));

    let writer = {
        let m = Arc::clone(&m);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for a in animals(0, 5_000) {
                m.put_int(a.id, a);
            }
            done.store(true, Ordering::Release);
        })
    };

    let reader = {
        let m = Arc::clone(&m);
        let done = Arc::clone(&done);
        let violations = Arc::clone(&violations);
        thread::spawn(move || {
            let mut next_id = 0i64;
            while !done.load(Ordering::Acquire) {
                if let Some(a) = m.get_int(next_id) {
                    let bucket = m.get_by_index("Type", &a.kind).unwrap();
                    if !bucket.iter().any(|b| b.id == a.id) {
                        violations.fetch_add(1, Ordering::Relaxed);
                    }
                    next_id += 1;
                }
            }
        })
    };

    writer.join().unwrap();
    reader.join().unwrap();
    assert_eq!(violations.load(Ordering::Relaxed), 0);
}

#[test]
fn test_concurrent_remove_leaves_consistent_state() {
    let m = Arc::new(animal_map());
    for a in animals(0, 4_000) {
        m.put_int(a.id, a);
    }

    // Even ids removed, odd ids moved to a new value, all in parallel
    let handles: Vec<_> = (0..8i64)
        .map(|t| {
            let m = Arc::clone(&m);
            thread::spawn(move || {
                for id in (t * 500)..((t + 1) * 500) {
                    if id % 2 == 0 {
                        assert!(m.remove_int(id).is_some());
                    } else {
                        m.put_int(id, Animal::new(id, "moved", "three"));
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(m.size(), 2_000);
    assert!(m.get_by_index("Type", "two").unwrap().is_empty());
    assert!(m.get_by_index("Type", "one").unwrap().is_empty());
    assert_eq!(m.get_by_index("Type", "three").unwrap().len(), 2_000);
    assert_eq!(m.get_index_keys("Type").unwrap(), vec!["THREE".to_string()]);
}

#[test]
fn test_concurrent_readers_see_only_stored_records() {
    let m = Arc::new(animal_map());
    for a in animals(0, 1_000) {
        m.put_int(a.id, a);
    }

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let m = Arc::clone(&m);
            thread::spawn(move || {
                for _ in 0..50 {
                    let keys = m.keys();
                    assert_eq!(keys.len(), 1_000);
                    for record in m.get_by_index("Type", "one").unwrap() {
                        assert_eq!(record.id % 2, 1);
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}
