//! Property-based tests for the collector.
//!
//! Random object graphs are built out of lists, collected, and compared
//! against a reachability set computed independently of the heap:
//! 1. Soundness: everything reachable from a root survives
//! 2. Completeness: everything else is reclaimed
//! 3. Teardown: every foreign pointer is finalized exactly once

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use proptest::prelude::*;
use scopegc::{ForeignPointer, Heap, HeapConfig, ObjRef};

/// Node count, directed edges, and root indices
fn graph_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>, Vec<usize>)> {
    (1usize..40).prop_flat_map(|nodes| {
        (
            Just(nodes),
            prop::collection::vec((0..nodes, 0..nodes), 0..nodes * 2),
            prop::collection::vec(0..nodes, 0..4),
        )
    })
}

fn reachable(nodes: usize, edges: &[(usize, usize)], roots: &[usize]) -> Vec<bool> {
    let mut adjacency = vec![Vec::new(); nodes];
    for &(from, to) in edges {
        adjacency[from].push(to);
    }

    let mut seen = vec![false; nodes];
    let mut queue: VecDeque<usize> = roots.iter().copied().collect();
    while let Some(node) = queue.pop_front() {
        if std::mem::replace(&mut seen[node], true) {
            continue;
        }
        queue.extend(adjacency[node].iter().copied());
    }
    seen
}

fn manual_heap() -> Heap {
    Heap::with_config(HeapConfig::default().with_auto_collect(false))
}

proptest! {
    #[test]
    fn collect_keeps_exactly_the_reachable_set(
        (nodes, edges, roots) in graph_strategy()
    ) {
        let mut heap = manual_heap();
        let handles: Vec<ObjRef> = (0..nodes).map(|_| heap.new_list()).collect();
        for &(from, to) in &edges {
            heap.list_push(handles[from], handles[to]).unwrap();
        }
        for &root in &roots {
            heap.add_root(handles[root]);
        }

        let expected = reachable(nodes, &edges, &roots);
        let report = heap.collect();

        for (index, &handle) in handles.iter().enumerate() {
            prop_assert_eq!(heap.contains(handle), expected[index], "node {}", index);
        }
        let live = expected.iter().filter(|&&alive| alive).count();
        prop_assert_eq!(report.marked, live);
        prop_assert_eq!(report.reclaimed, nodes - live);
        prop_assert_eq!(heap.live_objects(), live);

        // A second cycle changes nothing
        prop_assert_eq!(heap.collect().reclaimed, 0);
    }

    #[test]
    fn every_pointer_finalized_once(
        count in 0usize..50,
        rooted in prop::collection::vec(any::<bool>(), 50),
    ) {
        let finalized = Rc::new(Cell::new(0usize));
        {
            let mut heap = manual_heap();
            let counter = Rc::clone(&finalized);
            heap.set_finalizer(Some(Box::new(move |pointer: &mut ForeignPointer| {
                if unsafe { pointer.take_boxed::<usize>() }.is_some() {
                    counter.set(counter.get() + 1);
                }
            })));

            let holder = heap.new_list();
            heap.add_root(holder);
            for i in 0..count {
                let pointer = heap.new_pointer(i);
                heap.pointer_mut(pointer).unwrap().attach_boxed(Box::new(i));
                if rooted[i] {
                    heap.list_push(holder, pointer).unwrap();
                }
            }

            let unrooted = rooted[..count].iter().filter(|&&r| !r).count();
            prop_assert_eq!(heap.collect().finalized, unrooted);
            prop_assert_eq!(finalized.get(), unrooted);
        }
        prop_assert_eq!(finalized.get(), count);
    }
}

#[test]
fn auto_collection_never_loses_rooted_bindings() {
    let mut heap = Heap::with_config(HeapConfig::default().with_initial_threshold(1024));
    let global = heap.new_scope(None);
    heap.add_root(global);

    for i in 0..5_000 {
        heap.define_int(global, "counter", i).unwrap();
        heap.define_string(global, "label", format!("item {}", i)).unwrap();
        assert_eq!(heap.get_int(global, "counter"), i);
    }

    assert!(heap.stats().gc.collections_run > 0);
    assert_eq!(heap.get_string(global, "label"), "item 4999");
}
