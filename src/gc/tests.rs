//! Collector tests - reachability, roots, finalization and auto-collection

use super::*;
use crate::allocator::Allocator;
use crate::heap::{HeapCell, HeapConfig};
use crate::objects::{ForeignPointer, ObjRef};
use std::cell::Cell;
use std::rc::Rc;

fn heap() -> Heap {
    Heap::with_config(HeapConfig::default().with_auto_collect(false))
}

fn slot() -> usize {
    Allocator::<HeapCell>::slot_bytes()
}

#[test]
fn test_collect_empty_heap() {
    let mut heap = heap();
    assert_eq!(heap.collect(), CollectionReport::default());
    assert_eq!(heap.stats().gc.collections_run, 0);
}

#[test]
fn test_no_roots_reclaims_everything() {
    let mut heap = heap();
    let list = heap.new_list();
    let item = heap.new_integer(1);
    heap.list_push(list, item).unwrap();

    let report = heap.collect();
    assert_eq!(report.marked, 0);
    assert_eq!(report.reclaimed, 2);
    assert_eq!(report.bytes_reclaimed, 2 * slot());
    assert_eq!(heap.live_objects(), 0);
    assert_eq!(heap.arena_bytes_in_use(), 0);
}

#[test]
fn test_reachable_objects_survive() {
    let mut heap = heap();
    let global = heap.new_scope(None);
    heap.add_root(global);

    let list = heap.new_list();
    let a = heap.new_string("a");
    let b = heap.new_real(1.5);
    heap.list_push(list, a).unwrap();
    heap.list_push(list, b).unwrap();
    heap.define(global, "items", list).unwrap();

    let garbage = heap.new_string("garbage");

    let report = heap.collect();
    assert_eq!(report.marked, 4);
    assert_eq!(report.reclaimed, 1);
    for obj in [global, list, a, b] {
        assert!(heap.contains(obj), "{} should survive", obj);
    }
    assert!(!heap.contains(garbage));
}

#[test]
fn test_collection_is_idempotent() {
    let mut heap = heap();
    let root = heap.new_list();
    heap.add_root(root);
    let child = heap.new_nil();
    heap.list_push(root, child).unwrap();
    heap.new_integer(9);

    let first = heap.collect();
    let survivors: Vec<ObjRef> = heap.objects().collect();
    let second = heap.collect();

    assert_eq!(first.reclaimed, 1);
    assert_eq!(second.reclaimed, 0);
    assert_eq!(second.marked, first.marked);
    assert_eq!(heap.objects().collect::<Vec<_>>(), survivors);
}

#[test]
fn test_marks_cleared_after_cycle() {
    let mut heap = heap();
    let root = heap.new_map();
    heap.add_root(root);
    heap.collect();

    assert!(heap
        .objects()
        .all(|obj| heap.allocator.get(obj.slot()).is_some_and(|cell| !cell.marked)));

    // A root dropped after one cycle is reclaimed by the next
    heap.remove_root(root);
    assert_eq!(heap.collect().reclaimed, 1);
}

#[test]
fn test_redefinition_leaves_garbage() {
    let mut heap = heap();
    let global = heap.new_scope(None);
    heap.add_root(global);

    for value in 1..=4 {
        heap.define_int(global, "counter", value).unwrap();
    }
    assert_eq!(heap.live_objects(), 5);

    let report = heap.collect();
    assert_eq!(report.reclaimed, 3);
    assert_eq!(heap.get_int(global, "counter"), 4);
    assert_eq!(heap.live_objects(), 2);
}

#[test]
fn test_parent_scope_kept_alive_by_child() {
    let mut heap = heap();
    let parent = heap.new_scope(None);
    heap.define_string(parent, "greeting", "hi").unwrap();
    let child = heap.new_scope(Some(parent));
    heap.add_root(child);

    heap.collect();
    assert!(heap.contains(parent));
    assert_eq!(heap.get_string(child, "greeting"), "hi");
}

#[test]
fn test_removed_root_survives_through_container() {
    let mut heap = heap();
    let holder = heap.new_list();
    let value = heap.new_integer(5);
    heap.add_root(holder);
    heap.add_root(value);
    heap.list_push(holder, value).unwrap();

    assert!(heap.remove_root(value));
    heap.collect();
    assert!(heap.contains(value));

    heap.list_mut(holder).unwrap().clear();
    heap.collect();
    assert!(!heap.contains(value));
}

#[test]
fn test_map_keys_and_values_traced() {
    let mut heap = heap();
    let map = heap.new_map();
    heap.add_root(map);

    let key = heap.new_string("key");
    let value = heap.new_list();
    let nested = heap.new_integer(3);
    heap.list_push(value, nested).unwrap();
    heap.map_insert(map, key, value).unwrap();

    heap.collect();
    for obj in [map, key, value, nested] {
        assert!(heap.contains(obj));
    }
}

#[test]
fn test_unrooted_cycle_is_collected() {
    let mut heap = heap();
    let a = heap.new_list();
    let b = heap.new_list();
    heap.list_push(a, b).unwrap();
    heap.list_push(b, a).unwrap();
    heap.list_push(a, a).unwrap();

    heap.add_root(a);
    assert_eq!(heap.collect().marked, 2);

    heap.remove_root(a);
    assert_eq!(heap.collect().reclaimed, 2);
}

#[test]
fn test_finalizer_runs_once_per_reclaimed_pointer() {
    let freed = Rc::new(Cell::new(0usize));
    let mut heap = heap();
    {
        let freed = Rc::clone(&freed);
        heap.set_finalizer(Some(Box::new(move |pointer: &mut ForeignPointer| {
            if let Some(value) = unsafe { pointer.take_boxed::<String>() } {
                assert_eq!(*value, "payload");
                freed.set(freed.get() + 1);
            }
        })));
    }

    let keep = heap.new_list();
    heap.add_root(keep);
    for i in 0..6 {
        let p = heap.new_pointer(i);
        heap.pointer_mut(p)
            .unwrap()
            .attach_boxed(Box::new(String::from("payload")));
        if i < 2 {
            heap.list_push(keep, p).unwrap();
        }
    }

    let report = heap.collect();
    assert_eq!(report.finalized, 4);
    assert_eq!(freed.get(), 4);

    heap.collect();
    assert_eq!(freed.get(), 4);

    heap.clear();
    assert_eq!(freed.get(), 6);
    assert_eq!(heap.stats().gc.finalizers_run, 6);
}

#[test]
fn test_sweep_preserves_survivor_order() {
    let mut heap = heap();
    let ids: Vec<_> = (0..8).map(|i| heap.new_integer(i)).collect();
    for &obj in ids.iter().step_by(2) {
        heap.add_root(obj);
    }

    heap.collect();
    let expected: Vec<_> = ids.iter().copied().step_by(2).collect();
    assert_eq!(heap.objects().collect::<Vec<_>>(), expected);
}

#[test]
fn test_cumulative_stats() {
    let mut heap = heap();
    heap.new_nil();
    heap.collect();
    heap.new_nil();
    heap.new_nil();
    heap.collect();

    let stats = heap.stats().gc;
    assert_eq!(stats.collections_run, 2);
    assert_eq!(stats.objects_reclaimed, 3);
    assert_eq!(stats.bytes_reclaimed, 3 * slot());
    assert_eq!(stats.threshold, heap.threshold());
}

mod auto_collect {
    use super::*;
    use crate::heap::{GROW_FACTOR, SHRINK_FACTOR};
    use std::time::Duration;

    fn auto_heap(clock: &ManualClock) -> Heap {
        let config = HeapConfig::default()
            .with_threshold_bounds(slot(), 1 << 30)
            .with_initial_threshold(4 * slot());
        Heap::with_clock(config, Box::new(clock.clone()))
    }

    /// Allocate unrooted integers until the next cycle runs
    fn allocate_until_collection(heap: &mut Heap) -> ObjRef {
        let before = heap.stats().gc.collections_run;
        loop {
            let obj = heap.new_integer(0);
            if heap.stats().gc.collections_run > before {
                return obj;
            }
        }
    }

    #[test]
    fn test_triggers_past_threshold() {
        let clock = ManualClock::new();
        let mut heap = auto_heap(&clock);

        for _ in 0..4 {
            heap.new_integer(1);
        }
        assert_eq!(heap.stats().gc.collections_run, 0);

        let pending = heap.new_integer(2);
        assert_eq!(heap.stats().gc.collections_run, 1);
        assert_eq!(heap.stats().gc.objects_reclaimed, 4);
        assert!(heap.contains(pending), "object being allocated survives");
        assert_eq!(heap.int_value(pending), Ok(2));
        assert_eq!(heap.live_objects(), 1);
    }

    #[test]
    fn test_threshold_adapts_to_frequency() {
        let clock = ManualClock::new();
        let mut heap = auto_heap(&clock);
        let initial = heap.threshold();

        clock.advance(Duration::from_millis(5));
        allocate_until_collection(&mut heap);
        let raised = heap.threshold();
        assert_eq!(raised, (initial as f64 * GROW_FACTOR) as usize);

        clock.advance(Duration::from_secs(1));
        allocate_until_collection(&mut heap);
        let lowered = heap.threshold();
        assert_eq!(lowered, (raised as f64 / SHRINK_FACTOR) as usize);
    }

    #[test]
    fn test_explicit_collect_keeps_threshold() {
        let clock = ManualClock::new();
        let mut heap = auto_heap(&clock);
        let initial = heap.threshold();

        heap.new_nil();
        heap.collect();
        assert_eq!(heap.threshold(), initial);
    }

    #[test]
    fn test_live_set_past_ceiling_collects_rarely() {
        let clock = ManualClock::new();
        let config = HeapConfig::default()
            .with_threshold_bounds(1024, 2048)
            .with_initial_threshold(1024);
        let mut heap = Heap::with_clock(config, Box::new(clock));

        let list = heap.new_list();
        heap.add_root(list);
        for i in 0..2000 {
            let item = heap.new_integer(i);
            heap.list_push(list, item).unwrap();
        }

        assert_eq!(heap.list_len(list), Ok(2000));
        assert_eq!(heap.live_objects(), 2001);
        let collections = heap.stats().gc.collections_run;
        assert!(collections > 0);
        assert!(collections < 40, "ran {} collections", collections);
        assert!(heap.threshold() > 2048);
    }

    #[test]
    fn test_disabled_never_triggers() {
        let clock = ManualClock::new();
        let config = HeapConfig::default()
            .with_threshold_bounds(slot(), 1 << 30)
            .with_initial_threshold(slot())
            .with_auto_collect(false);
        let mut heap = Heap::with_clock(config, Box::new(clock));

        for i in 0..50 {
            heap.new_integer(i);
        }
        assert_eq!(heap.stats().gc.collections_run, 0);
        assert_eq!(heap.live_objects(), 50);
    }
}
