//! Heap - the only place objects are created and destroyed
//!
//! Design: Explicit context object owned by the embedder:
//! - Arena slots hold each object plus its mark bit
//! - A registry lists live objects in allocation order (sweep order)
//! - A root set anchors what must survive collection
//! - One finalizer releases foreign resources on reclamation
//!
//! Handles returned by the factories are only guaranteed to survive a
//! collection if they are reachable from a root. Any allocation may trigger
//! a collection; the object being allocated is registered after that cycle
//! and always survives it.

mod access;
mod config;


pub use config::{
    HeapConfig, COLLECT_SPACING, GROW_FACTOR, INITIAL_THRESHOLD, MAX_THRESHOLD, MIN_THRESHOLD,
    SHRINK_FACTOR,
};

use crate::allocator::{Allocator, AllocatorStats};
use crate::gc::{self, Clock, GcStats, RootSet, SystemClock, Threshold};
use crate::logging::{debug, log_heap_teardown, perf, trace, warn};
use crate::objects::{ForeignPointer, List, Map, ObjRef, Object, ObjectType};
use crate::scope::Scope;

/// Callback releasing the resource behind a reclaimed foreign pointer
///
/// It receives only the pointer, so it cannot reach back into the heap.
pub type Finalizer = Box<dyn FnMut(&mut ForeignPointer)>;

fn noop_finalizer() -> Finalizer {
    Box::new(|_| {})
}

/// Arena slot contents: the object and its mark bit
#[derive(Debug)]
pub struct HeapCell {
    pub(crate) object: Object,
    /// Only true between mark and sweep of a running cycle
    pub(crate) marked: bool,
}

impl HeapCell {
    fn new(object: Object) -> Self {
        Self { object, marked: false }
    }
}

pub struct Heap {
    pub(crate) allocator: Allocator<HeapCell>,
    pub(crate) registry: Vec<ObjRef>,
    pub(crate) roots: RootSet,
    pub(crate) finalizer: Finalizer,
    pub(crate) threshold: Threshold,
    pub(crate) gc_stats: GcStats,
    config: HeapConfig,
}

impl Heap {
    pub fn new() -> Self {
        Self::with_config(HeapConfig::default())
    }

    pub fn with_config(config: HeapConfig) -> Self {
        Self::with_clock(config, Box::new(SystemClock))
    }

    /// Heap whose threshold heuristic reads time from `clock`
    pub fn with_clock(config: HeapConfig, clock: Box<dyn Clock>) -> Self {
        debug!(
            block_bytes = config.block_bytes,
            threshold = config.initial_threshold,
            auto_collect = config.auto_collect,
            "Heap initialized"
        );

        Self {
            allocator: Allocator::with_block_bytes(config.block_bytes),
            registry: Vec::new(),
            roots: RootSet::new(),
            finalizer: noop_finalizer(),
            threshold: Threshold::new(&config, clock),
            gc_stats: GcStats::default(),
            config,
        }
    }

    pub fn config(&self) -> &HeapConfig {
        &self.config
    }

    // ===== Factories =====

    pub fn new_nil(&mut self) -> ObjRef {
        self.allocate(Object::Nil)
    }

    pub fn new_integer(&mut self, value: i64) -> ObjRef {
        self.allocate(Object::Integer(value))
    }

    pub fn new_real(&mut self, value: f64) -> ObjRef {
        self.allocate(Object::Real(value))
    }

    pub fn new_string(&mut self, value: impl Into<String>) -> ObjRef {
        self.allocate(Object::String(value.into()))
    }

    /// Empty foreign pointer; attach the resource through `pointer_mut`
    pub fn new_pointer(&mut self, tag: usize) -> ObjRef {
        self.allocate(Object::Pointer(ForeignPointer::new(tag)))
    }

    pub fn new_list(&mut self) -> ObjRef {
        self.allocate(Object::List(List::new()))
    }

    pub fn new_map(&mut self) -> ObjRef {
        self.allocate(Object::Map(Map::new()))
    }

    /// New scope; a `parent` that is not a live scope is dropped with a warning
    pub fn new_scope(&mut self, parent: Option<ObjRef>) -> ObjRef {
        let parent = parent.filter(|&p| match self.scope(p) {
            Ok(_) => true,
            Err(err) => {
                warn!(parent = %p, error = %err, "ignoring invalid parent scope");
                false
            }
        });
        self.allocate(Object::Scope(Scope::new(parent)))
    }

    fn allocate(&mut self, object: Object) -> ObjRef {
        let kind = object.object_type();
        let obj = ObjRef::from_slot(self.allocator.alloc(HeapCell::new(object)));

        // The new object is not registered yet, so this cycle cannot sweep it
        if self.config.auto_collect {
            self.maybe_collect();
        }

        self.registry.push(obj);
        trace!(object = %obj, kind = %kind, "object created");
        obj
    }

    // ===== Roots =====

    /// Anchor an object; returns false if it already was a root
    pub fn add_root(&mut self, obj: ObjRef) -> bool {
        self.roots.add(obj)
    }

    /// Release an anchor; returns false if it was not a root
    pub fn remove_root(&mut self, obj: ObjRef) -> bool {
        self.roots.remove(obj)
    }

    pub fn is_root(&self, obj: ObjRef) -> bool {
        self.roots.contains(obj)
    }

    // ===== Finalizer =====

    /// Install the foreign pointer finalizer; `None` restores the no-op default
    pub fn set_finalizer(&mut self, finalizer: Option<Finalizer>) {
        self.finalizer = finalizer.unwrap_or_else(noop_finalizer);
    }

    // ===== Diagnostics =====

    /// Objects currently registered
    #[inline]
    pub fn live_objects(&self) -> usize {
        self.registry.len()
    }

    /// Logical arena bytes held by live objects
    #[inline]
    pub fn arena_bytes_in_use(&self) -> usize {
        self.allocator.bytes_in_use()
    }

    /// Current automatic collection trigger in bytes
    #[inline]
    pub fn threshold(&self) -> usize {
        self.threshold.current()
    }

    /// Registered objects in allocation order
    pub fn objects(&self) -> impl Iterator<Item = ObjRef> + '_ {
        self.registry.iter().copied()
    }

    pub fn stats(&self) -> HeapStats {
        HeapStats {
            live_objects: self.registry.len(),
            roots: self.roots.len(),
            allocator: self.allocator.stats(),
            gc: GcStats {
                threshold: self.threshold.current(),
                ..self.gc_stats
            },
        }
    }

    // ===== Teardown =====

    /// Destroy every registered object regardless of reachability
    ///
    /// Foreign pointers are finalized exactly as during a sweep. Returns the
    /// number of objects destroyed. The heap stays usable afterwards.
    pub fn clear(&mut self) -> usize {
        let _guard = perf::track("heap_clear");
        let registry = std::mem::take(&mut self.registry);
        let mut destroyed = 0;

        for obj in registry {
            if let Some(kind) = gc::destroy(&mut self.allocator, obj, &mut self.finalizer) {
                destroyed += 1;
                if kind == ObjectType::Pointer {
                    self.gc_stats.finalizers_run += 1;
                }
            }
        }

        self.roots.clear();
        log_heap_teardown(destroyed);
        destroyed
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Heap {
    fn drop(&mut self) {
        if !self.registry.is_empty() {
            self.clear();
        }
    }
}

/// Snapshot of heap state for monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapStats {
    pub live_objects: usize,
    pub roots: usize,
    pub allocator: AllocatorStats,
    pub gc: GcStats,
}
