//! scopegc - arena-backed mark-and-sweep heap with a scope chain
//!
//! A small object runtime for embedding: values are allocated from bump
//! arenas, kept alive by reachability from an explicit root set, and
//! reclaimed by a synchronous mark-and-sweep collector whose trigger adapts
//! to how often it fires. Foreign resources can ride on heap objects and
//! are released through a finalizer when those objects die.
//!
//! ```
//! use scopegc::{Heap, HeapConfig};
//!
//! let mut heap = Heap::with_config(HeapConfig::default());
//! let global = heap.new_scope(None);
//! heap.add_root(global);
//!
//! heap.define_int(global, "answer", 42).unwrap();
//! let temp = heap.new_string("unreachable");
//!
//! heap.collect();
//! assert_eq!(heap.get_int(global, "answer"), 42);
//! assert!(!heap.contains(temp));
//! ```

pub mod allocator;
pub mod error;
pub mod gc;
pub mod heap;
pub mod logging;
pub mod objects;
pub mod scope;

// Re-export core types
pub use error::{HeapError, HeapResult};
pub use gc::{Clock, CollectionReport, GcStats, ManualClock, SystemClock};
pub use heap::{Finalizer, Heap, HeapConfig, HeapStats};
pub use objects::{ForeignHandle, ForeignPointer, List, Map, MapKey, ObjRef, Object, ObjectType};
pub use scope::Scope;
