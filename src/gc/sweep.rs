//! Sweep phase - reclaim everything the mark phase did not reach
//!
//! Visits the registry once in allocation order. Survivors have their mark
//! cleared; the rest are unregistered and destroyed. Destruction is shared
//! with heap teardown so foreign pointers are finalized on both paths.

use crate::allocator::Allocator;
use crate::heap::{Finalizer, HeapCell};
use crate::logging::trace;
use crate::objects::{ObjRef, Object, ObjectType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SweepOutcome {
    pub reclaimed: usize,
    pub bytes: usize,
    pub finalized: usize,
}

pub(crate) fn sweep(
    cells: &mut Allocator<HeapCell>,
    registry: &mut Vec<ObjRef>,
    finalizer: &mut Finalizer,
) -> SweepOutcome {
    let mut outcome = SweepOutcome::default();

    registry.retain(|&obj| {
        let survived = match cells.get_mut(obj.slot()) {
            Some(cell) => std::mem::replace(&mut cell.marked, false),
            None => return false,
        };
        if survived {
            return true;
        }

        if let Some(object_type) = destroy(cells, obj, finalizer) {
            outcome.reclaimed += 1;
            outcome.bytes += Allocator::<HeapCell>::slot_bytes();
            if object_type == ObjectType::Pointer {
                outcome.finalized += 1;
            }
        }
        false
    });

    outcome
}

/// Release one object: take it out of its slot, finalize foreign pointers
///
/// Returns the type of the destroyed object, or None if the slot was empty.
pub(crate) fn destroy(
    cells: &mut Allocator<HeapCell>,
    obj: ObjRef,
    finalizer: &mut Finalizer,
) -> Option<ObjectType> {
    let cell = cells.free(obj.slot())?;
    let object_type = cell.object.object_type();

    if let Object::Pointer(mut pointer) = cell.object {
        finalizer(&mut pointer);
        pointer.clear();
    }

    trace!(object = %obj, kind = %object_type, "object destroyed");
    Some(object_type)
}
