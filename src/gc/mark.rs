//! Mark phase - breadth-first reachability from the roots
//!
//! Edges: scope bindings and parent, list elements, map keys and values.
//! Handles whose slot is already empty are skipped.

use std::collections::VecDeque;

use crate::allocator::Allocator;
use crate::heap::HeapCell;
use crate::logging::trace;
use super::roots::RootSet;

/// Mark everything reachable from `roots`, returning the number marked
pub(crate) fn mark(cells: &mut Allocator<HeapCell>, roots: &RootSet) -> usize {
    let mut queue: VecDeque<_> = roots.iter().collect();
    let mut marked = 0;

    while let Some(obj) = queue.pop_front() {
        match cells.get_mut(obj.slot()) {
            Some(cell) if !cell.marked => cell.marked = true,
            Some(_) => continue,
            None => {
                trace!(object = %obj, "skipping reclaimed object during mark");
                continue;
            }
        }
        marked += 1;

        if let Some(cell) = cells.get(obj.slot()) {
            cell.object.for_each_edge(|edge| {
                if cells.get(edge.slot()).is_some_and(|target| !target.marked) {
                    queue.push_back(edge);
                }
            });
        }
    }

    marked
}
