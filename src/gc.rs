// ABOUTME: Mark-and-sweep collection over the heap's all-objects arena

use crate::heap::{Heap, Mark, ObjRef};
use std::collections::VecDeque;

/// Marks every value reachable from `roots`, then frees everything else.
/// Tri-state marking (`Unmarked`/`Queued`/`Marked`) keeps cyclic graphs —
/// recursive closures over scopes that hold them, scopes that hold
/// lambdas — from being enqueued twice.
pub fn mark_and_sweep(heap: &mut Heap, roots: &[ObjRef]) {
    mark(heap, roots);
    sweep(heap);
}

pub fn mark(heap: &mut Heap, roots: &[ObjRef]) {
    let mut queue: VecDeque<ObjRef> = VecDeque::new();
    for &root in roots {
        if heap.mark_of(root) == Mark::Unmarked {
            heap.set_mark(root, Mark::Queued);
            queue.push_back(root);
        }
    }

    while let Some(v) = queue.pop_front() {
        heap.set_mark(v, Mark::Marked);
        for child in heap.children(v) {
            if heap.mark_of(child) == Mark::Unmarked {
                heap.set_mark(child, Mark::Queued);
                queue.push_back(child);
            }
        }
    }
}

pub fn sweep(heap: &mut Heap) {
    heap.sweep_slots();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Payload;

    #[test]
    fn unreachable_values_are_freed() {
        let mut heap = Heap::new();
        let kept = heap.allocate(Payload::Int(1));
        let _garbage = heap.allocate(Payload::Int(2));
        let before = heap.live_count();
        mark_and_sweep(&mut heap, &[kept, heap.nil()]);
        assert!(heap.live_count() < before);
        assert_eq!(heap.live_count(), 2); // kept int + nil
    }

    #[test]
    fn cycles_survive_if_rooted() {
        let mut heap = Heap::new();
        // build a scope that refers to itself via a lambda closing over it
        let nil = heap.nil();
        let scope = heap.allocate(Payload::Scope {
            bindings: Default::default(),
            parent: None,
        });
        let lambda = heap.allocate(Payload::Lambda {
            params: vec![],
            body: vec![nil],
            scope,
            kind: crate::value::LambdaKind::Function,
        });
        if let Payload::Scope { bindings, .. } = heap.get_mut(scope) {
            bindings.insert("self".to_string(), lambda);
        }
        mark_and_sweep(&mut heap, &[scope]);
        assert_eq!(heap.live_count(), 3); // nil, scope, lambda
    }

    #[test]
    fn marks_reset_to_unmarked_after_sweep() {
        let mut heap = Heap::new();
        let kept = heap.allocate(Payload::Int(1));
        mark_and_sweep(&mut heap, &[kept, heap.nil()]);
        assert_eq!(heap.mark_of(kept), Mark::Unmarked);
        assert_eq!(heap.mark_of(heap.nil()), Mark::Unmarked);
    }

    #[test]
    fn unrooted_cycle_is_collected() {
        let mut heap = Heap::new();
        let nil = heap.nil();
        let scope_a = heap.allocate(Payload::Scope {
            bindings: Default::default(),
            parent: None,
        });
        let scope_b = heap.allocate(Payload::Scope {
            bindings: Default::default(),
            parent: Some(scope_a),
        });
        if let Payload::Scope { bindings, .. } = heap.get_mut(scope_a) {
            bindings.insert("b".to_string(), scope_b);
        }
        let before = heap.live_count();
        mark_and_sweep(&mut heap, &[nil]);
        assert!(heap.live_count() < before);
        assert_eq!(heap.live_count(), 1); // only nil survives
    }
}
