// ABOUTME: Registration entry point for the fixed set of core primitives

use crate::env;
use crate::heap::{Heap, ObjRef};
use crate::value::{BuiltinFn, EvalArgs, Payload};

pub mod arithmetic;
pub mod comparison;
pub mod control;
pub mod lists;
pub mod predicates;
pub mod special_forms;

/// Allocates a builtin and binds it under `name` in `scope`.
fn def(heap: &mut Heap, scope: ObjRef, name: &'static str, func: BuiltinFn, eval_args: EvalArgs) {
    let builtin = heap.allocate(Payload::Builtin { func, name, eval_args });
    env::define(heap, scope, name, builtin);
}

/// Populates `scope` with every primitive this spec fixes the semantics of:
/// the special forms, the arithmetic/comparison/list operators, and the
/// handful of control builtins (`eval`, `map`, `reduce`, `print`,
/// `dump-stack`). Mirrors `lisp_scope_populate_builtins` in the original.
pub fn register_all(heap: &mut Heap, scope: ObjRef) {
    special_forms::register(heap, scope);
    arithmetic::register(heap, scope);
    comparison::register(heap, scope);
    predicates::register(heap, scope);
    lists::register(heap, scope);
    control::register(heap, scope);
}
