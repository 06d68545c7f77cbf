// ABOUTME: null? and eq? — the type/identity predicates

use crate::error::LResult;
use crate::eval::{get_args, Arg};
use crate::heap::ObjRef;
use crate::runtime::Runtime;
use crate::value::{EvalArgs, Payload};

/// `1` if the argument is nil, else `0`.
fn null_p(rt: &mut Runtime, _scope: ObjRef, args: &[ObjRef]) -> LResult {
    let v = match get_args(&rt.heap, args, "*")?.remove(0) {
        Arg::Any(v) => v,
        _ => unreachable!(),
    };
    let is_nil = rt.heap.is_nil(v) as i64;
    Ok(rt.heap.allocate(Payload::Int(is_nil)))
}

/// Object-identity equality: `1` if both arguments are the same heap
/// object, else `0`. Distinct from structural equality.
fn eq_p(rt: &mut Runtime, _scope: ObjRef, args: &[ObjRef]) -> LResult {
    let parsed = get_args(&rt.heap, args, "**")?;
    let (a, b) = match (&parsed[0], &parsed[1]) {
        (Arg::Any(a), Arg::Any(b)) => (*a, *b),
        _ => unreachable!(),
    };
    let identical = rt.heap.identical(a, b) as i64;
    Ok(rt.heap.allocate(Payload::Int(identical)))
}

pub fn register(heap: &mut crate::heap::Heap, scope: ObjRef) {
    super::def(heap, scope, "null?", null_p, EvalArgs::Pre);
    super::def(heap, scope, "eq?", eq_p, EvalArgs::Pre);
}
