// ABOUTME: car, cdr, cons — the cons-cell primitives

use crate::error::{ErrorKind, LispError, LResult};
use crate::eval::{get_args, Arg};
use crate::heap::ObjRef;
use crate::runtime::Runtime;
use crate::value::{EvalArgs, Payload};

/// Head of a non-nil list. `car` of nil raises `error`.
fn car(rt: &mut Runtime, _scope: ObjRef, args: &[ObjRef]) -> LResult {
    let list = match get_args(&rt.heap, args, "l")?.remove(0) {
        Arg::List(l) => l,
        _ => unreachable!(),
    };
    match rt.heap.get(list) {
        Payload::Cons { left, .. } => Ok(*left),
        Payload::Nil => Err(LispError::new(ErrorKind::Error, "car of nil")),
        _ => unreachable!("get_args already validated this as a list"),
    }
}

/// Tail of a non-nil list. `cdr` of nil is nil.
fn cdr(rt: &mut Runtime, _scope: ObjRef, args: &[ObjRef]) -> LResult {
    let list = match get_args(&rt.heap, args, "l")?.remove(0) {
        Arg::List(l) => l,
        _ => unreachable!(),
    };
    match rt.heap.get(list) {
        Payload::Cons { right, .. } => Ok(*right),
        Payload::Nil => Ok(rt.heap.nil()),
        _ => unreachable!("get_args already validated this as a list"),
    }
}

/// Allocates a new cell with `left=a`, `right=d`.
fn cons(rt: &mut Runtime, _scope: ObjRef, args: &[ObjRef]) -> LResult {
    let parsed = get_args(&rt.heap, args, "**")?;
    let (a, d) = match (&parsed[0], &parsed[1]) {
        (Arg::Any(a), Arg::Any(d)) => (*a, *d),
        _ => unreachable!(),
    };
    Ok(rt.heap.cons(a, d))
}

pub fn register(heap: &mut crate::heap::Heap, scope: ObjRef) {
    super::def(heap, scope, "car", car, EvalArgs::Pre);
    super::def(heap, scope, "cdr", cdr, EvalArgs::Pre);
    super::def(heap, scope, "cons", cons, EvalArgs::Pre);
}
