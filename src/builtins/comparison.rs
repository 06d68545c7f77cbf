// ABOUTME: Relational operators: == = < <= > >=, all on two ints

use crate::error::LResult;
use crate::eval::{get_args, Arg};
use crate::heap::ObjRef;
use crate::runtime::Runtime;
use crate::value::{EvalArgs, Payload};

fn cmp(rt: &mut Runtime, args: &[ObjRef], op: fn(i64, i64) -> bool) -> LResult {
    let parsed = get_args(&rt.heap, args, "dd")?;
    let (a, b) = match (&parsed[0], &parsed[1]) {
        (Arg::Int(a), Arg::Int(b)) => (*a, *b),
        _ => unreachable!(),
    };
    Ok(rt.heap.allocate(Payload::Int(op(a, b) as i64)))
}

fn eq(rt: &mut Runtime, _scope: ObjRef, args: &[ObjRef]) -> LResult {
    cmp(rt, args, |a, b| a == b)
}
fn lt(rt: &mut Runtime, _scope: ObjRef, args: &[ObjRef]) -> LResult {
    cmp(rt, args, |a, b| a < b)
}
fn le(rt: &mut Runtime, _scope: ObjRef, args: &[ObjRef]) -> LResult {
    cmp(rt, args, |a, b| a <= b)
}
fn gt(rt: &mut Runtime, _scope: ObjRef, args: &[ObjRef]) -> LResult {
    cmp(rt, args, |a, b| a > b)
}
fn ge(rt: &mut Runtime, _scope: ObjRef, args: &[ObjRef]) -> LResult {
    cmp(rt, args, |a, b| a >= b)
}

pub fn register(heap: &mut crate::heap::Heap, scope: ObjRef) {
    super::def(heap, scope, "==", eq, EvalArgs::Pre);
    super::def(heap, scope, "=", eq, EvalArgs::Pre);
    super::def(heap, scope, "<", lt, EvalArgs::Pre);
    super::def(heap, scope, "<=", le, EvalArgs::Pre);
    super::def(heap, scope, ">", gt, EvalArgs::Pre);
    super::def(heap, scope, ">=", ge, EvalArgs::Pre);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Runtime;

    #[test]
    fn less_than_returns_one_or_zero() {
        let mut rt = Runtime::new();
        let scope = rt.global_scope();
        let one = rt.heap.allocate(Payload::Int(1));
        let two = rt.heap.allocate(Payload::Int(2));
        let r = lt(&mut rt, scope, &[one, two]).unwrap();
        assert!(matches!(rt.heap.get(r), Payload::Int(1)));
        let r = lt(&mut rt, scope, &[two, one]).unwrap();
        assert!(matches!(rt.heap.get(r), Payload::Int(0)));
    }
}
