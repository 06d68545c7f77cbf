// ABOUTME: Arithmetic operators: +, -, *, /

use crate::error::{ErrorKind, LispError, LResult};
use crate::eval::{get_args, Arg};
use crate::heap::ObjRef;
use crate::runtime::Runtime;
use crate::value::{EvalArgs, Payload};

/// Sum of zero or more ints. Identity `0`. Wraps on overflow, matching
/// funlisp's C `int` arithmetic rather than panicking.
fn plus(rt: &mut Runtime, _scope: ObjRef, args: &[ObjRef]) -> LResult {
    let mut sum: i64 = 0;
    for &a in args {
        match rt.heap.get(a) {
            Payload::Int(n) => sum = sum.wrapping_add(*n),
            other => {
                return Err(LispError::new(
                    ErrorKind::Type,
                    format!("expect integers for addition, got {}", other.type_name()),
                ))
            }
        }
    }
    Ok(rt.heap.allocate(Payload::Int(sum)))
}

/// Unary negation for one argument; left-fold subtraction otherwise. At
/// least one argument is required.
fn minus(rt: &mut Runtime, _scope: ObjRef, args: &[ObjRef]) -> LResult {
    if args.is_empty() {
        return Err(LispError::new(ErrorKind::TooFew, "-: expected at least one argument"));
    }
    let first = as_int(rt, args[0])?;
    if args.len() == 1 {
        return Ok(rt.heap.allocate(Payload::Int(first.wrapping_neg())));
    }
    let mut result = first;
    for &a in &args[1..] {
        result = result.wrapping_sub(as_int(rt, a)?);
    }
    Ok(rt.heap.allocate(Payload::Int(result)))
}

/// Product of zero or more ints. Identity `1`. Wraps on overflow, matching
/// funlisp's C `int` arithmetic rather than panicking.
fn times(rt: &mut Runtime, _scope: ObjRef, args: &[ObjRef]) -> LResult {
    let mut product: i64 = 1;
    for &a in args {
        match rt.heap.get(a) {
            Payload::Int(n) => product = product.wrapping_mul(*n),
            other => {
                return Err(LispError::new(
                    ErrorKind::Type,
                    format!("expect integers for multiplication, got {}", other.type_name()),
                ))
            }
        }
    }
    Ok(rt.heap.allocate(Payload::Int(product)))
}

/// Left-fold division. At least one argument required; a zero divisor
/// raises `error`.
fn divide(rt: &mut Runtime, _scope: ObjRef, args: &[ObjRef]) -> LResult {
    if args.is_empty() {
        return Err(LispError::new(ErrorKind::TooFew, "/: expected at least one argument"));
    }
    let mut result = as_int(rt, args[0])?;
    for &a in &args[1..] {
        let divisor = as_int(rt, a)?;
        if divisor == 0 {
            return Err(LispError::new(ErrorKind::Error, "divide by zero"));
        }
        result = result.wrapping_div(divisor);
    }
    Ok(rt.heap.allocate(Payload::Int(result)))
}

fn as_int(rt: &Runtime, r: ObjRef) -> Result<i64, LispError> {
    match get_args(&rt.heap, &[r], "i")?.remove(0) {
        Arg::Int(n) => Ok(n),
        _ => unreachable!(),
    }
}

pub fn register(heap: &mut crate::heap::Heap, scope: ObjRef) {
    super::def(heap, scope, "+", plus, EvalArgs::Pre);
    super::def(heap, scope, "-", minus, EvalArgs::Pre);
    super::def(heap, scope, "*", times, EvalArgs::Pre);
    super::def(heap, scope, "/", divide, EvalArgs::Pre);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Runtime;

    fn int(rt: &mut Runtime, n: i64) -> ObjRef {
        rt.heap.allocate(Payload::Int(n))
    }

    #[test]
    fn plus_sums_and_defaults_to_zero() {
        let mut rt = Runtime::new();
        let scope = rt.global_scope();
        let a = int(&mut rt, 1);
        let b = int(&mut rt, 2);
        let r = plus(&mut rt, scope, &[a, b]).unwrap();
        assert!(matches!(rt.heap.get(r), Payload::Int(3)));
        let empty = plus(&mut rt, scope, &[]).unwrap();
        assert!(matches!(rt.heap.get(empty), Payload::Int(0)));
    }

    #[test]
    fn minus_negates_single_arg() {
        let mut rt = Runtime::new();
        let scope = rt.global_scope();
        let five = int(&mut rt, 5);
        let r = minus(&mut rt, scope, &[five]).unwrap();
        assert!(matches!(rt.heap.get(r), Payload::Int(-5)));
    }

    #[test]
    fn minus_requires_an_argument() {
        let mut rt = Runtime::new();
        let scope = rt.global_scope();
        let err = minus(&mut rt, scope, &[]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TooFew);
    }

    #[test]
    fn divide_by_zero_errors() {
        let mut rt = Runtime::new();
        let scope = rt.global_scope();
        let ten = int(&mut rt, 10);
        let zero = int(&mut rt, 0);
        let err = divide(&mut rt, scope, &[ten, zero]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Error);
    }

    #[test]
    fn plus_and_times_wrap_on_overflow_instead_of_panicking() {
        let mut rt = Runtime::new();
        let scope = rt.global_scope();
        let max = int(&mut rt, i64::MAX);
        let one = int(&mut rt, 1);
        let r = plus(&mut rt, scope, &[max, one]).unwrap();
        assert!(matches!(rt.heap.get(r), Payload::Int(n) if *n == i64::MIN));

        let big = int(&mut rt, 9_999_999_999);
        let r = times(&mut rt, scope, &[big, big]).unwrap();
        assert!(matches!(
            rt.heap.get(r),
            Payload::Int(n) if *n == 9_999_999_999i64.wrapping_mul(9_999_999_999)
        ));
    }

    #[test]
    fn minus_negates_i64_min_without_panicking() {
        let mut rt = Runtime::new();
        let scope = rt.global_scope();
        let min = int(&mut rt, i64::MIN);
        let r = minus(&mut rt, scope, &[min]).unwrap();
        assert!(matches!(rt.heap.get(r), Payload::Int(n) if *n == i64::MIN));
    }
}
