// ABOUTME: quote if lambda macro define progn quasiquote unquote — raw-argument builtins

use crate::env;
use crate::error::{ErrorKind, LispError, LResult};
use crate::eval::{self, get_args, Arg};
use crate::heap::ObjRef;
use crate::runtime::Runtime;
use crate::value::{EvalArgs, LambdaKind, Payload};

/// `(quote x)` → `x`, unevaluated. The special form, not the identically
/// named callable (open question (c)): since this builtin is registered
/// with raw argument evaluation, `x` is exactly the form the reader built.
fn quote(rt: &mut Runtime, _scope: ObjRef, args: &[ObjRef]) -> LResult {
    match get_args(&rt.heap, args, "*")?.remove(0) {
        Arg::Any(x) => Ok(x),
        _ => unreachable!(),
    }
}

/// `(if c t e)` → evaluates `c`; takes the `t` branch only when `c`
/// evaluates to a nonzero integer. Every other value — nil, a string, a
/// non-empty list — takes the `e` branch. This is narrower than general
/// truthiness and is preserved deliberately (see DESIGN.md).
fn if_form(rt: &mut Runtime, scope: ObjRef, args: &[ObjRef]) -> LResult {
    let parsed = get_args(&rt.heap, args, "***")?;
    let (cond, then_branch, else_branch) = match (&parsed[0], &parsed[1], &parsed[2]) {
        (Arg::Any(c), Arg::Any(t), Arg::Any(e)) => (*c, *t, *e),
        _ => unreachable!(),
    };
    let cond_val = eval::eval(rt, scope, cond)?;
    let truthy = matches!(rt.heap.get(cond_val), Payload::Int(n) if *n != 0);
    eval::eval(rt, scope, if truthy { then_branch } else { else_branch })
}

fn make_lambda(rt: &mut Runtime, scope: ObjRef, args: &[ObjRef], kind: LambdaKind) -> LResult {
    let parsed = get_args(&rt.heap, args, "lR")?;
    let (param_list, body) = match (&parsed[0], &parsed[1]) {
        (Arg::List(l), Arg::Rest(b)) => (*l, b.clone()),
        _ => unreachable!(),
    };

    let mut params = Vec::new();
    for p in rt.heap.list_to_vec(param_list) {
        match rt.heap.get(p) {
            Payload::Symbol(name) => params.push(name.clone()),
            other => {
                return Err(LispError::new(
                    ErrorKind::Type,
                    format!("argument names must be symbols, got {}", other.type_name()),
                ))
            }
        }
    }

    Ok(rt.heap.allocate(Payload::Lambda {
        params,
        body,
        scope,
        kind,
    }))
}

/// `(lambda (p…) body…)` → a function-kind closure over the current scope.
fn lambda(rt: &mut Runtime, scope: ObjRef, args: &[ObjRef]) -> LResult {
    make_lambda(rt, scope, args, LambdaKind::Function)
}

/// `(macro (p…) body…)` → a macro-kind closure; its result is re-evaluated
/// in the caller's scope (see `eval::apply`'s two-phase expansion).
fn macro_form(rt: &mut Runtime, scope: ObjRef, args: &[ObjRef]) -> LResult {
    make_lambda(rt, scope, args, LambdaKind::Macro)
}

/// `(define sym expr)` → evaluates `expr` in the current scope, binds
/// `sym` there, and returns the value.
fn define(rt: &mut Runtime, scope: ObjRef, args: &[ObjRef]) -> LResult {
    let parsed = get_args(&rt.heap, args, "s*")?;
    let (name, expr) = match (&parsed[0], &parsed[1]) {
        (Arg::Symbol(s), Arg::Any(e)) => (s.clone(), *e),
        _ => unreachable!(),
    };
    let value = eval::eval(rt, scope, expr)?;
    env::define(&mut rt.heap, scope, &name, value);
    Ok(value)
}

/// `(progn e…)` → evaluates each left to right, returning the last (or nil
/// if there were none). `parse_program` wraps a whole source file in this.
fn progn(rt: &mut Runtime, scope: ObjRef, args: &[ObjRef]) -> LResult {
    let mut result = rt.heap.nil();
    for &form in args {
        result = eval::eval(rt, scope, form)?;
    }
    Ok(result)
}

/// `(quasiquote x)` → `eval::quasiquote`.
fn quasiquote(rt: &mut Runtime, scope: ObjRef, args: &[ObjRef]) -> LResult {
    let x = match get_args(&rt.heap, args, "*")?.remove(0) {
        Arg::Any(x) => x,
        _ => unreachable!(),
    };
    eval::quasiquote(rt, scope, x)
}

/// `(unquote x)` → evaluates `x`. Outside a quasiquote template this is
/// just a plain eval of its argument.
fn unquote(rt: &mut Runtime, scope: ObjRef, args: &[ObjRef]) -> LResult {
    let x = match get_args(&rt.heap, args, "*")?.remove(0) {
        Arg::Any(x) => x,
        _ => unreachable!(),
    };
    eval::eval(rt, scope, x)
}

pub fn register(heap: &mut crate::heap::Heap, scope: ObjRef) {
    super::def(heap, scope, "quote", quote, EvalArgs::Raw);
    super::def(heap, scope, "if", if_form, EvalArgs::Raw);
    super::def(heap, scope, "lambda", lambda, EvalArgs::Raw);
    super::def(heap, scope, "macro", macro_form, EvalArgs::Raw);
    super::def(heap, scope, "define", define, EvalArgs::Raw);
    super::def(heap, scope, "progn", progn, EvalArgs::Raw);
    super::def(heap, scope, "quasiquote", quasiquote, EvalArgs::Raw);
    super::def(heap, scope, "unquote", unquote, EvalArgs::Raw);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Runtime;

    #[test]
    fn if_only_nonzero_int_is_true() {
        let mut rt = Runtime::new();
        let scope = rt.global_scope();
        let zero = rt.heap.allocate(Payload::Int(0));
        let forty_two = rt.heap.allocate(Payload::Int(42));
        let zero_lit = rt.heap.allocate(Payload::Int(0));
        let args = [zero, forty_two, zero_lit];
        let r = if_form(&mut rt, scope, &args).unwrap();
        assert!(matches!(rt.heap.get(r), Payload::Int(0)));
    }

    #[test]
    fn lambda_rejects_non_symbol_params() {
        let mut rt = Runtime::new();
        let scope = rt.global_scope();
        let not_symbol = rt.heap.allocate(Payload::Int(1));
        let param_list = rt.heap.cons(not_symbol, rt.heap.nil());
        let body = rt.heap.nil();
        let err = lambda(&mut rt, scope, &[param_list, body]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Type);
    }

    #[test]
    fn progn_empty_is_nil() {
        let mut rt = Runtime::new();
        let scope = rt.global_scope();
        let r = progn(&mut rt, scope, &[]).unwrap();
        assert!(rt.heap.is_nil(r));
    }
}
