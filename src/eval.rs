// ABOUTME: The apply/eval mutual recursion, the call stack, and argument destructuring

use crate::error::{ErrorKind, LispError};
use crate::heap::{Heap, ObjRef};
use crate::runtime::Runtime;
use crate::value::{EvalArgs, LambdaKind, Payload};

/// One active call, kept for `dump-stack` diagnostics. The runtime's whole
/// stack is itself a GC root: a callable or argument reachable only through
/// an in-flight call must not be collected out from under it.
#[derive(Debug, Clone)]
pub struct Frame {
    pub callable: ObjRef,
    pub args: Vec<ObjRef>,
}

/// Evaluates `expr` against `scope`. Self-evaluating kinds return
/// unchanged; a symbol is looked up; a list form evaluates its head to a
/// callable, prepares the tail per that callable's evaluate-args flag, and
/// applies.
pub fn eval(rt: &mut Runtime, scope: ObjRef, expr: ObjRef) -> crate::error::LResult {
    match rt.heap.get(expr) {
        Payload::Int(_)
        | Payload::Str { .. }
        | Payload::Builtin { .. }
        | Payload::Lambda { .. }
        | Payload::Scope { .. }
        | Payload::Nil => Ok(expr),

        Payload::Symbol(name) => {
            let name = name.clone();
            crate::env::get(&rt.heap, scope, &name)
                .ok_or_else(|| LispError::new(ErrorKind::NotFound, format!("undefined symbol '{}'", name)))
        }

        Payload::Cons { left, right } => {
            let head = *left;
            let tail = *right;
            let callable = eval(rt, scope, head)?;
            let raw_args = rt.heap.list_to_vec(tail);
            let args = match eval_args_flag(&rt.heap, callable) {
                EvalArgs::Pre => raw_args
                    .iter()
                    .map(|&a| eval(rt, scope, a))
                    .collect::<Result<Vec<_>, _>>()?,
                EvalArgs::Raw => raw_args,
            };
            apply(rt, scope, callable, &args)
        }
    }
}

/// Which evaluate-args policy a callable was defined with: builtins carry
/// the flag directly, a lambda's policy follows from its kind.
fn eval_args_flag(heap: &Heap, callable: ObjRef) -> EvalArgs {
    match heap.get(callable) {
        Payload::Builtin { eval_args, .. } => *eval_args,
        Payload::Lambda {
            kind: LambdaKind::Function,
            ..
        } => EvalArgs::Pre,
        Payload::Lambda {
            kind: LambdaKind::Macro,
            ..
        } => EvalArgs::Raw,
        _ => EvalArgs::Pre,
    }
}

/// Invokes `callable` with `args`, which are already prepared (evaluated or
/// not, per the caller's choice) — `apply` itself never evaluates an
/// argument. Every call pushes a frame on entry and pops it on every exit
/// path, including error returns.
pub fn apply(
    rt: &mut Runtime,
    scope: ObjRef,
    callable: ObjRef,
    args: &[ObjRef],
) -> crate::error::LResult {
    rt.push_frame(Frame {
        callable,
        args: args.to_vec(),
    });
    let result = apply_inner(rt, scope, callable, args);
    rt.pop_frame();
    result
}

fn apply_inner(
    rt: &mut Runtime,
    scope: ObjRef,
    callable: ObjRef,
    args: &[ObjRef],
) -> crate::error::LResult {
    match rt.heap.get(callable) {
        Payload::Builtin { func, .. } => {
            let func = *func;
            func(rt, scope, args)
        }
        Payload::Lambda {
            params,
            body,
            scope: closure_scope,
            kind,
        } => {
            let params = params.clone();
            let body = body.clone();
            let closure_scope = closure_scope;
            let kind = *kind;

            if args.len() < params.len() {
                return Err(LispError::new(
                    ErrorKind::TooFew,
                    format!("expected {} argument(s), got {}", params.len(), args.len()),
                ));
            }
            if args.len() > params.len() {
                return Err(LispError::new(
                    ErrorKind::TooMany,
                    format!("expected {} argument(s), got {}", params.len(), args.len()),
                ));
            }

            let call_scope = crate::env::new_scope(&mut rt.heap, Some(closure_scope));
            for (param, &arg) in params.iter().zip(args.iter()) {
                crate::env::define(&mut rt.heap, call_scope, param, arg);
            }

            let mut result = rt.heap.nil();
            for form in &body {
                result = eval(rt, call_scope, *form)?;
            }

            match kind {
                LambdaKind::Function => Ok(result),
                // Two-phase expansion: the macro body's result is itself
                // evaluated, in the *caller's* scope, not the macro's closure.
                LambdaKind::Macro => eval(rt, scope, result),
            }
        }
        other => Err(LispError::new(
            ErrorKind::Error,
            format!("value of type '{}' is not callable", other.type_name()),
        )),
    }
}

/// Recursively copies `x`, replacing every `(unquote y)` sub-form with
/// `eval(y)`; atoms and nil pass through unchanged. Nested `quasiquote` is
/// not specially tracked — it is just another sub-list that gets copied and
/// descended into like any other.
pub fn quasiquote(rt: &mut Runtime, scope: ObjRef, v: ObjRef) -> crate::error::LResult {
    match rt.heap.get(v) {
        Payload::Cons { left, right } => {
            let left = *left;
            let right = *right;
            if let Payload::Symbol(name) = rt.heap.get(left) {
                if name == "unquote" {
                    return eval(rt, scope, v);
                }
            }
            let new_left = quasiquote(rt, scope, left)?;
            let new_right = quasiquote(rt, scope, right)?;
            Ok(rt.heap.cons(new_left, new_right))
        }
        _ => Ok(v),
    }
}

/// A single argument destructured per the argument-spec mini-language.
#[derive(Debug, Clone)]
pub enum Arg {
    Int(i64),
    Symbol(String),
    Str(Vec<u8>),
    /// A list argument, kept as its head `ObjRef` (may be nil) so callers
    /// can walk it with `car`/`cdr` semantics rather than a pre-flattened copy.
    List(ObjRef),
    Any(ObjRef),
    Rest(Vec<ObjRef>),
}

/// Destructures `args` against `spec`, a string over `i s S l d * R` (see
/// module docs on the mini-language). `R`, if present, must be last and
/// consumes everything remaining, including zero elements.
pub fn get_args(heap: &Heap, args: &[ObjRef], spec: &str) -> Result<Vec<Arg>, LispError> {
    let chars: Vec<char> = spec.chars().collect();
    let required = chars.iter().filter(|&&c| c != 'R').count();
    let mut out = Vec::with_capacity(chars.len());
    let mut idx = 0;

    for (pos, &c) in chars.iter().enumerate() {
        if c == 'R' {
            assert!(pos == chars.len() - 1, "'R' must be the last argument-spec character");
            out.push(Arg::Rest(args[idx..].to_vec()));
            idx = args.len();
            break;
        }

        let a = *args.get(idx).ok_or_else(|| {
            LispError::new(
                ErrorKind::TooFew,
                format!("expected at least {} argument(s), got {}", required, args.len()),
            )
        })?;

        out.push(match c {
            'i' | 'd' => match heap.get(a) {
                Payload::Int(n) => Arg::Int(*n),
                other => return Err(type_error("integer", other)),
            },
            's' => match heap.get(a) {
                Payload::Symbol(s) => Arg::Symbol(s.clone()),
                other => return Err(type_error("symbol", other)),
            },
            'S' => match heap.get(a) {
                Payload::Str { bytes } => Arg::Str(bytes.clone()),
                other => return Err(type_error("string", other)),
            },
            'l' => match heap.get(a) {
                Payload::Cons { .. } | Payload::Nil => Arg::List(a),
                other => return Err(type_error("list", other)),
            },
            '*' => Arg::Any(a),
            other => panic!("unknown argument-spec character '{}'", other),
        });
        idx += 1;
    }

    if idx < args.len() {
        return Err(LispError::new(
            ErrorKind::TooMany,
            format!("expected {} argument(s), got {}", required, args.len()),
        ));
    }

    Ok(out)
}

fn type_error(expected: &str, got: &Payload) -> LispError {
    LispError::new(
        ErrorKind::Type,
        format!("expected {} argument, got {}", expected, got.type_name()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env;
    use crate::runtime::Runtime;

    #[test]
    fn self_evaluating_int_returns_itself() {
        let mut rt = Runtime::new();
        let scope = rt.global_scope();
        let one = rt.heap.allocate(Payload::Int(1));
        assert_eq!(eval(&mut rt, scope, one).unwrap(), one);
    }

    #[test]
    fn symbol_lookup_succeeds_and_fails() {
        let mut rt = Runtime::new();
        let scope = rt.global_scope();
        let v = rt.heap.allocate(Payload::Int(9));
        env::define(&mut rt.heap, scope, "x", v);
        let sym = rt.heap.allocate(Payload::Symbol("x".to_string()));
        assert_eq!(eval(&mut rt, scope, sym).unwrap(), v);

        let missing = rt.heap.allocate(Payload::Symbol("nope".to_string()));
        let err = eval(&mut rt, scope, missing).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[test]
    fn get_args_rejects_wrong_type() {
        let mut heap = Heap::new();
        let sym = heap.allocate(Payload::Symbol("x".to_string()));
        let err = get_args(&heap, &[sym], "i").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Type);
    }

    #[test]
    fn get_args_rest_absorbs_remainder() {
        let mut heap = Heap::new();
        let a = heap.allocate(Payload::Int(1));
        let b = heap.allocate(Payload::Int(2));
        let c = heap.allocate(Payload::Int(3));
        let parsed = get_args(&heap, &[a, b, c], "iR").unwrap();
        match (&parsed[0], &parsed[1]) {
            (Arg::Int(1), Arg::Rest(rest)) => assert_eq!(rest, &vec![b, c]),
            _ => panic!("unexpected parse"),
        }
    }

    #[test]
    fn get_args_too_few_and_too_many() {
        let mut heap = Heap::new();
        let a = heap.allocate(Payload::Int(1));
        assert_eq!(get_args(&heap, &[], "i").unwrap_err().kind, ErrorKind::TooFew);
        assert_eq!(
            get_args(&heap, &[a, a], "i").unwrap_err().kind,
            ErrorKind::TooMany
        );
    }
}
