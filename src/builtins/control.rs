// ABOUTME: eval, map, reduce, print, dump-stack

use crate::error::{ErrorKind, LispError, LResult};
use crate::eval::{self, get_args, Arg};
use crate::heap::ObjRef;
use crate::runtime::Runtime;
use crate::value::{EvalArgs, Payload};

/// Evaluates its single (already-evaluated) argument again, in the
/// caller's scope — so `(eval '(+ 1 2))` evaluates the quoted form.
fn eval_builtin(rt: &mut Runtime, scope: ObjRef, args: &[ObjRef]) -> LResult {
    let v = match get_args(&rt.heap, args, "*")?.remove(0) {
        Arg::Any(v) => v,
        _ => unreachable!(),
    };
    eval::eval(rt, scope, v)
}

/// Applies `f` positionally to the *left* elements of each list, advancing
/// every list by one cell per iteration, stopping as soon as any list is
/// exhausted. Requires at least one list besides `f`.
fn map_builtin(rt: &mut Runtime, scope: ObjRef, args: &[ObjRef]) -> LResult {
    if args.len() < 2 {
        return Err(LispError::new(ErrorKind::TooFew, "map: need at least two arguments"));
    }
    let f = args[0];
    let mut lists: Vec<ObjRef> = args[1..].to_vec();
    let mut results = Vec::new();

    loop {
        if lists.iter().any(|&l| rt.heap.is_nil(l)) {
            break;
        }
        let mut call_args = Vec::with_capacity(lists.len());
        for &l in &lists {
            match rt.heap.get(l) {
                Payload::Cons { left, .. } => call_args.push(*left),
                other => {
                    return Err(LispError::new(
                        ErrorKind::Type,
                        format!("map: expected a list argument, got {}", other.type_name()),
                    ))
                }
            }
        }
        results.push(eval::apply(rt, scope, f, &call_args)?);
        for l in lists.iter_mut() {
            match rt.heap.get(*l) {
                Payload::Cons { right, .. } => *l = *right,
                _ => unreachable!(),
            }
        }
    }

    Ok(rt.heap.vec_to_list(&results))
}

/// `(reduce f xs)` (2-form, `len(xs) >= 2`, first element seeds the fold)
/// or `(reduce f init xs)` (3-form, `len(xs) >= 1`). Left-fold either way.
fn reduce_builtin(rt: &mut Runtime, scope: ObjRef, args: &[ObjRef]) -> LResult {
    let (f, mut acc, items) = match args.len() {
        2 => {
            let parsed = get_args(&rt.heap, args, "*l")?;
            let (f, list) = match (&parsed[0], &parsed[1]) {
                (Arg::Any(f), Arg::List(l)) => (*f, *l),
                _ => unreachable!(),
            };
            let mut items = rt.heap.list_to_vec(list);
            if items.len() < 2 {
                return Err(LispError::new(
                    ErrorKind::TooFew,
                    "reduce: list must have at least 2 entries",
                ));
            }
            let seed = items.remove(0);
            (f, seed, items)
        }
        3 => {
            let parsed = get_args(&rt.heap, args, "**l")?;
            let (f, init, list) = match (&parsed[0], &parsed[1], &parsed[2]) {
                (Arg::Any(f), Arg::Any(init), Arg::List(l)) => (*f, *init, *l),
                _ => unreachable!(),
            };
            let items = rt.heap.list_to_vec(list);
            if items.is_empty() {
                return Err(LispError::new(
                    ErrorKind::TooFew,
                    "reduce: list must have at least 1 entry",
                ));
            }
            (f, init, items)
        }
        _ => {
            return Err(LispError::new(ErrorKind::TooMany, "reduce: 2 or 3 arguments required"));
        }
    };

    for item in items {
        acc = eval::apply(rt, scope, f, &[acc, item])?;
    }
    Ok(acc)
}

/// Prints each argument with its type's printer, followed by a newline.
fn print_builtin(rt: &mut Runtime, _scope: ObjRef, args: &[ObjRef]) -> LResult {
    for &a in args {
        print!("{}", rt.heap.to_display_string(a));
    }
    println!();
    Ok(rt.heap.nil())
}

/// Prints the current call stack to the error sink.
fn dump_stack_builtin(rt: &mut Runtime, _scope: ObjRef, _args: &[ObjRef]) -> LResult {
    rt.dump_stack(&mut std::io::stderr());
    Ok(rt.heap.nil())
}

pub fn register(heap: &mut crate::heap::Heap, scope: ObjRef) {
    super::def(heap, scope, "eval", eval_builtin, EvalArgs::Pre);
    super::def(heap, scope, "map", map_builtin, EvalArgs::Pre);
    super::def(heap, scope, "reduce", reduce_builtin, EvalArgs::Pre);
    super::def(heap, scope, "print", print_builtin, EvalArgs::Pre);
    super::def(heap, scope, "dump-stack", dump_stack_builtin, EvalArgs::Pre);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Runtime;

    #[test]
    fn map_stops_at_shortest_list() {
        let mut rt = Runtime::new();
        let scope = rt.global_scope();
        crate::builtins::register_all(&mut rt.heap, scope);
        let plus = crate::env::get(&rt.heap, scope, "+").unwrap();

        let one = rt.heap.allocate(Payload::Int(1));
        let two = rt.heap.allocate(Payload::Int(2));
        let three = rt.heap.allocate(Payload::Int(3));
        let ten = rt.heap.allocate(Payload::Int(10));
        let twenty = rt.heap.allocate(Payload::Int(20));
        let thirty = rt.heap.allocate(Payload::Int(30));
        let xs = rt.heap.vec_to_list(&[one, two, three]);
        let ys = rt.heap.vec_to_list(&[ten, twenty, thirty]);

        let result = map_builtin(&mut rt, scope, &[plus, xs, ys]).unwrap();
        assert_eq!(rt.heap.to_display_string(result), "(11 22 33)");
    }

    #[test]
    fn reduce_two_form_uses_first_as_seed() {
        let mut rt = Runtime::new();
        let scope = rt.global_scope();
        crate::builtins::register_all(&mut rt.heap, scope);
        let plus = crate::env::get(&rt.heap, scope, "+").unwrap();

        let one = rt.heap.allocate(Payload::Int(1));
        let two = rt.heap.allocate(Payload::Int(2));
        let three = rt.heap.allocate(Payload::Int(3));
        let xs = rt.heap.vec_to_list(&[one, two, three]);

        let result = reduce_builtin(&mut rt, scope, &[plus, xs]).unwrap();
        assert!(matches!(rt.heap.get(result), Payload::Int(6)));
    }
}
