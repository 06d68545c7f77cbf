// ABOUTME: Value payloads for Lisp data structures and the kinds they come in

use crate::heap::ObjRef;

/// The evaluate-args flag a builtin declares. Determines whether the
/// argument list is evaluated left-to-right before the builtin runs, or
/// handed to it unevaluated (as `quote`, `if`, `lambda` and friends need).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalArgs {
    Pre,
    Raw,
}

/// Which of the two lambda forms a `Payload::Lambda` is. A macro's result
/// is evaluated a second time, in the caller's scope, after the lambda
/// body runs; a function's result is returned as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LambdaKind {
    Function,
    Macro,
}

pub type BuiltinFn = fn(&mut crate::runtime::Runtime, ObjRef, &[ObjRef]) -> crate::error::LResult;

/// The payload a heap value carries, one of the kinds in the data model:
/// nil, list (cons cell), int, string, symbol, builtin, lambda (function or
/// macro), and scope. Nil is its own singleton kind rather than a special
/// case of `List`, so that every empty list really is the same object.
#[derive(Debug)]
pub enum Payload {
    /// The unique empty list. There is exactly one nil object per runtime.
    Nil,
    /// A cons cell: `left` is the head, `right` is the tail (nil-terminated
    /// for a proper list, or any value for a dotted pair).
    Cons { left: ObjRef, right: ObjRef },
    Int(i64),
    Str { bytes: Vec<u8> },
    Symbol(String),
    Builtin {
        func: BuiltinFn,
        name: &'static str,
        eval_args: EvalArgs,
    },
    Lambda {
        params: Vec<String>,
        body: Vec<ObjRef>,
        scope: ObjRef,
        kind: LambdaKind,
    },
    Scope {
        bindings: std::collections::HashMap<String, ObjRef>,
        parent: Option<ObjRef>,
    },
}

impl Payload {
    pub fn type_name(&self) -> &'static str {
        match self {
            Payload::Nil => "nil",
            Payload::Cons { .. } => "list",
            Payload::Int(_) => "int",
            Payload::Str { .. } => "string",
            Payload::Symbol(_) => "symbol",
            Payload::Builtin { .. } => "builtin",
            Payload::Lambda { .. } => "lambda",
            Payload::Scope { .. } => "scope",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Payload::Nil)
    }
}
