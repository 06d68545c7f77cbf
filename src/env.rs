// ABOUTME: Scope operations over the heap's Payload::Scope chain

use crate::error::{ErrorKind, LispError};
use crate::heap::{Heap, ObjRef};
use crate::value::Payload;

/// Allocates a new scope with the given parent (`None` for the global
/// scope). Mirrors `lisp_new_scope` in the original: a scope is just a
/// binding map plus a nullable parent link, walked outward on lookup.
pub fn new_scope(heap: &mut Heap, parent: Option<ObjRef>) -> ObjRef {
    heap.allocate(Payload::Scope {
        bindings: Default::default(),
        parent,
    })
}

/// Binds `name` in `scope` directly, without walking the parent chain.
/// Re-defining a name already bound in this scope overwrites it.
pub fn define(heap: &mut Heap, scope: ObjRef, name: &str, value: ObjRef) {
    match heap.get_mut(scope) {
        Payload::Scope { bindings, .. } => {
            bindings.insert(name.to_string(), value);
        }
        other => panic!("define called on non-scope value of kind {}", other.type_name()),
    }
}

/// Looks up `name` in `scope`, then each ancestor in turn. Returns `None`
/// if no scope in the chain binds it.
pub fn get(heap: &Heap, scope: ObjRef, name: &str) -> Option<ObjRef> {
    let mut current = scope;
    loop {
        match heap.get(current) {
            Payload::Scope { bindings, parent } => {
                if let Some(&value) = bindings.get(name) {
                    return Some(value);
                }
                match parent {
                    Some(p) => current = *p,
                    None => return None,
                }
            }
            other => panic!("get called on non-scope value of kind {}", other.type_name()),
        }
    }
}

/// Updates an existing binding, walking the parent chain to find the scope
/// that owns it. Errors with `not-found` if no scope in the chain binds
/// `name` — there is no implicit global define on assignment.
pub fn set(heap: &mut Heap, scope: ObjRef, name: &str, value: ObjRef) -> Result<(), LispError> {
    let mut current = scope;
    loop {
        let owns_it = match heap.get(current) {
            Payload::Scope { bindings, .. } => bindings.contains_key(name),
            other => panic!("set called on non-scope value of kind {}", other.type_name()),
        };
        if owns_it {
            if let Payload::Scope { bindings, .. } = heap.get_mut(current) {
                bindings.insert(name.to_string(), value);
            }
            return Ok(());
        }
        let parent = match heap.get(current) {
            Payload::Scope { parent, .. } => *parent,
            _ => unreachable!(),
        };
        match parent {
            Some(p) => current = p,
            None => {
                return Err(LispError::new(
                    ErrorKind::NotFound,
                    format!("set: undefined symbol '{}'", name),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_get_in_same_scope() {
        let mut heap = Heap::new();
        let scope = new_scope(&mut heap, None);
        let forty_two = heap.allocate(Payload::Int(42));
        define(&mut heap, scope, "x", forty_two);
        assert_eq!(get(&heap, scope, "x"), Some(forty_two));
    }

    #[test]
    fn undefined_symbol_is_none() {
        let mut heap = Heap::new();
        let scope = new_scope(&mut heap, None);
        assert_eq!(get(&heap, scope, "undefined"), None);
    }

    #[test]
    fn child_shadows_parent() {
        let mut heap = Heap::new();
        let parent = new_scope(&mut heap, None);
        let a = heap.allocate(Payload::Int(1));
        define(&mut heap, parent, "x", a);
        let child = new_scope(&mut heap, Some(parent));
        let b = heap.allocate(Payload::Int(2));
        define(&mut heap, child, "x", b);
        assert_eq!(get(&heap, child, "x"), Some(b));
        assert_eq!(get(&heap, parent, "x"), Some(a));
    }

    #[test]
    fn child_sees_parent_binding() {
        let mut heap = Heap::new();
        let parent = new_scope(&mut heap, None);
        let a = heap.allocate(Payload::Int(1));
        define(&mut heap, parent, "x", a);
        let child = new_scope(&mut heap, Some(parent));
        assert_eq!(get(&heap, child, "x"), Some(a));
    }

    #[test]
    fn set_updates_ancestor_binding() {
        let mut heap = Heap::new();
        let parent = new_scope(&mut heap, None);
        let a = heap.allocate(Payload::Int(1));
        define(&mut heap, parent, "x", a);
        let child = new_scope(&mut heap, Some(parent));
        let b = heap.allocate(Payload::Int(2));
        set(&mut heap, child, "x", b).unwrap();
        assert_eq!(get(&heap, parent, "x"), Some(b));
        assert_eq!(get(&heap, child, "x"), Some(b));
    }

    #[test]
    fn set_on_undefined_symbol_errors() {
        let mut heap = Heap::new();
        let scope = new_scope(&mut heap, None);
        let v = heap.allocate(Payload::Int(1));
        let err = set(&mut heap, scope, "missing", v).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
