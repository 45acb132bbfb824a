// ABOUTME: Linked chain of binding frames; lookup, definition, and update

use crate::symbols::Symbol;
use crate::value::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// One frame of the scope chain: an ordered list of `symbol -> value`
/// bindings plus an optional link to the enclosing frame. The outermost
/// frame with no parent is the root (global) scope.
pub struct Scope {
    bindings: RefCell<Vec<(Symbol, Value)>>,
    parent: Option<Rc<Scope>>,
}

impl Scope {
    /// A fresh root scope with no bindings and no parent.
    pub fn root() -> Rc<Scope> {
        Rc::new(Scope {
            bindings: RefCell::new(Vec::new()),
            parent: None,
        })
    }

    /// A fresh child frame over `parent`, introduced by procedure
    /// application, `let`, `catch`, or `load`.
    pub fn child(parent: &Rc<Scope>) -> Rc<Scope> {
        Rc::new(Scope {
            bindings: RefCell::new(Vec::new()),
            parent: Some(Rc::clone(parent)),
        })
    }

    pub fn parent(&self) -> Option<Rc<Scope>> {
        self.parent.clone()
    }

    /// Defines `name` in THIS frame unconditionally (used for parameter
    /// binding, where the frame is known to be fresh).
    pub fn define_here(&self, name: &Symbol, value: Value) {
        self.bindings.borrow_mut().push((Rc::clone(name), value));
    }

    /// Walks frames innermost-first; returns the first binding found, or
    /// nil on a miss (a miss is not an error, spec.md §4.4).
    pub fn lookup(self: &Rc<Self>, name: &Symbol) -> Value {
        let mut scope = self;
        let mut owned;
        loop {
            for (bound_name, value) in scope.bindings.borrow().iter() {
                if Rc::ptr_eq(bound_name, name) {
                    return value.clone();
                }
            }
            match &scope.parent {
                Some(parent) => {
                    owned = Rc::clone(parent);
                    scope = &owned;
                }
                None => return Value::nil(),
            }
        }
    }

    /// Mutates the binding in the nearest frame (innermost-first) that
    /// already defines `name`. If no frame defines it, a new binding is
    /// created in the innermost frame: the frame this call started from,
    /// not the outermost one. This is the reference implementation's
    /// `veclisp_set` behavior (spec.md §9 design note "Scope `set`
    /// semantics"), adopted here as normative.
    pub fn define_or_update(self: &Rc<Self>, name: &Symbol, value: Value) {
        let mut scope = self;
        let mut owned;
        loop {
            if let Some(slot) = scope
                .bindings
                .borrow_mut()
                .iter_mut()
                .find(|(bound_name, _)| Rc::ptr_eq(bound_name, name))
            {
                slot.1 = value;
                return;
            }
            match &scope.parent {
                Some(parent) => {
                    owned = Rc::clone(parent);
                    scope = &owned;
                }
                None => break,
            }
        }
        self.bindings
            .borrow_mut()
            .push((Rc::clone(name), value));
    }

    /// Enumerates the symbols bound in THIS frame only (used by `locals`).
    pub fn frame_symbols(&self) -> Vec<Symbol> {
        self.bindings
            .borrow()
            .iter()
            .map(|(name, _)| Rc::clone(name))
            .collect()
    }

    /// Enumerates the symbols bound across the entire chain, innermost
    /// first, without duplicates shadowed by a nearer frame (used by `syms`).
    pub fn all_symbols(self: &Rc<Self>) -> Vec<Symbol> {
        let mut seen: Vec<Symbol> = Vec::new();
        let mut scope = self;
        let mut owned;
        loop {
            for (name, _) in scope.bindings.borrow().iter() {
                if !seen.iter().any(|s| Rc::ptr_eq(s, name)) {
                    seen.push(Rc::clone(name));
                }
            }
            match &scope.parent {
                Some(parent) => {
                    owned = Rc::clone(parent);
                    scope = &owned;
                }
                None => break,
            }
        }
        seen
    }

    /// The root (outermost, global) scope of the chain starting at `self`.
    pub fn globals(self: &Rc<Self>) -> Rc<Scope> {
        let mut scope = Rc::clone(self);
        loop {
            let next = scope.parent.clone();
            match next {
                Some(p) => scope = p,
                None => return scope,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::intern_str;

    #[test]
    fn lookup_miss_returns_nil_not_error() {
        let root = Scope::root();
        assert!(root.lookup(&intern_str("undefined")).is_nil());
    }

    #[test]
    fn shadowing_in_nested_lets() {
        let root = Scope::root();
        let x = intern_str("x");
        root.define_here(&x, Value::Int(0));

        let outer_let = Scope::child(&root);
        outer_let.define_here(&x, Value::Int(1));

        let inner_let = Scope::child(&outer_let);
        inner_let.define_here(&x, Value::Int(2));

        assert_eq!(inner_let.lookup(&x), Value::Int(2));
        assert_eq!(outer_let.lookup(&x), Value::Int(1));
        assert_eq!(root.lookup(&x), Value::Int(0));
    }

    #[test]
    fn set_mutates_nearest_defining_frame() {
        let root = Scope::root();
        let x = intern_str("x");
        root.define_here(&x, Value::Int(1));

        let inner = Scope::child(&root);
        inner.define_here(&x, Value::Int(1));
        inner.define_or_update(&x, Value::Int(2));

        assert_eq!(inner.lookup(&x), Value::Int(2));
        assert_eq!(root.lookup(&x), Value::Int(1));
    }

    #[test]
    fn set_with_no_existing_binding_creates_in_innermost_frame() {
        let root = Scope::root();
        let inner = Scope::child(&root);
        let y = intern_str("y");

        inner.define_or_update(&y, Value::Int(42));

        assert_eq!(inner.lookup(&y), Value::Int(42));
        assert!(root.frame_symbols().is_empty());
        assert!(inner
            .frame_symbols()
            .iter()
            .any(|s| Rc::ptr_eq(s, &y)));
    }

    #[test]
    fn all_symbols_respects_shadowing() {
        let root = Scope::root();
        let x = intern_str("x");
        root.define_here(&x, Value::Int(1));
        let child = Scope::child(&root);
        child.define_here(&x, Value::Int(2));

        let syms = child.all_symbols();
        assert_eq!(syms.iter().filter(|s| Rc::ptr_eq(s, &x)).count(), 1);
    }
}
