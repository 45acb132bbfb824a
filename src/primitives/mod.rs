// ABOUTME: Populates the root scope with the startup bindings of spec.md §6:
// ABOUTME: stream handles, prompt strings, `t`, and every primitive operation.

mod arithmetic;
mod comparison;
mod control;
mod introspection;
mod io;
mod pairs;
mod predicates;
mod sequence;
mod vectors;

use crate::config;
use crate::scope::Scope;
use crate::streams::{self, STDERR, STDIN, STDOUT};
use crate::symbols::intern_str;
use crate::value::{Primitive, Value};
use std::rc::Rc;

/// Defines `name` in `scope` as the native primitive `func`.
pub(crate) fn define(
    scope: &Rc<Scope>,
    name: &'static str,
    func: fn(&Rc<Scope>, &Value) -> crate::value::EvalResult,
) {
    let sym = intern_str(name);
    scope.define_here(&sym, Value::Primitive(Primitive { name, func }));
}

/// Installs the complete startup scope: standard streams, prompt
/// configuration, the canonical truthy symbol `t`, and the primitive
/// registry (spec.md §6).
pub fn register_all(root: &Rc<Scope>) {
    streams::init_standard_streams();

    root.define_here(&intern_str("*In"), Value::Stream(STDIN));
    root.define_here(&intern_str("*Out"), Value::Stream(STDOUT));
    root.define_here(&intern_str("*Err"), Value::Stream(STDERR));
    root.define_here(&intern_str("*Prompt"), Value::Symbol(intern_str(config::DEFAULT_PROMPT)));
    root.define_here(
        &intern_str("*Response"),
        Value::Symbol(intern_str(config::DEFAULT_RESPONSE)),
    );

    let t = intern_str("t");
    root.define_here(&t, Value::Symbol(t.clone()));

    control::register(root);
    arithmetic::register(root);
    comparison::register(root);
    predicates::register(root);
    pairs::register(root);
    vectors::register(root);
    sequence::register(root);
    io::register(root);
    introspection::register(root);
}
