// ABOUTME: Type-predicate primitives (spec.md §6 startup scope)

use crate::eval::eval;
use crate::scope::Scope;
use crate::value::{EvalResult, Value};
use std::rc::Rc;

pub fn register(scope: &Rc<Scope>) {
    super::define(scope, "int?", int_p);
    super::define(scope, "sym?", sym_p);
    super::define(scope, "vec?", vec_p);
    super::define(scope, "pair?", pair_p);
    super::define(scope, "nil?", nil_p);
}

fn one(scope: &Rc<Scope>, tail: &Value) -> Result<Value, Value> {
    eval(scope, &tail.head().unwrap_or_else(Value::nil))
}

fn int_p(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    Ok(Value::bool_value(matches!(one(scope, tail)?, Value::Int(_))))
}

fn sym_p(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    Ok(Value::bool_value(matches!(one(scope, tail)?, Value::Symbol(_))))
}

fn vec_p(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    Ok(Value::bool_value(matches!(one(scope, tail)?, Value::Vector(_))))
}

fn pair_p(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    Ok(Value::bool_value(one(scope, tail)?.is_pair()))
}

fn nil_p(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    Ok(Value::bool_value(one(scope, tail)?.is_nil()))
}
