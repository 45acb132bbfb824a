// ABOUTME: The total-order primitives over all Value kinds (spec.md §4.5)

use crate::compare::{self, chain_holds};
use crate::error::LispError;
use crate::eval::eval;
use crate::scope::Scope;
use crate::value::{EvalResult, Value};
use std::cmp::Ordering;
use std::rc::Rc;

pub fn register(scope: &Rc<Scope>) {
    super::define(scope, "<=>", three_way);
    super::define(scope, "=", eq);
    super::define(scope, "<", lt);
    super::define(scope, ">", gt);
    super::define(scope, "<=", le);
    super::define(scope, ">=", ge);
    super::define(scope, "min", min);
    super::define(scope, "max", max);
}

fn evaluated(scope: &Rc<Scope>, tail: &Value) -> Result<Vec<Value>, Value> {
    tail.iter_list().map(|form| eval(scope, &form)).collect()
}

fn three_way(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let values = evaluated(scope, tail)?;
    if values.len() != 2 {
        return Err(LispError::arity("<=>", "2", values.len()).into());
    }
    let ord = match compare::compare(&values[0], &values[1]) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    };
    Ok(Value::Int(ord))
}

fn chained(scope: &Rc<Scope>, tail: &Value, holds: impl Fn(Ordering) -> bool) -> EvalResult {
    let values = evaluated(scope, tail)?;
    Ok(Value::bool_value(chain_holds(&values, holds)))
}

fn eq(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    chained(scope, tail, |o| o == Ordering::Equal)
}

fn lt(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    chained(scope, tail, |o| o == Ordering::Less)
}

fn gt(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    chained(scope, tail, |o| o == Ordering::Greater)
}

fn le(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    chained(scope, tail, |o| o != Ordering::Greater)
}

fn ge(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    chained(scope, tail, |o| o != Ordering::Less)
}

fn min(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let values = evaluated(scope, tail)?;
    values
        .into_iter()
        .min_by(compare::compare)
        .ok_or_else(|| LispError::arity("min", "1+", 0).into())
}

fn max(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let values = evaluated(scope, tail)?;
    values
        .into_iter()
        .max_by(compare::compare)
        .ok_or_else(|| LispError::arity("max", "1+", 0).into())
}
