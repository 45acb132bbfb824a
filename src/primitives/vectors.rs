// ABOUTME: Vector indexing/mutation and list construction (spec.md §6)

use crate::error::LispError;
use crate::eval::eval;
use crate::scope::Scope;
use crate::value::{EvalResult, Value};
use std::rc::Rc;

pub fn register(scope: &Rc<Scope>) {
    super::define(scope, "vector-ref", vector_ref);
    super::define(scope, "vector-set", vector_set);
    super::define(scope, "list", list);
}

fn as_index(v: &Value) -> Result<i64, Value> {
    match v {
        Value::Int(n) => Ok(*n),
        _ => Err(LispError::ExpectedInteger.into()),
    }
}

/// Negative and out-of-range indices are errors (spec.md §9 Open Question b).
fn checked_index(len: usize, index: i64) -> Result<usize, Value> {
    if index < 0 || index as usize >= len {
        Err(LispError::Custom(format!("vector index {index} out of range")).into_value())
    } else {
        Ok(index as usize)
    }
}

fn vector_ref(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let vec_form = tail.head().unwrap_or_else(Value::nil);
    let index_form = tail.tail().and_then(|t| t.head()).unwrap_or_else(Value::nil);
    let vec_value = eval(scope, &vec_form)?;
    let index = as_index(&eval(scope, &index_form)?)?;
    match vec_value {
        Value::Vector(cells) => {
            let cells = cells.borrow();
            let i = checked_index(cells.len(), index)?;
            Ok(cells[i].clone())
        }
        _ => Err(LispError::Custom("expected a vector".to_string()).into()),
    }
}

fn vector_set(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let vec_form = tail.head().unwrap_or_else(Value::nil);
    let rest = tail.tail().unwrap_or_else(Value::nil);
    let index_form = rest.head().unwrap_or_else(Value::nil);
    let value_form = rest.tail().and_then(|t| t.head()).unwrap_or_else(Value::nil);

    let vec_value = eval(scope, &vec_form)?;
    let index = as_index(&eval(scope, &index_form)?)?;
    let value = eval(scope, &value_form)?;
    match vec_value {
        Value::Vector(cells) => {
            let mut cells = cells.borrow_mut();
            let i = checked_index(cells.len(), index)?;
            cells[i] = value.clone();
            Ok(value)
        }
        _ => Err(LispError::Custom("expected a vector".to_string()).into()),
    }
}

fn list(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let mut items = Vec::new();
    for form in tail.iter_list() {
        items.push(eval(scope, &form)?);
    }
    Ok(Value::list(items))
}
