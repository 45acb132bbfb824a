// ABOUTME: Pair construction and mutation primitives (spec.md §6)

use crate::error::LispError;
use crate::eval::eval;
use crate::scope::Scope;
use crate::value::{EvalResult, Value};
use std::rc::Rc;

pub fn register(scope: &Rc<Scope>) {
    super::define(scope, "pair", pair);
    super::define(scope, "head", head);
    super::define(scope, "tail", tail_of);
    super::define(scope, "set-head", set_head);
    super::define(scope, "set-tail", set_tail);
}

fn two(scope: &Rc<Scope>, tail: &Value) -> Result<(Value, Value), Value> {
    let a = tail.head().unwrap_or_else(Value::nil);
    let b = tail.tail().and_then(|t| t.head()).unwrap_or_else(Value::nil);
    Ok((eval(scope, &a)?, eval(scope, &b)?))
}

fn pair(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let (a, b) = two(scope, tail)?;
    Ok(Value::cons(a, b))
}

fn one_pair(scope: &Rc<Scope>, tail: &Value) -> Result<Value, Value> {
    let form = tail.head().unwrap_or_else(Value::nil);
    let v = eval(scope, &form)?;
    if v.is_pair() {
        Ok(v)
    } else {
        Err(LispError::ExpectedPair.into())
    }
}

fn head(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let p = one_pair(scope, tail)?;
    Ok(p.head().unwrap_or_else(Value::nil))
}

fn tail_of(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let p = one_pair(scope, tail)?;
    Ok(p.tail().unwrap_or_else(Value::nil))
}

fn set_head(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let (p, v) = two(scope, tail)?;
    let cell = p.as_cell().ok_or_else(|| LispError::ExpectedPair.into_value())?;
    *cell.head.borrow_mut() = v.clone();
    Ok(v)
}

fn set_tail(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let (p, v) = two(scope, tail)?;
    let cell = p.as_cell().ok_or_else(|| LispError::ExpectedPair.into_value())?;
    *cell.tail.borrow_mut() = v.clone();
    Ok(v)
}
