// ABOUTME: Sequence primitives operating uniformly over Pair lists and
// ABOUTME: Vectors: map, filter, fold, unfold-pair, unfold-vec (spec.md §4.7)

use crate::error::LispError;
use crate::eval::{apply_values, eval};
use crate::scope::Scope;
use crate::value::{EvalResult, Value};
use std::cell::RefCell;
use std::rc::Rc;

pub fn register(scope: &Rc<Scope>) {
    super::define(scope, "map", map);
    super::define(scope, "filter", filter);
    super::define(scope, "fold", fold);
    super::define(scope, "unfold-pair", unfold_pair);
    super::define(scope, "unfold-vec", unfold_vec);
}

fn nth_form(tail: &Value, n: usize) -> Value {
    let mut rest = tail.clone();
    for _ in 0..n {
        rest = rest.tail().unwrap_or_else(Value::nil);
    }
    rest.head().unwrap_or_else(Value::nil)
}

fn map(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let f = eval(scope, &nth_form(tail, 0))?;
    let seq = eval(scope, &nth_form(tail, 1))?;
    match seq {
        Value::Vector(cells) => {
            let items = cells.borrow().clone();
            let mut mapped = Vec::with_capacity(items.len());
            for item in &items {
                mapped.push(apply_values(scope, &f, &[item.clone()])?);
            }
            Ok(Value::Vector(Rc::new(RefCell::new(mapped))))
        }
        Value::Pair(_) => {
            let items: Vec<Value> = seq.iter_list().collect();
            let dotted_tail = seq.list_tail();
            let mut mapped = Vec::with_capacity(items.len());
            for item in &items {
                mapped.push(apply_values(scope, &f, &[item.clone()])?);
            }
            let new_tail = if dotted_tail.is_nil() {
                Value::nil()
            } else {
                apply_values(scope, &f, &[dotted_tail])?
            };
            Ok(Value::dotted_list(mapped, new_tail))
        }
        _ => Err(LispError::InvalidSequence.into()),
    }
}

fn filter(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let f = eval(scope, &nth_form(tail, 0))?;
    let seq = eval(scope, &nth_form(tail, 1))?;
    match seq {
        Value::Vector(cells) => {
            let items = cells.borrow().clone();
            let mut kept = Vec::new();
            for item in items {
                if apply_values(scope, &f, &[item.clone()])?.is_truthy() {
                    kept.push(item);
                }
            }
            Ok(Value::Vector(Rc::new(RefCell::new(kept))))
        }
        Value::Pair(_) => {
            let items: Vec<Value> = seq.iter_list().collect();
            let dotted_tail = seq.list_tail();
            let mut kept = Vec::new();
            for item in items {
                if apply_values(scope, &f, &[item.clone()])?.is_truthy() {
                    kept.push(item);
                }
            }
            let new_tail = if dotted_tail.is_nil() {
                Value::nil()
            } else if apply_values(scope, &f, &[dotted_tail.clone()])?.is_truthy() {
                dotted_tail
            } else {
                Value::nil()
            };
            Ok(Value::dotted_list(kept, new_tail))
        }
        _ => Err(LispError::InvalidSequence.into()),
    }
}

/// `(fold f seed seq)`: left fold with `acc <- f(elem, acc)` for each elem
/// (spec.md §4.7; note the callback receives the element first).
fn fold(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let f = eval(scope, &nth_form(tail, 0))?;
    let mut acc = eval(scope, &nth_form(tail, 1))?;
    let seq = eval(scope, &nth_form(tail, 2))?;
    let items: Vec<Value> = match &seq {
        Value::Vector(cells) => cells.borrow().clone(),
        Value::Pair(_) => seq.iter_list().collect(),
        _ => return Err(LispError::InvalidSequence.into()),
    };
    for item in items {
        acc = apply_values(scope, &f, &[item, acc])?;
    }
    Ok(acc)
}

/// Shared unfold loop: returns the emitted elements and the final seed for
/// which `(continue? seed)` was falsy.
fn unfold_elements(
    scope: &Rc<Scope>,
    continue_f: &Value,
    emit_f: &Value,
    step_f: &Value,
    seed: Value,
) -> Result<(Vec<Value>, Value), Value> {
    let mut elements = Vec::new();
    let mut seed = seed;
    while apply_values(scope, continue_f, &[seed.clone()])?.is_truthy() {
        elements.push(apply_values(scope, emit_f, &[seed.clone()])?);
        seed = apply_values(scope, step_f, &[seed])?;
    }
    Ok((elements, seed))
}

fn unfold_pair(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let continue_f = eval(scope, &nth_form(tail, 0))?;
    let emit_f = eval(scope, &nth_form(tail, 1))?;
    let step_f = eval(scope, &nth_form(tail, 2))?;
    let seed = eval(scope, &nth_form(tail, 3))?;
    let tailgen_form = nth_form(tail, 4);

    let (elements, final_seed) = unfold_elements(scope, &continue_f, &emit_f, &step_f, seed)?;
    let final_tail = if tailgen_form.is_nil() {
        Value::nil()
    } else {
        let tailgen = eval(scope, &tailgen_form)?;
        apply_values(scope, &tailgen, &[final_seed])?
    };
    Ok(Value::dotted_list(elements, final_tail))
}

fn unfold_vec(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let continue_f = eval(scope, &nth_form(tail, 0))?;
    let emit_f = eval(scope, &nth_form(tail, 1))?;
    let step_f = eval(scope, &nth_form(tail, 2))?;
    let seed = eval(scope, &nth_form(tail, 3))?;

    let (elements, _) = unfold_elements(scope, &continue_f, &emit_f, &step_f, seed)?;
    Ok(Value::Vector(Rc::new(RefCell::new(elements))))
}
