// ABOUTME: Structural introspection and host-boundary primitives (spec.md §4.8, §6)

use crate::error::LispError;
use crate::eval::eval;
use crate::scope::Scope;
use crate::symbols::intern;
use crate::value::{EvalResult, Value};
use std::rc::Rc;

pub fn register(scope: &Rc<Scope>) {
    super::define(scope, "length", length);
    super::define(scope, "pack", pack);
    super::define(scope, "syms", syms);
    super::define(scope, "locals", locals);
    super::define(scope, "globals", globals);
    super::define(scope, "exit", exit);
    super::define(scope, "yes", yes);
    super::define(scope, "no", no);
}

fn one(scope: &Rc<Scope>, tail: &Value) -> Result<Value, Value> {
    eval(scope, &tail.head().unwrap_or_else(Value::nil))
}

fn length(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let v = one(scope, tail)?;
    let n = match &v {
        Value::Pair(_) => v.iter_list().count() as i64,
        Value::Vector(cells) => cells.borrow().len() as i64,
        Value::Symbol(s) => s.len() as i64,
        _ => return Err(LispError::InvalidSequence.into()),
    };
    Ok(Value::Int(n))
}

/// Appends the "packed" leaf bytes of `v`: integers as a single truncated
/// byte, symbols as their raw bytes, pairs/vectors recursed into
/// (spec.md §4.8 `pack`, reused by the `write-bytes` primitive).
pub(crate) fn pack_bytes(v: &Value, out: &mut Vec<u8>) {
    match v {
        Value::Int(n) => out.push(*n as u8),
        Value::Symbol(s) => out.extend_from_slice(s),
        Value::Pair(Some(cell)) => {
            pack_bytes(&cell.head.borrow(), out);
            pack_bytes(&cell.tail.borrow(), out);
        }
        Value::Pair(None) => {}
        Value::Vector(cells) => {
            for item in cells.borrow().iter() {
                pack_bytes(item, out);
            }
        }
        Value::Primitive(_) | Value::Stream(_) => {}
    }
}

fn pack(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let mut bytes = Vec::new();
    for form in tail.iter_list() {
        let v = eval(scope, &form)?;
        pack_bytes(&v, &mut bytes);
    }
    Ok(Value::Symbol(intern(&bytes)))
}

fn syms(scope: &Rc<Scope>, _tail: &Value) -> EvalResult {
    let symbols = scope.all_symbols();
    Ok(Value::list(symbols.into_iter().map(Value::Symbol).collect()))
}

fn locals(scope: &Rc<Scope>, _tail: &Value) -> EvalResult {
    let symbols = scope.frame_symbols();
    Ok(Value::list(symbols.into_iter().map(Value::Symbol).collect()))
}

fn globals(scope: &Rc<Scope>, _tail: &Value) -> EvalResult {
    let symbols = scope.globals().frame_symbols();
    Ok(Value::list(symbols.into_iter().map(Value::Symbol).collect()))
}

fn exit(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let form = tail.head().unwrap_or_else(Value::nil);
    let code = match eval(scope, &form) {
        Ok(Value::Int(n)) => n as i32,
        _ => 1,
    };
    std::process::exit(code)
}

fn yes(_scope: &Rc<Scope>, _tail: &Value) -> EvalResult {
    Ok(Value::truth_symbol())
}

fn no(_scope: &Rc<Scope>, _tail: &Value) -> EvalResult {
    Ok(Value::nil())
}
