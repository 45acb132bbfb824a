// ABOUTME: Control-flow primitives: quote, set, let, eval/upval, macro,
// ABOUTME: catch/throw, load (spec.md §4.6)

use crate::error::LispError;
use crate::eval::{eval, eval_body};
use crate::reader::{self, ReadOutcome};
use crate::scope::Scope;
use crate::streams;
use crate::symbols::intern_str;
use crate::value::{EvalResult, Value};
use std::rc::Rc;

pub fn register(scope: &Rc<Scope>) {
    super::define(scope, "quote", quote);
    super::define(scope, "set", set);
    super::define(scope, "let", let_);
    super::define(scope, "eval", eval_prim);
    super::define(scope, "upval", upval);
    super::define(scope, "macro", macro_);
    super::define(scope, "catch", catch);
    super::define(scope, "throw", throw);
    super::define(scope, "load", load);
}

fn quote(_scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    Ok(tail.clone())
}

/// `(set name expr)`. `name` is taken literally from the call form, not
/// evaluated as a lookup, which is what lets `(let ((x 1)) (set x 2) x)`
/// mutate `x` rather than erroring because `x`'s current value isn't a
/// symbol (spec.md §8 testable property 6).
fn set(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let name_form = tail.head().ok_or_else(|| LispError::ExpectedPair.into_value())?;
    let expr_form = tail
        .tail()
        .and_then(|t| t.head())
        .unwrap_or_else(Value::nil);
    let name = name_form
        .as_symbol()
        .cloned()
        .ok_or_else(|| LispError::InvalidName.into_value())?;
    let value = eval(scope, &expr_form)?;
    scope.define_or_update(&name, value.clone());
    Ok(value)
}

fn let_(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let bindings_form = tail.head().ok_or_else(|| LispError::ExpectedPair.into_value())?;
    let body = tail.tail().unwrap_or_else(Value::nil);
    let child = Scope::child(scope);
    for binding in bindings_form.iter_list() {
        let name = binding
            .head()
            .and_then(|n| n.as_symbol().cloned())
            .ok_or_else(|| LispError::InvalidName.into_value())?;
        let expr_form = binding
            .tail()
            .and_then(|t| t.head())
            .unwrap_or_else(Value::nil);
        let value = eval(scope, &expr_form)?;
        child.define_here(&name, value);
    }
    eval_body(&child, &body)
}

fn eval_prim(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let form = tail.head().unwrap_or_else(Value::nil);
    let once = eval(scope, &form)?;
    eval(scope, &once)
}

fn upval(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let form = tail.head().unwrap_or_else(Value::nil);
    let once = eval(scope, &form)?;
    match scope.parent() {
        Some(parent) => eval(&parent, &once),
        None => Err(LispError::UpvalAtToplevel.into()),
    }
}

/// `(macro op arg1 … argk)`: evaluates the arguments (but not `op`) in the
/// caller's scope, reconstructs `(op arg1-val … argk-val)`, and evaluates
/// that: a hook for building and immediately running a form.
fn macro_(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let op = tail.head().unwrap_or_else(Value::nil);
    let arg_forms = tail.tail().unwrap_or_else(Value::nil);
    let mut evaluated = Vec::new();
    for form in arg_forms.iter_list() {
        evaluated.push(eval(scope, &form)?);
    }
    let rebuilt = Value::cons(op, Value::list(evaluated));
    eval(scope, &rebuilt)
}

fn catch(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let handler_spec = tail.head().ok_or_else(|| LispError::ExpectedPair.into_value())?;
    let name = handler_spec
        .head()
        .and_then(|n| n.as_symbol().cloned())
        .ok_or_else(|| LispError::InvalidName.into_value())?;
    let handler_body = handler_spec.tail().unwrap_or_else(Value::nil);
    let body = tail.tail().unwrap_or_else(Value::nil);

    let mut result = Value::nil();
    for form in body.iter_list() {
        match eval(scope, &form) {
            Ok(v) => result = v,
            Err(e) => {
                let child = Scope::child(scope);
                child.define_here(&name, e);
                return eval_body(&child, &handler_body);
            }
        }
    }
    Ok(result)
}

fn throw(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let form = tail.head().unwrap_or_else(Value::nil);
    Err(eval(scope, &form)?)
}

/// `(load path)`: opens `path`, installs it as `*In` in a fresh child
/// frame, and runs read/eval in a loop until end-of-stream. Unlike the
/// reference implementation, the file is closed whether the load finishes
/// or aborts on error (spec.md §9 Open Question a).
fn load(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let path_form = tail.head().unwrap_or_else(Value::nil);
    let path_value = eval(scope, &path_form)?;
    let path_sym = path_value
        .as_symbol()
        .ok_or_else(|| LispError::Custom("load expects a symbol path".to_string()).into_value())?;
    let path = String::from_utf8_lossy(path_sym).into_owned();

    let handle = streams::open_read(&path)
        .map_err(|e| LispError::Custom(format!("cannot open {path}: {e}")).into_value())?;

    let child = Scope::child(scope);
    child.define_here(&intern_str("*In"), Value::Stream(handle));

    loop {
        match reader::read(handle) {
            Ok(ReadOutcome::End) => break,
            Ok(ReadOutcome::Value(form)) => {
                if let Err(e) = eval(&child, &form) {
                    streams::close(handle);
                    return Err(e);
                }
            }
            Err(e) => {
                streams::close(handle);
                return Err(e);
            }
        }
    }
    streams::close(handle);
    Ok(Value::nil())
}
