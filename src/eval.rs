// ABOUTME: Reduces a Value to a Value under a Scope; dispatches procedure and
// ABOUTME: macro application with the three lambda-list shapes (spec.md §4.4)

use crate::error::LispError;
use crate::scope::Scope;
use crate::symbols::intern_str;
use crate::value::{EvalResult, PairCell, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// Reduces `expr` to a value under `scope`.
pub fn eval(scope: &Rc<Scope>, expr: &Value) -> EvalResult {
    match expr {
        Value::Int(_) => Ok(expr.clone()),
        Value::Symbol(name) => Ok(scope.lookup(name)),
        Value::Vector(cells) => {
            let items: Vec<Value> = cells.borrow().iter().cloned().collect();
            let mut reduced = Vec::with_capacity(items.len());
            for item in &items {
                reduced.push(eval(scope, item)?);
            }
            Ok(Value::Vector(Rc::new(RefCell::new(reduced))))
        }
        Value::Pair(None) => Ok(Value::nil()),
        Value::Pair(Some(cell)) => {
            let head_form = cell.head.borrow().clone();
            let tail = cell.tail.borrow().clone();
            let resolved_head = eval(scope, &head_form)?;
            apply(scope, resolved_head, &tail)
        }
        Value::Primitive(_) | Value::Stream(_) => Ok(expr.clone()),
    }
}

/// Dispatches application of a resolved `head` to the unevaluated `tail`
/// (spec.md §4.4 "Application of `(head . tail)`").
fn apply(scope: &Rc<Scope>, head: Value, tail: &Value) -> EvalResult {
    match head {
        Value::Primitive(p) => (p.func)(scope, tail),
        Value::Pair(Some(cell)) => lambda_apply(scope, &cell, tail),
        Value::Symbol(name) => {
            // An unbound symbol resolves to nil, which is itself a Pair and
            // falls through to the empty-pair-head error below; a symbol
            // bound to another symbol keeps resolving.
            let resolved = scope.lookup(&name);
            apply(scope, resolved, tail)
        }
        Value::Vector(_) => Err(LispError::CannotExecuteVector.into()),
        Value::Pair(None) => Err(Value::cons(Value::nil(), tail.clone())),
        Value::Int(_) | Value::Stream(_) => {
            Err(LispError::Custom(format!("cannot execute a {}", head.type_name())).into())
        }
    }
}

/// Applies a resolved procedure value to an already-evaluated argument list,
/// used by the sequence primitives (`map`, `filter`, `fold`, `unfold-*`) to
/// invoke their callback regardless of the callback's own lambda-list shape
/// or (for primitives) its own evaluation discipline.
pub fn apply_values(scope: &Rc<Scope>, f: &Value, args: &[Value]) -> EvalResult {
    match f {
        Value::Primitive(p) => {
            let quote_sym = intern_str("quote");
            let quoted_tail = Value::list(
                args.iter()
                    .map(|v| Value::cons(Value::Symbol(quote_sym.clone()), v.clone()))
                    .collect(),
            );
            (p.func)(scope, &quoted_tail)
        }
        Value::Pair(Some(cell)) => {
            let lambda_list = cell.head.borrow().clone();
            let body = cell.tail.borrow().clone();
            let child = Scope::child(scope);
            bind_prevaluated(&child, &lambda_list, args)?;
            eval_body(&child, &body)
        }
        Value::Symbol(name) => {
            let resolved = scope.lookup(name);
            apply_values(scope, &resolved, args)
        }
        Value::Vector(_) => Err(LispError::CannotExecuteVector.into()),
        Value::Pair(None) => Err(Value::cons(Value::nil(), Value::list(args.to_vec()))),
        Value::Int(_) | Value::Stream(_) => {
            Err(LispError::Custom(format!("cannot execute a {}", f.type_name())).into())
        }
    }
}

fn bind_prevaluated(scope: &Rc<Scope>, lambda_list: &Value, args: &[Value]) -> Result<(), Value> {
    match lambda_list {
        Value::Symbol(name) => {
            scope.define_here(name, Value::list(args.to_vec()));
            Ok(())
        }
        Value::Vector(params) => {
            let params = params.borrow().clone();
            bind_positional(scope, &params, args)
        }
        Value::Pair(_) => {
            let params: Vec<Value> = lambda_list.iter_list().collect();
            bind_positional(scope, &params, args)
        }
        _ => Err(LispError::IllegalLambdaList.into()),
    }
}

fn bind_positional(scope: &Rc<Scope>, params: &[Value], args: &[Value]) -> Result<(), Value> {
    for (i, p) in params.iter().enumerate() {
        let name = p
            .as_symbol()
            .cloned()
            .ok_or_else(|| LispError::InvalidName.into_value())?;
        let value = args.get(i).cloned().unwrap_or_else(Value::nil);
        scope.define_here(&name, value);
    }
    Ok(())
}

/// Lambda application given a resolved procedure `(lambda-list . body)` and
/// the caller's unevaluated argument list (spec.md §4.4 "Lambda application").
fn lambda_apply(scope: &Rc<Scope>, cell: &Rc<PairCell>, tail: &Value) -> EvalResult {
    let lambda_list = cell.head.borrow().clone();
    let body = cell.tail.borrow().clone();
    match &lambda_list {
        Value::Symbol(name) => {
            let child = Scope::child(scope);
            child.define_here(name, tail.clone());
            eval_body(&child, &body)
        }
        Value::Vector(params) => {
            let params = params.borrow().clone();
            let args: Vec<Value> = tail.iter_list().collect();
            let child = Scope::child(scope);
            bind_positional(&child, &params, &args)?;
            eval_body(&child, &body)
        }
        Value::Pair(_) => {
            // List lambda list: arguments are evaluated once, left to right,
            // in the caller's scope, before any binding happens.
            let params: Vec<Value> = lambda_list.iter_list().collect();
            let mut arg_forms = tail.iter_list();
            let mut evaluated = Vec::with_capacity(params.len());
            for _ in 0..params.len() {
                let value = match arg_forms.next() {
                    Some(form) => eval(scope, &form)?,
                    None => Value::nil(),
                };
                evaluated.push(value);
            }
            let child = Scope::child(scope);
            bind_positional(&child, &params, &evaluated)?;
            eval_body(&child, &body)
        }
        _ => Err(LispError::IllegalLambdaList.into()),
    }
}

/// Evaluates each form of a proper-list body in turn under `scope`,
/// returning the last. An empty body yields nil (spec.md §9 Open Question c).
pub fn eval_body(scope: &Rc<Scope>, body: &Value) -> EvalResult {
    let mut result = Value::nil();
    for form in body.iter_list() {
        result = eval(scope, &form)?;
    }
    Ok(result)
}
