// ABOUTME: Stream primitives: open, close, read, write, print, write-bytes
// ABOUTME: (spec.md §4.8, §5, §6)

use super::introspection::pack_bytes;
use crate::error::LispError;
use crate::eval::eval;
use crate::reader::{self, ReadOutcome};
use crate::scope::Scope;
use crate::streams;
use crate::value::{EvalResult, Value};
use crate::writer;
use std::rc::Rc;

pub fn register(scope: &Rc<Scope>) {
    super::define(scope, "open", open);
    super::define(scope, "close", close);
    super::define(scope, "read", read);
    super::define(scope, "write", write);
    super::define(scope, "print", print);
    super::define(scope, "write-bytes", write_bytes);
}

fn as_path(v: &Value) -> Result<String, Value> {
    v.as_symbol()
        .map(|s| String::from_utf8_lossy(s).into_owned())
        .ok_or_else(|| LispError::Custom("open expects a symbol path".to_string()).into_value())
}

fn as_stream(v: &Value) -> Result<i64, Value> {
    match v {
        Value::Stream(h) => Ok(*h),
        _ => Err(LispError::Custom("expected a stream".to_string()).into()),
    }
}

/// `(open path)` opens for reading; `(open path mode)` with `mode` one of
/// the symbols `read`, `write`, `append` selects the access mode.
fn open(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let path_form = tail.head().unwrap_or_else(Value::nil);
    let path = as_path(&eval(scope, &path_form)?)?;
    let mode_form = tail.tail().and_then(|t| t.head());

    let handle = match mode_form {
        None => streams::open_read(&path),
        Some(form) => {
            let mode = eval(scope, &form)?;
            let mode_sym = mode
                .as_symbol()
                .ok_or_else(|| LispError::Custom("open: invalid mode".to_string()).into_value())?;
            match mode_sym.as_ref() {
                b"read" => streams::open_read(&path),
                b"write" => streams::open_write(&path, false),
                b"append" => streams::open_write(&path, true),
                _ => return Err(LispError::Custom("open: invalid mode".to_string()).into()),
            }
        }
    };
    handle
        .map(Value::Stream)
        .map_err(|e| LispError::Custom(format!("cannot open {path}: {e}")).into())
}

fn close(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let form = tail.head().unwrap_or_else(Value::nil);
    let handle = as_stream(&eval(scope, &form)?)?;
    Ok(Value::bool_value(streams::close(handle)))
}

/// `(read stream)` reads one form. End-of-stream yields nil rather than an
/// error; there is no sentinel value in the data model to signal it with.
fn read(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let form = tail.head().unwrap_or_else(Value::nil);
    let handle = as_stream(&eval(scope, &form)?)?;
    match reader::read(handle)? {
        ReadOutcome::Value(v) => Ok(v),
        ReadOutcome::End => Ok(Value::nil()),
    }
}

fn write(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let stream_form = tail.head().unwrap_or_else(Value::nil);
    let value_form = tail.tail().and_then(|t| t.head()).unwrap_or_else(Value::nil);
    let handle = as_stream(&eval(scope, &stream_form)?)?;
    let value = eval(scope, &value_form)?;
    writer::write(handle, &value)
        .map_err(|e| LispError::Custom(format!("write failed: {e}")).into())?;
    Ok(value)
}

fn print_leaves(handle: i64, v: &Value) -> Result<(), Value> {
    let io_err = |e: std::io::Error| LispError::Custom(format!("write failed: {e}")).into_value();
    match v {
        Value::Int(n) => streams::write_str(handle, &n.to_string()).map_err(io_err),
        Value::Symbol(s) => streams::write_bytes(handle, s).map_err(io_err),
        Value::Pair(Some(cell)) => {
            print_leaves(handle, &cell.head.borrow())?;
            print_leaves(handle, &cell.tail.borrow())
        }
        Value::Pair(None) => Ok(()),
        Value::Vector(cells) => {
            for item in cells.borrow().iter() {
                print_leaves(handle, item)?;
            }
            Ok(())
        }
        Value::Primitive(_) | Value::Stream(_) => {
            streams::write_str(handle, &v.to_string()).map_err(io_err)
        }
    }
}

/// Walks `value` recursively, writing the textual representation of each
/// leaf with no separators (spec.md §4.8).
fn print(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let stream_form = tail.head().unwrap_or_else(Value::nil);
    let value_form = tail.tail().and_then(|t| t.head()).unwrap_or_else(Value::nil);
    let handle = as_stream(&eval(scope, &stream_form)?)?;
    let value = eval(scope, &value_form)?;
    print_leaves(handle, &value)?;
    Ok(value)
}

/// As `print`, but emits the raw packed bytes of each leaf rather than text
/// (spec.md §4.8; shares its leaf rule with `pack`).
fn write_bytes(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let stream_form = tail.head().unwrap_or_else(Value::nil);
    let value_form = tail.tail().and_then(|t| t.head()).unwrap_or_else(Value::nil);
    let handle = as_stream(&eval(scope, &stream_form)?)?;
    let value = eval(scope, &value_form)?;
    let mut bytes = Vec::new();
    pack_bytes(&value, &mut bytes);
    streams::write_bytes(handle, &bytes)
        .map_err(|e| LispError::Custom(format!("write failed: {e}")).into())?;
    Ok(value)
}
