// ABOUTME: Parses a character (byte) stream into Values, one per call, per
// ABOUTME: spec.md §4.1. Errors and end-of-stream are reported as Values too.

use crate::error::LispError;
use crate::streams;
use crate::symbols::{intern, intern_str};
use crate::value::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// What a single top-level read produced: a value, or the end-of-stream
/// sentinel the REPL driver and `load` recognize (spec.md §4.1).
pub enum ReadOutcome {
    Value(Value),
    End,
}

fn io_err(e: std::io::Error) -> Value {
    LispError::Custom(format!("io error: {e}")).into_value()
}

fn next_byte(handle: i64) -> Result<Option<u8>, Value> {
    streams::read_byte(handle).map_err(io_err)
}

fn peek_byte(handle: i64) -> Result<Option<u8>, Value> {
    match next_byte(handle)? {
        None => Ok(None),
        Some(b) => {
            streams::push_back(handle, b);
            Ok(Some(b))
        }
    }
}

/// Peeks two bytes ahead without consuming either.
fn peek2(handle: i64) -> Result<(Option<u8>, Option<u8>), Value> {
    let b1 = next_byte(handle)?;
    let b1 = match b1 {
        Some(b) => b,
        None => return Ok((None, None)),
    };
    let b2 = next_byte(handle)?;
    if let Some(b2v) = b2 {
        streams::push_back(handle, b2v);
    }
    streams::push_back(handle, b1);
    Ok((Some(b1), b2))
}

fn is_delim(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'(' | b')' | b'[' | b']')
}

fn skip_whitespace(handle: i64) -> Result<(), Value> {
    loop {
        match peek_byte(handle)? {
            Some(b) if b.is_ascii_whitespace() => {
                next_byte(handle)?;
            }
            _ => return Ok(()),
        }
    }
}

fn unexpected_eof() -> Value {
    LispError::Custom(crate::error::ERR_UNEXPECTED_EOF.to_string()).into_value()
}

/// True if the next two bytes are a standalone `.` token: the byte `.`
/// immediately followed by a delimiter or end-of-stream, as opposed to a
/// symbol that merely starts with `.` (spec.md §4.1).
fn peeking_standalone_dot(handle: i64) -> Result<bool, Value> {
    let (b1, b2) = peek2(handle)?;
    Ok(b1 == Some(b'.') && b2.map(is_delim).unwrap_or(true))
}

/// Reads exactly one top-level value from `handle`, or `ReadOutcome::End` at
/// end of stream. This is the only place end-of-stream is not an error.
pub fn read(handle: i64) -> Result<ReadOutcome, Value> {
    skip_whitespace(handle)?;
    match peek_byte(handle)? {
        None => Ok(ReadOutcome::End),
        Some(_) => Ok(ReadOutcome::Value(read_expr(handle)?)),
    }
}

fn read_expr(handle: i64) -> Result<Value, Value> {
    skip_whitespace(handle)?;
    let b = match peek_byte(handle)? {
        Some(b) => b,
        None => return Err(unexpected_eof()),
    };
    match b {
        b'(' => read_list(handle),
        b'[' => read_vector(handle),
        b')' | b']' => Err(LispError::ExpectedClosingParen.into()),
        b'"' => read_string(handle),
        b'\'' => {
            next_byte(handle)?;
            let inner = read_expr(handle)?;
            Ok(Value::cons(Value::Symbol(intern_str("quote")), inner))
        }
        b',' => {
            next_byte(handle)?;
            let inner = read_expr(handle)?;
            Ok(Value::cons(Value::Symbol(intern_str("unquote")), inner))
        }
        b'-' => {
            next_byte(handle)?;
            match peek_byte(handle)? {
                Some(d) if d.is_ascii_digit() => read_integer(handle, -1),
                _ => read_symbol_from(handle, b'-'),
            }
        }
        b'0'..=b'9' => read_integer(handle, 1),
        _ => {
            next_byte(handle)?;
            read_symbol_from(handle, b)
        }
    }
}

fn read_integer(handle: i64, sign: i64) -> Result<Value, Value> {
    let mut acc: i64 = 0;
    loop {
        match peek_byte(handle)? {
            Some(d) if d.is_ascii_digit() => {
                acc = acc.wrapping_mul(10).wrapping_add((d - b'0') as i64);
                next_byte(handle)?;
            }
            _ => break,
        }
    }
    Ok(Value::Int(acc.wrapping_mul(sign)))
}

fn read_symbol_from(handle: i64, first: u8) -> Result<Value, Value> {
    let mut buf = vec![first];
    loop {
        match peek_byte(handle)? {
            Some(b) if !is_delim(b) => {
                buf.push(b);
                next_byte(handle)?;
            }
            _ => break,
        }
    }
    Ok(Value::Symbol(intern(&buf)))
}

fn read_string(handle: i64) -> Result<Value, Value> {
    next_byte(handle)?; // opening quote
    let mut buf = Vec::new();
    loop {
        match next_byte(handle)? {
            None => return Err(unexpected_eof()),
            Some(b'"') => return Ok(Value::Symbol(intern(&buf))),
            Some(b'\\') => match next_byte(handle)? {
                None => return Err(unexpected_eof()),
                // Backslash escapes the next character verbatim; no
                // escape-name translation (\n yields literal 'n').
                Some(escaped) => buf.push(escaped),
            },
            Some(b) => buf.push(b),
        }
    }
}

fn read_list(handle: i64) -> Result<Value, Value> {
    next_byte(handle)?; // opening paren
    skip_whitespace(handle)?;
    if peek_byte(handle)? == Some(b')') {
        next_byte(handle)?;
        return Ok(Value::nil());
    }
    if peeking_standalone_dot(handle)? {
        return Err(LispError::IllegalDottedList.into());
    }

    let mut items = vec![read_expr(handle)?];
    loop {
        skip_whitespace(handle)?;
        match peek_byte(handle)? {
            None => return Err(unexpected_eof()),
            Some(b')') => {
                next_byte(handle)?;
                return Ok(Value::list(items));
            }
            _ => {
                if peeking_standalone_dot(handle)? {
                    next_byte(handle)?; // consume '.'
                    skip_whitespace(handle)?;
                    let tail = read_expr(handle)?;
                    skip_whitespace(handle)?;
                    return match peek_byte(handle)? {
                        Some(b')') => {
                            next_byte(handle)?;
                            Ok(Value::dotted_list(items, tail))
                        }
                        _ => Err(LispError::IllegalDottedList.into()),
                    };
                }
                items.push(read_expr(handle)?);
            }
        }
    }
}

fn read_vector(handle: i64) -> Result<Value, Value> {
    next_byte(handle)?; // opening bracket
    let mut items = Vec::new();
    loop {
        skip_whitespace(handle)?;
        match peek_byte(handle)? {
            None => return Err(unexpected_eof()),
            Some(b']') => {
                next_byte(handle)?;
                return Ok(Value::Vector(Rc::new(RefCell::new(items))));
            }
            _ => items.push(read_expr(handle)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn read_one(src: &str) -> Result<Value, Value> {
        let handle = streams::open_in_memory_input(src.as_bytes().to_vec());
        let result = match read(handle) {
            Ok(ReadOutcome::Value(v)) => Ok(v),
            Ok(ReadOutcome::End) => panic!("expected a value, got end of stream"),
            Err(e) => Err(e),
        };
        streams::close(handle);
        result
    }

    #[test]
    #[serial]
    fn reads_positive_and_negative_integers() {
        assert_eq!(read_one("42").unwrap(), Value::Int(42));
        assert_eq!(read_one("-7").unwrap(), Value::Int(-7));
        assert_eq!(read_one("0").unwrap(), Value::Int(0));
    }

    #[test]
    #[serial]
    fn minus_without_digit_is_a_symbol() {
        let v = read_one("-foo").unwrap();
        assert_eq!(v.as_symbol().unwrap().as_ref(), b"-foo");
    }

    #[test]
    #[serial]
    fn reads_plain_symbol() {
        let v = read_one("hello").unwrap();
        assert_eq!(v.as_symbol().unwrap().as_ref(), b"hello");
    }

    #[test]
    #[serial]
    fn reads_quoted_string_as_symbol_with_verbatim_escapes() {
        let v = read_one(r#""a\nb""#).unwrap();
        // \n is a literal backslash-n pair escaped to just 'n', not a newline.
        assert_eq!(v.as_symbol().unwrap().as_ref(), b"anb");
    }

    #[test]
    #[serial]
    fn empty_list_reads_as_nil() {
        assert!(read_one("()").unwrap().is_nil());
    }

    #[test]
    #[serial]
    fn proper_list_reads_as_chained_pairs() {
        let v = read_one("(1 2 3)").unwrap();
        let items: Vec<Value> = v.iter_list().collect();
        assert_eq!(items, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert!(v.list_tail().is_nil());
    }

    #[test]
    #[serial]
    fn dotted_pair_reads_with_improper_tail() {
        let v = read_one("(1 . 2)").unwrap();
        assert_eq!(v.head().unwrap(), Value::Int(1));
        assert_eq!(v.tail().unwrap(), Value::Int(2));
    }

    #[test]
    #[serial]
    fn dotted_list_with_multiple_leading_elements() {
        let v = read_one("(1 2 . 3)").unwrap();
        let items: Vec<Value> = v.iter_list().collect();
        assert_eq!(items, vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(v.list_tail(), Value::Int(3));
    }

    #[test]
    #[serial]
    fn dot_followed_by_two_elements_is_illegal() {
        let err = read_one("(1 . 2 3)").unwrap_err();
        assert_eq!(err.as_symbol().unwrap().as_ref(), b"illegal dotted list");
    }

    #[test]
    #[serial]
    fn dot_with_no_preceding_element_is_illegal() {
        let err = read_one("(. 2)").unwrap_err();
        assert_eq!(err.as_symbol().unwrap().as_ref(), b"illegal dotted list");
    }

    #[test]
    #[serial]
    fn stray_close_paren_is_an_error() {
        let err = read_one(")").unwrap_err();
        assert_eq!(
            err.as_symbol().unwrap().as_ref(),
            b"expected closing parentheses"
        );
    }

    #[test]
    #[serial]
    fn vector_reads_positionally() {
        let v = read_one("[1 2 3]").unwrap();
        match v {
            Value::Vector(cells) => {
                assert_eq!(*cells.borrow(), vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
            }
            _ => panic!("expected a vector"),
        }
    }

    #[test]
    #[serial]
    fn quote_reads_as_dotted_pair_with_head_quote() {
        let v = read_one("'foo").unwrap();
        assert_eq!(v.head().unwrap().as_symbol().unwrap().as_ref(), b"quote");
        assert_eq!(v.tail().unwrap().as_symbol().unwrap().as_ref(), b"foo");
    }

    #[test]
    #[serial]
    fn unquote_reads_as_dotted_pair() {
        let v = read_one(",foo").unwrap();
        assert_eq!(v.head().unwrap().as_symbol().unwrap().as_ref(), b"unquote");
    }

    #[test]
    #[serial]
    fn end_of_stream_yields_end_outcome() {
        let handle = streams::open_in_memory_input(b"   ".to_vec());
        assert!(matches!(read(handle).unwrap(), ReadOutcome::End));
        streams::close(handle);
    }
}
