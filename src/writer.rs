// ABOUTME: Renders Values back to text, the inverse of reader.rs (spec.md
// ABOUTME: §4.2). Bare-vs-quoted symbol printing mirrors the reference
// ABOUTME: implementation's veclisp_contains_special_chars.

use crate::streams;
use crate::value::Value;
use std::fmt;
use std::io;

/// True if `bytes` cannot be printed bare and must be quoted as a string:
/// it contains whitespace or one of `( ) [ ] "` anywhere, or starts with
/// `. ' ,` (which the reader would otherwise treat as list-dot, quote, or
/// unquote syntax). Ported from the reference implementation's
/// `veclisp_contains_special_chars`.
fn needs_quoting(bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return true;
    }
    if matches!(bytes[0], b'.' | b'\'' | b',') {
        return true;
    }
    bytes
        .iter()
        .any(|&b| b.is_ascii_whitespace() || matches!(b, b'(' | b')' | b'[' | b']' | b'"'))
}

fn push_quoted_symbol(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.push(b'"');
    for &b in bytes {
        if b == b'"' || b == b'\\' {
            buf.push(b'\\');
        }
        buf.push(b);
    }
    buf.push(b'"');
}

fn push_value(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Int(n) => buf.extend_from_slice(n.to_string().as_bytes()),
        Value::Symbol(s) => {
            if needs_quoting(s) {
                push_quoted_symbol(buf, s);
            } else {
                buf.extend_from_slice(s);
            }
        }
        Value::Vector(cells) => {
            buf.push(b'[');
            for (i, item) in cells.borrow().iter().enumerate() {
                if i > 0 {
                    buf.push(b' ');
                }
                push_value(buf, item);
            }
            buf.push(b']');
        }
        Value::Pair(None) => buf.extend_from_slice(b"()"),
        Value::Pair(Some(cell)) => {
            buf.push(b'(');
            push_value(buf, &cell.head.borrow());
            let mut tail = cell.tail.borrow().clone();
            loop {
                match tail {
                    Value::Pair(None) => break,
                    Value::Pair(Some(ref next)) => {
                        buf.push(b' ');
                        push_value(buf, &next.head.borrow());
                        let next_tail = next.tail.borrow().clone();
                        tail = next_tail;
                    }
                    other => {
                        buf.extend_from_slice(b" . ");
                        push_value(buf, &other);
                        break;
                    }
                }
            }
            buf.push(b')');
        }
        Value::Primitive(p) => {
            buf.extend_from_slice(b"#<primitive ");
            buf.extend_from_slice(p.name.as_bytes());
            buf.push(b'>');
        }
        Value::Stream(handle) => {
            buf.extend_from_slice(format!("#<stream {handle}>").as_bytes());
        }
    }
}

/// Renders `value` to its canonical textual form.
pub fn canonical_bytes(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    push_value(&mut buf, value);
    buf
}

/// Writes `value`'s canonical text to the stream registered under `handle`.
pub fn write(handle: i64, value: &Value) -> io::Result<()> {
    streams::write_bytes(handle, &canonical_bytes(value))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = canonical_bytes(self);
        f.write_str(&String::from_utf8_lossy(&bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::intern_str;

    fn render(v: &Value) -> String {
        String::from_utf8(canonical_bytes(v)).unwrap()
    }

    #[test]
    fn integers_render_decimal() {
        assert_eq!(render(&Value::Int(-42)), "-42");
        assert_eq!(render(&Value::Int(0)), "0");
    }

    #[test]
    fn plain_symbols_render_bare() {
        assert_eq!(render(&Value::Symbol(intern_str("hello"))), "hello");
    }

    #[test]
    fn symbols_with_whitespace_render_quoted() {
        assert_eq!(render(&Value::Symbol(intern_str("a b"))), "\"a b\"");
    }

    #[test]
    fn symbols_starting_with_dot_quote_or_comma_render_quoted() {
        assert_eq!(render(&Value::Symbol(intern_str(".foo"))), "\".foo\"");
        assert_eq!(render(&Value::Symbol(intern_str("'foo"))), "\"'foo\"");
        assert_eq!(render(&Value::Symbol(intern_str(",foo"))), "\",foo\"");
    }

    #[test]
    fn symbol_containing_dot_not_at_start_renders_bare() {
        assert_eq!(render(&Value::Symbol(intern_str("a.b"))), "a.b");
    }

    #[test]
    fn embedded_quote_and_backslash_are_escaped() {
        assert_eq!(
            render(&Value::Symbol(intern_str("a\"b\\c"))),
            "\"a\\\"b\\\\c\""
        );
    }

    #[test]
    fn nil_renders_as_empty_parens() {
        assert_eq!(render(&Value::nil()), "()");
    }

    #[test]
    fn proper_list_renders_space_separated() {
        let l = Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(render(&l), "(1 2 3)");
    }

    #[test]
    fn dotted_pair_renders_with_dot() {
        let p = Value::cons(Value::Int(1), Value::Int(2));
        assert_eq!(render(&p), "(1 . 2)");
    }

    #[test]
    fn dotted_list_renders_with_trailing_dot() {
        let l = Value::dotted_list(vec![Value::Int(1), Value::Int(2)], Value::Int(3));
        assert_eq!(render(&l), "(1 2 . 3)");
    }

    #[test]
    fn vector_renders_bracketed() {
        let v = Value::Vector(std::rc::Rc::new(std::cell::RefCell::new(vec![
            Value::Int(1),
            Value::Int(2),
        ])));
        assert_eq!(render(&v), "[1 2]");
    }

    #[test]
    fn nested_lists_render_recursively() {
        let inner = Value::list(vec![Value::Int(2), Value::Int(3)]);
        let outer = Value::list(vec![Value::Int(1), inner]);
        assert_eq!(render(&outer), "(1 (2 3))");
    }

    #[test]
    fn quote_round_trips_as_dotted_quote_form() {
        let v = Value::cons(Value::Symbol(intern_str("quote")), Value::Symbol(intern_str("x")));
        assert_eq!(render(&v), "(quote . x)");
    }
}
