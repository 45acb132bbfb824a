// ABOUTME: Host-side error type for failures that happen before they can be
// ABOUTME: represented as ordinary Lisp values; every variant interns to one.

use crate::symbols::intern_str;
use crate::value::Value;
use thiserror::Error;

// ===== Well-known diagnostic text (spec.md §7) =====
pub const ERR_ILLEGAL_DOTTED_LIST: &str = "illegal dotted list";
pub const ERR_EXPECTED_CLOSE: &str = "expected closing parentheses";
pub const ERR_CANNOT_EXEC_VEC: &str = "cannot execute a vector";
pub const ERR_INVALID_NAME: &str = "invalid name. expected a symbol";
pub const ERR_EXPECTED_PAIR: &str = "expected a pair";
pub const ERR_EXPECTED_INT: &str = "expected an integer";
pub const ERR_ILLEGAL_LAMBDA_LIST: &str = "illegal lambda list";
pub const ERR_INVALID_SEQUENCE: &str = "invalid sequence";
pub const ERR_UPVAL_AT_TOPLEVEL: &str = "cannot upval at toplevel";
pub const ERR_UNEXPECTED_EOF: &str = "unexpected end of stream";

#[derive(Error, Debug, Clone)]
pub enum LispError {
    #[error("illegal dotted list")]
    IllegalDottedList,

    #[error("expected closing parentheses")]
    ExpectedClosingParen,

    #[error("cannot execute a vector")]
    CannotExecuteVector,

    #[error("invalid name. expected a symbol")]
    InvalidName,

    #[error("expected a pair")]
    ExpectedPair,

    #[error("expected an integer")]
    ExpectedInteger,

    #[error("illegal lambda list")]
    IllegalLambdaList,

    #[error("invalid sequence")]
    InvalidSequence,

    #[error("cannot upval at toplevel")]
    UpvalAtToplevel,

    #[error("no such stream handle: {0}")]
    UnknownStream(i64),

    #[error("{0}: expected {1} argument{2}, got {3}")]
    ArityMismatch(&'static str, &'static str, &'static str, usize),

    #[error("{0}")]
    Custom(String),
}

impl LispError {
    pub fn arity(function: &'static str, expected: &'static str, actual: usize) -> Self {
        let plural = if expected == "1" { "" } else { "s" };
        LispError::ArityMismatch(function, expected, plural, actual)
    }

    /// Converts a host-side error into the uniform in-language representation:
    /// a Symbol carrying its diagnostic text, interned once.
    pub fn into_value(self) -> Value {
        Value::Symbol(intern_str(&self.to_string()))
    }
}

impl From<LispError> for Value {
    fn from(e: LispError) -> Value {
        e.into_value()
    }
}
