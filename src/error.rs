use std::fmt;

use crate::value::Arity;

//===----------------------------------------------------------------------===//
// Error
//===----------------------------------------------------------------------===//

/// Everything that can go wrong while reading or evaluating an expression.
///
/// Evaluation failures are carried as `Err(RascalError)` through the
/// evaluator and converted into an `Error` heap value at the top level, so
/// a failing expression aborts only itself and the session keeps running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RascalError {
    /// A symbol had no binding in any enclosing frame.
    UnboundSymbol(String),
    /// A procedure was called with the wrong number of arguments.
    ArityMismatch { name: String, expected: Arity, got: usize },
    /// An operation was applied to a value of the wrong kind.
    TypeMismatch { expected: &'static str, got: &'static str },
    /// Division or modulo by zero, or a domain error in `pow`.
    Arithmetic(String),
    /// The head of a call form evaluated to something that is not callable.
    NotApplicable(&'static str),
    /// Malformed source text, surfaced by the reader.
    ReadError(String),
}

impl fmt::Display for RascalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RascalError::UnboundSymbol(name) => {
                write!(f, "Unbound symbol: {}", name)
            }
            RascalError::ArityMismatch { name, expected, got } => {
                write!(f, "Arity error: {} takes {} argument(s), got {}", name, expected, got)
            }
            RascalError::TypeMismatch { expected, got } => {
                write!(f, "Type error: expected {}, got {}", expected, got)
            }
            RascalError::Arithmetic(msg) => write!(f, "Arithmetic error: {}", msg),
            RascalError::NotApplicable(kind) => {
                write!(f, "Type error: {} is not applicable", kind)
            }
            RascalError::ReadError(msg) => write!(f, "Read error: {}", msg),
        }
    }
}

impl std::error::Error for RascalError {}

pub type EvalResult<T> = Result<T, RascalError>;
