use crate::foundation::error::SplinalError;
use std::fmt;

/// Lexing/parsing failure at a byte offset of the (trimmed) source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExprError {
    pub(crate) offset: usize,
    pub(crate) message: String,
}

impl ExprError {
    pub(crate) fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }

    pub(crate) fn into_syntax(self, src: &str) -> SplinalError {
        SplinalError::Syntax {
            src: src.to_owned(),
            offset: self.offset,
            message: self.message,
        }
    }
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expr error at byte {}: {}", self.offset, self.message)
    }
}

impl std::error::Error for ExprError {}

/// Tree-walk failure.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EvalError {
    UnknownName(String),
    Domain(String),
}

impl From<EvalError> for SplinalError {
    fn from(e: EvalError) -> Self {
        match e {
            EvalError::UnknownName(name) => SplinalError::Name { name },
            EvalError::Domain(msg) => SplinalError::Value(msg),
        }
    }
}
