//! Restricted expression language for keyframe values.
//!
//! Source text is lexed and parsed into an [`Expr`] tree, then evaluated against [`Bindings`].
//! Only arithmetic, comparisons, `@`, named lookups and whitelisted [`Builtin`] calls exist.

mod ast;
mod bindings;
mod builtins;
mod cache;
mod error;
mod eval;
mod lexer;
mod parser;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use bindings::Bindings;
pub use builtins::Builtin;
pub use cache::ExprCache;

use crate::foundation::error::SplinalResult;

/// Parse `text` into an expression tree. A leading `=` is accepted.
pub fn parse(text: &str) -> SplinalResult<Expr> {
    let src = text.trim();
    parser::parse_expr(src).map_err(|e| e.into_syntax(src))
}

/// Evaluate `expr` against `bindings`.
pub fn evaluate(expr: &Expr, bindings: &Bindings<'_>) -> SplinalResult<f64> {
    Ok(eval::eval_expr(expr, bindings)?.as_f64())
}
