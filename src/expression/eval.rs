use crate::expression::ast::{BinaryOp, Expr, UnaryOp};
use crate::expression::bindings::Bindings;
use crate::expression::error::EvalError;
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ValueSlot {
    F64(f64),
    Bool(bool),
}

impl ValueSlot {
    /// Booleans coerce to `1.0` / `0.0`.
    pub(crate) fn as_f64(self) -> f64 {
        match self {
            Self::F64(v) => v,
            Self::Bool(true) => 1.0,
            Self::Bool(false) => 0.0,
        }
    }
}

pub(crate) fn eval_expr(e: &Expr, bindings: &Bindings<'_>) -> Result<ValueSlot, EvalError> {
    match e {
        Expr::Num(v) => Ok(ValueSlot::F64(*v)),
        Expr::Position => Ok(ValueSlot::F64(bindings.position())),
        Expr::Var(name) => bindings
            .get(name)
            .map(ValueSlot::F64)
            .ok_or_else(|| EvalError::UnknownName(name.clone())),
        Expr::Unary { op, expr } => {
            let v = eval_expr(expr, bindings)?.as_f64();
            Ok(ValueSlot::F64(match op {
                UnaryOp::Neg => -v,
                UnaryOp::Plus => v,
            }))
        }
        Expr::Binary { op, left, right } => {
            let a = eval_expr(left, bindings)?.as_f64();
            let b = eval_expr(right, bindings)?.as_f64();
            Ok(match op {
                BinaryOp::Add => ValueSlot::F64(a + b),
                BinaryOp::Sub => ValueSlot::F64(a - b),
                BinaryOp::Mul => ValueSlot::F64(a * b),
                BinaryOp::Div => ValueSlot::F64(a / b),
                BinaryOp::Pow => ValueSlot::F64(a.powf(b)),
                BinaryOp::Eq => ValueSlot::Bool(a == b),
                BinaryOp::Ne => ValueSlot::Bool(a != b),
                BinaryOp::Lt => ValueSlot::Bool(a < b),
                BinaryOp::Le => ValueSlot::Bool(a <= b),
                BinaryOp::Gt => ValueSlot::Bool(a > b),
                BinaryOp::Ge => ValueSlot::Bool(a >= b),
            })
        }
        Expr::Call { func, args } => {
            let mut vals: SmallVec<[f64; 4]> = SmallVec::with_capacity(args.len());
            for a in args {
                vals.push(eval_expr(a, bindings)?.as_f64());
            }
            func.apply(&vals).map(ValueSlot::F64)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/expression/eval.rs"]
mod tests;
