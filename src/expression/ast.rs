use crate::expression::builtins::Builtin;

/// Parsed expression tree.
///
/// Function calls are resolved against the whitelist at parse time, so a tree can only ever
/// contain [`Builtin`] calls.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal or folded named constant (`pi`, `e`).
    Num(f64),
    /// The normalized query position, written `@`.
    Position,
    /// Named variable: a solver variable, a channel name, or `spline.channel`.
    Var(String),
    /// Unary operator application.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        expr: Box<Expr>,
    },
    /// Binary operator application.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Whitelisted function call.
    Call {
        /// Function.
        func: Builtin,
        /// Arguments, arity already checked.
        args: Vec<Expr>,
    },
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `+x`
    Plus,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `^` or `**`
    Pow,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl Expr {
    /// Height of the tree; a leaf is 1.
    pub(crate) fn depth(&self) -> usize {
        match self {
            Expr::Num(_) | Expr::Position | Expr::Var(_) => 1,
            Expr::Unary { expr, .. } => 1 + expr.depth(),
            Expr::Binary { left, right, .. } => 1 + left.depth().max(right.depth()),
            Expr::Call { args, .. } => 1 + args.iter().map(Expr::depth).max().unwrap_or(0),
        }
    }
}
