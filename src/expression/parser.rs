use crate::expression::ast::{BinaryOp, Expr, UnaryOp};
use crate::expression::builtins::{Arity, Builtin};
use crate::expression::error::ExprError;
use crate::expression::lexer::{Span, Token, TokenKind, lex};

/// Longest accepted identifier path: `spline.channel`.
const MAX_PATH_SEGMENTS: usize = 2;

/// Deepest accepted nesting, counting both parentheses/calls and operator trees.
const MAX_DEPTH: usize = 256;

pub(crate) fn parse_expr(src: &str) -> Result<Expr, ExprError> {
    let src = src.trim();
    let src = src.strip_prefix('=').unwrap_or(src);
    let tokens = lex(src)?;
    let mut p = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = p.parse_equality()?;
    p.expect(TokenKind::Eof)?;
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn bump(&mut self) -> Token {
        let t = self.tokens[self.pos].clone();
        if t.kind != TokenKind::Eof {
            self.pos += 1;
        }
        t
    }

    fn span(&self) -> Span {
        self.peek().span
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), ExprError> {
        if self.peek().kind == kind {
            self.bump();
            Ok(())
        } else {
            Err(ExprError::new(
                self.span().start,
                format!("expected {kind:?}, found {:?}", self.peek().kind),
            ))
        }
    }

    fn consume(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn too_deep(&self) -> ExprError {
        ExprError::new(
            self.span().start,
            format!("expression nests deeper than {MAX_DEPTH} levels"),
        )
    }

    /// Run `f` one nesting level down.
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ExprError>,
    ) -> Result<T, ExprError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.too_deep());
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }

    fn checked(&self, e: Expr) -> Result<Expr, ExprError> {
        if e.depth() > MAX_DEPTH {
            return Err(self.too_deep());
        }
        Ok(e)
    }

    fn binary(&self, op: BinaryOp, left: Expr, right: Expr) -> Result<Expr, ExprError> {
        self.checked(Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_equality(&mut self) -> Result<Expr, ExprError> {
        let mut e = self.parse_comparison()?;
        loop {
            let op = if self.consume(TokenKind::EqEq) {
                BinaryOp::Eq
            } else if self.consume(TokenKind::Ne) {
                BinaryOp::Ne
            } else {
                break;
            };
            let r = self.parse_comparison()?;
            e = self.binary(op, e, r)?;
        }
        Ok(e)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ExprError> {
        let mut e = self.parse_term()?;
        loop {
            let op = if self.consume(TokenKind::Lt) {
                BinaryOp::Lt
            } else if self.consume(TokenKind::Le) {
                BinaryOp::Le
            } else if self.consume(TokenKind::Gt) {
                BinaryOp::Gt
            } else if self.consume(TokenKind::Ge) {
                BinaryOp::Ge
            } else {
                break;
            };
            let r = self.parse_term()?;
            e = self.binary(op, e, r)?;
        }
        Ok(e)
    }

    fn parse_term(&mut self) -> Result<Expr, ExprError> {
        let mut e = self.parse_factor()?;
        loop {
            let op = if self.consume(TokenKind::Plus) {
                BinaryOp::Add
            } else if self.consume(TokenKind::Minus) {
                BinaryOp::Sub
            } else {
                break;
            };
            let r = self.parse_factor()?;
            e = self.binary(op, e, r)?;
        }
        Ok(e)
    }

    fn parse_factor(&mut self) -> Result<Expr, ExprError> {
        let mut e = self.parse_unary()?;
        loop {
            let op = if self.consume(TokenKind::Star) {
                BinaryOp::Mul
            } else if self.consume(TokenKind::Slash) {
                BinaryOp::Div
            } else {
                break;
            };
            let r = self.parse_unary()?;
            e = self.binary(op, e, r)?;
        }
        Ok(e)
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        let op = if self.consume(TokenKind::Minus) {
            UnaryOp::Neg
        } else if self.consume(TokenKind::Plus) {
            UnaryOp::Plus
        } else {
            return self.parse_power();
        };
        let e = self.nested(Self::parse_unary)?;
        self.checked(Expr::Unary {
            op,
            expr: Box::new(e),
        })
    }

    // Right-associative and tighter than unary minus: `-2^2 == -4`, `2^3^2 == 2^9`.
    fn parse_power(&mut self) -> Result<Expr, ExprError> {
        let base = self.parse_postfix()?;
        if self.consume(TokenKind::Pow) {
            let exp = self.nested(Self::parse_unary)?;
            return self.binary(BinaryOp::Pow, base, exp);
        }
        Ok(base)
    }

    fn parse_postfix(&mut self) -> Result<Expr, ExprError> {
        let TokenKind::Ident(name) = self.peek().kind.clone() else {
            let e = self.parse_primary()?;
            return match self.peek().kind {
                TokenKind::Dot => Err(ExprError::new(
                    self.span().start,
                    "member access base must be an identifier path",
                )),
                TokenKind::LParen => Err(ExprError::new(
                    self.span().start,
                    "call target must be an identifier",
                )),
                _ => Ok(e),
            };
        };
        let start = self.bump().span.start;

        if self.consume(TokenKind::LParen) {
            let args = self.parse_args()?;
            return self.checked(build_call(start, &name, args)?);
        }

        let mut path = vec![name];
        while self.consume(TokenKind::Dot) {
            let t = self.bump();
            let seg = match t.kind {
                TokenKind::Ident(s) => s,
                other => {
                    return Err(ExprError::new(
                        t.span.start,
                        format!("expected ident after '.', found {other:?}"),
                    ));
                }
            };
            path.push(seg);
            if path.len() > MAX_PATH_SEGMENTS {
                return Err(ExprError::new(
                    t.span.start,
                    format!(
                        "attribute access is not allowed: {:?} (only spline.channel paths)",
                        path.join(".")
                    ),
                ));
            }
        }

        if self.peek().kind == TokenKind::LParen {
            return Err(ExprError::new(
                self.span().start,
                format!(
                    "call target must be a single identifier, got path {:?}",
                    path.join(".")
                ),
            ));
        }

        if path.len() == 1 {
            match path[0].as_str() {
                "pi" => return Ok(Expr::Num(std::f64::consts::PI)),
                "e" => return Ok(Expr::Num(std::f64::consts::E)),
                _ => {}
            }
        }
        Ok(Expr::Var(path.join(".")))
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, ExprError> {
        let mut args = Vec::new();
        if self.consume(TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.nested(Self::parse_equality)?);
            if self.consume(TokenKind::Comma) {
                continue;
            }
            self.expect(TokenKind::RParen)?;
            return Ok(args);
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        let t = self.bump();
        match t.kind {
            TokenKind::Number(v) => Ok(Expr::Num(v)),
            TokenKind::At => Ok(Expr::Position),
            TokenKind::LParen => {
                let e = self.nested(Self::parse_equality)?;
                self.expect(TokenKind::RParen)?;
                Ok(e)
            }
            other => Err(ExprError::new(
                t.span.start,
                format!("unexpected token {other:?}"),
            )),
        }
    }
}

fn build_call(offset: usize, name: &str, args: Vec<Expr>) -> Result<Expr, ExprError> {
    let func = Builtin::lookup(name)
        .ok_or_else(|| ExprError::new(offset, format!("function \"{name}\" is not allowed")))?;
    let arity = func.arity();
    if !arity.accepts(args.len()) {
        let expected = match arity {
            Arity::Exact(n) => format!("{n}"),
            Arity::AtLeast(n) => format!("at least {n}"),
        };
        return Err(ExprError::new(
            offset,
            format!(
                "{name} expects {expected} argument(s), got {}",
                args.len()
            ),
        ));
    }
    Ok(Expr::Call { func, args })
}

#[cfg(test)]
#[path = "../../tests/unit/expression/parser.rs"]
mod tests;
