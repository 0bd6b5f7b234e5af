use crate::expression::{self, Bindings, Expr, ExprCache};
use crate::foundation::error::{SplinalError, SplinalResult};
use crate::interp::Method;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Expression-valued keyframe payload: the source text and its parsed tree.
#[derive(Clone, Debug)]
pub struct Expression {
    src: String,
    tree: Arc<Expr>,
}

impl Expression {
    /// Parse `src` without a shared cache.
    pub fn parse(src: &str) -> SplinalResult<Self> {
        let src = src.trim();
        Ok(Self {
            src: src.to_owned(),
            tree: Arc::new(expression::parse(src)?),
        })
    }

    pub(crate) fn parse_cached(src: &str, cache: &ExprCache) -> SplinalResult<Self> {
        let src = src.trim();
        Ok(Self {
            src: src.to_owned(),
            tree: cache.get_or_parse(src)?,
        })
    }

    /// Source text as written.
    pub fn source(&self) -> &str {
        &self.src
    }

    /// Parsed tree.
    pub fn tree(&self) -> &Expr {
        &self.tree
    }

    pub(crate) fn intern(&mut self, cache: &ExprCache) -> SplinalResult<()> {
        self.tree = cache.get_or_parse(&self.src)?;
        Ok(())
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.src == other.src
    }
}

/// Value of a keyframe.
#[derive(Clone, Debug, PartialEq)]
pub enum KeyframeValue {
    /// A fixed number.
    Literal(f64),
    /// An expression evaluated per query.
    Expr(Expression),
}

impl KeyframeValue {
    /// Parse a number, or failing that an expression.
    pub fn parse(text: &str) -> SplinalResult<Self> {
        Self::parse_with(text, None)
    }

    pub(crate) fn parse_with(text: &str, cache: Option<&ExprCache>) -> SplinalResult<Self> {
        let text = text.trim();
        if let Ok(v) = text.parse::<f64>() {
            if !v.is_finite() {
                return Err(SplinalError::value(format!(
                    "keyframe value \"{text}\" is not finite"
                )));
            }
            return Ok(Self::Literal(v));
        }
        let expr = match cache {
            Some(c) => Expression::parse_cached(text, c)?,
            None => Expression::parse(text)?,
        };
        Ok(Self::Expr(expr))
    }
}

impl From<f64> for KeyframeValue {
    fn from(v: f64) -> Self {
        Self::Literal(v)
    }
}

impl From<Expression> for KeyframeValue {
    fn from(e: Expression) -> Self {
        Self::Expr(e)
    }
}

impl fmt::Display for KeyframeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(v) => write!(f, "{v}"),
            Self::Expr(e) => f.write_str(e.source()),
        }
    }
}

/// A `(position, value)` anchor of a channel.
#[derive(Clone, Debug, PartialEq)]
pub struct Keyframe {
    /// Position in the channel's coordinate space (raw index in index mode).
    pub at: f64,
    /// Literal or expression value.
    pub value: KeyframeValue,
    /// Method for the segment starting here. `None` uses the channel default.
    pub method: Option<Method>,
}

impl Keyframe {
    /// Keyframe using the channel default method.
    pub fn new(at: f64, value: impl Into<KeyframeValue>) -> Self {
        Self {
            at,
            value: value.into(),
            method: None,
        }
    }

    /// Expression keyframe; syntax errors surface here.
    pub fn expr(at: f64, src: &str) -> SplinalResult<Self> {
        Ok(Self::new(at, Expression::parse(src)?))
    }

    /// Set the method of the segment starting at this keyframe.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Declared hermite tangent, `0` unless the keyframe's method is hermite.
    pub fn deriv(&self) -> f64 {
        match self.method {
            Some(Method::Hermite { deriv }) => deriv,
            _ => 0.0,
        }
    }

    /// Return `true` when the value does not depend on the query.
    pub fn is_literal(&self) -> bool {
        matches!(self.value, KeyframeValue::Literal(_))
    }

    /// Expression source, if the value is an expression.
    pub fn expression(&self) -> Option<&str> {
        match &self.value {
            KeyframeValue::Literal(_) => None,
            KeyframeValue::Expr(e) => Some(e.source()),
        }
    }

    /// Resolve the value against `bindings`.
    pub fn resolve(&self, bindings: &Bindings<'_>) -> SplinalResult<f64> {
        match &self.value {
            KeyframeValue::Literal(v) => Ok(*v),
            KeyframeValue::Expr(e) => expression::evaluate(e.tree(), bindings),
        }
    }

    /// Parse shorthand `<at>:<value>[@<method>[{k=v,...}]]`, sharing parsed trees via `cache`.
    pub fn parse_with(text: &str, cache: &ExprCache) -> SplinalResult<Self> {
        parse_shorthand(text, Some(cache))
    }

    pub(crate) fn intern(&mut self, cache: &ExprCache) -> SplinalResult<()> {
        match &mut self.value {
            KeyframeValue::Literal(_) => Ok(()),
            KeyframeValue::Expr(e) => e.intern(cache),
        }
    }
}

/// Shorthand `<at>:<value>[@<method>]`, e.g. `0.5:sin(@*pi)@cubic` or
/// `1:10@bezier{cp=0.6,6,0.7,5}`.
///
/// An `@` followed by a letter starts the method; any other `@` belongs to the value.
impl FromStr for Keyframe {
    type Err = SplinalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_shorthand(s, None)
    }
}

fn parse_shorthand(text: &str, cache: Option<&ExprCache>) -> SplinalResult<Keyframe> {
    let (at_src, rest) = text
        .split_once(':')
        .ok_or_else(|| SplinalError::value(format!("expected <at>:<value> in \"{text}\"")))?;
    let at = at_src
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            SplinalError::value(format!("invalid keyframe position \"{}\"", at_src.trim()))
        })?;

    let starts_method = |m: &str| m.trim_start().starts_with(|c: char| c.is_ascii_alphabetic());
    let (value_src, method) = match rest.rsplit_once('@') {
        Some((value, method)) if starts_method(method) => (value, Some(method.parse::<Method>()?)),
        _ => (rest, None),
    };
    if value_src.trim().is_empty() {
        return Err(SplinalError::value(format!("missing keyframe value in \"{text}\"")));
    }

    Ok(Keyframe {
        at,
        value: KeyframeValue::parse_with(value_src, cache)?,
        method,
    })
}

impl fmt::Display for Keyframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.at, self.value)?;
        if let Some(m) = &self.method {
            write!(f, "@{m}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/keyframe.rs"]
mod tests;
