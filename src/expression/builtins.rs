use crate::expression::error::EvalError;

/// Whitelisted functions callable from keyframe expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// `sin(x)`
    Sin,
    /// `cos(x)`
    Cos,
    /// `tan(x)`
    Tan,
    /// `asin(x)`
    Asin,
    /// `acos(x)`
    Acos,
    /// `atan(x)`
    Atan,
    /// `atan2(y, x)`
    Atan2,
    /// `sqrt(x)`
    Sqrt,
    /// `abs(x)`
    Abs,
    /// `exp(x)`
    Exp,
    /// Natural logarithm, `log(x)`.
    Log,
    /// `log10(x)`
    Log10,
    /// `floor(x)`
    Floor,
    /// `ceil(x)`
    Ceil,
    /// `round(x)`, half away from zero.
    Round,
    /// `pow(x, y)`
    Pow,
    /// `min(a, b, ...)`
    Min,
    /// `max(a, b, ...)`
    Max,
    /// `clamp(x, lo, hi)`
    Clamp,
    /// `lerp(a, b, t)`
    Lerp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    pub(crate) fn accepts(self, n: usize) -> bool {
        match self {
            Self::Exact(k) => n == k,
            Self::AtLeast(k) => n >= k,
        }
    }
}

impl Builtin {
    pub(crate) fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            "asin" => Self::Asin,
            "acos" => Self::Acos,
            "atan" => Self::Atan,
            "atan2" => Self::Atan2,
            "sqrt" => Self::Sqrt,
            "abs" => Self::Abs,
            "exp" => Self::Exp,
            "log" => Self::Log,
            "log10" => Self::Log10,
            "floor" => Self::Floor,
            "ceil" => Self::Ceil,
            "round" => Self::Round,
            "pow" => Self::Pow,
            "min" => Self::Min,
            "max" => Self::Max,
            "clamp" => Self::Clamp,
            "lerp" => Self::Lerp,
            _ => return None,
        })
    }

    /// Source-level name of this function.
    pub fn name(self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Asin => "asin",
            Self::Acos => "acos",
            Self::Atan => "atan",
            Self::Atan2 => "atan2",
            Self::Sqrt => "sqrt",
            Self::Abs => "abs",
            Self::Exp => "exp",
            Self::Log => "log",
            Self::Log10 => "log10",
            Self::Floor => "floor",
            Self::Ceil => "ceil",
            Self::Round => "round",
            Self::Pow => "pow",
            Self::Min => "min",
            Self::Max => "max",
            Self::Clamp => "clamp",
            Self::Lerp => "lerp",
        }
    }

    pub(crate) fn arity(self) -> Arity {
        match self {
            Self::Atan2 | Self::Pow => Arity::Exact(2),
            Self::Min | Self::Max => Arity::AtLeast(2),
            Self::Clamp | Self::Lerp => Arity::Exact(3),
            _ => Arity::Exact(1),
        }
    }

    /// Apply to already-evaluated arguments. Arity was checked by the parser.
    pub(crate) fn apply(self, args: &[f64]) -> Result<f64, EvalError> {
        let arg = |i: usize| {
            args.get(i).copied().ok_or_else(|| {
                EvalError::Domain(format!("{} expects more arguments", self.name()))
            })
        };
        Ok(match self {
            Self::Sin => arg(0)?.sin(),
            Self::Cos => arg(0)?.cos(),
            Self::Tan => arg(0)?.tan(),
            Self::Asin => arg(0)?.asin(),
            Self::Acos => arg(0)?.acos(),
            Self::Atan => arg(0)?.atan(),
            Self::Atan2 => arg(0)?.atan2(arg(1)?),
            Self::Sqrt => arg(0)?.sqrt(),
            Self::Abs => arg(0)?.abs(),
            Self::Exp => arg(0)?.exp(),
            Self::Log => arg(0)?.ln(),
            Self::Log10 => arg(0)?.log10(),
            Self::Floor => arg(0)?.floor(),
            Self::Ceil => arg(0)?.ceil(),
            Self::Round => arg(0)?.round(),
            Self::Pow => arg(0)?.powf(arg(1)?),
            Self::Min => args.iter().copied().fold(f64::INFINITY, f64::min),
            Self::Max => args.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Self::Clamp => {
                let (x, lo, hi) = (arg(0)?, arg(1)?, arg(2)?);
                if lo > hi || lo.is_nan() || hi.is_nan() {
                    return Err(EvalError::Domain(format!(
                        "clamp bounds out of order: lo={lo}, hi={hi}"
                    )));
                }
                x.clamp(lo, hi)
            }
            Self::Lerp => {
                let (a, b, t) = (arg(0)?, arg(1)?, arg(2)?);
                a + (b - a) * t
            }
        })
    }
}
