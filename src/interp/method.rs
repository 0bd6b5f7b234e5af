use crate::foundation::error::{SplinalError, SplinalResult};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Interpolation algorithm used between two keyframes, with its parameters.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Method {
    /// Value of the closer bracketing keyframe; a tie picks the left one.
    Nearest,
    /// Value of the left bracketing keyframe.
    Step,
    /// Straight line between the bracketing keyframes.
    #[default]
    Linear,
    /// Parabola through the bracketing pair and the nearer outer neighbour.
    Quadratic,
    /// Catmull-Rom style cubic Hermite with finite-difference tangents.
    Cubic,
    /// Single Lagrange polynomial through every keyframe of the channel.
    Polynomial,
    /// Cubic Hermite with explicit tangents.
    Hermite {
        /// Tangent (dv/dposition) at this keyframe.
        deriv: f64,
    },
    /// Cubic Bezier towards the next keyframe.
    Bezier {
        /// Control points `[x1, y1, x2, y2]` in absolute (position, value) space.
        /// `None` places them at thirds, which traces a straight line.
        cp: Option<[f64; 4]>,
    },
    /// Monotone piecewise cubic (Fritsch-Carlson).
    Pchip,
    /// Gaussian-kernel weighted mean of all keyframe values. Not interpolating.
    Gaussian {
        /// Kernel bandwidth in position units. Defaults to the mean keyframe spacing.
        width: Option<f64>,
    },
}

/// Payload-free tag of a [`Method`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MethodKind {
    /// [`Method::Nearest`]
    Nearest,
    /// [`Method::Step`]
    Step,
    /// [`Method::Linear`]
    Linear,
    /// [`Method::Quadratic`]
    Quadratic,
    /// [`Method::Cubic`]
    Cubic,
    /// [`Method::Polynomial`]
    Polynomial,
    /// [`Method::Hermite`]
    Hermite,
    /// [`Method::Bezier`]
    Bezier,
    /// [`Method::Pchip`]
    Pchip,
    /// [`Method::Gaussian`]
    Gaussian,
}

impl MethodKind {
    /// Every method, in documentation order.
    pub const ALL: [MethodKind; 10] = [
        Self::Nearest,
        Self::Step,
        Self::Linear,
        Self::Quadratic,
        Self::Cubic,
        Self::Polynomial,
        Self::Hermite,
        Self::Bezier,
        Self::Pchip,
        Self::Gaussian,
    ];

    /// Lowercase name used in scene files and shorthand.
    pub fn name(self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Step => "step",
            Self::Linear => "linear",
            Self::Quadratic => "quadratic",
            Self::Cubic => "cubic",
            Self::Polynomial => "polynomial",
            Self::Hermite => "hermite",
            Self::Bezier => "bezier",
            Self::Pchip => "pchip",
            Self::Gaussian => "gaussian",
        }
    }

    /// Fewest keyframes a channel needs before this method is used as requested.
    pub fn min_points(self) -> usize {
        match self {
            Self::Nearest | Self::Step => 1,
            Self::Linear | Self::Polynomial | Self::Hermite | Self::Bezier | Self::Gaussian => 2,
            Self::Quadratic | Self::Pchip => 3,
            Self::Cubic => 4,
        }
    }

    /// Method used instead of `self` when a channel holds only `points` keyframes.
    pub(crate) fn degrade(self, points: usize) -> MethodKind {
        if points >= self.min_points() {
            self
        } else if points >= 2 {
            Self::Linear
        } else {
            Self::Step
        }
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MethodKind {
    type Err = SplinalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.name() == name)
            .ok_or_else(|| SplinalError::value(format!("unknown interpolation method \"{s}\"")))
    }
}

impl From<MethodKind> for Method {
    fn from(kind: MethodKind) -> Self {
        match kind {
            MethodKind::Nearest => Self::Nearest,
            MethodKind::Step => Self::Step,
            MethodKind::Linear => Self::Linear,
            MethodKind::Quadratic => Self::Quadratic,
            MethodKind::Cubic => Self::Cubic,
            MethodKind::Polynomial => Self::Polynomial,
            MethodKind::Hermite => Self::Hermite { deriv: 0.0 },
            MethodKind::Bezier => Self::Bezier { cp: None },
            MethodKind::Pchip => Self::Pchip,
            MethodKind::Gaussian => Self::Gaussian { width: None },
        }
    }
}

impl Method {
    /// Payload-free tag.
    pub fn kind(&self) -> MethodKind {
        match self {
            Self::Nearest => MethodKind::Nearest,
            Self::Step => MethodKind::Step,
            Self::Linear => MethodKind::Linear,
            Self::Quadratic => MethodKind::Quadratic,
            Self::Cubic => MethodKind::Cubic,
            Self::Polynomial => MethodKind::Polynomial,
            Self::Hermite { .. } => MethodKind::Hermite,
            Self::Bezier { .. } => MethodKind::Bezier,
            Self::Pchip => MethodKind::Pchip,
            Self::Gaussian { .. } => MethodKind::Gaussian,
        }
    }

    /// Keyframe indices read when evaluating segment `seg` (left keyframe index) of a channel
    /// with `n` keyframes.
    pub fn support(&self, seg: usize, n: usize) -> Range<usize> {
        let end = |k: usize| (seg + k).min(n);
        match self.kind() {
            MethodKind::Nearest
            | MethodKind::Step
            | MethodKind::Linear
            | MethodKind::Hermite
            | MethodKind::Bezier => seg..end(2),
            MethodKind::Quadratic | MethodKind::Cubic | MethodKind::Pchip => {
                seg.saturating_sub(1)..end(3)
            }
            MethodKind::Polynomial | MethodKind::Gaussian => 0..n,
        }
    }

    /// Build a method from its name and `key -> values` parameters.
    ///
    /// Parameters not understood by the method are rejected.
    pub fn from_parts<'a, I>(name: &str, params: I) -> SplinalResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a [f64])>,
    {
        let mut method = Method::from(name.parse::<MethodKind>()?);
        for (key, values) in params {
            method.set_param(key, values)?;
        }
        Ok(method)
    }

    pub(crate) fn set_param(&mut self, key: &str, values: &[f64]) -> SplinalResult<()> {
        let kind = self.kind();
        let bad = |what: &str| {
            SplinalError::value(format!("{kind} parameter \"{key}\": {what}, got {values:?}"))
        };
        if values.iter().any(|v| !v.is_finite()) {
            return Err(bad("values must be finite"));
        }
        match (self, key) {
            (Self::Hermite { deriv }, "deriv") => match values {
                [d] => *deriv = *d,
                _ => return Err(bad("expected one number")),
            },
            (Self::Bezier { cp }, "cp") => match values {
                [x1, y1, x2, y2] => *cp = Some([*x1, *y1, *x2, *y2]),
                _ => return Err(bad("expected four numbers x1,y1,x2,y2")),
            },
            (Self::Gaussian { width }, "width") => match values {
                [w] if *w > 0.0 => *width = Some(*w),
                _ => return Err(bad("expected one positive number")),
            },
            _ => {
                return Err(SplinalError::value(format!(
                    "{kind} has no parameter \"{key}\""
                )));
            }
        }
        Ok(())
    }

    /// Parameters in `key -> values` form, the inverse of [`Method::from_parts`].
    pub fn params(&self) -> Vec<(&'static str, Vec<f64>)> {
        match self {
            Self::Hermite { deriv } => vec![("deriv", vec![*deriv])],
            Self::Bezier { cp: Some(cp) } => vec![("cp", cp.to_vec())],
            Self::Gaussian { width: Some(w) } => vec![("width", vec![*w])],
            _ => Vec::new(),
        }
    }
}

/// Shorthand form: `name` or `name{key=v[,v...][;key=...]}`, e.g. `bezier{cp=0.6,6,0.7,5}`.
impl FromStr for Method {
    type Err = SplinalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some(open) = s.find('{') else {
            return Ok(Method::from(s.parse::<MethodKind>()?));
        };
        let name = &s[..open];
        let body = s[open + 1..]
            .strip_suffix('}')
            .ok_or_else(|| SplinalError::value(format!("unterminated parameters in \"{s}\"")))?;

        let mut parsed: Vec<(&str, Vec<f64>)> = Vec::new();
        for entry in body.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (key, raw) = entry.split_once('=').ok_or_else(|| {
                SplinalError::value(format!("expected key=value in \"{entry}\""))
            })?;
            let values = raw
                .split(',')
                .map(|v| {
                    v.trim().parse::<f64>().map_err(|_| {
                        SplinalError::value(format!("invalid number \"{}\" in \"{entry}\"", v.trim()))
                    })
                })
                .collect::<SplinalResult<Vec<_>>>()?;
            parsed.push((key.trim(), values));
        }
        Method::from_parts(name, parsed.iter().map(|(k, v)| (*k, v.as_slice())))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind().name())?;
        let params = self.params();
        if params.is_empty() {
            return Ok(());
        }
        f.write_str("{")?;
        for (i, (key, values)) in params.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{key}=")?;
            for (j, v) in values.iter().enumerate() {
                if j > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{v}")?;
            }
        }
        f.write_str("}")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interp/method.rs"]
mod tests;
