use crate::foundation::error::{SplinalError, SplinalResult};
use crate::foundation::math::normalize;
use crate::interp::method::{Method, MethodKind};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::ops::Range;

/// A keyframe with its value already resolved for one query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedPoint {
    /// Position, normalized when the channel is in index mode.
    pub at: f64,
    /// Resolved value.
    pub value: f64,
    /// Declared hermite tangent, `0` when the keyframe has none.
    pub deriv: f64,
}

impl ResolvedPoint {
    /// Point with no tangent.
    pub fn new(at: f64, value: f64) -> Self {
        Self {
            at,
            value,
            deriv: 0.0,
        }
    }
}

/// Behaviour for query positions outside the keyframe span.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutOfRange {
    /// Hold the boundary keyframe's value.
    #[default]
    Clamp,
    /// Continue the boundary segment's curve. `nearest` and `step` still hold.
    Extrapolate,
}

/// Why a segment was evaluated with a different method than requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fallback {
    /// The channel has fewer keyframes than the method needs.
    Points {
        /// Requested method.
        requested: MethodKind,
        /// Method evaluated instead.
        used: MethodKind,
        /// Keyframes in the channel.
        points: usize,
    },
    /// The backend has no implementation for the method.
    Unsupported {
        /// Requested method.
        requested: MethodKind,
        /// Method evaluated instead.
        used: MethodKind,
    },
}

/// One evaluated value plus the fallback taken to produce it, if any.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    /// Interpolated value, before channel bounds are applied.
    pub value: f64,
    /// Fallback taken for this sample.
    pub fallback: Option<Fallback>,
}

impl Sample {
    pub(crate) fn exact(value: f64) -> Self {
        Self {
            value,
            fallback: None,
        }
    }
}

/// What a query needs evaluated, decided from keyframe positions and methods alone.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Plan<'m> {
    /// Take keyframe `index` as is.
    Hold {
        index: usize,
        fallback: Option<Fallback>,
    },
    /// Run `method` over keyframes `window`; `seg` is the left bracket inside the window.
    Kernel {
        method: Cow<'m, Method>,
        window: Range<usize>,
        seg: usize,
        u: f64,
        fallback: Option<Fallback>,
    },
}

/// Bracket position `x` among `n` keyframes and pick the effective method.
///
/// `at(i)` must be strictly increasing. `methods(i)` is keyframe `i`'s own method; the segment
/// method is the left keyframe's, or `default`. `span` is the raw `(first, last)` keyframe range
/// of an index-mode channel; positions carried inside methods are normalized by it.
#[allow(clippy::too_many_arguments)]
pub(crate) fn plan<'m>(
    n: usize,
    x: f64,
    at: impl Fn(usize) -> f64,
    methods: impl Fn(usize) -> Option<&'m Method>,
    default: &'m Method,
    span: Option<(f64, f64)>,
    out_of_range: OutOfRange,
    supports: impl Fn(MethodKind) -> bool,
) -> Option<Plan<'m>> {
    if n == 0 {
        return None;
    }
    if n == 1 {
        let requested = methods(0).unwrap_or(default).kind();
        let used = requested.degrade(1);
        let fallback = (used != requested).then_some(Fallback::Points {
            requested,
            used,
            points: 1,
        });
        return Some(Plan::Hold { index: 0, fallback });
    }

    let idx = partition_point(n, |i| at(i) <= x);
    if idx > 0 && idx < n {
        let seg = idx - 1;
        let u = (x - at(seg)) / (at(seg + 1) - at(seg));
        return Some(kernel_plan(n, seg, u, &methods, default, span, &supports));
    }

    let (seg, hold) = if idx == 0 { (0, 0) } else { (n - 2, n - 1) };
    let outside = idx == 0 || x > at(n - 1);
    let held = out_of_range == OutOfRange::Clamp || !outside;
    let u = (x - at(seg)) / (at(seg + 1) - at(seg));
    match kernel_plan(n, seg, u, &methods, default, span, &supports) {
        // Gaussian blends every keyframe, so the span edge is evaluated rather than read off
        // the boundary keyframe.
        Plan::Kernel {
            method,
            window,
            seg,
            fallback,
            ..
        } if held && method.kind() == MethodKind::Gaussian => Some(Plan::Kernel {
            method,
            window,
            seg,
            u: if idx == 0 { 0.0 } else { 1.0 },
            fallback,
        }),
        Plan::Kernel { method, .. }
            if held || matches!(method.kind(), MethodKind::Nearest | MethodKind::Step) =>
        {
            Some(Plan::Hold {
                index: hold,
                fallback: None,
            })
        }
        p => Some(p),
    }
}

fn kernel_plan<'m>(
    n: usize,
    seg: usize,
    u: f64,
    methods: &impl Fn(usize) -> Option<&'m Method>,
    default: &'m Method,
    span: Option<(f64, f64)>,
    supports: &impl Fn(MethodKind) -> bool,
) -> Plan<'m> {
    let requested = methods(seg).unwrap_or(default);
    let kind = requested.kind();
    let mut used = kind.degrade(n);
    let mut fallback = (used != kind).then_some(Fallback::Points {
        requested: kind,
        used,
        points: n,
    });
    if !supports(used) {
        fallback = Some(Fallback::Unsupported {
            requested: used,
            used: MethodKind::Linear,
        });
        used = MethodKind::Linear;
    }

    let method = match (used == kind, requested, span) {
        (true, Method::Bezier { cp: Some([x1, y1, x2, y2]) }, Some((lo, hi))) => {
            Cow::Owned(Method::Bezier {
                cp: Some([normalize(*x1, lo, hi), *y1, normalize(*x2, lo, hi), *y2]),
            })
        }
        (true, ..) => Cow::Borrowed(requested),
        (false, ..) => Cow::Owned(Method::from(used)),
    };
    let window = method.support(seg, n);
    Plan::Kernel {
        seg: seg - window.start,
        window,
        method,
        u,
        fallback,
    }
}

fn partition_point(n: usize, pred: impl Fn(usize) -> bool) -> usize {
    let (mut lo, mut hi) = (0usize, n);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if pred(mid) {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// A channel with every keyframe resolved, ready for repeated evaluation.
///
/// Built once per batch when no keyframe depends on the query.
#[derive(Clone, Debug, PartialEq)]
pub struct Curve {
    points: Vec<ResolvedPoint>,
    methods: Vec<Option<Method>>,
    default: Method,
    span: Option<(f64, f64)>,
    out_of_range: OutOfRange,
}

impl Curve {
    /// Build a curve from keyframes sorted by strictly increasing raw position.
    ///
    /// `index_mode` normalizes positions by the first and last keyframe.
    pub fn new(
        keys: Vec<(ResolvedPoint, Option<Method>)>,
        default: Method,
        index_mode: bool,
        out_of_range: OutOfRange,
    ) -> SplinalResult<Self> {
        if keys.is_empty() {
            return Err(SplinalError::value("curve has no keyframes"));
        }
        if keys
            .windows(2)
            .any(|w| w[0].0.at.partial_cmp(&w[1].0.at) != Some(Ordering::Less))
        {
            return Err(SplinalError::value(
                "curve keyframes must have strictly increasing positions",
            ));
        }
        let span = index_mode.then(|| (keys[0].0.at, keys[keys.len() - 1].0.at));
        let (points, methods) = keys
            .into_iter()
            .map(|(mut p, m)| {
                if let Some((lo, hi)) = span {
                    p.at = normalize(p.at, lo, hi);
                }
                (p, m)
            })
            .unzip();
        Ok(Self {
            points,
            methods,
            default,
            span,
            out_of_range,
        })
    }

    /// Resolved points, positions normalized in index mode.
    pub fn points(&self) -> &[ResolvedPoint] {
        &self.points
    }

    /// Position used for bracketing a raw query position.
    pub fn position(&self, raw: f64) -> f64 {
        match self.span {
            Some((lo, hi)) => normalize(raw, lo, hi),
            None => raw,
        }
    }

    pub(crate) fn plan(&self, raw: f64, supports: impl Fn(MethodKind) -> bool) -> Plan<'_> {
        let n = self.points.len();
        let x = self.position(raw);
        plan(
            n,
            x,
            |i| self.points[i].at,
            |i| self.methods[i].as_ref(),
            &self.default,
            self.span,
            self.out_of_range,
            supports,
        )
        .unwrap_or(Plan::Hold {
            index: 0,
            fallback: None,
        })
    }

    /// Evaluate at a raw position with `eval` as the kernel runner.
    pub(crate) fn sample_with(
        &self,
        raw: f64,
        supports: impl Fn(MethodKind) -> bool,
        eval: impl Fn(&Method, &[ResolvedPoint], usize, f64) -> Sample,
    ) -> Sample {
        self.run(self.plan(raw, supports), eval)
    }

    /// Evaluate a run of raw positions into `out`.
    ///
    /// The plan of an interior segment is kept while following positions stay inside it, so
    /// sorted runs only bracket once per segment. Results equal [`Curve::sample_with`] bit for
    /// bit.
    pub(crate) fn sample_run(
        &self,
        raws: &[f64],
        supports: impl Fn(MethodKind) -> bool,
        eval: impl Fn(&Method, &[ResolvedPoint], usize, f64) -> Sample,
        out: &mut Vec<Sample>,
    ) {
        let mut last: Option<Plan<'_>> = None;
        for &raw in raws {
            let x = self.position(raw);
            let reused = match &last {
                Some(Plan::Kernel {
                    method,
                    window,
                    seg,
                    fallback,
                    ..
                }) => self.segment(window.start + seg).and_then(|(a, b)| {
                    (a <= x && x < b).then(|| Plan::Kernel {
                        method: method.clone(),
                        window: window.clone(),
                        seg: *seg,
                        u: (x - a) / (b - a),
                        fallback: *fallback,
                    })
                }),
                _ => None,
            };
            let plan = match reused {
                Some(p) => p,
                None => {
                    let p = self.plan(raw, &supports);
                    last = self.inside(&p, x).then(|| p.clone());
                    p
                }
            };
            out.push(self.run(plan, &eval));
        }
    }

    fn segment(&self, s: usize) -> Option<(f64, f64)> {
        Some((self.points.get(s)?.at, self.points.get(s + 1)?.at))
    }

    // Interior plans only; boundary plans carry a clamped or extrapolated `u`.
    fn inside(&self, plan: &Plan<'_>, x: f64) -> bool {
        match plan {
            Plan::Kernel { window, seg, .. } => self
                .segment(window.start + seg)
                .is_some_and(|(a, b)| a <= x && x < b),
            Plan::Hold { .. } => false,
        }
    }

    fn run(
        &self,
        plan: Plan<'_>,
        eval: impl Fn(&Method, &[ResolvedPoint], usize, f64) -> Sample,
    ) -> Sample {
        match plan {
            Plan::Hold { index, fallback } => Sample {
                value: self.points[index].value,
                fallback,
            },
            Plan::Kernel {
                method,
                window,
                seg,
                u,
                fallback,
            } => {
                let s = eval(&*method, &self.points[window], seg, u);
                Sample {
                    value: s.value,
                    fallback: fallback.or(s.fallback),
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interp/curve.rs"]
mod tests;
