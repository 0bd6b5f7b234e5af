//! Pure interpolation kernels.
//!
//! Every kernel reads a window of resolved points, the index `seg` of the left bracketing point
//! inside that window, and the segment parameter `u` (0 at `seg`, 1 at `seg + 1`). `u` lies in
//! `[0, 1]` except when extrapolating past the channel ends.

use crate::foundation::math::lerp;
use crate::interp::curve::ResolvedPoint;
use crate::interp::method::Method;

const BEZIER_BISECT_STEPS: usize = 64;

/// Evaluate `method` on segment `seg` of `pts` at parameter `u`.
pub(crate) fn interpolate(method: &Method, pts: &[ResolvedPoint], seg: usize, u: f64) -> f64 {
    let Some(last) = pts.len().checked_sub(1) else {
        return f64::NAN;
    };
    if seg >= last {
        return pts[last].value;
    }
    if u == 0.0 && !matches!(method, Method::Gaussian { .. }) {
        return pts[seg].value;
    }

    match method {
        Method::Nearest => nearest_value(pts, seg, u),
        Method::Step => pts[seg].value,
        Method::Linear => lerp(pts[seg].value, pts[seg + 1].value, u),
        Method::Quadratic => quadratic_value(pts, seg, u),
        Method::Cubic => {
            let m0 = finite_difference_slope(pts, seg);
            let m1 = finite_difference_slope(pts, seg + 1);
            hermite_value(&pts[seg], &pts[seg + 1], m0, m1, u)
        }
        Method::Polynomial => lagrange_value(pts, segment_x(pts, seg, u)),
        Method::Hermite { .. } => {
            let (a, b) = (&pts[seg], &pts[seg + 1]);
            hermite_value(a, b, a.deriv, b.deriv, u)
        }
        Method::Bezier { cp } => bezier_value(&pts[seg], &pts[seg + 1], *cp, u),
        Method::Pchip => {
            let m0 = pchip_slope(pts, seg);
            let m1 = pchip_slope(pts, seg + 1);
            hermite_value(&pts[seg], &pts[seg + 1], m0, m1, u)
        }
        Method::Gaussian { width } => gaussian_value(pts, segment_x(pts, seg, u), *width),
    }
}

#[inline]
fn segment_x(pts: &[ResolvedPoint], seg: usize, u: f64) -> f64 {
    lerp(pts[seg].at, pts[seg + 1].at, u)
}

fn nearest_value(pts: &[ResolvedPoint], seg: usize, u: f64) -> f64 {
    if u <= 0.5 {
        pts[seg].value
    } else {
        pts[seg + 1].value
    }
}

/// Parabola through the bracketing pair and whichever outer neighbour sits closer to the
/// segment midpoint.
fn quadratic_value(pts: &[ResolvedPoint], seg: usize, u: f64) -> f64 {
    let a = &pts[seg];
    let b = &pts[seg + 1];
    let mid = 0.5 * (a.at + b.at);
    let left = seg.checked_sub(1).map(|i| &pts[i]);
    let right = pts.get(seg + 2);
    let third = match (left, right) {
        (Some(l), Some(r)) => {
            if mid - l.at <= r.at - mid {
                l
            } else {
                r
            }
        }
        (Some(l), None) => l,
        (None, Some(r)) => r,
        (None, None) => return lerp(a.value, b.value, u),
    };
    lagrange_value(&[*a, *b, *third], segment_x(pts, seg, u))
}

fn lagrange_value(pts: &[ResolvedPoint], x: f64) -> f64 {
    let mut sum = 0.0;
    for (i, pi) in pts.iter().enumerate() {
        let mut basis = 1.0;
        for (j, pj) in pts.iter().enumerate() {
            if i != j {
                basis *= (x - pj.at) / (pi.at - pj.at);
            }
        }
        sum += pi.value * basis;
    }
    sum
}

/// Centred difference at interior points, one-sided at the ends of `pts`.
fn finite_difference_slope(pts: &[ResolvedPoint], k: usize) -> f64 {
    let lo = k.saturating_sub(1);
    let hi = (k + 1).min(pts.len() - 1);
    let (a, b) = (&pts[lo], &pts[hi]);
    (b.value - a.value) / (b.at - a.at)
}

/// Cubic Hermite on one segment. Slopes are dv/dposition.
fn hermite_value(a: &ResolvedPoint, b: &ResolvedPoint, m0: f64, m1: f64, u: f64) -> f64 {
    let h = b.at - a.at;
    let u2 = u * u;
    let u3 = u2 * u;
    let h00 = 2.0 * u3 - 3.0 * u2 + 1.0;
    let h10 = u3 - 2.0 * u2 + u;
    let h01 = -2.0 * u3 + 3.0 * u2;
    let h11 = u3 - u2;
    h00 * a.value + h10 * h * m0 + h01 * b.value + h11 * h * m1
}

fn pchip_slope(pts: &[ResolvedPoint], k: usize) -> f64 {
    let n = pts.len();
    let h = |i: usize| pts[i + 1].at - pts[i].at;
    let delta = |i: usize| (pts[i + 1].value - pts[i].value) / h(i);
    if n == 2 {
        return delta(0);
    }
    if k == 0 {
        return pchip_end_slope(h(0), h(1), delta(0), delta(1));
    }
    if k == n - 1 {
        return pchip_end_slope(h(n - 2), h(n - 3), delta(n - 2), delta(n - 3));
    }

    let (d0, d1) = (delta(k - 1), delta(k));
    if sign(d0) * sign(d1) <= 0.0 {
        return 0.0;
    }
    let (h0, h1) = (h(k - 1), h(k));
    let w1 = 2.0 * h1 + h0;
    let w2 = h1 + 2.0 * h0;
    (w1 + w2) / (w1 / d0 + w2 / d1)
}

/// Three-point one-sided end slope, limited so the end segment stays monotone.
fn pchip_end_slope(h0: f64, h1: f64, d0: f64, d1: f64) -> f64 {
    let d = ((2.0 * h0 + h1) * d0 - h0 * d1) / (h0 + h1);
    if sign(d) != sign(d0) {
        0.0
    } else if sign(d0) != sign(d1) && d.abs() > 3.0 * d0.abs() {
        3.0 * d0
    } else {
        d
    }
}

fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Cubic Bezier from `a` to `b`. Control x coordinates are mapped into the segment and clamped so
/// the curve stays a function of position; outside the segment the chord is extended linearly.
fn bezier_value(a: &ResolvedPoint, b: &ResolvedPoint, cp: Option<[f64; 4]>, u: f64) -> f64 {
    if !(0.0..1.0).contains(&u) {
        return lerp(a.value, b.value, u);
    }
    let h = b.at - a.at;
    let [x1, y1, x2, y2] = cp.unwrap_or([
        a.at + h / 3.0,
        lerp(a.value, b.value, 1.0 / 3.0),
        a.at + 2.0 * h / 3.0,
        lerp(a.value, b.value, 2.0 / 3.0),
    ]);
    let cx1 = ((x1 - a.at) / h).clamp(0.0, 1.0);
    let cx2 = ((x2 - a.at) / h).clamp(0.0, 1.0);

    fn cubic(p0: f64, p1: f64, p2: f64, p3: f64, s: f64) -> f64 {
        let t = 1.0 - s;
        t * t * t * p0 + 3.0 * t * t * s * p1 + 3.0 * t * s * s * p2 + s * s * s * p3
    }

    // x(s) is monotone for control x in [0, 1], so bisection converges to the unique root.
    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    for _ in 0..BEZIER_BISECT_STEPS {
        let mid = 0.5 * (lo + hi);
        if cubic(0.0, cx1, cx2, 1.0, mid) < u {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    let s = 0.5 * (lo + hi);
    cubic(a.value, y1, y2, b.value, s)
}

fn gaussian_value(pts: &[ResolvedPoint], x: f64, width: Option<f64>) -> f64 {
    let n = pts.len();
    let spacing = (pts[n - 1].at - pts[0].at) / (n - 1) as f64;
    let w = width.unwrap_or(spacing);
    if !(w.is_finite() && w > 0.0) {
        return nearest_point_value(pts, x);
    }

    let mut weighted = 0.0;
    let mut total = 0.0;
    for p in pts {
        let z = (x - p.at) / w;
        let k = (-0.5 * z * z).exp();
        weighted += k * p.value;
        total += k;
    }
    if total > 0.0 && total.is_finite() {
        weighted / total
    } else {
        nearest_point_value(pts, x)
    }
}

fn nearest_point_value(pts: &[ResolvedPoint], x: f64) -> f64 {
    pts.iter()
        .min_by(|a, b| (a.at - x).abs().total_cmp(&(b.at - x).abs()))
        .map_or(f64::NAN, |p| p.value)
}

#[cfg(test)]
#[path = "../../tests/unit/interp/kernels.rs"]
mod tests;
