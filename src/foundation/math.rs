use crate::foundation::error::{SplinalError, SplinalResult};

pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Map `x` from `[lo, hi]` into `[0, 1]` space. A degenerate span maps everything to `0`.
pub(crate) fn normalize(x: f64, lo: f64, hi: f64) -> f64 {
    let span = hi - lo;
    if span == 0.0 { 0.0 } else { (x - lo) / span }
}

/// `count` evenly spaced sample positions from `start` to `end`, both inclusive.
///
/// A single sample is placed at `start`. The last sample is exactly `end`.
pub fn linspace(count: usize, start: f64, end: f64) -> SplinalResult<Vec<f64>> {
    if !start.is_finite() || !end.is_finite() {
        return Err(SplinalError::value("linspace bounds must be finite"));
    }
    match count {
        0 => Ok(Vec::new()),
        1 => Ok(vec![start]),
        n => {
            let last = (n - 1) as f64;
            let mut out: Vec<f64> = (0..n)
                .map(|i| lerp(start, end, i as f64 / last))
                .collect();
            out[n - 1] = end;
            Ok(out)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
