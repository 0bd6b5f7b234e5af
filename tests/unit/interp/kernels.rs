use super::*;
use approx::assert_relative_eq;

fn pts(xy: &[(f64, f64)]) -> Vec<ResolvedPoint> {
    xy.iter().map(|&(x, y)| ResolvedPoint::new(x, y)).collect()
}

fn every_interpolating_method() -> Vec<Method> {
    vec![
        Method::Nearest,
        Method::Step,
        Method::Linear,
        Method::Quadratic,
        Method::Cubic,
        Method::Polynomial,
        Method::Hermite { deriv: 0.0 },
        Method::Bezier { cp: None },
        Method::Pchip,
    ]
}

#[test]
fn left_keyframe_is_exact_for_interpolating_methods() {
    let p = pts(&[(0.0, 1.0), (0.3, -2.0), (0.7, 4.0), (1.0, 0.5)]);
    for m in every_interpolating_method() {
        for seg in 0..3 {
            assert_eq!(interpolate(&m, &p, seg, 0.0), p[seg].value, "{m}");
        }
    }
}

#[test]
fn linear_midpoint() {
    let p = pts(&[(0.0, 0.0), (1.0, 10.0)]);
    assert_eq!(interpolate(&Method::Linear, &p, 0, 0.5), 5.0);
}

#[test]
fn nearest_ties_go_left() {
    let p = pts(&[(0.0, 1.0), (1.0, 2.0)]);
    assert_eq!(interpolate(&Method::Nearest, &p, 0, 0.5), 1.0);
    assert_eq!(interpolate(&Method::Nearest, &p, 0, 0.51), 2.0);
    assert_eq!(interpolate(&Method::Step, &p, 0, 0.99), 1.0);
}

#[test]
fn quadratic_reproduces_a_parabola() {
    let p = pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 4.0), (3.0, 9.0)]);
    for seg in 0..3 {
        let v = interpolate(&Method::Quadratic, &p, seg, 0.5);
        let x = seg as f64 + 0.5;
        assert_relative_eq!(v, x * x, epsilon = 1e-12);
    }
}

#[test]
fn polynomial_reproduces_a_cubic_exactly() {
    let f = |x: f64| x * x * x - 2.0 * x + 1.0;
    let p = pts(&[(0.0, f(0.0)), (1.0, f(1.0)), (2.0, f(2.0)), (3.0, f(3.0))]);
    assert_relative_eq!(
        interpolate(&Method::Polynomial, &p, 1, 0.25),
        f(1.25),
        epsilon = 1e-12
    );
}

#[test]
fn cubic_is_linear_on_collinear_points() {
    let p = pts(&[(0.0, 0.0), (1.0, 2.0), (2.0, 4.0), (3.0, 6.0)]);
    for seg in 0..3 {
        assert_relative_eq!(
            interpolate(&Method::Cubic, &p, seg, 0.25),
            2.0 * (seg as f64 + 0.25),
            epsilon = 1e-12
        );
    }
}

#[test]
fn hermite_uses_declared_tangents() {
    let mut p = pts(&[(0.0, 0.0), (1.0, 0.0)]);
    assert_eq!(
        interpolate(&Method::Hermite { deriv: 0.0 }, &p, 0, 0.5),
        0.0
    );
    p[0].deriv = 1.0;
    p[1].deriv = 1.0;
    // h10(0.5) + h11(0.5) = 0.125 - 0.125
    assert_relative_eq!(
        interpolate(&Method::Hermite { deriv: 1.0 }, &p, 0, 0.5),
        0.0,
        epsilon = 1e-12
    );
    p[1].deriv = -1.0;
    assert_relative_eq!(
        interpolate(&Method::Hermite { deriv: 1.0 }, &p, 0, 0.5),
        0.25,
        epsilon = 1e-12
    );
}

#[test]
fn bezier_without_control_points_is_a_line() {
    let p = pts(&[(0.0, 0.0), (2.0, 10.0)]);
    for u in [0.1, 0.25, 0.5, 0.9] {
        assert_relative_eq!(
            interpolate(&Method::Bezier { cp: None }, &p, 0, u),
            10.0 * u,
            epsilon = 1e-9
        );
    }
}

#[test]
fn bezier_control_points_bend_the_segment() {
    let p = pts(&[(0.0, 0.0), (1.0, 10.0)]);
    let eased = Method::Bezier {
        cp: Some([0.6, 0.0, 0.9, 10.0]),
    };
    let v = interpolate(&eased, &p, 0, 0.5);
    assert!(v < 5.0, "ease-in should lag the chord, got {v}");
    assert!(interpolate(&eased, &p, 0, 0.999) <= 10.0);
}

#[test]
fn pchip_does_not_overshoot_monotone_data() {
    let p = pts(&[(0.0, 0.0), (1.0, 0.1), (2.0, 5.0), (3.0, 5.1), (4.0, 10.0)]);
    let mut prev = f64::NEG_INFINITY;
    for seg in 0..4usize {
        let lo = seg.saturating_sub(1);
        let hi = (seg + 3).min(p.len());
        for i in 0..=20 {
            let u = i as f64 / 20.0;
            let v = interpolate(&Method::Pchip, &p[lo..hi], seg - lo, u);
            assert!(v >= p[seg].value - 1e-12 && v <= p[seg + 1].value + 1e-12);
            assert!(v >= prev - 1e-12, "not monotone at seg {seg} u {u}");
            prev = v;
        }
    }
}

#[test]
fn pchip_flattens_at_local_extrema() {
    let p = pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]);
    assert_eq!(pchip_slope(&p, 1), 0.0);
}

#[test]
fn gaussian_smooths_and_stays_within_value_range() {
    let p = pts(&[(0.0, 0.0), (0.5, 1.0), (1.0, 0.0)]);
    let g = Method::Gaussian { width: None };
    let v = interpolate(&g, &p, 0, 1.0);
    assert!(v > 0.0 && v < 1.0);
    let wide = interpolate(&Method::Gaussian { width: Some(100.0) }, &p, 0, 0.0);
    assert_relative_eq!(wide, 1.0 / 3.0, epsilon = 1e-3);
}

#[test]
fn degenerate_windows_do_not_panic() {
    assert!(interpolate(&Method::Linear, &[], 0, 0.5).is_nan());
    let p = pts(&[(0.0, 3.0)]);
    assert_eq!(interpolate(&Method::Cubic, &p, 0, 0.5), 3.0);
}
