use super::*;
use crate::backend::{BatchedBackend, ScalarBackend};
use crate::foundation::error::ErrorKind;
use crate::interp::{Fallback, MethodKind};
use approx::assert_relative_eq;

fn value_at(c: &Channel, p: f64) -> SplinalResult<f64> {
    let mut b = Bindings::default();
    c.sample("s", p, &mut b, &ScalarBackend, OutOfRange::Clamp)
        .map(|s| c.apply_bounds(s.value))
}

#[test]
fn keeps_keyframes_sorted_and_rejects_duplicates() {
    let mut c = Channel::new("x");
    c.add("1:10").unwrap();
    c.add("0:0").unwrap();
    c.add("0.5:5").unwrap();
    let ats: Vec<f64> = c.keyframes().iter().map(|k| k.at).collect();
    assert_eq!(ats, vec![0.0, 0.5, 1.0]);

    let err = c.add("0.5:7").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Value);
    assert_eq!(c.keyframes().len(), 3);

    assert!(c.remove_keyframe(0.5).is_some());
    assert!(c.remove_keyframe(0.5).is_none());
    assert!(c.add_keyframe(Keyframe::new(f64::NAN, 1.0)).is_err());
}

#[test]
fn linear_midpoint_is_exact() {
    let mut c = Channel::new("x");
    c.add("0:0").unwrap();
    c.add("1:10").unwrap();
    assert_eq!(value_at(&c, 0.5).unwrap(), 5.0);
}

#[test]
fn expression_keyframes_see_the_position() {
    let mut c = Channel::new("x");
    c.add("0:0").unwrap();
    c.add("0.5:sin(@ * pi)").unwrap();
    c.add("1:0").unwrap();
    assert_relative_eq!(value_at(&c, 0.5).unwrap(), 1.0, epsilon = 1e-12);
    for p in [0.25, 0.75] {
        let v = value_at(&c, p).unwrap();
        assert!(v > 0.0 && v < 1.0, "{p} -> {v}");
    }
}

#[test]
fn index_mode_hits_raw_keyframes_exactly() {
    let mut c = Channel::new("i").with_index_mode(true);
    for k in ["0:0", "5:5", "10:10"] {
        c.add(k).unwrap();
    }
    for raw in [0.0, 5.0, 10.0] {
        assert_eq!(value_at(&c, raw).unwrap(), raw);
    }
}

#[test]
fn index_mode_binds_the_normalized_position() {
    let mut c = Channel::new("i").with_index_mode(true);
    c.add("0:@").unwrap();
    c.add("4:@ * 10").unwrap();
    assert_eq!(value_at(&c, 2.0).unwrap(), 0.5 * (0.5 + 5.0));
}

#[test]
fn empty_channels_are_value_errors() {
    let c = Channel::new("x");
    let err = value_at(&c, 0.0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Value);
    assert!(err.to_string().contains("s.x"));
}

#[test]
fn unknown_names_carry_context() {
    let mut c = Channel::new("y");
    c.add("0:missing * 2").unwrap();
    c.add("1:1").unwrap();
    let err = value_at(&c, 0.25).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Name);
    let SplinalError::Resolve {
        spline,
        channel,
        position,
        expression,
        ..
    } = &err
    else {
        panic!("expected context wrapper, got {err:?}");
    };
    assert_eq!(spline, "s");
    assert_eq!(channel, "y");
    assert_eq!(*position, 0.25);
    assert_eq!(expression.as_deref(), Some("missing * 2"));
}

#[test]
fn only_the_support_window_is_resolved() {
    let mut c = Channel::new("x");
    c.add("0:0").unwrap();
    c.add("1:1").unwrap();
    c.add("2:missing").unwrap();
    assert_eq!(value_at(&c, 0.5).unwrap(), 0.5);
    assert!(value_at(&c, 1.5).is_err());
}

#[test]
fn single_bezier_keyframe_falls_back_to_step() {
    let mut c = Channel::new("x");
    c.add("0.5:3@bezier{cp=0.6,6,0.7,5}").unwrap();
    let mut b = Bindings::default();
    let s = c
        .sample("s", 0.9, &mut b, &ScalarBackend, OutOfRange::Clamp)
        .unwrap();
    assert_eq!(s.value, 3.0);
    assert_eq!(
        s.fallback,
        Some(Fallback::Points {
            requested: MethodKind::Bezier,
            used: MethodKind::Step,
            points: 1
        })
    );
}

#[test]
fn bounds_clamp_the_output() {
    let mut c = Channel::new("x").with_bounds(0.0, 4.0).unwrap();
    c.add("0:-5").unwrap();
    c.add("1:10").unwrap();
    assert_eq!(value_at(&c, 0.0).unwrap(), 0.0);
    assert_eq!(value_at(&c, 1.0).unwrap(), 4.0);
    assert!(Channel::new("x").with_bounds(2.0, 1.0).is_err());
}

#[test]
fn lazy_and_curve_paths_agree() {
    let mut c = Channel::new("x").with_method(Method::Pchip);
    for k in ["0:0", "0.1:2", "0.4:-1", "0.6:3@hermite{deriv=2}", "1:1@bezier{cp=1.1,1,1.2,0}"] {
        c.add(k).unwrap();
    }
    let curve = c.curve(OutOfRange::Clamp).unwrap().unwrap();
    let backend = BatchedBackend::new(4);
    for i in 0..=50 {
        let p = -0.1 + i as f64 * 0.025;
        let mut b = Bindings::default();
        let lazy = c
            .sample("s", p, &mut b, &backend, OutOfRange::Clamp)
            .unwrap();
        let batch = crate::backend::sample_curve(&backend, &curve, p);
        assert_eq!(lazy.value.to_bits(), batch.value.to_bits(), "at {p}");
    }
}

#[test]
fn keyframe_points_resolve_every_keyframe() {
    let mut c = Channel::new("x");
    c.add("0:1").unwrap();
    c.add("0.5:@ * 4@hermite{deriv=3}").unwrap();
    let pts = c.keyframe_points(&Bindings::default()).unwrap();
    assert_eq!(pts.len(), 2);
    assert_eq!(pts[1].value, 2.0);
    assert_eq!(pts[1].deriv, 3.0);
}

#[test]
fn expression_channels_have_no_curve() {
    let mut c = Channel::new("x");
    c.add("0:@").unwrap();
    assert!(c.curve(OutOfRange::Clamp).unwrap().is_none());
}
