use super::*;
use crate::interp::kernels::interpolate;
use approx::assert_relative_eq;

fn curve(xy: &[(f64, f64)], default: Method, index_mode: bool, oor: OutOfRange) -> Curve {
    let keys = xy
        .iter()
        .map(|&(x, y)| (ResolvedPoint::new(x, y), None))
        .collect();
    Curve::new(keys, default, index_mode, oor).unwrap()
}

fn sample(c: &Curve, x: f64) -> Sample {
    c.sample_with(
        x,
        |_| true,
        |m, p, s, u| Sample::exact(interpolate(m, p, s, u)),
    )
}

#[test]
fn brackets_interior_positions() {
    let c = curve(
        &[(0.0, 0.0), (1.0, 10.0), (2.0, 0.0)],
        Method::Linear,
        false,
        OutOfRange::Clamp,
    );
    assert_eq!(sample(&c, 0.5).value, 5.0);
    assert_eq!(sample(&c, 1.5).value, 5.0);
    assert_eq!(sample(&c, 1.0).value, 10.0);
}

#[test]
fn clamps_outside_the_span() {
    let c = curve(
        &[(0.0, 1.0), (1.0, 3.0)],
        Method::Linear,
        false,
        OutOfRange::Clamp,
    );
    assert_eq!(sample(&c, -5.0).value, 1.0);
    assert_eq!(sample(&c, 5.0).value, 3.0);
}

#[test]
fn extrapolates_boundary_segments_when_asked() {
    let c = curve(
        &[(0.0, 1.0), (1.0, 3.0)],
        Method::Linear,
        false,
        OutOfRange::Extrapolate,
    );
    assert_eq!(sample(&c, -1.0).value, -1.0);
    assert_eq!(sample(&c, 2.0).value, 5.0);
    assert_eq!(sample(&c, 1.0).value, 3.0);

    let held = curve(
        &[(0.0, 1.0), (1.0, 3.0)],
        Method::Step,
        false,
        OutOfRange::Extrapolate,
    );
    assert_eq!(sample(&held, 2.0).value, 3.0);
}

#[test]
fn index_mode_normalizes_by_the_keyframe_span() {
    let c = curve(
        &[(0.0, 0.0), (5.0, 5.0), (10.0, 10.0)],
        Method::Linear,
        true,
        OutOfRange::Clamp,
    );
    assert_eq!(c.points()[1].at, 0.5);
    for raw in [0.0, 5.0, 10.0] {
        assert_eq!(sample(&c, raw).value, raw);
    }
    assert_eq!(c.position(2.5), 0.25);
}

#[test]
fn too_few_points_fall_back_and_report() {
    let c = curve(
        &[(0.0, 0.0), (1.0, 10.0)],
        Method::Cubic,
        false,
        OutOfRange::Clamp,
    );
    let s = sample(&c, 0.5);
    assert_eq!(s.value, 5.0);
    assert_eq!(
        s.fallback,
        Some(Fallback::Points {
            requested: MethodKind::Cubic,
            used: MethodKind::Linear,
            points: 2
        })
    );

    let single = curve(
        &[(0.3, 7.0)],
        Method::Bezier { cp: None },
        false,
        OutOfRange::Clamp,
    );
    let s = sample(&single, 0.9);
    assert_eq!(s.value, 7.0);
    assert!(matches!(
        s.fallback,
        Some(Fallback::Points {
            used: MethodKind::Step,
            ..
        })
    ));
}

#[test]
fn unsupported_methods_degrade_to_linear() {
    let c = curve(
        &[(0.0, 0.0), (0.5, 1.0), (1.0, 0.0)],
        Method::Gaussian { width: None },
        false,
        OutOfRange::Clamp,
    );
    let s = c.sample_with(
        0.25,
        |k| k != MethodKind::Gaussian,
        |m, p, seg, u| Sample::exact(interpolate(m, p, seg, u)),
    );
    assert_eq!(s.value, 0.5);
    assert_eq!(
        s.fallback,
        Some(Fallback::Unsupported {
            requested: MethodKind::Gaussian,
            used: MethodKind::Linear
        })
    );
}

#[test]
fn segment_method_comes_from_the_left_keyframe() {
    let keys = vec![
        (ResolvedPoint::new(0.0, 0.0), Some(Method::Step)),
        (ResolvedPoint::new(1.0, 10.0), None),
        (ResolvedPoint::new(2.0, 20.0), None),
    ];
    let c = Curve::new(keys, Method::Linear, false, OutOfRange::Clamp).unwrap();
    assert_eq!(sample(&c, 0.9).value, 0.0);
    assert_eq!(sample(&c, 1.5).value, 15.0);
}

#[test]
fn rejects_empty_and_unsorted_keyframes() {
    assert!(Curve::new(Vec::new(), Method::Linear, false, OutOfRange::Clamp).is_err());
    let keys = vec![
        (ResolvedPoint::new(1.0, 0.0), None),
        (ResolvedPoint::new(1.0, 1.0), None),
    ];
    assert!(Curve::new(keys, Method::Linear, false, OutOfRange::Clamp).is_err());
}

#[test]
fn index_mode_normalizes_bezier_control_points() {
    let bezier = |cp| Some(Method::Bezier { cp: Some(cp) });
    let plain = Curve::new(
        vec![
            (ResolvedPoint::new(0.0, 0.0), bezier([0.3, 9.0, 0.7, 9.0])),
            (ResolvedPoint::new(1.0, 10.0), None),
        ],
        Method::Linear,
        false,
        OutOfRange::Clamp,
    )
    .unwrap();
    let indexed = Curve::new(
        vec![
            (ResolvedPoint::new(0.0, 0.0), bezier([3.0, 9.0, 7.0, 9.0])),
            (ResolvedPoint::new(10.0, 10.0), None),
        ],
        Method::Linear,
        true,
        OutOfRange::Clamp,
    )
    .unwrap();

    for i in 0..=10 {
        let raw = f64::from(i);
        assert_relative_eq!(
            sample(&indexed, raw).value,
            sample(&plain, raw / 10.0).value,
            epsilon = 1e-12
        );
    }
    assert!(sample(&indexed, 3.0).value > 6.0);
}

#[test]
fn gaussian_is_continuous_at_both_span_edges() {
    let keys = [(0.0, 1.0), (0.25, 3.0), (0.5, -2.0), (0.75, 4.0), (1.0, 0.0)];
    for oor in [OutOfRange::Clamp, OutOfRange::Extrapolate] {
        let c = curve(&keys, Method::Gaussian { width: None }, false, oor);
        let first = sample(&c, 0.0).value;
        let last = sample(&c, 1.0).value;
        assert_relative_eq!(sample(&c, 1e-9).value, first, epsilon = 1e-6);
        assert_relative_eq!(sample(&c, 1.0 - 1e-9).value, last, epsilon = 1e-6);
        assert_relative_eq!(sample(&c, -1e-9).value, first, epsilon = 1e-6);
        assert_relative_eq!(sample(&c, 1.0 + 1e-9).value, last, epsilon = 1e-6);
        if oor == OutOfRange::Clamp {
            assert_eq!(sample(&c, -5.0).value, first);
            assert_eq!(sample(&c, 5.0).value, last);
        }
    }
}

#[test]
fn runs_match_single_samples_bit_for_bit() {
    let keys = [(0.0, 1.0), (0.25, 3.0), (0.5, -2.0), (0.75, 4.0), (1.0, 0.0)];
    let mut raws: Vec<f64> = (0..=120).map(|i| f64::from(i) / 100.0 - 0.1).collect();
    raws.extend([0.6, 0.1, 0.6, 0.5, 0.5, 1.0, -3.0, 0.74, f64::NAN]);

    for kind in MethodKind::ALL {
        for oor in [OutOfRange::Clamp, OutOfRange::Extrapolate] {
            for index_mode in [false, true] {
                let c = curve(&keys, Method::from(kind), index_mode, oor);
                let mut run = Vec::new();
                c.sample_run(
                    &raws,
                    |_| true,
                    |m, p, s, u| Sample::exact(interpolate(m, p, s, u)),
                    &mut run,
                );
                assert_eq!(run.len(), raws.len());
                for (x, got) in raws.iter().zip(&run) {
                    let want = sample(&c, *x);
                    assert_eq!(got.value.to_bits(), want.value.to_bits(), "{kind} at {x}");
                    assert_eq!(got.fallback, want.fallback);
                }
            }
        }
    }
}

#[test]
fn runs_keep_per_segment_methods() {
    let keys = vec![
        (ResolvedPoint::new(0.0, 0.0), Some(Method::Step)),
        (ResolvedPoint::new(1.0, 10.0), None),
        (ResolvedPoint::new(2.0, 0.0), None),
    ];
    let c = Curve::new(keys, Method::Linear, false, OutOfRange::Clamp).unwrap();
    let mut run = Vec::new();
    c.sample_run(
        &[0.25, 0.75, 1.25, 1.75],
        |_| true,
        |m, p, s, u| Sample::exact(interpolate(m, p, s, u)),
        &mut run,
    );
    let got: Vec<f64> = run.iter().map(|s| s.value).collect();
    assert_eq!(got, [0.0, 0.0, 7.5, 2.5]);
}
