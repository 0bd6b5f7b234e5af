use super::*;
use crate::interp::OutOfRange;

fn curve(default: Method) -> Curve {
    let keys = [(0.0, 0.0), (0.2, 3.0), (0.45, -1.0), (0.7, 2.5), (1.0, 4.0)]
        .into_iter()
        .map(|(x, y)| (ResolvedPoint::new(x, y), None))
        .collect();
    Curve::new(keys, default, false, OutOfRange::Clamp).unwrap()
}

fn positions() -> Vec<f64> {
    (0..=257).map(|i| -0.1 + 1.2 * i as f64 / 257.0).collect()
}

#[test]
fn names_round_trip() {
    for k in BackendKind::PRIORITY {
        assert_eq!(k.to_string().parse::<BackendKind>().unwrap(), k);
    }
    assert!("gpu".parse::<BackendKind>().is_err());
}

#[test]
fn batched_equals_scalar_exactly() {
    let backends: Vec<Arc<dyn NumericBackend>> = vec![
        create(BackendKind::Scalar, None, 16).unwrap(),
        create(BackendKind::Batched, None, 7).unwrap(),
        create(BackendKind::Parallel, Some(2), 5).unwrap(),
    ];
    let xs = positions();
    for kind in MethodKind::ALL {
        let c = curve(Method::from(kind));
        for b in &backends {
            let batch = b.evaluate_batch(&c, &xs);
            assert_eq!(batch.len(), xs.len());
            for (x, s) in xs.iter().zip(&batch) {
                let one = sample_curve(b.as_ref(), &c, *x);
                assert_eq!(
                    s.value.to_bits(),
                    one.value.to_bits(),
                    "{kind} on {} at {x}",
                    b.kind()
                );
            }
        }
    }
}

#[test]
fn all_backends_agree_on_supported_methods() {
    let scalar = ScalarBackend;
    let batched = BatchedBackend::new(3);
    let xs = positions();
    for kind in MethodKind::ALL
        .into_iter()
        .filter(|k| *k != MethodKind::Gaussian)
    {
        let c = curve(Method::from(kind));
        assert_eq!(
            scalar.evaluate_batch(&c, &xs),
            batched.evaluate_batch(&c, &xs),
            "{kind}"
        );
    }
}

#[test]
fn scalar_lacks_gaussian() {
    let c = curve(Method::Gaussian { width: None });
    let s = sample_curve(&ScalarBackend, &c, 0.5);
    assert!(matches!(
        s.fallback,
        Some(Fallback::Unsupported {
            requested: MethodKind::Gaussian,
            used: MethodKind::Linear
        })
    ));
    let b = sample_curve(&BatchedBackend::new(1), &c, 0.5);
    assert_eq!(b.fallback, None);
}

#[test]
fn direct_scalar_calls_degrade_unsupported_methods() {
    let pts = [ResolvedPoint::new(0.0, 0.0), ResolvedPoint::new(1.0, 2.0)];
    let s = ScalarBackend.evaluate_scalar(&Method::Gaussian { width: None }, &pts, 0, 0.5);
    assert_eq!(s.value, 1.0);
    assert!(s.fallback.is_some());
}

#[test]
fn selection_without_request_takes_highest_priority() {
    let s = select_backend(None, &[BackendKind::Scalar, BackendKind::Batched]).unwrap();
    assert_eq!(s.kind, BackendKind::Batched);
    assert_eq!(s.notice, None);
}

#[test]
fn selection_walks_the_chain() {
    let s = select_backend(Some(BackendKind::Parallel), &[BackendKind::Scalar]).unwrap();
    assert_eq!(s.kind, BackendKind::Scalar);
    assert_eq!(
        s.notice,
        Some(Notice::BackendFallback {
            requested: BackendKind::Parallel,
            chosen: BackendKind::Scalar
        })
    );

    let s = select_backend(
        Some(BackendKind::Parallel),
        &[BackendKind::Scalar, BackendKind::Batched],
    )
    .unwrap();
    assert_eq!(s.kind, BackendKind::Batched);

    let s = select_backend(Some(BackendKind::Scalar), &[BackendKind::Batched]).unwrap();
    assert_eq!(s.kind, BackendKind::Batched);
}

#[test]
fn selection_with_nothing_available_is_fatal() {
    let err = select_backend(Some(BackendKind::Scalar), &[]).unwrap_err();
    assert!(matches!(err, SplinalError::BackendUnavailable(_)));
    assert!(select_backend(None, &[]).is_err());
}

#[test]
fn scalar_is_always_listed_last() {
    let available = list_available();
    assert_eq!(available.last(), Some(&BackendKind::Scalar));
    assert!(available.contains(&BackendKind::Batched));
}

#[test]
fn zero_threads_is_rejected() {
    let err = create(BackendKind::Parallel, Some(0), 8).unwrap_err();
    assert!(matches!(err, SplinalError::Value(_)));
}
