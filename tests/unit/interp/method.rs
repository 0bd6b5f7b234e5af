use super::*;
use crate::foundation::error::ErrorKind;

#[test]
fn min_points_match_the_method_table() {
    let expected = [1, 1, 2, 3, 4, 2, 2, 2, 3, 2];
    for (kind, want) in MethodKind::ALL.into_iter().zip(expected) {
        assert_eq!(kind.min_points(), want, "{kind}");
    }
}

#[test]
fn degrade_prefers_linear_then_step() {
    assert_eq!(MethodKind::Cubic.degrade(4), MethodKind::Cubic);
    assert_eq!(MethodKind::Cubic.degrade(3), MethodKind::Linear);
    assert_eq!(MethodKind::Bezier.degrade(1), MethodKind::Step);
    assert_eq!(MethodKind::Nearest.degrade(1), MethodKind::Nearest);
}

#[test]
fn parses_plain_names_case_insensitively() {
    assert_eq!("cubic".parse::<Method>().unwrap(), Method::Cubic);
    assert_eq!(" PCHIP ".parse::<Method>().unwrap(), Method::Pchip);
    assert_eq!(
        "hermite".parse::<Method>().unwrap(),
        Method::Hermite { deriv: 0.0 }
    );
}

#[test]
fn parses_parameter_shorthand() {
    assert_eq!(
        "bezier{cp=0.6,6,0.7,5}".parse::<Method>().unwrap(),
        Method::Bezier {
            cp: Some([0.6, 6.0, 0.7, 5.0])
        }
    );
    assert_eq!(
        "hermite{deriv=2.5}".parse::<Method>().unwrap(),
        Method::Hermite { deriv: 2.5 }
    );
    assert_eq!(
        "gaussian{width=0.2}".parse::<Method>().unwrap(),
        Method::Gaussian { width: Some(0.2) }
    );
}

#[test]
fn malformed_parameters_are_value_errors() {
    for src in [
        "spline",
        "bezier{cp=1,2,3}",
        "bezier{cp=1,2,3,x}",
        "bezier{cp=1,2,3,4",
        "hermite{slope=1}",
        "linear{deriv=1}",
        "gaussian{width=0}",
        "hermite{deriv}",
    ] {
        let err = src.parse::<Method>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value, "{src}");
    }
}

#[test]
fn display_round_trips_through_parse() {
    for m in [
        Method::Linear,
        Method::Hermite { deriv: -1.25 },
        Method::Bezier {
            cp: Some([0.1, 2.0, 0.3, 4.5]),
        },
        Method::Bezier { cp: None },
        Method::Gaussian { width: Some(0.2) },
    ] {
        assert_eq!(m.to_string().parse::<Method>().unwrap(), m);
    }
}

#[test]
fn support_windows_are_clipped() {
    assert_eq!(Method::Linear.support(2, 5), 2..4);
    assert_eq!(Method::Cubic.support(0, 5), 0..3);
    assert_eq!(Method::Cubic.support(2, 5), 1..5);
    assert_eq!(Method::Pchip.support(3, 5), 2..5);
    assert_eq!(Method::Polynomial.support(1, 5), 0..5);
}
