use crate::backend::{BackendKind, NumericBackend, sample_curve};
use crate::interp::{Curve, MethodKind, Sample};

/// Reference backend: one position at a time, no gaussian kernel.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScalarBackend;

impl NumericBackend for ScalarBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Scalar
    }

    fn supports(&self, method: MethodKind) -> bool {
        method != MethodKind::Gaussian
    }

    fn evaluate_batch(&self, curve: &Curve, positions: &[f64]) -> Vec<Sample> {
        positions
            .iter()
            .map(|&p| sample_curve(self, curve, p))
            .collect()
    }
}
