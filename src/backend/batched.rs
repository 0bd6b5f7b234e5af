use crate::backend::{BackendKind, NumericBackend, sample_curve_run};
use crate::interp::{Curve, MethodKind, Sample};

/// Sequential backend that walks batches in fixed-size chunks and implements every method.
///
/// Within a chunk, consecutive positions in the same segment share one bracketing.
#[derive(Clone, Copy, Debug)]
pub struct BatchedBackend {
    chunk_size: usize,
}

impl BatchedBackend {
    /// `chunk_size` of 0 is treated as 1.
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }
}

impl NumericBackend for BatchedBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Batched
    }

    fn supports(&self, _method: MethodKind) -> bool {
        true
    }

    fn evaluate_batch(&self, curve: &Curve, positions: &[f64]) -> Vec<Sample> {
        let mut out = Vec::with_capacity(positions.len());
        for chunk in positions.chunks(self.chunk_size) {
            sample_curve_run(self, curve, chunk, &mut out);
        }
        out
    }
}
