//! Numeric backends and backend selection.
//!
//! Every backend runs the same kernels, so a batch evaluation equals repeated scalar
//! evaluation bit for bit. Backends differ in how batches are scheduled and in which methods
//! they implement.

mod batched;
mod parallel;
mod scalar;

pub use batched::BatchedBackend;
pub use parallel::ParallelBackend;
pub use scalar::ScalarBackend;

use crate::foundation::diagnostics::Notice;
use crate::foundation::error::{SplinalError, SplinalResult};
use crate::interp::kernels::interpolate;
use crate::interp::{Curve, Fallback, Method, MethodKind, ResolvedPoint, Sample};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Backend identifier. Declaration order is selection priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Batched evaluation spread over a dedicated rayon pool.
    Parallel,
    /// Sequential chunked batch evaluation.
    Batched,
    /// Reference implementation. Always available.
    Scalar,
}

impl BackendKind {
    /// All backends in priority order.
    pub const PRIORITY: [BackendKind; 3] = [Self::Parallel, Self::Batched, Self::Scalar];

    /// Stable lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Parallel => "parallel",
            Self::Batched => "batched",
            Self::Scalar => "scalar",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = SplinalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Self::PRIORITY
            .into_iter()
            .find(|k| k.name() == name)
            .ok_or_else(|| SplinalError::value(format!("unknown backend \"{s}\"")))
    }
}

/// Evaluation strategy for interpolation kernels.
pub trait NumericBackend: Send + Sync + fmt::Debug {
    /// Identifier of this backend.
    fn kind(&self) -> BackendKind;

    /// Whether this backend implements `method`.
    fn supports(&self, method: MethodKind) -> bool;

    /// Evaluate one segment. Methods this backend lacks are evaluated as `linear` and the
    /// returned sample carries the fallback.
    fn evaluate_scalar(
        &self,
        method: &Method,
        points: &[ResolvedPoint],
        seg: usize,
        u: f64,
    ) -> Sample {
        let kind = method.kind();
        if self.supports(kind) {
            return Sample::exact(interpolate(method, points, seg, u));
        }
        Sample {
            value: interpolate(&Method::Linear, points, seg, u),
            fallback: Some(Fallback::Unsupported {
                requested: kind,
                used: MethodKind::Linear,
            }),
        }
    }

    /// Evaluate `curve` at every raw position, in order.
    fn evaluate_batch(&self, curve: &Curve, positions: &[f64]) -> Vec<Sample>;

    /// Pool used for position-level parallelism, if this backend has one.
    fn thread_pool(&self) -> Option<&rayon::ThreadPool> {
        None
    }
}

/// Evaluate one position of `curve` through `backend`.
pub(crate) fn sample_curve(backend: &dyn NumericBackend, curve: &Curve, position: f64) -> Sample {
    curve.sample_with(
        position,
        |k| backend.supports(k),
        |m, pts, seg, u| backend.evaluate_scalar(m, pts, seg, u),
    )
}

/// Sample a run of positions into `out`, reusing segment brackets across the run.
pub(crate) fn sample_curve_run(
    backend: &dyn NumericBackend,
    curve: &Curve,
    positions: &[f64],
    out: &mut Vec<Sample>,
) {
    curve.sample_run(
        positions,
        |k| backend.supports(k),
        |m, pts, seg, u| backend.evaluate_scalar(m, pts, seg, u),
        out,
    );
}

/// Outcome of [`select_backend`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    /// Chosen backend.
    pub kind: BackendKind,
    /// Set when the requested backend was unavailable.
    pub notice: Option<Notice>,
}

/// Choose a backend from `available`.
///
/// With no request, the highest-priority available backend wins. An unavailable request walks
/// the priority chain from the requested entry towards `scalar`, then wraps around.
pub fn select_backend(
    requested: Option<BackendKind>,
    available: &[BackendKind],
) -> SplinalResult<Selection> {
    let Some(req) = requested else {
        return BackendKind::PRIORITY
            .into_iter()
            .find(|k| available.contains(k))
            .map(|kind| Selection { kind, notice: None })
            .ok_or_else(no_backend);
    };
    if available.contains(&req) {
        return Ok(Selection {
            kind: req,
            notice: None,
        });
    }

    let start = BackendKind::PRIORITY
        .iter()
        .position(|k| *k == req)
        .unwrap_or(0);
    let chain = BackendKind::PRIORITY[start + 1..]
        .iter()
        .chain(BackendKind::PRIORITY[..start].iter());
    for &kind in chain {
        if available.contains(&kind) {
            return Ok(Selection {
                kind,
                notice: Some(Notice::BackendFallback {
                    requested: req,
                    chosen: kind,
                }),
            });
        }
    }
    Err(no_backend())
}

fn no_backend() -> SplinalError {
    SplinalError::backend_unavailable("no numeric backend is available, not even scalar")
}

/// Backends usable in this process, in priority order.
pub fn list_available() -> Vec<BackendKind> {
    BackendKind::PRIORITY
        .into_iter()
        .filter(|k| match k {
            BackendKind::Parallel => parallel::is_available(),
            BackendKind::Batched | BackendKind::Scalar => true,
        })
        .collect()
}

/// Instantiate backend `kind`.
pub(crate) fn create(
    kind: BackendKind,
    threads: Option<usize>,
    chunk_size: usize,
) -> SplinalResult<Arc<dyn NumericBackend>> {
    Ok(match kind {
        BackendKind::Parallel => Arc::new(ParallelBackend::new(threads, chunk_size)?),
        BackendKind::Batched => Arc::new(BatchedBackend::new(chunk_size)),
        BackendKind::Scalar => Arc::new(ScalarBackend),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/backend/mod.rs"]
mod tests;
