use crate::backend::{BackendKind, NumericBackend, sample_curve_run};
use crate::foundation::error::{SplinalError, SplinalResult};
use crate::interp::{Curve, MethodKind, Sample};
use rayon::prelude::*;

/// Batched backend running on a dedicated rayon pool.
#[derive(Debug)]
pub struct ParallelBackend {
    pool: rayon::ThreadPool,
    chunk_size: usize,
}

impl ParallelBackend {
    /// Build the backend and its pool. `threads == Some(0)` is rejected; `None` uses rayon's
    /// default thread count.
    pub fn new(threads: Option<usize>, chunk_size: usize) -> SplinalResult<Self> {
        Ok(Self {
            pool: build_thread_pool(threads)?,
            chunk_size: chunk_size.max(1),
        })
    }
}

impl NumericBackend for ParallelBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Parallel
    }

    fn supports(&self, _method: MethodKind) -> bool {
        true
    }

    fn evaluate_batch(&self, curve: &Curve, positions: &[f64]) -> Vec<Sample> {
        self.pool.install(|| {
            positions
                .par_chunks(self.chunk_size)
                .flat_map_iter(|chunk| {
                    let mut out = Vec::with_capacity(chunk.len());
                    sample_curve_run(self, curve, chunk, &mut out);
                    out
                })
                .collect()
        })
    }

    fn thread_pool(&self) -> Option<&rayon::ThreadPool> {
        Some(&self.pool)
    }
}

pub(crate) fn is_available() -> bool {
    let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
    cores > 1 && build_thread_pool(Some(1)).is_ok()
}

pub(crate) fn build_thread_pool(threads: Option<usize>) -> SplinalResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(SplinalError::value("'threads' must be >= 1 when set"));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder.build().map_err(|e| {
        SplinalError::backend_unavailable(format!("failed to build rayon thread pool: {e}"))
    })
}
