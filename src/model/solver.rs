use crate::backend::{self, BackendKind, NumericBackend, ScalarBackend, select_backend};
use crate::expression::{Bindings, ExprCache};
use crate::foundation::diagnostics::{Diagnostics, Notice};
use crate::foundation::error::{SplinalError, SplinalResult};
use crate::interp::{Curve, Fallback, OutOfRange, Sample};
use crate::model::channel::Channel;
use crate::model::spline::Spline;
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Resolved values of one query: spline name -> channel name -> value, in declaration order.
pub type Solution = IndexMap<String, IndexMap<String, f64>>;

/// Options controlling backend selection and batch evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOpts {
    /// Preferred backend. `None` takes the highest-priority available one.
    pub backend: Option<BackendKind>,
    /// Override the number of rayon worker threads for the `parallel` backend.
    pub threads: Option<usize>,
    /// Minimum positions handed to one batch work unit.
    pub chunk_size: usize,
    /// Behaviour outside each channel's keyframe span.
    pub out_of_range: OutOfRange,
}

impl Default for SolverOpts {
    fn default() -> Self {
        Self {
            backend: None,
            threads: None,
            chunk_size: 64,
            out_of_range: OutOfRange::Clamp,
        }
    }
}

/// Top-level container of splines; the unit of query and persistence.
#[derive(Debug)]
pub struct Solver {
    name: String,
    metadata: serde_json::Map<String, serde_json::Value>,
    splines: IndexMap<String, Spline>,
    variables: BTreeMap<String, f64>,
    opts: SolverOpts,
    cache: ExprCache,
    diagnostics: Diagnostics,
    backend: Arc<dyn NumericBackend>,
}

impl Solver {
    /// Solver with default options.
    ///
    /// If no backend can be built the scalar reference backend is used.
    pub fn new(name: impl Into<String>) -> Self {
        let diagnostics = Diagnostics::new();
        let backend = init_backend(&SolverOpts::default(), &diagnostics)
            .unwrap_or_else(|_| Arc::new(ScalarBackend));
        Self::assemble(name.into(), SolverOpts::default(), diagnostics, backend)
    }

    /// Solver with explicit options. `threads == Some(0)` is a value error.
    pub fn with_opts(name: impl Into<String>, opts: SolverOpts) -> SplinalResult<Self> {
        let diagnostics = Diagnostics::new();
        let backend = init_backend(&opts, &diagnostics)?;
        Ok(Self::assemble(name.into(), opts, diagnostics, backend))
    }

    fn assemble(
        name: String,
        opts: SolverOpts,
        diagnostics: Diagnostics,
        backend: Arc<dyn NumericBackend>,
    ) -> Self {
        Self {
            name,
            metadata: serde_json::Map::new(),
            splines: IndexMap::new(),
            variables: BTreeMap::new(),
            opts,
            cache: ExprCache::new(),
            diagnostics,
            backend,
        }
    }

    /// Solver name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-form metadata carried through scene files.
    pub fn metadata(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.metadata
    }

    /// Mutable metadata.
    pub fn metadata_mut(&mut self) -> &mut serde_json::Map<String, serde_json::Value> {
        &mut self.metadata
    }

    /// Active options.
    pub fn opts(&self) -> &SolverOpts {
        &self.opts
    }

    /// Switch backend preference and rebuild the backend.
    pub fn set_backend(&mut self, backend: Option<BackendKind>) -> SplinalResult<()> {
        let opts = SolverOpts {
            backend,
            ..self.opts.clone()
        };
        self.backend = init_backend(&opts, &self.diagnostics)?;
        self.opts = opts;
        Ok(())
    }

    /// Kind of the backend in use.
    pub fn backend(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Backends usable in this process, in priority order.
    pub fn list_available() -> Vec<BackendKind> {
        backend::list_available()
    }

    /// Fallbacks observed so far.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Append `spline`. A spline with the same name is a value error.
    pub fn add_spline(&mut self, mut spline: Spline) -> SplinalResult<&mut Spline> {
        if self.splines.contains_key(spline.name()) {
            return Err(SplinalError::value(format!(
                "solver already has a spline \"{}\"",
                spline.name()
            )));
        }
        spline.adopt_cache(&self.cache)?;
        Ok(self
            .splines
            .entry(spline.name().to_owned())
            .or_insert(spline))
    }

    /// Remove a spline, keeping the order of the others.
    pub fn remove_spline(&mut self, name: &str) -> Option<Spline> {
        self.splines.shift_remove(name)
    }

    /// Spline by name.
    pub fn spline(&self, name: &str) -> Option<&Spline> {
        self.splines.get(name)
    }

    /// Mutable spline by name.
    pub fn spline_mut(&mut self, name: &str) -> Option<&mut Spline> {
        self.splines.get_mut(name)
    }

    /// Splines in resolution order.
    pub fn splines(&self) -> impl ExactSizeIterator<Item = &Spline> {
        self.splines.values()
    }

    /// Solver-level constants visible to every expression.
    pub fn variables(&self) -> &BTreeMap<String, f64> {
        &self.variables
    }

    /// Define or replace a variable.
    pub fn set_variable(&mut self, name: impl Into<String>, value: f64) -> SplinalResult<()> {
        let name = name.into();
        let valid = name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
            && !name.starts_with("__")
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(SplinalError::value(format!(
                "invalid variable name \"{name}\""
            )));
        }
        if !value.is_finite() {
            return Err(SplinalError::value(format!(
                "variable \"{name}\" must be finite, got {value}"
            )));
        }
        self.variables.insert(name, value);
        Ok(())
    }

    /// Remove a variable, returning its value.
    pub fn remove_variable(&mut self, name: &str) -> Option<f64> {
        self.variables.remove(name)
    }

    /// Resolve every channel at `position`.
    ///
    /// Splines and channels resolve in declaration order. Each resolved channel is published as
    /// `spline.channel`, and as its bare name to later channels of the same spline. A reference
    /// to a channel not yet resolved is a name error.
    #[tracing::instrument(level = "trace", skip(self), fields(solver = %self.name))]
    pub fn solve(&self, position: f64) -> SplinalResult<Solution> {
        let mut bindings = Bindings::new(&self.variables);
        let mut out = Solution::with_capacity(self.splines.len());
        for (spline_name, spline) in &self.splines {
            bindings.enter_spline();
            let mut values = IndexMap::with_capacity(spline.channels().len());
            for channel in spline.channels() {
                let sample = channel.sample(
                    spline_name,
                    position,
                    &mut bindings,
                    self.backend.as_ref(),
                    self.opts.out_of_range,
                )?;
                let value = self.finish(spline_name, channel, sample);
                bindings.publish(spline_name, channel.name(), value);
                values.insert(channel.name().to_owned(), value);
            }
            out.insert(spline_name.clone(), values);
        }
        Ok(out)
    }

    /// Resolve every channel at each of `positions`.
    ///
    /// Results equal calling [`Solver::solve`] per position, bit for bit. Solvers without
    /// expression keyframes evaluate whole channels through the backend's batch path;
    /// otherwise positions are resolved independently, on the backend's pool if it has one.
    #[tracing::instrument(skip(self, positions), fields(solver = %self.name, positions = positions.len()))]
    pub fn solve_batch(&self, positions: &[f64]) -> SplinalResult<Vec<Solution>> {
        if positions.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(curves) = self.literal_curves(positions[0])? {
            tracing::debug!(backend = %self.backend(), "curve batch path");
            return Ok(self.solve_curves(&curves, positions));
        }

        let results: Vec<SplinalResult<Solution>> = match self.backend.thread_pool() {
            Some(pool) => pool.install(|| {
                positions
                    .par_iter()
                    .with_min_len(self.opts.chunk_size.max(1))
                    .map(|&p| self.solve(p))
                    .collect()
            }),
            None => positions.iter().map(|&p| self.solve(p)).collect(),
        };
        results.into_iter().collect()
    }

    /// Every channel as a resolved curve, or `None` as soon as one holds an expression.
    fn literal_curves(&self, first: f64) -> SplinalResult<Option<Vec<(&str, &Channel, Curve)>>> {
        let mut curves = Vec::new();
        for (spline_name, spline) in &self.splines {
            for channel in spline.channels() {
                let curve = channel
                    .curve(self.opts.out_of_range)
                    .map_err(|e| channel.resolve_error(spline_name, first, None, e))?;
                match curve {
                    Some(c) => curves.push((spline_name.as_str(), channel, c)),
                    None => return Ok(None),
                }
            }
        }
        Ok(Some(curves))
    }

    fn solve_curves(&self, curves: &[(&str, &Channel, Curve)], positions: &[f64]) -> Vec<Solution> {
        let empty: Solution = self
            .splines
            .keys()
            .map(|name| (name.clone(), IndexMap::new()))
            .collect();
        let mut out = vec![empty; positions.len()];
        for (spline_name, channel, curve) in curves {
            let samples = self.backend.evaluate_batch(curve, positions);
            for (sol, sample) in out.iter_mut().zip(samples) {
                let value = self.finish(spline_name, channel, sample);
                if let Some(values) = sol.get_mut(*spline_name) {
                    values.insert(channel.name().to_owned(), value);
                }
            }
        }
        out
    }

    /// Report any fallback and apply channel bounds.
    fn finish(&self, spline: &str, channel: &Channel, sample: Sample) -> f64 {
        if let Some(fallback) = sample.fallback {
            let path = format!("{spline}.{}", channel.name());
            self.diagnostics.report(match fallback {
                Fallback::Points {
                    requested,
                    used,
                    points,
                } => Notice::MethodFallback {
                    channel: path,
                    requested,
                    used,
                    points,
                },
                Fallback::Unsupported { requested, used } => Notice::MethodUnsupported {
                    channel: path,
                    backend: self.backend(),
                    requested,
                    used,
                },
            });
        }
        channel.apply_bounds(sample.value)
    }
}

fn init_backend(
    opts: &SolverOpts,
    diagnostics: &Diagnostics,
) -> SplinalResult<Arc<dyn NumericBackend>> {
    if opts.threads == Some(0) {
        return Err(SplinalError::value("'threads' must be >= 1 when set"));
    }
    let mut available = backend::list_available();
    loop {
        let selection = select_backend(opts.backend, &available)?;
        if let Some(notice) = selection.notice {
            diagnostics.report(notice);
        }
        match backend::create(selection.kind, opts.threads, opts.chunk_size) {
            Ok(b) => {
                tracing::debug!(backend = %selection.kind, "numeric backend selected");
                return Ok(b);
            }
            Err(e) => {
                tracing::warn!(backend = %selection.kind, error = %e, "numeric backend failed to start");
                available.retain(|k| *k != selection.kind);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/solver.rs"]
mod tests;
