use crate::backend::NumericBackend;
use crate::expression::{Bindings, ExprCache};
use crate::foundation::error::{SplinalError, SplinalResult};
use crate::foundation::math::normalize;
use crate::interp::curve::{Plan, plan};
use crate::interp::{Curve, Method, OutOfRange, ResolvedPoint, Sample};
use crate::model::keyframe::Keyframe;
use smallvec::SmallVec;

/// One named scalar curve: sorted keyframes plus a default method.
#[derive(Clone, Debug)]
pub struct Channel {
    name: String,
    keyframes: Vec<Keyframe>,
    default_method: Method,
    index_mode: bool,
    bounds: Option<(f64, f64)>,
    cache: ExprCache,
}

impl Channel {
    /// Empty channel with `linear` as its default method.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keyframes: Vec::new(),
            default_method: Method::Linear,
            index_mode: false,
            bounds: None,
            cache: ExprCache::new(),
        }
    }

    /// Builder form of [`Channel::set_default_method`].
    pub fn with_method(mut self, method: Method) -> Self {
        self.default_method = method;
        self
    }

    /// Builder form of [`Channel::set_index_mode`].
    pub fn with_index_mode(mut self, index_mode: bool) -> Self {
        self.index_mode = index_mode;
        self
    }

    /// Builder form of [`Channel::set_bounds`].
    pub fn with_bounds(mut self, lo: f64, hi: f64) -> SplinalResult<Self> {
        self.set_bounds(Some((lo, hi)))?;
        Ok(self)
    }

    /// Channel name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Method used by keyframes without their own.
    pub fn default_method(&self) -> &Method {
        &self.default_method
    }

    /// Replace the default method.
    pub fn set_default_method(&mut self, method: Method) {
        self.default_method = method;
    }

    /// Return `true` when keyframe positions are raw indices normalized by the channel span.
    pub fn index_mode(&self) -> bool {
        self.index_mode
    }

    /// Switch raw-index mode.
    pub fn set_index_mode(&mut self, index_mode: bool) {
        self.index_mode = index_mode;
    }

    /// Output clamp range.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.bounds
    }

    /// Clamp resolved values to `[lo, hi]`, or stop clamping with `None`.
    pub fn set_bounds(&mut self, bounds: Option<(f64, f64)>) -> SplinalResult<()> {
        if let Some((lo, hi)) = bounds
            && (lo.is_nan() || hi.is_nan() || lo > hi)
        {
            return Err(SplinalError::value(format!(
                "channel \"{}\": bounds [{lo}, {hi}] are empty",
                self.name
            )));
        }
        self.bounds = bounds;
        Ok(())
    }

    /// Keyframes sorted by position.
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Return `true` when no keyframe holds an expression.
    pub fn is_literal(&self) -> bool {
        self.keyframes.iter().all(Keyframe::is_literal)
    }

    /// Insert `keyframe` in position order.
    ///
    /// A keyframe already at the same position is a value error.
    pub fn add_keyframe(&mut self, mut keyframe: Keyframe) -> SplinalResult<()> {
        if !keyframe.at.is_finite() {
            return Err(SplinalError::value(format!(
                "channel \"{}\": keyframe position {} is not finite",
                self.name, keyframe.at
            )));
        }
        let idx = self.keyframes.partition_point(|k| k.at < keyframe.at);
        if self.keyframes.get(idx).is_some_and(|k| k.at == keyframe.at) {
            return Err(SplinalError::value(format!(
                "channel \"{}\" already has a keyframe at {}",
                self.name, keyframe.at
            )));
        }
        keyframe.intern(&self.cache)?;
        self.keyframes.insert(idx, keyframe);
        Ok(())
    }

    /// Parse shorthand `<at>:<value>[@<method>]` and insert it.
    pub fn add(&mut self, shorthand: &str) -> SplinalResult<()> {
        let keyframe = Keyframe::parse_with(shorthand, &self.cache)?;
        self.add_keyframe(keyframe)
    }

    /// Remove the keyframe at exactly `at`.
    pub fn remove_keyframe(&mut self, at: f64) -> Option<Keyframe> {
        let idx = self.keyframes.iter().position(|k| k.at == at)?;
        Some(self.keyframes.remove(idx))
    }

    /// Every keyframe resolved against `bindings`, with `@` bound to each keyframe's own
    /// (normalized) position. Positions are reported raw.
    pub fn keyframe_points(&self, bindings: &Bindings<'_>) -> SplinalResult<Vec<ResolvedPoint>> {
        let span = self.span();
        let mut scratch = bindings.clone();
        self.keyframes
            .iter()
            .map(|k| {
                scratch.set_position(normalize_in(span, k.at));
                Ok(ResolvedPoint {
                    at: k.at,
                    value: k.resolve(&scratch)?,
                    deriv: k.deriv(),
                })
            })
            .collect()
    }

    pub(crate) fn adopt_cache(&mut self, cache: &ExprCache) -> SplinalResult<()> {
        for k in &mut self.keyframes {
            k.intern(cache)?;
        }
        self.cache = cache.clone();
        Ok(())
    }

    pub(crate) fn apply_bounds(&self, value: f64) -> f64 {
        match self.bounds {
            Some((lo, hi)) => value.clamp(lo, hi),
            None => value,
        }
    }

    fn span(&self) -> Option<(f64, f64)> {
        if !self.index_mode {
            return None;
        }
        let first = self.keyframes.first()?;
        let last = self.keyframes.last()?;
        Some((first.at, last.at))
    }

    fn empty_error(&self) -> SplinalError {
        SplinalError::value(format!("channel \"{}\" has no keyframes", self.name))
    }

    /// Wrap `source` with the query context of this channel.
    pub(crate) fn resolve_error(
        &self,
        spline: &str,
        position: f64,
        expression: Option<&str>,
        source: SplinalError,
    ) -> SplinalError {
        SplinalError::Resolve {
            spline: spline.to_owned(),
            channel: self.name.clone(),
            position,
            expression: expression.map(str::to_owned),
            source: Box::new(source),
        }
    }

    /// Fully resolved curve, available when no keyframe holds an expression.
    pub(crate) fn curve(&self, out_of_range: OutOfRange) -> SplinalResult<Option<Curve>> {
        if self.keyframes.is_empty() {
            return Err(self.empty_error());
        }
        if !self.is_literal() {
            return Ok(None);
        }
        let keys = self
            .keyframes
            .iter()
            .map(|k| {
                let value = k.resolve(&Bindings::default())?;
                let point = ResolvedPoint {
                    at: k.at,
                    value,
                    deriv: k.deriv(),
                };
                Ok((point, k.method.clone()))
            })
            .collect::<SplinalResult<Vec<_>>>()?;
        Curve::new(keys, self.default_method.clone(), self.index_mode, out_of_range).map(Some)
    }

    /// Resolve this channel at raw `position`.
    ///
    /// Binds `@` to the normalized position and evaluates only the keyframes the effective
    /// method reads. Errors carry the spline, channel, position and expression text.
    pub(crate) fn sample(
        &self,
        spline: &str,
        position: f64,
        bindings: &mut Bindings<'_>,
        backend: &dyn NumericBackend,
        out_of_range: OutOfRange,
    ) -> SplinalResult<Sample> {
        let context = |expression: Option<&str>, source: SplinalError| {
            self.resolve_error(spline, position, expression, source)
        };

        let span = self.span();
        let x = normalize_in(span, position);
        bindings.set_position(x);

        let Some(query) = plan(
            self.keyframes.len(),
            x,
            |i| normalize_in(span, self.keyframes[i].at),
            |i| self.keyframes[i].method.as_ref(),
            &self.default_method,
            span,
            out_of_range,
            |k| backend.supports(k),
        ) else {
            return Err(context(None, self.empty_error()));
        };

        let resolve = |i: usize| -> SplinalResult<ResolvedPoint> {
            let k = &self.keyframes[i];
            let value = k
                .resolve(bindings)
                .map_err(|e| context(k.expression(), e))?;
            Ok(ResolvedPoint {
                at: normalize_in(span, k.at),
                value,
                deriv: k.deriv(),
            })
        };

        match query {
            Plan::Hold { index, fallback } => Ok(Sample {
                value: resolve(index)?.value,
                fallback,
            }),
            Plan::Kernel {
                method,
                window,
                seg,
                u,
                fallback,
            } => {
                let points = window
                    .map(resolve)
                    .collect::<SplinalResult<SmallVec<[ResolvedPoint; 4]>>>()?;
                let s = backend.evaluate_scalar(&*method, &points, seg, u);
                Ok(Sample {
                    value: s.value,
                    fallback: fallback.or(s.fallback),
                })
            }
        }
    }
}

fn normalize_in(span: Option<(f64, f64)>, x: f64) -> f64 {
    match span {
        Some((lo, hi)) => normalize(x, lo, hi),
        None => x,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/channel.rs"]
mod tests;
