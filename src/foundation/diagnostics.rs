use crate::backend::BackendKind;
use crate::interp::method::MethodKind;
use std::fmt;
use std::sync::Mutex;

/// A non-fatal condition observed while solving.
///
/// Fallbacks never fail a query; they are reported here and through `tracing` instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    /// A channel has fewer keyframes than its method needs and a simpler method was used.
    MethodFallback {
        /// Channel path, `"<spline>.<channel>"` (or the bare channel name outside a solver).
        channel: String,
        /// Method requested by the keyframe or channel default.
        requested: MethodKind,
        /// Method actually evaluated.
        used: MethodKind,
        /// Keyframes available in the channel.
        points: usize,
    },
    /// The active backend has no implementation for a method; a simpler method was used.
    MethodUnsupported {
        /// Channel path, `"<spline>.<channel>"`.
        channel: String,
        /// Backend that lacks the method.
        backend: BackendKind,
        /// Method requested by the keyframe or channel default.
        requested: MethodKind,
        /// Method actually evaluated.
        used: MethodKind,
    },
    /// The requested backend is unavailable and another one from the chain was chosen.
    BackendFallback {
        /// Requested backend.
        requested: BackendKind,
        /// Backend that was selected instead.
        chosen: BackendKind,
    },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MethodFallback {
                channel,
                requested,
                used,
                points,
            } => write!(
                f,
                "{channel}: {requested} needs at least {} keyframes, have {points}; using {used}",
                requested.min_points()
            ),
            Self::MethodUnsupported {
                channel,
                backend,
                requested,
                used,
            } => write!(
                f,
                "{channel}: backend {backend} has no {requested} implementation; using {used}"
            ),
            Self::BackendFallback { requested, chosen } => {
                write!(f, "backend {requested} unavailable; using {chosen}")
            }
        }
    }
}

/// De-duplicating sink for [`Notice`]s.
///
/// Shared by every query against a solver, including parallel batch workers.
#[derive(Debug, Default)]
pub struct Diagnostics {
    notices: Mutex<Vec<Notice>>,
}

impl Diagnostics {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a notice unless an equal one is already held. Logs newly seen notices.
    pub fn report(&self, notice: Notice) {
        let mut guard = match self.notices.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guard.contains(&notice) {
            return;
        }
        tracing::warn!(%notice, "splinaltap fallback");
        guard.push(notice);
    }

    /// Copy of all notices recorded so far, in first-seen order.
    pub fn notices(&self) -> Vec<Notice> {
        match self.notices.lock() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Remove and return all recorded notices.
    pub fn drain(&self) -> Vec<Notice> {
        let mut guard = match self.notices.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::take(&mut *guard)
    }

    /// Return `true` when nothing has been reported.
    pub fn is_empty(&self) -> bool {
        self.notices().is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/diagnostics.rs"]
mod tests;
