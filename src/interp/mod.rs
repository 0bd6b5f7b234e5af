//! Interpolation methods, their kernels and segment bracketing.

pub(crate) mod curve;
pub(crate) mod kernels;
pub(crate) mod method;

pub use curve::{Curve, Fallback, OutOfRange, ResolvedPoint, Sample};
pub use method::{Method, MethodKind};
