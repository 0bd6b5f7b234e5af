//! Keyframes, channels, splines and the solver that resolves them.

pub(crate) mod channel;
pub(crate) mod keyframe;
pub(crate) mod solver;
pub(crate) mod spline;

pub use channel::Channel;
pub use keyframe::{Expression, Keyframe, KeyframeValue};
pub use solver::{Solution, Solver, SolverOpts};
pub use spline::Spline;
