//! Splinaltap resolves named scalar channels at a normalized query position.
//!
//! A [`Solver`] owns ordered [`Spline`]s, each owning ordered [`Channel`]s of [`Keyframe`]s.
//! Keyframe values are numbers or expressions in a small, side-effect-free language that can
//! read the query position `@`, solver variables, and channels resolved earlier in the same
//! query. Ten interpolation [`Method`]s are available, evaluated by a selectable numeric
//! backend:
//!
//! - Build a solver in code, or load a [`SceneDef`] from JSON
//! - Query one position with [`Solver::solve`], or many with [`Solver::solve_batch`]
//! - Inspect method and backend fallbacks through [`Solver::diagnostics`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub mod backend;
pub mod expression;
pub mod interp;
pub mod model;
pub mod scene;

pub use crate::foundation::diagnostics::{Diagnostics, Notice};
pub use crate::foundation::error::{ErrorKind, SplinalError, SplinalResult};
pub use crate::foundation::math::linspace;

pub use crate::backend::BackendKind;
pub use crate::interp::{Method, MethodKind, OutOfRange};
pub use crate::model::{
    Channel, Expression, Keyframe, KeyframeValue, Solution, Solver, SolverOpts, Spline,
};
pub use crate::scene::SceneDef;
