#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! Non-dominated archive and hypervolume logger for biobjective black-box
//! benchmarking.
//!
//! A benchmarking driver wraps each problem in a [`BiobjLogger`] obtained from
//! an [`Observer`]. The logger forwards every evaluation to the problem, keeps
//! the set of non-dominated objective vectors seen so far, tracks how far the
//! hypervolume of that set is from the best known value, and writes the text
//! files consumed by the benchmark post-processing.
//!
//! # Getting Started
//!
//! ```no_run
//! use biobj_logger::prelude::*;
//!
//! let mut observer = Observer::builder("exdata/my-algorithm")
//!     .algorithm_name("MY-ALG")
//!     .options("log_nondominated: final".parse()?)
//!     .build();
//!
//! let info = ProblemInfo::new("toy_f01_i01_d01", 1, vec![0.0, 0.0], vec![1.0, 1.0])
//!     .with_reference_value(IndicatorKind::Hypervolume, 0.5);
//! let problem = FnProblem::new(info, |x: &[f64]| vec![x[0] * x[0], (1.0 - x[0]).powi(2)]);
//!
//! let mut logger = observer.observe(problem)?;
//! for i in 0..=100 {
//!     logger.evaluate(&[f64::from(i) / 100.0])?;
//! }
//! println!("hypervolume gap: {}", logger.indicators()[0].overall_value());
//! logger.finish()?;
//! # Ok::<(), biobj_logger::Error>(())
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`Observer`] | Experiment-wide settings; wraps problems in loggers. |
//! | [`BiobjLogger`] | Intercepts evaluations, maintains the archive, writes output. |
//! | [`Archive`](archive::Archive) | Mutually non-dominated points ordered along the front. |
//! | [`Indicator`](indicator::Indicator) | Running hypervolume difference and its target ladder. |
//! | [`OrderedSet`](ordered_set::OrderedSet) | Balanced ordered set with neighbour links underneath the archive. |
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `serde` | `Serialize`/`Deserialize` on option and problem description types | off |
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) at logger creation, target hits and teardown | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::warn!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_warn {
    ($($arg:tt)*) => { tracing::warn!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_warn {
    ($($arg:tt)*) => {};
}

pub mod archive;
mod error;
pub mod indicator;
pub mod logger;
pub mod observer;
pub mod ordered_set;
pub mod output;
pub mod pareto;
pub mod problem;
pub mod targets;

pub use error::{Error, Result};
pub use logger::BiobjLogger;
pub use observer::{Observer, ObserverBuilder, ObserverOptions};
pub use problem::{FnProblem, Problem, ProblemInfo};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use biobj_logger::prelude::*;
/// ```
pub mod prelude {
    pub use crate::archive::{Archive, ArchiveNode, UpdateOutcome};
    pub use crate::error::{Error, Result};
    pub use crate::indicator::{Indicator, IndicatorKind};
    pub use crate::logger::BiobjLogger;
    pub use crate::observer::{
        LogNondominated, LogVariables, Observer, ObserverBuilder, ObserverOptions,
    };
    pub use crate::pareto::{Dominance, RegionOfInterest, dominance, dominates};
    pub use crate::problem::{FnProblem, Problem, ProblemInfo};
}
