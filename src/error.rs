use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a problem with other than two objectives is observed.
    #[error("the biobjective logger cannot log a problem with {got} objective(s)")]
    UnsupportedObjectives {
        /// The number of objectives of the rejected problem.
        got: usize,
    },

    /// Returned when an indicator name has no known computation rule.
    #[error("unknown indicator '{0}'")]
    UnknownIndicator(String),

    /// Returned when the problem has no best known value for a tracked indicator.
    #[error("no reference value for indicator '{indicator}' on problem '{problem}'")]
    MissingReferenceValue {
        /// The indicator name.
        indicator: String,
        /// The problem identifier.
        problem: String,
    },

    /// Returned when the ideal and nadir points do not span a proper box.
    #[error("invalid region of interest: {0}")]
    InvalidRegionOfInterest(&'static str),

    /// Returned when an observer option cannot be parsed.
    #[error("invalid observer option '{key}': {reason}")]
    InvalidOption {
        /// The offending option key.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Returned when the decision vector has the wrong length.
    #[error("dimension mismatch: expected {expected} variables, got {got}")]
    DimensionMismatch {
        /// The problem dimension.
        expected: usize,
        /// The length of the supplied vector.
        got: usize,
    },

    /// Returned when the inner problem returns the wrong number of objectives.
    #[error("objective dimension mismatch: expected {expected} values, got {got}")]
    ObjectiveDimensionMismatch {
        /// The expected number of objective values.
        expected: usize,
        /// The actual number of objective values returned.
        got: usize,
    },

    /// Returned when an objective value is NaN or infinite.
    #[error("objective {objective} is not finite ({value}) at evaluation {evaluation}")]
    NonFiniteObjective {
        /// Index of the objective.
        objective: usize,
        /// The offending value.
        value: f64,
        /// The evaluation counter at which it was produced.
        evaluation: u64,
    },

    /// Returned when an objective value improves on the ideal point.
    #[error(
        "objective {objective} = {value} improves on the ideal value {ideal} at evaluation {evaluation}"
    )]
    BeyondIdeal {
        /// Index of the objective.
        objective: usize,
        /// The offending value.
        value: f64,
        /// The ideal value it claims to beat.
        ideal: f64,
        /// The evaluation counter at which it was produced.
        evaluation: u64,
    },

    /// Returned when an output file cannot be created or written.
    #[error("failed to write '{}': {source}", path.display())]
    Io {
        /// The destination path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Returned when an internal invariant is violated.
    #[error("internal error: {0}")]
    Internal(&'static str),
}

pub type Result<T> = core::result::Result<T, Error>;

impl Error {
    /// Adapter for `map_err` that attaches `path` to an I/O error.
    pub(crate) fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
