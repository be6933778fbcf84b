//! Configuration and construction of loggers.
//!
//! An [`Observer`] holds the settings of one benchmarking experiment (output
//! folder, algorithm description, [`ObserverOptions`]) and wraps each
//! problem of the experiment in a [`BiobjLogger`].
//!
//! ```no_run
//! use biobj_logger::prelude::*;
//!
//! let mut observer = Observer::builder("exdata/rs").algorithm_name("RS").build();
//!
//! let info = ProblemInfo::new("toy_f01_i01_d02", 2, vec![0.0, 0.0], vec![1.0, 1.0])
//!     .with_reference_value(IndicatorKind::Hypervolume, 0.5);
//! let problem = FnProblem::new(info, |x: &[f64]| vec![x[0], 1.0 - x[0]]);
//!
//! let mut logger = observer.observe(problem)?;
//! for i in 0..100 {
//!     logger.evaluate(&[f64::from(i) / 100.0, 0.0])?;
//! }
//! logger.finish()?;
//! # Ok::<(), biobj_logger::Error>(())
//! ```

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::indicator::Indicator;
use crate::logger::BiobjLogger;
use crate::pareto::RegionOfInterest;
use crate::problem::{Problem, ProblemInfo};

mod builder;
mod options;

pub use builder::ObserverBuilder;
pub use options::{LogNondominated, LogVariables, ObserverOptions};

/// Factory of [`BiobjLogger`]s sharing one output folder.
#[derive(Debug)]
pub struct Observer {
    output_folder: PathBuf,
    algorithm_name: String,
    algorithm_info: String,
    options: ObserverOptions,
    previous_group: Option<(usize, usize)>,
}

impl Observer {
    /// Create an observer with default options.
    #[must_use]
    pub fn new(output_folder: impl Into<PathBuf>) -> Self {
        Self::builder(output_folder).build()
    }

    /// Return a builder for configuring an observer.
    #[must_use]
    pub fn builder(output_folder: impl Into<PathBuf>) -> ObserverBuilder {
        ObserverBuilder::new(output_folder.into())
    }

    /// Root of all output files.
    #[must_use]
    pub fn output_folder(&self) -> &Path {
        &self.output_folder
    }

    /// Algorithm name written to the summary files.
    #[must_use]
    pub fn algorithm_name(&self) -> &str {
        &self.algorithm_name
    }

    /// Free-form algorithm description.
    #[must_use]
    pub fn algorithm_info(&self) -> &str {
        &self.algorithm_info
    }

    /// The logging options.
    #[must_use]
    pub fn options(&self) -> &ObserverOptions {
        &self.options
    }

    /// Wraps `problem` in a logger.
    ///
    /// The problem is validated before any file is created. A summary group
    /// line is started whenever the `(function, dimension)` pair differs
    /// from the previously observed problem.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedObjectives`] unless the problem has exactly two
    ///   objectives.
    /// - [`Error::InvalidRegionOfInterest`] if its ideal and nadir points do
    ///   not span a proper box.
    /// - [`Error::MissingReferenceValue`] if a tracked indicator has no best
    ///   known value.
    /// - [`Error::Io`] if an output file cannot be opened or written.
    pub fn observe<P: Problem>(&mut self, problem: P) -> Result<BiobjLogger<P>> {
        let info = problem.info();
        let (roi, indicators) = self.validate(info)?;
        let group = (info.function, info.dimension);
        let new_group = self.previous_group != Some(group);

        let logger = BiobjLogger::open(problem, self, roi, indicators, new_group)?;
        if !self.options.indicators.is_empty() {
            self.previous_group = Some(group);
        }
        Ok(logger)
    }

    fn validate(&self, info: &ProblemInfo) -> Result<(RegionOfInterest, Vec<Indicator>)> {
        if info.number_of_objectives != 2 {
            return Err(Error::UnsupportedObjectives {
                got: info.number_of_objectives,
            });
        }
        let roi = RegionOfInterest::from_slices(&info.ideal, &info.nadir)?;
        let indicators = self
            .options
            .indicators
            .iter()
            .map(|&kind| {
                info.reference_value(kind)
                    .map(|best| Indicator::new(kind, best))
                    .ok_or_else(|| Error::MissingReferenceValue {
                        indicator: kind.to_string(),
                        problem: info.id.clone(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok((roi, indicators))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::IndicatorKind;

    fn info() -> ProblemInfo {
        ProblemInfo::new("t_f01_i01_d02", 2, vec![0.0, 0.0], vec![1.0, 1.0])
            .with_reference_value(IndicatorKind::Hypervolume, 0.9)
    }

    #[test]
    fn test_validate_accepts_biobjective_problem() {
        let observer = Observer::new("unused");
        let (roi, indicators) = observer.validate(&info()).unwrap();
        assert_eq!(roi.nadir(), [1.0, 1.0]);
        assert_eq!(indicators.len(), 1);
        assert!((indicators[0].best_value() - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_validate_rejects_wrong_objective_count() {
        let observer = Observer::new("unused");
        let mut info = info();
        info.number_of_objectives = 3;
        assert!(matches!(
            observer.validate(&info),
            Err(Error::UnsupportedObjectives { got: 3 })
        ));
    }

    #[test]
    fn test_validate_requires_reference_value() {
        let observer = Observer::new("unused");
        let mut info = info();
        info.reference_values.clear();
        assert!(matches!(
            observer.validate(&info),
            Err(Error::MissingReferenceValue { .. })
        ));

        // Not needed when no indicator is tracked.
        let observer = Observer::builder("unused")
            .options(ObserverOptions {
                indicators: Vec::new(),
                ..ObserverOptions::default()
            })
            .build();
        assert!(observer.validate(&info).is_ok());
    }

    #[test]
    fn test_validate_rejects_degenerate_roi() {
        let observer = Observer::new("unused");
        let mut info = info();
        info.nadir = vec![1.0, 0.0];
        assert!(matches!(
            observer.validate(&info),
            Err(Error::InvalidRegionOfInterest(_))
        ));
    }
}
