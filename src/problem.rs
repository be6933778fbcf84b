//! The [`Problem`] trait is what the logger observes.
//!
//! A problem maps a decision vector to an objective vector and describes
//! itself through a [`ProblemInfo`]: identifiers used for file names, the
//! ideal and nadir points bounding the region of interest, and the best
//! known indicator values.
//!
//! Wrappers own their inner problem and forward calls to it, so
//! observation composes with any other decorator:
//!
//! ```
//! use biobj_logger::problem::{FnProblem, Problem, ProblemInfo};
//!
//! let info = ProblemInfo::new("toy_f01_i01_d02", 2, vec![0.0, 0.0], vec![1.0, 1.0]);
//! let mut problem = FnProblem::new(info, |x: &[f64]| vec![x[0], 1.0 - x[0]]);
//!
//! assert_eq!(problem.evaluate(&[0.25, 0.0]).unwrap(), vec![0.25, 0.75]);
//! assert_eq!(problem.info().dimension, 2);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::indicator::IndicatorKind;

/// Static description of a benchmark problem instance.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProblemInfo {
    /// Stable textual identifier, e.g. `bbob-biobj_f01_i01_d02`.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Suite name, used as the output sub-folder.
    pub suite: String,
    /// Function number within the suite.
    pub function: usize,
    /// Instance number.
    pub instance: usize,
    /// Index of the problem within the suite.
    pub index: usize,
    /// Number of decision variables.
    pub dimension: usize,
    /// Number of objectives.
    pub number_of_objectives: usize,
    /// Best possible value per objective.
    pub ideal: Vec<f64>,
    /// Worst value of interest per objective.
    pub nadir: Vec<f64>,
    /// Best known indicator values.
    pub reference_values: Vec<(IndicatorKind, f64)>,
}

impl ProblemInfo {
    /// Describes a problem by id, dimension and objective-space bounds.
    ///
    /// The display name defaults to the id, the suite to `biobj`, and the
    /// number of objectives to the length of `ideal`.
    #[must_use]
    pub fn new(id: impl Into<String>, dimension: usize, ideal: Vec<f64>, nadir: Vec<f64>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            suite: "biobj".to_string(),
            function: 0,
            instance: 0,
            index: 0,
            dimension,
            number_of_objectives: ideal.len(),
            ideal,
            nadir,
            reference_values: Vec::new(),
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the suite name.
    #[must_use]
    pub fn with_suite(mut self, suite: impl Into<String>) -> Self {
        self.suite = suite.into();
        self
    }

    /// Set the function, instance and index numbers.
    #[must_use]
    pub fn with_numbers(mut self, function: usize, instance: usize, index: usize) -> Self {
        self.function = function;
        self.instance = instance;
        self.index = index;
        self
    }

    /// Set the best known value of `indicator`.
    #[must_use]
    pub fn with_reference_value(mut self, indicator: IndicatorKind, value: f64) -> Self {
        self.reference_values.retain(|(kind, _)| *kind != indicator);
        self.reference_values.push((indicator, value));
        self
    }

    /// Best known value of `indicator`, if any.
    #[must_use]
    pub fn reference_value(&self, indicator: IndicatorKind) -> Option<f64> {
        self.reference_values
            .iter()
            .find(|(kind, _)| *kind == indicator)
            .map(|&(_, value)| value)
    }
}

/// A black-box problem: decision vector in, objective vector out.
pub trait Problem {
    /// Describes the problem.
    fn info(&self) -> &ProblemInfo;

    /// Evaluates the problem at `x`.
    ///
    /// # Errors
    ///
    /// Implementations may fail; wrappers such as
    /// [`BiobjLogger`](crate::logger::BiobjLogger) also fail when their own
    /// bookkeeping does.
    fn evaluate(&mut self, x: &[f64]) -> Result<Vec<f64>>;
}

impl<P: Problem + ?Sized> Problem for Box<P> {
    fn info(&self) -> &ProblemInfo {
        (**self).info()
    }

    fn evaluate(&mut self, x: &[f64]) -> Result<Vec<f64>> {
        (**self).evaluate(x)
    }
}

/// A problem backed by a closure.
pub struct FnProblem<F> {
    info: ProblemInfo,
    f: F,
}

impl<F> FnProblem<F>
where
    F: FnMut(&[f64]) -> Vec<f64>,
{
    /// Wraps `f` with the given description.
    pub fn new(info: ProblemInfo, f: F) -> Self {
        Self { info, f }
    }
}

impl<F> Problem for FnProblem<F>
where
    F: FnMut(&[f64]) -> Vec<f64>,
{
    fn info(&self) -> &ProblemInfo {
        &self.info
    }

    fn evaluate(&mut self, x: &[f64]) -> Result<Vec<f64>> {
        Ok((self.f)(x))
    }
}
