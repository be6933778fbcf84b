//! Performance indicators tracked over the archive.
//!
//! Only the hypervolume indicator (`hyp`) is implemented. Its value is kept
//! as a running sum of per-point contributions maintained by the
//! [`Archive`](crate::archive::Archive); the reported quantity is the
//! difference to the best known hypervolume of the problem, plus a penalty
//! while no archived point lies inside the region of interest.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::archive::Archive;
use crate::error::{Error, Result};
use crate::pareto::RegionOfInterest;
use crate::targets::TargetLadder;

/// The indicators the engine knows how to compute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub enum IndicatorKind {
    /// Normalized hypervolume of the archive inside the region of interest.
    Hypervolume,
}

impl IndicatorKind {
    /// Short name used in file names and headers.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            IndicatorKind::Hypervolume => "hyp",
        }
    }

    /// Share of the indicator owned by the point `y`.
    ///
    /// `left_y0` is the first objective of the point's lower neighbour on
    /// the front (smaller second objective), or the nadir's first objective
    /// when there is no usable neighbour.
    #[must_use]
    pub fn contribution(self, left_y0: f64, y: &[f64; 2], roi: &RegionOfInterest) -> f64 {
        match self {
            IndicatorKind::Hypervolume => {
                let nadir = roi.nadir();
                (left_y0 - y[0]) / roi.width(0) * (nadir[1] - y[1]) / roi.width(1)
            }
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IndicatorKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hyp" => Ok(IndicatorKind::Hypervolume),
            other => Err(Error::UnknownIndicator(other.to_string())),
        }
    }
}

impl TryFrom<String> for IndicatorKind {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<IndicatorKind> for String {
    fn from(kind: IndicatorKind) -> Self {
        kind.name().to_string()
    }
}

/// Running state of one tracked indicator.
#[derive(Clone, Debug)]
pub struct Indicator {
    kind: IndicatorKind,
    best_value: f64,
    pub(crate) current_value: f64,
    additional_penalty: f64,
    overall_value: f64,
    ladder: TargetLadder,
    target_hit: bool,
}

impl Indicator {
    /// Creates the indicator with the problem's best known value.
    #[must_use]
    pub fn new(kind: IndicatorKind, best_value: f64) -> Self {
        Self::with_ladder(kind, best_value, TargetLadder::default())
    }

    /// Creates the indicator with a custom target ladder.
    #[must_use]
    pub fn with_ladder(kind: IndicatorKind, best_value: f64, ladder: TargetLadder) -> Self {
        Self {
            kind,
            best_value,
            current_value: 0.0,
            additional_penalty: 0.0,
            overall_value: best_value,
            ladder,
            target_hit: false,
        }
    }

    /// Which indicator this is.
    #[must_use]
    pub fn kind(&self) -> IndicatorKind {
        self.kind
    }

    /// Best known value of the indicator on the problem.
    #[must_use]
    pub fn best_value(&self) -> f64 {
        self.best_value
    }

    /// Sum of the contributions of all archived points.
    #[must_use]
    pub fn current_value(&self) -> f64 {
        self.current_value
    }

    /// Distance of the archive to the region of interest while it
    /// contributes nothing, zero otherwise.
    #[must_use]
    pub fn additional_penalty(&self) -> f64 {
        self.additional_penalty
    }

    /// `best - current + penalty`, the value tested against the targets.
    #[must_use]
    pub fn overall_value(&self) -> f64 {
        self.overall_value
    }

    /// Whether the latest evaluation hit a new target.
    #[must_use]
    pub fn target_hit(&self) -> bool {
        self.target_hit
    }

    /// The target ladder.
    #[must_use]
    pub fn ladder(&self) -> &TargetLadder {
        &self.ladder
    }

    /// Clears the per-evaluation hit flag.
    pub(crate) fn begin_evaluation(&mut self) {
        self.target_hit = false;
    }

    /// Recomputes the overall value after an archive change and advances
    /// the target ladder.
    ///
    /// Returns `true` if a new target was hit.
    pub fn refresh(&mut self, archive: &Archive, roi: &RegionOfInterest) -> bool {
        self.additional_penalty = if self.current_value == 0.0 {
            archive.min_distance_to(roi).unwrap_or(0.0)
        } else {
            0.0
        };
        debug_assert!(self.additional_penalty >= 0.0);

        self.overall_value = self.best_value - self.current_value + self.additional_penalty;
        self.target_hit = self.ladder.advance(self.overall_value);
        self.target_hit
    }
}
