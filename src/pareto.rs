//! Pareto dominance and the region of interest.
//!
//! All objectives are minimized. A point **dominates** another if it is no
//! worse in every objective and strictly better in at least one. The
//! archive stores a set of mutually non-dominated points, which is what the
//! three-way [`dominance`] test is built for.
//!
//! The **region of interest** (ROI) is the box spanned by the ideal and the
//! nadir point. Hypervolume contributions are only measured inside it and
//! are normalized by its width in each objective.
//!
//! # Example
//!
//! ```
//! use biobj_logger::pareto::{Dominance, RegionOfInterest, dominance};
//!
//! assert_eq!(dominance(&[1.0, 1.0], &[2.0, 2.0]), Dominance::Dominates);
//! assert_eq!(dominance(&[1.0, 3.0], &[3.0, 1.0]), Dominance::Incomparable);
//! assert_eq!(dominance(&[2.0, 2.0], &[2.0, 2.0]), Dominance::Equal);
//!
//! let roi = RegionOfInterest::new([0.0, 0.0], [10.0, 10.0]).unwrap();
//! assert!(roi.contains(&[5.0, 10.0]));
//! assert!(!roi.contains(&[5.0, 10.5]));
//! assert!((roi.distance(&[13.0, 14.0]) - 0.5).abs() < 1e-12);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Outcome of comparing two objective vectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dominance {
    /// The first vector dominates the second.
    Dominates,
    /// Neither vector dominates the other.
    Incomparable,
    /// The second vector dominates the first.
    DominatedBy,
    /// The vectors are identical.
    Equal,
}

/// Compares `a` against `b` under Pareto dominance (minimization).
#[must_use]
pub fn dominance(a: &[f64], b: &[f64]) -> Dominance {
    debug_assert_eq!(a.len(), b.len());

    let mut a_better = false;
    let mut b_better = false;
    for (&av, &bv) in a.iter().zip(b) {
        if av < bv {
            a_better = true;
        } else if bv < av {
            b_better = true;
        }
    }
    match (a_better, b_better) {
        (true, true) => Dominance::Incomparable,
        (true, false) => Dominance::Dominates,
        (false, true) => Dominance::DominatedBy,
        (false, false) => Dominance::Equal,
    }
}

/// Returns `true` if `a` Pareto-dominates `b`.
#[must_use]
pub fn dominates(a: &[f64], b: &[f64]) -> bool {
    dominance(a, b) == Dominance::Dominates
}

/// Hypervolume of a biobjective point set with respect to `reference`.
///
/// Points that do not strictly dominate the reference point are ignored.
/// The set does not need to be non-dominated; dominated points simply add
/// nothing. Complexity is O(n log n).
#[must_use]
pub fn hypervolume(points: &[[f64; 2]], reference: [f64; 2]) -> f64 {
    let mut sorted: Vec<[f64; 2]> = points
        .iter()
        .filter(|p| p[0] < reference[0] && p[1] < reference[1])
        .copied()
        .collect();
    sorted.sort_by(|a, b| a[1].total_cmp(&b[1]).then(a[0].total_cmp(&b[0])));

    // Sweep by increasing second objective; each point adds the strip
    // between its first objective and the best one seen so far.
    let mut best_y0 = reference[0];
    let mut volume = 0.0;
    for p in sorted {
        if p[0] < best_y0 {
            volume += (best_y0 - p[0]) * (reference[1] - p[1]);
            best_y0 = p[0];
        }
    }
    volume
}

/// The box between the ideal and the nadir point of a biobjective problem.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegionOfInterest {
    ideal: [f64; 2],
    nadir: [f64; 2],
}

impl RegionOfInterest {
    /// Creates the region spanned by `ideal` and `nadir`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegionOfInterest`] if a bound is not finite
    /// or the nadir does not lie strictly above the ideal point in every
    /// objective.
    pub fn new(ideal: [f64; 2], nadir: [f64; 2]) -> Result<Self> {
        if ideal.iter().chain(&nadir).any(|v| !v.is_finite()) {
            return Err(Error::InvalidRegionOfInterest("bounds must be finite"));
        }
        if ideal.iter().zip(&nadir).any(|(i, n)| n <= i) {
            return Err(Error::InvalidRegionOfInterest(
                "nadir must exceed the ideal point in every objective",
            ));
        }
        Ok(Self { ideal, nadir })
    }

    /// Builds the region from the slices a problem reports.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegionOfInterest`] if either slice does not
    /// have two entries or the bounds are rejected by [`new`](Self::new).
    pub fn from_slices(ideal: &[f64], nadir: &[f64]) -> Result<Self> {
        let (Ok(ideal), Ok(nadir)) = (<[f64; 2]>::try_from(ideal), <[f64; 2]>::try_from(nadir))
        else {
            return Err(Error::InvalidRegionOfInterest(
                "ideal and nadir points need exactly two objectives",
            ));
        };
        Self::new(ideal, nadir)
    }

    /// The ideal (best possible) point.
    #[must_use]
    pub fn ideal(&self) -> [f64; 2] {
        self.ideal
    }

    /// The nadir (reference) point.
    #[must_use]
    pub fn nadir(&self) -> [f64; 2] {
        self.nadir
    }

    /// Width of the region along objective `i`.
    #[must_use]
    pub fn width(&self, i: usize) -> f64 {
        self.nadir[i] - self.ideal[i]
    }

    /// Returns `true` if `y` is component-wise no worse than the nadir.
    #[must_use]
    pub fn contains(&self, y: &[f64; 2]) -> bool {
        y.iter().zip(&self.nadir).all(|(v, n)| v <= n)
    }

    /// Normalized Euclidean distance from `y` to the region; zero inside.
    #[must_use]
    pub fn distance(&self, y: &[f64; 2]) -> f64 {
        (0..2)
            .filter(|&i| y[i] > self.nadir[i])
            .map(|i| ((y[i] - self.nadir[i]) / self.width(i)).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dominance_basic() {
        assert_eq!(dominance(&[1.0, 1.0], &[2.0, 2.0]), Dominance::Dominates);
        assert_eq!(dominance(&[2.0, 2.0], &[1.0, 1.0]), Dominance::DominatedBy);
        assert_eq!(dominance(&[1.0, 1.0], &[1.0, 1.0]), Dominance::Equal);
    }

    #[test]
    fn test_dominance_weak_improvement() {
        // Equal in one objective, better in the other still dominates.
        assert_eq!(dominance(&[1.0, 2.0], &[1.0, 3.0]), Dominance::Dominates);
        assert_eq!(dominance(&[1.0, 3.0], &[1.0, 2.0]), Dominance::DominatedBy);
    }

    #[test]
    fn test_dominance_incomparable() {
        assert_eq!(dominance(&[1.0, 3.0], &[3.0, 1.0]), Dominance::Incomparable);
        assert_eq!(dominance(&[3.0, 1.0], &[1.0, 3.0]), Dominance::Incomparable);
        assert!(!dominates(&[1.0, 3.0], &[3.0, 1.0]));
    }

    #[test]
    fn test_hypervolume_2d() {
        // Strips: [1,2) x 1, [2,3) x 2, [3,4) x 3.
        let front = [[1.0, 3.0], [2.0, 2.0], [3.0, 1.0]];
        assert!((hypervolume(&front, [4.0, 4.0]) - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_hypervolume_ignores_dominated_and_outside_points() {
        let points = [[1.0, 1.0], [2.0, 2.0], [5.0, 0.5], [0.5, 4.0]];
        assert!((hypervolume(&points, [3.0, 3.0]) - 4.0).abs() < 1e-10);
        assert!(hypervolume(&[], [1.0, 1.0]).abs() < f64::EPSILON);
        assert!(hypervolume(&[[1.0, 1.0]], [1.0, 2.0]).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roi_rejects_degenerate_box() {
        assert!(RegionOfInterest::new([0.0, 0.0], [0.0, 1.0]).is_err());
        assert!(RegionOfInterest::new([0.0, 0.0], [2.0, -1.0]).is_err());
        assert!(RegionOfInterest::new([0.0, f64::NAN], [1.0, 1.0]).is_err());
        assert!(RegionOfInterest::from_slices(&[0.0], &[1.0, 1.0]).is_err());
    }

    #[test]
    fn test_roi_contains_boundary() {
        let roi = RegionOfInterest::new([0.0, 0.0], [10.0, 10.0]).unwrap();
        assert!(roi.contains(&[10.0, 10.0]));
        assert!(roi.contains(&[-1.0, 3.0]));
        assert!(!roi.contains(&[10.0, 10.000_001]));
    }

    #[test]
    fn test_roi_distance_is_normalized() {
        let roi = RegionOfInterest::new([0.0, 0.0], [10.0, 20.0]).unwrap();
        assert!(roi.distance(&[5.0, 5.0]).abs() < f64::EPSILON);
        // Only the second objective lies outside: (30 - 20) / 20.
        assert!((roi.distance(&[5.0, 30.0]) - 0.5).abs() < 1e-12);
        // Both outside: sqrt(0.3^2 + 0.4^2).
        assert!((roi.distance(&[13.0, 28.0]) - 0.5).abs() < 1e-12);
    }
}
