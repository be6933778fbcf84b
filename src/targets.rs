//! Target thresholds and logging schedules.
//!
//! Two independent mechanisms decide when an indicator row is written:
//!
//! - a [`TargetLadder`] walks down a fixed, strictly descending table of
//!   relative targets and reports every evaluation on which the indicator
//!   value crosses one or more of them;
//! - an [`EvaluationSchedule`] fires on a predefined set of evaluation
//!   numbers, so that progress is visible even while no target is hit.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Relative targets `10^(-k/5)` for `k = 0..=30`, from `1` down to `1e-6`.
pub const RELATIVE_TARGETS: [f64; 31] = [
    1.0,
    6.309_573_444_801_932e-1,
    3.981_071_705_534_972e-1,
    2.511_886_431_509_580e-1,
    1.584_893_192_461_113e-1,
    1e-1,
    6.309_573_444_801_932e-2,
    3.981_071_705_534_972e-2,
    2.511_886_431_509_580e-2,
    1.584_893_192_461_113e-2,
    1e-2,
    6.309_573_444_801_932e-3,
    3.981_071_705_534_972e-3,
    2.511_886_431_509_580e-3,
    1.584_893_192_461_113e-3,
    1e-3,
    6.309_573_444_801_932e-4,
    3.981_071_705_534_972e-4,
    2.511_886_431_509_580e-4,
    1.584_893_192_461_113e-4,
    1e-4,
    6.309_573_444_801_932e-5,
    3.981_071_705_534_972e-5,
    2.511_886_431_509_580e-5,
    1.584_893_192_461_113e-5,
    1e-5,
    6.309_573_444_801_932e-6,
    3.981_071_705_534_972e-6,
    2.511_886_431_509_580e-6,
    1.584_893_192_461_113e-6,
    1e-6,
];

/// Cursor into a descending table of targets.
///
/// The cursor only moves forward and stops one past the last entry, so each
/// threshold is reported at most once.
#[derive(Clone, Debug)]
pub struct TargetLadder {
    table: &'static [f64],
    next: usize,
}

impl TargetLadder {
    /// Creates a ladder over `table`.
    ///
    /// # Panics
    ///
    /// Panics if `table` is empty. Debug builds also check that it is
    /// strictly descending.
    #[must_use]
    pub fn new(table: &'static [f64]) -> Self {
        assert!(!table.is_empty(), "target table must not be empty");
        debug_assert!(
            table.windows(2).all(|w| w[0] > w[1]),
            "target table must be strictly descending"
        );
        Self { table, next: 0 }
    }

    /// Moves past every target that `value` reaches.
    ///
    /// Returns `true` if at least one new target was hit.
    pub fn advance(&mut self, value: f64) -> bool {
        let start = self.next;
        while self.next < self.table.len() && value <= self.table[self.next] {
            self.next += 1;
        }
        self.next > start
    }

    /// Index of the next target still to be hit (equals the table length
    /// once all are hit).
    #[must_use]
    pub fn next_index(&self) -> usize {
        self.next
    }

    /// Returns `true` once every target has been hit.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.next == self.table.len()
    }

    /// The most recently hit target, or the first one if none was hit yet.
    #[must_use]
    pub fn last_hit(&self) -> f64 {
        self.table[self.next.saturating_sub(1)]
    }

    /// The underlying table.
    #[must_use]
    pub fn table(&self) -> &'static [f64] {
        self.table
    }
}

impl Default for TargetLadder {
    fn default() -> Self {
        Self::new(&RELATIVE_TARGETS)
    }
}

/// Settings of the periodic evaluation schedule.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScheduleOptions {
    /// Number of geometrically spaced triggers per decade of evaluations
    /// (`0` disables them).
    pub per_decade: u32,
    /// Multipliers `b` of the dimension-scaled triggers `dimension * b * 10^e`.
    /// Entries outside `1..10` are ignored.
    pub base: Vec<u64>,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            per_decade: 5,
            base: vec![1, 2, 5],
        }
    }
}

/// Decides which evaluation numbers are logged regardless of target hits.
///
/// The first evaluation is always due. Must be consulted once for every
/// evaluation, in order.
#[derive(Clone, Debug)]
pub struct EvaluationSchedule {
    geometric: Option<GeometricTrigger>,
    scaled: Option<ScaledTrigger>,
}

impl EvaluationSchedule {
    /// Creates the schedule for a problem of the given dimension.
    #[must_use]
    pub fn new(dimension: usize, options: &ScheduleOptions) -> Self {
        let geometric = (options.per_decade > 0).then(|| GeometricTrigger::new(options.per_decade));

        let mut base: Vec<u64> = options
            .base
            .iter()
            .copied()
            .filter(|b| (1..10).contains(b))
            .collect();
        base.sort_unstable();
        base.dedup();
        let dimension = u64::try_from(dimension).unwrap_or(u64::MAX).max(1);
        let scaled = (!base.is_empty()).then(|| ScaledTrigger::new(dimension, base));

        Self { geometric, scaled }
    }

    /// Returns `true` if `evaluation` must be logged.
    pub fn is_due(&mut self, evaluation: u64) -> bool {
        let geometric = self
            .geometric
            .as_mut()
            .is_some_and(|t| t.check(evaluation));
        let scaled = self.scaled.as_mut().is_some_and(|t| t.check(evaluation));
        evaluation == 1 || geometric || scaled
    }
}

#[derive(Clone, Debug)]
struct GeometricTrigger {
    per_decade: u32,
    exponent: u32,
    next: u64,
}

impl GeometricTrigger {
    fn new(per_decade: u32) -> Self {
        Self {
            per_decade,
            exponent: 0,
            next: 1,
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn value(&self) -> u64 {
        let v = 10f64
            .powf(f64::from(self.exponent) / f64::from(self.per_decade))
            .floor();
        if v >= 1.8e19 { u64::MAX } else { v as u64 }
    }

    fn check(&mut self, evaluation: u64) -> bool {
        if evaluation < self.next {
            return false;
        }
        while self.next <= evaluation && self.next != u64::MAX {
            self.exponent += 1;
            self.next = self.value();
        }
        true
    }
}

#[derive(Clone, Debug)]
struct ScaledTrigger {
    dimension: u64,
    base: Vec<u64>,
    index: usize,
    decade: u64,
    next: u64,
}

impl ScaledTrigger {
    fn new(dimension: u64, base: Vec<u64>) -> Self {
        let next = dimension.saturating_mul(base[0]);
        Self {
            dimension,
            base,
            index: 0,
            decade: 1,
            next,
        }
    }

    fn check(&mut self, evaluation: u64) -> bool {
        if evaluation < self.next {
            return false;
        }
        while self.next <= evaluation && self.next != u64::MAX {
            self.index += 1;
            if self.index == self.base.len() {
                self.index = 0;
                self.decade = self.decade.saturating_mul(10);
            }
            self.next = self
                .dimension
                .saturating_mul(self.base[self.index])
                .saturating_mul(self.decade);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn due(schedule: &mut EvaluationSchedule, upto: u64) -> Vec<u64> {
        (1..=upto).filter(|&n| schedule.is_due(n)).collect()
    }

    #[test]
    fn test_relative_targets_descend() {
        assert!(RELATIVE_TARGETS.windows(2).all(|w| w[0] > w[1]));
        assert!((RELATIVE_TARGETS[0] - 1.0).abs() < f64::EPSILON);
        assert!((RELATIVE_TARGETS[30] - 1e-6).abs() < 1e-20);
    }

    #[test]
    fn test_ladder_skips_several_targets_at_once() {
        let mut ladder = TargetLadder::default();
        assert!(ladder.advance(0.2));
        // 1, 0.63, 0.398 and 0.251 are all reached by 0.2.
        assert_eq!(ladder.next_index(), 4);
        assert!((ladder.last_hit() - RELATIVE_TARGETS[3]).abs() < f64::EPSILON);
        assert!(!ladder.advance(0.2));
        assert!(!ladder.advance(0.5));
        assert_eq!(ladder.next_index(), 4);
    }

    #[test]
    fn test_ladder_before_first_hit() {
        let mut ladder = TargetLadder::default();
        assert!(!ladder.advance(1.5));
        assert_eq!(ladder.next_index(), 0);
        assert!((ladder.last_hit() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ladder_never_retriggers_last_target() {
        let mut ladder = TargetLadder::default();
        assert!(ladder.advance(0.0));
        assert!(ladder.is_exhausted());
        assert_eq!(ladder.next_index(), RELATIVE_TARGETS.len());
        assert!(!ladder.advance(-1.0));
        assert_eq!(ladder.next_index(), RELATIVE_TARGETS.len());
        assert!((ladder.last_hit() - 1e-6).abs() < 1e-20);
    }

    #[test]
    fn test_geometric_schedule() {
        let options = ScheduleOptions {
            per_decade: 5,
            base: vec![],
        };
        let mut schedule = EvaluationSchedule::new(2, &options);
        // floor(10^(k/5)): 1, 1, 2, 3, 6, 10, 15, 25, 39, 63, 100
        assert_eq!(
            due(&mut schedule, 100),
            vec![1, 2, 3, 6, 10, 15, 25, 39, 63, 100]
        );
    }

    #[test]
    fn test_dimension_scaled_schedule() {
        let options = ScheduleOptions {
            per_decade: 0,
            base: vec![5, 1, 2, 20],
        };
        let mut schedule = EvaluationSchedule::new(3, &options);
        assert_eq!(
            due(&mut schedule, 200),
            vec![1, 3, 6, 15, 30, 60, 150]
        );
    }

    #[test]
    fn test_combined_schedule_is_union() {
        let mut schedule = EvaluationSchedule::new(10, &ScheduleOptions::default());
        let hits = due(&mut schedule, 100);
        for n in [1, 2, 3, 6, 10, 15, 20, 25, 39, 50, 63, 100] {
            assert!(hits.contains(&n), "{n} should be due");
        }
        assert!(!hits.contains(&4));
        assert!(!hits.contains(&99));
    }
}
