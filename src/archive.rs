//! The non-dominated archive.
//!
//! [`Archive`] keeps every evaluated point that no other evaluated point
//! dominates. The points live in an [`OrderedSet`] sorted by the second
//! objective, so along the front the first objective strictly decreases.
//! A second set, ordered by time stamp, holds [`Handle`]s to the points
//! inserted since the last flush; it never owns a point.
//!
//! For each tracked indicator every point stores its contribution to the
//! running indicator value. In two dimensions the hypervolume share of a
//! point depends only on its left neighbour, so an insertion recomputes the
//! new point and its right neighbour and nothing else.

use core::cmp::Ordering;

use crate::indicator::Indicator;
use crate::ordered_set::{Handle, OrderedSet};
use crate::pareto::{Dominance, RegionOfInterest, dominance};

/// One evaluated, currently non-dominated solution.
#[derive(Clone, Debug, PartialEq)]
pub struct ArchiveNode {
    x: Vec<f64>,
    y: [f64; 2],
    time_stamp: u64,
    contributions: Vec<f64>,
    within_roi: bool,
}

impl ArchiveNode {
    /// Copies `x` and `y` into a new node.
    #[must_use]
    pub fn new(x: &[f64], y: [f64; 2], time_stamp: u64, number_of_indicators: usize) -> Self {
        Self {
            x: x.to_vec(),
            y,
            time_stamp,
            contributions: vec![0.0; number_of_indicators],
            within_roi: false,
        }
    }

    /// The decision vector.
    #[must_use]
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// The objective vector.
    #[must_use]
    pub fn y(&self) -> [f64; 2] {
        self.y
    }

    /// The evaluation number at which the point was produced.
    #[must_use]
    pub fn time_stamp(&self) -> u64 {
        self.time_stamp
    }

    /// Contribution to indicator `k` (in the order the indicators were
    /// configured).
    #[must_use]
    pub fn contribution(&self, k: usize) -> f64 {
        self.contributions[k]
    }

    /// Whether the point lies inside the region of interest.
    ///
    /// Only maintained while at least one indicator is tracked.
    #[must_use]
    pub fn within_roi(&self) -> bool {
        self.within_roi
    }
}

#[derive(Clone, Copy, Debug)]
struct PendingEntry {
    time_stamp: u64,
    node: Handle,
}

type FrontOrder = fn(&ArchiveNode, &ArchiveNode) -> Ordering;
type TimeOrder = fn(&PendingEntry, &PendingEntry) -> Ordering;

fn by_last_objective(a: &ArchiveNode, b: &ArchiveNode) -> Ordering {
    a.y[1].total_cmp(&b.y[1])
}

fn by_time_stamp(a: &PendingEntry, b: &PendingEntry) -> Ordering {
    a.time_stamp.cmp(&b.time_stamp)
}

/// Result of offering a point to the archive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub enum UpdateOutcome {
    /// The point is dominated by or equal to an archived point.
    Rejected,
    /// The point was archived after evicting `evicted` dominated points.
    Inserted {
        /// Number of archived points the new point dominated.
        evicted: usize,
    },
}

impl UpdateOutcome {
    /// Returns `true` if the archive changed.
    #[must_use]
    pub fn changed(self) -> bool {
        matches!(self, UpdateOutcome::Inserted { .. })
    }
}

/// Non-dominated archive with a pending-output buffer.
pub struct Archive {
    front: OrderedSet<ArchiveNode, FrontOrder>,
    pending: OrderedSet<PendingEntry, TimeOrder>,
    number_of_indicators: usize,
}

impl Archive {
    /// Creates an empty archive whose nodes carry `number_of_indicators`
    /// contributions.
    #[must_use]
    pub fn new(number_of_indicators: usize) -> Self {
        Self {
            front: OrderedSet::new(by_last_objective as FrontOrder),
            pending: OrderedSet::new(by_time_stamp as TimeOrder),
            number_of_indicators,
        }
    }

    /// Number of archived points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.front.len()
    }

    /// Returns `true` if nothing has been archived.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.front.is_empty()
    }

    /// Number of contributions carried by each node.
    #[must_use]
    pub fn number_of_indicators(&self) -> usize {
        self.number_of_indicators
    }

    /// Iterates over the front by increasing second objective.
    pub fn iter(&self) -> impl Iterator<Item = &ArchiveNode> + '_ {
        self.front.iter()
    }

    /// Iterates over the points not yet flushed, by increasing time stamp.
    pub fn pending(&self) -> impl Iterator<Item = &ArchiveNode> + '_ {
        self.pending
            .iter()
            .filter_map(|entry| self.front.get(entry.node))
    }

    /// Number of points not yet flushed.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Forgets the pending points. The points stay archived.
    pub fn purge_pending(&mut self) {
        self.pending.purge();
    }

    /// The whole front ordered by time stamp.
    #[must_use]
    pub fn by_time_stamp(&self) -> Vec<&ArchiveNode> {
        let mut nodes: Vec<&ArchiveNode> = self.front.iter().collect();
        nodes.sort_unstable_by_key(|node| node.time_stamp);
        nodes
    }

    /// Smallest distance of an archived point to `roi`, `None` if empty.
    #[must_use]
    pub fn min_distance_to(&self, roi: &RegionOfInterest) -> Option<f64> {
        self.front
            .iter()
            .map(|node| roi.distance(&node.y))
            .reduce(f64::min)
    }

    /// Offers `node` to the archive.
    ///
    /// A point dominated by or equal to an archived one is dropped. Otherwise
    /// every archived point it dominates is evicted (its contributions are
    /// first subtracted from `indicators`), the point is archived and queued
    /// for output, and the contributions of the point and of its right
    /// neighbour are recomputed.
    pub fn update(
        &mut self,
        node: ArchiveNode,
        indicators: &mut [Indicator],
        roi: &RegionOfInterest,
    ) -> UpdateOutcome {
        debug_assert_eq!(node.contributions.len(), self.number_of_indicators);
        debug_assert_eq!(indicators.len(), self.number_of_indicators);

        let right = self.front.search_right(&node);

        // Only the left neighbour can dominate the new point through a
        // strictly smaller second objective.
        let left = match right {
            Some(r) => self.front.prev(r),
            None => self.front.last(),
        };
        if let Some(l) = left.and_then(|l| self.front.get(l)) {
            if l.y[0] <= node.y[0] {
                return UpdateOutcome::Rejected;
            }
        }

        if let Some(r) = right.and_then(|r| self.front.get(r)) {
            if matches!(
                dominance(&node.y, &r.y),
                Dominance::DominatedBy | Dominance::Equal
            ) {
                return UpdateOutcome::Rejected;
            }
        }

        let mut evicted = 0;
        let mut cursor = right;
        while let Some(h) = cursor {
            let Some(candidate) = self.front.get(h) else {
                break;
            };
            if dominance(&node.y, &candidate.y) != Dominance::Dominates {
                break;
            }
            cursor = self.front.next(h);
            self.evict(h, indicators);
            evicted += 1;
        }

        let time_stamp = node.time_stamp;
        let handle = self.front.insert(node);
        self.pending.insert(PendingEntry {
            time_stamp,
            node: handle,
        });

        if !indicators.is_empty() {
            self.recompute_contributions(handle, indicators, roi);
        }

        UpdateOutcome::Inserted { evicted }
    }

    /// Removes a dominated point: indicators first, then the pending
    /// reference, then the point itself.
    fn evict(&mut self, handle: Handle, indicators: &mut [Indicator]) {
        let Some(node) = self.front.get(handle) else {
            return;
        };
        for (indicator, contribution) in indicators.iter_mut().zip(&node.contributions) {
            indicator.current_value -= contribution;
        }
        let time_stamp = node.time_stamp;

        if let Some(entry) = self
            .pending
            .find_by(|entry| entry.time_stamp.cmp(&time_stamp))
        {
            self.pending.remove(entry);
        }
        self.front.remove(handle);
    }

    fn recompute_contributions(
        &mut self,
        handle: Handle,
        indicators: &mut [Indicator],
        roi: &RegionOfInterest,
    ) {
        let Some(node) = self.front.get_mut(handle) else {
            return;
        };
        node.within_roi = roi.contains(&node.y);
        if !node.within_roi {
            node.contributions.fill(0.0);
            return;
        }
        let y = node.y;

        if let Some(succ) = self
            .front
            .next(handle)
            .and_then(|s| self.front.get_mut(s))
        {
            if succ.within_roi {
                for (k, indicator) in indicators.iter_mut().enumerate() {
                    indicator.current_value -= succ.contributions[k];
                    succ.contributions[k] = indicator.kind().contribution(y[0], &succ.y, roi);
                    indicator.current_value += succ.contributions[k];
                }
            }
        }

        // Without an in-ROI left neighbour the strip reaches the nadir.
        let left_y0 = self
            .front
            .prev(handle)
            .and_then(|p| self.front.get(p))
            .filter(|p| p.within_roi)
            .map_or(roi.nadir()[0], |p| p.y[0]);

        if let Some(node) = self.front.get_mut(handle) {
            for (k, indicator) in indicators.iter_mut().enumerate() {
                node.contributions[k] = indicator.kind().contribution(left_y0, &node.y, roi);
                indicator.current_value += node.contributions[k];
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn assert_valid(&self) {
        self.front.assert_valid();
        self.pending.assert_valid();

        let nodes: Vec<&ArchiveNode> = self.front.iter().collect();
        for (i, a) in nodes.iter().enumerate() {
            for b in &nodes[i + 1..] {
                assert_eq!(
                    dominance(&a.y, &b.y),
                    Dominance::Incomparable,
                    "{:?} and {:?} are comparable",
                    a.y,
                    b.y
                );
            }
        }
        for pair in nodes.windows(2) {
            assert!(pair[0].y[1] < pair[1].y[1]);
            assert!(pair[0].y[0] > pair[1].y[0]);
        }
        for entry in &self.pending {
            let node = self.front.get(entry.node).expect("pending entry must be archived");
            assert_eq!(node.time_stamp, entry.time_stamp);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::IndicatorKind;

    fn roi() -> RegionOfInterest {
        RegionOfInterest::new([0.0, 0.0], [10.0, 10.0]).unwrap()
    }

    struct Fixture {
        archive: Archive,
        indicators: Vec<Indicator>,
        roi: RegionOfInterest,
        clock: u64,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                archive: Archive::new(1),
                indicators: vec![Indicator::new(IndicatorKind::Hypervolume, 1.0)],
                roi: roi(),
                clock: 0,
            }
        }

        fn feed(&mut self, y: [f64; 2]) -> UpdateOutcome {
            self.clock += 1;
            let node = ArchiveNode::new(&[self.clock as f64], y, self.clock, 1);
            let outcome = self.archive.update(node, &mut self.indicators, &self.roi);
            self.archive.assert_valid();
            outcome
        }

        fn front(&self) -> Vec<[f64; 2]> {
            self.archive.iter().map(ArchiveNode::y).collect()
        }

        fn current(&self) -> f64 {
            self.indicators[0].current_value()
        }

        fn contribution_sum(&self) -> f64 {
            self.archive.iter().map(|n| n.contribution(0)).sum()
        }
    }

    #[test]
    fn test_incomparable_points_both_kept() {
        let mut f = Fixture::new();
        assert!(f.feed([1.0, 5.0]).changed());
        assert!(f.feed([2.0, 4.0]).changed());
        assert_eq!(f.front(), vec![[2.0, 4.0], [1.0, 5.0]]);
    }

    #[test]
    fn test_dominating_point_replaces_member() {
        let mut f = Fixture::new();
        let _ = f.feed([1.0, 5.0]);
        assert_eq!(f.feed([0.5, 4.0]), UpdateOutcome::Inserted { evicted: 1 });
        assert_eq!(f.front(), vec![[0.5, 4.0]]);
        // (10 - 0.5) / 10 * (10 - 4) / 10
        assert!((f.current() - 0.57).abs() < 1e-12);
    }

    #[test]
    fn test_eviction_subtracts_before_adding() {
        let mut f = Fixture::new();
        let _ = f.feed([3.0, 3.0]);
        assert!((f.current() - 0.49).abs() < 1e-12);
        let _ = f.feed([1.0, 1.0]);
        assert_eq!(f.front(), vec![[1.0, 1.0]]);
        assert!((f.current() - 0.81).abs() < 1e-12);
        assert!((f.current() - f.archive.iter().next().unwrap().contribution(0)).abs() < 1e-12);
    }

    #[test]
    fn test_single_point_boundary_contribution() {
        let mut f = Fixture::new();
        let _ = f.feed([5.0, 5.0]);
        let node = f.archive.iter().next().unwrap();
        assert!(node.within_roi());
        assert!((node.contribution(0) - 0.25).abs() < 1e-12);
        assert!((f.current() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_dominated_and_equal_points_rejected() {
        let mut f = Fixture::new();
        let _ = f.feed([2.0, 2.0]);
        assert_eq!(f.feed([2.0, 2.0]), UpdateOutcome::Rejected);
        assert_eq!(f.feed([3.0, 3.0]), UpdateOutcome::Rejected);
        // Same second objective, worse first objective.
        assert_eq!(f.feed([2.5, 2.0]), UpdateOutcome::Rejected);
        // Dominated through the left neighbour only.
        assert_eq!(f.feed([2.0, 9.0]), UpdateOutcome::Rejected);
        assert_eq!(f.front(), vec![[2.0, 2.0]]);
        assert_eq!(f.archive.pending_len(), 1);
    }

    #[test]
    fn test_left_extreme_dominated_by_tail() {
        let mut f = Fixture::new();
        let _ = f.feed([1.0, 1.0]);
        assert_eq!(f.feed([2.0, 2.0]), UpdateOutcome::Rejected);
        assert!(f.feed([0.5, 2.0]).changed());
        assert_eq!(f.front(), vec![[1.0, 1.0], [0.5, 2.0]]);
    }

    #[test]
    fn test_chain_eviction() {
        let mut f = Fixture::new();
        for y in [[9.0, 1.0], [7.0, 3.0], [5.0, 5.0], [3.0, 7.0], [1.0, 9.0]] {
            let _ = f.feed(y);
        }
        assert_eq!(f.archive.len(), 5);
        // Dominates (7,3), (5,5) and (3,7) but not the extremes.
        assert_eq!(f.feed([2.0, 2.5]), UpdateOutcome::Inserted { evicted: 3 });
        assert_eq!(f.front(), vec![[9.0, 1.0], [2.0, 2.5], [1.0, 9.0]]);
        assert!((f.current() - f.contribution_sum()).abs() < 1e-12);
    }

    #[test]
    fn test_neighbour_contribution_recomputed() {
        let mut f = Fixture::new();
        let _ = f.feed([2.0, 6.0]);
        // Boundary: (10 - 2) * (10 - 6) / 100
        assert!((f.current() - 0.32).abs() < 1e-12);
        let _ = f.feed([4.0, 3.0]);
        // (4, 3) owns (10 - 4) * (10 - 3) = 42, (2, 6) now (4 - 2) * (10 - 6) = 8.
        assert!((f.current() - 0.50).abs() < 1e-12);
        let contributions: Vec<f64> = f.archive.iter().map(|n| n.contribution(0)).collect();
        assert!((contributions[0] - 0.42).abs() < 1e-12);
        assert!((contributions[1] - 0.08).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_roi_point_contributes_nothing() {
        let mut f = Fixture::new();
        let _ = f.feed([12.0, 1.0]);
        let node = f.archive.iter().next().unwrap();
        assert!(!node.within_roi());
        assert!(f.current().abs() < f64::EPSILON);

        // In-ROI point to the right uses the nadir, not the out-of-ROI neighbour.
        let _ = f.feed([5.0, 5.0]);
        assert!((f.current() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_pending_follows_evictions_and_purge() {
        let mut f = Fixture::new();
        let _ = f.feed([5.0, 1.0]);
        let _ = f.feed([1.0, 5.0]);
        f.archive.purge_pending();
        assert_eq!(f.archive.pending_len(), 0);
        assert_eq!(f.archive.len(), 2);

        let _ = f.feed([3.0, 3.0]);
        let _ = f.feed([0.5, 4.0]); // evicts (1, 5), which was already flushed
        let _ = f.feed([2.0, 2.0]); // evicts (3, 3), which is still pending
        let pending: Vec<u64> = f.archive.pending().map(ArchiveNode::time_stamp).collect();
        assert_eq!(pending, vec![4, 5]);
        assert_eq!(f.archive.len(), 3);
    }

    #[test]
    fn test_by_time_stamp_reorders_front() {
        let mut f = Fixture::new();
        let _ = f.feed([1.0, 9.0]);
        let _ = f.feed([9.0, 1.0]);
        let _ = f.feed([5.0, 5.0]);
        let stamps: Vec<u64> = f.archive.iter().map(ArchiveNode::time_stamp).collect();
        assert_eq!(stamps, vec![2, 3, 1]);
        let ordered: Vec<u64> = f.archive.by_time_stamp().iter().map(|n| n.time_stamp()).collect();
        assert_eq!(ordered, vec![1, 2, 3]);
    }

    #[test]
    fn test_without_indicators_roi_is_not_tracked() {
        let mut archive = Archive::new(0);
        let outcome = archive.update(ArchiveNode::new(&[], [1.0, 1.0], 1, 0), &mut [], &roi());
        assert!(outcome.changed());
        assert!(!archive.iter().next().unwrap().within_roi());
    }

    #[test]
    fn test_random_stream_keeps_invariants() {
        let mut rng = fastrand::Rng::with_seed(2024);
        let mut f = Fixture::new();
        let mut seen: Vec<[f64; 2]> = Vec::new();
        let mut previous_overall = f64::INFINITY;

        for _ in 0..2000 {
            let y = [rng.f64() * 12.0, rng.f64() * 12.0];
            seen.push(y);
            let changed = f.feed(y).changed();

            assert!((f.current() - f.contribution_sum()).abs() < 1e-9);
            if changed {
                let indicator = &mut f.indicators[0];
                indicator.refresh(&f.archive, &f.roi);
                assert!(indicator.overall_value() <= previous_overall + 1e-12);
                previous_overall = indicator.overall_value();
            }
        }

        // The archive is exactly the non-dominated subset of everything seen.
        let mut expected: Vec<[f64; 2]> = seen
            .iter()
            .filter(|a| !seen.iter().any(|b| crate::pareto::dominates(b, *a)))
            .copied()
            .collect();
        expected.sort_by(|a, b| a[1].total_cmp(&b[1]));
        expected.dedup();
        assert_eq!(f.front(), expected);

        let nadir = f.roi.nadir();
        let exact = crate::pareto::hypervolume(&expected, nadir) / (f.roi.width(0) * f.roi.width(1));
        assert!((f.current() - exact).abs() < 1e-9);
    }
}
