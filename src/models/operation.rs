//! Operation model.
//!
//! An operation is the smallest schedulable unit of work. It belongs to a
//! job, can run on one or more stations (with a station-specific duration)
//! and may depend on other operations of the same job.
//!
//! # Reference
//! Brandimarte (1993), "Routing and scheduling in a flexible job shop
//! by tabu search"

use std::collections::BTreeSet;

/// Identifies an operation within its job.
pub type OperationId = usize;

/// Identifies a station (machine). Stations are plain indices into the
/// schedule's per-station timelines, in `[0, station_count)`.
pub type StationId = usize;

/// One eligible (station, duration) pair of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alternative {
    /// Station the operation may run on.
    pub station: StationId,
    /// Processing duration on that station.
    pub duration: i64,
}

/// An operation of a job.
///
/// Carries the static problem description (eligible stations, predecessor
/// identities) and the live construction state: the set of predecessors not
/// yet completed, the latest completion time among completed predecessors,
/// and a done flag.
///
/// # Invariants
/// An operation is *available* iff its outstanding-predecessor set is empty,
/// and *done* iff it has been committed to a station. It can never be done
/// before it is available, and once done it is never re-enqueued.
#[derive(Debug, Clone)]
pub struct Operation {
    id: OperationId,
    alternatives: Vec<Alternative>,
    predecessors: Vec<OperationId>,
    outstanding: BTreeSet<OperationId>,
    last_predecessor_time: i64,
    done: bool,
}

impl Operation {
    /// Creates an operation with no alternatives and no predecessors.
    pub fn new(id: OperationId) -> Self {
        Self {
            id,
            alternatives: Vec::new(),
            predecessors: Vec::new(),
            outstanding: BTreeSet::new(),
            last_predecessor_time: 0,
            done: false,
        }
    }

    /// Adds an eligible (station, duration) pair.
    pub fn with_alternative(mut self, station: StationId, duration: i64) -> Self {
        self.alternatives.push(Alternative { station, duration });
        self
    }

    /// Adds a predecessor operation identity (same job).
    pub fn with_predecessor(mut self, predecessor: OperationId) -> Self {
        self.predecessors.push(predecessor);
        self
    }

    /// Adds an eligible (station, duration) pair in place.
    pub fn add_alternative(&mut self, station: StationId, duration: i64) {
        self.alternatives.push(Alternative { station, duration });
    }

    /// Adds a predecessor operation identity in place.
    pub fn add_predecessor(&mut self, predecessor: OperationId) {
        self.predecessors.push(predecessor);
    }

    /// Operation identity within its job.
    #[inline]
    pub fn id(&self) -> OperationId {
        self.id
    }

    /// Eligible (station, duration) pairs, in declaration order.
    #[inline]
    pub fn alternatives(&self) -> &[Alternative] {
        &self.alternatives
    }

    /// Declared predecessor identities.
    #[inline]
    pub fn predecessors(&self) -> &[OperationId] {
        &self.predecessors
    }

    /// Resets the live state back to "nothing completed".
    pub(crate) fn restart(&mut self) {
        self.outstanding = self.predecessors.iter().copied().collect();
        self.last_predecessor_time = 0;
        self.done = false;
    }

    /// Whether all predecessors have completed (and the operation may be
    /// scheduled, if not already done).
    #[inline]
    pub fn is_available(&self) -> bool {
        self.outstanding.is_empty()
    }

    /// Whether the operation has been committed to a station.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.done
    }

    pub(crate) fn mark_done(&mut self) {
        self.done = true;
    }

    /// Records the completion of a predecessor at `end_time`.
    pub(crate) fn predecessor_done(&mut self, predecessor: OperationId, end_time: i64) {
        self.outstanding.remove(&predecessor);
        self.last_predecessor_time = self.last_predecessor_time.max(end_time);
    }

    /// Latest completion time among completed predecessors (0 if none).
    #[inline]
    pub fn last_predecessor_time(&self) -> i64 {
        self.last_predecessor_time
    }

    /// Duration on a specific station, if the operation is eligible there.
    pub fn duration_on(&self, station: StationId) -> Option<i64> {
        self.alternatives
            .iter()
            .find(|a| a.station == station)
            .map(|a| a.duration)
    }

    /// Mean duration across eligible stations (0 if none).
    pub fn average_duration(&self) -> f64 {
        if self.alternatives.is_empty() {
            return 0.0;
        }
        let total: i64 = self.alternatives.iter().map(|a| a.duration).sum();
        total as f64 / self.alternatives.len() as f64
    }

    /// Minimum duration across eligible stations (0 if none).
    pub fn shortest_duration(&self) -> i64 {
        self.alternatives
            .iter()
            .map(|a| a.duration)
            .min()
            .unwrap_or(0)
    }

    /// Maximum duration across eligible stations (0 if none).
    pub fn longest_duration(&self) -> i64 {
        self.alternatives
            .iter()
            .map(|a| a.duration)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_op() -> Operation {
        Operation::new(3)
            .with_alternative(0, 10)
            .with_alternative(2, 4)
            .with_alternative(1, 7)
            .with_predecessor(0)
            .with_predecessor(1)
    }

    #[test]
    fn test_builder() {
        let op = sample_op();
        assert_eq!(op.id(), 3);
        assert_eq!(op.alternatives().len(), 3);
        assert_eq!(op.predecessors(), &[0, 1]);
    }

    #[test]
    fn test_duration_aggregates() {
        let op = sample_op();
        assert_eq!(op.shortest_duration(), 4);
        assert_eq!(op.longest_duration(), 10);
        assert!((op.average_duration() - 7.0).abs() < 1e-10);
        assert_eq!(op.duration_on(1), Some(7));
        assert_eq!(op.duration_on(5), None);
    }

    #[test]
    fn test_availability_lifecycle() {
        let mut op = sample_op();
        op.restart();
        assert!(!op.is_available());
        assert!(!op.is_done());

        op.predecessor_done(0, 12);
        assert!(!op.is_available());
        op.predecessor_done(1, 5);
        assert!(op.is_available());
        assert_eq!(op.last_predecessor_time(), 12);

        op.mark_done();
        assert!(op.is_done());

        op.restart();
        assert!(!op.is_available());
        assert!(!op.is_done());
        assert_eq!(op.last_predecessor_time(), 0);
    }

    #[test]
    fn test_no_predecessors_available_after_restart() {
        let mut op = Operation::new(0).with_alternative(0, 5);
        op.restart();
        assert!(op.is_available());
    }

    #[test]
    fn test_empty_alternatives() {
        let op = Operation::new(0);
        assert_eq!(op.shortest_duration(), 0);
        assert_eq!(op.longest_duration(), 0);
        assert!((op.average_duration() - 0.0).abs() < 1e-10);
    }
}
