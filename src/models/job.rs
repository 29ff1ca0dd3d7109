//! Job model: a DAG of operations plus live readiness state.
//!
//! A job owns its operations and a derived successor map (the inverse of
//! each operation's predecessor list, built incrementally as operations are
//! added). The list of currently available operations is maintained
//! incrementally: completing an operation updates each successor's
//! outstanding-predecessor set and appends newly unblocked successors.
//!
//! # Graph metrics
//!
//! The dispatching policies consume a family of DAG metrics. The purely
//! structural ones (downstream critical path, blocked time, upstream
//! successor counts) do not depend on construction progress, so they are
//! memoized into per-job tables rebuilt on [`Job::restart`]. The dynamic
//! passes (earliest finish/start, latest finish) depend on completion state
//! or on the schedule and use a per-call memo map instead; either way no
//! metric is ever recomputed exponentially over diamond-shaped graphs.
//!
//! `avg_time_blocked` and `upstream_successor_count` intentionally count
//! shared descendants once per path, and `earliest_finish` ignores station
//! capacity entirely; callers rely on these exact (approximate) semantics.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 2.2
//! (precedence constraints), Ch. 3 (forward/backward passes)

use std::collections::{BTreeMap, HashMap};

use crate::error::EngineError;
use crate::models::operation::{Operation, OperationId};
use crate::models::schedule::Schedule;

/// Identifies a job within a problem instance.
pub type JobId = usize;

/// A job: an acyclic graph of operations belonging to one production order.
#[derive(Debug, Clone)]
pub struct Job {
    id: JobId,
    operations: BTreeMap<OperationId, Operation>,
    successors: BTreeMap<OperationId, Vec<OperationId>>,
    available: Vec<OperationId>,
    // Structural metric tables, rebuilt by `restart`.
    critical_path_table: HashMap<OperationId, i64>,
    blocked_table: HashMap<OperationId, f64>,
    upstream_table: HashMap<OperationId, i64>,
}

impl Job {
    /// Creates an empty job.
    pub fn new(id: JobId) -> Self {
        Self {
            id,
            operations: BTreeMap::new(),
            successors: BTreeMap::new(),
            available: Vec::new(),
            critical_path_table: HashMap::new(),
            blocked_table: HashMap::new(),
            upstream_table: HashMap::new(),
        }
    }

    /// Adds an operation (builder form).
    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.add_operation(operation);
        self
    }

    /// Registers an operation under its identity and extends the successor
    /// map: each declared predecessor gains this operation as a successor.
    pub fn add_operation(&mut self, operation: Operation) {
        self.successors.entry(operation.id()).or_default();
        for &predecessor in operation.predecessors() {
            self.successors
                .entry(predecessor)
                .or_default()
                .push(operation.id());
        }
        self.operations.insert(operation.id(), operation);
    }

    /// Job identity.
    #[inline]
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Looks up an operation.
    pub fn operation(&self, operation: OperationId) -> Result<&Operation, EngineError> {
        self.operations
            .get(&operation)
            .ok_or(EngineError::UnknownOperation {
                job: self.id,
                operation,
            })
    }

    /// All operations, in ascending identity order.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values()
    }

    /// Number of operations.
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    /// Direct successors of an operation (empty for sinks and unknown ids).
    pub fn successors(&self, operation: OperationId) -> &[OperationId] {
        self.successors
            .get(&operation)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Identities of operations whose predecessors are all complete and
    /// which have not been placed yet, in unlock order.
    #[inline]
    pub fn available_operations(&self) -> &[OperationId] {
        &self.available
    }

    /// Whether every operation has been placed.
    ///
    /// Meaningful only after [`Job::restart`]; a job that was never
    /// restarted has an empty available list and reports done.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.available.is_empty()
    }

    /// Resets every operation to its initial state, rebuilds the available
    /// list from scratch and recomputes the structural metric tables.
    ///
    /// Must be called before any construction run.
    pub fn restart(&mut self) {
        self.available.clear();
        for (&id, operation) in &mut self.operations {
            operation.restart();
            if operation.is_available() {
                self.available.push(id);
            }
        }
        self.rebuild_metric_tables();
    }

    /// Marks an operation complete at `end_time` and unlocks successors.
    ///
    /// Fails without mutating anything if the operation is not currently in
    /// the available list; this is what prevents double-scheduling. The sole
    /// state-mutation entry point of the precedence graph.
    pub(crate) fn complete_operation(
        &mut self,
        operation: OperationId,
        end_time: i64,
    ) -> Result<(), EngineError> {
        let position = self
            .available
            .iter()
            .position(|&id| id == operation)
            .ok_or(EngineError::OperationNotAvailable {
                job: self.id,
                operation,
            })?;
        self.available.remove(position);
        if let Some(op) = self.operations.get_mut(&operation) {
            op.mark_done();
        }
        let successors = self.successors(operation).to_vec();
        for successor in successors {
            if let Some(succ) = self.operations.get_mut(&successor) {
                succ.predecessor_done(operation, end_time);
                if succ.is_available() {
                    self.available.push(successor);
                }
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------- work

    /// Sum of average durations over not-done operations.
    pub fn remaining_average_duration(&self) -> f64 {
        self.operations
            .values()
            .filter(|op| !op.is_done())
            .map(|op| op.average_duration())
            .sum()
    }

    /// Count of not-done operations.
    pub fn remaining_operation_count(&self) -> usize {
        self.operations.values().filter(|op| !op.is_done()).count()
    }

    // --------------------------------------------- structural DAG metrics

    /// Longest downstream path from `operation` to a sink, each operation
    /// weighted by its shortest eligible duration (own duration included).
    ///
    /// Unknown identities score 0.
    pub fn critical_path(&self, operation: OperationId) -> i64 {
        match self.critical_path_table.get(&operation) {
            Some(&value) => value,
            None => {
                Self::critical_path_walk(&self.operations, &self.successors, operation, &mut HashMap::new())
            }
        }
    }

    /// Sum over all downstream paths of the average durations of the
    /// operations this one blocks. Shared descendants count once per path.
    pub fn avg_time_blocked(&self, operation: OperationId) -> f64 {
        match self.blocked_table.get(&operation) {
            Some(&value) => value,
            None => Self::blocked_walk(&self.operations, &self.successors, operation, &mut HashMap::new()),
        }
    }

    /// Number of downstream operations, counted once per path through the
    /// successor graph.
    pub fn upstream_successor_count(&self, operation: OperationId) -> i64 {
        match self.upstream_table.get(&operation) {
            Some(&value) => value,
            None => Self::upstream_walk(&self.successors, operation, &mut HashMap::new()),
        }
    }

    fn rebuild_metric_tables(&mut self) {
        let ids: Vec<OperationId> = self.operations.keys().copied().collect();

        let mut critical = HashMap::new();
        let mut blocked = HashMap::new();
        let mut upstream = HashMap::new();
        for &id in &ids {
            Self::critical_path_walk(&self.operations, &self.successors, id, &mut critical);
            Self::blocked_walk(&self.operations, &self.successors, id, &mut blocked);
            Self::upstream_walk(&self.successors, id, &mut upstream);
        }
        self.critical_path_table = critical;
        self.blocked_table = blocked;
        self.upstream_table = upstream;
    }

    fn critical_path_walk(
        operations: &BTreeMap<OperationId, Operation>,
        successors: &BTreeMap<OperationId, Vec<OperationId>>,
        operation: OperationId,
        memo: &mut HashMap<OperationId, i64>,
    ) -> i64 {
        if let Some(&value) = memo.get(&operation) {
            return value;
        }
        let mut downstream = 0;
        if let Some(next) = successors.get(&operation) {
            for &successor in next {
                downstream =
                    downstream.max(Self::critical_path_walk(operations, successors, successor, memo));
            }
        }
        let own = operations
            .get(&operation)
            .map(|op| op.shortest_duration())
            .unwrap_or(0);
        let value = downstream + own;
        memo.insert(operation, value);
        value
    }

    fn blocked_walk(
        operations: &BTreeMap<OperationId, Operation>,
        successors: &BTreeMap<OperationId, Vec<OperationId>>,
        operation: OperationId,
        memo: &mut HashMap<OperationId, f64>,
    ) -> f64 {
        if let Some(&value) = memo.get(&operation) {
            return value;
        }
        let mut value = 0.0;
        if let Some(next) = successors.get(&operation) {
            for &successor in next {
                let average = operations
                    .get(&successor)
                    .map(|op| op.average_duration())
                    .unwrap_or(0.0);
                value += average + Self::blocked_walk(operations, successors, successor, memo);
            }
        }
        memo.insert(operation, value);
        value
    }

    fn upstream_walk(
        successors: &BTreeMap<OperationId, Vec<OperationId>>,
        operation: OperationId,
        memo: &mut HashMap<OperationId, i64>,
    ) -> i64 {
        if let Some(&value) = memo.get(&operation) {
            return value;
        }
        let mut value = 0;
        if let Some(next) = successors.get(&operation) {
            for &successor in next {
                value += Self::upstream_walk(successors, successor, memo) + 1;
            }
        }
        memo.insert(operation, value);
        value
    }

    // ------------------------------------------------- dynamic DAG passes

    /// Earliest finish of an operation ignoring station contention.
    ///
    /// Done operations and sources finish at their last-predecessor time
    /// plus their shortest duration; everything else at the latest
    /// predecessor finish plus its shortest duration. This deliberately
    /// ignores station capacity and can undershoot the real finish time.
    pub fn earliest_finish(&self, operation: OperationId) -> Result<i64, EngineError> {
        self.earliest_finish_walk(operation, &mut HashMap::new())
    }

    fn earliest_finish_walk(
        &self,
        operation: OperationId,
        memo: &mut HashMap<OperationId, i64>,
    ) -> Result<i64, EngineError> {
        if let Some(&value) = memo.get(&operation) {
            return Ok(value);
        }
        let op = self.operation(operation)?;
        let value = if op.is_done() || op.predecessors().is_empty() {
            op.last_predecessor_time() + op.shortest_duration()
        } else {
            let mut latest = i64::MIN;
            for &predecessor in op.predecessors() {
                latest = latest.max(self.earliest_finish_walk(predecessor, memo)?);
            }
            latest + op.shortest_duration()
        };
        memo.insert(operation, value);
        Ok(value)
    }

    /// Largest earliest finish over the job's sink operations, i.e. a
    /// contention-free approximation of the job's completion time
    /// (-1 for a job with no operations).
    pub fn relaxed_critical_path(&self) -> Result<i64, EngineError> {
        let mut memo = HashMap::new();
        let mut latest = -1;
        for &id in self.operations.keys() {
            if self.successors(id).is_empty() {
                latest = latest.max(self.earliest_finish_walk(id, &mut memo)?);
            }
        }
        Ok(latest)
    }

    /// Backward-pass latest finish: the schedule's current makespan for a
    /// sink, otherwise the minimum over successors of their latest finish
    /// minus their shortest duration.
    pub fn latest_finish(
        &self,
        operation: OperationId,
        schedule: &Schedule,
    ) -> Result<i64, EngineError> {
        self.latest_finish_walk(operation, schedule, &mut HashMap::new())
    }

    fn latest_finish_walk(
        &self,
        operation: OperationId,
        schedule: &Schedule,
        memo: &mut HashMap<OperationId, i64>,
    ) -> Result<i64, EngineError> {
        if let Some(&value) = memo.get(&operation) {
            return Ok(value);
        }
        let next = self.successors(operation);
        let value = if next.is_empty() {
            schedule.makespan()
        } else {
            let next = next.to_vec();
            let mut earliest = i64::MAX;
            for successor in next {
                let shortest = self.operation(successor)?.shortest_duration();
                let latest_start = self.latest_finish_walk(successor, schedule, memo)? - shortest;
                earliest = earliest.min(latest_start);
            }
            earliest
        };
        memo.insert(operation, value);
        Ok(value)
    }

    /// Forward-pass earliest start respecting station availability.
    ///
    /// Maximum of the operation's last-predecessor time and each not-done
    /// predecessor's recursively derived earliest finish, clamped against
    /// the availability of the first eligible station carrying the
    /// operation's shortest duration. A well-formed operation always has
    /// such a station; its absence is reported as a hard error.
    pub fn earliest_start(
        &self,
        operation: OperationId,
        schedule: &Schedule,
    ) -> Result<i64, EngineError> {
        self.earliest_start_walk(operation, schedule, &mut HashMap::new())
    }

    fn earliest_start_walk(
        &self,
        operation: OperationId,
        schedule: &Schedule,
        memo: &mut HashMap<OperationId, i64>,
    ) -> Result<i64, EngineError> {
        if let Some(&value) = memo.get(&operation) {
            return Ok(value);
        }
        let op = self.operation(operation)?;
        let mut latest = op.last_predecessor_time();
        for &predecessor in op.predecessors() {
            let pred = self.operation(predecessor)?;
            if pred.is_done() {
                continue;
            }
            let finish =
                self.earliest_start_walk(predecessor, schedule, memo)? + pred.shortest_duration();
            latest = latest.max(finish);
        }
        let shortest = op.shortest_duration();
        for alternative in op.alternatives() {
            if alternative.duration == shortest {
                let value = schedule.station_available_at(alternative.station)?.max(latest);
                memo.insert(operation, value);
                return Ok(value);
            }
        }
        Err(EngineError::NoShortestStation {
            job: self.id,
            operation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Diamond: 0 → {1, 2} → 3, with shortest durations 2, 3, 5, 1.
    fn diamond() -> Job {
        let mut job = Job::new(7)
            .with_operation(Operation::new(0).with_alternative(0, 2).with_alternative(1, 4))
            .with_operation(
                Operation::new(1)
                    .with_alternative(0, 3)
                    .with_predecessor(0),
            )
            .with_operation(
                Operation::new(2)
                    .with_alternative(1, 5)
                    .with_predecessor(0),
            )
            .with_operation(
                Operation::new(3)
                    .with_alternative(0, 1)
                    .with_predecessor(1)
                    .with_predecessor(2),
            );
        job.restart();
        job
    }

    #[test]
    fn test_successor_map() {
        let job = diamond();
        assert_eq!(job.successors(0), &[1, 2]);
        assert_eq!(job.successors(1), &[3]);
        assert_eq!(job.successors(3), &[] as &[OperationId]);
    }

    #[test]
    fn test_restart_rebuilds_availability() {
        let job = diamond();
        assert_eq!(job.available_operations(), &[0]);
        assert!(!job.is_done());
    }

    #[test]
    fn test_complete_operation_unlocks_successors() {
        let mut job = diamond();
        job.complete_operation(0, 10).unwrap();
        assert_eq!(job.available_operations(), &[1, 2]);
        assert_eq!(job.operation(1).unwrap().last_predecessor_time(), 10);

        job.complete_operation(2, 20).unwrap();
        job.complete_operation(1, 15).unwrap();
        // Op 3 unlocks with the larger predecessor end time.
        assert_eq!(job.available_operations(), &[3]);
        assert_eq!(job.operation(3).unwrap().last_predecessor_time(), 20);

        job.complete_operation(3, 21).unwrap();
        assert!(job.is_done());
    }

    #[test]
    fn test_complete_unavailable_fails_without_mutation() {
        let mut job = diamond();
        let err = job.complete_operation(3, 5).unwrap_err();
        assert_eq!(
            err,
            EngineError::OperationNotAvailable {
                job: 7,
                operation: 3
            }
        );
        assert_eq!(job.available_operations(), &[0]);
        assert!(!job.operation(3).unwrap().is_done());

        // Completing twice fails the second time.
        job.complete_operation(0, 2).unwrap();
        let err = job.complete_operation(0, 2).unwrap_err();
        assert!(matches!(err, EngineError::OperationNotAvailable { .. }));
    }

    #[test]
    fn test_remaining_work() {
        let mut job = diamond();
        // Averages: op0 = 3, op1 = 3, op2 = 5, op3 = 1.
        assert!((job.remaining_average_duration() - 12.0).abs() < 1e-10);
        assert_eq!(job.remaining_operation_count(), 4);

        job.complete_operation(0, 2).unwrap();
        assert!((job.remaining_average_duration() - 9.0).abs() < 1e-10);
        assert_eq!(job.remaining_operation_count(), 3);
    }

    #[test]
    fn test_critical_path() {
        let job = diamond();
        assert_eq!(job.critical_path(3), 1);
        assert_eq!(job.critical_path(1), 4);
        assert_eq!(job.critical_path(2), 6);
        assert_eq!(job.critical_path(0), 8);
    }

    #[test]
    fn test_upstream_count_uses_path_multiplicity() {
        let job = diamond();
        assert_eq!(job.upstream_successor_count(3), 0);
        assert_eq!(job.upstream_successor_count(1), 1);
        // The sink is reachable via both branches and counts twice.
        assert_eq!(job.upstream_successor_count(0), 4);
    }

    #[test]
    fn test_avg_time_blocked() {
        let job = diamond();
        assert!((job.avg_time_blocked(3) - 0.0).abs() < 1e-10);
        assert!((job.avg_time_blocked(1) - 1.0).abs() < 1e-10);
        // avg(1) + blocked(1) + avg(2) + blocked(2) = 3 + 1 + 5 + 1 = 10.
        assert!((job.avg_time_blocked(0) - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_earliest_finish_ignores_stations() {
        let job = diamond();
        assert_eq!(job.earliest_finish(0).unwrap(), 2);
        assert_eq!(job.earliest_finish(1).unwrap(), 5);
        assert_eq!(job.earliest_finish(2).unwrap(), 7);
        // max(5, 7) + 1, even though ops 1 and 2 share no station order.
        assert_eq!(job.earliest_finish(3).unwrap(), 8);
        assert_eq!(job.relaxed_critical_path().unwrap(), 8);
    }

    #[test]
    fn test_latest_finish_backward_pass() {
        let job = diamond();
        let schedule = Schedule::new(2);
        // Empty schedule: makespan 0. LF(3) = 0, LF(1) = LF(2) = 0 - 1 = -1,
        // LF(0) = min(-1 - 3, -1 - 5) = -6.
        assert_eq!(job.latest_finish(3, &schedule).unwrap(), 0);
        assert_eq!(job.latest_finish(1, &schedule).unwrap(), -1);
        assert_eq!(job.latest_finish(2, &schedule).unwrap(), -1);
        assert_eq!(job.latest_finish(0, &schedule).unwrap(), -6);
    }

    #[test]
    fn test_earliest_start_clamps_to_station() {
        let job = diamond();
        let schedule = Schedule::new(2);
        assert_eq!(job.earliest_start(0, &schedule).unwrap(), 0);
        // ES(3) = max over not-done predecessors of ES + shortest:
        // ES(1) + 3 = 3, ES(2) + 5 = 5 → 5 on an idle station.
        assert_eq!(job.earliest_start(3, &schedule).unwrap(), 5);
    }

    #[test]
    fn test_unknown_operation() {
        let job = diamond();
        assert!(matches!(
            job.operation(99),
            Err(EngineError::UnknownOperation { job: 7, operation: 99 })
        ));
        assert_eq!(job.critical_path(99), 0);
    }
}
