//! Station timeline (schedule) model.
//!
//! A schedule holds, per station, the append-only sequence of committed
//! placements. Placements are appended in non-decreasing availability order,
//! so within one station each entry starts at or after the previous entry's
//! end; the station's availability time is simply its last entry's end.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::container::JobContainer;
use crate::models::job::JobId;
use crate::models::operation::{OperationId, StationId};

/// An immutable placement record: one operation committed to one station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledOperation {
    /// Owning job.
    pub job: JobId,
    /// Placed operation.
    pub operation: OperationId,
    /// Station it runs on.
    pub station: StationId,
    /// Start time.
    pub start: i64,
    /// Processing duration on the chosen station.
    pub duration: i64,
}

impl ScheduledOperation {
    /// End time (start + duration).
    #[inline]
    pub fn end(&self) -> i64 {
        self.start + self.duration
    }
}

/// Per-station timelines of committed placements.
#[derive(Debug, Clone)]
pub struct Schedule {
    stations: Vec<Vec<ScheduledOperation>>,
}

impl Schedule {
    /// Creates an empty schedule with a fixed station count.
    pub fn new(station_count: usize) -> Self {
        Self {
            stations: vec![Vec::new(); station_count],
        }
    }

    /// Number of stations.
    #[inline]
    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    /// The placement sequence of one station, in commit (= start) order.
    pub fn station(&self, station: StationId) -> Result<&[ScheduledOperation], EngineError> {
        self.stations
            .get(station)
            .map(Vec::as_slice)
            .ok_or(EngineError::UnknownStation {
                station,
                station_count: self.stations.len(),
            })
    }

    /// All per-station placement sequences, indexed by station.
    pub fn stations(&self) -> &[Vec<ScheduledOperation>] {
        &self.stations
    }

    /// Every placement across all stations.
    pub fn placements(&self) -> impl Iterator<Item = &ScheduledOperation> {
        self.stations.iter().flatten()
    }

    /// Total number of placements.
    pub fn placement_count(&self) -> usize {
        self.stations.iter().map(Vec::len).sum()
    }

    /// Time at which a station becomes free: the end of its last placement,
    /// or 0 for an empty station.
    pub fn station_available_at(&self, station: StationId) -> Result<i64, EngineError> {
        Ok(self.station(station)?.last().map_or(0, |p| p.end()))
    }

    /// Earliest legal start of an operation on a station, ignoring every
    /// other station: max(last predecessor completion, station availability).
    pub fn earliest_start_on(
        &self,
        station: StationId,
        operation: OperationId,
        job: JobId,
        jobs: &JobContainer,
    ) -> Result<i64, EngineError> {
        let available = self.station_available_at(station)?;
        let op = jobs.job(job)?.operation(operation)?;
        Ok(op.last_predecessor_time().max(available))
    }

    /// Earliest legal end of an operation on a station: the earliest start
    /// plus the operation's duration there.
    pub fn earliest_end_on(
        &self,
        station: StationId,
        operation: OperationId,
        job: JobId,
        jobs: &JobContainer,
    ) -> Result<i64, EngineError> {
        let start = self.earliest_start_on(station, operation, job, jobs)?;
        let op = jobs.job(job)?.operation(operation)?;
        let duration = op
            .duration_on(station)
            .ok_or(EngineError::InfeasibleStation {
                job,
                operation,
                station,
            })?;
        Ok(start + duration)
    }

    /// Commits an operation to a station: computes the start time, appends
    /// the placement and records the completion in the job registry
    /// (unlocking successors). The single commit primitive — every policy
    /// routes through it.
    ///
    /// A failed commit leaves both the schedule and the registry untouched.
    pub fn commit(
        &mut self,
        station: StationId,
        operation: OperationId,
        job: JobId,
        jobs: &mut JobContainer,
    ) -> Result<ScheduledOperation, EngineError> {
        let start = self.earliest_start_on(station, operation, job, jobs)?;
        let duration = jobs
            .job(job)?
            .operation(operation)?
            .duration_on(station)
            .ok_or(EngineError::InfeasibleStation {
                job,
                operation,
                station,
            })?;
        let placement = ScheduledOperation {
            job,
            operation,
            station,
            start,
            duration,
        };
        // Availability is checked (and job state mutated) before the
        // placement is appended, keeping failed commits atomic.
        jobs.job_mut(job)?
            .complete_operation(operation, placement.end())?;
        self.stations[station].push(placement);
        Ok(placement)
    }

    /// Completion time of the last-finishing station (0 when empty).
    pub fn makespan(&self) -> i64 {
        self.stations
            .iter()
            .filter_map(|station| station.last())
            .map(ScheduledOperation::end)
            .max()
            .unwrap_or(0)
    }

    /// Empties all station timelines without changing the station count.
    pub fn clear(&mut self) {
        for station in &mut self.stations {
            station.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Job, Operation};

    /// One job, op0 (dur 5 on station 0) → op1 (dur 3 on station 0, 8 on 1).
    fn chain_instance() -> JobContainer {
        let mut jobs = JobContainer::new(2).with_job(
            Job::new(0)
                .with_operation(Operation::new(0).with_alternative(0, 5))
                .with_operation(
                    Operation::new(1)
                        .with_alternative(0, 3)
                        .with_alternative(1, 8)
                        .with_predecessor(0),
                ),
        );
        jobs.restart();
        jobs
    }

    #[test]
    fn test_empty_schedule() {
        let schedule = Schedule::new(3);
        assert_eq!(schedule.station_count(), 3);
        assert_eq!(schedule.makespan(), 0);
        assert_eq!(schedule.placement_count(), 0);
        assert_eq!(schedule.station_available_at(2).unwrap(), 0);
    }

    #[test]
    fn test_unknown_station() {
        let schedule = Schedule::new(2);
        assert!(matches!(
            schedule.station_available_at(2),
            Err(EngineError::UnknownStation {
                station: 2,
                station_count: 2
            })
        ));
    }

    #[test]
    fn test_commit_chain() {
        let mut jobs = chain_instance();
        let mut schedule = Schedule::new(2);

        let first = schedule.commit(0, 0, 0, &mut jobs).unwrap();
        assert_eq!(first.start, 0);
        assert_eq!(first.end(), 5);
        assert_eq!(schedule.station_available_at(0).unwrap(), 5);

        // Successor inherits the predecessor end time even on an idle station.
        assert_eq!(schedule.earliest_start_on(1, 1, 0, &jobs).unwrap(), 5);
        assert_eq!(schedule.earliest_end_on(0, 1, 0, &jobs).unwrap(), 8);

        let second = schedule.commit(0, 1, 0, &mut jobs).unwrap();
        assert_eq!(second.start, 5);
        assert_eq!(schedule.makespan(), 8);
        assert!(jobs.is_done());
    }

    #[test]
    fn test_commit_unavailable_is_atomic() {
        let mut jobs = chain_instance();
        let mut schedule = Schedule::new(2);

        // Op 1 is blocked by op 0.
        let err = schedule.commit(0, 1, 0, &mut jobs).unwrap_err();
        assert!(matches!(err, EngineError::OperationNotAvailable { .. }));
        assert_eq!(schedule.placement_count(), 0);
        assert_eq!(jobs.job(0).unwrap().available_operations(), &[0]);
    }

    #[test]
    fn test_commit_infeasible_station() {
        let mut jobs = chain_instance();
        let mut schedule = Schedule::new(2);

        // Op 0 has no duration on station 1.
        let err = schedule.commit(1, 0, 0, &mut jobs).unwrap_err();
        assert!(matches!(err, EngineError::InfeasibleStation { .. }));
        assert_eq!(schedule.placement_count(), 0);
        assert!(!jobs.job(0).unwrap().operation(0).unwrap().is_done());
    }

    #[test]
    fn test_station_sequences_do_not_overlap() {
        let mut jobs = JobContainer::new(1);
        jobs.add_job(Job::new(0).with_operation(Operation::new(0).with_alternative(0, 4)));
        jobs.add_job(Job::new(1).with_operation(Operation::new(0).with_alternative(0, 4)));
        jobs.restart();

        let mut schedule = Schedule::new(1);
        schedule.commit(0, 0, 0, &mut jobs).unwrap();
        schedule.commit(0, 0, 1, &mut jobs).unwrap();

        let timeline = schedule.station(0).unwrap();
        assert_eq!(timeline.len(), 2);
        assert!(timeline[1].start >= timeline[0].end());
        assert_eq!(schedule.makespan(), 8);
    }

    #[test]
    fn test_clear_keeps_station_count() {
        let mut jobs = chain_instance();
        let mut schedule = Schedule::new(2);
        schedule.commit(0, 0, 0, &mut jobs).unwrap();
        schedule.clear();
        assert_eq!(schedule.station_count(), 2);
        assert_eq!(schedule.makespan(), 0);
        assert_eq!(schedule.placement_count(), 0);
    }

    #[test]
    fn test_placement_serialization() {
        let placement = ScheduledOperation {
            job: 1,
            operation: 2,
            station: 0,
            start: 10,
            duration: 5,
        };
        let json = serde_json::to_string(&placement).unwrap();
        let back: ScheduledOperation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, placement);
        assert_eq!(back.end(), 15);
    }
}
