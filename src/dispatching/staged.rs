//! Two-axis composable dispatching.
//!
//! The staged policy separates *which operation* to schedule from *which
//! station* to put it on: one rule from [`OperationRule`] picks the
//! operation over the whole frontier, one rule from [`StationRule`] picks
//! the station among that operation's alternatives. The cross-product of
//! the two axes gives a family of policies that an experiment harness can
//! sweep systematically via [`OperationRule::from_index`] and
//! [`StationRule::from_index`].
//!
//! Both axes score with "lower is better" and strict comparisons, so ties
//! break to the first candidate in enumeration order.

use super::policies::demand_by_station;
use super::tuned::outstanding_operations;
use super::Decision;
use crate::error::EngineError;
use crate::models::{JobContainer, Job, JobId, Operation, Schedule};

/// Operation-selection rules for the staged policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationRule {
    /// Prefer jobs with the most remaining average work.
    MostWorkRemaining,
    /// Prefer the longest downstream critical path.
    LongestCriticalPath,
    /// Prefer operations blocking the most downstream work.
    MostTimeBlocked,
    /// Prefer operations with the fewest eligible stations.
    FewestAlternatives,
    /// Critical path scaled down by the number of eligible stations.
    CriticalPathPerAlternative,
    /// Prefer jobs with the most remaining operations.
    MostRemainingOperations,
    /// Prefer jobs with the fewest remaining operations.
    FewestRemainingOperations,
    /// Prefer jobs with the least remaining average work.
    LeastWorkRemaining,
    /// Prefer operations with the most downstream descendants.
    MostUpstreamSuccessors,
    /// Descendant count with a small penalty per eligible station.
    UpstreamSuccessorsAlternatives,
}

impl OperationRule {
    const COUNT: usize = 10;

    /// Resolves a harness-supplied rule index.
    pub fn from_index(index: usize) -> Result<Self, EngineError> {
        match index {
            0 => Ok(Self::MostWorkRemaining),
            1 => Ok(Self::LongestCriticalPath),
            2 => Ok(Self::MostTimeBlocked),
            3 => Ok(Self::FewestAlternatives),
            4 => Ok(Self::CriticalPathPerAlternative),
            5 => Ok(Self::MostRemainingOperations),
            6 => Ok(Self::FewestRemainingOperations),
            7 => Ok(Self::LeastWorkRemaining),
            8 => Ok(Self::MostUpstreamSuccessors),
            9 => Ok(Self::UpstreamSuccessorsAlternatives),
            _ => Err(EngineError::UnknownRule {
                axis: "operation",
                index,
                count: Self::COUNT,
            }),
        }
    }

    /// Priority score of an available operation (lower is better).
    fn score(&self, job: &Job, op: &Operation) -> f64 {
        match self {
            Self::MostWorkRemaining => -job.remaining_average_duration(),
            Self::LongestCriticalPath => -(job.critical_path(op.id()) as f64),
            Self::MostTimeBlocked => -job.avg_time_blocked(op.id()),
            Self::FewestAlternatives => op.alternatives().len() as f64,
            Self::CriticalPathPerAlternative => {
                -(job.critical_path(op.id()) as f64) / op.alternatives().len().max(1) as f64
            }
            Self::MostRemainingOperations => -(job.remaining_operation_count() as f64),
            Self::FewestRemainingOperations => job.remaining_operation_count() as f64,
            Self::LeastWorkRemaining => job.remaining_average_duration(),
            Self::MostUpstreamSuccessors => -(job.upstream_successor_count(op.id()) as f64),
            Self::UpstreamSuccessorsAlternatives => {
                -(job.upstream_successor_count(op.id()) as f64)
                    + 0.1 * op.alternatives().len() as f64
            }
        }
    }
}

/// Station-selection rules for the staged policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationRule {
    /// Earliest feasible end time.
    EarliestEnd,
    /// Negated makespan envelope plus demand pressure.
    DemandEnvelope,
    /// Shortest duration.
    ShortestDuration,
}

impl StationRule {
    const COUNT: usize = 3;

    /// Resolves a harness-supplied rule index.
    pub fn from_index(index: usize) -> Result<Self, EngineError> {
        match index {
            0 => Ok(Self::EarliestEnd),
            1 => Ok(Self::DemandEnvelope),
            2 => Ok(Self::ShortestDuration),
            _ => Err(EngineError::UnknownRule {
                axis: "station",
                index,
                count: Self::COUNT,
            }),
        }
    }
}

/// Runs the staged policy: operation by `operation_rule`, station by
/// `station_rule`.
pub(super) fn staged(
    jobs: &JobContainer,
    schedule: &Schedule,
    operation_rule: OperationRule,
    station_rule: StationRule,
) -> Result<Decision, EngineError> {
    let mut chosen = None;
    let mut best_score = f64::MAX;
    for job in jobs.jobs() {
        for &op_id in job.available_operations() {
            let op = job.operation(op_id)?;
            let score = operation_rule.score(job, op);
            if score < best_score {
                best_score = score;
                chosen = Some((job.id(), op_id));
            }
        }
    }
    let (job_id, op_id) = chosen.ok_or(EngineError::EmptyFrontier)?;
    let op = jobs.job(job_id)?.operation(op_id)?;

    match station_rule {
        StationRule::EarliestEnd => select_station(op, job_id, |station| {
            Ok(schedule.earliest_end_on(station, op_id, job_id, jobs)? as f64)
        }),
        StationRule::DemandEnvelope => {
            let demand = demand_by_station(jobs);
            let outstanding = outstanding_operations(jobs) as f64;
            let makespan = schedule.makespan();
            select_station(op, job_id, |station| {
                let end = schedule.earliest_end_on(station, op_id, job_id, jobs)?;
                let envelope = (makespan - end) as f64;
                let duration = op.duration_on(station).unwrap_or(0) as f64;
                let pressure =
                    demand.get(&station).copied().unwrap_or(0) as f64 / outstanding * duration;
                Ok(-envelope + pressure)
            })
        }
        StationRule::ShortestDuration => {
            select_station(op, job_id, |station| {
                Ok(op.duration_on(station).unwrap_or(0) as f64)
            })
        }
    }
}

fn select_station<F>(op: &Operation, job_id: JobId, mut score: F) -> Result<Decision, EngineError>
where
    F: FnMut(crate::models::StationId) -> Result<f64, EngineError>,
{
    let mut best = None;
    let mut best_score = f64::MAX;
    for alternative in op.alternatives() {
        let value = score(alternative.station)?;
        if value < best_score {
            best_score = value;
            best = Some(Decision {
                job: job_id,
                operation: op.id(),
                station: alternative.station,
            });
        }
    }
    best.ok_or(EngineError::EmptyFrontier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Job, JobContainer, Operation, Schedule};

    /// Job 0: op0 (st0: 4, st1: 8) → op1 (st0: 2).
    /// Job 1: op0 (st1: 3).
    fn fixture() -> (JobContainer, Schedule) {
        let mut jobs = JobContainer::new(2)
            .with_job(
                Job::new(0)
                    .with_operation(
                        Operation::new(0).with_alternative(0, 4).with_alternative(1, 8),
                    )
                    .with_operation(
                        Operation::new(1).with_alternative(0, 2).with_predecessor(0),
                    ),
            )
            .with_job(Job::new(1).with_operation(Operation::new(0).with_alternative(1, 3)));
        jobs.restart();
        (jobs, Schedule::new(2))
    }

    #[test]
    fn test_rule_indices_cover_the_enumerations() {
        for index in 0..10 {
            assert!(OperationRule::from_index(index).is_ok());
        }
        assert!(matches!(
            OperationRule::from_index(10),
            Err(EngineError::UnknownRule {
                axis: "operation",
                index: 10,
                count: 10
            })
        ));
        for index in 0..3 {
            assert!(StationRule::from_index(index).is_ok());
        }
        assert!(StationRule::from_index(3).is_err());
    }

    #[test]
    fn test_most_work_remaining_axis() {
        let (jobs, schedule) = fixture();
        // Job 0 carries work 6 + 2 = 8 vs job 1's 3.
        let picked = staged(
            &jobs,
            &schedule,
            OperationRule::MostWorkRemaining,
            StationRule::EarliestEnd,
        )
        .unwrap();
        assert_eq!((picked.job, picked.operation, picked.station), (0, 0, 0));
    }

    #[test]
    fn test_fewest_alternatives_axis() {
        let (jobs, schedule) = fixture();
        // Job 1's op has one alternative vs two for job 0's op.
        let picked = staged(
            &jobs,
            &schedule,
            OperationRule::FewestAlternatives,
            StationRule::EarliestEnd,
        )
        .unwrap();
        assert_eq!((picked.job, picked.operation), (1, 0));
    }

    #[test]
    fn test_shortest_duration_station_axis() {
        let (jobs, schedule) = fixture();
        let picked = staged(
            &jobs,
            &schedule,
            OperationRule::MostWorkRemaining,
            StationRule::ShortestDuration,
        )
        .unwrap();
        // Duration 4 on station 0 beats 8 on station 1.
        assert_eq!(picked.station, 0);
    }

    #[test]
    fn test_demand_envelope_station_axis() {
        let (jobs, schedule) = fixture();
        // Demand: st0 = 2, st1 = 2; outstanding = 3; makespan = 0.
        // st0: -(0-4) + 2/3*4 = 6.67, st1: -(0-8) + 2/3*8 = 13.3.
        let picked = staged(
            &jobs,
            &schedule,
            OperationRule::MostWorkRemaining,
            StationRule::DemandEnvelope,
        )
        .unwrap();
        assert_eq!(picked.station, 0);
    }

    #[test]
    fn test_upstream_axis_prefers_deep_operations() {
        let (jobs, schedule) = fixture();
        let picked = staged(
            &jobs,
            &schedule,
            OperationRule::MostUpstreamSuccessors,
            StationRule::EarliestEnd,
        )
        .unwrap();
        // Op (0,0) has one descendant, the others none.
        assert_eq!((picked.job, picked.operation), (0, 0));
    }
}
