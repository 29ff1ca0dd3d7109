//! Externally weighted dispatching policies.
//!
//! These score every (operation, station) pair of the frontier with a
//! linear combination of graph and timing signals; the coefficients come
//! from an external tuner and are applied positionally. Arity is validated
//! by the enum layer before any function here runs.
//!
//! The demand-pressure signals normalize a station's outstanding demand by
//! the total number of not-done operations, then scale by the candidate
//! duration, so stations many remaining operations depend on are penalized
//! proportionally to how long they would be occupied.

use super::policies::demand_by_station;
use super::{frontier, Decision};
use crate::error::EngineError;
use crate::models::{JobContainer, Schedule};

/// Number of not-done operations across all jobs.
pub(super) fn outstanding_operations(jobs: &JobContainer) -> i64 {
    jobs.jobs()
        .map(|job| job.remaining_operation_count() as i64)
        .sum()
}

/// V = envelope + w0·alternatives + w1·remaining operations + w2·successors.
pub(super) fn envelope(
    jobs: &JobContainer,
    schedule: &Schedule,
    weights: &[f64],
) -> Result<Decision, EngineError> {
    let makespan = schedule.makespan();
    let mut best = None;
    let mut best_score = f64::MAX;
    for (job_id, op_id) in frontier(jobs) {
        let job = jobs.job(job_id)?;
        let op = job.operation(op_id)?;
        let alternatives = op.alternatives().len() as f64;
        let remaining = job.remaining_operation_count() as f64;
        let successors = job.successors(op_id).len() as f64;
        for alternative in op.alternatives() {
            let end = schedule.earliest_end_on(alternative.station, op_id, job_id, jobs)?;
            let envelope = (end - makespan) as f64;
            let score = envelope
                + weights[0] * alternatives
                + weights[1] * remaining
                + weights[2] * successors;
            if score < best_score {
                best_score = score;
                best = Some(Decision {
                    job: job_id,
                    operation: op_id,
                    station: alternative.station,
                });
            }
        }
    }
    best.ok_or(EngineError::EmptyFrontier)
}

/// Earliest insert plus weighted deviation from the shortest duration.
pub(super) fn insert_deviation(
    jobs: &JobContainer,
    schedule: &Schedule,
    weights: &[f64],
) -> Result<Decision, EngineError> {
    let mut best = None;
    let mut best_score = f64::MAX;
    for (job_id, op_id) in frontier(jobs) {
        let op = jobs.job(job_id)?.operation(op_id)?;
        let shortest = op.shortest_duration();
        for alternative in op.alternatives() {
            let start = schedule.earliest_start_on(alternative.station, op_id, job_id, jobs)?;
            let score = start as f64 + weights[0] * (alternative.duration - shortest) as f64;
            if score < best_score {
                best_score = score;
                best = Some(Decision {
                    job: job_id,
                    operation: op_id,
                    station: alternative.station,
                });
            }
        }
    }
    best.ok_or(EngineError::EmptyFrontier)
}

/// Earliest end minus weighted downstream critical path.
pub(super) fn critical_path(
    jobs: &JobContainer,
    schedule: &Schedule,
    weights: &[f64],
) -> Result<Decision, EngineError> {
    let mut best = None;
    let mut best_score = f64::MAX;
    for (job_id, op_id) in frontier(jobs) {
        let job = jobs.job(job_id)?;
        let op = job.operation(op_id)?;
        let path = job.critical_path(op_id) as f64;
        for alternative in op.alternatives() {
            let end = schedule.earliest_end_on(alternative.station, op_id, job_id, jobs)?;
            let score = end as f64 - weights[0] * path;
            if score < best_score {
                best_score = score;
                best = Some(Decision {
                    job: job_id,
                    operation: op_id,
                    station: alternative.station,
                });
            }
        }
    }
    best.ok_or(EngineError::EmptyFrontier)
}

/// Insert time with weighted critical path, duration deviation and demand
/// pressure.
pub(super) fn critical_path_demand(
    jobs: &JobContainer,
    schedule: &Schedule,
    weights: &[f64],
) -> Result<Decision, EngineError> {
    let demand = demand_by_station(jobs);
    let outstanding = outstanding_operations(jobs) as f64;
    let mut best = None;
    let mut best_score = f64::MAX;
    for (job_id, op_id) in frontier(jobs) {
        let job = jobs.job(job_id)?;
        let op = job.operation(op_id)?;
        let path = job.critical_path(op_id) as f64;
        let shortest = op.shortest_duration();
        for alternative in op.alternatives() {
            let start = schedule.earliest_start_on(alternative.station, op_id, job_id, jobs)?;
            let pressure = demand.get(&alternative.station).copied().unwrap_or(0) as f64
                / outstanding
                * alternative.duration as f64;
            let score = start as f64
                + weights[0] * path
                + weights[1] * (alternative.duration - shortest) as f64
                + weights[2] * pressure;
            if score < best_score {
                best_score = score;
                best = Some(Decision {
                    job: job_id,
                    operation: op_id,
                    station: alternative.station,
                });
            }
        }
    }
    best.ok_or(EngineError::EmptyFrontier)
}

/// Insert time with weighted blocked time, duration deviation and demand
/// pressure.
pub(super) fn time_blocked_demand(
    jobs: &JobContainer,
    schedule: &Schedule,
    weights: &[f64],
) -> Result<Decision, EngineError> {
    let demand = demand_by_station(jobs);
    let outstanding = outstanding_operations(jobs) as f64;
    let mut best = None;
    let mut best_score = f64::MAX;
    for (job_id, op_id) in frontier(jobs) {
        let job = jobs.job(job_id)?;
        let op = job.operation(op_id)?;
        let blocked = job.avg_time_blocked(op_id);
        let shortest = op.shortest_duration();
        for alternative in op.alternatives() {
            let start = schedule.earliest_start_on(alternative.station, op_id, job_id, jobs)?;
            let pressure = demand.get(&alternative.station).copied().unwrap_or(0) as f64
                / outstanding
                * alternative.duration as f64;
            let score = start as f64
                + weights[0] * blocked
                + weights[1] * (alternative.duration - shortest) as f64
                + weights[2] * pressure;
            if score < best_score {
                best_score = score;
                best = Some(Decision {
                    job: job_id,
                    operation: op_id,
                    station: alternative.station,
                });
            }
        }
    }
    best.ok_or(EngineError::EmptyFrontier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Job, Operation};

    /// One job, one operation, eligible on station 0 (dur 6) and 1 (dur 2).
    fn two_station_instance() -> (JobContainer, Schedule) {
        let mut jobs = JobContainer::new(2).with_job(
            Job::new(0).with_operation(
                Operation::new(0).with_alternative(0, 6).with_alternative(1, 2),
            ),
        );
        jobs.restart();
        (jobs, Schedule::new(2))
    }

    #[test]
    fn test_insert_deviation_weights_flip_station() {
        let (jobs, schedule) = two_station_instance();
        // Zero weight: both stations score 0, first alternative wins.
        let zero = insert_deviation(&jobs, &schedule, &[0.0]).unwrap();
        assert_eq!(zero.station, 0);
        // Positive weight punishes the deviation (6 - 2 = 4) of station 0.
        let penalized = insert_deviation(&jobs, &schedule, &[1.0]).unwrap();
        assert_eq!(penalized.station, 1);
    }

    #[test]
    fn test_critical_path_weight_prefers_deep_operations() {
        let mut jobs = JobContainer::new(2)
            .with_job(
                Job::new(0)
                    .with_operation(Operation::new(0).with_alternative(0, 5))
                    .with_operation(
                        Operation::new(1).with_alternative(0, 50).with_predecessor(0),
                    ),
            )
            .with_job(Job::new(1).with_operation(Operation::new(0).with_alternative(1, 3)));
        jobs.restart();
        let schedule = Schedule::new(2);

        // Unweighted end time would pick job 1 (end 3 vs 5); a strong
        // critical-path weight flips to job 0 (path 55 vs 3).
        let unweighted = critical_path(&jobs, &schedule, &[0.0]).unwrap();
        assert_eq!(unweighted.job, 1);
        let weighted = critical_path(&jobs, &schedule, &[1.0]).unwrap();
        assert_eq!(weighted.job, 0);
    }

    #[test]
    fn test_envelope_scoring() {
        let (jobs, schedule) = two_station_instance();
        // Makespan 0: envelopes equal the end times, 6 vs 2.
        let picked = envelope(&jobs, &schedule, &[0.0, 0.0, 0.0]).unwrap();
        assert_eq!(picked.station, 1);
    }

    #[test]
    fn test_demand_pressure_steers_away_from_contested_station() {
        // Station 0 is listed by both remaining operations, station 1 only
        // by one; equal durations keep the timing signals tied.
        let mut jobs = JobContainer::new(2)
            .with_job(
                Job::new(0).with_operation(
                    Operation::new(0).with_alternative(0, 4).with_alternative(1, 4),
                ),
            )
            .with_job(Job::new(1).with_operation(Operation::new(0).with_alternative(0, 4)));
        jobs.restart();
        let schedule = Schedule::new(2);

        let neutral = critical_path_demand(&jobs, &schedule, &[0.0, 0.0, 0.0]).unwrap();
        assert_eq!(neutral.station, 0);
        let pressured = critical_path_demand(&jobs, &schedule, &[0.0, 0.0, 1.0]).unwrap();
        assert_eq!((pressured.job, pressured.station), (0, 1));
    }

    #[test]
    fn test_time_blocked_demand_runs() {
        let (jobs, schedule) = two_station_instance();
        let picked = time_blocked_demand(&jobs, &schedule, &[-0.5, 1.0, 2.0]).unwrap();
        assert_eq!(picked.job, 0);
    }
}
