//! Built-in dispatching policies.
//!
//! # Categories
//!
//! - **Timing**: earliest insert, earliest end, minimal waste
//! - **Workload**: least/most work remaining
//! - **Duration**: shortest/longest processing, longest-processing first
//! - **Structural**: successor counts, alternative counts
//! - **Graph passes**: critical path, slack, blocked time, relaxed
//!   completion estimates
//! - **Baseline**: random dispatch
//!
//! Every selection loop uses strict comparisons over the fixed frontier
//! enumeration order, so the first candidate reaching the best score wins.
//! The sentinel initializations and comparison directions below are part of
//! the policies' observable behavior (they decide tie-breaking) and must not
//! be "simplified".
//!
//! # Reference
//! Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use std::collections::BTreeMap;

use rand::rngs::SmallRng;
use rand::Rng;

use super::{frontier, Decision};
use crate::error::EngineError;
use crate::models::{JobContainer, JobId, OperationId, Schedule, StationId};

/// Earliest feasible start across the whole frontier.
pub(super) fn earliest_insert(
    jobs: &JobContainer,
    schedule: &Schedule,
) -> Result<Decision, EngineError> {
    let mut best = None;
    let mut best_start = i64::MAX;
    for (job_id, op_id) in frontier(jobs) {
        let op = jobs.job(job_id)?.operation(op_id)?;
        for alternative in op.alternatives() {
            let start = schedule.earliest_start_on(alternative.station, op_id, job_id, jobs)?;
            if start < best_start {
                best_start = start;
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

/// Earliest feasible end across the whole frontier.
pub(super) fn earliest_end(
    jobs: &JobContainer,
    schedule: &Schedule,
) -> Result<Decision, EngineError> {
    let mut best = None;
    let mut best_end = i64::MAX;
    for (job_id, op_id) in frontier(jobs) {
        let op = jobs.job(job_id)?.operation(op_id)?;
        for alternative in op.alternatives() {
            let end = schedule.earliest_end_on(alternative.station, op_id, job_id, jobs)?;
            if end < best_end {
                best_end = end;
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

/// Earliest feasible end among one job's available operations.
fn earliest_end_within(
    jobs: &JobContainer,
    schedule: &Schedule,
    job_id: JobId,
) -> Result<Decision, EngineError> {
    let job = jobs.job(job_id)?;
    let mut best = None;
    let mut best_end = i64::MAX;
    for &op_id in job.available_operations() {
        let op = job.operation(op_id)?;
        for alternative in op.alternatives() {
            let end = schedule.earliest_end_on(alternative.station, op_id, job_id, jobs)?;
            if end < best_end {
                best_end = end;
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

/// Earliest feasible end among one operation's alternatives.
fn earliest_end_station(
    jobs: &JobContainer,
    schedule: &Schedule,
    job_id: JobId,
    op_id: OperationId,
) -> Result<Decision, EngineError> {
    let op = jobs.job(job_id)?.operation(op_id)?;
    let mut best = None;
    let mut best_end = i64::MAX;
    for alternative in op.alternatives() {
        let end = schedule.earliest_end_on(alternative.station, op_id, job_id, jobs)?;
        if end < best_end {
            best_end = end;
            best = Some(Decision {
                job: job_id,
                operation: op_id,
                station: alternative.station,
            });
        }
    }
    best.ok_or(EngineError::EmptyFrontier)
}

/// Job with the least positive remaining average work, then earliest end
/// within that job. Jobs with nothing left are skipped.
pub(super) fn least_work_remaining(
    jobs: &JobContainer,
    schedule: &Schedule,
) -> Result<Decision, EngineError> {
    let mut chosen = None;
    let mut least = f64::MAX;
    for job in jobs.jobs() {
        let remaining = job.remaining_average_duration();
        if remaining == 0.0 {
            continue;
        }
        if remaining < least {
            least = remaining;
            chosen = Some(job.id());
        }
    }
    let job_id = chosen.ok_or(EngineError::EmptyFrontier)?;
    earliest_end_within(jobs, schedule, job_id)
}

/// Job with the most remaining average work, then earliest end within it.
pub(super) fn most_work_remaining(
    jobs: &JobContainer,
    schedule: &Schedule,
) -> Result<Decision, EngineError> {
    let job_id = most_work_job(jobs)?;
    earliest_end_within(jobs, schedule, job_id)
}

fn most_work_job(jobs: &JobContainer) -> Result<JobId, EngineError> {
    let mut chosen = None;
    let mut most = -1.0;
    for job in jobs.jobs() {
        let remaining = job.remaining_average_duration();
        if remaining > most {
            most = remaining;
            chosen = Some(job.id());
        }
    }
    chosen.ok_or(EngineError::EmptyFrontier)
}

/// Globally shortest eligible duration.
pub(super) fn shortest_processing(jobs: &JobContainer) -> Result<Decision, EngineError> {
    let mut best = None;
    let mut shortest = i64::MAX;
    for (job_id, op_id) in frontier(jobs) {
        let op = jobs.job(job_id)?.operation(op_id)?;
        for alternative in op.alternatives() {
            if alternative.duration < shortest {
                shortest = alternative.duration;
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

/// Globally longest eligible duration.
pub(super) fn longest_processing(jobs: &JobContainer) -> Result<Decision, EngineError> {
    let mut best = None;
    let mut longest = -1;
    for (job_id, op_id) in frontier(jobs) {
        let op = jobs.job(job_id)?.operation(op_id)?;
        for alternative in op.alternatives() {
            if alternative.duration > longest {
                longest = alternative.duration;
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

/// Operation with the longest average duration, then the station where it
/// can start earliest.
pub(super) fn longest_processing_earliest_insert(
    jobs: &JobContainer,
    schedule: &Schedule,
) -> Result<Decision, EngineError> {
    let mut chosen = None;
    let mut longest = -1.0;
    for (job_id, op_id) in frontier(jobs) {
        let op = jobs.job(job_id)?.operation(op_id)?;
        let average = op.average_duration();
        if average > longest {
            longest = average;
            chosen = Some((job_id, op_id));
        }
    }
    let (job_id, op_id) = chosen.ok_or(EngineError::EmptyFrontier)?;

    let op = jobs.job(job_id)?.operation(op_id)?;
    let mut best = None;
    let mut best_start = i64::MAX;
    for alternative in op.alternatives() {
        let start = schedule.earliest_start_on(alternative.station, op_id, job_id, jobs)?;
        if start < best_start {
            best_start = start;
            best = Some(Decision {
                job: job_id,
                operation: op_id,
                station: alternative.station,
            });
        }
    }
    best.ok_or(EngineError::EmptyFrontier)
}

/// Most direct successors, ties by earliest end.
pub(super) fn most_successors(
    jobs: &JobContainer,
    schedule: &Schedule,
) -> Result<Decision, EngineError> {
    let mut best = None;
    let mut most = -1;
    let mut best_end = i64::MAX;
    for (job_id, op_id) in frontier(jobs) {
        let job = jobs.job(job_id)?;
        let op = job.operation(op_id)?;
        let successors = job.successors(op_id).len() as i64;
        for alternative in op.alternatives() {
            let end = schedule.earliest_end_on(alternative.station, op_id, job_id, jobs)?;
            if successors > most || (successors == most && end < best_end) {
                most = successors;
                best_end = end;
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

/// Largest (successor count − alternative count), ties by earliest end.
pub(super) fn successors_minus_alternatives(
    jobs: &JobContainer,
    schedule: &Schedule,
) -> Result<Decision, EngineError> {
    let mut best = None;
    let mut best_balance = i64::MIN;
    let mut best_end = i64::MAX;
    for (job_id, op_id) in frontier(jobs) {
        let job = jobs.job(job_id)?;
        let op = job.operation(op_id)?;
        let balance = job.successors(op_id).len() as i64 - op.alternatives().len() as i64;
        for alternative in op.alternatives() {
            let end = schedule.earliest_end_on(alternative.station, op_id, job_id, jobs)?;
            if balance > best_balance || (balance == best_balance && end < best_end) {
                best_balance = balance;
                best_end = end;
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

/// Most-work job first, then the successor−alternative rule within it.
pub(super) fn most_work_successors_alternatives(
    jobs: &JobContainer,
    schedule: &Schedule,
) -> Result<Decision, EngineError> {
    let job_id = most_work_job(jobs)?;
    let job = jobs.job(job_id)?;

    let mut best = None;
    let mut best_balance = i64::MIN;
    let mut best_end = i64::MAX;
    for &op_id in job.available_operations() {
        let op = job.operation(op_id)?;
        let balance = job.successors(op_id).len() as i64 - op.alternatives().len() as i64;
        for alternative in op.alternatives() {
            let end = schedule.earliest_end_on(alternative.station, op_id, job_id, jobs)?;
            if balance > best_balance || (balance == best_balance && end < best_end) {
                best_balance = balance;
                best_end = end;
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

/// Smallest gap (start − duration − station availability), ties by earliest
/// start. On idle stations the gap degenerates to the negated duration.
pub(super) fn minimal_waste(
    jobs: &JobContainer,
    schedule: &Schedule,
) -> Result<Decision, EngineError> {
    let mut best = None;
    let mut least_waste = i64::MAX;
    let mut best_start = i64::MAX;
    for (job_id, op_id) in frontier(jobs) {
        let op = jobs.job(job_id)?.operation(op_id)?;
        for alternative in op.alternatives() {
            let start = schedule.earliest_start_on(alternative.station, op_id, job_id, jobs)?;
            let available = schedule.station_available_at(alternative.station)?;
            let waste = start - alternative.duration - available;
            if waste < least_waste || (waste == least_waste && start < best_start) {
                least_waste = waste;
                best_start = start;
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

/// Outstanding demand per station: how many not-done operations list the
/// station among their alternatives.
pub(super) fn demand_by_station(jobs: &JobContainer) -> BTreeMap<StationId, i64> {
    let mut demand = BTreeMap::new();
    for job in jobs.jobs() {
        for op in job.operations() {
            if op.is_done() {
                continue;
            }
            for alternative in op.alternatives() {
                *demand.entry(alternative.station).or_insert(0) += 1;
            }
        }
    }
    demand
}

/// Earliest end penalized by the chosen station's outstanding demand.
pub(super) fn station_demand(
    jobs: &JobContainer,
    schedule: &Schedule,
) -> Result<Decision, EngineError> {
    let demand = demand_by_station(jobs);
    let mut best = None;
    let mut best_score = i64::MAX;
    for (job_id, op_id) in frontier(jobs) {
        let op = jobs.job(job_id)?.operation(op_id)?;
        for alternative in op.alternatives() {
            let end = schedule.earliest_end_on(alternative.station, op_id, job_id, jobs)?;
            let score = end + demand.get(&alternative.station).copied().unwrap_or(0);
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

/// Earliest start minus the average time the operation keeps downstream
/// work blocked.
pub(super) fn time_blocked(
    jobs: &JobContainer,
    schedule: &Schedule,
) -> Result<Decision, EngineError> {
    let mut best = None;
    let mut best_score = f64::MAX;
    for (job_id, op_id) in frontier(jobs) {
        let job = jobs.job(job_id)?;
        let op = job.operation(op_id)?;
        let blocked = job.avg_time_blocked(op_id);
        for alternative in op.alternatives() {
            let start = schedule.earliest_start_on(alternative.station, op_id, job_id, jobs)?;
            let score = start as f64 - blocked;
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

/// Primary rank: negated alternative count, so operations with *more*
/// alternatives sort first. Ties by earliest end minus blocked time.
pub(super) fn most_alternatives_time_blocked(
    jobs: &JobContainer,
    schedule: &Schedule,
) -> Result<Decision, EngineError> {
    let mut best = None;
    let mut best_rank = i64::MAX;
    let mut best_score = f64::MAX;
    for (job_id, op_id) in frontier(jobs) {
        let job = jobs.job(job_id)?;
        let op = job.operation(op_id)?;
        let blocked = job.avg_time_blocked(op_id);
        let rank = -(op.alternatives().len() as i64);
        for alternative in op.alternatives() {
            let end = schedule.earliest_end_on(alternative.station, op_id, job_id, jobs)?;
            let score = end as f64 - blocked;
            if rank < best_rank || (rank == best_rank && score < best_score) {
                best_rank = rank;
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

/// Operation with the longest downstream critical path, then the
/// earliest-end station.
pub(super) fn critical_path_first(
    jobs: &JobContainer,
    schedule: &Schedule,
) -> Result<Decision, EngineError> {
    let mut chosen = None;
    let mut best_score = f64::MAX;
    for job in jobs.jobs() {
        for &op_id in job.available_operations() {
            let score = -(job.critical_path(op_id) as f64);
            if score < best_score {
                best_score = score;
                chosen = Some((job.id(), op_id));
            }
        }
    }
    let (job_id, op_id) = chosen.ok_or(EngineError::EmptyFrontier)?;
    earliest_end_station(jobs, schedule, job_id, op_id)
}

/// Earliest end plus slack (latest finish − earliest start − shortest
/// duration).
pub(super) fn slack_hybrid(
    jobs: &JobContainer,
    schedule: &Schedule,
) -> Result<Decision, EngineError> {
    let mut best = None;
    let mut best_score = i64::MAX;
    for (job_id, op_id) in frontier(jobs) {
        let job = jobs.job(job_id)?;
        let op = job.operation(op_id)?;
        let latest_finish = job.latest_finish(op_id, schedule)?;
        let earliest_start = job.earliest_start(op_id, schedule)?;
        let slack = latest_finish - earliest_start - op.shortest_duration();
        for alternative in op.alternatives() {
            let end = schedule.earliest_end_on(alternative.station, op_id, job_id, jobs)?;
            let score = end + slack;
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

/// Job with the longest contention-free completion estimate, then earliest
/// end within it.
pub(super) fn relaxed_critical_path(
    jobs: &JobContainer,
    schedule: &Schedule,
) -> Result<Decision, EngineError> {
    let mut chosen = None;
    let mut longest = i64::MIN;
    for job in jobs.jobs() {
        if job.is_done() {
            continue;
        }
        let estimate = job.relaxed_critical_path()?;
        if estimate > longest {
            longest = estimate;
            chosen = Some(job.id());
        }
    }
    let job_id = chosen.ok_or(EngineError::EmptyFrontier)?;
    earliest_end_within(jobs, schedule, job_id)
}

/// Fixed-weight combination: start + envelope + 30·alternatives −
/// job remaining work − 30·successors.
pub(super) fn balanced(
    jobs: &JobContainer,
    schedule: &Schedule,
) -> Result<Decision, EngineError> {
    let makespan = schedule.makespan();
    let mut best = None;
    let mut best_score = f64::MAX;
    for (job_id, op_id) in frontier(jobs) {
        let job = jobs.job(job_id)?;
        let op = job.operation(op_id)?;
        let job_remaining = job.remaining_average_duration();
        let alternatives = op.alternatives().len() as f64;
        let successors = job.successors(op_id).len() as f64;
        for alternative in op.alternatives() {
            let end = schedule.earliest_end_on(alternative.station, op_id, job_id, jobs)?;
            let start = end - alternative.duration;
            let envelope = end - makespan;
            let score = (start + envelope) as f64 + alternatives * 30.0
                - job_remaining
                - successors * 30.0;
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

/// Uniformly random frontier operation, then uniformly random station.
pub(super) fn random(jobs: &JobContainer, rng: &mut SmallRng) -> Result<Decision, EngineError> {
    let mut candidates = Vec::new();
    for (job_id, op_id) in frontier(jobs) {
        if !jobs.job(job_id)?.operation(op_id)?.alternatives().is_empty() {
            candidates.push((job_id, op_id));
        }
    }
    if candidates.is_empty() {
        return Err(EngineError::EmptyFrontier);
    }
    let (job_id, op_id) = candidates[rng.random_range(0..candidates.len())];
    let op = jobs.job(job_id)?.operation(op_id)?;
    let alternative = op.alternatives()[rng.random_range(0..op.alternatives().len())];
    Ok(Decision {
        job: job_id,
        operation: op_id,
        station: alternative.station,
    })
}
