//! Constructive dispatching policies.
//!
//! A policy maps the current construction state — read-only job registry,
//! read-only schedule — to a single [`Decision`]: which operation of which
//! job to commit to which station next. Policies never mutate state; the
//! construction driver performs the commit.
//!
//! All decisions are drawn from the *frontier*: the (job, operation) pairs
//! whose operation is currently available, expanded over each operation's
//! eligible (station, duration) alternatives. Enumeration order is fixed
//! (ascending job identity, then the job's unlock order, then alternative
//! declaration order) and every score comparison is strict, so ties always
//! break to the first-encountered candidate and each policy is fully
//! deterministic — apart from [`DispatchPolicy::Random`], which carries its
//! own seeded generator.
//!
//! The policy set is closed: one enum, one [`DispatchPolicy::decide`] entry
//! point. Externally tuned policies carry their weight vector as a value;
//! the vector length is validated against the scoring formula's arity when
//! the policy is built and again before any scoring.
//!
//! # Usage
//!
//! ```
//! use flexshop::dispatching::DispatchPolicy;
//! use flexshop::models::{Job, JobContainer, Operation, Schedule};
//!
//! let mut jobs = JobContainer::new(1)
//!     .with_job(Job::new(0).with_operation(Operation::new(0).with_alternative(0, 5)));
//! jobs.restart();
//! let schedule = Schedule::new(1);
//!
//! let mut policy = DispatchPolicy::EarliestEnd;
//! let decision = policy.decide(&jobs, &schedule).unwrap();
//! assert_eq!((decision.job, decision.operation, decision.station), (0, 0, 0));
//! ```
//!
//! # References
//!
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"
//! - Brandimarte (1993), "Routing and scheduling in a flexible job shop
//!   by tabu search"

mod policies;
mod staged;
mod tuned;

pub use staged::{OperationRule, StationRule};

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::error::EngineError;
use crate::models::{JobContainer, JobId, OperationId, Schedule, StationId};

/// A dispatching decision: commit `operation` of `job` to `station`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Owning job.
    pub job: JobId,
    /// Operation to place.
    pub operation: OperationId,
    /// Station to place it on.
    pub station: StationId,
}

/// All (job, available operation) pairs, in fixed enumeration order.
pub(crate) fn frontier(jobs: &JobContainer) -> Vec<(JobId, OperationId)> {
    let mut entries = Vec::new();
    for job in jobs.jobs() {
        for &operation in job.available_operations() {
            entries.push((job.id(), operation));
        }
    }
    entries
}

/// The closed set of dispatching policies.
///
/// Several policies work in two stages (select a job or operation first, a
/// station second); the rest score every (operation, station) pair of the
/// frontier directly. The `Tuned*` variants apply externally supplied
/// weight vectors positionally.
#[derive(Debug, Clone)]
pub enum DispatchPolicy {
    /// Minimize the earliest feasible start time.
    EarliestInsert,
    /// Minimize the earliest feasible end time.
    EarliestEnd,
    /// Job with the least (positive) remaining average work, then earliest
    /// end within that job.
    LeastWorkRemaining,
    /// Job with the most remaining average work, then earliest end within
    /// that job.
    MostWorkRemaining,
    /// Globally shortest eligible duration.
    ShortestProcessing,
    /// Globally longest eligible duration.
    LongestProcessing,
    /// Operation with the longest average duration, then the station with
    /// the earliest feasible start.
    LongestProcessingEarliestEnd,
    /// Most direct successors, ties by earliest end.
    MostSuccessors,
    /// Largest (successor count − alternative count), ties by earliest end.
    SuccessorsMinusAlternatives,
    /// Most-work job first, then the successor−alternative rule inside it.
    MostWorkSuccessorsAlternatives,
    /// Smallest gap inserted in front of the station's availability, ties
    /// by earliest start.
    MinimalWaste,
    /// Earliest end, penalized by the station's outstanding demand.
    StationDemand,
    /// Earliest start minus the average time the operation blocks
    /// downstream work.
    TimeBlocked,
    /// Most eligible alternatives first, ties by earliest end minus blocked
    /// time.
    MostAlternativesTimeBlocked,
    /// Operation with the longest downstream critical path, then the
    /// earliest-end station.
    CriticalPathFirst,
    /// Earliest end plus backward/forward-pass slack.
    SlackHybrid,
    /// Job with the longest contention-free completion estimate, then
    /// earliest end within it. The estimate ignores station capacity.
    RelaxedCriticalPath,
    /// Fixed-weight combination of start, makespan envelope, alternative
    /// count, job workload and successor count.
    Balanced,
    /// Weighted envelope scoring; arity 3.
    TunedEnvelope(Vec<f64>),
    /// Earliest insert plus weighted deviation from the shortest duration;
    /// arity 1.
    TunedInsertDeviation(Vec<f64>),
    /// Earliest end minus weighted critical path; arity 1.
    TunedCriticalPath(Vec<f64>),
    /// Insert time with weighted critical path, duration deviation and
    /// demand pressure; arity 3.
    TunedCriticalPathDemand(Vec<f64>),
    /// Insert time with weighted blocked time, duration deviation and
    /// demand pressure; arity 3.
    TunedTimeBlocked(Vec<f64>),
    /// Two-axis composable rule: one operation-selection rule, one
    /// station-selection rule.
    Staged {
        operation: OperationRule,
        station: StationRule,
    },
    /// Uniformly random operation and station; baseline only.
    Random(SmallRng),
}

impl DispatchPolicy {
    /// Builds the weighted-envelope policy, validating the vector arity.
    pub fn tuned_envelope(weights: Vec<f64>) -> Result<Self, EngineError> {
        check_arity("tuned-envelope", &weights, 3)?;
        Ok(Self::TunedEnvelope(weights))
    }

    /// Builds the insert-deviation policy, validating the vector arity.
    pub fn tuned_insert_deviation(weights: Vec<f64>) -> Result<Self, EngineError> {
        check_arity("tuned-insert-deviation", &weights, 1)?;
        Ok(Self::TunedInsertDeviation(weights))
    }

    /// Builds the weighted critical-path policy, validating the vector arity.
    pub fn tuned_critical_path(weights: Vec<f64>) -> Result<Self, EngineError> {
        check_arity("tuned-critical-path", &weights, 1)?;
        Ok(Self::TunedCriticalPath(weights))
    }

    /// Builds the critical-path + demand policy, validating the vector arity.
    pub fn tuned_critical_path_demand(weights: Vec<f64>) -> Result<Self, EngineError> {
        check_arity("tuned-critical-path-demand", &weights, 3)?;
        Ok(Self::TunedCriticalPathDemand(weights))
    }

    /// Builds the blocked-time + demand policy, validating the vector arity.
    pub fn tuned_time_blocked(weights: Vec<f64>) -> Result<Self, EngineError> {
        check_arity("tuned-time-blocked", &weights, 3)?;
        Ok(Self::TunedTimeBlocked(weights))
    }

    /// Builds the two-axis policy from harness-supplied rule indices.
    pub fn staged(operation_rule: usize, station_rule: usize) -> Result<Self, EngineError> {
        Ok(Self::Staged {
            operation: OperationRule::from_index(operation_rule)?,
            station: StationRule::from_index(station_rule)?,
        })
    }

    /// Builds the random baseline policy from a seed.
    pub fn random(seed: u64) -> Self {
        Self::Random(SmallRng::seed_from_u64(seed))
    }

    /// Short rule name for reporting.
    pub fn name(&self) -> &'static str {
        match self {
            Self::EarliestInsert => "EIT",
            Self::EarliestEnd => "EET",
            Self::LeastWorkRemaining => "LWKR",
            Self::MostWorkRemaining => "MWKR",
            Self::ShortestProcessing => "SPT",
            Self::LongestProcessing => "LPT",
            Self::LongestProcessingEarliestEnd => "LPT-EIT",
            Self::MostSuccessors => "MS-EET",
            Self::SuccessorsMinusAlternatives => "SA-EET",
            Self::MostWorkSuccessorsAlternatives => "MWKR-SA-EET",
            Self::MinimalWaste => "MW-EIT",
            Self::StationDemand => "DEMAND-EET",
            Self::TimeBlocked => "TB-EIT",
            Self::MostAlternativesTimeBlocked => "MA-TB-EET",
            Self::CriticalPathFirst => "CP-EET",
            Self::SlackHybrid => "SLACK-EET",
            Self::RelaxedCriticalPath => "RCP-EET",
            Self::Balanced => "BALANCED",
            Self::TunedEnvelope(_) => "W-ENVELOPE",
            Self::TunedInsertDeviation(_) => "W-EIT-DEV",
            Self::TunedCriticalPath(_) => "W-CP",
            Self::TunedCriticalPathDemand(_) => "W-CP-DEMAND",
            Self::TunedTimeBlocked(_) => "W-TB-DEMAND",
            Self::Staged { .. } => "STAGED",
            Self::Random(_) => "RANDOM",
        }
    }

    /// Picks the next (job, operation, station) to commit.
    ///
    /// Fails with [`EngineError::EmptyFrontier`] when no operation is
    /// schedulable — callers must not consult a policy on a finished
    /// instance. Tuned variants fail with
    /// [`EngineError::MalformedWeights`] before scoring anything if their
    /// vector does not match the formula's arity.
    pub fn decide(
        &mut self,
        jobs: &JobContainer,
        schedule: &Schedule,
    ) -> Result<Decision, EngineError> {
        match self {
            Self::EarliestInsert => policies::earliest_insert(jobs, schedule),
            Self::EarliestEnd => policies::earliest_end(jobs, schedule),
            Self::LeastWorkRemaining => policies::least_work_remaining(jobs, schedule),
            Self::MostWorkRemaining => policies::most_work_remaining(jobs, schedule),
            Self::ShortestProcessing => policies::shortest_processing(jobs),
            Self::LongestProcessing => policies::longest_processing(jobs),
            Self::LongestProcessingEarliestEnd => {
                policies::longest_processing_earliest_insert(jobs, schedule)
            }
            Self::MostSuccessors => policies::most_successors(jobs, schedule),
            Self::SuccessorsMinusAlternatives => {
                policies::successors_minus_alternatives(jobs, schedule)
            }
            Self::MostWorkSuccessorsAlternatives => {
                policies::most_work_successors_alternatives(jobs, schedule)
            }
            Self::MinimalWaste => policies::minimal_waste(jobs, schedule),
            Self::StationDemand => policies::station_demand(jobs, schedule),
            Self::TimeBlocked => policies::time_blocked(jobs, schedule),
            Self::MostAlternativesTimeBlocked => {
                policies::most_alternatives_time_blocked(jobs, schedule)
            }
            Self::CriticalPathFirst => policies::critical_path_first(jobs, schedule),
            Self::SlackHybrid => policies::slack_hybrid(jobs, schedule),
            Self::RelaxedCriticalPath => policies::relaxed_critical_path(jobs, schedule),
            Self::Balanced => policies::balanced(jobs, schedule),
            Self::TunedEnvelope(weights) => {
                check_arity("tuned-envelope", weights, 3)?;
                tuned::envelope(jobs, schedule, weights)
            }
            Self::TunedInsertDeviation(weights) => {
                check_arity("tuned-insert-deviation", weights, 1)?;
                tuned::insert_deviation(jobs, schedule, weights)
            }
            Self::TunedCriticalPath(weights) => {
                check_arity("tuned-critical-path", weights, 1)?;
                tuned::critical_path(jobs, schedule, weights)
            }
            Self::TunedCriticalPathDemand(weights) => {
                check_arity("tuned-critical-path-demand", weights, 3)?;
                tuned::critical_path_demand(jobs, schedule, weights)
            }
            Self::TunedTimeBlocked(weights) => {
                check_arity("tuned-time-blocked", weights, 3)?;
                tuned::time_blocked_demand(jobs, schedule, weights)
            }
            Self::Staged { operation, station } => {
                staged::staged(jobs, schedule, *operation, *station)
            }
            Self::Random(rng) => policies::random(jobs, rng),
        }
    }
}

fn check_arity(policy: &'static str, weights: &[f64], expected: usize) -> Result<(), EngineError> {
    if weights.len() != expected {
        return Err(EngineError::MalformedWeights {
            policy,
            expected,
            actual: weights.len(),
        });
    }
    Ok(())
}
