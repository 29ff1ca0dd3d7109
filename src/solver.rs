//! Construction driver.
//!
//! Repeats the decide→commit cycle of a dispatching policy until every
//! operation of the instance is placed. The driver owns the job registry
//! and the schedule exclusively; the policy only ever sees shared borrows,
//! so it cannot mutate construction state.
//!
//! There is no rollback. A committed placement can only be undone by
//! [`ConstructionSolver::reset`], which discards the whole run. The first
//! error encountered halts the run; partial schedules are never reported as
//! success.

use tracing::{debug, trace};

use crate::dispatching::DispatchPolicy;
use crate::error::EngineError;
use crate::models::{JobContainer, Schedule};

/// Greedy schedule builder: one policy, one job registry, one schedule.
///
/// # Example
///
/// ```
/// use flexshop::dispatching::DispatchPolicy;
/// use flexshop::models::{Job, JobContainer, Operation};
/// use flexshop::solver::ConstructionSolver;
///
/// let jobs = JobContainer::new(1)
///     .with_job(Job::new(0).with_operation(Operation::new(0).with_alternative(0, 5)));
/// let mut solver = ConstructionSolver::new(jobs, DispatchPolicy::EarliestEnd);
/// assert_eq!(solver.run_to_completion().unwrap(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct ConstructionSolver {
    jobs: JobContainer,
    schedule: Schedule,
    policy: DispatchPolicy,
}

impl ConstructionSolver {
    /// Creates a solver over a fresh schedule, restarting the registry so a
    /// previously used instance cannot leak stale completion state in.
    pub fn new(mut jobs: JobContainer, policy: DispatchPolicy) -> Self {
        jobs.restart();
        let schedule = Schedule::new(jobs.station_count());
        Self {
            jobs,
            schedule,
            policy,
        }
    }

    /// Whether every operation of every job has been placed.
    pub fn is_done(&self) -> bool {
        self.jobs.is_done()
    }

    /// Read-only view of the job registry.
    pub fn jobs(&self) -> &JobContainer {
        &self.jobs
    }

    /// Read-only view of the schedule built so far.
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// The policy driving this construction.
    pub fn policy(&self) -> &DispatchPolicy {
        &self.policy
    }

    /// Runs up to `count` decide→commit cycles, stopping early when the
    /// instance completes. Returns the number of placements committed.
    /// A no-op on a finished instance.
    pub fn step(&mut self, count: usize) -> Result<usize, EngineError> {
        let mut committed = 0;
        for _ in 0..count {
            if self.jobs.is_done() {
                break;
            }
            self.commit_next()?;
            committed += 1;
        }
        Ok(committed)
    }

    /// Runs decide→commit cycles until the instance completes and returns
    /// the resulting makespan. Always terminates: every commit reduces the
    /// number of unplaced operations by one.
    pub fn run_to_completion(&mut self) -> Result<i64, EngineError> {
        let mut committed = 0u64;
        while !self.jobs.is_done() {
            self.commit_next()?;
            committed += 1;
        }
        let makespan = self.schedule.makespan();
        debug!(
            policy = self.policy.name(),
            committed, makespan, "construction complete"
        );
        Ok(makespan)
    }

    fn commit_next(&mut self) -> Result<(), EngineError> {
        let decision = self.policy.decide(&self.jobs, &self.schedule)?;
        let placement = self.schedule.commit(
            decision.station,
            decision.operation,
            decision.job,
            &mut self.jobs,
        )?;
        trace!(
            job = placement.job,
            operation = placement.operation,
            station = placement.station,
            start = placement.start,
            end = placement.end(),
            "placement committed"
        );
        Ok(())
    }

    /// Discards all progress: clears the schedule and restarts the registry.
    pub fn reset(&mut self) {
        self.schedule.clear();
        self.jobs.restart();
    }

    /// Releases the registry and schedule, e.g. for reporting.
    pub fn into_parts(self) -> (JobContainer, Schedule) {
        (self.jobs, self.schedule)
    }
}
