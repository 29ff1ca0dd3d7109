//! Job registry for one problem instance.

use std::collections::BTreeMap;

use crate::error::EngineError;
use crate::models::job::{Job, JobId};

/// Owns every job of a problem instance plus the problem-wide station count.
///
/// The registry is the read surface for dispatching policies (which jobs
/// exist, which operations are available) and the write surface for the
/// schedule's commit primitive. It never touches the station timelines.
#[derive(Debug, Clone)]
pub struct JobContainer {
    jobs: BTreeMap<JobId, Job>,
    station_count: usize,
}

impl JobContainer {
    /// Creates an empty registry for a problem with `station_count` stations.
    pub fn new(station_count: usize) -> Self {
        Self {
            jobs: BTreeMap::new(),
            station_count,
        }
    }

    /// Adds a job (builder form).
    pub fn with_job(mut self, job: Job) -> Self {
        self.add_job(job);
        self
    }

    /// Registers a job under its identity.
    pub fn add_job(&mut self, job: Job) {
        self.jobs.insert(job.id(), job);
    }

    /// Registers several jobs.
    pub fn add_jobs(&mut self, jobs: impl IntoIterator<Item = Job>) {
        for job in jobs {
            self.add_job(job);
        }
    }

    /// Looks up a job.
    pub fn job(&self, job: JobId) -> Result<&Job, EngineError> {
        self.jobs.get(&job).ok_or(EngineError::UnknownJob { job })
    }

    pub(crate) fn job_mut(&mut self, job: JobId) -> Result<&mut Job, EngineError> {
        self.jobs
            .get_mut(&job)
            .ok_or(EngineError::UnknownJob { job })
    }

    /// All jobs in ascending identity order.
    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs.values()
    }

    /// Number of jobs.
    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    /// Problem-wide station count.
    #[inline]
    pub fn station_count(&self) -> usize {
        self.station_count
    }

    /// Whether every job is done.
    pub fn is_done(&self) -> bool {
        self.jobs.values().all(Job::is_done)
    }

    /// Restarts every job. Must run before any construction run.
    pub fn restart(&mut self) {
        for job in self.jobs.values_mut() {
            job.restart();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Operation;

    fn two_jobs() -> JobContainer {
        let mut container = JobContainer::new(2)
            .with_job(Job::new(0).with_operation(Operation::new(0).with_alternative(0, 4)))
            .with_job(Job::new(1).with_operation(Operation::new(0).with_alternative(1, 6)));
        container.restart();
        container
    }

    #[test]
    fn test_registry_lookup() {
        let container = two_jobs();
        assert_eq!(container.job_count(), 2);
        assert_eq!(container.station_count(), 2);
        assert_eq!(container.job(1).unwrap().id(), 1);
        assert!(matches!(
            container.job(9),
            Err(EngineError::UnknownJob { job: 9 })
        ));
    }

    #[test]
    fn test_done_aggregation() {
        let mut container = two_jobs();
        assert!(!container.is_done());
        container.job_mut(0).unwrap().complete_operation(0, 4).unwrap();
        assert!(!container.is_done());
        container.job_mut(1).unwrap().complete_operation(0, 6).unwrap();
        assert!(container.is_done());

        container.restart();
        assert!(!container.is_done());
        assert_eq!(container.job(0).unwrap().available_operations(), &[0]);
    }
}
