//! Problem-instance descriptions and loaders.
//!
//! Two external formats are supported, plus a sampler for deriving random
//! problem variants:
//!
//! - [`ProblemInstance`]: a serde-deserializable description (`numM`,
//!   `Jobs`, `Prec`) where each operation is a list of `[duration, station]`
//!   pairs and each precedence entry lists the operation's predecessors.
//! - [`brandimarte::parse`]: the classic whitespace-separated benchmark
//!   format with implicit chain precedence inside each job.
//!
//! Loaders only build [`JobContainer`] values; callers should run
//! [`crate::validation::validate`] on the result before solving, since the
//! formats carry no guarantees about station ranges or acyclicity.
//!
//! # Reference
//! Brandimarte (1993), "Routing and scheduling in a flexible job shop
//! by tabu search" (benchmark instances mk01–mk15)

pub mod brandimarte;
pub mod sampler;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::{Job, JobContainer, Operation, OperationId, StationId};

/// A malformed instance description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstanceError {
    /// `Jobs` and `Prec` disagree on the number of jobs.
    #[error("instance lists {jobs} jobs but {precedence} precedence entries")]
    JobCountMismatch { jobs: usize, precedence: usize },

    /// One job's operation list and precedence list differ in length.
    #[error(
        "job {job} lists {operations} operations but {precedence} precedence entries"
    )]
    OperationCountMismatch {
        job: usize,
        operations: usize,
        precedence: usize,
    },

    /// The text stream ended before a required field.
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    /// A token that is not a non-negative integer.
    #[error("invalid token '{token}'")]
    InvalidToken { token: String },
}

/// Serde-level description of one problem instance.
///
/// `jobs[j][o]` lists the `[duration, station]` alternatives of operation
/// `o` of job `j`; `precedence[j][o]` lists its predecessor identities.
/// Operation identities are positional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemInstance {
    /// Optional instance label.
    #[serde(default)]
    pub name: Option<String>,
    /// Problem-wide station count.
    #[serde(rename = "numM")]
    pub station_count: usize,
    /// Per job, per operation: `[duration, station]` alternatives.
    #[serde(rename = "Jobs")]
    pub jobs: Vec<Vec<Vec<(i64, StationId)>>>,
    /// Per job, per operation: predecessor identities.
    #[serde(rename = "Prec")]
    pub precedence: Vec<Vec<Vec<OperationId>>>,
}

impl ProblemInstance {
    /// Builds the job registry this description denotes.
    pub fn to_container(&self) -> Result<JobContainer, InstanceError> {
        if self.jobs.len() != self.precedence.len() {
            return Err(InstanceError::JobCountMismatch {
                jobs: self.jobs.len(),
                precedence: self.precedence.len(),
            });
        }

        let mut container = JobContainer::new(self.station_count);
        for (job_id, (operations, predecessors)) in
            self.jobs.iter().zip(&self.precedence).enumerate()
        {
            if operations.len() != predecessors.len() {
                return Err(InstanceError::OperationCountMismatch {
                    job: job_id,
                    operations: operations.len(),
                    precedence: predecessors.len(),
                });
            }
            let mut job = Job::new(job_id);
            for (op_id, (alternatives, preds)) in
                operations.iter().zip(predecessors).enumerate()
            {
                let mut operation = Operation::new(op_id);
                for &(duration, station) in alternatives {
                    operation.add_alternative(station, duration);
                }
                for &predecessor in preds {
                    operation.add_predecessor(predecessor);
                }
                job.add_operation(operation);
            }
            container.add_job(job);
        }
        debug!(
            name = self.name.as_deref().unwrap_or(""),
            jobs = container.job_count(),
            stations = self.station_count,
            "problem instance loaded"
        );
        Ok(container)
    }
}
