//! Input validation for problem instances.
//!
//! Checks structural integrity of a [`JobContainer`] before construction.
//! Detects:
//! - Jobs without operations
//! - Operations without eligible stations
//! - Station references beyond the configured station count
//! - Predecessor references to operations that don't exist
//! - Circular precedence dependencies (DAG validation)
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4
//! (Topological Sort)

use std::collections::HashSet;

use thiserror::Error;

use crate::models::{Job, JobContainer, JobId, OperationId};

/// Validation result: `Ok(())` or every detected issue.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A structural defect in a problem instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A job with no operations.
    #[error("job {job} has no operations")]
    EmptyJob { job: JobId },

    /// An operation that can run nowhere.
    #[error("operation {operation} of job {job} has no eligible stations")]
    NoAlternatives { job: JobId, operation: OperationId },

    /// An eligible station outside `[0, station_count)`.
    #[error(
        "operation {operation} of job {job} references station {station} \
         (station count is {station_count})"
    )]
    StationOutOfRange {
        job: JobId,
        operation: OperationId,
        station: usize,
        station_count: usize,
    },

    /// A predecessor identity with no matching operation in the job.
    #[error("operation {operation} of job {job} references unknown predecessor {predecessor}")]
    UnknownPredecessor {
        job: JobId,
        operation: OperationId,
        predecessor: OperationId,
    },

    /// The job's precedence graph contains a cycle.
    #[error("circular precedence in job {job} involving operation {operation}")]
    CyclicPrecedence { job: JobId, operation: OperationId },
}

/// Validates a problem instance.
///
/// Returns every detected issue rather than stopping at the first, so a
/// malformed instance can be reported completely.
pub fn validate(jobs: &JobContainer) -> ValidationResult {
    let mut errors = Vec::new();

    for job in jobs.jobs() {
        if job.operation_count() == 0 {
            errors.push(ValidationError::EmptyJob { job: job.id() });
            continue;
        }

        let known: HashSet<OperationId> = job.operations().map(|op| op.id()).collect();
        for op in job.operations() {
            if op.alternatives().is_empty() {
                errors.push(ValidationError::NoAlternatives {
                    job: job.id(),
                    operation: op.id(),
                });
            }
            for alternative in op.alternatives() {
                if alternative.station >= jobs.station_count() {
                    errors.push(ValidationError::StationOutOfRange {
                        job: job.id(),
                        operation: op.id(),
                        station: alternative.station,
                        station_count: jobs.station_count(),
                    });
                }
            }
            for &predecessor in op.predecessors() {
                if !known.contains(&predecessor) {
                    errors.push(ValidationError::UnknownPredecessor {
                        job: job.id(),
                        operation: op.id(),
                        predecessor,
                    });
                }
            }
        }

        if let Some(cycle) = detect_cycle(job) {
            errors.push(cycle);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Detects a precedence cycle in one job via DFS.
///
/// A back edge (an operation reached while still on the recursion stack)
/// proves a cycle.
fn detect_cycle(job: &Job) -> Option<ValidationError> {
    let mut visited = HashSet::new();
    let mut in_stack = HashSet::new();

    for op in job.operations() {
        if !visited.contains(&op.id()) && has_cycle_dfs(job, op.id(), &mut visited, &mut in_stack)
        {
            return Some(ValidationError::CyclicPrecedence {
                job: job.id(),
                operation: op.id(),
            });
        }
    }
    None
}

fn has_cycle_dfs(
    job: &Job,
    operation: OperationId,
    visited: &mut HashSet<OperationId>,
    in_stack: &mut HashSet<OperationId>,
) -> bool {
    visited.insert(operation);
    in_stack.insert(operation);

    for &next in job.successors(operation) {
        if in_stack.contains(&next) {
            return true;
        }
        if !visited.contains(&next) && has_cycle_dfs(job, next, visited, in_stack) {
            return true;
        }
    }

    in_stack.remove(&operation);
    false
}
