//! Engine error kinds.
//!
//! Every fallible engine operation reports one of these. All of them are
//! fatal for the construction run in progress: the only recovery is to
//! discard the run (`Schedule::clear` + `JobContainer::restart`) and retry
//! with corrected inputs.

use thiserror::Error;

use crate::models::{JobId, OperationId, StationId};

/// A fatal scheduling-engine error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A station index beyond the configured station count was referenced.
    #[error("station {station} does not exist (station count is {station_count})")]
    UnknownStation {
        station: StationId,
        station_count: usize,
    },

    /// An operation was queried for a station it is not eligible on.
    #[error("operation {operation} of job {job} cannot be processed on station {station}")]
    InfeasibleStation {
        job: JobId,
        operation: OperationId,
        station: StationId,
    },

    /// A commit was attempted for an operation outside its job's available
    /// list: either its predecessors are incomplete or it was already placed.
    #[error("operation {operation} of job {job} is not currently available")]
    OperationNotAvailable { job: JobId, operation: OperationId },

    /// A job identity with no registered job.
    #[error("job {job} does not exist")]
    UnknownJob { job: JobId },

    /// An operation identity with no registered operation in the job.
    #[error("operation {operation} does not exist in job {job}")]
    UnknownOperation { job: JobId, operation: OperationId },

    /// A weighted policy was given a weight vector of the wrong length.
    #[error("policy '{policy}' requires {expected} weights, got {actual}")]
    MalformedWeights {
        policy: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A rule index outside the enumerated rule set was supplied for the
    /// two-axis composable policy.
    #[error("no {axis} rule with index {index} (rule count is {count})")]
    UnknownRule {
        axis: &'static str,
        index: usize,
        count: usize,
    },

    /// A policy was asked for a decision while no operation is available.
    /// Indicates the caller stepped a finished instance.
    #[error("no schedulable operation: the instance is fully scheduled")]
    EmptyFrontier,

    /// No eligible station of an operation carries its shortest duration.
    /// Cannot occur for a well-formed operation; defended against explicitly
    /// in the forward-pass earliest-start computation.
    #[error("operation {operation} of job {job} has no station matching its shortest duration")]
    NoShortestStation { job: JobId, operation: OperationId },
}
