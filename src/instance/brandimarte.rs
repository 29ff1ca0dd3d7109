//! Brandimarte-style text format.
//!
//! Layout (all whitespace-separated non-negative integers):
//!
//! ```text
//! <job count> <station count>
//! per job: <operation count>
//!   per operation: <alternative count> then <station> <duration> pairs
//! ```
//!
//! Operations of a job form an implicit chain: operation `k` depends on
//! operation `k − 1`. Station indices are taken as written and 0-based;
//! out-of-range references are left to [`crate::validation::validate`].

use tracing::debug;

use super::InstanceError;
use crate::models::{Job, JobContainer, Operation};

/// Parses a Brandimarte-style instance.
pub fn parse(text: &str) -> Result<JobContainer, InstanceError> {
    let mut tokens = text.split_whitespace();
    let mut next = |expected: &'static str| -> Result<usize, InstanceError> {
        let token = tokens
            .next()
            .ok_or(InstanceError::UnexpectedEnd { expected })?;
        token
            .parse::<usize>()
            .map_err(|_| InstanceError::InvalidToken {
                token: token.to_string(),
            })
    };

    let job_count = next("job count")?;
    let station_count = next("station count")?;
    let mut container = JobContainer::new(station_count);

    for job_id in 0..job_count {
        let mut job = Job::new(job_id);
        let operation_count = next("operation count")?;
        for op_id in 0..operation_count {
            let mut operation = Operation::new(op_id);
            if op_id > 0 {
                operation.add_predecessor(op_id - 1);
            }
            let alternative_count = next("alternative count")?;
            for _ in 0..alternative_count {
                let station = next("station index")?;
                let duration = next("duration")?;
                operation.add_alternative(station, duration as i64);
            }
            job.add_operation(operation);
        }
        container.add_job(job);
    }
    debug!(
        jobs = job_count,
        stations = station_count,
        "benchmark instance parsed"
    );
    Ok(container)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatching::DispatchPolicy;
    use crate::solver::ConstructionSolver;
    use crate::validation::validate;

    const TOY: &str = "2 2\n\
                       2  1 0 5  2 0 3 1 8\n\
                       1  1 1 4\n";

    #[test]
    fn test_parse_structure() {
        let jobs = parse(TOY).unwrap();
        assert_eq!(jobs.job_count(), 2);
        assert_eq!(jobs.station_count(), 2);
        assert!(validate(&jobs).is_ok());

        let job = jobs.job(0).unwrap();
        assert_eq!(job.operation_count(), 2);
        // Implicit chain precedence.
        assert_eq!(job.operation(1).unwrap().predecessors(), &[0]);
        assert_eq!(job.operation(1).unwrap().duration_on(1), Some(8));
        assert!(job.operation(0).unwrap().predecessors().is_empty());
    }

    #[test]
    fn test_parsed_instance_schedules() {
        let jobs = parse(TOY).unwrap();
        let mut solver = ConstructionSolver::new(jobs, DispatchPolicy::EarliestEnd);
        assert_eq!(solver.run_to_completion().unwrap(), 8);
    }

    #[test]
    fn test_truncated_input() {
        let err = parse("2 2\n2  1 0").unwrap_err();
        assert_eq!(
            err,
            InstanceError::UnexpectedEnd {
                expected: "duration"
            }
        );
    }

    #[test]
    fn test_garbage_token() {
        let err = parse("two 2").unwrap_err();
        assert_eq!(
            err,
            InstanceError::InvalidToken {
                token: "two".to_string()
            }
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(
            parse("").unwrap_err(),
            InstanceError::UnexpectedEnd {
                expected: "job count"
            }
        );
    }
}
