//! Flexible job-shop scheduling engine.
//!
//! Solves FJSSP instances constructively: jobs are DAGs of operations, each
//! operation eligible on a subset of stations with station-specific
//! durations, and a greedy dispatching policy decides step by step which
//! (job, operation, station) triple to commit next, minimizing makespan.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Operation`, `Job`, `JobContainer`,
//!   `Schedule`, `ScheduledOperation` — with live readiness tracking and
//!   DAG metrics (critical path, slack, blocked time)
//! - **`dispatching`**: The closed family of dispatching policies, from
//!   earliest-end-time up to externally weighted scoring functions
//! - **`solver`**: The decide→commit construction driver
//! - **`validation`**: Structural integrity checks for problem instances
//! - **`instance`**: Instance descriptions, loaders and a variant sampler
//! - **`kpi`**: Schedule quality indicators
//!
//! # Example
//!
//! ```
//! use flexshop::dispatching::DispatchPolicy;
//! use flexshop::models::{Job, JobContainer, Operation};
//! use flexshop::solver::ConstructionSolver;
//!
//! let jobs = JobContainer::new(2).with_job(
//!     Job::new(0)
//!         .with_operation(Operation::new(0).with_alternative(0, 5).with_alternative(1, 7))
//!         .with_operation(Operation::new(1).with_alternative(1, 3).with_predecessor(0)),
//! );
//!
//! let mut solver = ConstructionSolver::new(jobs, DispatchPolicy::EarliestEnd);
//! let makespan = solver.run_to_completion().unwrap();
//! assert_eq!(makespan, 8);
//! ```
//!
//! # References
//!
//! - Brandimarte (1993), "Routing and scheduling in a flexible job shop
//!   by tabu search"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

pub mod dispatching;
pub mod error;
pub mod instance;
pub mod kpi;
pub mod models;
pub mod solver;
pub mod validation;

pub use error::EngineError;
