//! Random problem variants derived from a base instance.
//!
//! Resamples a benchmark instance into a problem set: each variant draws
//! between 0.8× and 1.2× of the base job count (with replacement) from the
//! base jobs, reusing their operation structure under fresh job identities.
//! Useful for turning a single benchmark file into a family of related
//! instances for policy comparisons.

use rand::Rng;

use crate::models::{Job, JobContainer};

/// Draws `count` random variants of `base`.
///
/// Each variant keeps the base station count. Variants are built from
/// cloned operations, so they must be restarted before construction — the
/// solver does this on its own.
pub fn sample_variants<R: Rng>(base: &JobContainer, count: usize, rng: &mut R) -> Vec<JobContainer> {
    let templates: Vec<&Job> = base.jobs().collect();
    let mut variants = Vec::with_capacity(count);
    if templates.is_empty() {
        variants.resize_with(count, || JobContainer::new(base.station_count()));
        return variants;
    }

    let lower = (0.8 * templates.len() as f64) as usize;
    let upper = ((1.2 * templates.len() as f64) as usize).max(lower);

    for _ in 0..count {
        let job_count = rng.random_range(lower..=upper);
        let mut variant = JobContainer::new(base.station_count());
        for job_id in 0..job_count {
            let template = templates[rng.random_range(0..templates.len())];
            let mut job = Job::new(job_id);
            for operation in template.operations() {
                job.add_operation(operation.clone());
            }
            variant.add_job(job);
        }
        variants.push(variant);
    }
    variants
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use crate::dispatching::DispatchPolicy;
    use crate::models::Operation;
    use crate::solver::ConstructionSolver;
    use crate::validation::validate;

    fn base() -> JobContainer {
        JobContainer::new(2)
            .with_job(
                Job::new(0)
                    .with_operation(Operation::new(0).with_alternative(0, 3))
                    .with_operation(
                        Operation::new(1).with_alternative(1, 2).with_predecessor(0),
                    ),
            )
            .with_job(Job::new(1).with_operation(Operation::new(0).with_alternative(1, 4)))
            .with_job(
                Job::new(2).with_operation(
                    Operation::new(0).with_alternative(0, 6).with_alternative(1, 5),
                ),
            )
    }

    #[test]
    fn test_variant_shape() {
        let base = base();
        let mut rng = SmallRng::seed_from_u64(11);
        let variants = sample_variants(&base, 10, &mut rng);
        assert_eq!(variants.len(), 10);

        // 0.8 * 3 and 1.2 * 3 truncate to [2, 3] jobs.
        for variant in &variants {
            assert!((2..=3).contains(&variant.job_count()));
            assert_eq!(variant.station_count(), 2);
            assert!(validate(variant).is_ok());
        }
    }

    #[test]
    fn test_variants_are_seed_deterministic() {
        let base = base();
        let a = sample_variants(&base, 5, &mut SmallRng::seed_from_u64(3));
        let b = sample_variants(&base, 5, &mut SmallRng::seed_from_u64(3));
        for (left, right) in a.iter().zip(&b) {
            assert_eq!(left.job_count(), right.job_count());
            let counts_left: Vec<_> = left.jobs().map(|j| j.operation_count()).collect();
            let counts_right: Vec<_> = right.jobs().map(|j| j.operation_count()).collect();
            assert_eq!(counts_left, counts_right);
        }
    }

    #[test]
    fn test_variants_schedule() {
        let base = base();
        let mut rng = SmallRng::seed_from_u64(5);
        for variant in sample_variants(&base, 3, &mut rng) {
            let mut solver = ConstructionSolver::new(variant, DispatchPolicy::EarliestEnd);
            assert!(solver.run_to_completion().unwrap() > 0);
        }
    }

    #[test]
    fn test_empty_base() {
        let base = JobContainer::new(4);
        let mut rng = SmallRng::seed_from_u64(1);
        let variants = sample_variants(&base, 2, &mut rng);
        assert_eq!(variants.len(), 2);
        assert!(variants.iter().all(|v| v.job_count() == 0));
        assert!(variants.iter().all(|v| v.station_count() == 4));
    }
}
