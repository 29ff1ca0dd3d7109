//! Schedule quality metrics (KPIs).
//!
//! Computes standard indicators from a built schedule:
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Makespan (C_max) | Latest completion time over all stations |
//! | Utilization | busy time / makespan, per station |
//! | Idle time | makespan − busy time, summed over stations |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use serde::Serialize;

use crate::models::Schedule;

/// Performance indicators of a schedule.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleKpi {
    /// Latest completion time across all stations.
    pub makespan: i64,
    /// Total number of placements.
    pub placement_count: usize,
    /// Sum of idle time over all stations within the makespan horizon.
    pub total_idle: i64,
    /// Mean station utilization (0.0..1.0); 0 for an empty schedule.
    pub avg_utilization: f64,
    /// Per-station utilization, indexed by station.
    pub utilization_by_station: Vec<f64>,
}

impl ScheduleKpi {
    /// Computes KPIs from a schedule, using the makespan as the horizon.
    pub fn calculate(schedule: &Schedule) -> Self {
        let makespan = schedule.makespan();
        let placement_count = schedule.placement_count();

        let busy_by_station: Vec<i64> = schedule
            .stations()
            .iter()
            .map(|timeline| timeline.iter().map(|p| p.duration).sum())
            .collect();

        let (total_idle, utilization_by_station) = if makespan > 0 {
            let idle = busy_by_station.iter().map(|busy| makespan - busy).sum();
            let utilization = busy_by_station
                .iter()
                .map(|&busy| busy as f64 / makespan as f64)
                .collect();
            (idle, utilization)
        } else {
            (0, vec![0.0; schedule.station_count()])
        };

        let avg_utilization = if utilization_by_station.is_empty() {
            0.0
        } else {
            utilization_by_station.iter().sum::<f64>() / utilization_by_station.len() as f64
        };

        Self {
            makespan,
            placement_count,
            total_idle,
            avg_utilization,
            utilization_by_station,
        }
    }
}
