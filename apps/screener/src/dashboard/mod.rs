pub mod aggregator;
pub mod statistics;

pub use aggregator::{DashboardState, StatisticsAggregator};
pub use statistics::{compute_statistics, DashboardStatistics};
