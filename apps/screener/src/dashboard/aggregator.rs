use std::cmp::Reverse;
use std::sync::Arc;

use chrono::{DateTime, TimeZone};
use tracing::{info, warn};

use crate::api_client::CandidateSource;
use crate::dashboard::statistics::{compute_statistics, DashboardStatistics};
use crate::models::CandidateRecord;
use crate::presentation::{NotificationKind, Notifier};

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load dashboard statistics";

/// How many candidates the "Recent Candidates" panel lists.
pub const RECENT_CANDIDATES_LIMIT: usize = 5;

/// Dashboard state owned by the consuming view and handed to
/// [`StatisticsAggregator::refresh`] by reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    /// `None` until the first refresh resolves.
    pub statistics: Option<DashboardStatistics>,
    pub recent_candidates: Vec<CandidateRecord>,
}

impl DashboardState {
    pub fn statistics_or_default(&self) -> DashboardStatistics {
        self.statistics.unwrap_or_default()
    }
}

/// Fetches the candidate list and turns it into dashboard statistics.
#[derive(Clone)]
pub struct StatisticsAggregator {
    source: Arc<dyn CandidateSource>,
    notifier: Arc<dyn Notifier>,
}

impl StatisticsAggregator {
    pub fn new(source: Arc<dyn CandidateSource>, notifier: Arc<dyn Notifier>) -> Self {
        Self { source, notifier }
    }

    /// Replaces `state` with a fresh snapshot and returns the new statistics.
    ///
    /// Never fails: a fetch error emits an error notification and leaves the
    /// zeroed statistics in place. The view holds `&mut state` for the whole
    /// call, so its own busy indicator covers the fetch.
    pub async fn refresh<Tz: TimeZone>(
        &self,
        state: &mut DashboardState,
        now: DateTime<Tz>,
    ) -> DashboardStatistics {
        let (statistics, recent) = match self.source.fetch_candidates().await {
            Ok(candidates) => {
                let statistics = compute_statistics(&candidates, now);
                info!(
                    total = statistics.total_candidates,
                    recent = statistics.recent_uploads,
                    average = statistics.average_score,
                    "Dashboard statistics refreshed"
                );
                (statistics, most_recent(&candidates, RECENT_CANDIDATES_LIMIT))
            }
            Err(e) => {
                warn!("Failed to fetch candidates: {e}");
                self.notifier.notify(NotificationKind::Error, LOAD_FAILED_MESSAGE);
                (DashboardStatistics::default(), Vec::new())
            }
        };

        state.statistics = Some(statistics);
        state.recent_candidates = recent;
        statistics
    }
}

/// Newest uploads first; records with no readable timestamp sort last.
pub fn most_recent(candidates: &[CandidateRecord], limit: usize) -> Vec<CandidateRecord> {
    let mut sorted: Vec<&CandidateRecord> = candidates.iter().collect();
    sorted.sort_by_key(|c| Reverse(c.uploaded_at()));
    sorted.into_iter().take(limit).cloned().collect()
}
