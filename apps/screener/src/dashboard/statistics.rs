use chrono::{DateTime, Days, Duration, LocalResult, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{CandidateRecord, Category};

/// Width of the "recent uploads" window, in calendar days.
pub const RECENT_WINDOW_DAYS: u64 = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub highly_qualified: usize,
    pub qualified: usize,
    pub not_a_fit: usize,
}

impl CategoryCounts {
    pub fn get(&self, category: Category) -> usize {
        match category {
            Category::HighlyQualified => self.highly_qualified,
            Category::Qualified => self.qualified,
            Category::NotAFit => self.not_a_fit,
        }
    }

    pub fn sum(&self) -> usize {
        self.highly_qualified + self.qualified + self.not_a_fit
    }

    fn record(&mut self, category: Category) {
        match category {
            Category::HighlyQualified => self.highly_qualified += 1,
            Category::Qualified => self.qualified += 1,
            Category::NotAFit => self.not_a_fit += 1,
        }
    }
}

/// Summary metrics shown on the dashboard cards. `Default` is the
/// zeroed value used when the candidate list cannot be fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStatistics {
    pub total_candidates: usize,
    pub categories: CategoryCounts,
    /// Rounded mean of overall scores, 0-100.
    pub average_score: u32,
    pub recent_uploads: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
}

impl DashboardStatistics {
    pub fn cards(&self) -> Vec<StatCard> {
        vec![
            StatCard {
                title: "Total Candidates",
                value: self.total_candidates.to_string(),
            },
            StatCard {
                title: "Highly Qualified",
                value: self.categories.highly_qualified.to_string(),
            },
            StatCard {
                title: "Average Score",
                value: format!("{}%", self.average_score),
            },
            StatCard {
                title: "Recent Uploads",
                value: self.recent_uploads.to_string(),
            },
        ]
    }
}

/// Derives dashboard statistics from a candidate snapshot.
///
/// Pure: `now` is injected so the recent-uploads window is deterministic.
/// Its time zone decides where the calendar-day boundaries fall.
/// Records without an analysis count toward the total with a score of 0 and
/// no category. Duplicate ids are counted as given.
pub fn compute_statistics<Tz: TimeZone>(
    candidates: &[CandidateRecord],
    now: DateTime<Tz>,
) -> DashboardStatistics {
    let total_candidates = candidates.len();
    let since = window_start(&now).with_timezone(&Utc);
    let until = now.with_timezone(&Utc);

    let mut categories = CategoryCounts::default();
    let mut recent_uploads = 0;
    let mut scores = Vec::with_capacity(total_candidates);

    for candidate in candidates {
        if let Some(category) = candidate.category() {
            categories.record(category);
        }
        if candidate
            .uploaded_at()
            .is_some_and(|at| at >= since && at <= until)
        {
            recent_uploads += 1;
        }
        scores.push(candidate.overall_score());
    }

    DashboardStatistics {
        total_candidates,
        categories,
        average_score: average_score(scores),
        recent_uploads,
    }
}

/// Lower bound of the recent window: the same wall-clock time seven calendar
/// days before `now`, in `now`'s zone.
///
/// Across a DST change this is 167 or 169 hours back, not 168. A wall-clock
/// time that falls in a spring-forward gap moves forward by an hour; one that
/// occurs twice resolves to the earlier instant.
pub fn window_start<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let zone = now.timezone();
    let Some(local) = now
        .naive_local()
        .checked_sub_days(Days::new(RECENT_WINDOW_DAYS))
    else {
        return DateTime::<Utc>::MIN_UTC.with_timezone(&zone);
    };
    match zone.from_local_datetime(&local) {
        LocalResult::Single(at) | LocalResult::Ambiguous(at, _) => at,
        LocalResult::None => zone
            .from_local_datetime(&(local + Duration::hours(1)))
            .earliest()
            .unwrap_or_else(|| DateTime::<Utc>::MIN_UTC.with_timezone(&zone)),
    }
}

pub fn is_recent<Tz: TimeZone>(uploaded_at: DateTime<Utc>, now: DateTime<Tz>) -> bool {
    uploaded_at >= window_start(&now).with_timezone(&Utc)
        && uploaded_at <= now.with_timezone(&Utc)
}

fn average_score(mut scores: Vec<f64>) -> u32 {
    if scores.is_empty() {
        return 0;
    }
    // sorted so the float sum does not depend on input order
    scores.sort_by(f64::total_cmp);
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    mean.round().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Berlin;

    use crate::models::Analysis;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 14, 30, 0).unwrap()
    }

    fn candidate(
        score: Option<f64>,
        category: Option<&str>,
        uploaded: DateTime<Utc>,
    ) -> CandidateRecord {
        CandidateRecord {
            id: None,
            filename: "resume.pdf".to_string(),
            upload_date: Some(uploaded.to_rfc3339()),
            analysis: Some(Analysis {
                category: category.map(str::to_string),
                overall_score: score,
                contact_info: None,
            }),
        }
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        let stats = compute_statistics(&[], now());
        assert_eq!(stats, DashboardStatistics::default());
        assert_eq!(stats.average_score, 0);
    }

    #[test]
    fn test_worked_example() {
        let candidates = vec![
            candidate(Some(80.0), Some("Qualified"), now()),
            candidate(Some(100.0), Some("Highly Qualified"), now() - Duration::days(10)),
        ];
        let stats = compute_statistics(&candidates, now());
        assert_eq!(stats.total_candidates, 2);
        assert_eq!(stats.categories.highly_qualified, 1);
        assert_eq!(stats.categories.qualified, 1);
        assert_eq!(stats.categories.not_a_fit, 0);
        assert_eq!(stats.average_score, 90);
        assert_eq!(stats.recent_uploads, 1);
    }

    #[test]
    fn test_pending_and_unknown_categories_count_toward_total_only() {
        let mut pending = candidate(None, None, now());
        pending.analysis = None;
        let candidates = vec![
            pending,
            candidate(Some(50.0), Some("Maybe"), now()),
            candidate(Some(70.0), Some("Not a Fit"), now()),
        ];
        let stats = compute_statistics(&candidates, now());
        assert_eq!(stats.total_candidates, 3);
        assert_eq!(stats.categories.sum(), 1);
        assert_eq!(stats.categories.get(Category::NotAFit), 1);
        // (0 + 50 + 70) / 3 = 40
        assert_eq!(stats.average_score, 40);
    }

    #[test]
    fn test_category_counts_never_exceed_total() {
        let labels = [
            Some("Highly Qualified"),
            Some("Qualified"),
            Some("Not a Fit"),
            Some("highly qualified"),
            None,
            Some(""),
        ];
        let candidates: Vec<_> = labels
            .iter()
            .map(|l| candidate(Some(10.0), *l, now()))
            .collect();
        let stats = compute_statistics(&candidates, now());
        for category in Category::ALL {
            assert!(stats.categories.get(category) <= stats.total_candidates);
        }
        assert_eq!(stats.categories.sum(), 3);
        assert!(stats.categories.sum() < stats.total_candidates);
    }

    #[test]
    fn test_sum_equals_total_when_all_recognized() {
        let candidates = vec![
            candidate(Some(1.0), Some("Qualified"), now()),
            candidate(Some(2.0), Some("Not a Fit"), now()),
        ];
        let stats = compute_statistics(&candidates, now());
        assert_eq!(stats.categories.sum(), stats.total_candidates);
    }

    #[test]
    fn test_average_is_order_independent() {
        let mut candidates = vec![
            candidate(Some(33.3), Some("Qualified"), now()),
            candidate(Some(66.7), Some("Qualified"), now()),
            candidate(Some(0.1), None, now()),
            candidate(Some(99.9), Some("Highly Qualified"), now()),
        ];
        let forward = compute_statistics(&candidates, now());
        candidates.reverse();
        let backward = compute_statistics(&candidates, now());
        candidates.swap(0, 2);
        let shuffled = compute_statistics(&candidates, now());
        assert_eq!(forward, backward);
        assert_eq!(forward, shuffled);
    }

    #[test]
    fn test_average_rounds_to_nearest() {
        let candidates = vec![
            candidate(Some(80.0), None, now()),
            candidate(Some(81.0), None, now()),
        ];
        // 80.5 rounds up
        assert_eq!(compute_statistics(&candidates, now()).average_score, 81);

        let candidates = vec![
            candidate(Some(80.0), None, now()),
            candidate(Some(80.0), None, now()),
            candidate(Some(81.0), None, now()),
        ];
        assert_eq!(compute_statistics(&candidates, now()).average_score, 80);
    }

    #[test]
    fn test_recent_window_boundaries() {
        assert!(is_recent(now(), now()));
        assert!(is_recent(now() - Duration::days(7), now()));
        assert!(!is_recent(now() - Duration::days(7) - Duration::seconds(1), now()));
        assert!(!is_recent(now() - Duration::days(8), now()));
        assert!(!is_recent(now() + Duration::seconds(1), now()));
    }

    #[test]
    fn test_window_uses_calendar_days() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap();
        // 2024 is a leap year: seven days before March 5 is February 27.
        assert_eq!(
            window_start(&now),
            Utc.with_ymd_and_hms(2024, 2, 27, 9, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_window_across_spring_forward_is_167_hours() {
        // Berlin moved to summer time on 2024-03-31.
        let now = Berlin.with_ymd_and_hms(2024, 4, 2, 12, 0, 0).unwrap();
        let start = window_start(&now);

        assert_eq!(start, Berlin.with_ymd_and_hms(2024, 3, 26, 12, 0, 0).unwrap());
        assert_eq!(now.clone() - start.clone(), Duration::hours(167));
        assert_ne!(start, now.clone() - Duration::hours(168));

        // 168h back is inside a fixed window but outside the calendar one.
        let edge = (now.clone() - Duration::minutes(167 * 60 + 30)).with_timezone(&Utc);
        assert!(!is_recent(edge, now.clone()));
        let stats = compute_statistics(&[candidate(Some(50.0), None, edge)], now);
        assert_eq!(stats.recent_uploads, 0);
    }

    #[test]
    fn test_window_across_fall_back_is_169_hours() {
        // Berlin left summer time on 2024-10-27.
        let now = Berlin.with_ymd_and_hms(2024, 10, 29, 12, 0, 0).unwrap();
        let start = window_start(&now);

        assert_eq!(now.clone() - start, Duration::hours(169));
        let edge = (now.clone() - Duration::minutes(168 * 60 + 30)).with_timezone(&Utc);
        assert!(is_recent(edge, now));
    }

    #[test]
    fn test_window_start_in_dst_gap_moves_forward() {
        // 02:30 on 2024-03-31 never happened in Berlin.
        let now = Berlin.with_ymd_and_hms(2024, 4, 7, 2, 30, 0).unwrap();
        assert_eq!(
            window_start(&now).with_timezone(&Utc),
            Utc.with_ymd_and_hms(2024, 3, 31, 1, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_unparseable_timestamp_is_not_recent() {
        let mut odd = candidate(Some(10.0), None, now());
        odd.upload_date = Some("yesterday".to_string());
        let mut missing = candidate(Some(10.0), None, now());
        missing.upload_date = None;
        let stats = compute_statistics(&[odd, missing], now());
        assert_eq!(stats.recent_uploads, 0);
        assert_eq!(stats.total_candidates, 2);
    }

    #[test]
    fn test_duplicates_are_not_deduplicated() {
        let mut a = candidate(Some(60.0), Some("Qualified"), now());
        a.id = Some(crate::models::CandidateId::Number(1));
        let stats = compute_statistics(&[a.clone(), a], now());
        assert_eq!(stats.total_candidates, 2);
        assert_eq!(stats.categories.qualified, 2);
    }

    #[test]
    fn test_cards() {
        let stats = DashboardStatistics {
            total_candidates: 4,
            categories: CategoryCounts {
                highly_qualified: 2,
                qualified: 1,
                not_a_fit: 0,
            },
            average_score: 77,
            recent_uploads: 3,
        };
        let cards = stats.cards();
        assert_eq!(cards.len(), 4);
        assert_eq!(cards[0].value, "4");
        assert_eq!(cards[1].value, "2");
        assert_eq!(cards[2].title, "Average Score");
        assert_eq!(cards[2].value, "77%");
        assert_eq!(cards[3].value, "3");
    }
}
