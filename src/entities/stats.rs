// 📈 Stats Entry - per-profile summary derived from savings + challenges
//
// Stored so the home screen can render without rescanning every deposit;
// recomputed whenever savings change.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::challenge::Challenge;
use super::savings::Savings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub profile_id: String,
    pub total_saved: f64,
    pub savings_count: i64,
    pub challenges_completed: i64,

    /// Consecutive days with at least one deposit, ending today or yesterday
    pub current_streak_days: i64,
    pub longest_streak_days: i64,

    pub updated_at: DateTime<Utc>,
}

impl Stats {
    pub fn empty(profile_id: &str) -> Self {
        Stats {
            profile_id: profile_id.to_string(),
            total_saved: 0.0,
            savings_count: 0,
            challenges_completed: 0,
            current_streak_days: 0,
            longest_streak_days: 0,
            updated_at: Utc::now(),
        }
    }

    /// Rebuild the summary for one profile. Savings owned by other profiles are ignored.
    pub fn compute(
        profile_id: &str,
        savings: &[Savings],
        challenges: &[Challenge],
        today: NaiveDate,
    ) -> Self {
        let mut stats = Stats::empty(profile_id);

        let own: Vec<&Savings> = savings.iter().filter(|s| s.profile_id == profile_id).collect();

        stats.total_saved = own.iter().map(|s| s.amount).sum();
        stats.savings_count = own.len() as i64;
        stats.challenges_completed = challenges.iter().filter(|c| c.completed).count() as i64;

        let days: BTreeSet<NaiveDate> = own.iter().map(|s| s.saved_on).collect();
        stats.longest_streak_days = longest_run(&days);
        stats.current_streak_days = current_run(&days, today);

        stats
    }
}

fn longest_run(days: &BTreeSet<NaiveDate>) -> i64 {
    let mut longest = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;

    for day in days {
        run = match prev {
            Some(p) if *day - p == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(*day);
    }

    longest
}

fn current_run(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> i64 {
    // A streak stays alive until the end of the day after the last deposit
    let mut cursor = if days.contains(&today) {
        today
    } else {
        today - Duration::days(1)
    };

    let mut run = 0;
    while days.contains(&cursor) {
        run += 1;
        cursor -= Duration::days(1);
    }
    run
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::challenge::Frequency;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn saving(profile: &str, amount: f64, day: u32) -> Savings {
        Savings::new(profile.to_string(), amount, date(day))
    }

    #[test]
    fn test_compute_totals_for_profile_only() {
        let savings = vec![
            saving("alice", 10.0, 1),
            saving("alice", 15.0, 2),
            saving("bob", 100.0, 2),
        ];

        let stats = Stats::compute("alice", &savings, &[], date(2));
        assert_eq!(stats.total_saved, 25.0);
        assert_eq!(stats.savings_count, 2);
        assert_eq!(stats.profile_id, "alice");
    }

    #[test]
    fn test_streaks() {
        // Runs: 1-3 (3 days), 6-7 (2 days)
        let savings = vec![
            saving("alice", 1.0, 1),
            saving("alice", 1.0, 2),
            saving("alice", 1.0, 2),
            saving("alice", 1.0, 3),
            saving("alice", 1.0, 6),
            saving("alice", 1.0, 7),
        ];

        let stats = Stats::compute("alice", &savings, &[], date(7));
        assert_eq!(stats.longest_streak_days, 3);
        assert_eq!(stats.current_streak_days, 2);

        // Nothing saved yet today: streak still counts through yesterday
        let stats = Stats::compute("alice", &savings, &[], date(8));
        assert_eq!(stats.current_streak_days, 2);

        // Missed a whole day: streak broken
        let stats = Stats::compute("alice", &savings, &[], date(9));
        assert_eq!(stats.current_streak_days, 0);
    }

    #[test]
    fn test_counts_completed_challenges() {
        let mut done = Challenge::new("a".to_string(), 10.0, Frequency::Daily, date(1)).unwrap();
        done.mark_completed();
        let open = Challenge::new("b".to_string(), 10.0, Frequency::Daily, date(1)).unwrap();

        let stats = Stats::compute("alice", &[], &[done, open], date(1));
        assert_eq!(stats.challenges_completed, 1);
        assert_eq!(stats.longest_streak_days, 0);
        assert_eq!(stats.current_streak_days, 0);
    }
}
