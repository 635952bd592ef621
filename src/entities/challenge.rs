// 🏁 Challenge Entity - a savings goal with a cadence
//
// "Save $500 by putting something aside every week"
//
// Identity is the UUID; everything else can be edited in place and written
// back with db::update_challenge.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::savings::Savings;
use crate::errors::ChallengeError;

/// Goals must be finite and strictly positive
pub fn validate_goal(goal_amount: f64) -> Result<f64, ChallengeError> {
    if goal_amount.is_finite() && goal_amount > 0.0 {
        Ok(goal_amount)
    } else {
        Err(ChallengeError::InvalidGoal(goal_amount))
    }
}

// ============================================================================
// FREQUENCY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
        }
    }

    /// Case-insensitive parse, as stored in the database or typed on the CLI
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Some(Frequency::Daily),
            "weekly" => Some(Frequency::Weekly),
            "monthly" => Some(Frequency::Monthly),
            _ => None,
        }
    }
}

// ============================================================================
// CHALLENGE ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    /// Stable identity (UUID)
    pub id: String,

    pub title: String,
    pub description: String,

    /// Target amount to reach (always positive)
    pub goal_amount: f64,

    /// ISO currency code
    pub currency: String,

    pub frequency: Frequency,
    pub start_date: NaiveDate,

    /// None = open-ended
    pub end_date: Option<NaiveDate>,

    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Challenge {
    pub fn new(
        title: String,
        goal_amount: f64,
        frequency: Frequency,
        start_date: NaiveDate,
    ) -> Result<Self, ChallengeError> {
        let goal_amount = validate_goal(goal_amount)?;

        Ok(Challenge {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            description: String::new(),
            goal_amount,
            currency: "USD".to_string(),
            frequency,
            start_date,
            end_date: None,
            completed: false,
            created_at: Utc::now(),
        })
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = description;
        self
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Sum of all savings attached to this challenge
    pub fn saved_amount(&self, savings: &[Savings]) -> f64 {
        savings
            .iter()
            .filter(|s| s.challenge_id.as_deref() == Some(self.id.as_str()))
            .map(|s| s.amount)
            .sum()
    }

    /// Fraction of the goal reached, clamped to [0, 1]; 0 for an unusable goal
    pub fn progress(&self, savings: &[Savings]) -> f64 {
        if validate_goal(self.goal_amount).is_err() {
            return 0.0;
        }
        let ratio = self.saved_amount(savings) / self.goal_amount;
        if ratio.is_nan() {
            return 0.0;
        }
        ratio.clamp(0.0, 1.0)
    }

    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        if self.completed || date < self.start_date {
            return false;
        }
        match self.end_date {
            Some(end) => date <= end,
            None => true,
        }
    }

    pub fn mark_completed(&mut self) {
        self.completed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_challenge_creation() {
        let challenge = Challenge::new(
            "Emergency fund".to_string(),
            1000.0,
            Frequency::Weekly,
            date(2026, 1, 1),
        )
        .unwrap();

        assert!(!challenge.id.is_empty());
        assert_eq!(challenge.title, "Emergency fund");
        assert_eq!(challenge.currency, "USD");
        assert!(!challenge.completed);
        assert!(challenge.end_date.is_none());
    }

    #[test]
    fn test_progress_only_counts_own_savings() {
        let challenge = Challenge::new("Trip".to_string(), 200.0, Frequency::Daily, date(2026, 1, 1)).unwrap();

        let savings = vec![
            Savings::new("profile-1".to_string(), 50.0, date(2026, 1, 2)).with_challenge(&challenge.id),
            Savings::new("profile-1".to_string(), 25.0, date(2026, 1, 3)).with_challenge(&challenge.id),
            Savings::new("profile-1".to_string(), 500.0, date(2026, 1, 3)),
        ];

        assert_eq!(challenge.saved_amount(&savings), 75.0);
        assert!((challenge.progress(&savings) - 0.375).abs() < f64::EPSILON);
    }

    #[test]
    fn test_progress_is_clamped() {
        let challenge = Challenge::new("Small".to_string(), 10.0, Frequency::Daily, date(2026, 1, 1)).unwrap();
        let savings = vec![
            Savings::new("p".to_string(), 40.0, date(2026, 1, 2)).with_challenge(&challenge.id),
        ];
        assert_eq!(challenge.progress(&savings), 1.0);
        assert_eq!(challenge.progress(&[]), 0.0);
    }

    #[test]
    fn test_is_active_on() {
        let mut challenge = Challenge::new("Q1".to_string(), 300.0, Frequency::Monthly, date(2026, 1, 1))
            .unwrap()
            .with_end_date(date(2026, 3, 31));

        assert!(!challenge.is_active_on(date(2025, 12, 31)));
        assert!(challenge.is_active_on(date(2026, 1, 1)));
        assert!(challenge.is_active_on(date(2026, 3, 31)));
        assert!(!challenge.is_active_on(date(2026, 4, 1)));

        challenge.mark_completed();
        assert!(!challenge.is_active_on(date(2026, 2, 1)));
    }

    #[test]
    fn test_rejects_unusable_goals() {
        for goal in [-50.0, 0.0, f64::NAN, f64::INFINITY] {
            let result = Challenge::new("x".to_string(), goal, Frequency::Daily, date(2026, 1, 1));
            assert!(
                matches!(result, Err(ChallengeError::InvalidGoal(_))),
                "goal {} should be rejected",
                goal
            );
        }
        assert_eq!(validate_goal(12.5), Ok(12.5));
    }

    #[test]
    fn test_progress_with_corrupted_goal_is_zero() {
        let mut challenge = Challenge::new("x".to_string(), 10.0, Frequency::Daily, date(2026, 1, 1)).unwrap();
        let savings = vec![
            Savings::new("p".to_string(), 5.0, date(2026, 1, 2)).with_challenge(&challenge.id),
        ];

        // Goal edited in place or loaded from a bad row
        for goal in [f64::NAN, 0.0, -10.0, f64::INFINITY] {
            challenge.goal_amount = goal;
            assert_eq!(challenge.progress(&savings), 0.0, "goal {}", goal);
        }
    }

    #[test]
    fn test_frequency_parse() {
        assert_eq!(Frequency::parse("WEEKLY"), Some(Frequency::Weekly));
        assert_eq!(Frequency::parse(" daily "), Some(Frequency::Daily));
        assert_eq!(Frequency::parse("yearly"), None);
    }
}
