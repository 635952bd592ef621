// 💰 Savings Entity - one amount put aside on a given day
//
// profile_id references the backend profile that owns the record; it's a plain
// string here, referential checks belong to the backend.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Savings {
    pub id: String,
    pub profile_id: String,

    /// Challenge this deposit counts towards, if any
    pub challenge_id: Option<String>,

    pub amount: f64,
    pub note: String,
    pub saved_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Savings {
    pub fn new(profile_id: String, amount: f64, saved_on: NaiveDate) -> Self {
        Savings {
            id: uuid::Uuid::new_v4().to_string(),
            profile_id,
            challenge_id: None,
            amount,
            note: String::new(),
            saved_on,
            created_at: Utc::now(),
        }
    }

    pub fn with_challenge(mut self, challenge_id: &str) -> Self {
        self.challenge_id = Some(challenge_id.to_string());
        self
    }

    pub fn with_note(mut self, note: &str) -> Self {
        self.note = note.to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_savings_builder() {
        let day = NaiveDate::from_ymd_opt(2026, 5, 4).unwrap();
        let savings = Savings::new("profile-9".to_string(), 12.5, day)
            .with_challenge("challenge-1")
            .with_note("skipped coffee");

        assert!(!savings.id.is_empty());
        assert_eq!(savings.profile_id, "profile-9");
        assert_eq!(savings.challenge_id.as_deref(), Some("challenge-1"));
        assert_eq!(savings.note, "skipped coffee");
        assert_eq!(savings.saved_on, day);
    }

    #[test]
    fn test_ids_are_unique() {
        let day = NaiveDate::from_ymd_opt(2026, 5, 4).unwrap();
        let a = Savings::new("p".to_string(), 1.0, day);
        let b = Savings::new("p".to_string(), 1.0, day);
        assert_ne!(a.id, b.id);
    }
}
