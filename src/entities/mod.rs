// Entity Models - persisted records
//
// Flat, independent records. Identity is a UUID string; relationships are
// plain id fields (savings → profile, savings → challenge).

pub mod challenge;
pub mod savings;
pub mod stats;
pub mod color_service;

pub use challenge::{validate_goal, Challenge, Frequency};
pub use savings::Savings;
pub use stats::Stats;
pub use color_service::{ColorService, SchemeLoad};
