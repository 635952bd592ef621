// Savings Challenge - Core Library
// Exposes all modules for use in the CLI, the TUI, and tests

pub mod errors;
pub mod theme;
pub mod entities;
pub mod db;
pub mod color_manager;
pub mod navigation;
pub mod config;
pub mod backend;
pub mod export;

// Re-export commonly used types
pub use errors::{BackendError, ChallengeError, ConfigError, ThemeError};
pub use theme::{ColorScheme, Rgb, ThemeMode};
pub use entities::{validate_goal, Challenge, ColorService, Frequency, Savings, SchemeLoad, Stats};
pub use db::{
    setup_database,
    insert_challenge, update_challenge, get_challenge, get_all_challenges, delete_challenge,
    insert_savings, get_all_savings, get_savings_for_profile, get_savings_for_challenge, delete_savings,
    upsert_stats, get_stats, refresh_stats,
    fetch_color_services, insert_color_service, update_color_service,
};
pub use color_manager::ColorManager;
pub use navigation::{AppState, ChallengeRouter, Tab, TabBarState};
pub use config::{AppConfig, BackendConfig, Environment};
pub use backend::BackendClient;
pub use export::{export_savings_csv, export_savings_to_path};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
