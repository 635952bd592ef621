// End-to-end flow through the public API: config → database → records → theme → navigation

use chrono::NaiveDate;
use rusqlite::Connection;

use savings_challenge::{
    get_all_challenges, get_savings_for_challenge, insert_challenge, insert_savings,
    refresh_stats, setup_database, AppConfig, AppState, BackendClient, Challenge, ColorManager,
    ColorScheme, Environment, Frequency, Savings, SchemeLoad, Tab,
};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
}

#[test]
fn test_full_savings_flow() {
    let config = AppConfig::from_json(
        r#"{
            "environment": "development",
            "backend": { "url": "http://localhost:54321", "api_key": "local-anon-key" },
            "profile_id": "profile-42"
        }"#,
    )
    .unwrap();
    assert_eq!(config.environment, Environment::Development);

    let client = BackendClient::new(&config.backend, config.environment).unwrap();
    assert_eq!(client.rest_url("savings"), "http://localhost:54321/rest/v1/savings");

    let conn = Connection::open_in_memory().unwrap();
    setup_database(&conn).unwrap();

    let challenge = Challenge::new("52 week challenge".to_string(), 1378.0, Frequency::Weekly, day(1)).unwrap();
    insert_challenge(&conn, &challenge).unwrap();

    for (d, amount) in [(1, 1.0), (2, 2.0), (3, 3.0)] {
        let s = Savings::new(config.profile_id.clone(), amount, day(d)).with_challenge(&challenge.id);
        insert_savings(&conn, &s).unwrap();
    }

    let stats = refresh_stats(&conn, &config.profile_id, day(3)).unwrap();
    assert_eq!(stats.total_saved, 6.0);
    assert_eq!(stats.current_streak_days, 3);

    let attached = get_savings_for_challenge(&conn, &challenge.id).unwrap();
    assert_eq!(challenge.saved_amount(&attached), 6.0);

    // Theme: same row every time, settings survive
    let colors = ColorManager::new(&conn);
    let first = colors.color_service().unwrap();
    colors.set_scheme(&ColorScheme::dark()).unwrap();
    let again = colors.color_service().unwrap();
    assert_eq!(first.id, again.id);
    assert!(matches!(colors.current_scheme().unwrap(), SchemeLoad::Decoded(s) if s.is_dark()));

    // Navigation: open the stored challenge
    let stored = get_all_challenges(&conn).unwrap();
    let mut state = AppState::new();
    state.open_challenge(&stored[0].id);
    assert_eq!(state.router.path(), &[challenge.id.clone()]);
    assert_eq!(state.tab_bar.selected, Tab::Challenges);

    state.close_challenge();
    assert!(state.tab_bar.visible);
}

#[test]
fn test_production_rejects_placeholder_config() {
    let err = AppConfig::from_json(
        r#"{
            "environment": "production",
            "backend": { "url": "", "api_key": "" }
        }"#,
    )
    .unwrap_err();

    assert!(err.to_string().contains("must not be empty"));
}
