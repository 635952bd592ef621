use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::entities::{Challenge, ColorService, Frequency, Savings, Stats};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery (no-op for in-memory databases)
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS challenges (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            goal_amount REAL NOT NULL,
            currency TEXT NOT NULL,
            frequency TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT,
            completed INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS savings (
            id TEXT PRIMARY KEY,
            profile_id TEXT NOT NULL,
            challenge_id TEXT,
            amount REAL NOT NULL,
            note TEXT NOT NULL DEFAULT '',
            saved_on TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_savings_profile ON savings(profile_id, saved_on)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS stats (
            profile_id TEXT PRIMARY KEY,
            total_saved REAL NOT NULL,
            savings_count INTEGER NOT NULL,
            challenges_completed INTEGER NOT NULL,
            current_streak_days INTEGER NOT NULL,
            longest_streak_days INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    // rowid keeps insertion order for "first row" lookups
    conn.execute(
        "CREATE TABLE IF NOT EXISTS color_services (
            id TEXT PRIMARY KEY,
            scheme_data BLOB NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

// ============================================================================
// ROW HELPERS
// ============================================================================

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn datetime_at(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn date_at(row: &Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let s: String = row.get(idx)?;
    NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|e| conversion_error(idx, e))
}

fn optional_date_at(row: &Row, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

// ============================================================================
// CHALLENGES
// ============================================================================

const CHALLENGE_COLUMNS: &str = "id, title, description, goal_amount, currency, frequency,
                start_date, end_date, completed, created_at";

fn challenge_from_row(row: &Row) -> rusqlite::Result<Challenge> {
    let frequency_str: String = row.get(5)?;
    let frequency = Frequency::parse(&frequency_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            Type::Text,
            format!("unknown frequency '{}'", frequency_str).into(),
        )
    })?;

    Ok(Challenge {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        goal_amount: row.get(3)?,
        currency: row.get(4)?,
        frequency,
        start_date: date_at(row, 6)?,
        end_date: optional_date_at(row, 7)?,
        completed: row.get(8)?,
        created_at: datetime_at(row, 9)?,
    })
}

pub fn insert_challenge(conn: &Connection, challenge: &Challenge) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO challenges ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            CHALLENGE_COLUMNS
        ),
        params![
            challenge.id,
            challenge.title,
            challenge.description,
            challenge.goal_amount,
            challenge.currency,
            challenge.frequency.as_str(),
            format_date(challenge.start_date),
            challenge.end_date.map(format_date),
            challenge.completed,
            challenge.created_at.to_rfc3339(),
        ],
    )
    .with_context(|| format!("inserting challenge {}", challenge.id))?;

    Ok(())
}

/// Returns false when no row has that id
pub fn update_challenge(conn: &Connection, challenge: &Challenge) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE challenges
         SET title = ?2, description = ?3, goal_amount = ?4, currency = ?5,
             frequency = ?6, start_date = ?7, end_date = ?8, completed = ?9
         WHERE id = ?1",
        params![
            challenge.id,
            challenge.title,
            challenge.description,
            challenge.goal_amount,
            challenge.currency,
            challenge.frequency.as_str(),
            format_date(challenge.start_date),
            challenge.end_date.map(format_date),
            challenge.completed,
        ],
    )?;

    Ok(changed > 0)
}

pub fn get_challenge(conn: &Connection, id: &str) -> Result<Option<Challenge>> {
    let challenge = conn
        .query_row(
            &format!("SELECT {} FROM challenges WHERE id = ?1", CHALLENGE_COLUMNS),
            [id],
            challenge_from_row,
        )
        .optional()?;

    Ok(challenge)
}

pub fn get_all_challenges(conn: &Connection) -> Result<Vec<Challenge>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM challenges ORDER BY start_date DESC, created_at DESC",
        CHALLENGE_COLUMNS
    ))?;

    let challenges = stmt
        .query_map([], challenge_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(challenges)
}

/// Deleting a challenge detaches its savings rather than deleting them
pub fn delete_challenge(conn: &Connection, id: &str) -> Result<bool> {
    conn.execute(
        "UPDATE savings SET challenge_id = NULL WHERE challenge_id = ?1",
        [id],
    )?;
    let deleted = conn.execute("DELETE FROM challenges WHERE id = ?1", [id])?;
    Ok(deleted > 0)
}

// ============================================================================
// SAVINGS
// ============================================================================

const SAVINGS_COLUMNS: &str = "id, profile_id, challenge_id, amount, note, saved_on, created_at";

fn savings_from_row(row: &Row) -> rusqlite::Result<Savings> {
    Ok(Savings {
        id: row.get(0)?,
        profile_id: row.get(1)?,
        challenge_id: row.get(2)?,
        amount: row.get(3)?,
        note: row.get(4)?,
        saved_on: date_at(row, 5)?,
        created_at: datetime_at(row, 6)?,
    })
}

pub fn insert_savings(conn: &Connection, savings: &Savings) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO savings ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            SAVINGS_COLUMNS
        ),
        params![
            savings.id,
            savings.profile_id,
            savings.challenge_id,
            savings.amount,
            savings.note,
            format_date(savings.saved_on),
            savings.created_at.to_rfc3339(),
        ],
    )
    .with_context(|| format!("inserting savings {}", savings.id))?;

    Ok(())
}

fn query_savings(conn: &Connection, filter: &str, arg: Option<&str>) -> Result<Vec<Savings>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM savings {} ORDER BY saved_on DESC, created_at DESC",
        SAVINGS_COLUMNS, filter
    ))?;

    let rows = match arg {
        Some(arg) => stmt.query_map([arg], savings_from_row)?,
        None => stmt.query_map([], savings_from_row)?,
    };

    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn get_all_savings(conn: &Connection) -> Result<Vec<Savings>> {
    query_savings(conn, "", None)
}

pub fn get_savings_for_profile(conn: &Connection, profile_id: &str) -> Result<Vec<Savings>> {
    query_savings(conn, "WHERE profile_id = ?1", Some(profile_id))
}

pub fn get_savings_for_challenge(conn: &Connection, challenge_id: &str) -> Result<Vec<Savings>> {
    query_savings(conn, "WHERE challenge_id = ?1", Some(challenge_id))
}

pub fn delete_savings(conn: &Connection, id: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM savings WHERE id = ?1", [id])?;
    Ok(deleted > 0)
}

// ============================================================================
// STATS
// ============================================================================

pub fn upsert_stats(conn: &Connection, stats: &Stats) -> Result<()> {
    conn.execute(
        "INSERT INTO stats (
            profile_id, total_saved, savings_count, challenges_completed,
            current_streak_days, longest_streak_days, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(profile_id) DO UPDATE SET
            total_saved = excluded.total_saved,
            savings_count = excluded.savings_count,
            challenges_completed = excluded.challenges_completed,
            current_streak_days = excluded.current_streak_days,
            longest_streak_days = excluded.longest_streak_days,
            updated_at = excluded.updated_at",
        params![
            stats.profile_id,
            stats.total_saved,
            stats.savings_count,
            stats.challenges_completed,
            stats.current_streak_days,
            stats.longest_streak_days,
            stats.updated_at.to_rfc3339(),
        ],
    )?;

    Ok(())
}

pub fn get_stats(conn: &Connection, profile_id: &str) -> Result<Option<Stats>> {
    let stats = conn
        .query_row(
            "SELECT profile_id, total_saved, savings_count, challenges_completed,
                    current_streak_days, longest_streak_days, updated_at
             FROM stats WHERE profile_id = ?1",
            [profile_id],
            |row| {
                Ok(Stats {
                    profile_id: row.get(0)?,
                    total_saved: row.get(1)?,
                    savings_count: row.get(2)?,
                    challenges_completed: row.get(3)?,
                    current_streak_days: row.get(4)?,
                    longest_streak_days: row.get(5)?,
                    updated_at: datetime_at(row, 6)?,
                })
            },
        )
        .optional()?;

    Ok(stats)
}

/// Recompute a profile's stats from stored savings + challenges and persist them
pub fn refresh_stats(conn: &Connection, profile_id: &str, today: NaiveDate) -> Result<Stats> {
    let savings = get_savings_for_profile(conn, profile_id)?;
    let challenges = get_all_challenges(conn)?;

    let stats = Stats::compute(profile_id, &savings, &challenges, today);
    upsert_stats(conn, &stats)?;
    Ok(stats)
}

// ============================================================================
// COLOR SERVICES
// ============================================================================

/// All rows, oldest first
pub fn fetch_color_services(conn: &Connection) -> Result<Vec<ColorService>> {
    let mut stmt = conn.prepare(
        "SELECT id, scheme_data, updated_at FROM color_services ORDER BY rowid ASC",
    )?;

    let services = stmt
        .query_map([], |row| {
            Ok(ColorService {
                id: row.get(0)?,
                scheme_data: row.get(1)?,
                updated_at: datetime_at(row, 2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(services)
}

pub fn insert_color_service(conn: &Connection, service: &ColorService) -> Result<()> {
    conn.execute(
        "INSERT INTO color_services (id, scheme_data, updated_at) VALUES (?1, ?2, ?3)",
        params![service.id, service.scheme_data, service.updated_at.to_rfc3339()],
    )?;
    Ok(())
}

pub fn update_color_service(conn: &Connection, service: &ColorService) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE color_services SET scheme_data = ?2, updated_at = ?3 WHERE id = ?1",
        params![service.id, service.scheme_data, service.updated_at.to_rfc3339()],
    )?;
    Ok(changed > 0)
}
