// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use log::{error, info};
use rusqlite::Connection;
use std::env;
use std::path::Path;

use savings_challenge::{
    export_savings_to_path, get_all_challenges, get_challenge, get_savings_for_profile,
    insert_challenge, insert_savings, refresh_stats, setup_database, update_challenge,
    validate_goal, AppConfig, BackendClient, Challenge, ColorManager, ColorScheme, Frequency, Savings,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Fail fast: no command runs with missing or placeholder credentials
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = run(&config) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(config: &AppConfig) -> Result<()> {
    let backend = BackendClient::new(&config.backend, config.environment)?;

    let conn = Connection::open(&config.database_path)
        .with_context(|| format!("opening {}", config.database_path.display()))?;
    setup_database(&conn)?;

    let args: Vec<String> = env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("ui");
    let rest = if args.is_empty() { &args[..] } else { &args[1..] };

    match command {
        "init" => run_init(&conn, config),
        "add-challenge" => run_add_challenge(&conn, rest),
        "save" => run_save(&conn, config, rest),
        "complete" => run_complete(&conn, rest),
        "stats" => run_stats(&conn, config),
        "theme" => run_theme(&conn, rest),
        "export" => run_export(&conn, config, rest),
        "push" => run_push(&conn, config, &backend),
        "ui" => run_ui_mode(&conn, config),
        other => {
            print_usage();
            bail!("unknown command '{}'", other)
        }
    }
}

fn print_usage() {
    println!("Usage: savings <command>");
    println!();
    println!("  init                                   create the database and default theme");
    println!("  add-challenge <title> <goal> [freq]    freq: daily | weekly | monthly");
    println!("  save <amount> [challenge-id] [note]    record a deposit for today");
    println!("  complete <challenge-id>                mark a challenge as completed");
    println!("  stats                                  recompute and print stats");
    println!("  theme [light|dark]                     show or set the color scheme");
    println!("  export <file.csv>                      write the savings ledger as CSV");
    println!("  push                                   upload savings to the backend (remote feature)");
    println!("  ui                                     interactive mode (default)");
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn run_init(conn: &Connection, config: &AppConfig) -> Result<()> {
    let service = ColorManager::new(conn).color_service()?;
    println!("✓ Database ready at {}", config.database_path.display());
    println!("✓ Color service {}", service.id);
    println!("✓ Environment: {}", config.environment.as_str());
    Ok(())
}

fn run_add_challenge(conn: &Connection, args: &[String]) -> Result<()> {
    let (title, goal) = match args {
        [title, goal, ..] => (title, goal),
        _ => bail!("usage: add-challenge <title> <goal> [daily|weekly|monthly]"),
    };

    let goal = parse_goal(goal)?;

    let frequency = match args.get(2) {
        Some(f) => Frequency::parse(f).with_context(|| format!("unknown frequency '{}'", f))?,
        None => Frequency::Weekly,
    };

    let challenge = Challenge::new(title.clone(), goal, frequency, today())?;
    insert_challenge(conn, &challenge)?;
    info!("Created challenge {}", challenge.id);
    println!("✓ {} ({})", challenge.title, challenge.id);
    Ok(())
}

/// Same rule as Challenge::new: finite and positive ("NaN", "inf", "-5" all rejected)
fn parse_goal(raw: &str) -> Result<f64> {
    let goal: f64 = raw
        .parse()
        .with_context(|| format!("goal '{}' is not a number", raw))?;
    Ok(validate_goal(goal)?)
}

fn run_save(conn: &Connection, config: &AppConfig, args: &[String]) -> Result<()> {
    let amount: f64 = match args.first() {
        Some(a) => a.parse().with_context(|| format!("amount '{}' is not a number", a))?,
        None => bail!("usage: save <amount> [challenge-id] [note]"),
    };

    let mut savings = Savings::new(config.profile_id.clone(), amount, today());

    if let Some(challenge_id) = args.get(1) {
        if get_challenge(conn, challenge_id)?.is_none() {
            bail!("no challenge with id {}", challenge_id);
        }
        savings = savings.with_challenge(challenge_id);
    }
    if args.len() > 2 {
        savings = savings.with_note(&args[2..].join(" "));
    }

    insert_savings(conn, &savings)?;
    let stats = refresh_stats(conn, &config.profile_id, today())?;

    println!("✓ Saved {:.2}", amount);
    println!("  Total: {:.2}  Streak: {} days", stats.total_saved, stats.current_streak_days);
    Ok(())
}

fn run_complete(conn: &Connection, args: &[String]) -> Result<()> {
    let id = args.first().context("usage: complete <challenge-id>")?;
    let mut challenge = get_challenge(conn, id)?
        .with_context(|| format!("no challenge with id {}", id))?;

    challenge.mark_completed();
    update_challenge(conn, &challenge)?;
    println!("🎉 {} completed", challenge.title);
    Ok(())
}

fn run_stats(conn: &Connection, config: &AppConfig) -> Result<()> {
    let stats = refresh_stats(conn, &config.profile_id, today())?;
    let challenges = get_all_challenges(conn)?;
    let savings = get_savings_for_profile(conn, &config.profile_id)?;

    println!("📊 Stats for {}", stats.profile_id);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Total saved:          {:.2}", stats.total_saved);
    println!("Deposits:             {}", stats.savings_count);
    println!("Challenges completed: {}", stats.challenges_completed);
    println!("Current streak:       {} days", stats.current_streak_days);
    println!("Longest streak:       {} days", stats.longest_streak_days);

    if !challenges.is_empty() {
        println!();
        for c in &challenges {
            println!(
                "  {:<30} {:>6.1}%  {}",
                c.title,
                c.progress(&savings) * 100.0,
                if c.completed { "done" } else { "" }
            );
        }
    }
    Ok(())
}

fn run_theme(conn: &Connection, args: &[String]) -> Result<()> {
    let manager = ColorManager::new(conn);

    match args.first() {
        Some(name) => {
            let scheme = ColorScheme::preset(name)?;
            manager.set_scheme(&scheme)?;
            println!("✓ Theme set to {}", scheme.name);
        }
        None => {
            let load = manager.current_scheme()?;
            if load.is_corrupt() {
                println!("⚠ Stored theme could not be read, showing default");
            }
            let scheme = load.scheme();
            println!("Theme: {} ({})", scheme.name, scheme.mode.as_str());
            println!("  primary    {}", scheme.primary);
            println!("  accent     {}", scheme.accent);
            println!("  background {}", scheme.background);
        }
    }
    Ok(())
}

fn run_export(conn: &Connection, config: &AppConfig, args: &[String]) -> Result<()> {
    let path = args.first().context("usage: export <file.csv>")?;
    let savings = get_savings_for_profile(conn, &config.profile_id)?;
    let challenges = get_all_challenges(conn)?;

    let count = export_savings_to_path(Path::new(path), &savings, &challenges)?;
    println!("✓ Exported {} rows to {}", count, path);
    Ok(())
}

#[cfg(feature = "remote")]
fn run_push(conn: &Connection, config: &AppConfig, backend: &BackendClient) -> Result<()> {
    let savings = get_savings_for_profile(conn, &config.profile_id)?;
    let challenges = get_all_challenges(conn)?;

    let runtime = tokio::runtime::Runtime::new()?;
    let (pushed_challenges, pushed_savings) = runtime.block_on(async {
        let c = backend.insert_rows("challenges", &challenges).await?;
        let s = backend.insert_rows("savings", &savings).await?;
        Ok::<_, savings_challenge::BackendError>((c, s))
    })?;

    println!(
        "✓ Pushed {} challenges and {} savings to {}",
        pushed_challenges,
        pushed_savings,
        backend.base_url()
    );
    Ok(())
}

#[cfg(not(feature = "remote"))]
fn run_push(_conn: &Connection, _config: &AppConfig, _backend: &BackendClient) -> Result<()> {
    bail!("push not available; rebuild with --features remote")
}

#[cfg(feature = "tui")]
fn run_ui_mode(conn: &Connection, config: &AppConfig) -> Result<()> {
    let challenges = get_all_challenges(conn)?;
    let savings = get_savings_for_profile(conn, &config.profile_id)?;
    let stats = refresh_stats(conn, &config.profile_id, today())?;

    let mut app = ui::App::new(challenges, savings, stats, ColorManager::new(conn))?;
    ui::run_ui(&mut app)
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_conn: &Connection, _config: &AppConfig) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_goal() {
        assert_eq!(parse_goal("250").unwrap(), 250.0);

        for bad in ["0", "-5", "NaN", "inf", "abc"] {
            assert!(parse_goal(bad).is_err(), "goal '{}' should be rejected", bad);
        }
    }
}
