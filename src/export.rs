// Savings ledger export - CSV for spreadsheets
//
// One row per deposit, newest first as handed in. The challenge column carries
// the challenge title, or stays empty for deposits not tied to a challenge.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use crate::entities::{Challenge, Savings};

pub const LEDGER_HEADER: [&str; 5] = ["date", "amount", "challenge", "note", "profile_id"];

#[derive(Debug, Serialize)]
struct LedgerRow<'a> {
    date: String,
    amount: String,
    challenge: &'a str,
    note: &'a str,
    profile_id: &'a str,
}

pub fn export_savings_csv<W: Write>(
    writer: W,
    savings: &[Savings],
    challenges: &[Challenge],
) -> Result<usize> {
    let titles: HashMap<&str, &str> = challenges
        .iter()
        .map(|c| (c.id.as_str(), c.title.as_str()))
        .collect();

    // Header written up front so an empty ledger still produces a valid file
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(LEDGER_HEADER)?;

    for s in savings {
        let challenge = s
            .challenge_id
            .as_deref()
            .and_then(|id| titles.get(id).copied())
            .unwrap_or("");

        wtr.serialize(LedgerRow {
            date: s.saved_on.format("%Y-%m-%d").to_string(),
            amount: format!("{:.2}", s.amount),
            challenge,
            note: &s.note,
            profile_id: &s.profile_id,
        })?;
    }

    wtr.flush()?;
    Ok(savings.len())
}

pub fn export_savings_to_path(
    path: &Path,
    savings: &[Savings],
    challenges: &[Challenge],
) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    export_savings_csv(file, savings, challenges)
}
