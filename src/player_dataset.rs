use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;

use crate::match_dataset::{LoadReport, decode_text, file_label, parse_count, parse_day_first_date};
use crate::outcome::{EmptyReason, Outcome, RowIssue};

pub const DEFAULT_PLAYER_FILE: &str = "jugadores_raw.csv";

/// One player appearance, as published by the player-statistics provider.
/// `team` uses that provider's spelling, not the fixture files'.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerMatchRow {
    pub player: String,
    pub team: String,
    pub date: Option<NaiveDate>,
    pub game: Option<String>,
    pub shots: u32,
    pub shots_on_target: u32,
    pub fouls: u32,
    pub yellow_cards: u32,
    pub goals: u32,
    pub assists: u32,
    pub minutes: u32,
}

#[derive(Debug, Clone, Default)]
pub struct PlayerTable {
    pub rows: Vec<PlayerMatchRow>,
    pub report: LoadReport,
}

/// Loads the player file. A missing or unreadable file gives an empty table.
///
/// With `season_start` set, only rows dated strictly after it are kept.
pub fn load_player_file(path: &Path, season_start: Option<NaiveDate>) -> PlayerTable {
    let mut table = PlayerTable::default();
    let label = file_label(path);
    if !path.exists() {
        log::warn!("no player data at {}", path.display());
        return table;
    }

    let parsed = fs::read(path)
        .with_context(|| format!("read {}", path.display()))
        .and_then(|bytes| parse_player_csv(&decode_text(&bytes), &label));
    let (rows, issues) = match parsed {
        Ok(parsed) => parsed,
        Err(err) => {
            log::warn!("skipped player file {label}: {err:#}");
            table.report.skip_file(&label, format!("{err:#}"));
            return table;
        }
    };

    for issue in issues {
        log::warn!("skipped row {issue}");
        table.report.record_issue(issue);
    }
    let total = rows.len();
    table.rows = filter_season(rows, season_start);
    log::info!(
        "loaded {label}: {} player rows ({} before season filter)",
        table.rows.len(),
        total
    );
    table.report.rows_loaded = table.rows.len();
    table.report.files_loaded.push(label);
    table
}

pub fn filter_season(
    rows: Vec<PlayerMatchRow>,
    season_start: Option<NaiveDate>,
) -> Vec<PlayerMatchRow> {
    let Some(cutoff) = season_start else {
        return rows;
    };
    rows.into_iter()
        .filter(|row| row.date.is_some_and(|d| d > cutoff))
        .collect()
}

pub fn parse_player_csv(text: &str, file: &str) -> Result<(Vec<PlayerMatchRow>, Vec<RowIssue>)> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());
    let headers = reader.headers().context("read csv header")?.clone();
    let cols = PlayerColumns::from_headers(&headers)?;

    let mut rows = Vec::new();
    let mut issues = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let line = idx as u64 + 2;
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                issues.push(RowIssue {
                    file: file.to_string(),
                    line,
                    reason: err.to_string(),
                });
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or(line);
        match parse_player_row(&record, &cols) {
            Outcome::Ready(row) => rows.push(row),
            Outcome::Empty(_) => {}
            Outcome::Malformed(mut issue) => {
                issue.file = file.to_string();
                issue.line = line;
                issues.push(issue);
            }
        }
    }
    Ok((rows, issues))
}

struct PlayerColumns {
    player: usize,
    team: usize,
    date: Option<usize>,
    game: Option<usize>,
    shots: Option<usize>,
    shots_on_target: Option<usize>,
    fouls: Option<usize>,
    yellow_cards: Option<usize>,
    goals: Option<usize>,
    assists: Option<usize>,
    minutes: Option<usize>,
}

impl PlayerColumns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        // Duplicate header names resolve to the first column, as for match files.
        let mut index: HashMap<String, usize> = HashMap::new();
        for (idx, name) in headers.iter().enumerate() {
            let mut key = name.trim_start_matches('\u{feff}').trim().to_lowercase();
            if key == "squad" {
                key = "team".to_string();
            }
            index.entry(key).or_insert(idx);
        }
        let col = |name: &str| index.get(name).copied();
        let player = col("player").ok_or_else(|| anyhow!("missing required column: player"))?;
        let team = col("team").ok_or_else(|| anyhow!("missing required column: team"))?;
        Ok(Self {
            player,
            team,
            date: col("date"),
            game: col("game"),
            shots: col("sh"),
            shots_on_target: col("sot"),
            fouls: col("fls"),
            yellow_cards: col("crdy"),
            goals: col("gls"),
            assists: col("ast"),
            minutes: col("min"),
        })
    }
}

fn parse_player_row(record: &StringRecord, cols: &PlayerColumns) -> Outcome<PlayerMatchRow> {
    if record.iter().all(|field| field.trim().is_empty()) {
        return Outcome::Empty(EmptyReason::BlankRow);
    }
    let field = |idx: Option<usize>| idx.and_then(|idx| record.get(idx)).unwrap_or("").trim();

    let player = field(Some(cols.player));
    let team = field(Some(cols.team));
    if player.is_empty() || team.is_empty() {
        return Outcome::Malformed(RowIssue {
            file: String::new(),
            line: 0,
            reason: "missing player or team".to_string(),
        });
    }

    // Counts are coerced: anything non-numeric reads as zero.
    let count = |idx: Option<usize>| parse_count(field(idx)).unwrap_or(0);
    let game = Some(field(cols.game))
        .filter(|g| !g.is_empty())
        .map(|g| g.to_string());

    Outcome::Ready(PlayerMatchRow {
        player: player.to_string(),
        team: team.to_string(),
        date: parse_day_first_date(field(cols.date)),
        game,
        shots: count(cols.shots),
        shots_on_target: count(cols.shots_on_target),
        fouls: count(cols.fouls),
        yellow_cards: count(cols.yellow_cards),
        goals: count(cols.goals),
        assists: count(cols.assists),
        minutes: count(cols.minutes),
    })
}

/// Distinct team labels in first-seen order; this is the universe the
/// reconciler searches.
pub fn team_universe(rows: &[PlayerMatchRow]) -> Vec<&str> {
    let mut seen = HashSet::new();
    rows.iter()
        .map(|row| row.team.as_str())
        .filter(|team| seen.insert(*team))
        .collect()
}

/// Orders appearances newest first, with undated rows last.
pub fn newest_first(a: &PlayerMatchRow, b: &PlayerMatchRow) -> Ordering {
    match (a.date, b.date) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
