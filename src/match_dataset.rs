use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;

use crate::outcome::{EmptyReason, Outcome, RowIssue};

/// Files whose name contains this marker hold player rows, not fixtures.
pub const PLAYER_FILE_MARKER: &str = "jugadores";

const MAX_REPORTED_ISSUES: usize = 50;

const REQUIRED_COLUMNS: [&str; 5] = ["Date", "HomeTeam", "AwayTeam", "FTHG", "FTAG"];

// Bookmaker fallbacks, most preferred first.
const ODDS_COLUMN_SETS: [[&str; 3]; 3] = [
    ["B365H", "B365D", "B365A"],
    ["BWH", "BWD", "BWA"],
    ["WHH", "WHD", "WHA"],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SideStats {
    pub goals: u32,
    pub shots: u32,
    pub shots_on_target: u32,
    pub corners: u32,
    pub yellow_cards: u32,
    pub fouls: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Odds {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

/// One played fixture. Stats are stored per side; there is no team-centric
/// view, so consumers go through [`Match::side_of`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub date: NaiveDate,
    pub division: String,
    pub home_team: String,
    pub away_team: String,
    pub home: SideStats,
    pub away: SideStats,
    pub odds: Option<Odds>,
}

impl Match {
    pub fn side_of(&self, team: &str) -> Option<Side> {
        if self.home_team == team {
            Some(Side::Home)
        } else if self.away_team == team {
            Some(Side::Away)
        } else {
            None
        }
    }

    pub fn stats(&self, side: Side) -> &SideStats {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    pub fn team(&self, side: Side) -> &str {
        match side {
            Side::Home => &self.home_team,
            Side::Away => &self.away_team,
        }
    }

    pub fn is_between(&self, a: &str, b: &str) -> bool {
        (self.home_team == a && self.away_team == b) || (self.home_team == b && self.away_team == a)
    }
}

/// Tier number from a division code: "SP1" -> 1, "SP2" -> 2.
pub fn division_tier(division: &str) -> Option<u8> {
    let last = division.trim().chars().last()?;
    last.to_digit(10).and_then(|d| u8::try_from(d).ok())
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub files_loaded: Vec<String>,
    pub files_skipped: Vec<(String, String)>,
    pub rows_loaded: usize,
    pub rows_malformed: usize,
    /// First few malformed rows; `rows_malformed` has the full count.
    pub issues: Vec<RowIssue>,
}

impl LoadReport {
    pub fn record_issue(&mut self, issue: RowIssue) {
        self.rows_malformed += 1;
        if self.issues.len() < MAX_REPORTED_ISSUES {
            self.issues.push(issue);
        }
    }

    pub fn skip_file(&mut self, file: &str, reason: String) {
        self.files_skipped.push((file.to_string(), reason));
    }
}

#[derive(Debug, Clone, Default)]
pub struct MatchTable {
    pub matches: Vec<Match>,
    pub report: LoadReport,
}

/// Fixture CSVs in `dir`, sorted by file name.
pub fn match_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("read data dir {}", dir.display()))?;
    let mut out = Vec::new();
    for entry in entries {
        let path = entry.context("read dir entry")?.path();
        if !path.is_file() {
            continue;
        }
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        let is_player_file = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.to_lowercase().contains(PLAYER_FILE_MARKER));
        if is_csv && !is_player_file {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

/// Loads and concatenates every fixture file in `dir`, sorted by date.
///
/// Never fails: a missing directory yields an empty table, unreadable files and
/// malformed rows are skipped and recorded in the report.
pub fn load_match_dir(dir: &Path) -> MatchTable {
    let mut table = MatchTable::default();
    let files = match match_files(dir) {
        Ok(files) => files,
        Err(err) => {
            log::warn!("no match data: {err:#}");
            return table;
        }
    };
    if files.is_empty() {
        log::warn!("no match csv files in {}", dir.display());
    }

    for path in files {
        let label = file_label(&path);
        match load_match_file(&path) {
            Ok((rows, issues)) => {
                log::info!("loaded {label}: {} matches, {} skipped", rows.len(), issues.len());
                for issue in issues {
                    log::warn!("skipped row {issue}");
                    table.report.record_issue(issue);
                }
                table.report.rows_loaded += rows.len();
                table.report.files_loaded.push(label);
                table.matches.extend(rows);
            }
            Err(err) => {
                log::warn!("skipped file {label}: {err:#}");
                table.report.skip_file(&label, format!("{err:#}"));
            }
        }
    }

    table.matches.sort_by_key(|m| m.date);
    table
}

pub fn load_match_file(path: &Path) -> Result<(Vec<Match>, Vec<RowIssue>)> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let text = decode_text(&bytes);
    let division = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_string();
    parse_match_csv(&text, &file_label(path), &division)
}

/// Parses one fixture file. `fallback_division` is used when the file has no `Div` column.
pub fn parse_match_csv(
    text: &str,
    file: &str,
    fallback_division: &str,
) -> Result<(Vec<Match>, Vec<RowIssue>)> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());
    let headers = reader.headers().context("read csv header")?.clone();
    let cols = MatchColumns::from_headers(&headers)?;

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
        match parse_match_row(&record, &cols, fallback_division) {
            Outcome::Ready(m) => rows.push(m),
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

struct MatchColumns {
    date: usize,
    home_team: usize,
    away_team: usize,
    home_goals: usize,
    away_goals: usize,
    division: Option<usize>,
    home_stats: StatColumns,
    away_stats: StatColumns,
    odds: Option<[usize; 3]>,
}

struct StatColumns {
    shots: Option<usize>,
    shots_on_target: Option<usize>,
    corners: Option<usize>,
    yellow_cards: Option<usize>,
    fouls: Option<usize>,
}

impl MatchColumns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        // Duplicate header names resolve to the first column.
        let mut index: HashMap<&str, usize> = HashMap::new();
        for (idx, name) in headers.iter().enumerate() {
            index.entry(name.trim_start_matches('\u{feff}')).or_insert(idx);
        }

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|name| !index.contains_key(name))
            .collect();
        if !missing.is_empty() {
            return Err(anyhow!("missing required columns: {}", missing.join(", ")));
        }

        let col = |name: &str| index.get(name).copied();
        let odds = ODDS_COLUMN_SETS.iter().find_map(|set| {
            Some([col(set[0])?, col(set[1])?, col(set[2])?])
        });

        Ok(Self {
            date: index["Date"],
            home_team: index["HomeTeam"],
            away_team: index["AwayTeam"],
            home_goals: index["FTHG"],
            away_goals: index["FTAG"],
            division: col("Div"),
            home_stats: StatColumns {
                shots: col("HS"),
                shots_on_target: col("HST"),
                corners: col("HC"),
                yellow_cards: col("HY"),
                fouls: col("HF"),
            },
            away_stats: StatColumns {
                shots: col("AS"),
                shots_on_target: col("AST"),
                corners: col("AC"),
                yellow_cards: col("AY"),
                fouls: col("AF"),
            },
            odds,
        })
    }
}

fn parse_match_row(
    record: &StringRecord,
    cols: &MatchColumns,
    fallback_division: &str,
) -> Outcome<Match> {
    if record.iter().all(|field| field.trim().is_empty()) {
        return Outcome::Empty(EmptyReason::BlankRow);
    }
    match try_parse_match_row(record, cols, fallback_division) {
        Ok(m) => Outcome::Ready(m),
        Err(reason) => Outcome::Malformed(RowIssue {
            file: String::new(),
            line: 0,
            reason,
        }),
    }
}

fn try_parse_match_row(
    record: &StringRecord,
    cols: &MatchColumns,
    fallback_division: &str,
) -> std::result::Result<Match, String> {
    let field = |idx: usize| record.get(idx).unwrap_or("").trim();

    let raw_date = field(cols.date);
    let date = parse_day_first_date(raw_date).ok_or_else(|| format!("invalid date '{raw_date}'"))?;

    let home_team = field(cols.home_team);
    let away_team = field(cols.away_team);
    if home_team.is_empty() || away_team.is_empty() {
        return Err("missing team name".to_string());
    }

    let raw_home_goals = field(cols.home_goals);
    let raw_away_goals = field(cols.away_goals);
    let home_goals =
        parse_count(raw_home_goals).ok_or_else(|| format!("invalid FTHG '{raw_home_goals}'"))?;
    let away_goals =
        parse_count(raw_away_goals).ok_or_else(|| format!("invalid FTAG '{raw_away_goals}'"))?;

    let division = cols
        .division
        .map(field)
        .filter(|div| !div.is_empty())
        .unwrap_or(fallback_division)
        .to_string();

    let home = side_stats(record, &cols.home_stats, home_goals)?;
    let away = side_stats(record, &cols.away_stats, away_goals)?;

    let odds = cols.odds.and_then(|[h, d, a]| {
        Some(Odds {
            home: parse_odd(field(h))?,
            draw: parse_odd(field(d))?,
            away: parse_odd(field(a))?,
        })
    });

    Ok(Match {
        date,
        division,
        home_team: home_team.to_string(),
        away_team: away_team.to_string(),
        home,
        away,
        odds,
    })
}

fn side_stats(
    record: &StringRecord,
    cols: &StatColumns,
    goals: u32,
) -> std::result::Result<SideStats, String> {
    let stat = |idx: Option<usize>| -> std::result::Result<u32, String> {
        let Some(idx) = idx else {
            return Ok(0);
        };
        let raw = record.get(idx).unwrap_or("").trim();
        if raw.is_empty() {
            return Ok(0);
        }
        parse_count(raw).ok_or_else(|| format!("non-numeric stat '{raw}'"))
    };
    Ok(SideStats {
        goals,
        shots: stat(cols.shots)?,
        shots_on_target: stat(cols.shots_on_target)?,
        corners: stat(cols.corners)?,
        yellow_cards: stat(cols.yellow_cards)?,
        fouls: stat(cols.fouls)?,
    })
}

/// Non-negative whole number; accepts "2" and "2.0".
pub(crate) fn parse_count(raw: &str) -> Option<u32> {
    let s = raw.trim();
    if let Ok(n) = s.parse::<u32>() {
        return Some(n);
    }
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 {
        Some(v as u32)
    } else {
        None
    }
}

fn parse_odd(raw: &str) -> Option<f64> {
    let v = raw.trim().parse::<f64>().ok()?;
    (v.is_finite() && v > 0.0).then_some(v)
}

/// Day-first date parser for provider dates: `dd/mm/yyyy`, `dd/mm/yy`,
/// `yyyy-mm-dd`, `dd-mm-yyyy` (separators `/`, `-`, `.`), with an optional
/// trailing time that is ignored.
pub fn parse_day_first_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.trim().split([' ', 'T']).next()?;
    let parts: Vec<&str> = date_part.split(['/', '-', '.']).collect();
    let [a, b, c] = parts.as_slice() else {
        return None;
    };
    if ![a, b, c].iter().all(|p| !p.is_empty() && p.bytes().all(|ch| ch.is_ascii_digit())) {
        return None;
    }

    if a.len() == 4 {
        let year = a.parse::<i32>().ok()?;
        return NaiveDate::from_ymd_opt(year, b.parse().ok()?, c.parse().ok()?);
    }

    let day = a.parse::<u32>().ok()?;
    let month = b.parse::<u32>().ok()?;
    let year = match c.len() {
        4 => c.parse::<i32>().ok()?,
        2 => {
            let yy = c.parse::<i32>().ok()?;
            if yy <= 68 { 2000 + yy } else { 1900 + yy }
        }
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// UTF-8 with BOM stripped, or Latin-1 when the bytes are not valid UTF-8.
pub(crate) fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|b| char::from(*b)).collect(),
    }
}

pub(crate) fn file_label(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// The date-sorted suffix of `matches` strictly after `cutoff`.
pub fn after(matches: &[Match], cutoff: Option<NaiveDate>) -> &[Match] {
    let Some(cutoff) = cutoff else {
        return matches;
    };
    let start = matches.partition_point(|m| m.date <= cutoff);
    &matches[start..]
}

/// Sorted unique team names from either side, optionally restricted to one division.
pub fn teams(matches: &[Match], division: Option<&str>) -> Vec<String> {
    matches
        .iter()
        .filter(|m| division.is_none_or(|div| m.division == div))
        .flat_map(|m| [m.home_team.clone(), m.away_team.clone()])
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorted unique division codes.
pub fn divisions(matches: &[Match]) -> Vec<String> {
    matches
        .iter()
        .map(|m| m.division.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
