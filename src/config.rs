use std::env;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::player_dataset::DEFAULT_PLAYER_FILE;
use crate::rankings::DEFAULT_MIN_APPEARANCES;

const APP_DIR: &str = "liga_terminal";
const DEFAULT_SEASON_START: &str = "2025-08-01";
const DEFAULT_SEASON_CODE: &str = "2526";
const DEFAULT_DIVISIONS: &[&str] = &["SP1", "SP2"];
pub const DEFAULT_FORM_WINDOW: usize = 5;
pub const FORM_WINDOWS: [usize; 3] = [5, 10, 20];

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub player_file: String,
    /// Season views keep rows dated strictly after this day.
    pub season_start: Option<NaiveDate>,
    pub form_window: usize,
    pub min_appearances: usize,
    pub season_code: String,
    pub divisions: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            player_file: DEFAULT_PLAYER_FILE.to_string(),
            season_start: NaiveDate::parse_from_str(DEFAULT_SEASON_START, "%Y-%m-%d").ok(),
            form_window: DEFAULT_FORM_WINDOW,
            min_appearances: DEFAULT_MIN_APPEARANCES,
            season_code: DEFAULT_SEASON_CODE.to_string(),
            divisions: DEFAULT_DIVISIONS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any key lookup. Unparseable values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Settings::default();
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string());

        if let Some(dir) = value("LIGA_DATA_DIR").filter(|v| !v.is_empty()) {
            settings.data_dir = PathBuf::from(dir);
        }
        if let Some(file) = value("LIGA_PLAYER_FILE").filter(|v| !v.is_empty()) {
            settings.player_file = file;
        }
        if let Some(raw) = value("LIGA_SEASON_START") {
            if raw.is_empty() {
                settings.season_start = None;
            } else {
                match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
                    Ok(date) => settings.season_start = Some(date),
                    Err(_) => log::warn!("LIGA_SEASON_START: invalid date '{raw}', keeping default"),
                }
            }
        }
        if let Some(n) = parse_positive(value("LIGA_FORM_WINDOW"), "LIGA_FORM_WINDOW") {
            settings.form_window = n;
        }
        if let Some(n) = parse_positive(value("LIGA_MIN_APPEARANCES"), "LIGA_MIN_APPEARANCES") {
            settings.min_appearances = n;
        }
        if let Some(code) = value("LIGA_SEASON_CODE").filter(|v| !v.is_empty()) {
            settings.season_code = code;
        }
        if let Some(raw) = value("LIGA_DIVISIONS") {
            let divisions = parse_list(&raw);
            if divisions.is_empty() {
                log::warn!("LIGA_DIVISIONS: empty list, keeping default");
            } else {
                settings.divisions = divisions;
            }
        }
        settings
    }

    pub fn player_path(&self) -> PathBuf {
        self.data_dir.join(&self.player_file)
    }
}

fn parse_positive(raw: Option<String>, key: &str) -> Option<usize> {
    let raw = raw?;
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            log::warn!("{key}: expected a positive integer, got '{raw}'");
            None
        }
    }
}

pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split([',', ';', ' '])
        .map(|part| part.trim().to_ascii_uppercase())
        .filter(|part| !part.is_empty())
        .collect()
}

fn default_data_dir() -> PathBuf {
    if Path::new("DATOS").is_dir() {
        PathBuf::from("DATOS")
    } else {
        PathBuf::from("datos")
    }
}

/// Per-user cache directory: `$XDG_CACHE_HOME/liga_terminal` or `~/.cache/liga_terminal`.
pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(APP_DIR));
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(APP_DIR))
}

/// Next entry of [`FORM_WINDOWS`] after `current`, wrapping around.
pub fn next_window(current: usize) -> usize {
    FORM_WINDOWS
        .iter()
        .copied()
        .find(|w| *w > current)
        .unwrap_or(FORM_WINDOWS[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_env() {
        let s = settings(&[]);
        assert_eq!(s.player_file, "jugadores_raw.csv");
        assert_eq!(s.form_window, 5);
        assert_eq!(s.min_appearances, 2);
        assert_eq!(s.season_start, NaiveDate::from_ymd_opt(2025, 8, 1));
        assert_eq!(s.divisions, vec!["SP1", "SP2"]);
    }

    #[test]
    fn overrides_and_bad_values() {
        let s = settings(&[
            ("LIGA_DATA_DIR", "/tmp/liga"),
            ("LIGA_SEASON_START", ""),
            ("LIGA_FORM_WINDOW", "zero"),
            ("LIGA_MIN_APPEARANCES", "3"),
            ("LIGA_DIVISIONS", "sp1; e0"),
        ]);
        assert_eq!(s.data_dir, PathBuf::from("/tmp/liga"));
        assert_eq!(s.player_path(), PathBuf::from("/tmp/liga/jugadores_raw.csv"));
        assert_eq!(s.season_start, None);
        assert_eq!(s.form_window, 5);
        assert_eq!(s.min_appearances, 3);
        assert_eq!(s.divisions, vec!["SP1", "E0"]);
    }

    #[test]
    fn window_cycle_wraps() {
        assert_eq!(next_window(5), 10);
        assert_eq!(next_window(10), 20);
        assert_eq!(next_window(20), 5);
        assert_eq!(next_window(7), 10);
    }
}
