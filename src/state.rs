use std::collections::{HashMap, VecDeque};

use crate::config::{Settings, next_window};
use crate::form::{FormSummary, Venue};
use crate::outcome::{EmptyReason, Outcome};
use crate::patterns::{PatternMatch, PatternQuery, ValuePattern};
use crate::player_dataset::PlayerMatchRow;
use crate::props::{PropCandidate, PropQuery, RecentAverages, recent_averages};
use crate::rankings::{SquadRow, player_log};
use crate::store::{Comparison, DataStore, SEASON_WINDOW};

const MAX_LOGS: usize = 200;
const PLAYER_AVERAGE_MATCHES: usize = 10;
const PROP_LINE_STEP: f64 = 0.5;
const PROP_LINE_MIN: f64 = 0.5;
const PROP_LINE_MAX: f64 = 10.0;
const PROP_MIN_MATCHES: usize = 3;
const PROP_MAX_MATCHES: usize = 20;
const PATTERN_SAMPLES: [usize; 4] = [10, 20, 30, 50];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Compare,
    Team,
    Squad,
    Props,
    Patterns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickSide {
    Home,
    Away,
}

pub struct AppState {
    pub store: DataStore,
    pub screen: Screen,
    /// `None` lists every division.
    pub division: Option<String>,
    pub teams: Vec<String>,
    pub home_idx: usize,
    pub away_idx: usize,
    pub side: PickSide,
    pub window: usize,
    pub player_idx: usize,
    pub prop_query: PropQuery,
    pub props: Outcome<Vec<PropCandidate>>,
    pub pattern_query: PatternQuery,
    pub patterns: Outcome<Vec<ValuePattern>>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    comparisons: HashMap<(String, String, usize), Comparison>,
}

impl AppState {
    pub fn new(store: DataStore, settings: &Settings) -> Self {
        let teams = store.season_teams(None);
        let away_idx = if teams.len() > 1 { 1 } else { 0 };
        let prop_query = PropQuery::default();
        let props = store.props(&prop_query);
        let pattern_query = PatternQuery::default();
        let patterns = store.value_patterns(&pattern_query);
        let mut state = Self {
            store,
            screen: Screen::Compare,
            division: None,
            teams,
            home_idx: 0,
            away_idx,
            side: PickSide::Home,
            window: settings.form_window,
            player_idx: 0,
            prop_query,
            props,
            pattern_query,
            patterns,
            logs: VecDeque::new(),
            help_overlay: false,
            comparisons: HashMap::new(),
        };
        state.log_load_summary();
        state.refresh();
        state
    }

    fn log_load_summary(&mut self) {
        let matches = self.store.match_report().clone();
        let players = self.store.player_report().clone();
        self.push_log(format!(
            "[INFO] {} matches from {} files, {} player rows",
            matches.rows_loaded,
            matches.files_loaded.len(),
            players.rows_loaded
        ));
        for (file, reason) in matches.files_skipped.iter().chain(&players.files_skipped) {
            self.push_log(format!("[WARN] skipped {file}: {reason}"));
        }
        let malformed = matches.rows_malformed + players.rows_malformed;
        if malformed > 0 {
            self.push_log(format!("[WARN] {malformed} malformed rows skipped"));
        }
        if self.teams.is_empty() {
            self.push_log("[WARN] no match data: add CSV files to the data directory");
        }
    }

    pub fn home_team(&self) -> Option<&str> {
        self.teams.get(self.home_idx).map(String::as_str)
    }

    pub fn away_team(&self) -> Option<&str> {
        self.teams.get(self.away_idx).map(String::as_str)
    }

    /// Team driven by `j/k`: the side picked with `h/a`.
    pub fn active_team(&self) -> Option<&str> {
        match self.side {
            PickSide::Home => self.home_team(),
            PickSide::Away => self.away_team(),
        }
    }

    pub fn select_next(&mut self) {
        self.move_team(1);
    }

    pub fn select_prev(&mut self) {
        self.move_team(-1);
    }

    fn move_team(&mut self, step: isize) {
        let total = self.teams.len();
        if total == 0 {
            return;
        }
        let idx = match self.side {
            PickSide::Home => &mut self.home_idx,
            PickSide::Away => &mut self.away_idx,
        };
        *idx = (*idx as isize + step).rem_euclid(total as isize) as usize;
        self.player_idx = 0;
        self.refresh();
    }

    /// Steps through all divisions, then back to the unfiltered list.
    pub fn cycle_division(&mut self) {
        let divisions = self.store.divisions();
        self.division = match &self.division {
            None => divisions.first().cloned(),
            Some(current) => divisions
                .iter()
                .skip_while(|d| *d != current)
                .nth(1)
                .cloned(),
        };
        self.teams = self.store.season_teams(self.division.as_deref());
        self.home_idx = 0;
        self.away_idx = if self.teams.len() > 1 { 1 } else { 0 };
        self.player_idx = 0;
        self.refresh();
    }

    pub fn pick_side(&mut self, side: PickSide) {
        self.side = side;
        self.player_idx = 0;
    }

    pub fn cycle_window(&mut self) {
        self.window = next_window(self.window);
        self.refresh();
    }

    pub fn select_next_player(&mut self) {
        let total = self.squad().as_ready().map_or(0, Vec::len);
        if total > 0 {
            self.player_idx = (self.player_idx + 1) % total;
        }
    }

    pub fn select_prev_player(&mut self) {
        let total = self.squad().as_ready().map_or(0, Vec::len);
        if total > 0 {
            self.player_idx = (self.player_idx + total - 1) % total;
        }
    }

    /// Computes the comparison for the current pair unless it is already cached.
    pub fn refresh(&mut self) {
        let (Some(home), Some(away)) = (self.home_team(), self.away_team()) else {
            return;
        };
        let key = (home.to_string(), away.to_string(), self.window);
        if self.comparisons.contains_key(&key) {
            return;
        }
        let comparison = self.store.compare(&key.0, &key.1, self.window);
        if let Outcome::Empty(reason) = &comparison.home_players {
            log::debug!("{}: {reason}", key.0);
        }
        self.comparisons.insert(key, comparison);
    }

    pub fn comparison(&self) -> Option<&Comparison> {
        let key = (
            self.home_team()?.to_string(),
            self.away_team()?.to_string(),
            self.window,
        );
        self.comparisons.get(&key)
    }

    pub fn team_form(&self) -> Outcome<FormSummary> {
        match self.active_team() {
            Some(team) => self.store.form(team, SEASON_WINDOW, Venue::All),
            None => Outcome::Empty(EmptyReason::NoData),
        }
    }

    pub fn squad(&self) -> Outcome<Vec<SquadRow>> {
        match self.active_team() {
            Some(team) => self.store.squad(team),
            None => Outcome::Empty(EmptyReason::NoData),
        }
    }

    pub fn selected_player(&self) -> Option<String> {
        self.squad()
            .ready()
            .and_then(|rows| rows.into_iter().nth(self.player_idx))
            .map(|row| row.player)
    }

    pub fn player_detail(&self) -> Option<(String, Vec<&PlayerMatchRow>, Option<RecentAverages>)> {
        let player = self.selected_player()?;
        let rows = self.store.players();
        let log = player_log(rows, &player);
        let averages = recent_averages(rows, &player, PLAYER_AVERAGE_MATCHES);
        Some((player, log, averages))
    }

    pub fn cycle_market(&mut self) {
        self.prop_query.market = self.prop_query.market.next();
        self.rescan_props();
    }

    pub fn raise_line(&mut self) {
        self.prop_query.line = (self.prop_query.line + PROP_LINE_STEP).min(PROP_LINE_MAX);
        self.rescan_props();
    }

    pub fn lower_line(&mut self) {
        self.prop_query.line = (self.prop_query.line - PROP_LINE_STEP).max(PROP_LINE_MIN);
        self.rescan_props();
    }

    pub fn cycle_min_matches(&mut self) {
        let next = self.prop_query.min_matches + 1;
        self.prop_query.min_matches = if next > PROP_MAX_MATCHES {
            PROP_MIN_MATCHES
        } else {
            next
        };
        self.rescan_props();
    }

    pub fn cycle_min_success(&mut self) {
        let next = self.prop_query.min_success_pct + 10.0;
        self.prop_query.min_success_pct = if next > 100.0 { 50.0 } else { next };
        self.rescan_props();
    }

    fn rescan_props(&mut self) {
        self.props = self.store.props(&self.prop_query);
    }

    pub fn cycle_pattern_sample(&mut self) {
        let current = self.pattern_query.min_sample;
        self.pattern_query.min_sample = PATTERN_SAMPLES
            .iter()
            .copied()
            .find(|n| *n > current)
            .unwrap_or(PATTERN_SAMPLES[0]);
        self.patterns = self.store.value_patterns(&self.pattern_query);
    }

    /// Value patterns the current home/away pair already satisfies.
    pub fn pattern_matches(&self) -> Outcome<Vec<PatternMatch>> {
        let patterns = match &self.patterns {
            Outcome::Ready(patterns) => patterns,
            Outcome::Empty(reason) => return Outcome::Empty(reason.clone()),
            Outcome::Malformed(issue) => return Outcome::Malformed(issue.clone()),
        };
        match (self.home_team(), self.away_team()) {
            (Some(home), Some(away)) => {
                self.store
                    .pattern_matches(home, away, &self.pattern_query, patterns)
            }
            _ => Outcome::Empty(EmptyReason::NoData),
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}
