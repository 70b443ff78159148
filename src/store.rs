use chrono::NaiveDate;
use serde::Serialize;

use crate::config::Settings;
use crate::form::{FormSummary, Venue, compute_form};
use crate::h2h::{H2hRow, head_to_head};
use crate::match_dataset::{LoadReport, Match, after, divisions, load_match_dir, teams};
use crate::outcome::{EmptyReason, Outcome};
use crate::patterns::{PatternMatch, PatternQuery, ValuePattern, match_patterns, scan_patterns};
use crate::player_dataset::{PlayerMatchRow, load_player_file};
use crate::props::{PropCandidate, PropQuery, scan_props};
use crate::rankings::{
    PlayerRankings, RankingConfig, SquadRow, rank_players, resolve_team, squad_summary,
};
use crate::team_names::TeamNameMap;

/// Matches shown on the single-team screen: one full league season.
pub const SEASON_WINDOW: usize = 38;

/// Loaded tables plus the name map. Built once; every query borrows from it.
#[derive(Debug, Clone)]
pub struct DataStore {
    matches: Vec<Match>,
    players: Vec<PlayerMatchRow>,
    team_map: TeamNameMap,
    season_start: Option<NaiveDate>,
    ranking: RankingConfig,
    match_report: LoadReport,
    player_report: LoadReport,
}

/// Everything the compare screen shows for one fixture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub home_team: String,
    pub away_team: String,
    pub window: usize,
    pub home_form: Outcome<FormSummary>,
    pub away_form: Outcome<FormSummary>,
    pub home_players: Outcome<PlayerRankings>,
    pub away_players: Outcome<PlayerRankings>,
    pub head_to_head: Outcome<Vec<H2hRow>>,
}

impl DataStore {
    /// Reads the data directory named by `settings`. Missing files give empty tables.
    pub fn load(settings: &Settings) -> Self {
        let match_table = load_match_dir(&settings.data_dir);
        let player_table = load_player_file(&settings.player_path(), settings.season_start);
        log::info!(
            "store ready: {} matches from {} files, {} player rows, {} name overrides",
            match_table.matches.len(),
            match_table.report.files_loaded.len(),
            player_table.rows.len(),
            TeamNameMap::laliga().len()
        );

        let mut store = Self::new(
            match_table.matches,
            player_table.rows,
            TeamNameMap::laliga().clone(),
        )
        .with_season_start(settings.season_start)
        .with_ranking_config(RankingConfig {
            min_appearances: settings.min_appearances,
            ..RankingConfig::default()
        });
        store.match_report = match_table.report;
        store.player_report = player_table.report;
        store
    }

    /// Store over tables the caller already holds. Matches are re-sorted by date.
    pub fn new(mut matches: Vec<Match>, players: Vec<PlayerMatchRow>, team_map: TeamNameMap) -> Self {
        matches.sort_by_key(|m| m.date);
        Self {
            matches,
            players,
            team_map,
            season_start: None,
            ranking: RankingConfig::default(),
            match_report: LoadReport::default(),
            player_report: LoadReport::default(),
        }
    }

    pub fn with_season_start(mut self, season_start: Option<NaiveDate>) -> Self {
        self.season_start = season_start;
        self
    }

    pub fn with_ranking_config(mut self, ranking: RankingConfig) -> Self {
        self.ranking = ranking;
        self
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn players(&self) -> &[PlayerMatchRow] {
        &self.players
    }

    pub fn team_map(&self) -> &TeamNameMap {
        &self.team_map
    }

    pub fn ranking_config(&self) -> &RankingConfig {
        &self.ranking
    }

    pub fn match_report(&self) -> &LoadReport {
        &self.match_report
    }

    pub fn player_report(&self) -> &LoadReport {
        &self.player_report
    }

    /// Matches after the season cutoff.
    pub fn season_matches(&self) -> &[Match] {
        after(&self.matches, self.season_start)
    }

    /// Selectable teams: every side seen in the current season, or in the
    /// whole history when the season has no matches yet.
    pub fn season_teams(&self, division: Option<&str>) -> Vec<String> {
        let season = teams(self.season_matches(), division);
        if !season.is_empty() {
            return season;
        }
        teams(&self.matches, division)
    }

    pub fn divisions(&self) -> Vec<String> {
        divisions(&self.matches)
    }

    pub fn form(&self, team: &str, window: usize, venue: Venue) -> Outcome<FormSummary> {
        if self.matches.is_empty() {
            return Outcome::Empty(EmptyReason::NoData);
        }
        let summary = compute_form(self.season_matches(), team, window, venue);
        if summary.is_none() {
            log::debug!("form '{team}' ({}, last {window}): no matches", venue.label());
        }
        Outcome::from_option(summary, EmptyReason::NoMatches)
    }

    pub fn rankings(&self, team: &str) -> Outcome<PlayerRankings> {
        if self.players.is_empty() {
            return Outcome::Empty(EmptyReason::NoPlayerData);
        }
        let rankings = rank_players(&self.players, team, &self.team_map, &self.ranking);
        if rankings.is_none() {
            log::debug!("rankings: '{team}' not found in player table");
        }
        Outcome::from_option(rankings, EmptyReason::UnknownTeam(team.to_string()))
    }

    pub fn squad(&self, team: &str) -> Outcome<Vec<SquadRow>> {
        if self.players.is_empty() {
            return Outcome::Empty(EmptyReason::NoPlayerData);
        }
        Outcome::from_option(
            squad_summary(&self.players, team, &self.team_map),
            EmptyReason::UnknownTeam(team.to_string()),
        )
    }

    /// The player-table label for a fixture-file team name.
    pub fn player_team(&self, team: &str) -> Option<&str> {
        resolve_team(&self.players, team, &self.team_map)
    }

    /// Meetings over the full history, not only the current season.
    pub fn head_to_head(&self, a: &str, b: &str) -> Outcome<Vec<H2hRow>> {
        if self.matches.is_empty() {
            return Outcome::Empty(EmptyReason::NoData);
        }
        Outcome::from_option(head_to_head(&self.matches, a, b), EmptyReason::NoMeetings)
    }

    pub fn props(&self, query: &PropQuery) -> Outcome<Vec<PropCandidate>> {
        if self.players.is_empty() {
            return Outcome::Empty(EmptyReason::NoPlayerData);
        }
        let found = scan_props(&self.players, query);
        Outcome::from_option(Some(found).filter(|f| !f.is_empty()), EmptyReason::NoMatches)
    }

    /// Value patterns over the full history; every priced fixture is a sample.
    pub fn value_patterns(&self, query: &PatternQuery) -> Outcome<Vec<ValuePattern>> {
        if self.matches.is_empty() {
            return Outcome::Empty(EmptyReason::NoData);
        }
        let found = scan_patterns(&self.matches, query);
        Outcome::from_option(Some(found).filter(|f| !f.is_empty()), EmptyReason::NoMatches)
    }

    /// Checks `patterns` against the season form of the two sides over the
    /// last `query.window` matches at their venue.
    pub fn pattern_matches(
        &self,
        home: &str,
        away: &str,
        query: &PatternQuery,
        patterns: &[ValuePattern],
    ) -> Outcome<Vec<PatternMatch>> {
        if self.matches.is_empty() {
            return Outcome::Empty(EmptyReason::NoData);
        }
        let home_form = self.form(home, query.window, Venue::Home).ready();
        let away_form = self.form(away, query.window, Venue::Away).ready();
        let found = match_patterns(home_form.as_ref(), away_form.as_ref(), patterns);
        Outcome::from_option(Some(found).filter(|f| !f.is_empty()), EmptyReason::NoMatches)
    }

    /// Home side's home form against the away side's away form.
    pub fn compare(&self, home: &str, away: &str, window: usize) -> Comparison {
        Comparison {
            home_team: home.to_string(),
            away_team: away.to_string(),
            window,
            home_form: self.form(home, window, Venue::Home),
            away_form: self.form(away, window, Venue::Away),
            home_players: self.rankings(home),
            away_players: self.rankings(away),
            head_to_head: self.head_to_head(home, away),
        }
    }
}
