use chrono::NaiveDate;
use serde::Serialize;

use crate::match_dataset::{Match, Odds};

pub const MISSING_ODDS: &str = "-";

/// One past meeting, with the fixture's own home/away orientation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct H2hRow {
    pub date: NaiveDate,
    pub division: String,
    pub home_team: String,
    pub away_team: String,
    pub home_goals: u32,
    pub away_goals: u32,
    pub odds: Option<Odds>,
}

impl H2hRow {
    fn from_match(m: &Match) -> Self {
        Self {
            date: m.date,
            division: m.division.clone(),
            home_team: m.home_team.clone(),
            away_team: m.away_team.clone(),
            home_goals: m.home.goals,
            away_goals: m.away.goals,
            odds: m.odds,
        }
    }

    pub fn score(&self) -> String {
        format!("{}-{}", self.home_goals, self.away_goals)
    }

    pub fn date_label(&self) -> String {
        self.date.format("%d/%m/%Y").to_string()
    }

    /// Home / draw / away prices, or a placeholder each when the file had none.
    pub fn odds_labels(&self) -> [String; 3] {
        match self.odds {
            Some(o) => [o.home, o.draw, o.away].map(|v| format!("{v:.2}")),
            None => [(); 3].map(|_| MISSING_ODDS.to_string()),
        }
    }

    pub fn winner(&self) -> Option<&str> {
        if self.home_goals > self.away_goals {
            Some(&self.home_team)
        } else if self.away_goals > self.home_goals {
            Some(&self.away_team)
        } else {
            None
        }
    }
}

/// Every meeting between `a` and `b` in either orientation, newest first.
///
/// Meetings on the same date keep their input order, so swapping the arguments
/// gives the same sequence. `None` when they never met.
pub fn head_to_head(matches: &[Match], a: &str, b: &str) -> Option<Vec<H2hRow>> {
    let mut rows: Vec<H2hRow> = matches
        .iter()
        .filter(|m| m.is_between(a, b))
        .map(H2hRow::from_match)
        .collect();
    if rows.is_empty() {
        return None;
    }
    rows.sort_by(|x, y| y.date.cmp(&x.date));
    Some(rows)
}

/// Wins for `a`, draws, wins for `b`.
pub fn record(rows: &[H2hRow], a: &str, b: &str) -> (usize, usize, usize) {
    rows.iter().fold((0, 0, 0), |(wa, d, wb), row| match row.winner() {
        Some(w) if w == a => (wa + 1, d, wb),
        Some(w) if w == b => (wa, d, wb + 1),
        Some(_) => (wa, d, wb),
        None => (wa, d + 1, wb),
    })
}
