use chrono::NaiveDate;
use serde::Serialize;

use crate::match_dataset::{Match, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Venue {
    Home,
    Away,
    All,
}

impl Venue {
    pub fn admits(self, side: Side) -> bool {
        match self {
            Venue::Home => side == Side::Home,
            Venue::Away => side == Side::Away,
            Venue::All => true,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Venue::Home => "Home",
            Venue::Away => "Away",
            Venue::All => "All",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchResult {
    Win,
    Draw,
    Loss,
}

impl MatchResult {
    pub fn from_goals(goals_for: u32, goals_against: u32) -> Self {
        if goals_for > goals_against {
            MatchResult::Win
        } else if goals_for == goals_against {
            MatchResult::Draw
        } else {
            MatchResult::Loss
        }
    }

    pub fn symbol(self) -> char {
        match self {
            MatchResult::Win => 'W',
            MatchResult::Draw => 'D',
            MatchResult::Loss => 'L',
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MatchResult::Win => "win",
            MatchResult::Draw => "draw",
            MatchResult::Loss => "loss",
        }
    }

    pub fn points(self) -> u32 {
        match self {
            MatchResult::Win => 3,
            MatchResult::Draw => 1,
            MatchResult::Loss => 0,
        }
    }
}

/// One match of the window, seen from the queried team's side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormEntry {
    pub date: NaiveDate,
    pub division: String,
    pub opponent: String,
    pub side: Side,
    pub goals_for: u32,
    pub goals_against: u32,
    pub shots: u32,
    pub shots_on_target: u32,
    pub corners: u32,
    pub cards: u32,
    pub fouls: u32,
    pub result: MatchResult,
}

impl FormEntry {
    fn from_match(m: &Match, side: Side) -> Self {
        let own = m.stats(side);
        let other = m.stats(side.opposite());
        Self {
            date: m.date,
            division: m.division.clone(),
            opponent: m.team(side.opposite()).to_string(),
            side,
            goals_for: own.goals,
            goals_against: other.goals,
            shots: own.shots,
            shots_on_target: own.shots_on_target,
            corners: own.corners,
            cards: own.yellow_cards,
            fouls: own.fouls,
            result: MatchResult::from_goals(own.goals, other.goals),
        }
    }

    /// e.g. `14/09 W 2-1 vs Betis (H)`
    pub fn log_line(&self) -> String {
        let tag = match self.side {
            Side::Home => "(H)",
            Side::Away => "(A)",
        };
        format!(
            "{} {} {}-{} vs {} {}",
            self.date.format("%d/%m"),
            self.result.symbol(),
            self.goals_for,
            self.goals_against,
            self.opponent,
            tag
        )
    }
}

/// Unweighted averages over a team's most recent matches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSummary {
    pub team: String,
    pub venue: Venue,
    pub window: usize,
    /// Matches actually averaged; may be fewer than `window`.
    pub matches: usize,
    pub goals_for: f64,
    pub goals_against: f64,
    pub shots: f64,
    pub shots_on_target: f64,
    pub corners: f64,
    pub cards: f64,
    pub fouls: f64,
    /// Chronological, oldest first.
    pub results: Vec<MatchResult>,
    pub log: Vec<String>,
    pub entries: Vec<FormEntry>,
}

impl FormSummary {
    pub fn record(&self) -> (usize, usize, usize) {
        let count = |r: MatchResult| self.results.iter().filter(|x| **x == r).count();
        (
            count(MatchResult::Win),
            count(MatchResult::Draw),
            count(MatchResult::Loss),
        )
    }

    pub fn points(&self) -> u32 {
        self.results.iter().map(|r| r.points()).sum()
    }

    pub fn streak(&self) -> String {
        self.results.iter().map(|r| r.symbol()).collect()
    }
}

/// Form of `team` over its last `window` matches at `venue`.
///
/// Returns `None` when nothing is left after filtering, including an empty
/// table or a zero window.
pub fn compute_form(
    matches: &[Match],
    team: &str,
    window: usize,
    venue: Venue,
) -> Option<FormSummary> {
    if window == 0 {
        return None;
    }

    let mut played: Vec<(&Match, Side)> = matches
        .iter()
        .filter_map(|m| m.side_of(team).map(|side| (m, side)))
        .filter(|(_, side)| venue.admits(*side))
        .collect();
    if played.is_empty() {
        return None;
    }
    played.sort_by_key(|(m, _)| m.date);
    let start = played.len().saturating_sub(window);
    let kept = &played[start..];

    let entries: Vec<FormEntry> = kept
        .iter()
        .map(|(m, side)| FormEntry::from_match(m, *side))
        .collect();
    let n = entries.len() as f64;
    let mean = |f: fn(&FormEntry) -> u32| entries.iter().map(|e| f64::from(f(e))).sum::<f64>() / n;

    Some(FormSummary {
        team: team.to_string(),
        venue,
        window,
        matches: entries.len(),
        goals_for: mean(|e| e.goals_for),
        goals_against: mean(|e| e.goals_against),
        shots: mean(|e| e.shots),
        shots_on_target: mean(|e| e.shots_on_target),
        corners: mean(|e| e.corners),
        cards: mean(|e| e.cards),
        fouls: mean(|e| e.fouls),
        results: entries.iter().map(|e| e.result).collect(),
        log: entries.iter().map(FormEntry::log_line).collect(),
        entries,
    })
}
