use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::player_dataset::{PlayerMatchRow, newest_first};

const LAST_N: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropMarket {
    Shots,
    ShotsOnTarget,
    Fouls,
    YellowCards,
}

impl PropMarket {
    pub fn value(self, row: &PlayerMatchRow) -> u32 {
        match self {
            PropMarket::Shots => row.shots,
            PropMarket::ShotsOnTarget => row.shots_on_target,
            PropMarket::Fouls => row.fouls,
            PropMarket::YellowCards => row.yellow_cards,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PropMarket::Shots => "Shots",
            PropMarket::ShotsOnTarget => "Shots on target",
            PropMarket::Fouls => "Fouls",
            PropMarket::YellowCards => "Yellow cards",
        }
    }

    pub fn next(self) -> PropMarket {
        match self {
            PropMarket::Shots => PropMarket::ShotsOnTarget,
            PropMarket::ShotsOnTarget => PropMarket::Fouls,
            PropMarket::Fouls => PropMarket::YellowCards,
            PropMarket::YellowCards => PropMarket::Shots,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropQuery {
    pub market: PropMarket,
    /// A hit is a value strictly above the line.
    pub line: f64,
    pub min_matches: usize,
    pub min_success_pct: f64,
}

impl Default for PropQuery {
    fn default() -> Self {
        Self {
            market: PropMarket::Shots,
            line: 1.5,
            min_matches: 5,
            min_success_pct: 70.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropMark {
    Hit,
    Miss,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropCandidate {
    pub player: String,
    pub team: String,
    pub hits: usize,
    pub success_pct: f64,
    pub average: f64,
    /// Newest first; `None` pads players with fewer than five sampled games.
    pub last_five: [Option<PropMark>; LAST_N],
}

impl PropCandidate {
    pub fn last_five_text(&self) -> String {
        self.last_five
            .iter()
            .map(|mark| match mark {
                Some(PropMark::Hit) => "Y",
                Some(PropMark::Miss) => "N",
                None => "-",
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Players whose latest `min_matches` appearances beat `line` often enough.
///
/// Rows are grouped by (player, team), so a mid-season transfer counts as two
/// separate histories.
pub fn scan_props(rows: &[PlayerMatchRow], query: &PropQuery) -> Vec<PropCandidate> {
    if query.min_matches == 0 {
        return Vec::new();
    }
    let mut groups: BTreeMap<(&str, &str), Vec<&PlayerMatchRow>> = BTreeMap::new();
    for row in rows {
        groups
            .entry((row.player.as_str(), row.team.as_str()))
            .or_default()
            .push(row);
    }

    let mut out = Vec::new();
    for ((player, team), mut apps) in groups {
        if apps.len() < query.min_matches {
            continue;
        }
        apps.sort_by(|a, b| newest_first(a, b));
        apps.truncate(query.min_matches);

        let values: Vec<u32> = apps.iter().map(|row| query.market.value(row)).collect();
        let is_hit = |v: u32| f64::from(v) > query.line;
        let hits = values.iter().filter(|v| is_hit(**v)).count();
        let success_pct = hits as f64 / query.min_matches as f64 * 100.0;
        if success_pct < query.min_success_pct {
            continue;
        }

        let mut last_five = [None; LAST_N];
        for (slot, v) in last_five.iter_mut().zip(&values) {
            *slot = Some(if is_hit(*v) { PropMark::Hit } else { PropMark::Miss });
        }
        out.push(PropCandidate {
            player: player.to_string(),
            team: team.to_string(),
            hits,
            success_pct,
            average: values.iter().map(|v| f64::from(*v)).sum::<f64>() / values.len() as f64,
            last_five,
        });
    }

    out.sort_by(|a, b| {
        b.success_pct
            .partial_cmp(&a.success_pct)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.player.cmp(&b.player))
    });
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecentAverages {
    pub matches: usize,
    pub shots: f64,
    pub shots_on_target: f64,
    pub fouls: f64,
}

/// Per-match means over a player's newest `n` appearances.
pub fn recent_averages(rows: &[PlayerMatchRow], player: &str, n: usize) -> Option<RecentAverages> {
    let mut apps: Vec<&PlayerMatchRow> = rows.iter().filter(|row| row.player == player).collect();
    apps.sort_by(|a, b| newest_first(a, b));
    apps.truncate(n);
    if apps.is_empty() {
        return None;
    }
    let count = apps.len() as f64;
    let mean = |f: fn(&PlayerMatchRow) -> u32| apps.iter().map(|r| f64::from(f(r))).sum::<f64>() / count;
    Some(RecentAverages {
        matches: apps.len(),
        shots: mean(|r| r.shots),
        shots_on_target: mean(|r| r.shots_on_target),
        fouls: mean(|r| r.fouls),
    })
}
