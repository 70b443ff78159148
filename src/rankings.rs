use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::player_dataset::{PlayerMatchRow, newest_first, team_universe};
use crate::team_names::{TeamNameMap, reconcile};

/// Appearances a player needs before entering a per-match average table.
pub const DEFAULT_MIN_APPEARANCES: usize = 2;
pub const TOP_N: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingConfig {
    pub min_appearances: usize,
    pub top_n: usize,
    /// Apply `min_appearances` to the fouls/cards table as well as the shots table.
    pub filter_disciplinary: bool,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            min_appearances: DEFAULT_MIN_APPEARANCES,
            top_n: TOP_N,
            filter_disciplinary: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScorerRow {
    pub player: String,
    pub goals: u32,
    pub assists: u32,
    pub minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShooterRow {
    pub player: String,
    pub appearances: usize,
    pub shots: f64,
    pub shots_on_target: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisciplineRow {
    pub player: String,
    pub appearances: usize,
    pub fouls: f64,
    pub yellow_cards: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerRankings {
    /// Team label in the player table's vocabulary.
    pub team: String,
    pub scorers: Vec<ScorerRow>,
    pub shooters: Vec<ShooterRow>,
    pub disciplinary: Vec<DisciplineRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SquadRow {
    pub player: String,
    pub appearances: usize,
    pub minutes: u32,
    pub goals: u32,
    pub assists: u32,
    pub yellow_cards: u32,
    pub shots: f64,
    pub shots_on_target: f64,
    pub fouls: f64,
}

/// Resolves `team` against the player table's team labels.
pub fn resolve_team<'a>(
    rows: &'a [PlayerMatchRow],
    team: &str,
    map: &TeamNameMap,
) -> Option<&'a str> {
    let universe = team_universe(rows);
    reconcile(team, &universe, map)
}

/// Player rows of one team, grouped by player name (sorted).
fn by_player<'a>(rows: &'a [PlayerMatchRow], team: &str) -> BTreeMap<&'a str, Vec<&'a PlayerMatchRow>> {
    let mut groups: BTreeMap<&str, Vec<&PlayerMatchRow>> = BTreeMap::new();
    for row in rows.iter().filter(|row| row.team == team) {
        groups.entry(row.player.as_str()).or_default().push(row);
    }
    groups
}

fn mean(rows: &[&PlayerMatchRow], f: impl Fn(&PlayerMatchRow) -> u32) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    rows.iter().map(|row| f64::from(f(row))).sum::<f64>() / rows.len() as f64
}

fn desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Top scorers, shooters and disciplinary offenders for `team`.
///
/// `None` when the team cannot be resolved in the player table. Scorers are
/// season totals and include every player; the two average tables only count
/// players with at least `config.min_appearances` rows. Ties keep player-name
/// order.
pub fn rank_players(
    rows: &[PlayerMatchRow],
    team: &str,
    map: &TeamNameMap,
    config: &RankingConfig,
) -> Option<PlayerRankings> {
    let resolved = resolve_team(rows, team, map)?;
    let groups = by_player(rows, resolved);
    let qualifies = |apps: &[&PlayerMatchRow]| apps.len() >= config.min_appearances;

    let mut scorers: Vec<ScorerRow> = groups
        .iter()
        .map(|(player, apps)| ScorerRow {
            player: player.to_string(),
            goals: apps.iter().map(|r| r.goals).sum(),
            assists: apps.iter().map(|r| r.assists).sum(),
            minutes: apps.iter().map(|r| r.minutes).sum(),
        })
        .collect();
    scorers.sort_by(|a, b| b.goals.cmp(&a.goals));
    scorers.truncate(config.top_n);

    let mut shooters: Vec<ShooterRow> = groups
        .iter()
        .filter(|(_, apps)| qualifies(apps))
        .map(|(player, apps)| ShooterRow {
            player: player.to_string(),
            appearances: apps.len(),
            shots: mean(apps, |r| r.shots),
            shots_on_target: mean(apps, |r| r.shots_on_target),
        })
        .collect();
    shooters.sort_by(|a, b| desc(a.shots, b.shots));
    shooters.truncate(config.top_n);

    let mut disciplinary: Vec<DisciplineRow> = groups
        .iter()
        .filter(|(_, apps)| !config.filter_disciplinary || qualifies(apps))
        .map(|(player, apps)| DisciplineRow {
            player: player.to_string(),
            appearances: apps.len(),
            fouls: mean(apps, |r| r.fouls),
            yellow_cards: mean(apps, |r| r.yellow_cards),
        })
        .collect();
    disciplinary.sort_by(|a, b| desc(a.fouls, b.fouls));
    disciplinary.truncate(config.top_n);

    log::debug!(
        "rankings for '{team}' as '{resolved}': {} players, {} qualify for averages",
        groups.len(),
        groups.values().filter(|apps| qualifies(apps)).count()
    );

    Some(PlayerRankings {
        team: resolved.to_string(),
        scorers,
        shooters,
        disciplinary,
    })
}

/// Whole-squad table for `team`, most minutes first.
pub fn squad_summary(
    rows: &[PlayerMatchRow],
    team: &str,
    map: &TeamNameMap,
) -> Option<Vec<SquadRow>> {
    let resolved = resolve_team(rows, team, map)?;
    let mut squad: Vec<SquadRow> = by_player(rows, resolved)
        .into_iter()
        .map(|(player, apps)| SquadRow {
            player: player.to_string(),
            appearances: apps.len(),
            minutes: apps.iter().map(|r| r.minutes).sum(),
            goals: apps.iter().map(|r| r.goals).sum(),
            assists: apps.iter().map(|r| r.assists).sum(),
            yellow_cards: apps.iter().map(|r| r.yellow_cards).sum(),
            shots: mean(&apps, |r| r.shots),
            shots_on_target: mean(&apps, |r| r.shots_on_target),
            fouls: mean(&apps, |r| r.fouls),
        })
        .collect();
    squad.sort_by(|a, b| b.minutes.cmp(&a.minutes));
    Some(squad)
}

/// A player's appearances, newest first; undated rows go last.
pub fn player_log<'a>(rows: &'a [PlayerMatchRow], player: &str) -> Vec<&'a PlayerMatchRow> {
    let mut log: Vec<&PlayerMatchRow> = rows.iter().filter(|row| row.player == player).collect();
    log.sort_by(|a, b| newest_first(a, b));
    log
}
