use std::collections::{HashMap, VecDeque};

use serde::Serialize;

use crate::match_dataset::{Match, Side, SideStats};

/// Trailing means for one side of a fixture, taken only from that team's
/// earlier matches at the same venue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RollingMeans {
    pub goals: f64,
    pub shots: f64,
    pub shots_on_target: f64,
    pub fouls: f64,
    pub corners: f64,
    /// How many earlier matches fed the means (1..=window).
    pub samples: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PreMatchRolling {
    pub home: Option<RollingMeans>,
    pub away: Option<RollingMeans>,
}

/// Pre-match rolling metrics aligned with `matches`.
///
/// The home team is averaged over its previous `window` home matches and the
/// away team over its previous `window` away matches. The current fixture never
/// contributes to its own row. Input order decides ties on the same date; pass
/// a date-sorted slice (the loader already sorts).
pub fn pre_match_rolling(matches: &[Match], window: usize) -> Vec<PreMatchRolling> {
    let mut history: HashMap<(&str, Side), VecDeque<SideStats>> = HashMap::new();
    let mut out = Vec::with_capacity(matches.len());

    for m in matches {
        let home = means(history.get(&(m.home_team.as_str(), Side::Home)));
        let away = means(history.get(&(m.away_team.as_str(), Side::Away)));
        out.push(PreMatchRolling { home, away });

        if window == 0 {
            continue;
        }
        for side in [Side::Home, Side::Away] {
            let past = history.entry((m.team(side), side)).or_default();
            if past.len() == window {
                past.pop_front();
            }
            past.push_back(*m.stats(side));
        }
    }
    out
}

fn means(past: Option<&VecDeque<SideStats>>) -> Option<RollingMeans> {
    let past = past.filter(|p| !p.is_empty())?;
    let n = past.len() as f64;
    let mean = |f: fn(&SideStats) -> u32| past.iter().map(|s| f64::from(f(s))).sum::<f64>() / n;
    Some(RollingMeans {
        goals: mean(|s| s.goals),
        shots: mean(|s| s.shots),
        shots_on_target: mean(|s| s.shots_on_target),
        fouls: mean(|s| s.fouls),
        corners: mean(|s| s.corners),
        samples: past.len(),
    })
}
