use serde::Serialize;

use crate::form::FormSummary;
use crate::match_dataset::{Match, Odds, Side};
use crate::rolling::{RollingMeans, pre_match_rolling};

const GOAL_THRESHOLDS: [f64; 5] = [0.5, 1.0, 1.5, 2.0, 2.5];
const SHOT_THRESHOLDS: [f64; 6] = [8.0, 10.0, 12.0, 14.0, 16.0, 18.0];
const SHOT_ON_TARGET_THRESHOLDS: [f64; 5] = [3.0, 4.0, 5.0, 6.0, 7.0];

/// Prices outside this range are treated as feed errors and left out of the mean.
const MIN_PRICE: f64 = 1.01;
const MAX_PRICE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternStat {
    Goals,
    Shots,
    ShotsOnTarget,
}

impl PatternStat {
    pub const ALL: [PatternStat; 3] = [PatternStat::Goals, PatternStat::Shots, PatternStat::ShotsOnTarget];

    pub fn thresholds(self) -> &'static [f64] {
        match self {
            PatternStat::Goals => &GOAL_THRESHOLDS,
            PatternStat::Shots => &SHOT_THRESHOLDS,
            PatternStat::ShotsOnTarget => &SHOT_ON_TARGET_THRESHOLDS,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PatternStat::Goals => "goals",
            PatternStat::Shots => "shots",
            PatternStat::ShotsOnTarget => "shots on target",
        }
    }

    fn of_means(self, means: &RollingMeans) -> f64 {
        match self {
            PatternStat::Goals => means.goals,
            PatternStat::Shots => means.shots,
            PatternStat::ShotsOnTarget => means.shots_on_target,
        }
    }

    fn of_form(self, form: &FormSummary) -> f64 {
        match self {
            PatternStat::Goals => form.goals_for,
            PatternStat::Shots => form.shots,
            PatternStat::ShotsOnTarget => form.shots_on_target,
        }
    }
}

/// Full-time 1X2 outcome a pattern bets on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternEvent {
    HomeWin,
    Draw,
    AwayWin,
}

impl PatternEvent {
    pub const ALL: [PatternEvent; 3] = [PatternEvent::HomeWin, PatternEvent::Draw, PatternEvent::AwayWin];

    pub fn label(self) -> &'static str {
        match self {
            PatternEvent::HomeWin => "Home win",
            PatternEvent::Draw => "Draw",
            PatternEvent::AwayWin => "Away win",
        }
    }

    pub fn occurred(self, m: &Match) -> bool {
        match self {
            PatternEvent::HomeWin => m.home.goals > m.away.goals,
            PatternEvent::Draw => m.home.goals == m.away.goals,
            PatternEvent::AwayWin => m.home.goals < m.away.goals,
        }
    }

    pub fn price(self, odds: &Odds) -> f64 {
        match self {
            PatternEvent::HomeWin => odds.home,
            PatternEvent::Draw => odds.draw,
            PatternEvent::AwayWin => odds.away,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternQuery {
    /// Trailing same-venue matches behind each rolling mean.
    pub window: usize,
    pub min_sample: usize,
    /// Fraction in 0..=1.
    pub min_hit_rate: f64,
}

impl Default for PatternQuery {
    fn default() -> Self {
        Self {
            window: 5,
            min_sample: 30,
            min_hit_rate: 0.60,
        }
    }
}

/// "When the home side's rolling goals were at least 1.5, the home win landed
/// 64% of the time at a mean price of 1.90."
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuePattern {
    pub side: Side,
    pub stat: PatternStat,
    pub threshold: f64,
    pub event: PatternEvent,
    pub sample: usize,
    pub hits: usize,
    pub hit_rate: f64,
    pub mean_odds: f64,
    /// `hit_rate * mean_odds - 1`.
    pub expected_value: f64,
}

impl ValuePattern {
    pub fn label(&self) -> String {
        format!("{} rolling {} >= {}", side_label(self.side), self.stat.label(), self.threshold)
    }
}

/// A value pattern whose condition the upcoming fixture already meets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternMatch {
    pub team: String,
    pub side: Side,
    pub stat: PatternStat,
    pub current: f64,
    pub threshold: f64,
    pub event: PatternEvent,
    pub hit_rate: f64,
    pub sample: usize,
    pub expected_value: f64,
}

fn side_label(side: Side) -> &'static str {
    match side {
        Side::Home => "Home",
        Side::Away => "Away",
    }
}

/// Scans every (side, stat, threshold, event) combination over the pre-match
/// rolling means of `matches`, sorted by expected value, best first.
///
/// Only fixtures with 1X2 odds and a rolling mean for the scanned side form
/// the sample. A pattern is kept when the sample reaches `min_sample`, the hit
/// rate reaches `min_hit_rate` and at least one price falls in 1.01..=100.
pub fn scan_patterns(matches: &[Match], query: &PatternQuery) -> Vec<ValuePattern> {
    let rolling = pre_match_rolling(matches, query.window);
    let priced: Vec<(&Match, Odds, _)> = matches
        .iter()
        .zip(&rolling)
        .filter_map(|(m, r)| m.odds.map(|odds| (m, odds, r)))
        .collect();

    let mut found = Vec::new();
    for side in [Side::Home, Side::Away] {
        for stat in PatternStat::ALL {
            for &threshold in stat.thresholds() {
                let sample: Vec<(&Match, Odds)> = priced
                    .iter()
                    .filter(|(_, _, r)| {
                        let means = match side {
                            Side::Home => r.home,
                            Side::Away => r.away,
                        };
                        means.is_some_and(|means| stat.of_means(&means) >= threshold)
                    })
                    .map(|(m, odds, _)| (*m, *odds))
                    .collect();
                if sample.is_empty() || sample.len() < query.min_sample {
                    continue;
                }
                for event in PatternEvent::ALL {
                    if let Some(pattern) = evaluate(&sample, side, stat, threshold, event, query) {
                        found.push(pattern);
                    }
                }
            }
        }
    }
    found.sort_by(|a, b| b.expected_value.total_cmp(&a.expected_value));
    log::debug!("pattern scan over {} priced fixtures: {} kept", priced.len(), found.len());
    found
}

fn evaluate(
    sample: &[(&Match, Odds)],
    side: Side,
    stat: PatternStat,
    threshold: f64,
    event: PatternEvent,
    query: &PatternQuery,
) -> Option<ValuePattern> {
    let hits = sample.iter().filter(|(m, _)| event.occurred(m)).count();
    let hit_rate = hits as f64 / sample.len() as f64;
    if hit_rate < query.min_hit_rate {
        return None;
    }
    let prices: Vec<f64> = sample
        .iter()
        .map(|(_, odds)| event.price(odds))
        .filter(|p| p.is_finite() && (MIN_PRICE..=MAX_PRICE).contains(p))
        .collect();
    if prices.is_empty() {
        return None;
    }
    let mean_odds = prices.iter().sum::<f64>() / prices.len() as f64;
    Some(ValuePattern {
        side,
        stat,
        threshold,
        event,
        sample: sample.len(),
        hits,
        hit_rate,
        mean_odds,
        expected_value: hit_rate * mean_odds - 1.0,
    })
}

/// Positive-value patterns whose condition holds for the fixture's current
/// form: home patterns against the home side's home form, away patterns
/// against the away side's away form.
pub fn match_patterns(
    home: Option<&FormSummary>,
    away: Option<&FormSummary>,
    patterns: &[ValuePattern],
) -> Vec<PatternMatch> {
    patterns
        .iter()
        .filter(|p| p.expected_value > 0.0)
        .filter_map(|p| {
            let form = match p.side {
                Side::Home => home?,
                Side::Away => away?,
            };
            let current = p.stat.of_form(form);
            (current >= p.threshold).then(|| PatternMatch {
                team: form.team.clone(),
                side: p.side,
                stat: p.stat,
                current,
                threshold: p.threshold,
                event: p.event,
                hit_rate: p.hit_rate,
                sample: p.sample,
                expected_value: p.expected_value,
            })
        })
        .collect()
}
