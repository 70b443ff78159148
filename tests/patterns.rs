use std::path::PathBuf;

use chrono::NaiveDate;
use liga_terminal::config::Settings;
use liga_terminal::form::{Venue, compute_form};
use liga_terminal::match_dataset::{Match, Odds, Side, SideStats};
use liga_terminal::outcome::{EmptyReason, Outcome};
use liga_terminal::patterns::{
    PatternEvent, PatternQuery, PatternStat, ValuePattern, match_patterns, scan_patterns,
};
use liga_terminal::store::DataStore;

fn game(day: u32, home: &str, away: &str, home_goals: u32, away_goals: u32, odds: Option<[f64; 3]>) -> Match {
    Match {
        date: NaiveDate::from_ymd_opt(2025, 9, day).expect("date"),
        division: "SP1".to_string(),
        home_team: home.to_string(),
        away_team: away.to_string(),
        home: SideStats {
            goals: home_goals,
            ..SideStats::default()
        },
        away: SideStats {
            goals: away_goals,
            ..SideStats::default()
        },
        odds: odds.map(|[home, draw, away]| Odds { home, draw, away }),
    }
}

// Betis at home: rolling goals before each game are -, 2.0, 1.5, 2.0, 1.5.
fn betis_home_run() -> Vec<Match> {
    vec![
        game(1, "Betis", "Alaves", 2, 0, Some([2.0, 3.0, 4.0])),
        game(2, "Betis", "Girona", 1, 0, Some([2.0, 3.2, 4.0])),
        game(3, "Betis", "Elche", 3, 1, Some([2.5, 3.0, 3.0])),
        game(4, "Betis", "Getafe", 0, 0, None),
        game(5, "Betis", "Oviedo", 0, 2, Some([1.5, 4.0, 6.0])),
    ]
}

fn query(min_sample: usize) -> PatternQuery {
    PatternQuery {
        window: 5,
        min_sample,
        min_hit_rate: 0.5,
    }
}

#[test]
fn scan_uses_pre_match_means_and_priced_fixtures_only() {
    let found = scan_patterns(&betis_home_run(), &query(2));
    // Thresholds 0.5, 1.0 and 1.5 keep games 2, 3 and 5; game 4 has no odds and
    // game 1 has no history. At 2.0 only game 2 is left, below the sample floor.
    assert_eq!(found.len(), 3);
    for (pattern, threshold) in found.iter().zip([0.5, 1.0, 1.5]) {
        assert_eq!(pattern.side, Side::Home);
        assert_eq!(pattern.stat, PatternStat::Goals);
        assert_eq!(pattern.threshold, threshold);
        assert_eq!(pattern.event, PatternEvent::HomeWin);
        assert_eq!((pattern.sample, pattern.hits), (3, 2));
        assert!((pattern.mean_odds - 2.0).abs() < 1e-9);
        assert!((pattern.expected_value - 1.0 / 3.0).abs() < 1e-9);
    }
    assert_eq!(found[2].label(), "Home rolling goals >= 1.5");
}

#[test]
fn sample_and_hit_rate_floors_drop_patterns() {
    assert!(scan_patterns(&betis_home_run(), &query(4)).is_empty());

    let strict = PatternQuery {
        min_hit_rate: 0.7,
        ..query(2)
    };
    assert!(scan_patterns(&betis_home_run(), &strict).is_empty());
}

#[test]
fn implausible_prices_are_left_out_of_the_mean() {
    let mut matches = betis_home_run();
    matches[4].odds = Some(Odds { home: 150.0, draw: 4.0, away: 6.0 });
    let found = scan_patterns(&matches, &query(2));
    let first = found.first().expect("home win pattern");
    assert_eq!(first.sample, 3);
    assert!((first.mean_odds - 2.25).abs() < 1e-9);
    assert!((first.expected_value - 0.5).abs() < 1e-9);
}

#[test]
fn patterns_sort_by_expected_value() {
    let mut matches = betis_home_run();
    // Sevilla win three straight on the road at long odds; the first has no history.
    matches.push(game(6, "Girona", "Sevilla", 0, 1, Some([1.8, 3.5, 5.0])));
    matches.push(game(7, "Elche", "Sevilla", 0, 2, Some([1.9, 3.4, 5.0])));
    matches.push(game(8, "Getafe", "Sevilla", 1, 3, Some([2.0, 3.3, 5.0])));
    let found = scan_patterns(&matches, &query(2));
    let best = found.first().expect("patterns");
    assert_eq!(best.side, Side::Away);
    assert_eq!(best.event, PatternEvent::AwayWin);
    assert_eq!((best.sample, best.hits), (2, 2));
    assert!((best.expected_value - 4.0).abs() < 1e-9);
    assert!(found.windows(2).all(|w| w[0].expected_value >= w[1].expected_value));
}

#[test]
fn current_form_selects_matching_patterns() {
    let matches = betis_home_run();
    let found = scan_patterns(&matches, &query(2));

    // Last five at home: 2, 1, 3, 0, 0 goals.
    let home = compute_form(&matches, "Betis", 5, Venue::Home).expect("betis form");
    assert!((home.goals_for - 1.2).abs() < 1e-9);
    let fits = match_patterns(Some(&home), None, &found);
    let thresholds: Vec<f64> = fits.iter().map(|m| m.threshold).collect();
    assert_eq!(thresholds, vec![0.5, 1.0]);
    assert!(fits.iter().all(|m| m.team == "Betis" && m.event == PatternEvent::HomeWin));

    let cold = compute_form(&matches, "Betis", 2, Venue::Home).expect("last two");
    assert!(match_patterns(Some(&cold), None, &found).is_empty());
    assert!(match_patterns(None, Some(&home), &found).is_empty());
}

#[test]
fn negative_value_patterns_never_match() {
    let losing = ValuePattern {
        side: Side::Home,
        stat: PatternStat::Goals,
        threshold: 0.5,
        event: PatternEvent::HomeWin,
        sample: 40,
        hits: 25,
        hit_rate: 0.625,
        mean_odds: 1.5,
        expected_value: 0.625 * 1.5 - 1.0,
    };
    let matches = betis_home_run();
    let home = compute_form(&matches, "Betis", 5, Venue::Home).expect("betis form");
    assert!(match_patterns(Some(&home), None, &[losing]).is_empty());
}

#[test]
fn store_reports_why_no_pattern_was_found() {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("liga");
    let store = DataStore::load(&Settings {
        data_dir: path,
        ..Settings::default()
    });
    assert_eq!(
        store.value_patterns(&PatternQuery::default()),
        Outcome::Empty(EmptyReason::NoMatches)
    );

    let empty = DataStore::new(Vec::new(), Vec::new(), Default::default());
    assert_eq!(
        empty.value_patterns(&PatternQuery::default()),
        Outcome::Empty(EmptyReason::NoData)
    );

    let store = DataStore::new(betis_home_run(), Vec::new(), Default::default());
    let found = store.value_patterns(&query(2)).ready().expect("patterns");
    let fits = store.pattern_matches("Betis", "Oviedo", &query(2), &found);
    assert_eq!(fits.as_ready().map(Vec::len), Some(2));
}
