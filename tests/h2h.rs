use std::path::PathBuf;

use chrono::NaiveDate;
use liga_terminal::h2h::{MISSING_ODDS, head_to_head, record};
use liga_terminal::match_dataset::{Match, load_match_dir};

fn all_matches() -> Vec<Match> {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("liga");
    load_match_dir(&path).matches
}

#[test]
fn meetings_newest_first_in_both_orientations() {
    let matches = all_matches();
    let rows = head_to_head(&matches, "Betis", "Sevilla").expect("two meetings");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2025, 8, 22).expect("date"));
    assert_eq!(rows[0].home_team, "Sevilla");
    assert_eq!(rows[0].score(), "0-2");
    assert_eq!(rows[1].date_label(), "17/05/2025");
    assert_eq!(rows[1].home_team, "Betis");
    assert_eq!(rows[1].division, "SP1");
}

#[test]
fn argument_order_does_not_matter() {
    let matches = all_matches();
    let ab = head_to_head(&matches, "Betis", "Sevilla");
    let ba = head_to_head(&matches, "Sevilla", "Betis");
    assert_eq!(ab, ba);
}

#[test]
fn odds_are_formatted_or_marked_missing() {
    let matches = all_matches();
    let rows = head_to_head(&matches, "Betis", "Sevilla").expect("meetings");
    assert_eq!(rows[0].odds_labels(), ["2.40", "3.20", "3.00"].map(String::from));

    let rows = head_to_head(&matches, "Sevilla", "Ath Madrid").expect("one meeting");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].odds, None);
    assert_eq!(rows[0].odds_labels(), [MISSING_ODDS; 3].map(String::from));
}

#[test]
fn record_counts_from_first_team_view() {
    let matches = all_matches();
    let rows = head_to_head(&matches, "Betis", "Sevilla").expect("meetings");
    assert_eq!(record(&rows, "Betis", "Sevilla"), (1, 1, 0));
    assert_eq!(record(&rows, "Sevilla", "Betis"), (0, 1, 1));
    assert_eq!(rows[0].winner(), Some("Betis"));
    assert_eq!(rows[1].winner(), None);
}

#[test]
fn teams_that_never_met() {
    let matches = all_matches();
    assert!(head_to_head(&matches, "Betis", "Oviedo").is_none());
    assert!(head_to_head(&[], "Betis", "Sevilla").is_none());
}
