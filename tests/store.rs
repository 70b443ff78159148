use std::path::PathBuf;

use chrono::NaiveDate;
use liga_terminal::config::Settings;
use liga_terminal::form::Venue;
use liga_terminal::match_dataset::{Match, SideStats};
use liga_terminal::outcome::{EmptyReason, Outcome};
use liga_terminal::props::PropQuery;
use liga_terminal::report_export::export_comparison;
use liga_terminal::store::DataStore;
use liga_terminal::team_names::TeamNameMap;

fn fixture_settings() -> Settings {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("liga");
    Settings {
        data_dir: path,
        ..Settings::default()
    }
}

fn store() -> DataStore {
    DataStore::load(&fixture_settings())
}

#[test]
fn load_reports_files_and_rows() {
    let store = store();
    assert_eq!(store.matches().len(), 9);
    assert_eq!(store.players().len(), 16);
    assert_eq!(store.match_report().rows_malformed, 2);
    assert_eq!(store.player_report().files_loaded, vec!["jugadores_raw.csv"]);
    assert_eq!(store.divisions(), vec!["SP1", "SP2"]);
}

#[test]
fn season_team_lists() {
    let store = store();
    assert_eq!(store.season_matches().len(), 8);
    assert_eq!(
        store.season_teams(None),
        vec!["Alaves", "Ath Madrid", "Betis", "Leganes", "Oviedo", "Sevilla"]
    );
    assert_eq!(store.season_teams(Some("SP2")), vec!["Leganes", "Oviedo"]);
}

#[test]
fn team_list_includes_sides_seen_only_away() {
    let meeting = |date: NaiveDate, home: &str, away: &str| Match {
        date,
        division: "SP1".to_string(),
        home_team: home.to_string(),
        away_team: away.to_string(),
        home: SideStats::default(),
        away: SideStats::default(),
        odds: None,
    };
    let store = DataStore::new(
        vec![
            meeting(NaiveDate::from_ymd_opt(2025, 5, 1).expect("date"), "Sevilla", "Betis"),
            meeting(NaiveDate::from_ymd_opt(2025, 8, 15).expect("date"), "Betis", "Sevilla"),
        ],
        Vec::new(),
        TeamNameMap::new(),
    )
    .with_season_start(NaiveDate::from_ymd_opt(2025, 8, 1));
    assert_eq!(store.season_matches().len(), 1);
    assert_eq!(store.season_teams(None), vec!["Betis", "Sevilla"]);
    assert!(store.form("Sevilla", 5, Venue::Away).is_ready());
}

#[test]
fn team_list_falls_back_to_full_history() {
    let settings = Settings {
        season_start: NaiveDate::from_ymd_opt(2030, 1, 1),
        ..fixture_settings()
    };
    let store = DataStore::load(&settings);
    assert!(store.season_matches().is_empty());
    assert_eq!(store.season_teams(Some("SP2")), vec!["Leganes", "Oviedo"]);
    assert_eq!(
        store.form("Betis", 5, Venue::Home),
        Outcome::Empty(EmptyReason::NoMatches)
    );
}

#[test]
fn form_outcomes() {
    let store = store();
    let form = store.form("Betis", 5, Venue::Home).ready().expect("betis home form");
    assert_eq!(form.matches, 2);
    assert_eq!(
        store.form("Girona", 5, Venue::All),
        Outcome::Empty(EmptyReason::NoMatches)
    );

    let empty = DataStore::new(Vec::new(), Vec::new(), TeamNameMap::new());
    assert_eq!(
        empty.form("Betis", 5, Venue::Home),
        Outcome::Empty(EmptyReason::NoData)
    );
    assert_eq!(
        empty.rankings("Betis"),
        Outcome::Empty(EmptyReason::NoPlayerData)
    );
    assert_eq!(
        empty.head_to_head("Betis", "Sevilla"),
        Outcome::Empty(EmptyReason::NoData)
    );
}

#[test]
fn rankings_outcomes() {
    let store = store();
    assert_eq!(store.player_team("Betis"), Some("Real Betis"));
    assert!(store.rankings("Betis").is_ready());
    assert_eq!(
        store.rankings("Oviedo"),
        Outcome::Empty(EmptyReason::UnknownTeam("Oviedo".to_string()))
    );
    let squad = store.squad("Ath Madrid").ready().expect("atletico squad");
    assert_eq!(squad.len(), 1);
    assert_eq!(squad[0].player, "Griezmann");
}

#[test]
fn head_to_head_uses_full_history() {
    let store = store();
    let meetings = store.head_to_head("Sevilla", "Betis").ready().expect("meetings");
    assert_eq!(meetings.len(), 2);
    assert_eq!(
        store.head_to_head("Betis", "Oviedo"),
        Outcome::Empty(EmptyReason::NoMeetings)
    );
}

#[test]
fn props_outcomes() {
    let store = store();
    assert_eq!(
        store.props(&PropQuery::default()),
        Outcome::Empty(EmptyReason::NoMatches)
    );
    let query = PropQuery {
        min_matches: 3,
        ..PropQuery::default()
    };
    let found = store.props(&query).ready().expect("candidates");
    assert_eq!(found.len(), 2);
}

#[test]
fn comparison_pairs_home_and_away_form() {
    let store = store();
    let c = store.compare("Betis", "Sevilla", 5);
    assert_eq!(c.window, 5);
    let home = c.home_form.as_ready().expect("home form");
    assert_eq!(home.venue, Venue::Home);
    assert_eq!(home.matches, 2);
    let away = c.away_form.as_ready().expect("away form");
    assert_eq!(away.venue, Venue::Away);
    assert_eq!(away.matches, 1);
    assert_eq!(
        c.home_players.as_ready().map(|r| r.team.as_str()),
        Some("Real Betis")
    );
    assert_eq!(c.head_to_head.as_ready().map(Vec::len), Some(2));
}

#[test]
fn comparison_serializes_with_status_tags() {
    let store = store();
    let c = store.compare("Oviedo", "Leganes", 5);
    let json = serde_json::to_value(&c).expect("serialize");
    assert_eq!(json["home_form"]["status"], "ready");
    assert_eq!(json["home_players"]["status"], "empty");
    assert_eq!(json["home_players"]["value"]["reason"], "unknown_team");
    assert_eq!(json["home_players"]["value"]["detail"], "Oviedo");
    assert_eq!(json["head_to_head"]["status"], "ready");
    assert_eq!(json["head_to_head"]["value"][0]["home_team"], "Leganes");
}

#[test]
fn exports_comparison_workbook() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("betis_sevilla.xlsx");
    let store = store();
    let report = export_comparison(&path, &store.compare("Betis", "Sevilla", 5)).expect("export");
    assert_eq!(report.form_rows, 9);
    assert_eq!(report.log_rows, 3);
    assert_eq!(report.h2h_rows, 2);
    assert!(report.player_rows > 0);
    assert!(path.exists());
}
