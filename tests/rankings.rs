use std::path::PathBuf;

use chrono::NaiveDate;
use liga_terminal::player_dataset::{PlayerMatchRow, load_player_file};
use liga_terminal::rankings::{
    RankingConfig, player_log, rank_players, resolve_team, squad_summary,
};
use liga_terminal::team_names::TeamNameMap;

fn season_rows() -> Vec<PlayerMatchRow> {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("liga");
    path.push("jugadores_raw.csv");
    load_player_file(&path, NaiveDate::from_ymd_opt(2025, 8, 1)).rows
}

fn names<T>(rows: &[T], name: impl Fn(&T) -> &str) -> Vec<String> {
    rows.iter().map(|r| name(r).to_string()).collect()
}

#[test]
fn fixture_names_resolve_to_player_table_labels() {
    let rows = season_rows();
    let map = TeamNameMap::laliga();
    assert_eq!(resolve_team(&rows, "Betis", map), Some("Real Betis"));
    assert_eq!(resolve_team(&rows, "Ath Madrid", map), Some("Atlético Madrid"));
    assert_eq!(resolve_team(&rows, "Alaves", map), Some("Alavés"));
    assert_eq!(resolve_team(&rows, "Oviedo", map), None);
}

#[test]
fn scorers_include_single_appearance_players() {
    let rows = season_rows();
    let r = rank_players(&rows, "Betis", TeamNameMap::laliga(), &RankingConfig::default())
        .expect("betis resolves");
    assert_eq!(r.team, "Real Betis");
    assert_eq!(
        names(&r.scorers, |s| s.player.as_str()),
        vec!["Isco", "Antony", "Fornals", "Bartra", "Ruibal"]
    );
    assert_eq!(r.scorers[0].goals, 4);
    assert_eq!(r.scorers[0].assists, 1);
    assert_eq!(r.scorers[0].minutes, 265);
}

#[test]
fn shot_averages_need_minimum_appearances() {
    let rows = season_rows();
    let r = rank_players(&rows, "Betis", TeamNameMap::laliga(), &RankingConfig::default())
        .expect("betis resolves");
    // Fornals averages nine shots from a single game and must not lead.
    assert_eq!(names(&r.shooters, |s| s.player.as_str()), vec!["Antony", "Isco", "Bartra"]);
    assert_eq!(r.shooters[0].shots, 4.0);
    assert_eq!(r.shooters[0].shots_on_target, 1.5);
    assert_eq!(r.shooters[1].appearances, 3);
    assert_eq!(r.shooters[2].shots, 0.5);
}

#[test]
fn disciplinary_filter_is_configurable() {
    let rows = season_rows();
    let map = TeamNameMap::laliga();
    let filtered = rank_players(&rows, "Betis", map, &RankingConfig::default()).expect("betis");
    assert_eq!(
        names(&filtered.disciplinary, |d| d.player.as_str()),
        vec!["Bartra", "Antony", "Isco"]
    );
    assert_eq!(filtered.disciplinary[0].fouls, 2.5);
    assert_eq!(filtered.disciplinary[0].yellow_cards, 1.0);

    let open = RankingConfig {
        filter_disciplinary: false,
        ..RankingConfig::default()
    };
    let unfiltered = rank_players(&rows, "Betis", map, &open).expect("betis");
    assert_eq!(
        names(&unfiltered.disciplinary, |d| d.player.as_str()),
        vec!["Fornals", "Bartra", "Antony", "Isco", "Ruibal"]
    );
}

#[test]
fn stricter_threshold_and_top_n() {
    let rows = season_rows();
    let config = RankingConfig {
        min_appearances: 3,
        top_n: 2,
        filter_disciplinary: true,
    };
    let r = rank_players(&rows, "Betis", TeamNameMap::laliga(), &config).expect("betis");
    assert_eq!(names(&r.scorers, |s| s.player.as_str()), vec!["Isco", "Antony"]);
    assert_eq!(names(&r.shooters, |s| s.player.as_str()), vec!["Isco"]);
    assert_eq!(names(&r.disciplinary, |d| d.player.as_str()), vec!["Isco"]);
}

#[test]
fn unknown_team_has_no_rankings() {
    let rows = season_rows();
    let map = TeamNameMap::laliga();
    assert!(rank_players(&rows, "Oviedo", map, &RankingConfig::default()).is_none());
    assert!(rank_players(&[], "Betis", map, &RankingConfig::default()).is_none());
}

#[test]
fn squad_sorted_by_minutes() {
    let rows = season_rows();
    let map = TeamNameMap::laliga();
    let squad = squad_summary(&rows, "Betis", map).expect("betis squad");
    assert_eq!(
        names(&squad, |s| s.player.as_str()),
        vec!["Isco", "Bartra", "Antony", "Fornals", "Ruibal"]
    );
    assert_eq!(squad[1].yellow_cards, 2);
    assert_eq!(squad[1].fouls, 2.5);
    let sevilla = squad_summary(&rows, "Sevilla", map).expect("sevilla squad");
    assert_eq!(names(&sevilla, |s| s.player.as_str()), vec!["Lukebakio"]);
}

#[test]
fn player_log_is_newest_first() {
    let rows = season_rows();
    let log = player_log(&rows, "Isco");
    let dates: Vec<Option<NaiveDate>> = log.iter().map(|r| r.date).collect();
    assert_eq!(
        dates,
        vec![
            NaiveDate::from_ymd_opt(2025, 9, 13),
            NaiveDate::from_ymd_opt(2025, 8, 22),
            NaiveDate::from_ymd_opt(2025, 8, 15),
        ]
    );
}
