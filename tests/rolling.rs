use chrono::NaiveDate;
use liga_terminal::match_dataset::{Match, SideStats};
use liga_terminal::rolling::pre_match_rolling;

fn game(day: u32, home: &str, away: &str, home_goals: u32, home_shots: u32, away_goals: u32) -> Match {
    Match {
        date: NaiveDate::from_ymd_opt(2025, 9, day).expect("date"),
        division: "SP1".to_string(),
        home_team: home.to_string(),
        away_team: away.to_string(),
        home: SideStats {
            goals: home_goals,
            shots: home_shots,
            ..SideStats::default()
        },
        away: SideStats {
            goals: away_goals,
            ..SideStats::default()
        },
        odds: None,
    }
}

#[test]
fn first_appearance_has_no_history() {
    let matches = vec![game(1, "Betis", "Sevilla", 2, 10, 1)];
    let rows = pre_match_rolling(&matches, 5);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].home, None);
    assert_eq!(rows[0].away, None);
}

#[test]
fn current_match_never_feeds_its_own_row() {
    let matches = vec![
        game(1, "Betis", "Sevilla", 2, 10, 1),
        game(8, "Betis", "Girona", 4, 20, 0),
        game(15, "Betis", "Elche", 0, 6, 0),
    ];
    let rows = pre_match_rolling(&matches, 5);
    let second = rows[1].home.expect("one earlier home game");
    assert_eq!(second.samples, 1);
    assert_eq!(second.goals, 2.0);
    assert_eq!(second.shots, 10.0);

    let third = rows[2].home.expect("two earlier home games");
    assert_eq!(third.samples, 2);
    assert_eq!(third.goals, 3.0);
    assert_eq!(third.shots, 15.0);
}

#[test]
fn venues_are_tracked_separately() {
    let matches = vec![
        game(1, "Betis", "Sevilla", 2, 10, 1),
        game(8, "Sevilla", "Betis", 0, 5, 3),
        game(15, "Girona", "Betis", 1, 5, 1),
    ];
    let rows = pre_match_rolling(&matches, 5);
    // Sevilla played away before, never at home.
    assert_eq!(rows[1].home, None);
    // Betis played at home before, never away.
    assert_eq!(rows[1].away, None);
    let betis_away = rows[2].away.expect("one earlier away game");
    assert_eq!(betis_away.goals, 3.0);
}

#[test]
fn window_drops_oldest_sample() {
    let matches = vec![
        game(1, "Betis", "A", 3, 0, 0),
        game(2, "Betis", "B", 1, 0, 0),
        game(3, "Betis", "C", 0, 0, 0),
        game(4, "Betis", "D", 0, 0, 0),
    ];
    let rows = pre_match_rolling(&matches, 2);
    let last = rows[3].home.expect("history");
    assert_eq!(last.samples, 2);
    assert_eq!(last.goals, 0.5);
}

#[test]
fn zero_window_never_has_history() {
    let matches = vec![
        game(1, "Betis", "Sevilla", 2, 10, 1),
        game(8, "Betis", "Girona", 4, 20, 0),
    ];
    let rows = pre_match_rolling(&matches, 0);
    assert!(rows.iter().all(|r| r.home.is_none() && r.away.is_none()));
}
