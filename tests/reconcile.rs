use liga_terminal::team_names::{MatchKind, TeamNameMap, normalize, reconcile, reconcile_detailed};

#[test]
fn override_wins_over_raw_exact_match() {
    let universe = ["ath madrid", "Atlético Madrid", "Sevilla"];
    let got = reconcile("Ath Madrid", &universe, TeamNameMap::laliga());
    assert_eq!(got, Some("Atlético Madrid"));
}

#[test]
fn accents_and_case_match_exactly() {
    let universe = ["Real Betis", "Cádiz", "Leganés"];
    let map = TeamNameMap::new();
    let hit = reconcile_detailed("CADIZ", &universe, &map).expect("accent-insensitive");
    assert_eq!(hit.name, "Cádiz");
    assert_eq!(hit.kind, MatchKind::Exact);
    assert!(!hit.via_override);
    assert_eq!(reconcile("leganes", &universe, &map), Some("Leganés"));
}

#[test]
fn override_target_still_goes_through_universe() {
    let mut map = TeamNameMap::new();
    map.insert("Espanol", "Espanyol");
    let universe = ["Espanyol", "Girona"];
    let hit = reconcile_detailed("Espanol", &universe, &map).expect("mapped");
    assert_eq!(hit.name, "Espanyol");
    assert!(hit.via_override);

    // The mapped label is not in the player table at all.
    assert_eq!(reconcile("Espanol", &["Girona"], &map), None);
}

#[test]
fn substring_match_in_either_direction() {
    let map = TeamNameMap::new();
    let hit = reconcile_detailed("Real Madrid Castilla", &["Getafe", "Real Madrid"], &map)
        .expect("source contains candidate");
    assert_eq!(hit.name, "Real Madrid");
    assert_eq!(hit.kind, MatchKind::Partial);

    assert_eq!(reconcile("Betis", &["Sevilla", "Real Betis"], &map), Some("Real Betis"));
}

#[test]
fn substring_pass_takes_first_candidate_even_when_wrong() {
    // Permissive by construction: the reserve side comes first and wins.
    let map = TeamNameMap::new();
    let hit = reconcile_detailed("Betis", &["Real Betis B", "Real Betis"], &map).expect("partial");
    assert_eq!(hit.name, "Real Betis B");
    assert_eq!(hit.kind, MatchKind::Partial);
}

#[test]
fn exact_pass_runs_before_substring_pass() {
    let map = TeamNameMap::new();
    let universe = ["Real Madrid Castilla", "Real Madrid"];
    let hit = reconcile_detailed("Real Madrid", &universe, &map).expect("exact");
    assert_eq!(hit.name, "Real Madrid");
    assert_eq!(hit.kind, MatchKind::Exact);
}

#[test]
fn no_match_and_degenerate_inputs() {
    let map = TeamNameMap::laliga();
    assert_eq!(reconcile("Oviedo", &["Sevilla", "Alavés"], map), None);
    assert_eq!(reconcile("Sevilla", &[], map), None);
    assert_eq!(reconcile("", &["Sevilla"], map), None);
    assert_eq!(reconcile("   ", &["Sevilla"], map), None);
}

#[test]
fn normalized_keys_line_up_across_providers() {
    for (fixture_name, player_name) in [
        ("Alaves", "Alavés"),
        ("Cadiz", "Cádiz"),
        ("Almeria", "Almería"),
        ("Leganes", "Leganés"),
    ] {
        assert_eq!(normalize(fixture_name), normalize(player_name));
    }
}

#[test]
fn blank_universe_entries_are_never_partial_candidates() {
    let map = TeamNameMap::new();
    let universe = ["", "  ", "Real Betis"];
    assert_eq!(reconcile("Oviedo", &universe, &map), None);
    let hit = reconcile_detailed("Betis", &universe, &map).expect("betis");
    assert_eq!(hit.name, "Real Betis");
    assert_eq!(hit.kind, MatchKind::Partial);
    assert_eq!(reconcile(" ", &universe, &map), None);
}
