use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::form::FormSummary;
use crate::outcome::Outcome;
use crate::rankings::PlayerRankings;
use crate::store::Comparison;

pub struct ExportReport {
    pub form_rows: usize,
    pub log_rows: usize,
    pub player_rows: usize,
    pub h2h_rows: usize,
}

/// Writes one comparison to an XLSX workbook with Form, FormLog, Players and H2H sheets.
pub fn export_comparison(path: &Path, comparison: &Comparison) -> Result<ExportReport> {
    let form_rows = form_sheet_rows(comparison);
    let log_rows = form_log_rows(comparison);
    let player_rows = player_sheet_rows(comparison);
    let h2h_rows = h2h_sheet_rows(comparison);

    let mut workbook = Workbook::new();
    for (name, rows) in [
        ("Form", &form_rows),
        ("FormLog", &log_rows),
        ("Players", &player_rows),
        ("H2H", &h2h_rows),
    ] {
        let sheet = workbook.add_worksheet();
        sheet.set_name(name).with_context(|| format!("name sheet {name}"))?;
        write_rows(sheet, rows)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("save workbook {}", path.display()))?;

    Ok(ExportReport {
        form_rows: form_rows.len().saturating_sub(1),
        log_rows: log_rows.len().saturating_sub(1),
        player_rows: player_rows.len().saturating_sub(1),
        h2h_rows: h2h_rows.len().saturating_sub(1),
    })
}

fn form_cell(form: &Outcome<FormSummary>, f: impl Fn(&FormSummary) -> String) -> String {
    match form {
        Outcome::Ready(summary) => f(summary),
        Outcome::Empty(reason) => reason.to_string(),
        Outcome::Malformed(issue) => issue.to_string(),
    }
}

fn form_sheet_rows(c: &Comparison) -> Vec<Vec<String>> {
    let metrics: [(&str, fn(&FormSummary) -> String); 9] = [
        ("Matches", |s: &FormSummary| s.matches.to_string()),
        ("Goals for", |s: &FormSummary| format!("{:.2}", s.goals_for)),
        ("Goals against", |s: &FormSummary| format!("{:.2}", s.goals_against)),
        ("Shots", |s: &FormSummary| format!("{:.2}", s.shots)),
        ("Shots on target", |s: &FormSummary| format!("{:.2}", s.shots_on_target)),
        ("Corners", |s: &FormSummary| format!("{:.2}", s.corners)),
        ("Cards", |s: &FormSummary| format!("{:.2}", s.cards)),
        ("Fouls", |s: &FormSummary| format!("{:.2}", s.fouls)),
        ("Streak", |s: &FormSummary| s.streak()),
    ];
    let mut rows = vec![vec![
        "Metric".to_string(),
        format!("{} (home)", c.home_team),
        format!("{} (away)", c.away_team),
    ]];
    for (label, f) in metrics {
        rows.push(vec![
            label.to_string(),
            form_cell(&c.home_form, f),
            form_cell(&c.away_form, f),
        ]);
    }
    rows
}

fn form_log_rows(c: &Comparison) -> Vec<Vec<String>> {
    let mut rows = vec![
        [
            "Team", "Date", "Venue", "Opponent", "Result", "GF", "GA", "Shots", "SoT", "Corners",
            "Cards", "Fouls",
        ]
        .map(String::from)
        .to_vec(),
    ];
    for (team, form) in [(&c.home_team, &c.home_form), (&c.away_team, &c.away_form)] {
        let Some(summary) = form.as_ready() else {
            continue;
        };
        for e in &summary.entries {
            rows.push(vec![
                team.clone(),
                e.date.format("%d/%m/%Y").to_string(),
                format!("{:?}", e.side),
                e.opponent.clone(),
                e.result.as_str().to_string(),
                e.goals_for.to_string(),
                e.goals_against.to_string(),
                e.shots.to_string(),
                e.shots_on_target.to_string(),
                e.corners.to_string(),
                e.cards.to_string(),
                e.fouls.to_string(),
            ]);
        }
    }
    rows
}

fn player_sheet_rows(c: &Comparison) -> Vec<Vec<String>> {
    let mut rows = vec![
        ["Team", "Table", "Player", "Apps", "Stat 1", "Stat 2", "Stat 3"]
            .map(String::from)
            .to_vec(),
    ];
    for (team, players) in [(&c.home_team, &c.home_players), (&c.away_team, &c.away_players)] {
        match players {
            Outcome::Ready(rankings) => push_rankings(&mut rows, team, rankings),
            Outcome::Empty(reason) => rows.push(vec![team.clone(), reason.to_string()]),
            Outcome::Malformed(issue) => rows.push(vec![team.clone(), issue.to_string()]),
        }
    }
    rows
}

fn push_rankings(rows: &mut Vec<Vec<String>>, team: &str, r: &PlayerRankings) {
    for s in &r.scorers {
        rows.push(vec![
            team.to_string(),
            "Scorers".to_string(),
            s.player.clone(),
            String::new(),
            format!("{} G", s.goals),
            format!("{} A", s.assists),
            format!("{} min", s.minutes),
        ]);
    }
    for s in &r.shooters {
        rows.push(vec![
            team.to_string(),
            "Shots per match".to_string(),
            s.player.clone(),
            s.appearances.to_string(),
            format!("{:.2}", s.shots),
            format!("{:.2}", s.shots_on_target),
            String::new(),
        ]);
    }
    for d in &r.disciplinary {
        rows.push(vec![
            team.to_string(),
            "Fouls per match".to_string(),
            d.player.clone(),
            d.appearances.to_string(),
            format!("{:.2}", d.fouls),
            format!("{:.2}", d.yellow_cards),
            String::new(),
        ]);
    }
}

fn h2h_sheet_rows(c: &Comparison) -> Vec<Vec<String>> {
    let mut rows = vec![
        ["Date", "Div", "Home", "Score", "Away", "1", "X", "2"]
            .map(String::from)
            .to_vec(),
    ];
    match &c.head_to_head {
        Outcome::Ready(meetings) => {
            for m in meetings {
                let [h, d, a] = m.odds_labels();
                rows.push(vec![
                    m.date_label(),
                    m.division.clone(),
                    m.home_team.clone(),
                    m.score(),
                    m.away_team.clone(),
                    h,
                    d,
                    a,
                ]);
            }
        }
        Outcome::Empty(reason) => rows.push(vec![reason.to_string()]),
        Outcome::Malformed(issue) => rows.push(vec![issue.to_string()]),
    }
    rows
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
