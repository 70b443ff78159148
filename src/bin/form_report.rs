use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;

use liga_terminal::config::Settings;
use liga_terminal::h2h::record;
use liga_terminal::outcome::Outcome;
use liga_terminal::patterns::{PatternMatch, PatternQuery, ValuePattern};
use liga_terminal::report_export::export_comparison;
use liga_terminal::store::{Comparison, DataStore};

/// Print the home/away comparison for one fixture.
#[derive(Parser, Debug)]
#[command(name = "form_report")]
struct Cli {
    /// Home team, as spelled in the fixture files
    #[arg(long)]
    home: String,

    /// Away team, as spelled in the fixture files
    #[arg(long)]
    away: String,

    /// Trailing window (defaults to LIGA_FORM_WINDOW)
    #[arg(long)]
    window: Option<usize>,

    /// Data directory (defaults to LIGA_DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Minimum appearances for the per-match player tables
    #[arg(long)]
    min_appearances: Option<usize>,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,

    /// Also write an XLSX workbook
    #[arg(long)]
    xlsx: Option<PathBuf>,

    /// Scan the history for value patterns and check them against this fixture
    #[arg(long)]
    patterns: bool,

    /// Minimum sample size for a value pattern
    #[arg(long, default_value_t = 30)]
    min_sample: usize,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let mut settings = Settings::from_env();
    if let Some(dir) = cli.data_dir {
        settings.data_dir = dir;
    }
    if let Some(n) = cli.min_appearances {
        settings.min_appearances = n;
    }
    let window = cli.window.unwrap_or(settings.form_window);
    if window == 0 {
        return Err(anyhow!("--window must be positive"));
    }

    let store = DataStore::load(&settings);
    let comparison = store.compare(&cli.home, &cli.away, window);

    let patterns = cli.patterns.then(|| {
        let query = PatternQuery {
            min_sample: cli.min_sample,
            ..PatternQuery::default()
        };
        let found = store.value_patterns(&query);
        let fits = match &found {
            Outcome::Ready(rows) => store.pattern_matches(&cli.home, &cli.away, &query, rows),
            Outcome::Empty(reason) => Outcome::Empty(reason.clone()),
            Outcome::Malformed(issue) => Outcome::Malformed(issue.clone()),
        };
        (found, fits)
    });

    if cli.json {
        let value = match &patterns {
            Some((found, fits)) => serde_json::json!({
                "comparison": comparison,
                "patterns": found,
                "fits": fits,
            }),
            None => serde_json::to_value(&comparison).context("serialize comparison")?,
        };
        let json = serde_json::to_string_pretty(&value).context("serialize report")?;
        println!("{json}");
    } else {
        print_text(&comparison);
        if let Some((found, fits)) = &patterns {
            print_patterns(found, fits);
        }
    }

    if let Some(path) = cli.xlsx {
        let report = export_comparison(&path, &comparison)?;
        eprintln!(
            "wrote {} ({} log rows, {} player rows, {} meetings)",
            path.display(),
            report.log_rows,
            report.player_rows,
            report.h2h_rows
        );
    }
    Ok(())
}

fn print_text(c: &Comparison) {
    println!("{} (home) vs {} (away), last {}", c.home_team, c.away_team, c.window);
    for (team, form) in [(&c.home_team, &c.home_form), (&c.away_team, &c.away_form)] {
        println!();
        match form {
            Outcome::Ready(s) => {
                println!(
                    "{team}: {} matches | GF {:.2} GA {:.2} Sh {:.2} SoT {:.2} Co {:.2} Cards {:.2} Fouls {:.2} | {}",
                    s.matches,
                    s.goals_for,
                    s.goals_against,
                    s.shots,
                    s.shots_on_target,
                    s.corners,
                    s.cards,
                    s.fouls,
                    s.streak()
                );
                for line in &s.log {
                    println!("  {line}");
                }
            }
            Outcome::Empty(reason) => println!("{team}: {reason}"),
            Outcome::Malformed(issue) => println!("{team}: {issue}"),
        }
    }

    for (team, players) in [(&c.home_team, &c.home_players), (&c.away_team, &c.away_players)] {
        println!();
        let r = match players {
            Outcome::Ready(r) => r,
            Outcome::Empty(reason) => {
                println!("{team} players: {reason}");
                continue;
            }
            Outcome::Malformed(issue) => {
                println!("{team} players: {issue}");
                continue;
            }
        };
        println!("{team} players ({})", r.team);
        for s in &r.scorers {
            println!("  goals    {:<24} {} G {} A {} min", s.player, s.goals, s.assists, s.minutes);
        }
        for s in &r.shooters {
            println!("  shots/m  {:<24} {:.2} ({:.2} on target)", s.player, s.shots, s.shots_on_target);
        }
        for d in &r.disciplinary {
            println!("  fouls/m  {:<24} {:.2} ({:.2} yellow)", d.player, d.fouls, d.yellow_cards);
        }
    }

    println!();
    match &c.head_to_head {
        Outcome::Ready(rows) => {
            let (wins_home, draws, wins_away) = record(rows, &c.home_team, &c.away_team);
            println!(
                "Head to head ({} meetings): {} {wins_home}, draws {draws}, {} {wins_away}",
                rows.len(),
                c.home_team,
                c.away_team
            );
            for m in rows {
                let [h, d, a] = m.odds_labels();
                println!(
                    "  {} {} {} {} {}  {h} {d} {a}",
                    m.date_label(),
                    m.home_team,
                    m.score(),
                    m.away_team,
                    m.division
                );
            }
        }
        Outcome::Empty(reason) => println!("Head to head: {reason}"),
        Outcome::Malformed(issue) => println!("Head to head: {issue}"),
    }
}

fn print_patterns(found: &Outcome<Vec<ValuePattern>>, fits: &Outcome<Vec<PatternMatch>>) {
    println!();
    match found {
        Outcome::Ready(rows) => {
            println!("Value patterns ({}):", rows.len());
            for p in rows {
                println!(
                    "  {:<34} {:<9} n={:<4} hit {:>5.1}% odds {:.2} EV {:+.1}%",
                    p.label(),
                    p.event.label(),
                    p.sample,
                    p.hit_rate * 100.0,
                    p.mean_odds,
                    p.expected_value * 100.0
                );
            }
        }
        Outcome::Empty(reason) => println!("Value patterns: {reason}"),
        Outcome::Malformed(issue) => println!("Value patterns: {issue}"),
    }
    match fits {
        Outcome::Ready(rows) => {
            println!("Fits this fixture:");
            for m in rows {
                println!(
                    "  {} {} {:.2} >= {} -> {} (EV {:+.1}%, n={})",
                    m.team,
                    m.stat.label(),
                    m.current,
                    m.threshold,
                    m.event.label(),
                    m.expected_value * 100.0,
                    m.sample
                );
            }
        }
        Outcome::Empty(reason) => println!("Fits this fixture: {reason}"),
        Outcome::Malformed(issue) => println!("Fits this fixture: {issue}"),
    }
}
