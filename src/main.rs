use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use liga_terminal::config::{Settings, app_cache_dir};
use liga_terminal::form::{FormSummary, MatchResult};
use liga_terminal::h2h::{H2hRow, record};
use liga_terminal::match_dataset::division_tier;
use liga_terminal::outcome::Outcome;
use liga_terminal::rankings::PlayerRankings;
use liga_terminal::report_export::export_comparison;
use liga_terminal::state::{AppState, PickSide, Screen};
use liga_terminal::store::{DataStore, SEASON_WINDOW};

const LOG_FILE: &str = "liga_terminal.log";
const TEAM_LOG_LINES: usize = 10;

struct App {
    state: AppState,
    should_quit: bool,
}

impl App {
    fn new(state: AppState) -> Self {
        Self {
            state,
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.state.screen = Screen::Compare,
            KeyCode::Char('2') => self.state.screen = Screen::Team,
            KeyCode::Char('3') => self.state.screen = Screen::Squad,
            KeyCode::Char('4') => self.state.screen = Screen::Props,
            KeyCode::Char('5') => self.state.screen = Screen::Patterns,
            KeyCode::Char('d') => self.state.cycle_division(),
            KeyCode::Char('p') => self.state.cycle_pattern_sample(),
            KeyCode::Char('h') => self.state.pick_side(PickSide::Home),
            KeyCode::Char('a') => self.state.pick_side(PickSide::Away),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('J') => self.state.select_next_player(),
            KeyCode::Char('K') => self.state.select_prev_player(),
            KeyCode::Char('w') => self.state.cycle_window(),
            KeyCode::Char('m') => self.state.cycle_market(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.state.raise_line(),
            KeyCode::Char('-') => self.state.lower_line(),
            KeyCode::Char('n') => self.state.cycle_min_matches(),
            KeyCode::Char('s') => self.state.cycle_min_success(),
            KeyCode::Char('x') => self.export(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn export(&mut self) {
        let Some(comparison) = self.state.comparison() else {
            self.state.push_log("[INFO] Nothing to export");
            return;
        };
        let path = PathBuf::from(format!(
            "liga_{}_{}.xlsx",
            file_slug(&comparison.home_team),
            file_slug(&comparison.away_team)
        ));
        let msg = match export_comparison(&path, comparison) {
            Ok(report) => format!(
                "[INFO] Exported {} ({} form rows, {} meetings)",
                path.display(),
                report.log_rows,
                report.h2h_rows
            ),
            Err(err) => {
                log::error!("export failed: {err:#}");
                format!("[WARN] Export failed: {err}")
            }
        };
        self.state.push_log(msg);
    }
}

fn file_slug(team: &str) -> String {
    team.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

/// The terminal owns stdout, so log records go to a file in the cache dir.
fn init_file_logger() {
    let Some(dir) = app_cache_dir() else {
        return;
    };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = File::create(dir.join(LOG_FILE)) else {
        return;
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init();
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_file_logger();

    let settings = Settings::from_env();
    let store = DataStore::load(&settings);
    let mut app = App::new(AppState::new(store, &settings));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Compare => render_compare(frame, chunks[1], &app.state),
        Screen::Team => render_team(frame, chunks[1], &app.state),
        Screen::Squad => render_squad(frame, chunks[1], &app.state),
        Screen::Props => render_props(frame, chunks[1], &app.state),
        Screen::Patterns => render_patterns(frame, chunks[1], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state))
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(app.state.screen));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let team = |t: Option<&str>| t.unwrap_or("-").to_string();
    let marker = |side: PickSide| if state.side == side { "*" } else { " " };
    match state.screen {
        Screen::Compare => format!(
            "LIGA COMPARE | {} | {}{} (home) vs {}{} (away) | last {}",
            state.division.as_deref().unwrap_or("all divisions"),
            marker(PickSide::Home),
            team(state.home_team()),
            marker(PickSide::Away),
            team(state.away_team()),
            state.window
        ),
        Screen::Team => format!(
            "LIGA TEAM | {} | last {SEASON_WINDOW}",
            team(state.active_team())
        ),
        Screen::Squad => format!("LIGA SQUAD | {}", team(state.active_team())),
        Screen::Props => format!(
            "LIGA PROPS | {} over {:.1} | last {} | >= {:.0}%",
            state.prop_query.market.label(),
            state.prop_query.line,
            state.prop_query.min_matches,
            state.prop_query.min_success_pct
        ),
        Screen::Patterns => format!(
            "LIGA PATTERNS | {} vs {} | rolling {} | n >= {} | hit >= {:.0}%",
            team(state.home_team()),
            team(state.away_team()),
            state.pattern_query.window,
            state.pattern_query.min_sample,
            state.pattern_query.min_hit_rate * 100.0
        ),
    }
}

fn footer_text(screen: Screen) -> &'static str {
    match screen {
        Screen::Compare => "1-5 Screens | h/a Side | j/k Team | d Division | w Window | x Export | ? Help | q Quit",
        Screen::Team => "1-5 Screens | h/a Side | j/k Team | d Division | ? Help | q Quit",
        Screen::Squad => "1-5 Screens | h/a Side | j/k Team | J/K Player | ? Help | q Quit",
        Screen::Props => "1-5 Screens | m Market | +/- Line | n Matches | s Success | ? Help | q Quit",
        Screen::Patterns => "1-5 Screens | h/a Side | j/k Team | p Sample | ? Help | q Quit",
    }
}

fn render_compare(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(c) = state.comparison() else {
        let empty = Paragraph::new("No teams loaded").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(12), Constraint::Min(8), Constraint::Length(8)])
        .split(area);

    let form = Paragraph::new(form_table(&c.home_team, &c.home_form, &c.away_team, &c.away_form))
        .block(Block::default().title("Form (home at home, away on the road)").borders(Borders::ALL));
    frame.render_widget(form, rows[0]);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);
    let home_players = Paragraph::new(rankings_text(&c.home_players))
        .block(Block::default().title(c.home_team.as_str()).borders(Borders::ALL));
    frame.render_widget(home_players, cols[0]);
    let away_players = Paragraph::new(rankings_text(&c.away_players))
        .block(Block::default().title(c.away_team.as_str()).borders(Borders::ALL));
    frame.render_widget(away_players, cols[1]);

    let h2h = Paragraph::new(h2h_text(&c.home_team, &c.away_team, &c.head_to_head))
        .block(Block::default().title("Head to head").borders(Borders::ALL));
    frame.render_widget(h2h, rows[2]);
}

fn form_value(form: &Outcome<FormSummary>, f: &dyn Fn(&FormSummary) -> String) -> String {
    match form {
        Outcome::Ready(s) => f(s),
        Outcome::Empty(reason) => reason.to_string(),
        Outcome::Malformed(issue) => issue.to_string(),
    }
}

fn form_table(
    home: &str,
    home_form: &Outcome<FormSummary>,
    away: &str,
    away_form: &Outcome<FormSummary>,
) -> Text<'static> {
    let metrics: [(&str, &dyn Fn(&FormSummary) -> String); 7] = [
        ("Matches", &|s: &FormSummary| s.matches.to_string()),
        ("Goals for", &|s: &FormSummary| format!("{:.1}", s.goals_for)),
        ("Goals against", &|s: &FormSummary| format!("{:.1}", s.goals_against)),
        ("Shots", &|s: &FormSummary| format!("{:.1}", s.shots)),
        ("Corners", &|s: &FormSummary| format!("{:.1}", s.corners)),
        ("Cards", &|s: &FormSummary| format!("{:.1}", s.cards)),
        ("Fouls", &|s: &FormSummary| format!("{:.1}", s.fouls)),
    ];

    let mut lines = vec![
        Line::styled(
            format!("{:<16}{:<24}{}", "", home, away),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ];
    for (label, f) in metrics {
        lines.push(Line::from(format!(
            "{:<16}{:<24}{}",
            label,
            form_value(home_form, f),
            form_value(away_form, f)
        )));
    }
    let mut streak = vec![Span::raw(format!("{:<16}", "Streak"))];
    streak.extend(streak_spans(home_form, 24));
    streak.extend(streak_spans(away_form, 0));
    lines.push(Line::from(streak));
    Text::from(lines)
}

fn streak_spans(form: &Outcome<FormSummary>, width: usize) -> Vec<Span<'static>> {
    let Some(summary) = form.as_ready() else {
        return vec![Span::raw(format!("{:<width$}", "-"))];
    };
    let mut spans: Vec<Span<'static>> = summary
        .results
        .iter()
        .map(|r| {
            let color = match r {
                MatchResult::Win => Color::Green,
                MatchResult::Draw => Color::Yellow,
                MatchResult::Loss => Color::Red,
            };
            Span::styled(format!("{} ", r.symbol()), Style::default().fg(color))
        })
        .collect();
    let used = summary.results.len() * 2;
    if width > used {
        spans.push(Span::raw(" ".repeat(width - used)));
    }
    spans
}

fn rankings_text(players: &Outcome<PlayerRankings>) -> String {
    let r = match players {
        Outcome::Ready(r) => r,
        Outcome::Empty(reason) => return format!("No player data ({reason})"),
        Outcome::Malformed(issue) => return issue.to_string(),
    };
    let mut lines = vec![format!("[{}]", r.team), "Scorers (G A Min)".to_string()];
    for s in &r.scorers {
        lines.push(format!("  {:<22} {:>2} {:>2} {:>5}", s.player, s.goals, s.assists, s.minutes));
    }
    lines.push("Shots / match (Sh SoT)".to_string());
    for s in &r.shooters {
        lines.push(format!("  {:<22} {:>5.2} {:>5.2}", s.player, s.shots, s.shots_on_target));
    }
    lines.push("Fouls / match (Fls Yel)".to_string());
    for d in &r.disciplinary {
        lines.push(format!("  {:<22} {:>5.2} {:>5.2}", d.player, d.fouls, d.yellow_cards));
    }
    lines.join("\n")
}

fn h2h_text(home: &str, away: &str, meetings: &Outcome<Vec<H2hRow>>) -> String {
    let rows = match meetings {
        Outcome::Ready(rows) => rows,
        Outcome::Empty(reason) => return reason.to_string(),
        Outcome::Malformed(issue) => return issue.to_string(),
    };
    let (wins_home, draws, wins_away) = record(rows, home, away);
    let summary = format!("{home} {wins_home}  draws {draws}  {away} {wins_away}");
    std::iter::once(summary)
        .chain(rows.iter().map(|m| {
            let [h, d, a] = m.odds_labels();
            format!(
                "{} {:<4} {:<18} {:>5} {:<18} {h:>5} {d:>5} {a:>5}",
                m.date_label(),
                m.division,
                m.home_team,
                m.score(),
                m.away_team
            )
        }))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_team(frame: &mut Frame, area: Rect, state: &AppState) {
    let text = match state.team_form() {
        Outcome::Ready(s) => {
            let (w, d, l) = s.record();
            let mut lines = vec![
                format!("Matches: {}  W{w} D{d} L{l}  Points: {}", s.matches, s.points()),
                format!(
                    "Goals/m {:.2}  Conceded/m {:.2}  Shots/m {:.2}  Corners/m {:.2}",
                    s.goals_for, s.goals_against, s.shots, s.corners
                ),
                String::new(),
                "Latest matches:".to_string(),
            ];
            if let Some(latest) = s.entries.last() {
                let tier = division_tier(&latest.division).map_or("-".to_string(), |t| t.to_string());
                lines.insert(0, format!("Division: {} (tier {tier})", latest.division));
            }
            let start = s.log.len().saturating_sub(TEAM_LOG_LINES);
            lines.extend(s.log[start..].iter().cloned());
            lines.join("\n")
        }
        Outcome::Empty(reason) => reason.to_string(),
        Outcome::Malformed(issue) => issue.to_string(),
    };
    let block = Block::default().title("Season form").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn render_squad(frame: &mut Frame, area: Rect, state: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let squad_text = match state.squad() {
        Outcome::Ready(rows) => {
            let mut lines = vec![format!(
                "  {:<24} {:>3} {:>5} {:>2} {:>2} {:>5} {:>5} {:>5} {:>3}",
                "Player", "App", "Min", "G", "A", "Sh/m", "SoT/m", "Fl/m", "Yel"
            )];
            for (idx, r) in rows.iter().enumerate() {
                let prefix = if idx == state.player_idx { "> " } else { "  " };
                lines.push(format!(
                    "{prefix}{:<24} {:>3} {:>5} {:>2} {:>2} {:>5.2} {:>5.2} {:>5.2} {:>3}",
                    r.player,
                    r.appearances,
                    r.minutes,
                    r.goals,
                    r.assists,
                    r.shots,
                    r.shots_on_target,
                    r.fouls,
                    r.yellow_cards
                ));
            }
            lines.join("\n")
        }
        Outcome::Empty(reason) => format!("No squad data ({reason})"),
        Outcome::Malformed(issue) => issue.to_string(),
    };
    let squad = Paragraph::new(squad_text).block(Block::default().title("Squad").borders(Borders::ALL));
    frame.render_widget(squad, cols[0]);

    let detail_text = match state.player_detail() {
        Some((player, log, averages)) => {
            let mut lines = vec![player];
            if let Some(avg) = averages {
                lines.push(format!(
                    "Last {}: Sh {:.1}  SoT {:.1}  Fls {:.1}",
                    avg.matches, avg.shots, avg.shots_on_target, avg.fouls
                ));
            }
            lines.push(String::new());
            for row in log {
                let date = row
                    .date
                    .map(|d| d.format("%d/%m/%Y").to_string())
                    .unwrap_or_else(|| "-".to_string());
                lines.push(format!(
                    "{date} {:>3}' G{} A{} Sh{} SoT{} Fl{} Y{}",
                    row.minutes, row.goals, row.assists, row.shots, row.shots_on_target, row.fouls, row.yellow_cards
                ));
            }
            lines.join("\n")
        }
        None => "No player selected".to_string(),
    };
    let detail = Paragraph::new(detail_text).block(Block::default().title("Player").borders(Borders::ALL));
    frame.render_widget(detail, cols[1]);
}

fn render_props(frame: &mut Frame, area: Rect, state: &AppState) {
    let text = match &state.props {
        Outcome::Ready(rows) => {
            let mut lines = vec![format!(
                "{:<24} {:<18} {:>7} {:>6}  Last 5",
                "Player", "Team", "Hit %", "Avg"
            )];
            for p in rows {
                lines.push(format!(
                    "{:<24} {:<18} {:>6.1}% {:>6.2}  {}",
                    p.player,
                    p.team,
                    p.success_pct,
                    p.average,
                    p.last_five_text()
                ));
            }
            lines.join("\n")
        }
        Outcome::Empty(reason) => format!("No candidates ({reason})"),
        Outcome::Malformed(issue) => issue.to_string(),
    };
    let block = Block::default().title("Player props").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn render_patterns(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(8)])
        .split(area);

    let table = match &state.patterns {
        Outcome::Ready(patterns) => {
            let mut lines = vec![format!(
                "{:<34} {:<9} {:>4} {:>4} {:>7} {:>5} {:>7}",
                "Pattern", "Event", "n", "Hit", "Hit %", "Odds", "EV %"
            )];
            for p in patterns {
                lines.push(format!(
                    "{:<34} {:<9} {:>4} {:>4} {:>6.1}% {:>5.2} {:>6.1}%",
                    p.label(),
                    p.event.label(),
                    p.sample,
                    p.hits,
                    p.hit_rate * 100.0,
                    p.mean_odds,
                    p.expected_value * 100.0
                ));
            }
            lines.join("\n")
        }
        Outcome::Empty(reason) => format!("No value patterns ({reason})"),
        Outcome::Malformed(issue) => issue.to_string(),
    };
    let block = Block::default().title("Value patterns").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(table).block(block), rows[0]);

    let current = match state.pattern_matches() {
        Outcome::Ready(found) => found
            .iter()
            .map(|m| {
                format!(
                    "{:<18} {} {:.2} >= {}  {}  EV {:+.1}%",
                    m.team,
                    m.stat.label(),
                    m.current,
                    m.threshold,
                    m.event.label(),
                    m.expected_value * 100.0
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Outcome::Empty(reason) => format!("No pattern fits this fixture ({reason})"),
        Outcome::Malformed(issue) => issue.to_string(),
    };
    let block = Block::default().title("Fits this fixture").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(current).block(block), rows[1]);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    let start = state.logs.len().saturating_sub(2);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Liga Terminal - Help",
        "",
        "Global:",
        "  1 - 5          Compare / Team / Squad / Props / Patterns",
        "  h / a          Pick home / away side",
        "  j/k or ↑/↓     Change team on the picked side",
        "  d              Division filter",
        "  ?              Toggle help",
        "  q              Quit",
        "",
        "Compare:",
        "  w              Window 5 / 10 / 20",
        "  x              Export to XLSX",
        "",
        "Squad:",
        "  J / K          Select player",
        "",
        "Props:",
        "  m              Market",
        "  + / -          Line",
        "  n              Minimum matches",
        "  s              Minimum success %",
        "",
        "Patterns:",
        "  p              Minimum sample",
    ]
    .join("\n");

    let help = Paragraph::new(text).block(Block::default().title("Help").borders(Borders::ALL));
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
