use anyhow::Result;
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

use savings_challenge::{
    AppState, Challenge, ColorManager, ColorScheme, Rgb, Savings, Stats, Tab,
};

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

pub struct App<'c> {
    pub challenges: Vec<Challenge>,
    pub savings: Vec<Savings>,
    pub stats: Stats,
    pub scheme: ColorScheme,
    pub state: AppState,
    pub challenge_table: TableState,
    pub savings_table: TableState,
    pub status: String,
    colors: ColorManager<'c>,
}

impl<'c> App<'c> {
    pub fn new(
        challenges: Vec<Challenge>,
        savings: Vec<Savings>,
        stats: Stats,
        colors: ColorManager<'c>,
    ) -> Result<Self> {
        let load = colors.current_scheme()?;
        let status = if load.is_corrupt() {
            "Stored theme unreadable, showing light theme".to_string()
        } else {
            String::new()
        };

        let mut challenge_table = TableState::default();
        if !challenges.is_empty() {
            challenge_table.select(Some(0));
        }
        let mut savings_table = TableState::default();
        if !savings.is_empty() {
            savings_table.select(Some(0));
        }

        Ok(App {
            challenges,
            savings,
            stats,
            scheme: load.into_scheme(),
            state: AppState::new(),
            challenge_table,
            savings_table,
            status,
            colors,
        })
    }

    fn active_table(&mut self) -> Option<(&mut TableState, usize)> {
        match self.state.tab_bar.selected {
            Tab::Challenges => Some((&mut self.challenge_table, self.challenges.len())),
            Tab::Savings => Some((&mut self.savings_table, self.savings.len())),
            _ => None,
        }
    }

    pub fn next(&mut self) {
        if let Some((table, len)) = self.active_table() {
            if len == 0 {
                return;
            }
            let i = match table.selected() {
                Some(i) if i + 1 < len => i + 1,
                _ => 0,
            };
            table.select(Some(i));
        }
    }

    pub fn previous(&mut self) {
        if let Some((table, len)) = self.active_table() {
            if len == 0 {
                return;
            }
            let i = match table.selected() {
                Some(0) | None => len - 1,
                Some(i) => i - 1,
            };
            table.select(Some(i));
        }
    }

    pub fn open_selected(&mut self) {
        if self.state.tab_bar.selected != Tab::Challenges {
            return;
        }
        let id = self
            .challenge_table
            .selected()
            .and_then(|i| self.challenges.get(i))
            .map(|c| c.id.clone());
        if let Some(id) = id {
            self.state.open_challenge(&id);
        }
    }

    pub fn toggle_theme(&mut self) {
        let next = if self.scheme.is_dark() {
            ColorScheme::light()
        } else {
            ColorScheme::dark()
        };

        match self.colors.set_scheme(&next) {
            Ok(_) => {
                self.status = format!("Theme: {}", next.name);
                self.scheme = next;
            }
            Err(e) => self.status = format!("Could not save theme: {}", e),
        }
    }

    fn open_challenge(&self) -> Option<&Challenge> {
        let id = self.state.router.current()?;
        self.challenges.iter().find(|c| c.id == id)
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    loop_outcome(res)
}

/// A failed UI loop is reported to the caller (non-zero exit), after the terminal is restored
fn loop_outcome(res: io::Result<()>) -> Result<()> {
    res.map_err(|err| {
        log::error!("UI loop failed: {:?}", err);
        anyhow::Error::new(err).context("terminal UI failed")
    })
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Esc => {
                    if app.state.router.is_at_root() {
                        return Ok(());
                    }
                    app.state.close_challenge();
                }
                KeyCode::Tab if app.state.tab_bar.visible => {
                    let next = app.state.tab_bar.selected.next();
                    app.state.switch_tab(next);
                }
                KeyCode::BackTab if app.state.tab_bar.visible => {
                    let prev = app.state.tab_bar.selected.previous();
                    app.state.switch_tab(prev);
                }
                KeyCode::Char(c @ '1'..='5') if app.state.tab_bar.visible => {
                    let idx = c as usize - '1' as usize;
                    app.state.switch_tab(Tab::ALL[idx]);
                }
                KeyCode::Enter => app.open_selected(),
                KeyCode::Char('t') if app.state.tab_bar.selected == Tab::Settings => {
                    app.toggle_theme()
                }
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let base = Style::default()
        .bg(color(app.scheme.background))
        .fg(color(app.scheme.text));
    f.render_widget(Block::default().style(base), f.size());

    let tab_bar_height = if app.state.tab_bar.visible { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),                 // Content area
            Constraint::Length(1),              // Status line
            Constraint::Length(tab_bar_height), // Tab bar (hidden inside a challenge)
        ])
        .split(f.size());

    if app.open_challenge().is_some() {
        render_challenge_detail(f, chunks[0], app);
    } else {
        match app.state.tab_bar.selected {
            Tab::Home => render_home(f, chunks[0], app),
            Tab::Challenges => render_challenges(f, chunks[0], app),
            Tab::Savings => render_savings(f, chunks[0], app),
            Tab::Stats => render_stats(f, chunks[0], app),
            Tab::Settings => render_settings(f, chunks[0], app),
        }
    }

    let status = Paragraph::new(Span::styled(
        app.status.clone(),
        Style::default().fg(color(app.scheme.accent)),
    ));
    f.render_widget(status, chunks[1]);

    if app.state.tab_bar.visible {
        render_tab_bar(f, chunks[2], app);
    }
}

fn block<'a>(title: &'a str, scheme: &ColorScheme) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color(scheme.primary)))
}

fn render_tab_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![];
    for (i, tab) in Tab::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" │ "));
        }
        let style = if *tab == app.state.tab_bar.selected {
            Style::default()
                .fg(color(app.scheme.primary))
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(color(app.scheme.secondary))
        };
        spans.push(Span::styled(format!("{} {}", i + 1, tab.title()), style));
    }

    let bar = Paragraph::new(Line::from(spans)).block(block("", &app.scheme));
    f.render_widget(bar, area);
}

fn render_home(f: &mut Frame, area: Rect, app: &App) {
    let today = Local::now().date_naive();
    let active: Vec<&Challenge> = app
        .challenges
        .iter()
        .filter(|c| c.is_active_on(today))
        .collect();

    let mut lines = vec![
        Line::from(format!("Total saved: ${:.2}", app.stats.total_saved)),
        Line::from(format!("Current streak: {} days", app.stats.current_streak_days)),
        Line::from(""),
        Line::from(format!("Active challenges: {}", active.len())),
    ];
    for c in active {
        lines.push(Line::from(format!(
            "  • {} ({:.0}%)",
            c.title,
            c.progress(&app.savings) * 100.0
        )));
    }

    f.render_widget(Paragraph::new(lines).block(block(" Home ", &app.scheme)), area);
}

fn render_challenges(f: &mut Frame, area: Rect, app: &mut App) {
    let header = Row::new(["Title", "Goal", "Saved", "Frequency", "Status"].map(|h| {
        Cell::from(h).style(Style::default().add_modifier(Modifier::BOLD))
    }));

    let rows: Vec<Row> = app
        .challenges
        .iter()
        .map(|c| {
            Row::new(vec![
                Cell::from(c.title.clone()),
                Cell::from(format!("{:.2} {}", c.goal_amount, c.currency)),
                Cell::from(format!("{:.2}", c.saved_amount(&app.savings))),
                Cell::from(c.frequency.as_str()),
                Cell::from(if c.completed { "done" } else { "open" }),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(35),
            Constraint::Percentage(20),
            Constraint::Percentage(15),
            Constraint::Percentage(15),
            Constraint::Percentage(15),
        ],
    )
    .header(header)
    .block(block(" Challenges (Enter to open) ", &app.scheme))
    .highlight_style(Style::default().fg(color(app.scheme.accent)).add_modifier(Modifier::BOLD))
    .highlight_symbol("> ");

    f.render_stateful_widget(table, area, &mut app.challenge_table);
}

fn render_challenge_detail(f: &mut Frame, area: Rect, app: &App) {
    let Some(challenge) = app.open_challenge() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let progress = challenge.progress(&app.savings);
    let gauge = Gauge::default()
        .block(block(" Progress ", &app.scheme))
        .gauge_style(Style::default().fg(color(app.scheme.primary)))
        .ratio(progress)
        .label(format!("{:.0}%", progress * 100.0));
    f.render_widget(gauge, chunks[0]);

    let mut lines = vec![
        Line::from(Span::styled(
            challenge.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(challenge.description.clone()),
        Line::from(""),
        Line::from(format!(
            "Saved {:.2} of {:.2} {}",
            challenge.saved_amount(&app.savings),
            challenge.goal_amount,
            challenge.currency
        )),
        Line::from(format!("Started {}", challenge.start_date)),
    ];
    if let Some(end) = challenge.end_date {
        lines.push(Line::from(format!("Ends {}", end)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from("Esc to go back"));

    f.render_widget(
        Paragraph::new(lines).block(block(" Challenge ", &app.scheme)),
        chunks[1],
    );
}

fn render_savings(f: &mut Frame, area: Rect, app: &mut App) {
    let header = Row::new(["Date", "Amount", "Note"].map(|h| {
        Cell::from(h).style(Style::default().add_modifier(Modifier::BOLD))
    }));

    let rows: Vec<Row> = app
        .savings
        .iter()
        .map(|s| {
            Row::new(vec![
                Cell::from(s.saved_on.to_string()),
                Cell::from(format!("{:.2}", s.amount)),
                Cell::from(s.note.clone()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(block(" Savings ", &app.scheme))
    .highlight_style(Style::default().fg(color(app.scheme.accent)))
    .highlight_symbol("> ");

    f.render_stateful_widget(table, area, &mut app.savings_table);
}

fn render_stats(f: &mut Frame, area: Rect, app: &App) {
    let s = &app.stats;
    let lines = vec![
        Line::from(format!("Profile: {}", s.profile_id)),
        Line::from(format!("Total saved: ${:.2}", s.total_saved)),
        Line::from(format!("Deposits: {}", s.savings_count)),
        Line::from(format!("Challenges completed: {}", s.challenges_completed)),
        Line::from(format!("Current streak: {} days", s.current_streak_days)),
        Line::from(format!("Longest streak: {} days", s.longest_streak_days)),
    ];
    f.render_widget(Paragraph::new(lines).block(block(" Stats ", &app.scheme)), area);
}

fn render_settings(f: &mut Frame, area: Rect, app: &App) {
    let lines = vec![
        Line::from(format!("Theme: {} ({})", app.scheme.name, app.scheme.mode.as_str())),
        Line::from(""),
        Line::from("t  toggle light/dark theme"),
        Line::from("q  quit"),
    ];
    f.render_widget(Paragraph::new(lines).block(block(" Settings ", &app.scheme)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_error_is_returned() {
        let res: io::Result<()> = Err(io::Error::new(io::ErrorKind::BrokenPipe, "tty gone"));
        let err = loop_outcome(res).unwrap_err();
        assert!(format!("{:#}", err).contains("tty gone"));

        assert!(loop_outcome(Ok(())).is_ok());
    }
}
