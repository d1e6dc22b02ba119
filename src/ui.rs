pub mod breakdown;
pub mod hiscores_view;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
    Frame,
};

use crate::app::{App, Screen};
use crate::scoring::{format_score, format_time};
use crate::state::GameState;
use crate::storage::KeyValueStore;
use crate::timer::Clock;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];

pub fn draw<C: Clock, S: KeyValueStore>(app: &App<C, S>, f: &mut Frame) {
    f.render_widget(app, f.area());
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn italic() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

/// Render `lines` centered both ways inside `area`
fn render_centered(lines: Vec<Line<'static>>, area: Rect, buf: &mut Buffer) {
    let height = (lines.len() as u16).min(area.height);
    let top = area.height.saturating_sub(height) / 2;
    let chunk = Rect {
        x: area.x,
        y: area.y + top,
        width: area.width,
        height,
    };

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunk, buf);
}

fn round_header<C: Clock, S: KeyValueStore>(app: &App<C, S>) -> Line<'static> {
    Line::from(Span::styled(
        format!(
            "Round {} of {}",
            app.session.current_round, app.session.total_rounds
        ),
        dim(),
    ))
}

fn target_line(target: Option<f64>) -> Line<'static> {
    Line::from(vec![
        Span::styled("Target  ", bold()),
        Span::styled(
            format!("{}s", format_time(target.unwrap_or_default())),
            bold().fg(Color::Cyan),
        ),
    ])
}

impl<C: Clock, S: KeyValueStore> Widget for &App<C, S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.screen == Screen::HighScores {
            hiscores_view::render_high_scores(&self.high_scores.load(), area, buf);
            return;
        }

        match self.state() {
            GameState::Idle => render_menu(area, buf),
            GameState::RoundReady => render_round_ready(self, area, buf),
            GameState::TimerRunning => render_timer_running(self, area, buf),
            GameState::RoundResult => render_round_result(self, area, buf),
            GameState::GameOver => render_game_over(self, area, buf),
        }
    }
}

fn render_menu(area: Rect, buf: &mut Buffer) {
    let lines = vec![
        Line::from(Span::styled("BLIND TIMER", bold().fg(Color::Yellow))),
        Line::default(),
        Line::from("Stop the clock as close to the target as you can."),
        Line::from("You won't see it tick. Stopping late scores nothing."),
        Line::default(),
        Line::from(Span::styled(
            "(space) start / (h)igh scores / (esc)ape",
            italic(),
        )),
    ];
    render_centered(lines, area, buf);
}

fn render_round_ready<C: Clock, S: KeyValueStore>(app: &App<C, S>, area: Rect, buf: &mut Buffer) {
    let lines = vec![
        round_header(app),
        Line::default(),
        target_line(app.session.target_time),
        Line::default(),
        Line::from(Span::styled(
            "(space) start the clock, then stop it when you think the target has passed",
            italic(),
        )),
    ];
    render_centered(lines, area, buf);
}

fn render_timer_running<C: Clock, S: KeyValueStore>(
    app: &App<C, S>,
    area: Rect,
    buf: &mut Buffer,
) {
    let spinner = SPINNER[(app.ticks % SPINNER.len() as u64) as usize];
    let lines = vec![
        round_header(app),
        Line::default(),
        target_line(app.session.target_time),
        Line::default(),
        Line::from(Span::styled(
            format!("{spinner}  timing..."),
            bold().fg(Color::Magenta),
        )),
        Line::default(),
        Line::from(Span::styled("(space) stop", italic())),
    ];
    render_centered(lines, area, buf);
}

fn render_round_result<C: Clock, S: KeyValueStore>(
    app: &App<C, S>,
    area: Rect,
    buf: &mut Buffer,
) {
    let Some(summary) = app.last_summary() else {
        return;
    };

    let diff_style = if summary.is_over {
        bold().fg(Color::Red)
    } else {
        bold().fg(Color::Green)
    };
    let score_style = if summary.score == 0 {
        bold().fg(Color::DarkGray)
    } else {
        bold().fg(Color::Yellow)
    };
    let legend = if app.session.is_last_round() {
        "(space) final results"
    } else {
        "(space) next round"
    };

    let lines = vec![
        round_header(app),
        Line::default(),
        Line::from(format!("Target   {}s", summary.formatted_target)),
        Line::from(format!("Stopped  {}s", summary.formatted_elapsed)),
        Line::from(vec![
            Span::raw("Off by   "),
            Span::styled(format!("{}s", summary.signed_difference()), diff_style),
        ]),
        Line::default(),
        Line::from(Span::styled(
            format!("+{} points", summary.formatted_score),
            score_style,
        )),
        Line::default(),
        Line::from(Span::styled(legend, italic())),
    ];
    render_centered(lines, area, buf);
}

fn render_game_over<C: Clock, S: KeyValueStore>(app: &App<C, S>, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(1), // total
            Constraint::Length(1), // miss stats
            Constraint::Min(3),    // breakdown
            Constraint::Length(3), // name entry / save status
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled("GAME OVER", bold().fg(Color::Yellow)))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    Paragraph::new(Span::styled(
        format!("Final score {}", format_score(app.session.total_score())),
        bold(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    if let Some((avg_miss, spread)) = app.miss_stats() {
        Paragraph::new(Span::styled(
            format!("avg miss {avg_miss:.2}s   {spread:.2} sd"),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
    }

    breakdown::breakdown_table(&app.session.round_results).render(chunks[3], buf);

    match (&app.name_entry, app.save_result) {
        (Some(name), _) => {
            Paragraph::new(Line::from(vec![
                Span::styled(name.clone(), bold()),
                Span::styled("_", dim()),
            ]))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("New high score! Enter your name (enter to save, esc to skip)"),
            )
            .alignment(Alignment::Center)
            .render(chunks[4], buf);
        }
        (None, Some(true)) => {
            Paragraph::new(Span::styled("Score saved", bold().fg(Color::Green)))
                .alignment(Alignment::Center)
                .render(chunks[4], buf);
        }
        (None, Some(false)) => {
            Paragraph::new(Span::styled(
                "Could not save score",
                bold().fg(Color::Red),
            ))
            .alignment(Alignment::Center)
            .render(chunks[4], buf);
        }
        (None, None) => {}
    }

    Paragraph::new(Span::styled(
        "(p)lay again / (m)enu / (h)igh scores / (esc)ape",
        italic(),
    ))
    .render(chunks[5], buf);
}
