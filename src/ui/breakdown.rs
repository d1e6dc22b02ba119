use ratatui::{
    layout::Constraint,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table},
};

use crate::scoring::{format_score, format_time, RoundSummary};
use crate::state::RoundResult;

/// Colour for how far off a round landed
fn miss_color(summary: &RoundSummary) -> Color {
    if summary.is_over {
        Color::Red
    } else if summary.difference < 0.1 {
        Color::Green
    } else if summary.difference < 0.5 {
        Color::Yellow
    } else {
        Color::Gray
    }
}

/// Pure presenter for a single round of the game-over breakdown
pub fn present_round_row(result: &RoundResult) -> Row<'static> {
    let summary = RoundSummary::new(result.target_time, result.elapsed_time, result.score);

    let score_style = if result.score == 0 {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    Row::new(vec![
        Cell::from(format!("Round {}", result.round)),
        Cell::from(format!(
            "{}s / {}s",
            format_time(result.elapsed_time),
            format_time(result.target_time)
        )),
        Cell::from(format!("{}s", summary.signed_difference()))
            .style(Style::default().fg(miss_color(&summary))),
        Cell::from(format_score(result.score)).style(score_style),
    ])
}

pub fn breakdown_table(results: &[RoundResult]) -> Table<'static> {
    let header = Row::new(vec![
        Cell::from("Round"),
        Cell::from("Stopped / Target"),
        Cell::from("Off by"),
        Cell::from("Points"),
    ])
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    Table::new(
        results.iter().map(present_round_row).collect::<Vec<_>>(),
        [
            Constraint::Length(10),
            Constraint::Length(18),
            Constraint::Length(10),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title("Rounds"))
}
