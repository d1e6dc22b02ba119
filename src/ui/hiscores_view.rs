use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::hiscores::{HighScoreEntry, MAX_SCORES};
use crate::scoring::format_score;

/// Pure presenter for one high-score line
pub fn present_entry_row(rank: usize, entry: &HighScoreEntry) -> Row<'static> {
    let rank_style = match rank {
        1 => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        2 | 3 => Style::default().add_modifier(Modifier::BOLD),
        _ => Style::default(),
    };

    Row::new(vec![
        Cell::from(format!("{rank}.")).style(rank_style),
        Cell::from(entry.name.clone()),
        Cell::from(format_score(entry.score)).style(Style::default().fg(Color::Cyan)),
        Cell::from(format!("{} rds", entry.rounds)),
        Cell::from(entry.formatted_date()).style(Style::default().fg(Color::Gray)),
    ])
}

/// Widest name in the list, so the name column never truncates
fn name_column_width(entries: &[HighScoreEntry]) -> u16 {
    entries
        .iter()
        .map(|e| e.name.width())
        .max()
        .unwrap_or(0)
        .max("Name".len()) as u16
}

pub fn render_high_scores(entries: &[HighScoreEntry], area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3),                     // title
            Constraint::Length(MAX_SCORES as u16 + 3), // table
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new("High Scores")
        .block(Block::default().borders(Borders::ALL))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    if entries.is_empty() {
        Paragraph::new("No scores yet!")
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);
    } else {
        let header = Row::new(vec![
            Cell::from("#"),
            Cell::from("Name"),
            Cell::from("Score"),
            Cell::from("Rounds"),
            Cell::from("Date"),
        ])
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        let rows: Vec<Row> = entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| present_entry_row(idx + 1, entry))
            .collect();

        Table::new(
            rows,
            [
                Constraint::Length(4),
                Constraint::Length(name_column_width(entries)),
                Constraint::Length(10),
                Constraint::Length(8),
                Constraint::Length(10),
            ],
        )
        .header(header)
        .block(Block::default().borders(Borders::ALL))
        .render(chunks[1], buf);
    }

    Paragraph::new("(b)ack / (esc)")
        .style(Style::default().add_modifier(Modifier::ITALIC))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
}
