use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use tugmath::{
    config::MAX_LEVEL,
    problem::Operation,
    session::GameMode,
    timers::Scheduler,
};

use super::{bold_style, dim_style, legend_style, HORIZONTAL_MARGIN, VERTICAL_MARGIN};
use crate::App;

fn operation_key(op: Operation) -> char {
    match op {
        Operation::Addition => 'a',
        Operation::Subtraction => 's',
        Operation::Multiplication => 'm',
        Operation::Division => 'd',
    }
}

pub fn render<S: Scheduler>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let state = app.controller.state();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Length(3), // mode
            Constraint::Length(1), // level
            Constraint::Length(1), // padding
            Constraint::Min(4),    // operations
            Constraint::Length(2), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled(
        "TUG OF WAR MATH",
        bold_style().fg(Color::Yellow),
    ))
    .block(Block::default().borders(Borders::BOTTOM))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    let mode_tab = |mode: GameMode, label: &'static str| {
        if state.game_mode == mode {
            Span::styled(format!("[{label}]"), bold_style().fg(Color::Cyan))
        } else {
            Span::styled(format!(" {label} "), dim_style())
        }
    };
    Paragraph::new(vec![
        Line::from(vec![
            mode_tab(GameMode::Single, "1 PLAYER"),
            Span::raw("  "),
            mode_tab(GameMode::TwoPlayer, "2 PLAYERS"),
        ]),
        Line::from(Span::styled(
            state.game_mode.description(),
            Style::default().fg(Color::Gray),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .render(chunks[1], buf);

    let level_line = Line::from(vec![
        Span::raw("◀ "),
        Span::styled(format!("Level {}", state.level), bold_style()),
        Span::styled(format!(" / {MAX_LEVEL}"), dim_style()),
        Span::raw(" ▶"),
    ]);
    Paragraph::new(level_line)
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    let op_lines = Operation::ALL
        .iter()
        .map(|op| {
            let style = if *op == state.operation {
                bold_style().fg(Color::Green)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("({}) ", operation_key(*op)), dim_style()),
                Span::styled(format!("{} {}", op.symbol(), op), style),
            ])
        })
        .collect::<Vec<Line>>();
    Paragraph::new(op_lines)
        .alignment(Alignment::Center)
        .render(chunks[4], buf);

    Paragraph::new(
        "(a/s/m/d) start / (enter) start highlighted / (tab) mode / (←/→) level / (esc)ape",
    )
    .style(legend_style())
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .render(chunks[5], buf);
}
