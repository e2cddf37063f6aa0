use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};
use tugmath::{
    session::{GameMode, Player},
    timers::Scheduler,
};

use super::{bold_style, dim_style, legend_style, rope_bar, HORIZONTAL_MARGIN, VERTICAL_MARGIN};
use crate::App;

pub fn render<S: Scheduler>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let state = app.controller.state();
    let view = app.controller.view();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // timer
            Constraint::Length(1), // side labels
            Constraint::Length(1), // rope
            Constraint::Length(1), // padding
            Constraint::Min(5),    // questions
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled(view.timer_display.clone(), dim_style().patch(bold_style())))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let labels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    let p1_label = match state.game_mode {
        GameMode::Single => "YOU",
        GameMode::TwoPlayer => "PLAYER 1",
    };
    Paragraph::new(Span::styled(
        format!("{p1_label} ({})", state.score),
        side_style(app, Player::One),
    ))
    .alignment(Alignment::Left)
    .render(labels[0], buf);
    Paragraph::new(Span::styled(
        format!("({}) {}", state.opponent_score, state.game_mode.opponent_label()),
        side_style(app, Player::Two),
    ))
    .alignment(Alignment::Right)
    .render(labels[1], buf);

    Paragraph::new(Span::styled(
        rope_bar::rope_line(view.rope_position, chunks[2].width),
        bold_style().fg(Color::Yellow),
    ))
    .render(chunks[2], buf);

    match state.game_mode {
        GameMode::Single => {
            let boxes = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Percentage(25),
                    Constraint::Percentage(50),
                    Constraint::Percentage(25),
                ])
                .split(chunks[4]);
            render_question(app, Player::One, view.player1_question.as_deref(), boxes[1], buf);
        }
        GameMode::TwoPlayer => {
            let boxes = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(chunks[4]);
            render_question(app, Player::One, view.player1_question.as_deref(), boxes[0], buf);
            render_question(app, Player::Two, view.player2_question.as_deref(), boxes[1], buf);
        }
    }

    let legend = match state.game_mode {
        GameMode::Single => "(enter) answer / (esc) menu",
        GameMode::TwoPlayer => "(tab) switch player / (enter) answer / (esc) menu",
    };
    Paragraph::new(legend)
        .style(legend_style())
        .alignment(Alignment::Center)
        .render(chunks[5], buf);
}

/// Flash the side whose answer was just judged
fn side_style<S: Scheduler>(app: &App<S>, player: Player) -> Style {
    match app.feedback {
        Some(sub) if sub.player == player && sub.correct => bold_style().fg(Color::Green),
        Some(sub) if sub.player == player => bold_style().fg(Color::Red),
        _ => bold_style(),
    }
}

fn render_question<S: Scheduler>(
    app: &App<S>,
    player: Player,
    question: Option<&str>,
    area: Rect,
    buf: &mut Buffer,
) {
    let focused = app.focus == player;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(if focused {
            BorderType::Thick
        } else {
            BorderType::Plain
        })
        .title(format!(" Player {} ", player.number()));

    let cursor = if focused { "_" } else { "" };
    let lines = vec![
        Line::from(Span::styled(
            question.unwrap_or_default().to_string(),
            bold_style().add_modifier(Modifier::UNDERLINED),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("= ", dim_style()),
            Span::styled(format!("{}{cursor}", app.input(player)), bold_style()),
        ]),
    ];

    Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .render(area, buf);
}
