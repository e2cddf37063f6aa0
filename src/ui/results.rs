use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Color,
    text::Span,
    widgets::{Paragraph, Widget, Wrap},
};
use tugmath::timers::Scheduler;

use super::{bold_style, legend_style, HORIZONTAL_MARGIN, VERTICAL_MARGIN};
use crate::App;

pub fn render<S: Scheduler>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let Some(result) = app.controller.view().result else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1), // title
            Constraint::Length(1), // padding
            Constraint::Length(2), // message
            Constraint::Min(1),
            Constraint::Length(1), // legend
        ])
        .split(area);

    let color = if result.winner.is_human() {
        Color::Green
    } else {
        Color::Red
    };

    Paragraph::new(Span::styled(result.title(), bold_style().fg(color)))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    Paragraph::new(result.message())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[3], buf);

    Paragraph::new("(p)lay again / (esc)ape")
        .style(legend_style())
        .alignment(Alignment::Center)
        .render(chunks[5], buf);
}
