pub mod arena;
pub mod dashboard;
pub mod results;
pub mod rope_bar;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};
use tugmath::timers::Scheduler;

use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

fn bold_style() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim_style() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn legend_style() -> Style {
    Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::ITALIC)
}

impl<S: Scheduler> Widget for &App<S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state() {
            AppState::Dashboard => dashboard::render(self, area, buf),
            AppState::Playing => arena::render(self, area, buf),
            AppState::Results => results::render(self, area, buf),
        }
    }
}
