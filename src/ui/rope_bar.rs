use tugmath::rope::{OPPONENT_THRESHOLD, PLAYER_ONE_THRESHOLD};

const ROPE: char = '═';
const FLAG: char = '┃';
const MARKER: char = '●';

/// Column of a percentage position inside a bar `width` cells wide
pub fn column_for(position: f64, width: u16) -> u16 {
    if width == 0 {
        return 0;
    }
    let last = f64::from(width - 1);
    ((position.clamp(0.0, 100.0) / 100.0) * last).round() as u16
}

/// Rope drawn as text with both threshold flags and the marker
pub fn rope_line(position: f64, width: u16) -> String {
    let mut cells = vec![ROPE; usize::from(width)];
    if cells.is_empty() {
        return String::new();
    }
    cells[usize::from(column_for(PLAYER_ONE_THRESHOLD, width))] = FLAG;
    cells[usize::from(column_for(OPPONENT_THRESHOLD, width))] = FLAG;
    cells[usize::from(column_for(position, width))] = MARKER;
    cells.into_iter().collect()
}
