use buildview::{result_title, BuildResult};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn create_cyan_header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

/// Result title colored by outcome; in-progress results are blue.
pub fn result_cell(code: Option<i64>) -> Cell {
    let cell = Cell::new(result_title(code));
    match code.and_then(BuildResult::from_code) {
        None if code.is_none() => cell.fg(TableColor::Blue),
        Some(BuildResult::Success) => cell.fg(TableColor::Green),
        Some(BuildResult::Warnings) => cell.fg(TableColor::Yellow),
        Some(BuildResult::Failure | BuildResult::Exception) => cell.fg(TableColor::Red),
        Some(BuildResult::Cancelled | BuildResult::Retry) => cell.fg(TableColor::Magenta),
        _ => cell.fg(TableColor::Grey),
    }
}
