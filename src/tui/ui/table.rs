//! The issue table.

use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState as ViewState};
use unicode_width::UnicodeWidthStr;

use crate::table::{Column, PinSide, SortDirection, TableState, cell_text};
use crate::tui::app::App;

/// Column widths are stored in pixels; a terminal cell is about eight.
const PIXELS_PER_CELL: u16 = 8;

pub fn cell_width(width: u16) -> u16 {
    (width / PIXELS_PER_CELL).max(4)
}

/// Header text: title, sort arrow and pin marker.
pub fn header_label(table: &TableState, column: &Column) -> String {
    let mut label = column.title.to_string();
    match table.sort_direction(column.id) {
        Some(SortDirection::Asc) => label.push_str(" ▲"),
        Some(SortDirection::Desc) => label.push_str(" ▼"),
        None => {}
    }
    match table.pinned_side(column.id) {
        Some(PinSide::Left) => label.insert_str(0, "⇤ "),
        Some(PinSide::Right) => label.push_str(" ⇥"),
        None => {}
    }
    label
}

pub fn render_issue_table(frame: &mut Frame, app: &App, area: Rect) {
    let columns = app.visible_columns();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let Some(page) = &app.page else {
        let message = if app.loading {
            "Loading issues…"
        } else {
            "No results."
        };
        frame.render_widget(
            Paragraph::new(Span::styled(message, Style::default().fg(Color::DarkGray))).block(block),
            area,
        );
        return;
    };

    let header_style = Style::default().add_modifier(Modifier::BOLD);
    let header = Row::new(columns.iter().enumerate().map(|(i, column)| {
        let style = if i == app.selected_column {
            header_style.add_modifier(Modifier::REVERSED)
        } else {
            header_style
        };
        Cell::from(header_label(&app.table, column)).style(style)
    }))
    .style(Style::default().fg(Color::Cyan))
    .bottom_margin(1);

    let rows = page.issues.iter().map(|issue| {
        Row::new(columns.iter().map(|column| {
            let text = cell_text(issue, column.id);
            if column.numeric {
                let width = usize::from(cell_width(app.table.width(column.id)));
                let pad = width.saturating_sub(text.width());
                Cell::from(Line::from(format!("{}{text}", " ".repeat(pad))))
            } else {
                Cell::from(text)
            }
        }))
    });

    let widths = columns
        .iter()
        .map(|column| Constraint::Length(cell_width(app.table.width(column.id))));

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .column_spacing(1)
        .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .column_highlight_style(Style::default().fg(Color::Yellow))
        .highlight_symbol("▶ ");

    let mut state = ViewState::default()
        .with_selected(Some(app.selected_row))
        .with_selected_column(Some(app.selected_column));
    frame.render_stateful_widget(table, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::columns;

    #[test]
    fn test_cell_width() {
        assert_eq!(cell_width(400), 50);
        assert_eq!(cell_width(75), 9);
        assert_eq!(cell_width(20), 4);
    }

    #[test]
    fn test_header_label_markers() {
        let mut table = TableState::default();
        let created = columns::find("created").unwrap();
        assert_eq!(header_label(&table, created), "Created");

        table.toggle_sort("created").unwrap();
        table.pin("created", PinSide::Left).unwrap();
        assert_eq!(header_label(&table, created), "⇤ Created ▲");

        table.toggle_sort("created").unwrap();
        table.pin("created", PinSide::Right).unwrap();
        assert_eq!(header_label(&table, created), "Created ▼ ⇥");
    }
}
