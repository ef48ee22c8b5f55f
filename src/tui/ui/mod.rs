pub mod detail;
mod table;

use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::tui::app::{App, AppMode};
use crate::tui::help_text::help_lines;
use detail::render_detail;
use table::render_issue_table;

/// A rectangle centered in `area`, sized as a percentage of it.
pub fn centered_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

pub fn render(frame: &mut Frame, app: &mut App) {
    app.clear_expired_status_message();
    let area = frame.area();

    let show_search = app.mode == AppMode::Search;
    let show_error = app.error.is_some();
    let [title, search, banner, content, status] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(if show_search { 3 } else { 0 }),
        Constraint::Length(if show_error { 1 } else { 0 }),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_title_bar(frame, app, title);
    if show_search {
        render_search_bar(frame, app, search);
    }
    if let Some(error) = &app.error {
        frame.render_widget(
            Paragraph::new(format!(" ✗ {error}"))
                .style(Style::default().fg(Color::White).bg(Color::Red)),
            banner,
        );
    }
    render_issue_table(frame, app, content);
    render_status_bar(frame, app, status);

    if app.detail.is_some() && matches!(app.mode, AppMode::Detail | AppMode::Help) {
        render_detail(frame, app, area);
    }
    if app.mode == AppMode::Help {
        render_help_popup(frame, app, area);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(
            " mojira ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            format!("{} ({})", app.project.label(), app.project),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ];
    if !app.search.is_empty() {
        spans.push(Span::styled(
            format!("  {}", app.search),
            Style::default().fg(Color::Yellow),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_search_bar(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Search (JQL) · Enter apply · Esc cancel ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let input = Paragraph::new(format!("{}█", app.search_input)).block(block);
    frame.render_widget(input, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let page = format!(
        " Page {} of {} ",
        app.table.pagination.page_index + 1,
        app.page_count()
    );
    let mut spans = vec![
        Span::styled(page, Style::default().fg(Color::Black).bg(Color::Gray)),
        Span::raw(format!(" {} issues ", app.total())),
    ];
    if app.loading {
        spans.push(Span::styled(" ⟳ loading ", Style::default().fg(Color::Yellow)));
    }
    match &app.status_message {
        Some((message, _)) => spans.push(Span::styled(
            format!(" {message}"),
            Style::default().fg(Color::Green),
        )),
        None => spans.push(Span::styled(
            " ? help · / search · s sort · Enter open · q quit",
            Style::default().fg(Color::DarkGray),
        )),
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_help_popup(frame: &mut Frame, app: &App, area: Rect) {
    let popup = centered_area(area, 60, 80);
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let help = Paragraph::new(help_lines(&app.keybindings))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.help_scroll, 0));
    frame.render_widget(help, popup);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_full_size() {
        let area = Rect::new(0, 0, 100, 50);
        assert_eq!(centered_area(area, 100, 100), area);
    }

    #[test]
    fn test_centered_overlay_stays_inside() {
        let centered = centered_area(Rect::new(0, 0, 100, 50), 90, 90);
        assert_eq!((centered.width, centered.height), (90, 45));
        assert!(centered.x >= 4 && centered.x <= 6);
        assert!(centered.y >= 1 && centered.y <= 3);
    }
}
