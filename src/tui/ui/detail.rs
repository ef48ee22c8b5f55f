//! The issue detail overlay.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
};

use crate::api::Issue;
use crate::detail::{FieldKind, fields};
use crate::render::CodeRenderer;
use crate::render::text::{self, StyledLines};
use crate::tui::app::App;

use super::centered_area;

const LABEL_WIDTH: usize = 26;

/// Field grid followed by the rendered description.
pub fn detail_lines(issue: &Issue, code: &dyn CodeRenderer<StyledLines>) -> Vec<Line<'static>> {
    let label_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let badge_style = Style::default().fg(Color::Black).bg(Color::Gray);
    let empty_style = Style::default().fg(Color::DarkGray);

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                issue.key.clone(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                issue.summary().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(Span::styled(
            issue.browse_url(),
            Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
        )),
        Line::default(),
    ];

    for field in fields(issue) {
        let label = format!("{:<width$}", field.label, width = LABEL_WIDTH);
        let mut spans = vec![Span::styled(label, label_style)];
        if field.values.is_empty() {
            spans.push(Span::styled("-", empty_style));
            lines.push(Line::from(spans));
            continue;
        }
        match field.kind {
            FieldKind::Text => {
                spans.push(Span::raw(field.display()));
                lines.push(Line::from(spans));
            }
            FieldKind::Badges => {
                for value in &field.values {
                    spans.push(Span::styled(format!(" {value} "), badge_style));
                    spans.push(Span::raw(" "));
                }
                lines.push(Line::from(spans));
            }
            FieldKind::Lines => {
                let indent = " ".repeat(LABEL_WIDTH);
                for (i, value) in field.values.iter().enumerate() {
                    if i == 0 {
                        spans.push(Span::raw(value.clone()));
                        lines.push(Line::from(std::mem::take(&mut spans)));
                    } else {
                        lines.push(Line::from(format!("{indent}{value}")));
                    }
                }
            }
        }
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "Description",
        Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    )));
    lines.push(Line::default());
    match issue.description() {
        Some(description) => lines.extend(text::render(&description, code)),
        None => lines.push(Line::from(Span::styled("No description.", empty_style))),
    }
    lines
}

pub fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let Some(detail) = &app.detail else {
        return;
    };
    let popup = centered_area(area, 90, 90);
    frame.render_widget(Clear, popup);

    let title = format!(" {} ", detail.issue.key);
    let block = Block::default()
        .title(title)
        .title_bottom(" j/k scroll · o open · y copy URL · Esc close ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(detail.lines.clone())
        .block(block)
        .scroll((app.detail_scroll, 0));
    frame.render_widget(paragraph, popup);

    if detail.lines.len() > popup.height.saturating_sub(2) as usize {
        let mut state = ScrollbarState::new(detail.lines.len()).position(app.detail_scroll as usize);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            popup,
            &mut state,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::text::{PlainLines, to_plain_text};
    use serde_json::json;
    use unicode_width::UnicodeWidthStr;

    fn label_column(line: &Line<'_>) -> Option<usize> {
        line.spans.first().map(|span| span.content.width())
    }

    fn issue(description: serde_json::Value) -> Issue {
        serde_json::from_value(json!({
            "key": "MC-12",
            "fields": {
                "summary": "Water flows upward",
                "labels": ["water", "physics"],
                "description": description
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_header_fields_and_description() {
        let issue = issue(json!({
            "type": "doc",
            "version": 1,
            "content": [{"type": "paragraph", "content": [{"type": "text", "text": "Place water."}]}]
        }));
        let lines = detail_lines(&issue, &PlainLines);
        let text = to_plain_text(&lines);

        assert!(text.starts_with("MC-12  Water flows upward"));
        assert!(text.contains("https://bugs.mojang.com/browse/MC-12"));
        assert!(text.contains(" water "));
        assert!(text.contains(" physics "));
        assert!(text.contains("Resolved"));
        assert!(text.ends_with("Place water."));

        let labels = lines
            .iter()
            .find(|l| to_plain_text(std::slice::from_ref(*l)).starts_with("Labels"));
        assert_eq!(labels.and_then(label_column), Some(LABEL_WIDTH));
    }

    #[test]
    fn test_missing_description() {
        let lines = detail_lines(&issue(serde_json::Value::Null), &PlainLines);
        assert!(to_plain_text(&lines).ends_with("No description."));
    }
}
