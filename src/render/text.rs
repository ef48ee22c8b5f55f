//! Terminal rendering of document trees into styled ratatui lines.
//!
//! The layout mirrors the HTML renderer: blocks stack vertically, inline
//! nodes flow into the current line, lists get bullets or numbers, and
//! nodes that failed classification show their raw JSON in red.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use super::CodeRenderer;
use crate::document::{Mark, Node, SubSup, is_safe_href};

/// Styled terminal output of one code block.
pub type StyledLines = Vec<Line<'static>>;

/// Code renderer for the terminal that leaves source unstyled.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainLines;

impl CodeRenderer<StyledLines> for PlainLines {
    fn render_code(&self, source: &str, _language: Option<&str>) -> StyledLines {
        let style = Style::default().fg(Color::Gray);
        source
            .lines()
            .map(|line| Line::from(Span::styled(line.to_string(), style)))
            .collect()
    }
}

/// Render a node and its subtree to terminal lines.
pub fn render(node: &Node, code: &dyn CodeRenderer<StyledLines>) -> Vec<Line<'static>> {
    TextRenderer { code }.block(node)
}

/// Flatten styled lines back to plain text.
pub fn to_plain_text(lines: &[Line<'_>]) -> String {
    lines
        .iter()
        .map(|line| {
            line.spans
                .iter()
                .map(|span| span.content.as_ref())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

struct TextRenderer<'a> {
    code: &'a dyn CodeRenderer<StyledLines>,
}

impl TextRenderer<'_> {
    fn block(&self, node: &Node) -> Vec<Line<'static>> {
        match node {
            Node::Doc { content } => {
                let mut lines = Vec::new();
                for (i, child) in content.iter().enumerate() {
                    if i > 0 {
                        lines.push(Line::default());
                    }
                    lines.extend(self.block(child));
                }
                lines
            }
            Node::Paragraph { content } | Node::ListItem { content } => {
                self.flow(content, Style::default())
            }
            Node::MediaSingle { content } => self.flow(content, Style::default()),
            Node::Heading { level, content } => {
                let style = Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD);
                let marker = format!("{} ", "#".repeat(usize::from(level.get())));
                prefixed(
                    self.flow(content, style),
                    Span::styled(marker, style),
                    Span::raw(""),
                )
            }
            Node::BulletList { content } => {
                let mut lines = Vec::new();
                for item in content {
                    lines.extend(prefixed(
                        self.block(item),
                        Span::styled("• ", Style::default().fg(Color::Yellow)),
                        Span::raw("  "),
                    ));
                }
                lines
            }
            Node::OrderedList { order, content } => {
                let start = order.unwrap_or(1);
                let offset = |i: usize| start.saturating_add(u64::try_from(i).unwrap_or(u64::MAX));
                let width = offset(content.len().saturating_sub(1)).to_string().len() + 2;
                let mut lines = Vec::new();
                for (i, item) in content.iter().enumerate() {
                    let number = offset(i);
                    let marker = format!("{:<width$}", format!("{number}."));
                    lines.extend(prefixed(
                        self.block(item),
                        Span::styled(marker, Style::default().fg(Color::Yellow)),
                        Span::raw(" ".repeat(width)),
                    ));
                }
                lines
            }
            Node::CodeBlock { language, source } => {
                let gutter = Style::default().fg(Color::DarkGray);
                let mut lines = Vec::new();
                if let Some(language) = language {
                    lines.push(Line::from(Span::styled(format!("╭─ {language}"), gutter)));
                }
                lines.extend(prefixed(
                    self.code.render_code(source, language.as_deref()),
                    Span::styled("│ ", gutter),
                    Span::styled("│ ", gutter),
                ));
                lines
            }
            Node::Panel {
                panel_type,
                title,
                body,
            } => {
                let color = panel_color(panel_type.as_deref());
                let bar = Span::styled("┃ ", Style::default().fg(color));
                let title_lines = self
                    .block(title)
                    .into_iter()
                    .map(|line| line.patch_style(Style::default().add_modifier(Modifier::BOLD)));
                let mut lines: Vec<Line<'static>> = title_lines.collect();
                lines.extend(self.block(body));
                prefixed(lines, bar.clone(), bar)
            }
            Node::Malformed { reason, .. } => self.diagnostic(node, Some(reason)),
            Node::Unknown { .. } => self.diagnostic(node, None),
            inline => self.flow(std::slice::from_ref(inline), Style::default()),
        }
    }

    /// Lay out a run of children: inline nodes share lines, block nodes
    /// start their own.
    fn flow(&self, nodes: &[Node], base: Style) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        let mut current: Vec<Span<'static>> = Vec::new();
        let mut has_inline = false;

        for node in nodes {
            match node {
                Node::HardBreak => {
                    lines.push(Line::from(std::mem::take(&mut current)));
                    has_inline = true;
                }
                Node::Media(media) => {
                    current.push(Span::styled(
                        format!("[attachment: {}]", media.label()),
                        Style::default().fg(Color::Magenta),
                    ));
                    has_inline = true;
                }
                node if node.is_inline() => {
                    current.push(inline_span(node, base));
                    has_inline = true;
                }
                block => {
                    if !current.is_empty() {
                        lines.push(Line::from(std::mem::take(&mut current)));
                    }
                    has_inline = false;
                    lines.extend(self.block(block));
                }
            }
        }

        if !current.is_empty() || has_inline || lines.is_empty() {
            lines.push(Line::from(current));
        }
        lines
    }

    fn diagnostic(&self, node: &Node, reason: Option<&str>) -> Vec<Line<'static>> {
        let style = Style::default().fg(Color::Red);
        let header = match reason {
            Some(reason) => format!("⚠ {}: {}", node.kind(), reason),
            None => format!("⚠ unsupported node `{}`", node.kind()),
        };
        let mut lines = vec![Line::from(Span::styled(
            header,
            style.add_modifier(Modifier::BOLD),
        ))];
        let dump = node.diagnostic().unwrap_or_default();
        lines.extend(
            dump.lines()
                .map(|line| Line::from(Span::styled(line.to_string(), style))),
        );
        lines
    }
}

fn inline_span(node: &Node, base: Style) -> Span<'static> {
    match node {
        Node::Text { text, marks } => {
            let style = marks.iter().fold(base, |style, mark| match mark {
                Mark::Strong => style.add_modifier(Modifier::BOLD),
                Mark::Em => style.add_modifier(Modifier::ITALIC),
                Mark::Code => style.fg(Color::Green),
                Mark::Strike => style.add_modifier(Modifier::CROSSED_OUT),
                Mark::Underline => style.add_modifier(Modifier::UNDERLINED),
                Mark::SubSup(SubSup::Sub | SubSup::Sup) => style.add_modifier(Modifier::DIM),
                Mark::Link { href } if is_safe_href(href) => {
                    style.fg(Color::Blue).add_modifier(Modifier::UNDERLINED)
                }
                Mark::Link { .. } => style,
            });
            Span::styled(text.clone(), style)
        }
        Node::Emoji { short_name, text } => Span::styled(
            text.as_deref()
                .or(short_name.as_deref())
                .unwrap_or_default()
                .to_string(),
            base,
        ),
        Node::Mention { text } => Span::styled(
            text.clone(),
            base.fg(Color::Black).bg(Color::LightBlue),
        ),
        Node::InlineCard { url } => Span::styled(
            url.clone(),
            base.fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
        ),
        _ => Span::raw(""),
    }
}

fn panel_color(panel_type: Option<&str>) -> Color {
    match panel_type {
        Some("warning") => Color::Yellow,
        Some("error") => Color::Red,
        Some("success") => Color::Green,
        Some("note") => Color::Magenta,
        _ => Color::Blue,
    }
}

/// Put `first` in front of the first line and `rest` in front of the others.
fn prefixed(
    lines: Vec<Line<'static>>,
    first: Span<'static>,
    rest: Span<'static>,
) -> Vec<Line<'static>> {
    if lines.is_empty() {
        return vec![Line::from(first)];
    }
    lines
        .into_iter()
        .enumerate()
        .map(|(i, mut line)| {
            let prefix = if i == 0 { first.clone() } else { rest.clone() };
            line.spans.insert(0, prefix);
            line
        })
        .collect()
}
