use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::keybindings::{KeybindingMode, Keybindings};

/// Key column width for keybindings
const KEY_COLUMN_WIDTH: usize = 14;

#[derive(Debug, Clone, PartialEq)]
pub enum HelpLine {
    Title(&'static str),
    SectionHeader(String),
    KeyBinding { keys: String, desc: &'static str },
    Blank,
}

impl HelpLine {
    pub fn to_line(&self) -> Line<'static> {
        match self {
            HelpLine::Title(text) => Line::from(Span::styled(
                text.to_string(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
            HelpLine::SectionHeader(text) => Line::from(Span::styled(
                text.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            HelpLine::KeyBinding { keys, desc } => Line::from(vec![
                Span::styled(
                    format!("  {keys:<width$}", width = KEY_COLUMN_WIDTH),
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw(desc.to_string()),
            ]),
            HelpLine::Blank => Line::default(),
        }
    }
}

/// Help for every mode, built from the active keybindings so user
/// overrides show up.
pub fn build_help(keybindings: &Keybindings) -> Vec<HelpLine> {
    let mut lines = vec![HelpLine::Title("mojira keybindings"), HelpLine::Blank];

    for mode in KeybindingMode::ALL {
        let mut category = "";
        for (action, keys) in keybindings.help_entries(mode) {
            if action.category() != category {
                category = action.category();
                lines.push(HelpLine::SectionHeader(format!(
                    "{} · {}",
                    mode.display_name(),
                    category
                )));
            }
            lines.push(HelpLine::KeyBinding {
                keys: keys.join(", "),
                desc: action.description(),
            });
        }
        lines.push(HelpLine::Blank);
    }
    lines
}

pub fn help_lines(keybindings: &Keybindings) -> Vec<Line<'static>> {
    build_help(keybindings).iter().map(HelpLine::to_line).collect()
}
