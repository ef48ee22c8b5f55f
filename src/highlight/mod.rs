//! Syntax highlighting for code blocks, backed by syntect.
//!
//! [`Highlighter`] is the eager shape: it owns its syntax and theme sets and
//! highlights synchronously. [`SharedHighlighter`] is the lazy shape: one
//! highlighter per process, loaded on first use and awaited by everyone who
//! asks while it loads.

mod shared;

pub use shared::{DeferredCode, SharedHighlighter, render_lazy};

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Style as SyntectStyle, Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use tracing::{debug, warn};

use crate::render::text::{PlainLines, StyledLines};
use crate::render::{CodeRenderer, Markup, PlainCode};

/// Theme used when none is configured.
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

/// Theme tried when the configured one does not exist.
const FALLBACK_THEME: &str = "InspiredGitHub";

pub struct Highlighter {
    syntaxes: SyntaxSet,
    themes: ThemeSet,
    theme_name: String,
}

impl Highlighter {
    /// Load the bundled syntaxes and themes.
    ///
    /// `theme` falls back to [`DEFAULT_THEME`] when absent.
    pub fn new(theme: Option<&str>) -> Self {
        let highlighter = Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            themes: ThemeSet::load_defaults(),
            theme_name: theme.unwrap_or(DEFAULT_THEME).to_string(),
        };
        if !highlighter.themes.themes.contains_key(&highlighter.theme_name) {
            warn!(theme = %highlighter.theme_name, "unknown syntax theme, falling back");
        }
        debug!(
            syntaxes = highlighter.syntaxes.syntaxes().len(),
            themes = highlighter.themes.themes.len(),
            "highlighter loaded"
        );
        highlighter
    }

    /// Names of all bundled themes.
    pub fn theme_names(&self) -> impl Iterator<Item = &str> {
        self.themes.themes.keys().map(String::as_str)
    }

    fn theme(&self) -> Option<&Theme> {
        self.themes
            .themes
            .get(&self.theme_name)
            .or_else(|| self.themes.themes.get(FALLBACK_THEME))
            .or_else(|| self.themes.themes.values().next())
    }

    /// Background colour of the active theme as a CSS hex value.
    pub fn background_css(&self) -> Option<String> {
        let color = self.theme()?.settings.background?;
        Some(format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b))
    }

    fn syntax(&self, language: Option<&str>) -> &SyntaxReference {
        language
            .map(syntax_token)
            .and_then(|token| self.syntaxes.find_syntax_by_token(token))
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text())
    }

    /// Highlight to an HTML `<pre>` block with inline styles.
    pub fn highlight_html(&self, source: &str, language: Option<&str>) -> Markup {
        let Some(theme) = self.theme() else {
            return PlainCode.render_code(source, language);
        };
        match highlighted_html_for_string(source, &self.syntaxes, self.syntax(language), theme) {
            Ok(html) => Markup::trusted(html),
            Err(err) => {
                debug!(?language, "highlighting failed: {err}");
                PlainCode.render_code(source, language)
            }
        }
    }

    /// Highlight to styled terminal lines.
    pub fn highlight_lines(&self, source: &str, language: Option<&str>) -> StyledLines {
        let Some(theme) = self.theme() else {
            return PlainLines.render_code(source, language);
        };
        let mut highlighter = HighlightLines::new(self.syntax(language), theme);
        let mut lines = Vec::new();

        for line in LinesWithEndings::from(source) {
            let Ok(ranges) = highlighter.highlight_line(line, &self.syntaxes) else {
                return PlainLines.render_code(source, language);
            };
            let spans: Vec<Span<'static>> = ranges
                .into_iter()
                .map(|(style, text)| {
                    Span::styled(
                        text.trim_end_matches(['\n', '\r']).to_string(),
                        syntect_to_ratatui(style),
                    )
                })
                .collect();
            lines.push(Line::from(spans));
        }
        lines
    }
}

impl CodeRenderer<Markup> for Highlighter {
    fn render_code(&self, source: &str, language: Option<&str>) -> Markup {
        self.highlight_html(source, language)
    }
}

impl CodeRenderer<StyledLines> for Highlighter {
    fn render_code(&self, source: &str, language: Option<&str>) -> StyledLines {
        self.highlight_lines(source, language)
    }
}

/// Map a tracker language tag to a syntect token.
fn syntax_token(language: &str) -> &str {
    match language {
        "javascript" | "js" => "js",
        "typescript" => "ts",
        "shell" | "bash" | "sh" => "sh",
        "c++" | "cpp" => "cpp",
        "c#" | "csharp" => "cs",
        "yml" | "yaml" => "yaml",
        "mcfunction" | "text" | "none" | "plain" => "txt",
        other => other,
    }
}

fn syntect_to_ratatui(style: SyntectStyle) -> Style {
    let fg = style.foreground;
    let mut converted = Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b));

    if style.font_style.contains(FontStyle::BOLD) {
        converted = converted.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        converted = converted.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        converted = converted.add_modifier(Modifier::UNDERLINED);
    }
    converted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::text::to_plain_text;

    #[test]
    fn test_known_language_is_highlighted() {
        let highlighter = Highlighter::new(None);
        let html = highlighter.highlight_html("int x = 1;", Some("java"));
        assert!(html.as_str().starts_with("<pre"));
        assert!(html.as_str().contains("<span"));
        assert!(html.as_str().contains("int"));
    }

    #[test]
    fn test_unknown_language_falls_back_to_plain_text() {
        let highlighter = Highlighter::new(None);
        let html = highlighter.highlight_html("a < b", Some("no-such-language"));
        assert!(html.as_str().contains("a &lt; b"));
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        let highlighter = Highlighter::new(Some("does-not-exist"));
        assert!(highlighter.theme().is_some());
        assert!(highlighter.background_css().is_some());
    }

    #[test]
    fn test_lines_keep_source_text() {
        let highlighter = Highlighter::new(None);
        let lines = highlighter.highlight_lines("fn main() {}\nlet x = 1;", Some("rust"));
        assert_eq!(to_plain_text(&lines), "fn main() {}\nlet x = 1;");
    }

    #[test]
    fn test_language_aliases() {
        assert_eq!(syntax_token("javascript"), "js");
        assert_eq!(syntax_token("java"), "java");
        assert_eq!(syntax_token("mcfunction"), "txt");
    }
}
