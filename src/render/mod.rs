//! Renderers for classified documents.
//!
//! Two targets share one dispatch policy:
//!
//! - [`html`] produces markup for the issue detail page.
//! - [`text`] produces styled ratatui lines for the terminal detail pane.
//!
//! Both take the code highlighter as an injected [`CodeRenderer`] instead of
//! reaching for a global, so callers decide between an eager highlighter and
//! the lazily shared one (see [`crate::highlight`]).

pub mod html;
pub mod text;

use std::fmt;

/// A fragment of HTML.
///
/// Text only enters through [`Markup::escaped`]; raw markup enters only
/// through [`Markup::trusted`], which is reserved for highlighter output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup(String);

impl Markup {
    /// Escape plain text into markup.
    pub fn escaped(text: &str) -> Self {
        Self(escape_html(text))
    }

    /// Wrap markup produced by a trusted code renderer.
    pub fn trusted(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// The code highlighting capability: `(source, language) -> output`.
///
/// `Output` is [`Markup`] for HTML rendering and styled lines for the
/// terminal. Closures with the matching signature implement it, which keeps
/// tests and one-off callers light.
pub trait CodeRenderer<Output = Markup> {
    fn render_code(&self, source: &str, language: Option<&str>) -> Output;
}

impl<Output, F> CodeRenderer<Output> for F
where
    F: Fn(&str, Option<&str>) -> Output,
{
    fn render_code(&self, source: &str, language: Option<&str>) -> Output {
        self(source, language)
    }
}

/// Renders code blocks without highlighting.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainCode;

impl CodeRenderer<Markup> for PlainCode {
    fn render_code(&self, source: &str, language: Option<&str>) -> Markup {
        let class = language
            .map(|language| format!(" class=\"language-{}\"", escape_html(language)))
            .unwrap_or_default();
        Markup::trusted(format!(
            "<pre><code{}>{}</code></pre>",
            class,
            escape_html(source)
        ))
    }
}
