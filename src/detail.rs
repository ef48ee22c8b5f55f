//! The issue detail view: a grid of fields followed by the rendered
//! description.

use crate::api::{Issue, SelectValue, UNASSIGNED, format_timestamp, value_text};
use crate::render::{Markup, escape_html};

/// How a field's values are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// One line of text.
    Text,
    /// Short tags shown side by side.
    Badges,
    /// One entry per line.
    Lines,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub label: &'static str,
    pub kind: FieldKind,
    pub values: Vec<String>,
}

impl Field {
    fn text(label: &'static str, value: Option<String>) -> Self {
        Self {
            label,
            kind: FieldKind::Text,
            values: value.into_iter().filter(|v| !v.is_empty()).collect(),
        }
    }

    fn list(label: &'static str, kind: FieldKind, values: Vec<String>) -> Self {
        Self {
            label,
            kind,
            values,
        }
    }

    /// Values joined for single-line display.
    pub fn display(&self) -> String {
        self.values.join(", ")
    }
}

fn select(value: Option<&SelectValue>) -> Option<String> {
    value.and_then(|v| v.value.clone())
}

/// The fields shown above the description, in display order.
pub fn fields(issue: &Issue) -> Vec<Field> {
    let f = &issue.fields;

    let status = f.status.as_ref().map(|status| {
        match status.status_category.as_ref().map(|c| c.name.as_str()) {
            Some(category) if !category.is_empty() => format!("{} ({})", status.name, category),
            _ => status.name.clone(),
        }
    });
    let categories = match issue.categories() {
        Some(categories) => categories.join(", "),
        None => UNASSIGNED.to_string(),
    };
    let links = f
        .issuelinks
        .iter()
        .filter_map(|link| {
            let (phrase, other) = link.target()?;
            let summary = other.fields.summary.as_deref().unwrap_or_default();
            Some(format!("{}: {} {} {}", link.link_type.name, phrase, other.key, summary).trim_end().to_string())
        })
        .collect();

    vec![
        Field::text("Issue Type", f.issuetype.as_ref().map(|t| t.name.clone())),
        Field::text("Created", f.created.as_deref().map(format_timestamp)),
        Field::text("Updated", f.updated.as_deref().map(format_timestamp)),
        Field::text(
            "Resolved",
            Some(
                f.resolutiondate
                    .as_deref()
                    .map(format_timestamp)
                    .unwrap_or_else(|| "Unresolved".to_string()),
            ),
        ),
        Field::text("Resolution", f.resolution.as_ref().map(|r| r.name.clone())),
        Field::text("Status", status),
        Field::list(
            "Affects Versions",
            FieldKind::Badges,
            f.versions.iter().map(|v| v.name.clone()).collect(),
        ),
        Field::list("Labels", FieldKind::Badges, f.labels.clone()),
        Field::text("Confirmation Status", select(f.customfield_10054.as_ref())),
        Field::text("Category", Some(categories)),
        Field::text("Game Mode", select(f.customfield_10048.as_ref())),
        Field::text("Area", select(f.customfield_10051.as_ref())),
        Field::text("Mojang Priority", select(f.customfield_10049.as_ref())),
        Field::text(
            "Operating System Version",
            f.customfield_10061.as_ref().and_then(value_text),
        ),
        Field::list(
            "Fix Versions",
            FieldKind::Badges,
            f.fix_versions.iter().map(|v| v.name.clone()).collect(),
        ),
        Field::list("Linked Issues", FieldKind::Lines, links),
        Field::text("Votes", Some(issue.votes().to_string())),
        Field::text("Watchers", Some(issue.watchers().to_string())),
        Field::text("CHK", f.customfield_10047.as_deref().map(format_timestamp)),
        Field::text("ADO", f.customfield_10050.as_ref().and_then(value_text)),
    ]
}

const PAGE_STYLE: &str = "\
body{font-family:system-ui,sans-serif;max-width:60rem;margin:2rem auto;padding:0 1rem;line-height:1.5}\
dl.fields{display:grid;grid-template-columns:12rem auto;border-top:1px solid #ddd}\
dl.fields>*{margin:0;padding:.4rem 0;border-bottom:1px solid #ddd}\
.badge{display:inline-block;padding:0 .5rem;margin-right:.25rem;border-radius:.5rem;background:#eee}\
.mention{padding:0 .3rem;border-radius:.3rem;background:#deebff}\
.panel{border-left:4px solid #4c9aff;padding:.5rem 1rem;margin:1rem 0;background:#f4f8ff}\
.panel-title{font-weight:bold}\
.adf-diagnostic{color:#b00;font-family:monospace;border:1px dashed #b00;padding:.5rem}\
pre{padding:1rem;overflow-x:auto;border-radius:.3rem}";

fn write_field(out: &mut String, field: &Field) {
    out.push_str("<dt>");
    out.push_str(field.label);
    out.push_str("</dt><dd>");
    match field.kind {
        FieldKind::Text => out.push_str(&escape_html(&field.display())),
        FieldKind::Badges => {
            for value in &field.values {
                out.push_str("<span class=\"badge\">");
                out.push_str(&escape_html(value));
                out.push_str("</span>");
            }
        }
        FieldKind::Lines => {
            let lines: Vec<String> = field.values.iter().map(|v| escape_html(v)).collect();
            out.push_str(&lines.join("<br>"));
        }
    }
    out.push_str("</dd>");
}

/// A standalone HTML page for one issue.
///
/// `description` is the already rendered description; `code_background` is
/// the highlighter theme's background colour, used for code blocks.
pub fn render_page(issue: &Issue, description: Option<&Markup>, code_background: Option<&str>) -> Markup {
    let key = escape_html(&issue.key);
    let summary = escape_html(issue.summary());
    let url = escape_html(&issue.browse_url());

    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>[{key}] {summary}</title>\n<style>{PAGE_STYLE}"));
    if let Some(background) = code_background {
        out.push_str(&format!("pre{{background:{}}}", escape_html(background)));
    }
    out.push_str("</style>\n</head>\n<body>\n");
    out.push_str(&format!(
        "<header><h1><a href=\"{url}\">{key}</a> {summary}</h1></header>\n"
    ));

    out.push_str("<dl class=\"fields\">");
    for field in fields(issue) {
        write_field(&mut out, &field);
    }
    out.push_str("</dl>\n");

    if let Some(description) = description {
        out.push_str("<article class=\"description\">");
        out.push_str(description.as_str());
        out.push_str("</article>\n");
    }
    out.push_str("</body>\n</html>\n");
    Markup::trusted(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{PlainCode, html};
    use serde_json::json;

    fn issue() -> Issue {
        serde_json::from_value(json!({
            "key": "MC-4",
            "fields": {
                "summary": "Item drops <appear> behind",
                "issuetype": {"name": "Bug"},
                "status": {"name": "Resolved", "statusCategory": {"name": "Done"}},
                "resolution": {"name": "Fixed"},
                "resolutiondate": "2024-03-01T12:30:00.000+0000",
                "labels": ["items", "rendering"],
                "fixVersions": [{"name": "1.21"}],
                "issuelinks": [{
                    "type": {"name": "Relates", "inward": "relates to", "outward": "relates to"},
                    "inwardIssue": {"key": "MC-9", "fields": {"summary": "Related"}}
                }],
                "customfield_10070": 7,
                "watches": {"watchCount": 2},
                "description": {
                    "type": "doc",
                    "version": 1,
                    "content": [{"type": "paragraph", "content": [{"type": "text", "text": "Steps"}]}]
                }
            }
        }))
        .unwrap()
    }

    fn field<'a>(fields: &'a [Field], label: &str) -> &'a Field {
        fields.iter().find(|f| f.label == label).unwrap()
    }

    #[test]
    fn test_field_order_and_values() {
        let fields = fields(&issue());
        let labels: Vec<_> = fields.iter().map(|f| f.label).collect();
        assert_eq!(labels.first(), Some(&"Issue Type"));
        assert_eq!(labels.last(), Some(&"ADO"));
        assert_eq!(labels.len(), 20);

        assert_eq!(field(&fields, "Status").display(), "Resolved (Done)");
        assert_eq!(field(&fields, "Labels").values, vec!["items", "rendering"]);
        assert_eq!(field(&fields, "Votes").display(), "7");
        assert_eq!(field(&fields, "Watchers").display(), "2");
        assert_eq!(
            field(&fields, "Linked Issues").values,
            vec!["Relates: relates to MC-9 Related"]
        );
        assert!(field(&fields, "Game Mode").values.is_empty());
    }

    #[test]
    fn test_unresolved_issue() {
        let issue: Issue = serde_json::from_value(json!({"key": "MC-5", "fields": {}})).unwrap();
        let fields = fields(&issue);
        assert_eq!(field(&fields, "Resolved").display(), "Unresolved");
        assert_eq!(field(&fields, "Votes").display(), "0");
    }

    #[test]
    fn test_page_escapes_and_embeds_description() {
        let issue = issue();
        let description = html::render(&issue.description().unwrap(), &PlainCode);
        let page = render_page(&issue, Some(&description), Some("#2b303b"));
        let page = page.as_str();

        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("Item drops &lt;appear&gt; behind"));
        assert!(page.contains("<a href=\"https://bugs.mojang.com/browse/MC-4\">MC-4</a>"));
        assert!(page.contains("<span class=\"badge\">items</span>"));
        assert!(page.contains("<article class=\"description\"><p>Steps</p></article>"));
        assert!(page.contains("pre{background:#2b303b}"));
    }
}
