//! Column definitions and cell text.
//!
//! Column ids double as JQL field names, so sorting and filtering by a
//! column translate directly into the search query.

use crate::api::{Issue, SelectValue, UNASSIGNED, format_timestamp, value_text};

/// A table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub id: &'static str,
    pub title: &'static str,
    /// Default width in pixels of the original layout; the terminal divides
    /// it down to cells.
    pub width: u16,
    /// Numeric columns align right.
    pub numeric: bool,
}

const fn column(id: &'static str, title: &'static str, width: u16) -> Column {
    Column {
        id,
        title,
        width,
        numeric: false,
    }
}

const fn numeric(id: &'static str, title: &'static str, width: u16) -> Column {
    Column {
        id,
        title,
        width,
        numeric: true,
    }
}

/// All columns in default order.
pub const COLUMNS: &[Column] = &[
    column("issuetype", "Issue Type", 85),
    column("key", "Key", 100),
    column("summary", "Summary", 400),
    column("created", "Created", 180),
    column("updated", "Updated", 180),
    column("resolutiondate", "Resolved", 180),
    column("resolution", "Resolution", 130),
    column("status", "Status", 105),
    column("affectedVersion", "Affects Versions", 140),
    column("labels", "Labels", 140),
    column("cf[10054]", "Confirmation Status", 100),
    column("cf[10055]", "Category", 100),
    column("cf[10048]", "Game Mode", 100),
    column("cf[10051]", "Area", 100),
    column("cf[10049]", "Mojang Priority", 115),
    column("cf[10061]", "Operating System Version", 100),
    column("fixVersion", "Fix Versions", 140),
    numeric("cf[10070]", "Votes", 75),
    numeric("watchers", "Watchers", 75),
    column("cf[10047]", "CHK", 180),
    column("cf[10050]", "ADO", 100),
];

/// Look a column up by id.
pub fn find(id: &str) -> Option<&'static Column> {
    COLUMNS.iter().find(|c| c.id == id)
}

fn select(value: Option<&SelectValue>) -> String {
    value
        .and_then(|v| v.value.clone())
        .unwrap_or_default()
}

fn timestamp(raw: Option<&str>) -> String {
    raw.map(format_timestamp).unwrap_or_default()
}

/// Display text of one cell.
pub fn cell_text(issue: &Issue, column: &str) -> String {
    let fields = &issue.fields;
    match column {
        "issuetype" => fields
            .issuetype
            .as_ref()
            .map(|t| t.name.clone())
            .unwrap_or_default(),
        "key" => issue.key.clone(),
        "summary" => issue.summary().to_string(),
        "created" => timestamp(fields.created.as_deref()),
        "updated" => timestamp(fields.updated.as_deref()),
        "resolutiondate" => match fields.resolutiondate.as_deref() {
            Some(raw) => format_timestamp(raw),
            None => "Unresolved".to_string(),
        },
        "resolution" => fields
            .resolution
            .as_ref()
            .map(|r| r.name.clone())
            .unwrap_or_default(),
        "status" => fields
            .status
            .as_ref()
            .map(|s| s.name.clone())
            .unwrap_or_default(),
        "affectedVersion" => join(fields.versions.iter().map(|v| v.name.as_str())),
        "labels" => join(fields.labels.iter().map(String::as_str)),
        "cf[10054]" => select(fields.customfield_10054.as_ref()),
        "cf[10055]" => match issue.categories() {
            Some(categories) => categories.join(", "),
            None => UNASSIGNED.to_string(),
        },
        "cf[10048]" => select(fields.customfield_10048.as_ref()),
        "cf[10051]" => select(fields.customfield_10051.as_ref()),
        "cf[10049]" => select(fields.customfield_10049.as_ref()),
        "cf[10061]" => fields
            .customfield_10061
            .as_ref()
            .and_then(value_text)
            .unwrap_or_default(),
        "fixVersion" => join(fields.fix_versions.iter().map(|v| v.name.as_str())),
        "cf[10070]" => issue.votes().to_string(),
        "watchers" => issue.watchers().to_string(),
        "cf[10047]" => timestamp(fields.customfield_10047.as_deref()),
        "cf[10050]" => fields
            .customfield_10050
            .as_ref()
            .and_then(value_text)
            .unwrap_or_default(),
        _ => String::new(),
    }
}

fn join<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items.collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn issue() -> Issue {
        serde_json::from_value(json!({
            "key": "MC-100",
            "fields": {
                "summary": "Sheep turn invisible",
                "issuetype": {"name": "Bug"},
                "status": {"name": "Open", "statusCategory": {"name": "To Do"}},
                "resolutiondate": null,
                "versions": [{"name": "1.20"}, {"name": "1.21"}],
                "labels": [],
                "customfield_10054": {"value": "Confirmed"},
                "customfield_10055": [{"value": "(Unassigned)"}],
                "customfield_10061": "Windows 11",
                "customfield_10070": 12.0,
                "watches": {"watchCount": 4}
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_column_ids_are_unique() {
        let mut ids: Vec<_> = COLUMNS.iter().map(|c| c.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), COLUMNS.len());
    }

    #[test]
    fn test_default_widths() {
        assert_eq!(find("summary").unwrap().width, 400);
        assert_eq!(find("cf[10049]").unwrap().width, 115);
        assert_eq!(find("cf[10070]").unwrap().width, 75);
        assert!(find("nope").is_none());
    }

    #[test]
    fn test_cell_text() {
        let issue = issue();
        assert_eq!(cell_text(&issue, "key"), "MC-100");
        assert_eq!(cell_text(&issue, "issuetype"), "Bug");
        assert_eq!(cell_text(&issue, "resolutiondate"), "Unresolved");
        assert_eq!(cell_text(&issue, "affectedVersion"), "1.20, 1.21");
        assert_eq!(cell_text(&issue, "labels"), "");
        assert_eq!(cell_text(&issue, "cf[10054]"), "Confirmed");
        assert_eq!(cell_text(&issue, "cf[10055]"), "(Unassigned)");
        assert_eq!(cell_text(&issue, "cf[10061]"), "Windows 11");
        assert_eq!(cell_text(&issue, "cf[10070]"), "12");
        assert_eq!(cell_text(&issue, "watchers"), "4");
        assert_eq!(cell_text(&issue, "cf[10047]"), "");
    }
}
