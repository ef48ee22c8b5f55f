//! Types and client for the public Mojira search endpoint.
//!
//! The tracker exposes one JSON endpoint that takes a JQL search and a page
//! window and returns issues with their fields. The structs here mirror the
//! parts of that payload the viewer uses. Anything the tracker may omit or
//! null is optional.

mod client;
mod key;

pub use client::{SEARCH_URL, SearchClient};
pub use key::IssueKey;

use chrono::{DateTime, FixedOffset, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::document::Node;

/// Prefix of human-facing issue links.
pub const BROWSE_URL: &str = "https://bugs.mojang.com/browse/";

/// Tracker projects that can be searched.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Project {
    #[default]
    Mc,
    Mcpe,
    Realms,
    Mcl,
    Bds,
    Web,
}

impl Project {
    pub fn label(&self) -> &'static str {
        match self {
            Project::Mc => "Minecraft: Java Edition",
            Project::Mcpe => "Minecraft: Bedrock Edition",
            Project::Realms => "Minecraft Realms",
            Project::Mcl => "Minecraft Launcher",
            Project::Bds => "Bedrock Dedicated Server",
            Project::Web => "Mojang Web Services",
        }
    }

    /// The following project, wrapping around.
    pub fn next(self) -> Self {
        Self::iter()
            .cycle()
            .skip_while(|p| *p != self)
            .nth(1)
            .unwrap_or_default()
    }
}

/// Issue state filter of the simple (non-JQL) search mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SearchFilter {
    All,
    Open,
    Done,
}

/// Sort field of the simple (non-JQL) search mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortField {
    Created,
    Updated,
    Priority,
    Status,
}

/// Body of a search POST.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub project: Project,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<SearchFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<SortField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_asc: Option<bool>,
    pub advanced: bool,
    pub search: String,
    pub start_at: usize,
    pub max_results: usize,
    pub is_forge: bool,
    pub workspace_id: String,
}

impl SearchRequest {
    /// A JQL search over one page window.
    pub fn jql(project: Project, jql: impl Into<String>, start_at: usize, max_results: usize) -> Self {
        Self {
            project,
            filter: None,
            sort_field: None,
            sort_asc: None,
            advanced: true,
            search: jql.into(),
            start_at,
            max_results,
            is_forge: false,
            workspace_id: String::new(),
        }
    }

    /// A free-text search with the tracker's own filter and sort options.
    pub fn simple(
        project: Project,
        text: impl Into<String>,
        filter: SearchFilter,
        sort_field: SortField,
        sort_asc: bool,
        start_at: usize,
        max_results: usize,
    ) -> Self {
        Self {
            filter: Some(filter),
            sort_field: Some(sort_field),
            sort_asc: Some(sort_asc),
            advanced: false,
            ..Self::jql(project, text, start_at, max_results)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub start_at: usize,
    #[serde(default)]
    pub max_results: usize,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    #[serde(default)]
    pub id: Option<String>,
    pub key: String,
    #[serde(default)]
    pub fields: IssueFields,
}

impl Issue {
    /// Classified description document, if the issue has one.
    pub fn description(&self) -> Option<Node> {
        self.fields
            .description
            .as_ref()
            .filter(|value| !value.is_null())
            .map(Node::from_value)
    }

    pub fn browse_url(&self) -> String {
        format!("{BROWSE_URL}{}", self.key)
    }

    pub fn summary(&self) -> &str {
        self.fields.summary.as_deref().unwrap_or_default()
    }

    /// Votes, which the tracker leaves null for issues nobody voted on.
    pub fn votes(&self) -> u64 {
        self.fields
            .customfield_10070
            .map(|votes| votes.max(0.0) as u64)
            .unwrap_or(0)
    }

    pub fn watchers(&self) -> u64 {
        self.fields
            .watches
            .as_ref()
            .map(|w| w.watch_count)
            .unwrap_or(0)
    }

    /// Category names, or `None` when the issue is explicitly unassigned.
    pub fn categories(&self) -> Option<Vec<&str>> {
        let categories = self.fields.customfield_10055.as_deref().unwrap_or_default();
        if let [only] = categories
            && only.value.as_deref() == Some(UNASSIGNED)
        {
            return None;
        }
        Some(categories.iter().filter_map(|c| c.value.as_deref()).collect())
    }
}

/// Placeholder category the tracker uses for issues awaiting triage.
pub const UNASSIGNED: &str = "(Unassigned)";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueFields {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub issuetype: Option<IssueType>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub resolutiondate: Option<String>,
    #[serde(default)]
    pub resolution: Option<Resolution>,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub versions: Vec<Version>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub labels: Vec<String>,
    #[serde(default, rename = "fixVersions", deserialize_with = "null_as_empty")]
    pub fix_versions: Vec<Version>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub issuelinks: Vec<IssueLink>,
    #[serde(default)]
    pub watches: Option<Watches>,
    /// CHK timestamp.
    #[serde(default)]
    pub customfield_10047: Option<String>,
    /// Game mode.
    #[serde(default)]
    pub customfield_10048: Option<SelectValue>,
    /// Mojang priority.
    #[serde(default)]
    pub customfield_10049: Option<SelectValue>,
    /// ADO work item.
    #[serde(default)]
    pub customfield_10050: Option<Value>,
    /// Area.
    #[serde(default)]
    pub customfield_10051: Option<SelectValue>,
    /// Confirmation status.
    #[serde(default)]
    pub customfield_10054: Option<SelectValue>,
    /// Categories.
    #[serde(default)]
    pub customfield_10055: Option<Vec<SelectValue>>,
    /// Operating system version.
    #[serde(default)]
    pub customfield_10061: Option<Value>,
    /// Votes.
    #[serde(default)]
    pub customfield_10070: Option<f64>,
    #[serde(default)]
    pub description: Option<Value>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueType {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resolution {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status_category: Option<StatusCategory>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCategory {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Watches {
    #[serde(default)]
    pub watch_count: u64,
}

/// One option of a select-style custom field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectValue {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueLink {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub link_type: LinkType,
    #[serde(default)]
    pub inward_issue: Option<LinkedIssue>,
    #[serde(default)]
    pub outward_issue: Option<LinkedIssue>,
}

impl IssueLink {
    /// The issue on the other end and the phrase relating it to this one.
    pub fn target(&self) -> Option<(&str, &LinkedIssue)> {
        match (&self.inward_issue, &self.outward_issue) {
            (Some(issue), _) => Some((self.link_type.inward.as_str(), issue)),
            (None, Some(issue)) => Some((self.link_type.outward.as_str(), issue)),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkType {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub inward: String,
    #[serde(default)]
    pub outward: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkedIssue {
    pub key: String,
    #[serde(default)]
    pub fields: LinkedFields,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkedFields {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub issuetype: Option<IssueType>,
    #[serde(default)]
    pub status: Option<Status>,
}

/// Text of a free-form custom field value.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(object) => object.get("value").and_then(value_text),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(value_text).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
    }
}

/// Parse a tracker timestamp such as `2024-03-01T12:30:00.000+0000`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
}

/// Format a tracker timestamp in local time; unparsable input is shown as is.
pub fn format_timestamp(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|time| {
            time.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_project_names() {
        assert_eq!(Project::Mcpe.to_string(), "MCPE");
        assert_eq!("realms".parse::<Project>().unwrap(), Project::Realms);
        assert_eq!(serde_json::to_value(Project::Bds).unwrap(), json!("BDS"));
        assert_eq!(Project::Mc.next(), Project::Mcpe);
        assert_eq!(Project::Web.next(), Project::Mc);
    }

    #[test]
    fn test_jql_request_body() {
        let request = SearchRequest::jql(Project::Mc, "project = MC", 40, 20);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "project": "MC",
                "advanced": true,
                "search": "project = MC",
                "startAt": 40,
                "maxResults": 20,
                "isForge": false,
                "workspaceId": ""
            })
        );
    }

    #[test]
    fn test_simple_request_body() {
        let request = SearchRequest::simple(
            Project::Web,
            "crash",
            SearchFilter::Open,
            SortField::Updated,
            false,
            0,
            25,
        );
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["advanced"], json!(false));
        assert_eq!(body["filter"], json!("open"));
        assert_eq!(body["sortField"], json!("updated"));
        assert_eq!(body["sortAsc"], json!(false));
    }

    #[test]
    fn test_issue_with_nulls() {
        let issue: Issue = serde_json::from_value(json!({
            "key": "MC-1",
            "fields": {
                "summary": "Thing breaks",
                "versions": null,
                "labels": ["crash"],
                "customfield_10070": null,
                "watches": {"watchCount": 3, "isWatching": false},
                "description": null
            }
        }))
        .unwrap();

        assert_eq!(issue.summary(), "Thing breaks");
        assert!(issue.fields.versions.is_empty());
        assert_eq!(issue.votes(), 0);
        assert_eq!(issue.watchers(), 3);
        assert!(issue.description().is_none());
    }

    #[test]
    fn test_categories_unassigned() {
        let issue: Issue = serde_json::from_value(json!({
            "key": "MC-1",
            "fields": {"customfield_10055": [{"value": "(Unassigned)", "id": "1"}]}
        }))
        .unwrap();
        assert_eq!(issue.categories(), None);

        let issue: Issue = serde_json::from_value(json!({
            "key": "MC-1",
            "fields": {"customfield_10055": [{"value": "Rendering"}, {"value": "Audio"}]}
        }))
        .unwrap();
        assert_eq!(issue.categories(), Some(vec!["Rendering", "Audio"]));
    }

    #[test]
    fn test_issue_links() {
        let link: IssueLink = serde_json::from_value(json!({
            "id": "5",
            "type": {"name": "Duplicate", "inward": "is duplicated by", "outward": "duplicates"},
            "outwardIssue": {"key": "MC-2", "fields": {"summary": "Other"}}
        }))
        .unwrap();
        let (phrase, issue) = link.target().unwrap();
        assert_eq!(phrase, "duplicates");
        assert_eq!(issue.key, "MC-2");
    }

    #[test]
    fn test_timestamps() {
        let parsed = parse_timestamp("2024-03-01T12:30:00.000+0000").unwrap();
        assert_eq!(parsed.timestamp(), 1_709_296_200);
        assert!(parse_timestamp("2024-03-01T12:30:00Z").is_some());
        assert_eq!(format_timestamp("not a date"), "not a date");
    }

    #[test]
    fn test_value_text() {
        assert_eq!(value_text(&json!("11")), Some("11".to_string()));
        assert_eq!(value_text(&json!(3)), Some("3".to_string()));
        assert_eq!(value_text(&json!({"value": "Survival"})), Some("Survival".to_string()));
        assert_eq!(value_text(&json!(null)), None);
    }
}
