//! Handlers for the non-interactive subcommands.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use clap::CommandFactory;
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use serde_json::{Value, json};
use tokio::runtime::Runtime;
use tracing::info;
use unicode_width::UnicodeWidthStr;

use mojira::api::{Issue, SearchClient, SearchRequest};
use mojira::config::Config;
use mojira::detail::{fields, render_page};
use mojira::document::Node;
use mojira::highlight::{Highlighter, SharedHighlighter, render_lazy};
use mojira::query::{QueryKey, build_query};
use mojira::render::text::{self, PlainLines, to_plain_text};
use mojira::render::html;
use mojira::table::{MAX_WIDTH, Pagination, TableState, cell_text, columns};

use super::{
    Cli, ColumnsCommand, ConfigCommand, IssueArgs, IssueFormat, RenderFormat, SearchArgs,
    SearchFormat,
};

/// Terminal cells per pixel of stored column width in plain output.
const PIXELS_PER_CHAR: u16 = 8;

fn write_output(contents: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            fs::write(path, contents)
                .wrap_err_with(|| format!("could not write {}", path.display()))?;
            eprintln!("✓ Wrote {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(contents.as_bytes())?;
            if !contents.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}

/// Apply search arguments on top of the saved query.
fn search_state(args: &SearchArgs, config: &Config) -> Result<(QueryKey, TableState)> {
    let mut table = config.table_state();
    if let Some(page_size) = args.page_size {
        table.pagination = Pagination::new(page_size);
    }
    if !args.sort.is_empty() {
        table.set_sorting(args.sort.clone())?;
    }
    for filter in &args.filter {
        table.set_filter(&filter.id, &filter.value)?;
    }
    table.pagination.page_index = args.page.saturating_sub(1);

    let project = args.project.unwrap_or(config.query.project);
    let search = args.search.as_deref().unwrap_or(&config.query.search);
    let key = QueryKey {
        project,
        jql: build_query(project, search, &table.sorting, &table.filters),
        page_index: table.pagination.page_index,
        page_size: table.pagination.page_size,
    };
    Ok((key, table))
}

/// The request for `key`, or the tracker's free-text search over the same
/// page window with `--simple`.
fn search_request(args: &SearchArgs, config: &Config, key: &QueryKey) -> SearchRequest {
    let request = key.request();
    if !args.simple {
        return request;
    }
    let text = args.search.as_deref().unwrap_or(&config.query.search);
    SearchRequest::simple(
        key.project,
        text.trim(),
        args.state,
        args.sort_field,
        args.asc,
        request.start_at,
        request.max_results,
    )
}

pub fn search(args: &SearchArgs, runtime: &Runtime) -> Result<()> {
    let mut config = Config::load();
    let (key, table) = search_state(args, &config)?;
    let request = search_request(args, &config, &key);
    info!(search = %request.search, advanced = request.advanced, page = key.page_index, "search");

    let client = SearchClient::new();
    let response = runtime.block_on(client.search(&request))?;

    match args.output {
        SearchFormat::Plain => {
            let page_count = table.pagination.page_count(response.total);
            print!("{}", format_table(&table, &response.issues));
            println!(
                "\nPage {} of {} ({} issues)",
                key.page_index + 1,
                page_count,
                response.total
            );
        }
        SearchFormat::Json => {
            let output = json!({
                "search": request.search,
                "advanced": request.advanced,
                "page": key.page_index + 1,
                "pageSize": key.page_size,
                "total": response.total,
                "issues": response.issues,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    if args.save {
        config.query.project = key.project;
        if let Some(search) = &args.search {
            config.query.search = search.clone();
        }
        config.store_table_state(&table);
        config.save()?;
        eprintln!("✓ Saved query");
    }
    Ok(())
}

fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    for c in text.chars() {
        if out.width() + c.to_string().width() + 1 > width {
            break;
        }
        out.push(c);
    }
    out.push('…');
    out
}

/// Visible columns in layout order as an aligned text table.
pub fn format_table(table: &TableState, issues: &[Issue]) -> String {
    let columns = table.visible_columns();
    let rows: Vec<Vec<String>> = issues
        .iter()
        .map(|issue| columns.iter().map(|c| cell_text(issue, c.id)).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let cap = usize::from((table.width(column.id) / PIXELS_PER_CHAR).max(4));
            rows.iter()
                .map(|row| row[i].width())
                .chain(std::iter::once(column.title.width()))
                .max()
                .unwrap_or(0)
                .min(cap)
        })
        .collect();

    let format_row = |cells: Vec<String>| -> String {
        cells
            .iter()
            .zip(&widths)
            .zip(&columns)
            .map(|((cell, width), column)| {
                let cell = truncate(cell, *width);
                let pad = width.saturating_sub(cell.width());
                if column.numeric {
                    format!("{}{cell}", " ".repeat(pad))
                } else {
                    format!("{cell}{}", " ".repeat(pad))
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&format_row(columns.iter().map(|c| c.title.to_string()).collect()));
    out.push('\n');
    let rule_width = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    out.push_str(&"─".repeat(rule_width));
    out.push('\n');
    for row in rows {
        out.push_str(&format_row(row));
        out.push('\n');
    }
    out
}

/// An issue's fields and description as plain text.
pub fn issue_text(issue: &Issue) -> String {
    let mut out = format!("{}  {}\n{}\n\n", issue.key, issue.summary(), issue.browse_url());
    for field in fields(issue) {
        let value = if field.values.is_empty() {
            "-".to_string()
        } else {
            field.display()
        };
        out.push_str(&format!("{:<26}{value}\n", field.label));
    }
    out.push_str("\nDescription\n\n");
    match issue.description() {
        Some(description) => out.push_str(&to_plain_text(&text::render(&description, &PlainLines))),
        None => out.push_str("No description."),
    }
    out.push('\n');
    out
}

pub fn issue(args: &IssueArgs, runtime: &Runtime) -> Result<()> {
    let config = Config::load();
    let theme = args.theme.clone().unwrap_or(config.ui.theme);
    let client = SearchClient::new();
    let issue = runtime.block_on(client.issue(&args.key))?;

    let output = match args.output {
        IssueFormat::Json => serde_json::to_string_pretty(&issue)?,
        IssueFormat::Text => issue_text(&issue),
        IssueFormat::Html if args.lazy => {
            let shared = SharedHighlighter::new(Some(theme));
            let description = match issue.description() {
                Some(node) => Some(runtime.block_on(render_lazy(&node, &shared))?),
                None => None,
            };
            let background = shared.try_get().and_then(|h| h.background_css());
            render_page(&issue, description.as_ref(), background.as_deref()).into_string()
        }
        IssueFormat::Html => {
            let highlighter = Highlighter::new(Some(theme.as_str()));
            let description = issue
                .description()
                .map(|node| html::render(&node, &highlighter));
            render_page(&issue, description.as_ref(), highlighter.background_css().as_deref())
                .into_string()
        }
    };
    write_output(&output, args.out.as_deref())
}

fn read_document(file: &Path) -> Result<Value> {
    let contents = if file == Path::new("-") {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(file).wrap_err_with(|| format!("could not read {}", file.display()))?
    };
    serde_json::from_str(&contents).wrap_err("document is not valid JSON")
}

/// The document inside `value`: either the value itself or the
/// `fields.description` of an issue.
fn stored_document(value: &Value) -> Node {
    let document = value
        .pointer("/fields/description")
        .filter(|d| d.is_object())
        .unwrap_or(value);
    Node::from_value(document)
}

pub fn render_document(value: &Value, format: RenderFormat, theme: Option<&str>) -> String {
    let node = stored_document(value);
    match format {
        RenderFormat::Html => html::render(&node, &Highlighter::new(theme)).into_string(),
        RenderFormat::Text => to_plain_text(&text::render(&node, &PlainLines)),
    }
}

pub fn render(file: &Path, format: RenderFormat, theme: Option<&str>) -> Result<()> {
    let value = read_document(file)?;
    write_output(&render_document(&value, format, theme), None)
}

/// Columns in order with their visibility, pinning and width.
pub fn format_columns(table: &TableState) -> String {
    let mut out = format!(
        "{:<18}{:<28}{:>6}  {:<8}{}\n",
        "ID", "TITLE", "WIDTH", "VISIBLE", "PINNED"
    );
    for id in table.column_order() {
        let Some(column) = columns::find(id) else {
            continue;
        };
        let pinned = table
            .pinned_side(id)
            .map(|side| side.to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:<18}{:<28}{:>6}  {:<8}{}\n",
            column.id,
            column.title,
            table.width(id),
            if table.is_visible(id) { "yes" } else { "no" },
            pinned
        ));
    }
    out
}

pub fn columns(action: &ColumnsCommand) -> Result<()> {
    let mut config = Config::load();
    let mut table = config.table_state();

    match action {
        ColumnsCommand::List => {
            print!("{}", format_columns(&table));
            return Ok(());
        }
        ColumnsCommand::Show { id } => table.show(id)?,
        ColumnsCommand::Hide { id } => table.hide(id)?,
        ColumnsCommand::Pin { id, side } => table.pin(id, *side)?,
        ColumnsCommand::Unpin { id } => table.unpin(id)?,
        ColumnsCommand::Move { id, to } => table.move_column(id, *to)?,
        ColumnsCommand::Resize { id, width } => {
            let applied = table.resize(id, *width)?;
            if applied != *width {
                eprintln!("Width clamped to {applied} (max {MAX_WIDTH})");
            }
        }
        ColumnsCommand::Reset => table.reset_columns(),
    }

    config.store_table_state(&table);
    config.save()?;
    print!("{}", format_columns(&table));
    Ok(())
}

/// Bundled theme names, one per line, with the active theme starred.
pub fn format_themes(highlighter: &Highlighter, active: &str) -> String {
    highlighter
        .theme_names()
        .map(|name| {
            let marker = if name == active { '*' } else { ' ' };
            format!("{marker} {name}\n")
        })
        .collect()
}

pub fn config(action: &ConfigCommand) -> Result<()> {
    match action {
        ConfigCommand::Path => {
            let path = Config::active_path().ok_or_else(|| eyre!("no config directory"))?;
            println!("{}", path.display());
        }
        ConfigCommand::Show => {
            let config = Config::load();
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigCommand::Themes => {
            let config = Config::load();
            let highlighter = Highlighter::new(Some(config.ui.theme.as_str()));
            print!("{}", format_themes(&highlighter, &config.ui.theme));
        }
    }
    Ok(())
}

pub fn completions(shell: clap_complete::Shell) {
    let mut command = Cli::command();
    clap_complete::generate(shell, &mut command, "mojira", &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use mojira::api::{Project, SearchFilter, SortField};
    use mojira::table::{ColumnFilter, PinSide, SortEntry};

    fn issues() -> Vec<Issue> {
        serde_json::from_value(json!([
            {"key": "MC-1", "fields": {"summary": "First bug", "customfield_10070": 12}},
            {"key": "MC-22", "fields": {"summary": "A much longer summary that keeps going", "customfield_10070": 3}}
        ]))
        .unwrap()
    }

    fn args(page: usize) -> SearchArgs {
        SearchArgs {
            project: Some(Project::Bds),
            search: Some("labels = crash".to_string()),
            sort: vec![SortEntry {
                id: "updated".to_string(),
                desc: true,
            }],
            filter: vec![ColumnFilter {
                id: "cf[10048]".to_string(),
                value: "Survival".to_string(),
            }],
            page,
            page_size: Some(50),
            output: SearchFormat::Plain,
            save: false,
            simple: false,
            state: SearchFilter::All,
            sort_field: SortField::Created,
            asc: false,
        }
    }

    #[test]
    fn test_search_state_applies_arguments() {
        let (key, table) = search_state(&args(3), &Config::default()).unwrap();
        assert_eq!(key.project, Project::Bds);
        assert_eq!(
            key.jql,
            "project = BDS AND (labels = crash) AND cf[10048] = \"Survival\" ORDER BY updated DESC"
        );
        assert_eq!(key.page_index, 2);
        assert_eq!(key.request().start_at, 100);
        assert_eq!(table.pagination.page_size, 50);
    }

    #[test]
    fn test_search_request_modes() {
        let config = Config::default();
        let (key, _) = search_state(&args(2), &config).unwrap();
        let request = search_request(&args(2), &config, &key);
        assert!(request.advanced);
        assert_eq!(request.search, key.jql);

        let simple = SearchArgs {
            sort: Vec::new(),
            filter: Vec::new(),
            search: Some("  falling sand ".to_string()),
            simple: true,
            state: SearchFilter::Open,
            sort_field: SortField::Updated,
            asc: true,
            ..args(2)
        };
        let (key, _) = search_state(&simple, &config).unwrap();
        let request = search_request(&simple, &config, &key);
        assert!(!request.advanced);
        assert_eq!(request.search, "falling sand");
        assert_eq!(request.filter, Some(SearchFilter::Open));
        assert_eq!(request.sort_field, Some(SortField::Updated));
        assert_eq!(request.sort_asc, Some(true));
        assert_eq!(request.start_at, 50);
        assert_eq!(request.max_results, 50);
    }

    #[test]
    fn test_search_state_rejects_unknown_column() {
        let mut bad = args(1);
        bad.sort[0].id = "nonsense".to_string();
        assert!(search_state(&bad, &Config::default()).is_err());
    }

    #[test]
    fn test_format_table_layout() {
        let mut table = TableState::default();
        for id in table.column_order() {
            if !matches!(id, "key" | "summary" | "cf[10070]") {
                table.hide(id).unwrap();
            }
        }
        table.resize("summary", 160).unwrap();

        let output = format_table(&table, &issues());
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "Key    Summary               Votes");
        assert!(lines[1].starts_with("───"));
        assert_eq!(lines[2], "MC-1   First bug                12");
        assert_eq!(lines[3], "MC-22  A much longer summa…      3");
    }

    #[test]
    fn test_format_columns_marks_state() {
        let mut table = TableState::default();
        table.hide("labels").unwrap();
        table.pin("key", PinSide::Right).unwrap();
        let output = format_columns(&table);
        let labels = output.lines().find(|l| l.starts_with("labels")).unwrap();
        assert!(labels.contains("no"));
        let key = output.lines().find(|l| l.starts_with("key ")).unwrap();
        assert!(key.ends_with("right"));
    }

    #[test]
    fn test_format_themes_marks_active() {
        let highlighter = Highlighter::new(None);
        let output = format_themes(&highlighter, "InspiredGitHub");
        assert!(output.lines().any(|l| l == "* InspiredGitHub"));
        assert!(output.lines().any(|l| l == "  base16-ocean.dark"));
        assert_eq!(output.lines().filter(|l| l.starts_with('*')).count(), 1);
    }

    #[test]
    fn test_issue_text() {
        let issue = &issues()[0];
        let text = issue_text(issue);
        assert!(text.starts_with("MC-1  First bug\nhttps://bugs.mojang.com/browse/MC-1"));
        assert!(text.contains("Votes                     12"));
        assert!(text.ends_with("No description.\n"));
    }

    #[test]
    fn test_render_document_accepts_issue_or_document() {
        let document = json!({
            "type": "doc",
            "content": [{"type": "paragraph", "content": [{"type": "text", "text": "hi"}]}]
        });
        let wrapped = json!({"key": "MC-1", "fields": {"description": document.clone()}});

        let direct = render_document(&document, RenderFormat::Html, None);
        let nested = render_document(&wrapped, RenderFormat::Html, None);
        assert_eq!(direct, "<p>hi</p>");
        assert_eq!(render_document(&wrapped, RenderFormat::Text, None).trim(), "hi");
        assert_eq!(nested, direct);
    }
}
