pub mod commands;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use mojira::api::{Project, SearchFilter, SortField};
use mojira::table::{ColumnFilter, PinSide, SortEntry};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mojira")]
#[command(version)]
#[command(about = "A terminal viewer for the Mojira issue tracker")]
#[command(
    long_about = "mojira - Browse the public Mojira issue tracker from the terminal.\n\n\
    Launch without a subcommand for the interactive table. Use subcommands to\n\
    search, export issues as HTML with highlighted code, and manage the saved\n\
    column layout.\n\n\
    Examples:\n  \
    mojira                                  # Interactive table\n  \
    mojira search --project MCPE -o json    # One page of results as JSON\n  \
    mojira search --sort cf[10070]:desc     # Most voted first\n  \
    mojira search --simple -s \"sand\"        # Free-text search\n  \
    mojira issue MC-4 --out MC-4.html       # Standalone HTML page\n  \
    mojira render description.json          # Render a stored document"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Log at debug level
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Write logs here instead of the cache directory
    #[arg(long, value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive issue table (default)
    Tui,

    /// Fetch one page of search results
    Search(SearchArgs),

    /// Show a single issue
    Issue(IssueArgs),

    /// Render a stored document JSON file to HTML, or '-' for stdin
    Render {
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,

        #[arg(short = 'o', long = "output", default_value = "html")]
        output: RenderFormat,

        /// Syntax theme for code blocks
        #[arg(long, value_name = "THEME")]
        theme: Option<String>,
    },

    /// Inspect or change the saved column layout
    Columns {
        #[command(subcommand)]
        action: ColumnsCommand,
    },

    /// Inspect the preferences file
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },

    /// Print a shell completion script
    Completions { shell: Shell },
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Project to search; defaults to the saved one
    #[arg(short = 'p', long)]
    pub project: Option<Project>,

    /// JQL added to the project clause
    #[arg(short = 's', long)]
    pub search: Option<String>,

    /// Sort by a column: `id`, `id:asc` or `id:desc` (repeatable)
    #[arg(long = "sort", value_name = "COLUMN[:DIR]", value_parser = parse_sort)]
    pub sort: Vec<SortEntry>,

    /// Exact-match column filter `id=value` (repeatable)
    #[arg(long = "filter", value_name = "COLUMN=VALUE", value_parser = parse_filter)]
    pub filter: Vec<ColumnFilter>,

    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    #[arg(long, value_name = "N")]
    pub page_size: Option<usize>,

    #[arg(short = 'o', long = "output", default_value = "plain")]
    pub output: SearchFormat,

    /// Remember project, search, sorting and filters for next time
    #[arg(long)]
    pub save: bool,

    /// Treat the search as free text and use the tracker's own state
    /// filter and sort instead of JQL
    #[arg(long, conflicts_with_all = ["sort", "filter"])]
    pub simple: bool,

    /// Issue state for --simple: all, open or done
    #[arg(long, value_name = "STATE", default_value = "all", requires = "simple")]
    pub state: SearchFilter,

    /// Sort field for --simple: created, updated, priority or status
    #[arg(long, value_name = "FIELD", default_value = "created", requires = "simple")]
    pub sort_field: SortField,

    /// Sort ascending with --simple
    #[arg(long, requires = "simple")]
    pub asc: bool,
}

#[derive(Debug, Args)]
pub struct IssueArgs {
    /// Issue key such as MC-4
    pub key: String,

    #[arg(short = 'o', long = "output", default_value = "html")]
    pub output: IssueFormat,

    /// Write to a file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Syntax theme for code blocks
    #[arg(long, value_name = "THEME")]
    pub theme: Option<String>,

    /// Render through the shared, lazily loaded highlighter
    #[arg(long)]
    pub lazy: bool,
}

#[derive(Debug, Subcommand)]
pub enum ColumnsCommand {
    /// All columns in order with their state
    List,
    Show { id: String },
    Hide { id: String },
    Pin { id: String, side: PinSide },
    Unpin { id: String },
    /// Move a column to a position in the column order (0-based)
    Move { id: String, to: usize },
    /// Set a column width (clamped to 40..=800)
    Resize { id: String, width: u16 },
    /// Forget visibility, order, pinning and widths
    Reset,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the preferences file location
    Path,
    /// Print the effective preferences
    Show,
    /// List the syntax themes; the active one is starred
    Themes,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SearchFormat {
    /// Text table of the visible columns
    Plain,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum IssueFormat {
    /// Standalone HTML page
    Html,
    /// Fields and description as plain text
    Text,
    /// The issue as returned by the tracker
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RenderFormat {
    Html,
    Text,
}

fn parse_sort(arg: &str) -> Result<SortEntry, String> {
    let (id, direction) = arg.split_once(':').unwrap_or((arg, "asc"));
    let desc = match direction.to_ascii_lowercase().as_str() {
        "asc" => false,
        "desc" => true,
        other => return Err(format!("unknown sort direction '{other}', use asc or desc")),
    };
    if id.is_empty() {
        return Err("missing column id".to_string());
    }
    Ok(SortEntry {
        id: id.to_string(),
        desc,
    })
}

fn parse_filter(arg: &str) -> Result<ColumnFilter, String> {
    match arg.split_once('=') {
        Some((id, value)) if !id.trim().is_empty() => Ok(ColumnFilter {
            id: id.trim().to_string(),
            value: value.to_string(),
        }),
        _ => Err(format!("expected COLUMN=VALUE, got '{arg}'")),
    }
}
