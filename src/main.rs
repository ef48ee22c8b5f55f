//! # mojira
//!
//! A terminal viewer for the public Mojira issue tracker.
//!
//! ## Usage
//!
//! Browse issues interactively:
//! ```sh
//! mojira
//! ```
//!
//! Export one issue as a standalone HTML page:
//! ```sh
//! mojira issue MC-4 --out MC-4.html
//! ```
//!
//! Fetch a page of results for scripting:
//! ```sh
//! mojira search --project MCPE --sort cf[10070]:desc -o json
//! ```

mod cli;

use clap::Parser as ClapParser;
use cli::{Cli, Command, commands};
use color_eyre::Result;
use mojira::api::SearchClient;
use mojira::highlight::SharedHighlighter;
use mojira::query::QueryCache;
use mojira::{Config, logger, tui};
use tokio::runtime::Runtime;
use tracing::info;

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    match logger::init(args.log_file.as_deref(), args.verbose) {
        Ok(Some(path)) if args.verbose => eprintln!("Logging to {}", path.display()),
        Ok(_) => {}
        Err(e) => eprintln!("Warning: {e}"),
    }

    let runtime = Runtime::new()?;

    match args.command.unwrap_or(Command::Tui) {
        Command::Tui => run_tui(&runtime),
        Command::Search(search) => commands::search(&search, &runtime),
        Command::Issue(issue) => commands::issue(&issue, &runtime),
        Command::Render {
            file,
            output,
            theme,
        } => commands::render(&file, output, theme.as_deref()),
        Command::Columns { action } => commands::columns(&action),
        Command::Config { action } => commands::config(&action),
        Command::Completions { shell } => {
            commands::completions(shell);
            Ok(())
        }
    }
}

fn run_tui(runtime: &Runtime) -> Result<()> {
    let config = Config::load();
    let highlighter = SharedHighlighter::new(Some(config.ui.theme.clone()));
    let cache = QueryCache::new(SearchClient::new());
    info!(project = %config.query.project, "starting interactive table");

    let app = tui::App::new(
        config,
        Config::active_path(),
        cache,
        highlighter,
        runtime.handle().clone(),
    );
    tui::launch(app)
}
