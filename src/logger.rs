//! Log setup.
//!
//! Logs go to a file so they never draw over the terminal UI. `RUST_LOG`
//! picks the filter; without it the crate logs at info, or debug when
//! verbose output was asked for.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::error::{Error, Result};

/// `<cache_dir>/mojira/mojira.log`
pub fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|p| p.join("mojira").join("mojira.log"))
}

fn filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("mojira=debug,warn");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mojira=info,warn"))
}

/// Install the global subscriber, appending to `log_file` or the default
/// path. Returns the file being written to, or `None` when no location
/// could be determined.
pub fn init(log_file: Option<&Path>, verbose: bool) -> Result<Option<PathBuf>> {
    let Some(path) = log_file.map(Path::to_path_buf).or_else(default_log_path) else {
        return Ok(None);
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let fmt_layer = fmt::Layer::new()
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_timer(fmt::time::ChronoLocal::rfc_3339())
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(Mutex::new(file));

    Registry::default()
        .with(filter(verbose))
        .with(fmt_layer)
        .try_init()
        .map_err(|err| Error::Logging(err.to_string()))?;

    Ok(Some(path))
}
