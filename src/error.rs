use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Search endpoint returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// A shared fetch failed for another waiter; carries its message.
    #[error("{0}")]
    Fetch(String),

    #[error("Issue not found: {0}")]
    IssueNotFound(String),

    #[error("Invalid issue key: {0}")]
    InvalidKey(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config file {path}: {source}")]
    TomlDe {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Could not serialize config: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Highlighter failed to load: {0}")]
    Highlighter(String),

    #[error("Could not set up logging: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, Error>;
