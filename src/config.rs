use crate::api::Project;
use crate::error::{Error, Result};
use crate::highlight::DEFAULT_THEME;
use crate::keybindings::{Keybindings, KeybindingsConfig};
use crate::table::{
    ColumnFilter, ColumnPinning, DEFAULT_PAGE_SIZE, Pagination, SortEntry, TableState, columns,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ui: UiConfig,

    /// The last search, restored on start-up.
    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub columns: ColumnsConfig,

    #[serde(default, skip_serializing_if = "KeybindingsConfig::is_empty")]
    pub keybindings: KeybindingsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Syntect theme used for code blocks.
    #[serde(default = "default_theme")]
    pub theme: String,

    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            page_size: default_page_size(),
        }
    }
}

fn default_theme() -> String {
    DEFAULT_THEME.to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    #[serde(default)]
    pub project: Project,

    /// Free-text JQL appended to the project clause.
    #[serde(default)]
    pub search: String,

    #[serde(default)]
    pub sorting: Vec<SortEntry>,

    #[serde(default)]
    pub filters: Vec<ColumnFilter>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnsConfig {
    #[serde(default)]
    pub hidden: Vec<String>,

    #[serde(default)]
    pub order: Vec<String>,

    #[serde(default)]
    pub pinning: ColumnPinning,

    #[serde(default)]
    pub widths: IndexMap<String, u16>,
}

impl Config {
    /// `~/.config/mojira/config.toml`, preferred on macOS for CLI tools.
    #[cfg(target_os = "macos")]
    fn xdg_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("mojira").join("config.toml"))
    }

    /// Platform config file path
    /// - macOS: ~/Library/Application Support/mojira/config.toml
    /// - Linux: ~/.config/mojira/config.toml
    /// - Windows: %APPDATA%/mojira/config.toml
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("mojira").join("config.toml"))
    }

    /// Where the config is read from and written to.
    pub fn active_path() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            if let Some(xdg_path) = Self::xdg_config_path().filter(|p| p.exists()) {
                return Some(xdg_path);
            }
        }
        Self::config_path()
    }

    /// Load the config, falling back to defaults when the file is missing
    /// or invalid.
    pub fn load() -> Self {
        match Self::active_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        match Self::read(path) {
            Ok(Some(config)) => config,
            Ok(None) => Self::default(),
            Err(err) => {
                warn!("using default config: {err}");
                Self::default()
            }
        }
    }

    /// Parse a config file. `Ok(None)` when it does not exist.
    pub fn read(path: &Path) -> Result<Option<Self>> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        toml::from_str(&contents)
            .map(Some)
            .map_err(|source| Error::TomlDe {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::active_path().ok_or(Error::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Write the config atomically: a temp file in the same directory is
    /// renamed over the target.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let parent = path.parent().ok_or(Error::NoConfigDir)?;
        fs::create_dir_all(parent)?;

        let contents = toml::to_string_pretty(self)?;
        let mut file = tempfile::NamedTempFile::new_in(parent)?;
        file.write_all(contents.as_bytes())?;
        file.persist(path).map_err(|err| Error::Io(err.error))?;

        debug!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Table state restored from the saved query and column layout, on the
    /// first page.
    ///
    /// Sort and filter entries naming unknown columns are dropped, since
    /// column ids go into the JQL unquoted.
    pub fn table_state(&self) -> TableState {
        let known = |id: &str| {
            let found = columns::find(id).is_some();
            if !found {
                warn!(column = id, "ignoring saved query entry for unknown column");
            }
            found
        };
        TableState {
            sorting: self
                .query
                .sorting
                .iter()
                .filter(|entry| known(entry.id.as_str()))
                .cloned()
                .collect(),
            filters: self
                .query
                .filters
                .iter()
                .filter(|filter| known(filter.id.as_str()))
                .cloned()
                .collect(),
            hidden: self.columns.hidden.clone(),
            order: self.columns.order.clone(),
            pinning: self.columns.pinning.clone(),
            widths: self.columns.widths.clone(),
            pagination: Pagination::new(self.ui.page_size),
        }
    }

    /// Remember a table state. The page index is not kept.
    pub fn store_table_state(&mut self, state: &TableState) {
        self.query.sorting = state.sorting.clone();
        self.query.filters = state.filters.clone();
        self.columns = ColumnsConfig {
            hidden: state.hidden.clone(),
            order: state.order.clone(),
            pinning: state.pinning.clone(),
            widths: state.widths.clone(),
        };
        self.ui.page_size = state.pagination.page_size;
    }

    /// Keybindings with user customizations applied
    pub fn keybindings(&self) -> Keybindings {
        self.keybindings.to_keybindings()
    }
}
