//! Issue keys such as `MC-4`.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use super::Project;
use crate::error::{Error, Result};

static KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(MC|MCPE|REALMS|MCL|BDS|WEB)-(\d+)$").expect("issue key pattern is valid")
});

/// A validated issue key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IssueKey {
    pub project: Project,
    pub number: u64,
}

impl IssueKey {
    pub fn parse(key: &str) -> Result<Self> {
        let invalid = || Error::InvalidKey(key.to_string());
        let captures = KEY_PATTERN.captures(key).ok_or_else(invalid)?;
        let project = captures[1].parse().map_err(|_| invalid())?;
        let number = captures[2].parse().map_err(|_| invalid())?;
        Ok(Self { project, number })
    }

    /// Link to the issue on the public tracker.
    pub fn browse_url(&self) -> String {
        format!("{}{}", super::BROWSE_URL, self)
    }
}

impl FromStr for IssueKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.project, self.number)
    }
}
