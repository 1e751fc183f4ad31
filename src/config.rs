use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ChainError;

pub const DEFAULT_BUNDLE_BASE_URL: &str = "https://curl.se/ca";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RESPONSE_BYTES: u64 = 10 * 1024 * 1024;

/// What to keep from the resolved chain, and which root bundle to trust.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionOptions {
    /// Keep the leaf certificate at the start of the output.
    pub include_leaf: bool,
    /// Keep the root certificate at the end of the output.
    pub include_root: bool,
    /// Revision of the root bundle to verify against.
    /// Defaults to the latest bundle.
    pub cacert_date: Option<CacertDate>,
}

/// A dated root bundle revision, written as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CacertDate(NaiveDate);

impl FromStr for CacertDate {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        // chrono accepts unpadded fields, the bundle file names never have them.
        if s.len() != 10 {
            return Err(invalid_date());
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(CacertDate)
            .map_err(|_| invalid_date())
    }
}

impl TryFrom<String> for CacertDate {
    type Error = ChainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CacertDate> for String {
    fn from(date: CacertDate) -> Self {
        date.to_string()
    }
}

impl Display for CacertDate {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

fn invalid_date() -> ChainError {
    ChainError::InvalidInput("Invalid date format. Use YYYY-MM-DD.".to_string())
}

/// Settings for the HTTP collaborator and the root bundle source.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Directory URL holding `cacert.pem` and `cacert-YYYY-MM-DD.pem`.
    pub bundle_base_url: String,
    /// Applied to every request. A hanging AIA host would otherwise stall the run.
    pub timeout: Duration,
    pub user_agent: String,
    pub max_response_bytes: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            bundle_base_url: DEFAULT_BUNDLE_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("mkchain/{}", env!("CARGO_PKG_VERSION")),
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}
