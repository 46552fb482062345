//! Render context assembly
//!
//! Builds the root mapping handed to the template engine from run metadata
//! and the coin listings produced by the market-data and history stages.

use crate::template::{serialized_fields, Map, Record, Value};
use crate::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A ranked coin listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub id: i64,
    pub name: String,
    pub symbol: String,
    pub rank: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub market_cap_currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

// Optional fields skip serialization, so `%IF%` treats them as absent
impl Record for Coin {
    fn fields(&self) -> Map {
        serialized_fields(self)
    }
}

/// A previously published message, offered to the prompt as history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentPost {
    pub created_at_utc: String,
    pub text: String,
    #[serde(default)]
    pub mentioned_coins: Vec<Coin>,
}

impl Record for RecentPost {
    fn fields(&self) -> Map {
        serialized_fields(self)
    }
}

/// Listing changes for one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub new_coins: Vec<Coin>,
    #[serde(default)]
    pub exited_coins: Vec<Coin>,
    #[serde(default)]
    pub recent_posts: Vec<RecentPost>,
}

impl Snapshot {
    /// Load a snapshot from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// First coin image among the new entrants
    pub fn first_image_url(&self) -> Option<&str> {
        self.new_coins
            .iter()
            .filter_map(|coin| coin.image_url.as_deref())
            .find(|url| !url.trim().is_empty())
    }
}

/// Builder for the root render context
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    root: Map,
}

impl ContextBuilder {
    /// Start a context for `project_name`, stamped with the current time
    pub fn new(project_name: &str) -> Self {
        let mut root = Map::new();
        root.insert("project_name".to_string(), project_name.into());
        Self { root }.with_timestamp(Utc::now())
    }

    pub fn with_timestamp(self, timestamp: DateTime<Utc>) -> Self {
        self.with_value(
            "timestamp_utc",
            timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        )
    }

    pub fn with_top_n(self, top_n: usize) -> Self {
        self.with_value("top_n", top_n)
    }

    pub fn with_convert(self, convert: &str) -> Self {
        self.with_value("convert", convert)
    }

    pub fn with_new_coins(self, coins: &[Coin]) -> Self {
        self.with_value("new_coins", Value::records(coins))
    }

    pub fn with_exited_coins(self, coins: &[Coin]) -> Self {
        self.with_value("exited_coins", Value::records(coins))
    }

    pub fn with_recent_posts(self, posts: &[RecentPost]) -> Self {
        self.with_value("recent_posts", Value::records(posts))
    }

    /// Add every listing of a snapshot
    pub fn with_snapshot(self, snapshot: &Snapshot) -> Self {
        self.with_new_coins(&snapshot.new_coins)
            .with_exited_coins(&snapshot.exited_coins)
            .with_recent_posts(&snapshot.recent_posts)
    }

    /// Set an arbitrary key, replacing any previous value
    pub fn with_value(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.root.insert(key.to_string(), value.into());
        self
    }

    pub fn build(self) -> Map {
        self.root
    }
}
