//! Raw column and global settings as stored by the host.
//!
//! Unknown keys are kept in `extra` so that change detection compares the
//! whole record, not only the fields the engine reads.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ColumnSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_games: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_blocked_games: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    /// Clip time window key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    /// Video broadcast types the user chose to hide.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_recordings: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GlobalSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<Vec<String>>,
    #[serde(default)]
    pub hide_reruns: bool,
    /// Category display names blocked everywhere. Upstream only exposes
    /// names for this list, so it is matched by name rather than id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_games: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ColumnSettings {
    pub fn tag_count(&self) -> (usize, usize) {
        (len_of(&self.tags), len_of(&self.blocked_tags))
    }

    pub fn category_count(&self) -> (usize, usize) {
        (len_of(&self.filter_games), len_of(&self.filter_blocked_games))
    }
}

fn len_of(v: &Option<Vec<String>>) -> usize {
    v.as_ref().map(Vec::len).unwrap_or(0)
}
