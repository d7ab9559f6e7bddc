//! Feedeck core types: content kinds, feed items, settings and the derived
//! per-column configuration snapshot.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

pub mod catalog;
pub mod config;
pub mod items;
pub mod settings;
pub mod tags;

/// The three kinds of content a column can show.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Live,
    Clip,
    Video,
}

impl ContentKind {
    pub const ALL: [ContentKind; 3] = [ContentKind::Live, ContentKind::Clip, ContentKind::Video];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Live => "live",
            ContentKind::Clip => "clip",
            ContentKind::Video => "video",
        }
    }

    /// Whether items of this kind carry tags that the tag stage inspects.
    pub fn uses_tags(self) -> bool {
        !matches!(self, ContentKind::Clip)
    }

    /// Whether this kind can reorder fetched items locally. Other kinds take
    /// the upstream order as authoritative.
    pub fn client_sorts(self) -> bool {
        matches!(self, ContentKind::Live)
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentKind {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "live" | "stream" | "streams" => Ok(ContentKind::Live),
            "clip" | "clips" => Ok(ContentKind::Clip),
            "video" | "videos" | "vod" => Ok(ContentKind::Video),
            _ => Err(FeedError::UnknownKind(s.to_string())),
        }
    }
}

/// Errors surfaced by the feed engine. Expected data gaps never produce one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    #[error("client sort is not implemented for {0} columns")]
    ClientSortUnsupported(ContentKind),
    #[error("unknown content kind: {0}")]
    UnknownKind(String),
}

pub type FeedResult<T> = Result<T, FeedError>;

pub mod prelude {
    pub use super::catalog::{ClientSort, PeriodDescriptor, SortDescriptor};
    pub use super::config::{should_invalidate, ColumnConfig};
    pub use super::items::{ClipItem, FeedItem, Game, LiveItem, StreamType, TagRef, VideoItem};
    pub use super::settings::{ColumnSettings, GlobalSettings};
    pub use super::tags::{Notify, TagDescriptor, TagResolver};
    pub use super::{ContentKind, FeedError, FeedResult};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_aliases() {
        assert_eq!("Live".parse::<ContentKind>().unwrap(), ContentKind::Live);
        assert_eq!("clips".parse::<ContentKind>().unwrap(), ContentKind::Clip);
        assert_eq!("vod".parse::<ContentKind>().unwrap(), ContentKind::Video);
        assert_eq!(
            "podcast".parse::<ContentKind>(),
            Err(FeedError::UnknownKind("podcast".to_string()))
        );
    }

    #[test]
    fn only_live_sorts_client_side() {
        assert!(ContentKind::Live.client_sorts());
        assert!(!ContentKind::Clip.client_sorts());
        assert!(!ContentKind::Video.client_sorts());
        assert!(!ContentKind::Clip.uses_tags());
    }
}
