//! Feed items as delivered by the upstream API.
//!
//! Field names follow the upstream camelCase JSON. Every field the engine
//! reads is optional: absent data falls back to "not present" instead of
//! failing deserialization of the whole batch.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::ContentKind;

/// Category ("game") an item is classified under. Upstream may send either
/// field as null.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Game {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Reference to a tag carried by a stream or video. Only the id matters here;
/// refs without one are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagRef {
    #[serde(default)]
    pub id: Option<String>,
}

pub type TagRefs = SmallVec<[TagRef; 4]>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StreamType {
    Live,
    Rerun,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Stream {
    #[serde(rename = "type", default)]
    pub stream_type: Option<StreamType>,
    #[serde(default)]
    pub viewers_count: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub tags: Option<TagRefs>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastSettings {
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub game: Option<Game>,
}

/// A channel that may currently be live. `stream` is absent when offline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LiveItem {
    pub id: String,
    #[serde(default)]
    pub stream: Option<Stream>,
    #[serde(default)]
    pub broadcast_settings: Option<BroadcastSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClipItem {
    pub id: String,
    #[serde(default)]
    pub game: Option<Game>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub broadcast_type: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub content_tags: Option<TagRefs>,
    #[serde(default)]
    pub game: Option<Game>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub published_at: Option<String>,
}

/// Video status reported while a broadcast is still being archived.
pub const STATUS_RECORDING: &str = "RECORDING";

/// Read-only view over an item used by the filter pipeline and comparators.
///
/// The kind-specific hooks default to "nothing to check", so each kind only
/// overrides the stages that apply to it.
pub trait FeedItem {
    const KIND: ContentKind;

    fn id(&self) -> &str;

    fn game(&self) -> Option<&Game>;

    /// Tag ids carried by the item; an absent list is empty.
    fn tag_ids(&self) -> SmallVec<[&str; 8]> {
        SmallVec::new()
    }

    /// Spoken language as declared upstream, not normalized.
    fn language(&self) -> Option<&str> {
        None
    }

    fn viewers(&self) -> u64 {
        0
    }

    /// Creation (or publication) timestamp, RFC 3339.
    fn created_at(&self) -> Option<&str> {
        None
    }

    /// Structural guard: false when a required sub-record is missing.
    fn is_well_formed(&self) -> bool {
        true
    }

    fn is_rerun(&self) -> bool {
        false
    }

    fn is_recording(&self) -> bool {
        false
    }

    fn broadcast_type(&self) -> Option<&str> {
        None
    }
}

fn refs_to_ids(refs: Option<&TagRefs>) -> SmallVec<[&str; 8]> {
    refs.map(|r| r.iter().filter_map(|t| t.id.as_deref()).collect()).unwrap_or_default()
}

impl FeedItem for LiveItem {
    const KIND: ContentKind = ContentKind::Live;

    fn id(&self) -> &str {
        &self.id
    }

    fn game(&self) -> Option<&Game> {
        self.broadcast_settings.as_ref().and_then(|b| b.game.as_ref())
    }

    fn tag_ids(&self) -> SmallVec<[&str; 8]> {
        refs_to_ids(self.stream.as_ref().and_then(|s| s.tags.as_ref()))
    }

    fn language(&self) -> Option<&str> {
        self.broadcast_settings.as_ref().and_then(|b| b.language.as_deref())
    }

    fn viewers(&self) -> u64 {
        self.stream.as_ref().and_then(|s| s.viewers_count).unwrap_or(0)
    }

    fn created_at(&self) -> Option<&str> {
        self.stream.as_ref().and_then(|s| s.created_at.as_deref())
    }

    fn is_well_formed(&self) -> bool {
        self.stream.is_some()
    }

    fn is_rerun(&self) -> bool {
        matches!(self.stream.as_ref().and_then(|s| s.stream_type), Some(StreamType::Rerun))
    }
}

impl FeedItem for ClipItem {
    const KIND: ContentKind = ContentKind::Clip;

    fn id(&self) -> &str {
        &self.id
    }

    fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    fn viewers(&self) -> u64 {
        self.view_count.unwrap_or(0)
    }

    fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }
}

impl FeedItem for VideoItem {
    const KIND: ContentKind = ContentKind::Video;

    fn id(&self) -> &str {
        &self.id
    }

    fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    fn tag_ids(&self) -> SmallVec<[&str; 8]> {
        refs_to_ids(self.content_tags.as_ref())
    }

    fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    fn viewers(&self) -> u64 {
        self.view_count.unwrap_or(0)
    }

    fn created_at(&self) -> Option<&str> {
        self.published_at.as_deref()
    }

    fn is_recording(&self) -> bool {
        self.status.as_deref() == Some(STATUS_RECORDING)
    }

    fn broadcast_type(&self) -> Option<&str> {
        self.broadcast_type.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_item_reads_upstream_shape() {
        let raw = serde_json::json!({
            "id": "42",
            "stream": {
                "type": "rerun",
                "viewersCount": 17,
                "createdAt": "2024-03-01T10:00:00Z",
                "tags": [{"id": "a", "localizedName": "A"}, {"id": "b"}]
            },
            "broadcastSettings": {"language": "EN", "game": {"id": "10", "name": "Chess"}}
        });
        let item: LiveItem = serde_json::from_value(raw).unwrap();
        assert!(item.is_well_formed());
        assert!(item.is_rerun());
        assert_eq!(item.viewers(), 17);
        assert_eq!(item.tag_ids().as_slice(), &["a", "b"]);
        assert_eq!(item.language(), Some("EN"));
        assert_eq!(item.game().and_then(|g| g.name.as_deref()), Some("Chess"));
    }

    #[test]
    fn null_category_fields_still_decode() {
        let raw = serde_json::json!([
            {"id": "1", "stream": {}, "broadcastSettings": {"game": {"id": null, "name": "Chess"}}},
            {"id": "2", "stream": {}, "broadcastSettings": {"game": {"name": null}}}
        ]);
        let items: Vec<LiveItem> = serde_json::from_value(raw).unwrap();
        assert_eq!(items[0].game().and_then(|g| g.id.as_deref()), None);
        assert_eq!(items[0].game().and_then(|g| g.name.as_deref()), Some("Chess"));
        assert_eq!(items[1].game(), Some(&Game::default()));

        let clip: ClipItem = serde_json::from_value(serde_json::json!({"id": "c", "game": {"name": "Chess"}})).unwrap();
        assert_eq!(clip.game().and_then(|g| g.name.as_deref()), Some("Chess"));

        let video: VideoItem =
            serde_json::from_value(serde_json::json!({"id": "v", "game": {"id": null, "name": null}})).unwrap();
        assert_eq!(video.game(), Some(&Game::default()));
    }

    #[test]
    fn tag_refs_without_id_are_skipped() {
        let raw = serde_json::json!({"id": "v", "contentTags": [{"id": null}, {"id": "t"}, {}]});
        let item: VideoItem = serde_json::from_value(raw).unwrap();
        assert_eq!(item.tag_ids().as_slice(), &["t"]);
    }

    #[test]
    fn unknown_stream_type_is_not_a_rerun() {
        let raw = serde_json::json!({"id": "1", "stream": {"type": "playlist"}});
        let item: LiveItem = serde_json::from_value(raw).unwrap();
        assert_eq!(item.stream.as_ref().and_then(|s| s.stream_type), Some(StreamType::Other));
        assert!(!item.is_rerun());
    }

    #[test]
    fn offline_channel_is_malformed_for_live() {
        let item: LiveItem = serde_json::from_value(serde_json::json!({"id": "1"})).unwrap();
        assert!(!item.is_well_formed());
        assert!(item.tag_ids().is_empty());
        assert_eq!(item.viewers(), 0);
    }

    #[test]
    fn video_reports_recording_and_type() {
        let raw = serde_json::json!({
            "id": "v1", "status": "RECORDING", "broadcastType": "ARCHIVE",
            "contentTags": [{"id": "t1"}], "publishedAt": "2024-01-01T00:00:00Z"
        });
        let item: VideoItem = serde_json::from_value(raw).unwrap();
        assert!(item.is_recording());
        assert_eq!(item.broadcast_type(), Some("ARCHIVE"));
        assert_eq!(item.tag_ids().as_slice(), &["t1"]);
        assert_eq!(item.created_at(), Some("2024-01-01T00:00:00Z"));
    }
}
