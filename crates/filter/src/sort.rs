//! Client-side ordering for kinds whose feed order is not authoritative.

use std::cmp::Ordering;

use feedeck_core::catalog::{ClientSort, SortDescriptor};
use feedeck_core::items::FeedItem;
use feedeck_core::{FeedError, FeedResult};

/// Creation time in epoch milliseconds; missing or unparseable is the epoch.
fn created_ms<T: FeedItem>(item: &T) -> i64 {
    item.created_at()
        .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}

pub fn compare<T: FeedItem>(how: ClientSort, a: &T, b: &T) -> Ordering {
    match how {
        ClientSort::ViewersDesc => b.viewers().cmp(&a.viewers()),
        ClientSort::ViewersAsc => a.viewers().cmp(&b.viewers()),
        ClientSort::RecentDesc => created_ms(b).cmp(&created_ms(a)),
    }
}

/// Order items by the descriptor's comparator. Without one the input order
/// is returned untouched.
pub fn sort<T: FeedItem>(mut items: Vec<T>, descriptor: Option<&SortDescriptor>) -> Vec<T> {
    if let Some(how) = descriptor.and_then(|d| d.client_sort) {
        match how {
            ClientSort::RecentDesc => items.sort_by_cached_key(|it| std::cmp::Reverse(created_ms(it))),
            _ => items.sort_by(|a, b| compare(how, a, b)),
        }
    }
    items
}

/// Entry point for hosts: fails loudly when the kind never sorts locally.
pub fn perform_client_sort<T: FeedItem>(items: Vec<T>, descriptor: Option<&SortDescriptor>) -> FeedResult<Vec<T>> {
    if !T::KIND.client_sorts() {
        return Err(FeedError::ClientSortUnsupported(T::KIND));
    }
    Ok(sort(items, descriptor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedeck_core::catalog::{sort_option, LIVE_RECENT, LIVE_RELEVANCE, LIVE_VIEWER_COUNT_ASC};
    use feedeck_core::items::{ClipItem, LiveItem, Stream};
    use feedeck_core::ContentKind;

    fn live(id: &str, viewers: Option<u64>, created: Option<&str>) -> LiveItem {
        LiveItem {
            id: id.to_string(),
            stream: Some(Stream {
                viewers_count: viewers,
                created_at: created.map(str::to_string),
                ..Default::default()
            }),
            broadcast_settings: None,
        }
    }

    fn ids(items: &[LiveItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn ascending_viewers_treats_missing_as_zero() {
        let items = vec![live("a", Some(3), None), live("b", None, None), live("c", Some(1), None)];
        let out = sort(items, sort_option(ContentKind::Live, LIVE_VIEWER_COUNT_ASC));
        assert_eq!(ids(&out), vec!["b", "c", "a"]);
    }

    #[test]
    fn recent_puts_unparseable_last() {
        let items = vec![
            live("old", None, Some("2023-01-01T00:00:00Z")),
            live("junk", None, Some("yesterday")),
            live("new", None, Some("2024-06-01T12:00:00+02:00")),
            live("none", None, None),
        ];
        let out = sort(items, sort_option(ContentKind::Live, LIVE_RECENT));
        assert_eq!(ids(&out), vec!["new", "old", "junk", "none"]);
    }

    #[test]
    fn relevance_keeps_feed_order() {
        let items = vec![live("x", Some(1), None), live("y", Some(9), None)];
        let out = sort(items, sort_option(ContentKind::Live, LIVE_RELEVANCE));
        assert_eq!(ids(&out), vec!["x", "y"]);
        let out = sort(out, None);
        assert_eq!(ids(&out), vec!["x", "y"]);
    }

    #[test]
    fn clip_client_sort_is_a_programmer_error() {
        let clips: Vec<ClipItem> = Vec::new();
        let err = perform_client_sort(clips, None).unwrap_err();
        assert_eq!(err, FeedError::ClientSortUnsupported(ContentKind::Clip));
    }
}
