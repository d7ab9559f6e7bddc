//! Built-in sort options and clip periods per content kind.
//!
//! This module provides:
//! - Stable sort keys + descriptors (titles, i18n keys, icons)
//! - The comparator each client-sortable option uses
//! - The fixed clip period table

#![forbid(unsafe_code)]

use serde::Serialize;

use crate::ContentKind;

/// Comparators available for client-side sorting.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum ClientSort {
    ViewersDesc,
    ViewersAsc,
    RecentDesc,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SortDescriptor {
    pub key: &'static str,
    pub title: &'static str,
    pub i18n: &'static str,
    pub subtitle: Option<&'static str>,
    pub sub_i18n: Option<&'static str>,
    pub icon: &'static str,
    /// Absent when the upstream feed order is authoritative.
    pub client_sort: Option<ClientSort>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PeriodDescriptor {
    pub key: &'static str,
    pub title: &'static str,
    pub i18n: &'static str,
    pub subtitle: Option<&'static str>,
    pub sub_i18n: Option<&'static str>,
    pub icon: &'static str,
}

// ---------------- Sort keys (stable) ----------------
// Live
pub const LIVE_VIEWER_COUNT: &str = "VIEWER_COUNT";
pub const LIVE_VIEWER_COUNT_ASC: &str = "VIEWER_COUNT_ASC";
pub const LIVE_RECENT: &str = "RECENT";
pub const LIVE_RELEVANCE: &str = "RELEVANCE";

// Clips
pub const CLIP_CREATED_AT_ASC: &str = "CREATED_AT_ASC";
pub const CLIP_CREATED_AT_DESC: &str = "CREATED_AT_DESC";
pub const CLIP_VIEWS_ASC: &str = "VIEWS_ASC";
pub const CLIP_VIEWS_DESC: &str = "VIEWS_DESC";
pub const CLIP_TRENDING: &str = "TRENDING";

// Videos
pub const VIDEO_TIME: &str = "TIME";
pub const VIDEO_VIEWS: &str = "VIEWS";

// Clip periods
pub const PERIOD_LAST_DAY: &str = "LAST_DAY";
pub const PERIOD_LAST_WEEK: &str = "LAST_WEEK";
pub const PERIOD_LAST_MONTH: &str = "LAST_MONTH";
pub const PERIOD_ALL_TIME: &str = "ALL_TIME";

/// Broadcast types a video can declare upstream.
pub const VIDEO_TYPES: [&str; 5] = ["ARCHIVE", "HIGHLIGHT", "UPLOAD", "PREMIERE_UPLOAD", "PAST_PREMIERE"];

const fn sort(
    key: &'static str,
    title: &'static str,
    i18n: &'static str,
    sub: Option<(&'static str, &'static str)>,
    icon: &'static str,
    client_sort: Option<ClientSort>,
) -> SortDescriptor {
    let (subtitle, sub_i18n) = match sub {
        Some((s, k)) => (Some(s), Some(k)),
        None => (None, None),
    };
    SortDescriptor { key, title, i18n, subtitle, sub_i18n, icon, client_sort }
}

pub static LIVE_SORTS: [SortDescriptor; 4] = [
    sort(
        LIVE_VIEWER_COUNT,
        "Viewers (High to Low)",
        "addon.deck.sort.live.viewers",
        Some(("Viewers", "addon.deck.sort.sub.viewers")),
        "ffz-i-sort-alt-down",
        Some(ClientSort::ViewersDesc),
    ),
    sort(
        LIVE_VIEWER_COUNT_ASC,
        "Viewers (Low to High)",
        "addon.deck.sort.live.viewers-asc",
        Some(("Viewers", "addon.deck.sort.sub.viewers")),
        "ffz-i-sort-alt-up",
        Some(ClientSort::ViewersAsc),
    ),
    sort(
        LIVE_RECENT,
        "Recently Started",
        "addon.deck.live.recent",
        Some(("Recent", "addon.deck.sub.recent")),
        "ffz-i-clock",
        Some(ClientSort::RecentDesc),
    ),
    sort(
        LIVE_RELEVANCE,
        "Recommended for You",
        "addon.deck.live.recommended",
        Some(("Recommended", "addon.deck.sub.recommended")),
        "ffz-i-thumbs-up",
        None,
    ),
];

pub static CLIP_SORTS: [SortDescriptor; 5] = [
    sort(
        CLIP_CREATED_AT_ASC,
        "Recently Created",
        "addon.deck.sort.clip.created-asc",
        Some(("Recent", "addon.deck.sub.recent")),
        "ffz-i-clock",
        None,
    ),
    sort(
        CLIP_CREATED_AT_DESC,
        "Oldest First",
        "addon.deck.sort.clip.created-desc",
        Some(("Oldest", "addon.deck.sub.oldest")),
        "ffz-i-clock",
        None,
    ),
    sort(
        CLIP_VIEWS_ASC,
        "Views (Low to High)",
        "addon.deck.sort.clip.views-asc",
        Some(("Views", "addon.deck.sub.views")),
        "ffz-i-sort-alt-up",
        None,
    ),
    sort(
        CLIP_VIEWS_DESC,
        "Views (High to Low)",
        "addon.deck.sort.clip.views-desc",
        Some(("Views", "addon.deck.sub.views")),
        "ffz-i-sort-alt-down",
        None,
    ),
    sort(CLIP_TRENDING, "Trending", "addon.deck.sort.trending", None, "ffz-i-thumbs-up", None),
];

pub static VIDEO_SORTS: [SortDescriptor; 2] = [
    sort(
        VIDEO_TIME,
        "Recently Published",
        "addon.deck.sort.video.recent",
        Some(("Recent", "addon.deck.sub.recent")),
        "ffz-i-clock",
        None,
    ),
    sort(
        VIDEO_VIEWS,
        "Views (High to Low)",
        "addon.deck.sort.video.views",
        Some(("Views", "addon.deck.sort.sub.views")),
        "ffz-i-sort-alt-down",
        None,
    ),
];

const fn period(
    key: &'static str,
    title: &'static str,
    i18n: &'static str,
    subtitle: &'static str,
    sub_i18n: &'static str,
) -> PeriodDescriptor {
    PeriodDescriptor { key, title, i18n, subtitle: Some(subtitle), sub_i18n: Some(sub_i18n), icon: "ffz-i-calendar" }
}

pub static CLIP_PERIODS: [PeriodDescriptor; 4] = [
    period(PERIOD_LAST_DAY, "24 Hours", "addon.deck.clip-period.24-hours", "24h", "addon.deck.clip-period.24h"),
    period(PERIOD_LAST_WEEK, "7 Days", "addon.deck.clip-period.7-days", "7d", "addon.deck.clip-period.7d"),
    period(PERIOD_LAST_MONTH, "30 Days", "addon.deck.clip-period.30-days", "30d", "addon.deck.clip-period.30d"),
    period(PERIOD_ALL_TIME, "All Time", "addon.deck.clip-period.all-time", "All", "addon.deck.clip-period.all"),
];

/// Full sort table for a kind, in display order.
pub fn sort_options(kind: ContentKind) -> &'static [SortDescriptor] {
    match kind {
        ContentKind::Live => &LIVE_SORTS,
        ContentKind::Clip => &CLIP_SORTS,
        ContentKind::Video => &VIDEO_SORTS,
    }
}

/// Look up a sort option. Unknown keys mean "no active sort".
pub fn sort_option(kind: ContentKind, key: &str) -> Option<&'static SortDescriptor> {
    sort_options(kind).iter().find(|d| d.key == key)
}

/// Period table; only clips have one.
pub fn periods(kind: ContentKind) -> &'static [PeriodDescriptor] {
    match kind {
        ContentKind::Clip => &CLIP_PERIODS,
        _ => &[],
    }
}

pub fn period_option(kind: ContentKind, key: &str) -> Option<&'static PeriodDescriptor> {
    periods(kind).iter().find(|d| d.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_known_and_unknown_keys() {
        let d = sort_option(ContentKind::Live, LIVE_VIEWER_COUNT).unwrap();
        assert_eq!(d.client_sort, Some(ClientSort::ViewersDesc));
        assert_eq!(d.subtitle, Some("Viewers"));
        assert!(sort_option(ContentKind::Live, LIVE_RELEVANCE).unwrap().client_sort.is_none());
        assert!(sort_option(ContentKind::Live, "NOPE").is_none());
        // keys are per kind
        assert!(sort_option(ContentKind::Video, LIVE_VIEWER_COUNT).is_none());
    }

    #[test]
    fn only_live_options_carry_comparators() {
        for kind in [ContentKind::Clip, ContentKind::Video] {
            assert!(sort_options(kind).iter().all(|d| d.client_sort.is_none()), "{kind}");
        }
        assert_eq!(LIVE_SORTS.iter().filter(|d| d.client_sort.is_some()).count(), 3);
    }

    #[test]
    fn periods_are_clip_only() {
        assert_eq!(periods(ContentKind::Clip).len(), 4);
        assert!(periods(ContentKind::Live).is_empty());
        assert_eq!(period_option(ContentKind::Clip, PERIOD_LAST_WEEK).unwrap().subtitle, Some("7d"));
        assert!(period_option(ContentKind::Video, PERIOD_LAST_WEEK).is_none());
    }
}
