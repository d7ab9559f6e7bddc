//! Derived per-column configuration.
//!
//! A `ColumnConfig` is rebuilt in full from the raw settings on every
//! change and is never patched in place.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::catalog::{self, SortDescriptor, PeriodDescriptor, VIDEO_TYPES};
use crate::settings::{ColumnSettings, GlobalSettings};
use crate::ContentKind;

pub type IdSet = BTreeSet<String>;

/// Normalized filter/sort state for one column.
///
/// Every set is either `None` ("no restriction") or non-empty.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ColumnConfig {
    pub kind: ContentKind,
    pub required_tag_ids: Option<IdSet>,
    pub blocked_tag_ids: Option<IdSet>,
    pub allowed_category_ids: Option<IdSet>,
    pub blocked_category_ids: Option<IdSet>,
    /// Upper-case language codes.
    pub languages: Option<IdSet>,
    pub hide_reruns: bool,
    /// Category display names blocked globally.
    pub blocked_category_names: Option<IdSet>,
    /// Video broadcast types still shown; `None` shows all.
    pub allowed_broadcast_types: Option<IdSet>,
    pub no_recordings: bool,
    pub selected_sort_key: Option<String>,
    pub selected_period_key: Option<String>,
    /// False when the settings exclude every possible item, e.g. a video
    /// column hiding all broadcast types.
    pub runnable: bool,
}

fn collect_set<'a, I>(sources: I, map: impl Fn(&str) -> String) -> Option<IdSet>
where
    I: IntoIterator<Item = Option<&'a Vec<String>>>,
{
    let set: IdSet = sources.into_iter().flatten().flatten().map(|s| map(s)).collect();
    if set.is_empty() { None } else { Some(set) }
}

impl ColumnConfig {
    pub fn normalize(kind: ContentKind, settings: Option<&ColumnSettings>, global: Option<&GlobalSettings>) -> Self {
        let required_tag_ids = collect_set(
            [settings.and_then(|s| s.tags.as_ref()), global.and_then(|g| g.tags.as_ref())],
            str::to_string,
        );
        let blocked_tag_ids = collect_set(
            [settings.and_then(|s| s.blocked_tags.as_ref()), global.and_then(|g| g.blocked_tags.as_ref())],
            str::to_string,
        );
        let allowed_category_ids = collect_set([settings.and_then(|s| s.filter_games.as_ref())], str::to_string);
        let blocked_category_ids =
            collect_set([settings.and_then(|s| s.filter_blocked_games.as_ref())], str::to_string);
        let languages = collect_set(
            [settings.and_then(|s| s.lang.as_ref()), global.and_then(|g| g.lang.as_ref())],
            str::to_uppercase,
        );
        let blocked_category_names = collect_set([global.and_then(|g| g.blocked_games.as_ref())], str::to_string);

        let (allowed_broadcast_types, runnable) = match kind {
            ContentKind::Video => allowed_video_types(settings.and_then(|s| s.types.as_deref())),
            _ => (None, true),
        };

        let selected_sort_key = settings
            .and_then(|s| s.sort.as_deref())
            .and_then(|key| catalog::sort_option(kind, key))
            .map(|d| d.key.to_string());
        let selected_period_key = settings
            .and_then(|s| s.period.as_deref())
            .and_then(|key| catalog::period_option(kind, key))
            .map(|d| d.key.to_string());

        let cfg = Self {
            kind,
            required_tag_ids,
            blocked_tag_ids,
            allowed_category_ids,
            blocked_category_ids,
            languages,
            hide_reruns: global.map(|g| g.hide_reruns).unwrap_or(false),
            blocked_category_names,
            allowed_broadcast_types,
            no_recordings: settings.and_then(|s| s.no_recordings).unwrap_or(false),
            selected_sort_key,
            selected_period_key,
            runnable,
        };
        debug!(
            kind = %kind,
            required = cfg.required_tag_ids.as_ref().map_or(0, |s| s.len()),
            blocked = cfg.blocked_tag_ids.as_ref().map_or(0, |s| s.len()),
            sort = ?cfg.selected_sort_key,
            runnable = cfg.runnable,
            "column config normalized"
        );
        cfg
    }

    /// Whether the tag stage has anything to check.
    pub fn uses_tag_filters(&self) -> bool {
        self.required_tag_ids.is_some() || self.blocked_tag_ids.is_some()
    }

    pub fn sort(&self) -> Option<&'static SortDescriptor> {
        self.selected_sort_key.as_deref().and_then(|k| catalog::sort_option(self.kind, k))
    }

    pub fn period(&self) -> Option<&'static PeriodDescriptor> {
        self.selected_period_key.as_deref().and_then(|k| catalog::period_option(self.kind, k))
    }
}

/// `hidden` lists the types the user turned off; the result is the
/// complement over the known types.
fn allowed_video_types(hidden: Option<&[String]>) -> (Option<IdSet>, bool) {
    let hidden = match hidden {
        Some(h) if !h.is_empty() => h,
        _ => return (None, true),
    };
    let allowed: IdSet = VIDEO_TYPES
        .iter()
        .filter(|t| !hidden.iter().any(|h| h == *t))
        .map(|t| t.to_string())
        .collect();
    if allowed.is_empty() { (None, false) } else { (Some(allowed), true) }
}

/// Whether replacing `old` with `new` must invalidate downstream data.
///
/// A change to a present record invalidates; so does clearing a record that
/// was present. Keeping an absent record absent does not.
pub fn should_invalidate<T: PartialEq>(new: Option<&T>, old: Option<&T>) -> bool {
    match new {
        Some(n) => old != Some(n),
        None => old.is_some(),
    }
}
