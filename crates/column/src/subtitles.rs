//! Summary labels shown under a column title.

use feedeck_core::catalog::{PeriodDescriptor, SortDescriptor};
use feedeck_core::config::ColumnConfig;
use feedeck_core::settings::ColumnSettings;
use feedeck_core::tags::{Notify, TagResolver};
use feedeck_core::ContentKind;
use serde::Serialize;

const SORT_ICON: &str = "ffz-i-sort-down";
const TAGS_ICON: &str = "ffz-i-tags";
const CATEGORY_ICON: &str = "ffz-i-tag";
const PERIOD_ICON: &str = "ffz-i-calendar";

/// One display line. `text` is already rendered in English; `i18n` keys let
/// a host localize it instead.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Subtitle {
    pub icon: &'static str,
    pub i18n: Option<&'static str>,
    pub text: String,
    pub tip_i18n: Option<&'static str>,
    pub tip: Option<String>,
    pub count: Option<usize>,
    pub joined: Option<String>,
}

impl Subtitle {
    fn plain(icon: &'static str, i18n: Option<&'static str>, text: impl Into<String>) -> Self {
        Self { icon, i18n, text: text.into(), tip_i18n: None, tip: None, count: None, joined: None }
    }

    fn counted(icon: &'static str, i18n: &'static str, noun: (&str, &str), required: usize, blocked: usize) -> Self {
        let count = required + blocked;
        let joined = if blocked > 0 { format!("{}-{}", required, blocked) } else { required.to_string() };
        let noun = if count == 1 { noun.0 } else { noun.1 };
        Self {
            icon,
            i18n: Some(i18n),
            text: format!("{} {}", joined, noun),
            tip_i18n: None,
            tip: None,
            count: Some(count),
            joined: Some(joined),
        }
    }
}

pub fn sort_subtitle(sort: Option<&SortDescriptor>) -> Option<Subtitle> {
    let sort = sort?;
    let icon = if sort.icon.is_empty() { SORT_ICON } else { sort.icon };
    Some(match sort.subtitle {
        Some(sub) => Subtitle {
            tip_i18n: Some(sort.i18n),
            tip: Some(sort.title.to_string()),
            ..Subtitle::plain(icon, sort.sub_i18n, sub)
        },
        None => Subtitle::plain(icon, Some(sort.i18n), sort.title),
    })
}

/// Tag summary from the column's own tag lists. Labels for the tooltip are
/// taken from whatever the resolver knows right now. `notify(id)` supplies the
/// callback to register for a miss, or `None` when one is already waiting.
pub fn tag_subtitle(
    settings: Option<&ColumnSettings>,
    resolver: &dyn TagResolver,
    notify: &dyn Fn(&str) -> Option<Notify>,
) -> Option<Subtitle> {
    let settings = settings?;
    let (required, blocked) = settings.tag_count();
    if required == 0 && blocked == 0 {
        return None;
    }

    let mut tip: Vec<String> = Vec::new();
    for id in settings.tags.iter().flatten() {
        if let Some(tag) = resolver.resolve_now(id, notify(id)) {
            tip.push(tag.label.clone());
        }
    }
    for id in settings.blocked_tags.iter().flatten() {
        if let Some(tag) = resolver.resolve_now(id, notify(id)) {
            tip.push(format!("-{}", tag.label));
        }
    }

    if let [only] = tip.as_slice() {
        return Some(Subtitle { tip: Some(only.clone()), ..Subtitle::plain(TAGS_ICON, None, only.clone()) });
    }

    let mut sub = Subtitle::counted(TAGS_ICON, "addon.deck.sub.tags", ("tag", "tags"), required, blocked);
    if !tip.is_empty() {
        sub.tip = Some(tip.join(", "));
    }
    Some(sub)
}

pub fn category_subtitle(settings: Option<&ColumnSettings>) -> Option<Subtitle> {
    let (allowed, blocked) = settings?.category_count();
    if allowed == 0 && blocked == 0 {
        return None;
    }
    Some(Subtitle::counted(
        CATEGORY_ICON,
        "addon.deck.sub.categories",
        ("category", "categories"),
        allowed,
        blocked,
    ))
}

pub fn period_subtitle(period: Option<&PeriodDescriptor>) -> Option<Subtitle> {
    let period = period?;
    let icon = if period.icon.is_empty() { PERIOD_ICON } else { period.icon };
    Some(match period.subtitle {
        Some(sub) => Subtitle {
            tip_i18n: Some(period.i18n),
            tip: Some(period.title.to_string()),
            ..Subtitle::plain(icon, period.sub_i18n, sub)
        },
        None => Subtitle::plain(icon, Some(period.i18n), period.title),
    })
}

/// All subtitles for a column in display order, or `None` when nothing
/// applies.
pub fn compose(
    settings: Option<&ColumnSettings>,
    config: &ColumnConfig,
    resolver: &dyn TagResolver,
    notify: &dyn Fn(&str) -> Option<Notify>,
) -> Option<Vec<Subtitle>> {
    let mut out: Vec<Subtitle> = Vec::new();
    out.extend(sort_subtitle(config.sort()));
    out.extend(tag_subtitle(settings, resolver, notify));
    out.extend(category_subtitle(settings));
    if config.kind == ContentKind::Clip {
        out.extend(period_subtitle(config.period()));
    }
    if out.is_empty() { None } else { Some(out) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedeck_core::catalog::{sort_option, CLIP_TRENDING, LIVE_VIEWER_COUNT};
    use feedeck_core::tags::NoTags;

    fn no_notify(_id: &str) -> Option<Notify> {
        None
    }

    #[test]
    fn sort_prefers_subtitle_and_keeps_title_as_tip() {
        let s = sort_subtitle(sort_option(ContentKind::Live, LIVE_VIEWER_COUNT)).unwrap();
        assert_eq!(s.text, "Viewers");
        assert_eq!(s.tip.as_deref(), Some("Viewers (High to Low)"));
        assert_eq!(s.icon, "ffz-i-sort-alt-down");

        let s = sort_subtitle(sort_option(ContentKind::Clip, CLIP_TRENDING)).unwrap();
        assert_eq!(s.text, "Trending");
        assert_eq!(s.tip, None);
        assert_eq!(s.i18n, Some("addon.deck.sort.trending"));
    }

    #[test]
    fn category_counts_join_blocked() {
        let settings = ColumnSettings {
            filter_games: Some(vec!["1".into(), "2".into()]),
            filter_blocked_games: Some(vec!["3".into()]),
            ..Default::default()
        };
        let s = category_subtitle(Some(&settings)).unwrap();
        assert_eq!(s.count, Some(3));
        assert_eq!(s.joined.as_deref(), Some("2-1"));
        assert_eq!(s.text, "2-1 categories");

        let one = ColumnSettings { filter_games: Some(vec!["1".into()]), ..Default::default() };
        assert_eq!(category_subtitle(Some(&one)).unwrap().text, "1 category");
        assert!(category_subtitle(Some(&ColumnSettings::default())).is_none());
        assert!(category_subtitle(None).is_none());
    }

    #[test]
    fn unresolved_tags_leave_no_tooltip() {
        let settings = ColumnSettings { tags: Some(vec!["a".into(), "b".into()]), ..Default::default() };
        let s = tag_subtitle(Some(&settings), &NoTags, &no_notify).unwrap();
        assert_eq!(s.text, "2 tags");
        assert_eq!(s.tip, None);
    }

    #[test]
    fn empty_column_has_no_subtitles() {
        let cfg = ColumnConfig::normalize(ContentKind::Live, None, None);
        assert!(compose(None, &cfg, &NoTags, &no_notify).is_none());
    }
}
