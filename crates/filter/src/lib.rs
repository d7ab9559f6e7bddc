//! Feedeck classifier: decides which feed items a column shows.
//!
//! One pipeline serves every content kind. Kind-specific steps come from the
//! `FeedItem` hooks; a stage that does not apply to a kind always passes.

#![forbid(unsafe_code)]

use feedeck_core::config::ColumnConfig;
use feedeck_core::items::{FeedItem, LiveItem};
use feedeck_core::tags::TagResolver;
use serde::Serialize;
use tracing::{debug, warn};

pub mod sort;

pub use sort::{compare, perform_client_sort, sort};

/// Pipeline stage that excluded an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Structure,
    Recording,
    Rerun,
    BroadcastType,
    BlockedCategoryName,
    CategoryNotAllowed,
    BlockedCategory,
    RequiredTag,
    BlockedTag,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Structure => "structure",
            Stage::Recording => "recording",
            Stage::Rerun => "rerun",
            Stage::BroadcastType => "broadcast_type",
            Stage::BlockedCategoryName => "blocked_category_name",
            Stage::CategoryNotAllowed => "category_not_allowed",
            Stage::BlockedCategory => "blocked_category",
            Stage::RequiredTag => "required_tag",
            Stage::BlockedTag => "blocked_tag",
        }
    }
}

/// Item counts remaining after each group of stages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterReport {
    pub total: usize,
    pub after_structure: usize,
    pub after_reruns: usize,
    pub after_broadcast_types: usize,
    pub after_categories: usize,
    pub after_tags: usize,
}

impl FilterReport {
    fn start(total: usize) -> Self {
        Self {
            total,
            after_structure: total,
            after_reruns: total,
            after_broadcast_types: total,
            after_categories: total,
            after_tags: total,
        }
    }

    fn reject(&mut self, stage: Stage) {
        // An item dropped at a stage is missing from that counter and every
        // later one.
        let depth = match stage {
            Stage::Structure | Stage::Recording => 0,
            Stage::Rerun => 1,
            Stage::BroadcastType => 2,
            Stage::BlockedCategoryName | Stage::CategoryNotAllowed | Stage::BlockedCategory => 3,
            Stage::RequiredTag | Stage::BlockedTag => 4,
        };
        let counters = [
            &mut self.after_structure,
            &mut self.after_reruns,
            &mut self.after_broadcast_types,
            &mut self.after_categories,
            &mut self.after_tags,
        ];
        for c in counters.into_iter().skip(depth) {
            *c = c.saturating_sub(1);
        }
    }

    pub fn kept(&self) -> usize {
        self.after_tags
    }
}

/// Decide a single item. Stages run in a fixed order and the first failure
/// wins; nothing after it is evaluated.
pub fn admit<T: FeedItem>(item: &T, cfg: &ColumnConfig, resolver: &dyn TagResolver) -> Result<(), Stage> {
    if !item.is_well_formed() {
        return Err(Stage::Structure);
    }
    if cfg.no_recordings && item.is_recording() {
        return Err(Stage::Recording);
    }
    if cfg.hide_reruns && item.is_rerun() {
        return Err(Stage::Rerun);
    }
    if let (Some(allowed), Some(ty)) = (cfg.allowed_broadcast_types.as_ref(), item.broadcast_type()) {
        if !allowed.contains(ty) {
            return Err(Stage::BroadcastType);
        }
    }

    // A present game with a null id never matches an id list, so it fails a
    // non-empty allow-list and passes the block-list.
    if let Some(game) = item.game() {
        let (id, name) = (game.id.as_deref(), game.name.as_deref());
        if let (Some(names), Some(name)) = (cfg.blocked_category_names.as_ref(), name) {
            if names.contains(name) {
                return Err(Stage::BlockedCategoryName);
            }
        }
        if let Some(allowed) = cfg.allowed_category_ids.as_ref() {
            if !id.is_some_and(|id| allowed.contains(id)) {
                return Err(Stage::CategoryNotAllowed);
            }
        }
        if let (Some(blocked), Some(id)) = (cfg.blocked_category_ids.as_ref(), id) {
            if blocked.contains(id) {
                return Err(Stage::BlockedCategory);
            }
        }
    }

    if T::KIND.uses_tags() && cfg.uses_tag_filters() {
        check_tags(item, cfg, resolver)?;
    }
    Ok(())
}

fn check_tags<T: FeedItem>(item: &T, cfg: &ColumnConfig, resolver: &dyn TagResolver) -> Result<(), Stage> {
    let tags = item.tag_ids();
    let lang = item.language().map(str::to_lowercase);

    if let Some(required) = cfg.required_tag_ids.as_ref() {
        for id in required {
            if tags.contains(&id.as_str()) {
                continue;
            }
            // A language tag is also satisfied by the item's language field.
            let by_language = match (resolver.resolve_now(id, None), lang.as_deref()) {
                (Some(tag), Some(lang)) => tag.matches_language(lang),
                _ => false,
            };
            if !by_language {
                return Err(Stage::RequiredTag);
            }
        }
    }
    if let Some(blocked) = cfg.blocked_tag_ids.as_ref() {
        if blocked.iter().any(|id| tags.contains(&id.as_str())) {
            return Err(Stage::BlockedTag);
        }
    }
    Ok(())
}

/// Keep the items the column shows, in their original order.
pub fn filter<T: FeedItem>(items: Vec<T>, cfg: &ColumnConfig, resolver: &dyn TagResolver) -> Vec<T> {
    filter_with_report(items, cfg, resolver).0
}

/// Like [`filter`], also reporting how many items survived each stage.
pub fn filter_with_report<T: FeedItem>(
    items: Vec<T>,
    cfg: &ColumnConfig,
    resolver: &dyn TagResolver,
) -> (Vec<T>, FilterReport) {
    let started = std::time::Instant::now();
    if cfg.kind != T::KIND {
        warn!(config = %cfg.kind, items = %T::KIND, "filtering items with a config built for another kind");
    }
    let mut report = FilterReport::start(items.len());
    let mut rejected = [0u64; 9];
    let kept: Vec<T> = items
        .into_iter()
        .filter(|item| match admit(item, cfg, resolver) {
            Ok(()) => true,
            Err(stage) => {
                report.reject(stage);
                rejected[stage as usize] += 1;
                false
            }
        })
        .collect();

    for (stage, n) in STAGES.iter().zip(rejected) {
        if n > 0 {
            metrics::counter!("filter_rejected_total", n, "stage" => stage.as_str());
        }
    }
    metrics::gauge!("filter_items", kept.len() as f64);
    metrics::histogram!("filter_eval_ms", started.elapsed().as_secs_f64() * 1_000.0);
    debug!(kind = %T::KIND, total = report.total, kept = kept.len(), "filter pass");
    (kept, report)
}

const STAGES: [Stage; 9] = [
    Stage::Structure,
    Stage::Recording,
    Stage::Rerun,
    Stage::BroadcastType,
    Stage::BlockedCategoryName,
    Stage::CategoryNotAllowed,
    Stage::BlockedCategory,
    Stage::RequiredTag,
    Stage::BlockedTag,
];

/// Hint every tag id an item carries to the resolver.
pub fn memorize_tags<T: FeedItem>(item: &T, resolver: &dyn TagResolver) {
    for id in item.tag_ids() {
        resolver.memorize(id);
    }
}

/// Apply a "stream went down" event to a live list. Returns whether an item
/// was removed.
pub fn remove_stream(items: &mut Vec<LiveItem>, id: &str) -> bool {
    let before = items.len();
    items.retain(|item| item.id != id);
    before != items.len()
}
