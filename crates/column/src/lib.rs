//! Feedeck column state: owns a column's settings, publishes the derived
//! config snapshot and keeps the per-column cache.

#![forbid(unsafe_code)]

use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use feedeck_core::config::{should_invalidate, ColumnConfig};
use feedeck_core::items::{FeedItem, LiveItem};
use feedeck_core::settings::{ColumnSettings, GlobalSettings};
use feedeck_core::tags::{Notify, TagResolver};
use feedeck_core::{ContentKind, FeedResult};
use feedeck_filter::FilterReport;
use rustc_hash::FxHashSet;
use serde_json::Value;
use tracing::{debug, info};

pub mod resolver;
pub mod subtitles;

pub use resolver::MemoryTagResolver;
pub use subtitles::Subtitle;

/// Opaque key/value cache owned by a column (avatar, cover art, cursors...).
pub type CacheBag = serde_json::Map<String, Value>;

/// Host side of a column: cache storage and redraw requests.
pub trait ColumnHost: Send + Sync + 'static {
    fn load_cache(&self) -> CacheBag {
        CacheBag::new()
    }

    fn save_cache(&self, cache: &CacheBag);

    /// Ask the host to re-render from current column state.
    fn refresh(&self);
}

/// Result of a settings change. `invalidated` tells the caller to drop and
/// refetch downstream data.
#[derive(Debug, Clone)]
pub struct ConfigUpdate {
    pub config: Arc<ColumnConfig>,
    pub invalidated: bool,
}

/// Stream status events delivered to a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamChange {
    /// Ignored: a stream that comes up appears with the next fetch.
    Up(String),
    /// Removes the stream from a live column.
    Down(String),
}

/// Read handle to the current config snapshot of a column.
#[derive(Clone)]
pub struct ColumnHandle {
    snap: Arc<ArcSwap<ColumnConfig>>,
}

impl ColumnHandle {
    pub fn current(&self) -> Arc<ColumnConfig> {
        self.snap.load_full()
    }
}

pub struct Column<H: ColumnHost> {
    kind: ContentKind,
    settings: Option<ColumnSettings>,
    global: Option<GlobalSettings>,
    snap: Arc<ArcSwap<ColumnConfig>>,
    cache: CacheBag,
    host: Arc<H>,
    resolver: Arc<dyn TagResolver>,
    // Tag ids with a refresh already registered on the resolver.
    awaiting: Arc<Mutex<FxHashSet<String>>>,
}

impl<H: ColumnHost> Column<H> {
    pub fn new(
        kind: ContentKind,
        settings: Option<ColumnSettings>,
        global: Option<GlobalSettings>,
        host: Arc<H>,
        resolver: Arc<dyn TagResolver>,
    ) -> Self {
        let config = ColumnConfig::normalize(kind, settings.as_ref(), global.as_ref());
        let cache = host.load_cache();
        Self {
            kind,
            settings,
            global,
            snap: Arc::new(ArcSwap::from_pointee(config)),
            cache,
            host,
            resolver,
            awaiting: Arc::default(),
        }
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn settings(&self) -> Option<&ColumnSettings> {
        self.settings.as_ref()
    }

    pub fn global_settings(&self) -> Option<&GlobalSettings> {
        self.global.as_ref()
    }

    pub fn config(&self) -> Arc<ColumnConfig> {
        self.snap.load_full()
    }

    pub fn handle(&self) -> ColumnHandle {
        ColumnHandle { snap: Arc::clone(&self.snap) }
    }

    fn republish(&self) -> Arc<ColumnConfig> {
        let next = Arc::new(ColumnConfig::normalize(self.kind, self.settings.as_ref(), self.global.as_ref()));
        self.snap.store(Arc::clone(&next));
        next
    }

    /// Replace the column's own settings and publish a fresh config.
    pub fn update_settings(&mut self, settings: Option<ColumnSettings>) -> ConfigUpdate {
        let old = std::mem::replace(&mut self.settings, settings);
        let invalidated = should_invalidate(self.settings.as_ref(), old.as_ref());
        let config = self.republish();
        debug!(kind = %self.kind, invalidated, "column settings updated");
        ConfigUpdate { config, invalidated }
    }

    /// Replace the shared settings and publish a fresh config.
    pub fn update_global_settings(&mut self, global: Option<GlobalSettings>) -> ConfigUpdate {
        let old = std::mem::replace(&mut self.global, global);
        let invalidated = should_invalidate(self.global.as_ref(), old.as_ref());
        let config = self.republish();
        debug!(kind = %self.kind, invalidated, "global settings updated");
        ConfigUpdate { config, invalidated }
    }

    /// False when the settings leave nothing to fetch.
    pub fn can_run(&self) -> bool {
        self.snap.load().runnable
    }

    pub fn filter_items<T: FeedItem>(&self, items: Vec<T>) -> Vec<T> {
        let config = self.snap.load_full();
        feedeck_filter::filter(items, &config, self.resolver.as_ref())
    }

    pub fn filter_items_with_report<T: FeedItem>(&self, items: Vec<T>) -> (Vec<T>, FilterReport) {
        let config = self.snap.load_full();
        feedeck_filter::filter_with_report(items, &config, self.resolver.as_ref())
    }

    /// Client sort with the column's selected option.
    pub fn sort_items<T: FeedItem>(&self, items: Vec<T>) -> FeedResult<Vec<T>> {
        let config = self.snap.load_full();
        feedeck_filter::perform_client_sort(items, config.sort())
    }

    pub fn memorize_tags<T: FeedItem>(&self, items: &[T]) {
        if !self.kind.uses_tags() {
            return;
        }
        for item in items {
            feedeck_filter::memorize_tags(item, self.resolver.as_ref());
        }
    }

    /// Apply a stream event to the live items on display. Returns whether the
    /// list changed.
    pub fn on_stream_change(&self, items: &mut Vec<LiveItem>, change: &StreamChange) -> bool {
        match change {
            StreamChange::Down(id) if self.kind == ContentKind::Live => {
                let removed = feedeck_filter::remove_stream(items, id);
                if removed {
                    info!(id = %id, "stream went down; removed from column");
                }
                removed
            }
            _ => false,
        }
    }

    pub fn subtitles(&self) -> Option<Vec<Subtitle>> {
        let config = self.snap.load_full();
        let notify = |id: &str| -> Option<Notify> {
            let fresh = self.awaiting.lock().unwrap_or_else(|e| e.into_inner()).insert(id.to_string());
            if !fresh {
                return None;
            }
            let (host, awaiting, id) = (Arc::clone(&self.host), Arc::clone(&self.awaiting), id.to_string());
            Some(Box::new(move || {
                awaiting.lock().unwrap_or_else(|e| e.into_inner()).remove(&id);
                host.refresh();
            }))
        };
        subtitles::compose(self.settings.as_ref(), &config, self.resolver.as_ref(), &notify)
    }

    // ---- cache ----

    pub fn cache(&self) -> &CacheBag {
        &self.cache
    }

    /// Shallow-merge the keys of a JSON object into the cache. Saves and
    /// refreshes only when some value actually changed. Non-object payloads
    /// are ignored.
    pub fn update_cache(&mut self, data: &Value) -> bool {
        let Some(obj) = data.as_object() else {
            return false;
        };
        let mut updated = false;
        for (key, value) in obj {
            if self.cache.get(key) != Some(value) {
                self.cache.insert(key.clone(), value.clone());
                updated = true;
            }
        }
        if updated {
            self.save_cache();
        }
        updated
    }

    /// Replace the whole cache and save it.
    pub fn set_cache(&mut self, cache: Option<CacheBag>) {
        self.cache = cache.unwrap_or_default();
        self.save_cache();
    }

    pub fn save_cache(&self) {
        self.host.save_cache(&self.cache);
        self.host.refresh();
    }

    pub fn logo(&self) -> Option<&str> {
        self.cache.get("avatar").and_then(Value::as_str)
    }

    pub fn cover_image(&self) -> Option<&str> {
        self.cache.get("cover").and_then(Value::as_str)
    }

    pub fn has_art(&self) -> bool {
        self.cover_image().is_some_and(|c| !c.is_empty())
    }
}
