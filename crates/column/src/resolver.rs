//! In-memory tag resolver with one-shot completion callbacks.

use std::sync::{Arc, Mutex, MutexGuard};

use feedeck_core::tags::{Notify, TagDescriptor, TagResolver};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

#[derive(Default)]
struct Inner {
    resolved: FxHashMap<String, Arc<TagDescriptor>>,
    pending: FxHashMap<String, Vec<Notify>>,
    seen: FxHashSet<String>,
}

/// Process-lifetime tag cache. Descriptors are published by whoever fetches
/// them; lookups never block on that.
#[derive(Default)]
pub struct MemoryTagResolver {
    inner: Mutex<Inner>,
}

impl MemoryTagResolver {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make a descriptor available and fire the callbacks waiting on it.
    ///
    /// The first publication of an id wins. Publishing a known id again is a
    /// no-op and returns false.
    pub fn publish(&self, tag: TagDescriptor) -> bool {
        let waiting = {
            let mut inner = self.lock();
            if inner.resolved.contains_key(&tag.id) {
                return false;
            }
            let waiting = inner.pending.remove(&tag.id).unwrap_or_default();
            inner.resolved.insert(tag.id.clone(), Arc::new(tag));
            waiting
        };
        if !waiting.is_empty() {
            debug!(callbacks = waiting.len(), "tag resolved; notifying");
        }
        // Outside the lock: callbacks may call back into the resolver.
        for notify in waiting {
            notify();
        }
        true
    }

    pub fn publish_all<I: IntoIterator<Item = TagDescriptor>>(&self, tags: I) -> usize {
        tags.into_iter().map(|t| self.publish(t)).filter(|fresh| *fresh).count()
    }

    /// Publish descriptors from a JSON array of `TagDescriptor` records.
    pub fn load_json(&self, value: serde_json::Value) -> Result<usize, serde_json::Error> {
        let tags: Vec<TagDescriptor> = serde_json::from_value(value)?;
        Ok(self.publish_all(tags))
    }

    /// Ids seen or requested but not resolved yet, sorted.
    pub fn wanted(&self) -> Vec<String> {
        let inner = self.lock();
        let mut out: Vec<String> = inner
            .seen
            .iter()
            .chain(inner.pending.keys())
            .filter(|id| !inner.resolved.contains_key(*id))
            .cloned()
            .collect();
        out.sort();
        out.dedup();
        out
    }

    pub fn len(&self) -> usize {
        self.lock().resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TagResolver for MemoryTagResolver {
    fn resolve_now(&self, id: &str, on_resolved: Option<Notify>) -> Option<Arc<TagDescriptor>> {
        let mut inner = self.lock();
        if let Some(tag) = inner.resolved.get(id) {
            return Some(Arc::clone(tag));
        }
        if let Some(notify) = on_resolved {
            trace!(id, "tag unresolved; callback registered");
            inner.pending.entry(id.to_string()).or_default().push(notify);
        }
        None
    }

    fn memorize(&self, id: &str) {
        let mut inner = self.lock();
        if !inner.resolved.contains_key(id) {
            inner.seen.insert(id.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn lang_tag(id: &str, code: &str) -> TagDescriptor {
        TagDescriptor { id: id.into(), label: code.to_uppercase(), is_language: true, language_code: Some(code.into()) }
    }

    fn counter_notify(c: &Arc<AtomicUsize>) -> Notify {
        let c = Arc::clone(c);
        Box::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn callback_fires_once_on_publish() {
        let r = MemoryTagResolver::new();
        let hits = Arc::new(AtomicUsize::new(0));
        assert!(r.resolve_now("en", Some(counter_notify(&hits))).is_none());
        assert_eq!(hits.load(Ordering::SeqCst), 0, "never fired from inside resolve_now");

        assert!(r.publish(lang_tag("en", "en")));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!r.publish(lang_tag("en", "en")));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn republish_keeps_first_descriptor() {
        let r = MemoryTagResolver::new();
        r.publish(lang_tag("x", "en"));
        r.publish(lang_tag("x", "fr"));
        let d = r.resolve_now("x", None).unwrap();
        assert_eq!(d.language_code.as_deref(), Some("en"));
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn resolved_lookups_register_nothing() {
        let r = MemoryTagResolver::new();
        r.publish(lang_tag("x", "en"));
        let hits = Arc::new(AtomicUsize::new(0));
        assert!(r.resolve_now("x", Some(counter_notify(&hits))).is_some());
        assert!(r.wanted().is_empty());
    }

    #[test]
    fn wanted_lists_seen_and_requested() {
        let r = MemoryTagResolver::new();
        r.memorize("b");
        r.memorize("a");
        r.resolve_now("c", Some(Box::new(|| {})));
        r.resolve_now("a", None);
        assert_eq!(r.wanted(), vec!["a", "b", "c"]);
        r.publish(lang_tag("b", "de"));
        assert_eq!(r.wanted(), vec!["a", "c"]);
    }

    #[test]
    fn callback_may_reenter_resolver() {
        let r = Arc::new(MemoryTagResolver::new());
        let seen = Arc::new(AtomicUsize::new(0));
        let (r2, seen2) = (Arc::clone(&r), Arc::clone(&seen));
        r.resolve_now(
            "z",
            Some(Box::new(move || {
                if r2.resolve_now("z", None).is_some() {
                    seen2.fetch_add(1, Ordering::SeqCst);
                }
            })),
        );
        r.publish(lang_tag("z", "ja"));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn loads_descriptors_from_json() {
        let r = MemoryTagResolver::new();
        assert!(r.is_empty());
        let n = r
            .load_json(serde_json::json!([
                {"id": "1", "label": "English", "is_language": true, "language_code": "en"},
                {"id": "2", "label": "Speedrun"}
            ]))
            .unwrap();
        assert_eq!(n, 2);
        assert!(!r.is_empty());
        assert!(!r.resolve_now("2", None).unwrap().is_language);
    }
}
