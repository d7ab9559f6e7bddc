//! Tag descriptors and the resolver contract.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Resolved metadata for a tag id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagDescriptor {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub is_language: bool,
    /// Lower-case language code when `is_language` is set.
    #[serde(default)]
    pub language_code: Option<String>,
}

impl TagDescriptor {
    /// True when this tag stands for the given (already lower-cased) language.
    pub fn matches_language(&self, lang: &str) -> bool {
        self.is_language && self.language_code.as_deref() == Some(lang)
    }
}

/// One-shot completion callback registered for an unresolved tag.
pub type Notify = Box<dyn FnOnce() + Send + 'static>;

/// Lookup of tag descriptors that never blocks.
///
/// `resolve_now` answers from what is already known. For an unknown id it
/// returns `None` and, if `on_resolved` is given, keeps it to be invoked
/// exactly once when the descriptor arrives. Implementations must not call
/// the callback from inside `resolve_now`.
pub trait TagResolver: Send + Sync {
    fn resolve_now(&self, id: &str, on_resolved: Option<Notify>) -> Option<Arc<TagDescriptor>>;

    /// Hint that `id` was seen on an item. Never fails.
    fn memorize(&self, id: &str);
}

/// Resolver that knows nothing. Every required tag stays unsatisfied unless
/// the item carries it.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTags;

impl TagResolver for NoTags {
    fn resolve_now(&self, _id: &str, _on_resolved: Option<Notify>) -> Option<Arc<TagDescriptor>> {
        None
    }

    fn memorize(&self, _id: &str) {}
}
