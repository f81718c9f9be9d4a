use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A keyed cache entry with an opaque payload, tags and an optional expiry.
///
/// Items returned by a lookup carry a hit flag; an item built with [`CacheItem::new`]
/// or [`CacheItem::miss`] starts as a miss until it is saved and read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheItem {
    key: String,
    value: Option<serde_json::Value>,
    tags: BTreeSet<String>,
    expires_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    hit: bool,
}

impl CacheItem {
    /// Creates an empty item for the given key
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
            tags: BTreeSet::new(),
            expires_at: None,
            hit: false,
        }
    }

    /// A lookup result for a key that is not in the cache
    pub fn miss(key: impl Into<String>) -> Self {
        Self::new(key)
    }

    /// Sets the payload
    pub fn with_value(mut self, value: serde_json::Value) -> Self {
        self.value = Some(value);
        self
    }

    /// Adds tags to the item
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Replaces the payload
    pub fn set(&mut self, value: serde_json::Value) {
        self.value = Some(value);
    }

    /// Expires the item at an absolute point in time
    pub fn expires_at(&mut self, at: Option<DateTime<Utc>>) {
        self.expires_at = at;
    }

    /// Expires the item after `ttl`. A zero duration expires it immediately;
    /// a duration too large to represent leaves the item without expiry.
    pub fn expires_after(&mut self, ttl: Duration) {
        self.expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_add_signed(ttl));
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> Option<&serde_json::Value> {
        self.value.as_ref()
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Whether this item came out of the cache with a live value
    pub fn is_hit(&self) -> bool {
        self.hit
    }

    /// Whether the item is past its expiry at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    pub(crate) fn into_hit(mut self) -> Self {
        self.hit = true;
        self
    }
}
