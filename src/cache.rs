// src/cache.rs

use once_cell::sync::Lazy;
use std::{
    collections::{hash_map::DefaultHasher, HashMap, VecDeque},
    hash::{Hash, Hasher},
    sync::{Arc, RwLock},
};
use tracing::trace;

use crate::parse::{parse_with, ParseOptions, Parsed};

pub const DEFAULT_CAPACITY: usize = 256;

static SHARED: Lazy<ParseCache> = Lazy::new(|| ParseCache::new(DEFAULT_CAPACITY));

struct Entry {
    raw: String,
    opts: ParseOptions,
    parsed: Arc<Parsed>,
}

#[derive(Default)]
struct Inner {
    map: HashMap<u64, Entry>,
    /// Insertion order, oldest first.
    order: VecDeque<u64>,
}

/// Memoises `parse_with` on the raw text and options, for callers that re-parse
/// the same message on every refresh.
pub struct ParseCache {
    inner: RwLock<Inner>,
    capacity: usize,
}

impl ParseCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            capacity: capacity.max(1),
        }
    }

    /// Process-wide cache with `DEFAULT_CAPACITY` entries.
    pub fn shared() -> &'static ParseCache {
        &SHARED
    }

    pub fn get_or_parse(&self, raw: &str, opts: &ParseOptions) -> Arc<Parsed> {
        let key = cache_key(raw, opts);

        {
            let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
            if let Some(entry) = inner.map.get(&key) {
                if entry.raw == raw && &entry.opts == opts {
                    trace!(key, "parse cache hit");
                    return Arc::clone(&entry.parsed);
                }
            }
        }

        trace!(key, bytes = raw.len(), "parse cache miss");
        let parsed = Arc::new(parse_with(raw, opts));

        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let previous = inner.map.insert(
            key,
            Entry {
                raw: raw.to_string(),
                opts: opts.clone(),
                parsed: Arc::clone(&parsed),
            },
        );
        if previous.is_none() {
            inner.order.push_back(key);
        }
        while inner.map.len() > self.capacity {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.map.remove(&oldest);
                    trace!(key = oldest, "parse cache evict");
                }
                None => break,
            }
        }

        parsed
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.map.clear();
        inner.order.clear();
    }
}

fn cache_key(raw: &str, opts: &ParseOptions) -> u64 {
    let mut hasher = DefaultHasher::new();
    raw.hash(&mut hasher);
    opts.hash(&mut hasher);
    hasher.finish()
}
