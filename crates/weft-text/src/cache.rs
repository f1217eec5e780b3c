//! Bounded LRU memoization of layout results.
//!
//! Keys are structural fingerprints of (content, style, constraints); the
//! hash is precomputed at key construction so probing stays cheap. The one
//! lock covers `get`, `put` and `evict_all`, which may arrive from a
//! memory-pressure notifier concurrently with a layout pass.

use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;
use rustc_hash::FxHasher;
use weft_ui_layout::{LayoutConstraints, MeasureMode};

use crate::annotated::AnnotatedText;
use crate::result::LayoutResult;
use crate::style::{hash_f32, TextStyleAttributes};

/// Default entry bound.
pub const DEFAULT_CACHE_CAPACITY: usize = 500;

/// Structural cache key. Construction copies its components so later
/// mutation of the originating node cannot corrupt a cached entry.
#[derive(Debug, Clone)]
pub struct LayoutKey {
    text: AnnotatedText,
    style: TextStyleAttributes,
    constraints: LayoutConstraints,
    hash: u64,
}

impl LayoutKey {
    pub fn new(
        text: &AnnotatedText,
        style: &TextStyleAttributes,
        constraints: &LayoutConstraints,
    ) -> Self {
        let mut h = FxHasher::default();
        text.fingerprint(&mut h);
        style.fingerprint(&mut h);
        hash_constraints(&mut h, constraints);
        Self {
            text: text.clone(),
            style: style.clone(),
            constraints: *constraints,
            hash: h.finish(),
        }
    }
}

fn hash_constraints<H: Hasher>(h: &mut H, c: &LayoutConstraints) {
    hash_f32(h, c.width);
    hash_f32(h, c.height);
    c.width_mode.hash(h);
    c.height_mode.hash(h);
    c.enable_fast_path.hash(h);
    c.tail_color_convert.hash(h);
    c.use_refactored_baseline.hash(h);
}

impl PartialEq for LayoutKey {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && constraints_eq(&self.constraints, &other.constraints)
            && self.style == other.style
            && self.text == other.text
    }
}

impl Eq for LayoutKey {}

impl Hash for LayoutKey {
    fn hash<H: Hasher>(&self, h: &mut H) {
        h.write_u64(self.hash);
    }
}

fn constraints_eq(a: &LayoutConstraints, b: &LayoutConstraints) -> bool {
    a.width.to_bits() == b.width.to_bits()
        && a.height.to_bits() == b.height.to_bits()
        && a.width_mode == b.width_mode
        && a.height_mode == b.height_mode
        && a.enable_fast_path == b.enable_fast_path
        && a.tail_color_convert == b.tail_color_convert
        && a.use_refactored_baseline == b.use_refactored_baseline
}

/// The shared cache. `put` refuses results flagged non-cacheable (inline
/// placeholders, identity-bound annotations).
pub struct LayoutCache {
    inner: Mutex<LruCache<LayoutKey, Arc<LayoutResult>>>,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get(&self, key: &LayoutKey) -> Option<Arc<LayoutResult>> {
        self.inner.lock().ok()?.get(key).cloned()
    }

    /// Stores a result unless it is non-cacheable; returns whether it was
    /// stored.
    pub fn put(&self, key: LayoutKey, result: Arc<LayoutResult>) -> bool {
        if !result.cacheable {
            return false;
        }
        match self.inner.lock() {
            Ok(mut inner) => {
                inner.put(key, result);
                true
            }
            Err(_) => false,
        }
    }

    /// Drops every entry; safe to call from a memory-pressure signal.
    pub fn evict_all(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|inner| inner.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
