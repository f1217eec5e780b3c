//! Typeface resolution: family × style face cache with lazy providers and
//! weakly-held ready observers.
//!
//! Resolution is synchronous when a face is cached or a provider can supply
//! it immediately; otherwise callers get `None` plus an async callback once
//! someone registers the face. Observers are held weakly so a torn-down
//! requester is never retained.

use std::sync::{Arc, Mutex, Weak};

use rustc_hash::FxHashMap;
use rusttype::{Font, Scale};
use weft_ui_graphics::{FontStyle, FontWeight, TypefaceStyle};

use crate::shaper::FontMetrics;

/// A resolved font face.
pub struct Typeface {
    font: Font<'static>,
}

impl std::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Typeface").finish_non_exhaustive()
    }
}

impl Typeface {
    /// Parses font data; `None` when the bytes are not a usable font.
    pub fn from_bytes(bytes: Vec<u8>) -> Option<Self> {
        Font::try_from_vec(bytes).map(|font| Self { font })
    }

    /// Vertical metrics at `size`, in this crate's negative-ascent
    /// convention.
    pub fn metrics(&self, size: f32) -> FontMetrics {
        let scale = Scale::uniform(size);
        let vm = self.font.v_metrics(scale);
        let x_height = self
            .font
            .glyph('x')
            .scaled(scale)
            .exact_bounding_box()
            .map(|bb| -bb.min.y)
            .unwrap_or(size * 0.5);
        FontMetrics {
            ascent: -vm.ascent,
            descent: -vm.descent,
            x_height,
            line_gap: vm.line_gap,
        }
    }

    pub fn advance(&self, c: char, size: f32) -> f32 {
        self.font
            .glyph(c)
            .scaled(Scale::uniform(size))
            .h_metrics()
            .advance_width
    }
}

/// Callback target for asynchronous face arrival.
pub trait TypefaceObserver: Send + Sync {
    fn typeface_ready(&self, family: &str, style: TypefaceStyle);
}

/// Supplies a face synchronously on demand, e.g. from a bundled asset set.
pub type TypefaceProvider = Box<dyn Fn(&str, TypefaceStyle) -> Option<Typeface> + Send + Sync>;

type FaceSlots = [Option<Arc<Typeface>>; TypefaceStyle::COUNT];

struct RegistryInner {
    faces: FxHashMap<String, FaceSlots>,
    providers: Vec<TypefaceProvider>,
    observers: Vec<(String, TypefaceStyle, Weak<dyn TypefaceObserver>)>,
}

/// Process-wide face cache, passed by handle into the engine.
pub struct TypefaceRegistry {
    inner: Mutex<RegistryInner>,
}

impl Default for TypefaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypefaceRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                faces: FxHashMap::default(),
                providers: Vec::new(),
                observers: Vec::new(),
            }),
        }
    }

    pub fn add_provider(&self, provider: TypefaceProvider) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.providers.push(provider);
        }
    }

    /// Registers a face and notifies observers waiting on (family, style).
    pub fn register(&self, family: &str, style: TypefaceStyle, face: Typeface) {
        let ready: Vec<Arc<dyn TypefaceObserver>> = {
            let mut inner = match self.inner.lock() {
                Ok(inner) => inner,
                Err(_) => return,
            };
            inner.faces.entry(family.to_owned()).or_default()[style.index()] =
                Some(Arc::new(face));
            let mut ready = Vec::new();
            inner.observers.retain(|(f, s, observer)| {
                if f == family && *s == style {
                    if let Some(strong) = observer.upgrade() {
                        ready.push(strong);
                    }
                    false
                } else {
                    observer.strong_count() > 0
                }
            });
            ready
        };
        // Deliver outside the lock; a callback may resolve other faces.
        for observer in ready {
            observer.typeface_ready(family, style);
        }
    }

    /// Parses and registers font data; `false` when unusable.
    pub fn register_bytes(&self, family: &str, style: TypefaceStyle, bytes: Vec<u8>) -> bool {
        match Typeface::from_bytes(bytes) {
            Some(face) => {
                self.register(family, style, face);
                true
            }
            None => {
                log::warn!("unusable font data for family '{family}'");
                false
            }
        }
    }

    /// Synchronous lookup. `families` may be a comma-separated fallback
    /// list; each name is tried in order against the cache, then the
    /// providers (a provider hit is cached for next time).
    pub fn resolve(
        &self,
        families: &str,
        weight: FontWeight,
        font_style: FontStyle,
    ) -> Option<Arc<Typeface>> {
        let style = TypefaceStyle::resolve(weight, font_style);
        let mut inner = self.inner.lock().ok()?;
        for family in families.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            if let Some(face) = inner
                .faces
                .get(family)
                .and_then(|slots| slots[style.index()].clone())
            {
                return Some(face);
            }
            for i in 0..inner.providers.len() {
                if let Some(face) = (inner.providers[i])(family, style) {
                    let face = Arc::new(face);
                    inner.faces.entry(family.to_owned()).or_default()[style.index()] =
                        Some(face.clone());
                    return Some(face);
                }
            }
        }
        None
    }

    /// Lookup that subscribes `observer` for the async callback on a miss.
    pub fn resolve_or_subscribe(
        &self,
        family: &str,
        weight: FontWeight,
        font_style: FontStyle,
        observer: &Arc<dyn TypefaceObserver>,
    ) -> Option<Arc<Typeface>> {
        if let Some(face) = self.resolve(family, weight, font_style) {
            return Some(face);
        }
        if let Ok(mut inner) = self.inner.lock() {
            inner.observers.push((
                family.to_owned(),
                TypefaceStyle::resolve(weight, font_style),
                Arc::downgrade(observer),
            ));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingObserver(AtomicUsize);

    impl TypefaceObserver for CountingObserver {
        fn typeface_ready(&self, _family: &str, _style: TypefaceStyle) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        let registry = TypefaceRegistry::new();
        assert!(!registry.register_bytes("serif", TypefaceStyle::Normal, vec![0, 1, 2, 3]));
    }

    #[test]
    fn unresolved_family_returns_none_and_subscribes() {
        let registry = TypefaceRegistry::new();
        let observer: Arc<dyn TypefaceObserver> =
            Arc::new(CountingObserver(AtomicUsize::new(0)));
        let face = registry.resolve_or_subscribe(
            "missing",
            FontWeight::NORMAL,
            FontStyle::Normal,
            &observer,
        );
        assert!(face.is_none());
    }

    #[test]
    fn dropped_observer_is_never_notified() {
        let registry = TypefaceRegistry::new();
        {
            let observer: Arc<dyn TypefaceObserver> =
                Arc::new(CountingObserver(AtomicUsize::new(0)));
            registry.resolve_or_subscribe(
                "later",
                FontWeight::NORMAL,
                FontStyle::Normal,
                &observer,
            );
        }
        // The weak observer is gone; registering must not panic or retain it.
        assert!(!registry.register_bytes("later", TypefaceStyle::Normal, vec![]));
        let inner = registry.inner.lock().unwrap();
        assert!(inner.observers.is_empty() || inner.observers.iter().all(|(_, _, w)| w.strong_count() == 0));
    }

    #[test]
    fn comma_list_tries_each_family_in_order() {
        let registry = TypefaceRegistry::new();
        let asked: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let log = asked.clone();
        registry.add_provider(Box::new(move |family, _style| {
            log.lock().unwrap().push(family.to_owned());
            None
        }));
        let face = registry.resolve("Inter, , serif", FontWeight::NORMAL, FontStyle::Normal);
        assert!(face.is_none());
        assert_eq!(*asked.lock().unwrap(), vec!["Inter".to_owned(), "serif".to_owned()]);
    }

    #[test]
    fn bold_weight_resolves_bold_slot() {
        assert_eq!(
            TypefaceStyle::resolve(FontWeight::BOLD, FontStyle::Normal),
            TypefaceStyle::Bold
        );
        assert_eq!(
            TypefaceStyle::resolve(FontWeight::BOLD, FontStyle::Italic),
            TypefaceStyle::BoldItalic
        );
    }
}
