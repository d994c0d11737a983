/*!
 * In-memory cache of translated text.
 *
 * Re-translating an unchanged title or body is common (editors press the
 * translate button again after fixing a typo elsewhere), so results are
 * kept per `(text, source, target)` for the life of the process.
 */

use log::debug;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::language_utils::Language;

/// SHA-256 of the text plus the language pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    text_hash: [u8; 32],
    source: Language,
    target: Language,
}

impl CacheKey {
    fn new(text: &str, source: Language, target: Language) -> Self {
        Self {
            text_hash: Sha256::digest(text.as_bytes()).into(),
            source,
            target,
        }
    }
}

/// Translation cache. Clones share storage and counters.
#[derive(Debug, Clone)]
pub struct TranslationCache {
    entries: Arc<RwLock<HashMap<CacheKey, String>>>,
    hits: Arc<AtomicUsize>,
    misses: Arc<AtomicUsize>,
    enabled: bool,
}

impl TranslationCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            hits: Arc::new(AtomicUsize::new(0)),
            misses: Arc::new(AtomicUsize::new(0)),
            enabled,
        }
    }

    /// Cached translation of `text`, if any
    pub fn get(&self, text: &str, source: Language, target: Language) -> Option<String> {
        if !self.enabled {
            return None;
        }

        let key = CacheKey::new(text, source, target);
        match self.entries.read().get(&key) {
            Some(translation) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Cache hit for '{}' ({} -> {})", truncate_text(text, 30), source, target);
                Some(translation.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("Cache miss for '{}' ({} -> {})", truncate_text(text, 30), source, target);
                None
            }
        }
    }

    pub fn store(&self, text: &str, source: Language, target: Language, translation: &str) {
        if !self.enabled {
            return;
        }

        let key = CacheKey::new(text, source, target);
        self.entries.write().insert(key, translation.to_string());
    }

    /// `(hits, misses, hit_rate)`
    pub fn stats(&self) -> (usize, usize, f64) {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };
        (hits, misses, hit_rate)
    }

    pub fn clear(&self) {
        self.entries.write().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        debug!("Translation cache cleared");
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new(true)
    }
}

fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    }
}
