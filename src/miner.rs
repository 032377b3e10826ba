use crate::config::MinerConfig;
use crate::drain::{ClusterId, DrainEngine};
use crate::masking;
use crate::summary::{build_summary, PatternSummary};
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use tracing::{debug, info};

const PROGRESS_EVERY: usize = 1000;

/// One log message as delivered by the document source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMessage {
    pub origin_reference: String,
    pub text: String,
}

impl RawMessage {
    pub fn new(origin_reference: impl Into<String>, text: impl Into<String>) -> Self {
        Self { origin_reference: origin_reference.into(), text: text.into() }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MinerStats {
    /// Messages assigned to a cluster.
    pub processed: usize,
    pub skipped_empty: usize,
    /// Messages dropped because the cluster cap was reached.
    pub unclustered: usize,
    pub clusters: usize,
}

/// Masks and clusters a stream of messages, then exports the pattern summary.
///
/// Single-threaded: every assignment depends on the clusters built by the
/// messages before it. Use one miner per independent batch.
pub struct PatternMiner {
    engine: DrainEngine,
    // Raw text -> masked text. Masking is pure, so hits never change results.
    mask_cache: Option<LruCache<String, String>>,
    stats: MinerStats,
}

impl Default for PatternMiner {
    fn default() -> Self {
        Self::new(&MinerConfig::default())
    }
}

impl PatternMiner {
    pub fn new(config: &MinerConfig) -> Self {
        Self {
            engine: DrainEngine::with_config(config),
            mask_cache: NonZeroUsize::new(config.mask_cache_size).map(LruCache::new),
            stats: MinerStats::default(),
        }
    }

    pub fn add_message(&mut self, message: &RawMessage) -> Option<ClusterId> {
        if message.text.trim().is_empty() {
            self.stats.skipped_empty += 1;
            return None;
        }
        let masked = self.mask(&message.text);
        let assigned = self.engine.add_sampled(&masked, &message.origin_reference, &message.text);
        match assigned {
            Some(_) => {
                self.stats.processed += 1;
                if self.stats.processed % PROGRESS_EVERY == 0 {
                    info!(processed = self.stats.processed, clusters = self.engine.len(), "processed messages");
                }
            }
            None => self.stats.unclustered += 1,
        }
        assigned
    }

    pub fn add_messages<'a, I>(&mut self, messages: I) -> MinerStats
    where
        I: IntoIterator<Item = &'a RawMessage>,
    {
        for message in messages {
            self.add_message(message);
        }
        let stats = self.stats();
        debug!(?stats, "batch ingested");
        stats
    }

    pub fn stats(&self) -> MinerStats {
        MinerStats { clusters: self.engine.len(), ..self.stats }
    }

    pub fn engine(&self) -> &DrainEngine {
        &self.engine
    }

    pub fn summary(&self) -> PatternSummary {
        build_summary(self.engine.clusters())
    }

    fn mask(&mut self, text: &str) -> String {
        let Some(cache) = self.mask_cache.as_mut() else {
            return masking::mask_text(text);
        };
        if let Some(hit) = cache.get(text) {
            return hit.clone();
        }
        let masked = masking::mask_text(text);
        cache.put(text.to_string(), masked.clone());
        masked
    }
}
