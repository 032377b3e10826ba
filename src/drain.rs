//! Incremental drain-style clustering of masked log messages.
//!
//! Clusters live in an arena (`Vec<Cluster>`); a cluster's id is its position
//! plus one, so ids are dense, monotonic and never reused within a run. Candidate
//! lookup is partitioned by token count: two messages with different token counts
//! can never share a cluster.

use crate::config::{MinerConfig, DEFAULT_SIMILARITY_THRESHOLD};
use ahash::AHashMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Marker rendered in place of a generalized template position.
pub const WILDCARD: &str = "<*>";

/// Upper bound of every per-cluster reference and sample list.
pub const MAX_SAMPLE_REFERENCES: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(pub usize);

impl std::fmt::Display for ClusterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateToken {
    Literal(String),
    Wildcard,
}

impl TemplateToken {
    fn matches(&self, token: &str) -> bool {
        match self {
            TemplateToken::Literal(s) => s == token,
            TemplateToken::Wildcard => true,
        }
    }

    fn as_str(&self) -> &str {
        match self {
            TemplateToken::Literal(s) => s,
            TemplateToken::Wildcard => WILDCARD,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Cluster {
    id: ClusterId,
    template: Vec<TemplateToken>,
    size: usize,
    recent_references: VecDeque<String>,
    sample_lines: VecDeque<String>,
}

impl Cluster {
    fn new(id: ClusterId, tokens: &[&str]) -> Self {
        Self {
            id,
            template: tokens.iter().map(|t| TemplateToken::Literal((*t).to_string())).collect(),
            size: 1,
            recent_references: VecDeque::with_capacity(MAX_SAMPLE_REFERENCES),
            sample_lines: VecDeque::new(),
        }
    }

    pub fn id(&self) -> ClusterId {
        self.id
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn template_tokens(&self) -> &[TemplateToken] {
        &self.template
    }

    /// Template rendered with single spaces and `<*>` for generalized positions.
    pub fn template(&self) -> String {
        self.template.iter().map(TemplateToken::as_str).join(" ")
    }

    /// Origin references of the most recent members, oldest first.
    pub fn recent_references(&self) -> impl Iterator<Item = &str> + '_ {
        self.recent_references.iter().map(String::as_str)
    }

    pub fn first_seen(&self) -> Option<&str> {
        self.recent_references.front().map(String::as_str)
    }

    pub fn last_seen(&self) -> Option<&str> {
        self.recent_references.back().map(String::as_str)
    }

    pub fn sample_lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.sample_lines.iter().map(String::as_str)
    }

    /// Fraction of positions where the template accepts the token.
    fn similarity(&self, tokens: &[&str]) -> f64 {
        let equal = self
            .template
            .iter()
            .zip(tokens)
            .filter(|(slot, token)| slot.matches(token))
            .count();
        equal as f64 / self.template.len() as f64
    }

    /// Joins a message: positions that disagree become wildcards for good.
    fn absorb(&mut self, tokens: &[&str]) {
        self.size += 1;
        for (slot, token) in self.template.iter_mut().zip(tokens) {
            if !slot.matches(token) {
                *slot = TemplateToken::Wildcard;
            }
        }
    }

    fn remember_reference(&mut self, reference: &str) {
        push_bounded(&mut self.recent_references, reference, MAX_SAMPLE_REFERENCES);
    }
}

fn push_bounded(ring: &mut VecDeque<String>, value: &str, capacity: usize) {
    if capacity == 0 {
        return;
    }
    ring.push_back(value.to_string());
    while ring.len() > capacity {
        ring.pop_front();
    }
}

pub struct DrainEngine {
    clusters: Vec<Cluster>,
    by_token_count: AHashMap<usize, Vec<usize>>,
    similarity_threshold: f64,
    max_clusters: Option<usize>,
    sample_lines: usize,
    cap_reported: bool,
}

impl Default for DrainEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DrainEngine {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_SIMILARITY_THRESHOLD)
    }

    pub fn with_threshold(similarity_threshold: f64) -> Self {
        Self {
            clusters: Vec::new(),
            by_token_count: AHashMap::new(),
            similarity_threshold,
            max_clusters: None,
            sample_lines: 0,
            cap_reported: false,
        }
    }

    pub fn with_config(config: &MinerConfig) -> Self {
        Self {
            max_clusters: config.max_clusters,
            sample_lines: config.sample_lines.min(MAX_SAMPLE_REFERENCES),
            ..Self::with_threshold(config.similarity_threshold)
        }
    }

    /// Assigns a masked message to a cluster. Returns `None` for blank input, or
    /// when the cluster cap is reached and nothing existing is similar enough.
    pub fn add(&mut self, masked: &str) -> Option<ClusterId> {
        self.insert(masked, None, None)
    }

    pub fn add_with_reference(&mut self, masked: &str, reference: &str) -> Option<ClusterId> {
        self.insert(masked, Some(reference), None)
    }

    /// Like [`add_with_reference`](Self::add_with_reference), additionally keeping
    /// `raw_line` as a sample when the engine was configured to keep samples.
    pub fn add_sampled(&mut self, masked: &str, reference: &str, raw_line: &str) -> Option<ClusterId> {
        self.insert(masked, Some(reference), Some(raw_line))
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn cluster(&self, id: ClusterId) -> Option<&Cluster> {
        self.clusters.get(id.0.checked_sub(1)?)
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    fn insert(&mut self, masked: &str, reference: Option<&str>, raw_line: Option<&str>) -> Option<ClusterId> {
        let tokens: Vec<&str> = masked.split_whitespace().collect();
        if tokens.is_empty() {
            return None;
        }

        let slot = match self.best_match(&tokens) {
            Some((slot, score)) if score >= self.similarity_threshold => {
                self.clusters[slot].absorb(&tokens);
                slot
            }
            _ if self.at_capacity() => {
                if !self.cap_reported {
                    warn!(max_clusters = self.clusters.len(), "cluster cap reached; unmatched messages are dropped");
                    self.cap_reported = true;
                }
                return None;
            }
            _ => self.create(&tokens),
        };

        let sample_lines = self.sample_lines;
        let cluster = &mut self.clusters[slot];
        if let Some(reference) = reference {
            cluster.remember_reference(reference);
        }
        if let Some(line) = raw_line {
            push_bounded(&mut cluster.sample_lines, line, sample_lines);
        }
        Some(cluster.id)
    }

    /// Highest-scoring cluster with the same token count. Ties go to the oldest.
    fn best_match(&self, tokens: &[&str]) -> Option<(usize, f64)> {
        let candidates = self.by_token_count.get(&tokens.len())?;
        let mut best: Option<(usize, f64)> = None;
        for &slot in candidates {
            let score = self.clusters[slot].similarity(tokens);
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((slot, score));
            }
        }
        best
    }

    fn at_capacity(&self) -> bool {
        self.max_clusters.is_some_and(|cap| self.clusters.len() >= cap)
    }

    fn create(&mut self, tokens: &[&str]) -> usize {
        let slot = self.clusters.len();
        let id = ClusterId(slot + 1);
        self.clusters.push(Cluster::new(id, tokens));
        self.by_token_count.entry(tokens.len()).or_default().push(slot);
        debug!(cluster_id = id.0, tokens = tokens.len(), "created cluster");
        slot
    }
}
