//! Period-over-period comparison of two pattern summaries.
//!
//! Patterns are matched on their text only. Cluster ids are assigned per run and
//! carry no meaning across runs.

use crate::drain::MAX_SAMPLE_REFERENCES;
use crate::summary::PatternRecord;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, warn};

/// A pattern present in both periods with a different count. The flattened
/// record is the current period's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternChange {
    #[serde(flatten)]
    pub record: PatternRecord,
    pub current_count: usize,
    pub previous_count: usize,
    pub absolute_change: usize,
    pub percent_change: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub current_patterns_count: usize,
    pub previous_patterns_count: usize,
    #[serde(rename = "new_patterns")]
    pub new: Vec<PatternRecord>,
    #[serde(rename = "disappeared_patterns")]
    pub disappeared: Vec<PatternRecord>,
    #[serde(rename = "increased_patterns")]
    pub increased: Vec<PatternChange>,
    #[serde(rename = "decreased_patterns")]
    pub decreased: Vec<PatternChange>,
}

impl ComparisonResult {
    pub fn has_changes(&self) -> bool {
        !(self.new.is_empty() && self.disappeared.is_empty() && self.increased.is_empty() && self.decreased.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Increase,
    Decrease,
}

/// Classifies every distinct pattern text as new, disappeared, increased or
/// decreased. Records repeating a pattern text within one input are merged
/// first (counts summed); the reported input counts stay the raw lengths.
pub fn compare(current: &[PatternRecord], previous: &[PatternRecord]) -> ComparisonResult {
    let current_merged = merge_duplicates(current, "current");
    let previous_merged = merge_duplicates(previous, "previous");

    let current_by_text = index_by_text(&current_merged);
    let previous_by_text = index_by_text(&previous_merged);

    let mut new: Vec<PatternRecord> = current_merged
        .iter()
        .filter(|p| !previous_by_text.contains_key(p.pattern.as_str()))
        .cloned()
        .collect();
    new.sort_by(|a, b| b.count.cmp(&a.count));

    let mut disappeared: Vec<PatternRecord> = previous_merged
        .iter()
        .filter(|p| !current_by_text.contains_key(p.pattern.as_str()))
        .cloned()
        .collect();
    disappeared.sort_by(|a, b| b.count.cmp(&a.count));

    let increased = changes(&current_merged, &previous_by_text, Direction::Increase);
    let decreased = changes(&current_merged, &previous_by_text, Direction::Decrease);

    debug!(
        current = current.len(),
        previous = previous.len(),
        new = new.len(),
        disappeared = disappeared.len(),
        increased = increased.len(),
        decreased = decreased.len(),
        "compared pattern summaries"
    );

    ComparisonResult {
        current_patterns_count: current.len(),
        previous_patterns_count: previous.len(),
        new,
        disappeared,
        increased,
        decreased,
    }
}

/// `change / previous * 100` rounded to one decimal, ties to even; a zero
/// baseline reports 100%.
pub fn percent_change(absolute_change: usize, previous_count: usize) -> f64 {
    if previous_count == 0 {
        return 100.0;
    }
    let pct = absolute_change as f64 / previous_count as f64 * 100.0;
    (pct * 10.0).round_ties_even() / 10.0
}

fn changes(
    current: &[PatternRecord],
    previous_by_text: &AHashMap<&str, &PatternRecord>,
    direction: Direction,
) -> Vec<PatternChange> {
    let mut out: Vec<PatternChange> = current
        .iter()
        .filter_map(|cur| {
            let prev = previous_by_text.get(cur.pattern.as_str())?;
            let absolute_change = match direction {
                Direction::Increase if cur.count > prev.count => cur.count - prev.count,
                Direction::Decrease if cur.count < prev.count => prev.count - cur.count,
                _ => return None,
            };
            Some(PatternChange {
                record: cur.clone(),
                current_count: cur.count,
                previous_count: prev.count,
                absolute_change,
                percent_change: percent_change(absolute_change, prev.count),
            })
        })
        .collect();
    out.sort_by(rank_changes);
    out
}

/// Descending by percent change, then absolute change, then current count.
fn rank_changes(a: &PatternChange, b: &PatternChange) -> Ordering {
    b.percent_change
        .total_cmp(&a.percent_change)
        .then_with(|| b.absolute_change.cmp(&a.absolute_change))
        .then_with(|| b.record.count.cmp(&a.record.count))
}

fn index_by_text(records: &[PatternRecord]) -> AHashMap<&str, &PatternRecord> {
    records.iter().map(|r| (r.pattern.as_str(), r)).collect()
}

fn merge_duplicates(records: &[PatternRecord], side: &'static str) -> Vec<PatternRecord> {
    let mut merged: Vec<PatternRecord> = Vec::with_capacity(records.len());
    let mut slots: AHashMap<&str, usize> = AHashMap::with_capacity(records.len());
    for record in records {
        match slots.get(record.pattern.as_str()) {
            Some(&slot) => {
                warn!(side, pattern = %record.pattern, "duplicate pattern text merged");
                absorb_duplicate(&mut merged[slot], record);
            }
            None => {
                slots.insert(record.pattern.as_str(), merged.len());
                merged.push(record.clone());
            }
        }
    }
    merged
}

fn absorb_duplicate(target: &mut PatternRecord, duplicate: &PatternRecord) {
    target.count += duplicate.count;
    if target.first_seen.is_empty() {
        target.first_seen.clone_from(&duplicate.first_seen);
    }
    if !duplicate.last_seen.is_empty() {
        target.last_seen.clone_from(&duplicate.last_seen);
    }
    extend_bounded(&mut target.sample_doc_references, &duplicate.sample_doc_references);
    extend_bounded(&mut target.sample_log_lines, &duplicate.sample_log_lines);
}

fn extend_bounded(list: &mut Vec<String>, more: &[String]) {
    list.extend(more.iter().cloned());
    if list.len() > MAX_SAMPLE_REFERENCES {
        let excess = list.len() - MAX_SAMPLE_REFERENCES;
        list.drain(..excess);
    }
}
