use crate::drain::{Cluster, ClusterId};
use crate::patterns::postprocess_template;
use serde::{Deserialize, Serialize};

/// Exported view of one cluster; the unit persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRecord {
    #[serde(default)]
    pub cluster_id: ClusterId,
    pub count: usize,
    pub pattern: String,
    #[serde(default)]
    pub first_seen: String,
    #[serde(default)]
    pub last_seen: String,
    #[serde(default)]
    pub sample_log_lines: Vec<String>,
    #[serde(default)]
    pub sample_doc_references: Vec<String>,
}

impl PatternRecord {
    pub fn from_cluster(cluster: &Cluster) -> Self {
        Self {
            cluster_id: cluster.id(),
            count: cluster.size(),
            pattern: postprocess_template(&cluster.template()),
            first_seen: cluster.first_seen().unwrap_or_default().to_string(),
            last_seen: cluster.last_seen().unwrap_or_default().to_string(),
            sample_log_lines: cluster.sample_lines().map(str::to_string).collect(),
            sample_doc_references: cluster.recent_references().map(str::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSummary {
    #[serde(default)]
    pub patterns: Vec<PatternRecord>,
}

impl PatternSummary {
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn total_count(&self) -> usize {
        self.patterns.iter().map(|p| p.count).sum()
    }
}

/// Builds the frequency-sorted summary. Clusters arrive in creation order and the
/// sort is stable, so equal counts keep that order from run to run.
pub fn build_summary(clusters: &[Cluster]) -> PatternSummary {
    let mut patterns: Vec<PatternRecord> = clusters.iter().map(PatternRecord::from_cluster).collect();
    patterns.sort_by(|a, b| b.count.cmp(&a.count));
    PatternSummary { patterns }
}
