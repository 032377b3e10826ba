use logdrift::{ClusterId, MinerConfig, MinerStats, PatternMiner, RawMessage};

fn messages(texts: &[&str]) -> Vec<RawMessage> {
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| RawMessage::new(format!("logs:{i}"), *t))
        .collect()
}

#[test]
fn stats_count_processed_and_skipped() {
    let mut miner = PatternMiner::default();
    let stats = miner.add_messages(&messages(&["User 1 logged in", "", "   ", "User 2 logged in", "boot"]));
    assert_eq!(
        stats,
        MinerStats { processed: 3, skipped_empty: 2, unclustered: 0, clusters: 2 }
    );
    assert_eq!(miner.stats(), stats);
}

#[test]
fn add_message_returns_assigned_cluster() {
    let mut miner = PatternMiner::default();
    assert_eq!(miner.add_message(&RawMessage::new("a:1", "User 1 logged in")), Some(ClusterId(1)));
    assert_eq!(miner.add_message(&RawMessage::new("a:2", "User 2 logged in")), Some(ClusterId(1)));
    assert_eq!(miner.add_message(&RawMessage::new("a:3", "")), None);
    assert_eq!(miner.engine().len(), 1);
}

#[test]
fn cluster_cap_counts_unclustered() {
    let config = MinerConfig { max_clusters: Some(1), ..Default::default() };
    let mut miner = PatternMiner::new(&config);
    let stats = miner.add_messages(&messages(&["User 1 logged in", "disk full", "User 2 logged in"]));
    assert_eq!(stats.processed, 2);
    assert_eq!(stats.unclustered, 1);
    assert_eq!(stats.clusters, 1);
    assert_eq!(miner.summary().total_count(), 2);
}

#[test]
fn mask_cache_does_not_change_results() {
    let input = messages(&[
        "User 1 logged in",
        "User 1 logged in",
        "GET /a?id=1 HTTP/1.1 200",
        "GET /a?id=2 HTTP/1.1 404",
        "User 1 logged in",
        "cache miss abc",
    ]);
    let mut cached = PatternMiner::new(&MinerConfig { mask_cache_size: 2, ..Default::default() });
    let mut uncached = PatternMiner::new(&MinerConfig { mask_cache_size: 0, ..Default::default() });
    cached.add_messages(&input);
    uncached.add_messages(&input);
    assert_eq!(cached.summary(), uncached.summary());
}

#[test]
fn batches_accumulate_into_one_summary() {
    let mut miner = PatternMiner::default();
    miner.add_messages(&messages(&["User 1 logged in"]));
    let stats = miner.add_messages(&messages(&["User 2 logged in", "User 3 failed login"]));
    assert_eq!(stats.processed, 3);

    let summary = miner.summary();
    assert_eq!(summary.patterns[0].pattern, "User <NUM> logged in");
    assert_eq!(summary.patterns[0].count, 2);
    assert_eq!(summary.patterns[0].sample_doc_references, ["logs:0", "logs:0"]);
}
