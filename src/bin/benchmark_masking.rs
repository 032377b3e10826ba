use anyhow::{bail, Context};
use logdrift::masking::mask_text;
use logdrift::{MinerConfig, PatternMiner, RawMessage};
use std::fs;
use std::time::Instant;

const DEFAULT_LINE_LIMIT: usize = 10_000;

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let (Some(path), limit) = (args.next(), args.next()) else {
        bail!("usage: benchmark_masking <log_file> [max_lines]");
    };
    let limit = match limit {
        Some(raw) => raw.parse::<usize>().with_context(|| format!("invalid max_lines {raw:?}"))?,
        None => DEFAULT_LINE_LIMIT,
    };

    let content = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let lines: Vec<&str> = content.lines().take(limit).collect();
    if lines.is_empty() {
        bail!("{path} has no lines to benchmark");
    }
    println!("Benchmarking masking and clustering on {} lines of {path}", lines.len());

    // First use compiles the rule regexes; keep that out of the timing.
    mask_text(lines[0]);

    let start = Instant::now();
    let changed = lines.iter().filter(|line| mask_text(line) != **line).count();
    let mask_time = start.elapsed();

    // Cache disabled so the clustering figure is not flattered by repeated lines
    let config = MinerConfig { mask_cache_size: 0, ..Default::default() };
    let mut miner = PatternMiner::new(&config);
    let start = Instant::now();
    for (i, line) in lines.iter().enumerate() {
        miner.add_message(&RawMessage::new(format!("bench:{i}"), *line));
    }
    let cluster_time = start.elapsed();
    let stats = miner.stats();

    println!("Results:");
    println!("  Masking: {:.3}s ({:.0} lines/s)", mask_time.as_secs_f64(), lines.len() as f64 / mask_time.as_secs_f64());
    println!("  Lines altered by masking: {} / {}", changed, lines.len());
    println!("  Mask + cluster: {:.3}s ({:.0} lines/s)", cluster_time.as_secs_f64(), lines.len() as f64 / cluster_time.as_secs_f64());
    println!("  Patterns: {} (compression {:.1}x)", stats.clusters, stats.processed as f64 / stats.clusters.max(1) as f64);

    Ok(())
}
