use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use logdrift::{MinerConfig, PatternMiner};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "logdrift", version, about = "Log pattern mining and period-over-period drift reports")]
struct Cli {
    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(long = "verbose", short = 'v', global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the masked form of each input line (`-` or no input reads stdin)
    Mask {
        input: Vec<String>,
    },
    /// Cluster document messages into a pattern summary
    Normalize {
        /// JSON lines with index, id and message per document
        #[arg(long = "fields-file")]
        fields_file: PathBuf,
        #[arg(long = "output-file")]
        output_file: PathBuf,
        #[command(flatten)]
        miner: MinerArgs,
    },
    /// Diff the current pattern summary against the previous one
    Compare {
        #[arg(long = "current-file")]
        current_file: PathBuf,
        /// A missing file is treated as an empty summary (first run)
        #[arg(long = "previous-file")]
        previous_file: PathBuf,
        #[arg(long = "output-file")]
        output_file: PathBuf,
    },
}

#[derive(Args, Debug)]
struct MinerArgs {
    /// JSON file with miner settings; flags below override it
    #[arg(long = "config")]
    config: Option<PathBuf>,
    #[arg(long = "similarity-threshold")]
    similarity_threshold: Option<f64>,
    #[arg(long = "max-clusters")]
    max_clusters: Option<usize>,
    /// Raw lines kept per pattern as samples (at most 5)
    #[arg(long = "sample-lines")]
    sample_lines: Option<usize>,
    #[arg(long = "mask-cache-size")]
    mask_cache_size: Option<usize>,
}

impl MinerArgs {
    fn resolve(&self) -> anyhow::Result<MinerConfig> {
        let mut config = match &self.config {
            Some(path) => MinerConfig::from_json_file(path)
                .with_context(|| format!("loading miner config {}", path.display()))?,
            None => MinerConfig::default(),
        };
        config.similarity_threshold = self.similarity_threshold.unwrap_or(config.similarity_threshold);
        config.max_clusters = self.max_clusters.or(config.max_clusters);
        config.sample_lines = self.sample_lines.unwrap_or(config.sample_lines);
        config.mask_cache_size = self.mask_cache_size.unwrap_or(config.mask_cache_size);
        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Mask { input } => run_mask(&input),
        Command::Normalize { fields_file, output_file, miner } => {
            run_normalize(&fields_file, &output_file, &miner.resolve()?)
        }
        Command::Compare { current_file, previous_file, output_file } => {
            run_compare(&current_file, &previous_file, &output_file)
        }
    }
}

fn run_mask(paths: &[String]) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut emit = |reader: &mut dyn BufRead| -> anyhow::Result<()> {
        for line in reader.lines() {
            writeln!(out, "{}", logdrift::masking::mask_text(&line?))?;
        }
        Ok(())
    };
    if paths.is_empty() {
        emit(&mut io::stdin().lock())?;
    }
    for p in paths {
        if p == "-" {
            emit(&mut io::stdin().lock())?;
        } else {
            let f = File::open(p).with_context(|| format!("opening {p}"))?;
            emit(&mut BufReader::new(f))?;
        }
    }
    out.flush()?;
    Ok(())
}

fn run_normalize(fields_file: &Path, output_file: &Path, config: &MinerConfig) -> anyhow::Result<()> {
    info!(fields_file = %fields_file.display(), output_file = %output_file.display(), "normalizing messages");
    let f = File::open(fields_file).with_context(|| format!("opening fields file {}", fields_file.display()))?;
    let messages = logdrift::source::read_documents(BufReader::new(f))?;

    let mut miner = PatternMiner::new(config);
    let stats = miner.add_messages(&messages);
    info!(
        processed = stats.processed,
        skipped_empty = stats.skipped_empty,
        unclustered = stats.unclustered,
        patterns = stats.clusters,
        "clustering finished"
    );

    logdrift::store::save_summary(&miner.summary(), output_file)?;
    Ok(())
}

fn run_compare(current_file: &Path, previous_file: &Path, output_file: &Path) -> anyhow::Result<()> {
    let current = logdrift::store::load_summary(current_file)?;
    let previous = logdrift::store::load_summary_or_empty(previous_file)?;
    info!(current = current.len(), previous = previous.len(), "comparing pattern summaries");

    let result = logdrift::compare(&current.patterns, &previous.patterns);
    info!(
        new = result.new.len(),
        disappeared = result.disappeared.len(),
        increased = result.increased.len(),
        decreased = result.decreased.len(),
        "comparison finished"
    );
    logdrift::store::save_comparison(&result, output_file)?;
    Ok(())
}
