use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use memmap2::Mmap;
use salient::concat::concat_files;
use salient::miner::{Miner, MinerConfig};
use salient::output::FeaturePrinter;
use salient::tagger::tag_stream;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "salient")]
#[command(about = "Find substrings characteristic of one corpus relative to another")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Corpus whose characteristic substrings are mined
    input0: Option<PathBuf>,

    /// Reference corpus
    input1: Option<PathBuf>,

    /// Count each substring once per NUL-delimited document
    #[arg(long)]
    documents: bool,

    /// Skip prefixes whose count matches the longer substring's
    #[arg(long = "skip-prefixes")]
    skip_prefixes: bool,

    /// Input is a tagged (class, byte) pair stream; render with colors
    #[arg(long)]
    color: bool,

    /// Only report substrings bounded by whitespace
    #[arg(long)]
    words: bool,

    /// Emit only the features needed to cover all documents (implies --documents)
    #[arg(long)]
    cover: bool,

    /// Minimum number of newly covered documents for --cover to emit a feature
    #[arg(long, default_value = "0")]
    cover_threshold: usize,

    /// Don't suppress redundant features
    #[arg(long = "no-filter")]
    no_filter: bool,

    /// Permit two features covering the same document set
    #[arg(long = "no-equal-sets")]
    no_equal_sets: bool,

    /// Additive smoothing applied to both sides of the odds
    #[arg(long, default_value = "1.0")]
    prior_bias: f64,

    /// Minimum probability for output, as a decimal fraction
    #[arg(long, default_value = "0.0")]
    threshold: f64,

    /// Minimum percentage of documents containing a substring (document mode)
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u32).range(0..=100))]
    threshold_percent: u32,

    /// Absolute minimum count; overrides --threshold-percent
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=i32::MAX as i64))]
    threshold_count: Option<u32>,

    /// Maximum occurrences allowed in the reference corpus
    #[arg(long = "input1-max")]
    input1_max: Option<usize>,

    /// Maximum substring length to consider
    #[arg(long = "max-length", default_value = "32")]
    max_length: usize,

    /// Emit one JSON object per feature
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Tag an RFC-822/HTML byte stream from stdin with per-byte classes
    Tag,
    /// Concatenate files to stdout, separated by NUL bytes
    Concat {
        /// Files to concatenate, in order
        files: Vec<PathBuf>,
    },
}

/// Memory-map a file read-only. Empty files map to an empty slice, which
/// mmap itself refuses.
fn map_file(path: &Path) -> Result<Option<Mmap>> {
    let file = File::open(path)
        .with_context(|| format!("could not open '{}' for reading", path.display()))?;

    if file.metadata()?.len() == 0 {
        return Ok(None);
    }

    let map = unsafe { Mmap::map(&file) }
        .with_context(|| format!("could not memory-map '{}'", path.display()))?;

    Ok(Some(map))
}

/// Suffix arrays over large corpora dwarf the rest of the system's memory
/// use; volunteer this process to the kernel's OOM killer first.
#[cfg(target_os = "linux")]
fn volunteer_for_oom_kill() {
    let _ = std::fs::write("/proc/self/oom_score_adj", "1000");
}

#[cfg(not(target_os = "linux"))]
fn volunteer_for_oom_kill() {}

fn run_miner(cli: Cli) -> Result<()> {
    let (Some(input0_path), Some(input1_path)) = (&cli.input0, &cli.input1) else {
        bail!("Usage: salient [OPTION]... INPUT0 INPUT1");
    };

    if !(0.0..1.0).contains(&cli.threshold) {
        bail!("--threshold expects a probability below 1, got {}", cli.threshold);
    }
    if cli.prior_bias < 0.0 {
        bail!("--prior-bias must be non-negative, got {}", cli.prior_bias);
    }

    volunteer_for_oom_kill();

    let map0 = map_file(input0_path)?;
    let map1 = map_file(input1_path)?;
    let input0 = map0.as_ref().map(|m| &m[..]).unwrap_or(&[]);
    let input1 = map1.as_ref().map(|m| &m[..]).unwrap_or(&[]);

    let config = MinerConfig {
        document_mode: cli.documents || cli.cover,
        skip_samecount_prefixes: cli.skip_prefixes,
        color_pairs: cli.color,
        word_boundaries: cli.words,
        cover: cli.cover,
        filter_redundant: !cli.no_filter,
        allow_equal_sets: !cli.no_equal_sets,
        prior_bias: cli.prior_bias,
        threshold: cli.threshold,
        threshold_count: cli.threshold_count.map(|c| c as i32).unwrap_or(-1),
        threshold_percent: cli.threshold_percent,
        input1_threshold: cli.input1_max.unwrap_or(usize::MAX),
        cover_threshold: cli.cover_threshold,
        max_suffix_size: cli.max_length,
        separator: 0,
    };

    let miner = Miner::new(input0, input1, config)?;
    let mut printer = FeaturePrinter::new(cli.color, cli.json);

    miner.run(&mut |input0_hits, input1_hits, log_odds, substring| {
        printer.print(input0_hits, input1_hits, log_odds, substring)
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Tag) => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            tag_stream(stdin.lock(), BufWriter::new(stdout.lock()))?;
            Ok(())
        }
        Some(Commands::Concat { files }) => {
            if files.is_empty() {
                bail!("Usage: salient concat FILE...");
            }
            let stdout = io::stdout();
            concat_files(&files, &mut BufWriter::new(stdout.lock()))
        }
        None => run_miner(cli),
    }
}
