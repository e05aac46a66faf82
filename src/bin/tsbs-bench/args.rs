use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use tsbs_bench::sink::DEFAULT_RAW_CHUNK_SIZE;

/// Generates the TSBS `cpu-only` dataset and ingests it into QuestDB
/// over the InfluxDB line protocol.
#[derive(Parser, Debug)]
#[command(name = "tsbs-bench")]
#[command(args_conflicts_with_subcommands = true)]
#[command(disable_version_flag = true)]
pub struct TsbsBenchArgs {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub bench: BenchArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Stream a prewritten ILP file to the ingestion port
    SendRaw(SendRawArgs),
}

#[derive(Args, Debug, Clone)]
pub struct BenchArgs {
    /// Number of rows to generate
    #[arg(long, default_value = "10_000_000", value_parser = parse_count)]
    pub row_count: usize,

    /// Number of distinct hosts
    #[arg(long, default_value = "4000", value_parser = parse_count)]
    pub scale: usize,

    /// Seed of the generator, random if not given
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the dataset as ILP to the given file, or to stdout for "-"
    #[arg(long, value_name = "PATH")]
    pub write_ilp: Option<PathBuf>,

    /// Ingest the dataset into the database
    #[arg(long)]
    pub send: bool,

    #[arg(long, env = "TSBS_HOST", default_value = "localhost")]
    pub host: String,

    #[arg(long, env = "TSBS_ILP_PORT", default_value_t = 9009)]
    pub ilp_port: u16,

    #[arg(long, env = "TSBS_HTTP_PORT", default_value_t = 9000)]
    pub http_port: u16,

    /// Number of parallel ingestion lanes. If not given, the whole dataset
    /// is sent over a single connection.
    #[arg(long, value_parser = parse_count)]
    pub workers: Option<usize>,

    /// Rows per chunk handed to a worker
    #[arg(long, default_value = "10_000", value_parser = parse_count)]
    pub worker_chunk_row_count: usize,

    /// Seconds to wait for all rows to become visible after sending
    #[arg(long, default_value = "120", value_parser = parse_seconds)]
    pub validation_query_timeout: Duration,

    /// Enable debug logs
    #[arg(long)]
    pub debug: bool,

    /// Print version information and exit
    #[arg(long)]
    pub version: bool,

    /// Print version information as JSON and exit
    #[arg(long)]
    pub version_json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SendRawArgs {
    /// File with ILP lines
    pub file: PathBuf,

    #[arg(long, env = "TSBS_HOST", default_value = "localhost")]
    pub host: String,

    #[arg(long, env = "TSBS_ILP_PORT", default_value_t = 9009)]
    pub port: u16,

    /// Size of the pieces the file is sent in
    #[arg(long, default_value_t = DEFAULT_RAW_CHUNK_SIZE, value_parser = parse_count)]
    pub chunk_size: usize,

    /// Enable debug logs
    #[arg(long)]
    pub debug: bool,
}

impl BenchArgs {
    /// Chunk size used when no worker count was given: one chunk with all rows.
    pub fn effective_chunk_size(&self) -> usize {
        match self.workers {
            Some(_) => self.worker_chunk_row_count,
            None => self.row_count,
        }
    }

    pub fn effective_worker_count(&self) -> usize {
        self.workers.unwrap_or(1)
    }

    pub fn print_configuration(&self, seed: u64, out: &mut impl Write) -> anyhow::Result<()> {
        writeln!(out, "Configuration")?;
        writeln!(out, "Row count:\t\t {}", self.row_count)?;
        writeln!(out, "Scale:\t\t\t {}", self.scale)?;
        writeln!(out, "Seed:\t\t\t {seed}")?;
        match &self.workers {
            Some(workers) => {
                writeln!(out, "Workers:\t\t {workers}")?;
                writeln!(out, "Worker chunk rows:\t {}", self.worker_chunk_row_count)?;
            }
            None => writeln!(out, "Workers:\t\t none (single connection)")?,
        }
        match &self.write_ilp {
            Some(path) => writeln!(out, "Write ILP:\t\t {}", path.display())?,
            None => writeln!(out, "Write ILP:\t\t no")?,
        }
        if self.send {
            writeln!(out, "Host:\t\t\t {}", self.host)?;
            writeln!(out, "ILP port:\t\t {}", self.ilp_port)?;
            writeln!(out, "HTTP port:\t\t {}", self.http_port)?;
            writeln!(
                out,
                "Validation timeout:\t {:?}",
                self.validation_query_timeout
            )?;
        } else {
            writeln!(out, "Send:\t\t\t no")?;
        }
        writeln!(out)?;
        Ok(())
    }

    /// Whether the ILP output goes to stdout, in which case reports
    /// must go elsewhere.
    pub fn writes_ilp_to_stdout(&self) -> bool {
        self.write_ilp.as_deref() == Some(Path::new("-"))
    }
}

/// Parses a non-negative count. Underscores are ignored and the
/// `k`, `m` and `b` suffixes multiply by a thousand, a million and a billion.
pub fn parse_count(s: &str) -> Result<usize, String> {
    let s: String = s.trim().chars().filter(|c| *c != '_').collect();
    if s.is_empty() {
        return Err("empty count".to_string());
    }

    let (digits, multiplier) = match s.chars().last().map(|c| c.to_ascii_lowercase()) {
        Some('k') => (&s[..s.len() - 1], 1_000u64),
        Some('m') => (&s[..s.len() - 1], 1_000_000),
        Some('b') => (&s[..s.len() - 1], 1_000_000_000),
        _ => (&s[..], 1),
    };

    let value: u64 = digits
        .parse()
        .map_err(|err| format!("invalid count {s:?}: {err}"))?;
    let value = value
        .checked_mul(multiplier)
        .ok_or_else(|| format!("count {s:?} is too large"))?;
    usize::try_from(value).map_err(|_| format!("count {s:?} is too large"))
}

/// Parses a duration given in (possibly fractional) seconds.
pub fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .trim()
        .parse()
        .map_err(|err| format!("invalid number of seconds {s:?}: {err}"))?;
    Duration::try_from_secs_f64(secs).map_err(|err| format!("invalid duration {s:?}: {err}"))
}
