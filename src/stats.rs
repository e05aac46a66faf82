use std::io::Write;
use std::time::Duration;

use anyhow::Result;

/// Accumulated results of an ingestion run, or of one of its lanes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub rows: u64,
    pub chunks: u64,
    pub bytes: u64,
    pub elapsed: Duration,
}

impl RunStats {
    pub fn account_chunk(&mut self, rows: usize, bytes: u64) {
        self.rows += rows as u64;
        self.chunks += 1;
        self.bytes += bytes;
    }

    /// Lanes run in parallel, so the elapsed time of the combination
    /// is the time of the slowest one.
    pub fn combine(&mut self, other: &Self) {
        self.rows += other.rows;
        self.chunks += other.chunks;
        self.bytes += other.bytes;
        self.elapsed = std::cmp::max(self.elapsed, other.elapsed);
    }

    pub fn million_rows_per_second(&self) -> f64 {
        self.rows as f64 / self.elapsed.as_secs_f64() / 1_000_000.0
    }

    pub fn mebibytes(&self) -> f64 {
        self.bytes as f64 / 1024.0 / 1024.0
    }

    pub fn mebibytes_per_second(&self) -> f64 {
        self.mebibytes() / self.elapsed.as_secs_f64()
    }
}

pub struct StatsPrinter;

impl StatsPrinter {
    /// Prints a throughput summary under the given title, e.g. "Serialized".
    pub fn print_summary(&self, title: &str, stats: &RunStats, out: &mut impl Write) -> Result<()> {
        writeln!(out, "{title}:")?;
        writeln!(
            out,
            "  {} rows in {:.2}s: {:.2} mil rows/sec.",
            stats.rows,
            stats.elapsed.as_secs_f64(),
            stats.million_rows_per_second(),
        )?;
        writeln!(
            out,
            "  ILP Buffer size: {:.2} MiB: {:.2} MiB/sec.",
            stats.mebibytes(),
            stats.mebibytes_per_second(),
        )?;
        Ok(())
    }
}
