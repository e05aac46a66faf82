mod args;

#[cfg(test)]
mod args_test;

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tsbs_bench::configuration::Configuration;
use tsbs_bench::ilp::LineBuffer;
use tsbs_bench::run::run;
use tsbs_bench::sink::{send_raw_file, SerializeSinkFactory, SinkFactory, TcpSinkFactory};
use tsbs_bench::stats::{RunStats, StatsPrinter};
use tsbs_bench::store::{block_until_count, CpuTable, DEFAULT_POLL_INTERVAL};
use tsbs_bench::version::{format_version_info_human, format_version_info_json};
use tsbs_bench::{generate, partition, RowSet, WorkerPlan};

use crate::args::{BenchArgs, Command, SendRawArgs, TsbsBenchArgs};

// Rows serialized at once when writing the ILP file
const WRITE_BATCH_ROWS: usize = 10_000;

#[tokio::main]
async fn main() -> Result<()> {
    let args = TsbsBenchArgs::parse();

    match args.command {
        Some(Command::SendRaw(raw_args)) => {
            init_logging(raw_args.debug);
            send_raw(raw_args).await
        }
        None => {
            let bench_args = args.bench;
            if bench_args.version_json {
                println!("{}", format_version_info_json());
                return Ok(());
            }
            if bench_args.version {
                println!("{}", format_version_info_human());
                return Ok(());
            }

            init_logging(bench_args.debug);
            tokio::select! {
                result = run_benchmark(bench_args) => result,
                _ = tokio::signal::ctrl_c() => anyhow::bail!("Interrupted"),
            }
        }
    }
}

// RUST_LOG takes precedence over --debug
fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_benchmark(args: BenchArgs) -> Result<()> {
    let seed = args.seed.unwrap_or_else(rand::random);

    // With ILP on stdout the reports must not be interleaved with it
    let mut report: Box<dyn Write + Send> = if args.writes_ilp_to_stdout() {
        Box::new(std::io::stderr())
    } else {
        Box::new(std::io::stdout())
    };
    args.print_configuration(seed, &mut report)?;

    let table = CpuTable::new(&args.host, args.http_port);
    if args.send {
        table
            .drop_table()
            .await
            .context("Failed to drop the cpu table")?;
        table
            .create_table()
            .await
            .context("Failed to create the cpu table")?;
    }

    let rows = generate_rows(seed, args.row_count, args.scale).await?;
    let plan = partition(
        &rows,
        args.effective_worker_count(),
        args.effective_chunk_size(),
    )
    .context("Failed to partition the dataset")?;

    let serialized = ingest(&rows, plan.clone(), Arc::new(SerializeSinkFactory))
        .await
        .context("An error occurred while serializing the dataset")?;
    StatsPrinter.print_summary("Serialized", &serialized, &mut report)?;

    if let Some(path) = &args.write_ilp {
        write_ilp(&rows, path)
            .await
            .with_context(|| format!("Failed to write ILP to {}", path.display()))?;
    }

    if !args.send {
        writeln!(report, "Not sending. Use --send to send to server.")?;
        return Ok(());
    }

    let sink_factory = Arc::new(TcpSinkFactory::new(&args.host, args.ilp_port));
    let sent = ingest(&rows, plan, sink_factory)
        .await
        .context("An error occurred while sending the dataset")?;
    StatsPrinter.print_summary("Sent", &sent, &mut report)?;

    block_until_count(
        &table,
        rows.len() as u64,
        args.validation_query_timeout,
        DEFAULT_POLL_INTERVAL,
    )
    .await
    .context("Failed to validate the ingested row count")?;
    writeln!(report, "All {} rows are visible.", rows.len())?;

    Ok(())
}

async fn generate_rows(seed: u64, row_count: usize, scale: usize) -> Result<Arc<RowSet>> {
    let start_time = Instant::now();
    let rows = tokio::task::spawn_blocking(move || generate(seed, row_count, scale))
        .await
        .context("The generator task panicked")?
        .context("Failed to generate the dataset")?;
    info!(rows = rows.len(), elapsed = ?start_time.elapsed(), "generated dataset");
    Ok(Arc::new(rows))
}

async fn ingest(
    rows: &Arc<RowSet>,
    plan: WorkerPlan,
    sink_factory: Arc<dyn SinkFactory>,
) -> Result<RunStats> {
    let config = Configuration {
        rows: Arc::clone(rows),
        plan,
        sink_factory,
    };
    Ok(run(config).await?)
}

async fn write_ilp(rows: &RowSet, path: &Path) -> Result<()> {
    let out: Box<dyn AsyncWrite + Unpin + Send> = if path == Path::new("-") {
        Box::new(tokio::io::stdout())
    } else {
        Box::new(tokio::fs::File::create(path).await?)
    };
    let mut out = BufWriter::new(out);

    let mut buf = LineBuffer::new();
    for batch in rows.rows().chunks(WRITE_BATCH_ROWS) {
        buf.write_rows(batch);
        out.write_all(buf.as_bytes()).await?;
        buf.clear();
    }
    out.flush().await?;

    info!(path = %path.display(), rows = rows.len(), "wrote ILP");
    Ok(())
}

async fn send_raw(args: SendRawArgs) -> Result<()> {
    let start_time = Instant::now();
    let sent = send_raw_file(&args.host, args.port, &args.file, args.chunk_size)
        .await
        .with_context(|| format!("Failed to send {}", args.file.display()))?;
    let elapsed = start_time.elapsed();

    println!(
        "Sent {} bytes in {:.2}s: {:.2} MiB/sec.",
        sent,
        elapsed.as_secs_f64(),
        sent as f64 / 1024.0 / 1024.0 / elapsed.as_secs_f64(),
    );
    Ok(())
}
