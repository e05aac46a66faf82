use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::args::{parse_count, parse_seconds, Command, TsbsBenchArgs};

fn parse(args: &str) -> Result<TsbsBenchArgs, clap::Error> {
    TsbsBenchArgs::try_parse_from(std::iter::once("tsbs-bench").chain(args.split_ascii_whitespace()))
}

#[test]
fn test_defaults() {
    let args = parse("").unwrap();
    assert!(args.command.is_none());

    let bench = args.bench;
    assert_eq!(bench.row_count, 10_000_000);
    assert_eq!(bench.scale, 4000);
    assert_eq!(bench.seed, None);
    assert_eq!(bench.write_ilp, None);
    assert!(!bench.send);
    assert_eq!(bench.ilp_port, 9009);
    assert_eq!(bench.http_port, 9000);
    assert_eq!(bench.workers, None);
    assert_eq!(bench.worker_chunk_row_count, 10_000);
    assert_eq!(bench.validation_query_timeout, Duration::from_secs(120));
    assert!(!bench.debug);

    // Without workers the whole dataset is a single chunk on a single lane
    assert_eq!(bench.effective_worker_count(), 1);
    assert_eq!(bench.effective_chunk_size(), 10_000_000);
}

#[test]
fn test_full_command_line() {
    let args = parse(
        "--row-count 1m --scale 100 --seed 42 --write-ilp - --send --host db.local \
         --ilp-port 19009 --http-port 19000 --workers 8 --worker-chunk-row-count 5k \
         --validation-query-timeout 2.5 --debug",
    )
    .unwrap();

    let bench = args.bench;
    assert_eq!(bench.row_count, 1_000_000);
    assert_eq!(bench.scale, 100);
    assert_eq!(bench.seed, Some(42));
    assert!(bench.writes_ilp_to_stdout());
    assert!(bench.send);
    assert_eq!(bench.host, "db.local");
    assert_eq!(bench.ilp_port, 19009);
    assert_eq!(bench.http_port, 19000);
    assert_eq!(bench.effective_worker_count(), 8);
    assert_eq!(bench.effective_chunk_size(), 5_000);
    assert_eq!(bench.validation_query_timeout, Duration::from_millis(2500));
    assert!(bench.debug);
}

#[test]
fn test_send_raw() {
    let args = parse("send-raw data.ilp --port 9999").unwrap();
    match args.command {
        Some(Command::SendRaw(raw)) => {
            assert_eq!(raw.file, PathBuf::from("data.ilp"));
            assert_eq!(raw.port, 9999);
            assert_eq!(raw.chunk_size, 64 * 1024);
        }
        None => panic!("expected the send-raw subcommand"),
    }
}

#[test]
fn test_invalid_command_lines() {
    assert!(parse("--row-count ten").is_err());
    assert!(parse("--row-count -5").is_err());
    assert!(parse("--ilp-port 70000").is_err());
    assert!(parse("--validation-query-timeout -1").is_err());
    assert!(parse("--no-such-flag").is_err());
    assert!(parse("send-raw").is_err());
}

#[test]
fn test_parse_count() {
    assert_eq!(parse_count("0"), Ok(0));
    assert_eq!(parse_count("10_000"), Ok(10_000));
    assert_eq!(parse_count("10k"), Ok(10_000));
    assert_eq!(parse_count("10M"), Ok(10_000_000));
    assert_eq!(parse_count("2b"), Ok(2_000_000_000));

    assert!(parse_count("").is_err());
    assert!(parse_count("k").is_err());
    assert!(parse_count("1.5m").is_err());
    assert!(parse_count("99999999999999999999b").is_err());
}

#[test]
fn test_parse_seconds() {
    assert_eq!(parse_seconds("120"), Ok(Duration::from_secs(120)));
    assert_eq!(parse_seconds("0.1"), Ok(Duration::from_millis(100)));
    assert!(parse_seconds("soon").is_err());
    assert!(parse_seconds("-3").is_err());
}
