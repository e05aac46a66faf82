//! Deterministic generation of `cpu` rows.
//!
//! All randomness comes from a single [RngGen] seeded from the caller's seed
//! and passed explicitly through the draw helpers, so independent calls never
//! share state. Values are drawn in a fixed order:
//!
//! 1. region and datacenter, row by row,
//! 2. the remaining pooled symbols, one whole column at a time
//!    (rack, os, arch, team, service, service_version, service_environment),
//! 3. the usage columns, one whole column at a time in schema order.
//!
//! Hostnames and timestamps are derived from the row position and do not
//! consume any randomness. With the same seed, row count and scale the
//! output is identical on every platform, as long as the RNG algorithm
//! (PCG 64 MCG) and the normal sampler of `rand_distr` stay the same.

use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rand_pcg::Pcg64Mcg;
use tracing::debug;

use crate::error::{ensure_arg, Result};
use crate::row::{Row, RowSet, USAGE_COLUMN_COUNT};
use crate::schema::{
    ARCH_CHOICES, OS_CHOICES, RACK_CHOICES, REGIONS, SERVICE_CHOICES,
    SERVICE_ENVIRONMENT_CHOICES, SERVICE_VERSION_CHOICES, TEAM_CHOICES,
};

pub type RngGen = Pcg64Mcg;

/// 2016-01-01T00:00:00Z, in nanoseconds since the Unix epoch.
pub const START_TIMESTAMP_NANOS: i64 = 1_451_606_400_000_000_000;

/// Distance between the timestamps of consecutive rows (10 seconds).
pub const TIMESTAMP_STEP_NANOS: i64 = 10_000_000_000;

pub const USAGE_MIN: f64 = 0.0;
pub const USAGE_MAX: f64 = 100.0;

/// Adds `b` to `a`, saturating the result at both ends of `[0, 100]`.
pub fn clip_add(a: f64, b: f64) -> f64 {
    (a + b).min(USAGE_MAX).max(USAGE_MIN)
}

/// Generates `row_count` rows of the `cpu` table.
///
/// The hostname of row `i` is `host_<i mod scale>`, so exactly
/// `min(scale, row_count)` distinct hostnames appear and, when there are
/// more rows than hosts, every host repeats in a round-robin fashion.
pub fn generate(seed: u64, row_count: usize, scale: usize) -> Result<RowSet> {
    ensure_arg!(row_count > 0, "row count must be greater than zero");
    ensure_arg!(scale > 0, "scale must be greater than zero");
    ensure_arg!(
        (row_count as u128) * (TIMESTAMP_STEP_NANOS as u128)
            <= (i64::MAX - START_TIMESTAMP_NANOS) as u128,
        "row count {} is too large to fit the timestamp range",
        row_count,
    );

    let mut rng = RngGen::seed_from_u64(seed);

    // Rows are allocated once and filled in place, column by column
    let mut rows: Vec<Row> = (0..row_count)
        .map(|i| blank_row(i % scale, timestamp_at(i)))
        .collect();

    fill_regions(&mut rng, &mut rows);
    fill_choices(&mut rng, &mut rows, &RACK_CHOICES, |row| &mut row.rack);
    fill_choices(&mut rng, &mut rows, &OS_CHOICES, |row| &mut row.os);
    fill_choices(&mut rng, &mut rows, &ARCH_CHOICES, |row| &mut row.arch);
    fill_choices(&mut rng, &mut rows, &TEAM_CHOICES, |row| &mut row.team);
    fill_choices(&mut rng, &mut rows, &SERVICE_CHOICES, |row| &mut row.service);
    fill_choices(&mut rng, &mut rows, &SERVICE_VERSION_CHOICES, |row| {
        &mut row.service_version
    });
    fill_choices(&mut rng, &mut rows, &SERVICE_ENVIRONMENT_CHOICES, |row| {
        &mut row.service_environment
    });

    for column in 0..USAGE_COLUMN_COUNT {
        fill_usage_walk(&mut rng, &mut rows, column);
    }

    debug!(seed, row_count, scale, "generated row set");

    Ok(rows.into())
}

fn timestamp_at(index: usize) -> i64 {
    START_TIMESTAMP_NANOS + index as i64 * TIMESTAMP_STEP_NANOS
}

fn blank_row(host: usize, timestamp: i64) -> Row {
    Row {
        host,
        region: "",
        datacenter: "",
        rack: "",
        os: "",
        arch: "",
        team: "",
        service: "",
        service_version: "",
        service_environment: "",
        usage: [USAGE_MIN; USAGE_COLUMN_COUNT],
        timestamp,
    }
}

// The datacenter is always drawn from the region chosen for the same row.
fn fill_regions(rng: &mut RngGen, rows: &mut [Row]) {
    for row in rows {
        let (region, dcs) = REGIONS[rng.gen_range(0..REGIONS.len())];
        row.region = region;
        row.datacenter = dcs[rng.gen_range(0..dcs.len())];
    }
}

fn fill_choices<F>(rng: &mut RngGen, rows: &mut [Row], choices: &[&'static str], field: F)
where
    F: Fn(&mut Row) -> &mut &'static str,
{
    for row in rows {
        *field(row) = choices[rng.gen_range(0..choices.len())];
    }
}

// A random walk with standard normal steps, bounced off the [0, 100] limits.
// The first sample only seeds the walk and is not emitted.
fn fill_usage_walk(rng: &mut RngGen, rows: &mut [Row], column: usize) {
    let mut current: f64 = rng.sample(StandardNormal);
    for row in rows {
        let step: f64 = rng.sample(StandardNormal);
        current = clip_add(current, step);
        row.usage[column] = current;
    }
}
