//! The fixed layout of the benchmark's `cpu` table.
//!
//! The table mirrors the TSBS "cpu-only" use case: ten symbol columns
//! describing a machine, ten double columns holding percentages and a
//! designated timestamp.

use lazy_static::lazy_static;

pub const TABLE_NAME: &str = "cpu";

pub const TIMESTAMP_COLUMN: &str = "timestamp";

pub const SYMBOL_COLUMNS: [&str; 10] = [
    "hostname",
    "region",
    "datacenter",
    "rack",
    "os",
    "arch",
    "team",
    "service",
    "service_version",
    "service_environment",
];

pub const USAGE_COLUMNS: [&str; 10] = [
    "usage_user",
    "usage_system",
    "usage_idle",
    "usage_nice",
    "usage_iowait",
    "usage_irq",
    "usage_softirq",
    "usage_steal",
    "usage_guest",
    "usage_guest_nice",
];

/// Regions paired with the datacenters which belong to them.
pub const REGIONS: [(&str, &[&str]); 9] = [
    (
        "us-east-1",
        &["us-east-1a", "us-east-1b", "us-east-1c", "us-east-1e"],
    ),
    ("us-west-1", &["us-west-1a", "us-west-1b"]),
    ("us-west-2", &["us-west-2a", "us-west-2b", "us-west-2c"]),
    ("eu-west-1", &["eu-west-1a", "eu-west-1b", "eu-west-1c"]),
    ("eu-central-1", &["eu-central-1a", "eu-central-1b"]),
    ("ap-southeast-1", &["ap-southeast-1a", "ap-southeast-1b"]),
    ("ap-southeast-2", &["ap-southeast-2a", "ap-southeast-2b"]),
    ("ap-northeast-1", &["ap-northeast-1a", "ap-northeast-1c"]),
    ("sa-east-1", &["sa-east-1a", "sa-east-1b", "sa-east-1c"]),
];

pub const OS_CHOICES: [&str; 3] = ["Ubuntu16.10", "Ubuntu16.04LTS", "Ubuntu15.10"];

pub const ARCH_CHOICES: [&str; 2] = ["x64", "x86"];

pub const TEAM_CHOICES: [&str; 4] = ["SF", "NYC", "LON", "CHI"];

pub const SERVICE_ENVIRONMENT_CHOICES: [&str; 3] = ["production", "staging", "test"];

const RACK_COUNT: usize = 100;
const SERVICE_COUNT: usize = 20;
const SERVICE_VERSION_COUNT: usize = 2;

lazy_static! {
    pub static ref RACK_CHOICES: Vec<&'static str> = numbered_choices(RACK_COUNT);
    pub static ref SERVICE_CHOICES: Vec<&'static str> = numbered_choices(SERVICE_COUNT);
    pub static ref SERVICE_VERSION_CHOICES: Vec<&'static str> =
        numbered_choices(SERVICE_VERSION_COUNT);
}

// Leaked once, rows borrow the labels as `&'static str`.
fn numbered_choices(count: usize) -> Vec<&'static str> {
    (0..count)
        .map(|n| &*Box::leak(n.to_string().into_boxed_str()))
        .collect()
}

/// Renders the DDL which creates the `cpu` table in QuestDB.
pub fn create_table_sql() -> String {
    let symbols = SYMBOL_COLUMNS
        .iter()
        .map(|col| format!("{col} symbol"))
        .collect::<Vec<_>>()
        .join(", ");
    let doubles = USAGE_COLUMNS
        .iter()
        .map(|col| format!("{col} double"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "create table {TABLE_NAME} ({symbols}, {doubles}, {TIMESTAMP_COLUMN} timestamp) \
         timestamp({TIMESTAMP_COLUMN}) partition by day"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_pools() {
        assert_eq!(RACK_CHOICES.len(), 100);
        assert_eq!(RACK_CHOICES[0], "0");
        assert_eq!(RACK_CHOICES[99], "99");
        assert_eq!(&SERVICE_CHOICES[..], &(0..20).map(|n| n.to_string()).collect::<Vec<_>>()[..]);
        assert_eq!(&SERVICE_VERSION_CHOICES[..], &["0", "1"]);
    }

    #[test]
    fn test_create_table_sql() {
        let sql = create_table_sql();
        assert!(sql.starts_with("create table cpu ("));
        assert!(sql.contains("hostname symbol"));
        assert!(sql.contains("service_environment symbol"));
        assert!(sql.contains("usage_user double"));
        assert!(sql.contains("usage_guest_nice double"));
        assert!(sql.contains("timestamp timestamp)"));
        assert!(sql.ends_with("timestamp(timestamp) partition by day"));
    }
}
