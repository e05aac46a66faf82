//! Serialization of rows into the InfluxDB line protocol (ILP).
//!
//! Every row becomes one line:
//!
//! ```text
//! cpu,hostname=host_0,region=us-east-1,... usage_user=12.5,... 1451606400000000000
//! ```

use std::fmt::Write as _;

use crate::row::Row;
use crate::schema::{SYMBOL_COLUMNS, TABLE_NAME, USAGE_COLUMNS};

/// A growable buffer of ILP lines.
#[derive(Default)]
pub struct LineBuffer {
    buf: String,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity),
        }
    }

    pub fn write_row(&mut self, row: &Row) {
        self.buf.push_str(TABLE_NAME);

        // `write!` into a String cannot fail
        let _ = write!(self.buf, ",{}={}", SYMBOL_COLUMNS[0], row.hostname());
        for (name, value) in SYMBOL_COLUMNS[1..].iter().zip(row.pooled_symbols()) {
            self.buf.push(',');
            self.buf.push_str(name);
            self.buf.push('=');
            push_escaped_tag(&mut self.buf, value);
        }

        for (i, (name, value)) in USAGE_COLUMNS.iter().zip(row.usage).enumerate() {
            self.buf.push(if i == 0 { ' ' } else { ',' });
            let _ = write!(self.buf, "{name}={value}");
        }

        let _ = writeln!(self.buf, " {}", row.timestamp);
    }

    pub fn write_rows<'a>(&mut self, rows: impl IntoIterator<Item = &'a Row>) {
        for row in rows {
            self.write_row(row);
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.buf.as_bytes()
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }
}

fn push_escaped_tag(buf: &mut String, value: &str) {
    for c in value.chars() {
        if matches!(c, ',' | '=' | ' ') {
            buf.push('\\');
        }
        buf.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::small_rowset;

    fn sample_row() -> Row {
        Row {
            host: 7,
            region: "us-west-2",
            datacenter: "us-west-2b",
            rack: "42",
            os: "Ubuntu16.04LTS",
            arch: "x64",
            team: "LON",
            service: "3",
            service_version: "1",
            service_environment: "staging",
            usage: [0.0, 100.0, 12.5, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 99.75],
            timestamp: 1451606400000000000,
        }
    }

    #[test]
    fn test_write_row() {
        let mut buf = LineBuffer::new();
        buf.write_row(&sample_row());
        assert_eq!(
            buf.as_str(),
            "cpu,hostname=host_7,region=us-west-2,datacenter=us-west-2b,rack=42,\
             os=Ubuntu16.04LTS,arch=x64,team=LON,service=3,service_version=1,\
             service_environment=staging \
             usage_user=0,usage_system=100,usage_idle=12.5,usage_nice=1,\
             usage_iowait=2,usage_irq=3,usage_softirq=4,usage_steal=5,\
             usage_guest=6,usage_guest_nice=99.75 1451606400000000000\n"
        );
    }

    #[test]
    fn test_escape_tag() {
        let mut s = String::new();
        push_escaped_tag(&mut s, "a b,c=d");
        assert_eq!(s, "a\\ b\\,c\\=d");
    }

    #[test]
    fn test_write_rows_and_clear() {
        let rows = small_rowset(25);
        let mut buf = LineBuffer::with_capacity(4096);
        buf.write_rows(&rows);
        assert_eq!(buf.as_str().lines().count(), 25);
        assert!(buf.as_str().lines().all(|line| line.starts_with("cpu,hostname=host_")));

        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
    }
}
