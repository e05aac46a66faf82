use std::fmt;
use std::ops::{Index, Range};

use crate::schema::USAGE_COLUMNS;

pub const USAGE_COLUMN_COUNT: usize = USAGE_COLUMNS.len();

/// A single measurement of the `cpu` table.
///
/// The hostname is kept as an index into the `host_<i>` label space;
/// the other symbols point into the fixed pools from [crate::schema].
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub host: usize,
    pub region: &'static str,
    pub datacenter: &'static str,
    pub rack: &'static str,
    pub os: &'static str,
    pub arch: &'static str,
    pub team: &'static str,
    pub service: &'static str,
    pub service_version: &'static str,
    pub service_environment: &'static str,
    /// Values of the usage columns, in schema order. Always within `[0, 100]`.
    pub usage: [f64; USAGE_COLUMN_COUNT],
    /// Nanoseconds since the Unix epoch.
    pub timestamp: i64,
}

impl Row {
    pub fn hostname(&self) -> Hostname {
        Hostname(self.host)
    }

    /// Returns the symbol values in schema order, except for the hostname.
    pub fn pooled_symbols(&self) -> [&'static str; 9] {
        [
            self.region,
            self.datacenter,
            self.rack,
            self.os,
            self.arch,
            self.team,
            self.service,
            self.service_version,
            self.service_environment,
        ]
    }
}

/// Displays as `host_<i>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Hostname(pub usize);

impl fmt::Display for Hostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "host_{}", self.0)
    }
}

/// An immutable, ordered collection of generated rows.
///
/// Positions are stable and reflect the generation order. Chunks and
/// worker plans refer to rows by position and never copy them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RowSet {
    rows: Vec<Row>,
}

impl RowSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Returns the rows in `range`.
    ///
    /// Panics if the range is out of bounds, like slice indexing does.
    pub fn slice(&self, range: Range<usize>) -> &[Row] {
        &self.rows[range]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }
}

impl From<Vec<Row>> for RowSet {
    fn from(rows: Vec<Row>) -> Self {
        Self { rows }
    }
}

impl Index<usize> for RowSet {
    type Output = Row;

    fn index(&self, index: usize) -> &Row {
        &self.rows[index]
    }
}

impl<'a> IntoIterator for &'a RowSet {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
