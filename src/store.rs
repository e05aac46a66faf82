//! Helpers for the QuestDB HTTP interface: managing the `cpu` table and
//! waiting until the ingested rows become visible.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::schema::{create_table_sql, TABLE_NAME};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Anything that can report how many rows the target table holds.
#[async_trait]
pub trait RowCounter: Send + Sync {
    async fn row_count(&self) -> Result<u64>;
}

/// Polls `counter` until it reports exactly `target` rows.
///
/// Fails with [Error::OverTarget] as soon as more rows than expected are
/// observed, and with [Error::Timeout] once `timeout` has elapsed without
/// reaching the target. Neither of them should be retried: both mean that
/// rows were lost or ingested twice.
pub async fn block_until_count<C>(
    counter: &C,
    target: u64,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<()>
where
    C: RowCounter + ?Sized,
{
    let start_time = Instant::now();
    loop {
        let count = counter.row_count().await?;
        if count == target {
            info!(count, elapsed = ?start_time.elapsed(), "row count reached");
            return Ok(());
        }
        if count > target {
            return Err(Error::OverTarget {
                target,
                observed: count,
            });
        }

        let waited = start_time.elapsed();
        if waited > timeout {
            return Err(Error::Timeout {
                target,
                last_seen: count,
                waited,
            });
        }

        debug!(count, target, "waiting for the row count to reach the target");
        tokio::time::sleep(poll_interval).await;
    }
}

/// Response of the `/exec` endpoint. Only the fields used here are decoded.
#[derive(Debug, Default, Deserialize)]
struct ExecResponse {
    ddl: Option<String>,
    error: Option<String>,
    #[serde(default)]
    dataset: Vec<Vec<serde_json::Value>>,
}

impl ExecResponse {
    fn is_ddl_ok(&self) -> bool {
        self.ddl.as_deref() == Some("OK")
    }

    // Returns whether the table was dropped, or false if it did not exist
    fn into_drop_result(self) -> Result<bool> {
        if self.is_ddl_ok() {
            return Ok(true);
        }
        match &self.error {
            Some(err) if err.starts_with("table does not exist") => Ok(false),
            _ => Err(Error::transport(format!(
                "Failed to drop table {TABLE_NAME}: {self:?}"
            ))),
        }
    }

    fn into_create_result(self) -> Result<()> {
        if self.is_ddl_ok() {
            return Ok(());
        }
        Err(Error::transport(format!(
            "Failed to create table {TABLE_NAME}: {self:?}"
        )))
    }

    fn into_count(self) -> Result<u64> {
        if let Some(err) = self.error {
            return Err(Error::transport(format!("Failed to count rows: {err}")));
        }
        self.dataset
            .first()
            .and_then(|row| row.first())
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| {
                Error::transport(format!("Unexpected row count response: {:?}", self.dataset))
            })
    }
}

/// Manages the benchmark's `cpu` table through QuestDB's HTTP query endpoint.
pub struct CpuTable {
    client: reqwest::Client,
    exec_url: String,
    request_timeout: Duration,
}

impl CpuTable {
    pub fn new(host: &str, port: u16) -> Self {
        Self::with_client(reqwest::Client::new(), host, port)
    }

    pub fn with_client(client: reqwest::Client, host: &str, port: u16) -> Self {
        Self {
            client,
            exec_url: format!("http://{host}:{port}/exec"),
            request_timeout: REQUEST_TIMEOUT,
        }
    }

    /// Overrides the timeout of a single HTTP request (30s by default).
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    async fn request(&self, sql: &str) -> Result<ExecResponse> {
        debug!(sql, "executing query");
        let response = self
            .client
            .get(&self.exec_url)
            .query(&[("query", sql)])
            .timeout(self.request_timeout)
            .send()
            .await?;

        // Errors come back with a non-2xx status and a JSON body explaining
        // them, so the body is decoded regardless of the status.
        let status = response.status();
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|err| {
            Error::transport(format!(
                "Failed to parse response (status {status}): {err}"
            ))
        })
    }

    /// Drops the table. Returns false if there was no table to drop.
    pub async fn drop_table(&self) -> Result<bool> {
        let dropped = self
            .request(&format!("drop table {TABLE_NAME}"))
            .await?
            .into_drop_result()?;
        if dropped {
            info!("Dropped table {TABLE_NAME}");
        } else {
            info!("Table {TABLE_NAME} does not exist");
        }
        Ok(dropped)
    }

    pub async fn create_table(&self) -> Result<()> {
        self.request(&create_table_sql())
            .await?
            .into_create_result()?;
        info!("Created table {TABLE_NAME}");
        Ok(())
    }
}

#[async_trait]
impl RowCounter for CpuTable {
    async fn row_count(&self) -> Result<u64> {
        self.request(&format!("select count(*) from {TABLE_NAME}"))
            .await?
            .into_count()
    }
}
