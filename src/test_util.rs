use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::generator::generate;
use crate::row::{Row, RowSet};
use crate::sink::{ChunkSink, SinkFactory};
use crate::store::RowCounter;

pub fn small_rowset(rows: usize) -> RowSet {
    if rows == 0 {
        return RowSet::default();
    }
    generate(2016, rows, 10).unwrap()
}

#[derive(Default)]
struct Recorded {
    received: HashMap<usize, Vec<i64>>,
    finished: HashSet<usize>,
}

/// Remembers the timestamps of the rows received by each lane.
#[derive(Default)]
pub struct RecordingSinkFactory {
    recorded: Arc<Mutex<Recorded>>,
}

impl RecordingSinkFactory {
    pub fn received(&self, worker: usize) -> Vec<i64> {
        let recorded = self.recorded.lock().unwrap();
        recorded.received.get(&worker).cloned().unwrap_or_default()
    }

    pub fn finished(&self, worker: usize) -> bool {
        self.recorded.lock().unwrap().finished.contains(&worker)
    }
}

struct RecordingSink {
    worker: usize,
    recorded: Arc<Mutex<Recorded>>,
}

#[async_trait]
impl SinkFactory for RecordingSinkFactory {
    async fn create(&self, worker: usize) -> Result<Box<dyn ChunkSink>> {
        Ok(Box::new(RecordingSink {
            worker,
            recorded: Arc::clone(&self.recorded),
        }))
    }
}

#[async_trait]
impl ChunkSink for RecordingSink {
    async fn send_chunk(&mut self, rows: &[Row]) -> Result<u64> {
        let mut recorded = self.recorded.lock().unwrap();
        let lane = recorded.received.entry(self.worker).or_default();
        lane.extend(rows.iter().map(|row| row.timestamp));
        Ok(rows.len() as u64)
    }

    async fn finish(&mut self) -> Result<()> {
        self.recorded.lock().unwrap().finished.insert(self.worker);
        Ok(())
    }
}

/// Fails with a transport error on the n-th chunk of one worker.
pub struct FailingSinkFactory {
    pub failing_worker: usize,
    pub failing_chunk: usize,
}

struct FailingSink {
    fail_at: Option<usize>,
    sent: usize,
}

#[async_trait]
impl SinkFactory for FailingSinkFactory {
    async fn create(&self, worker: usize) -> Result<Box<dyn ChunkSink>> {
        let fail_at = (worker == self.failing_worker).then_some(self.failing_chunk);
        Ok(Box::new(FailingSink { fail_at, sent: 0 }))
    }
}

#[async_trait]
impl ChunkSink for FailingSink {
    async fn send_chunk(&mut self, rows: &[Row]) -> Result<u64> {
        if self.fail_at == Some(self.sent) {
            return Err(Error::transport("connection reset by peer"));
        }
        self.sent += 1;
        tokio::task::yield_now().await;
        Ok(rows.len() as u64)
    }
}

/// Returns the scripted counts in order, repeating the last one forever.
pub struct ScriptedCounter {
    counts: Mutex<VecDeque<u64>>,
    polls: Mutex<usize>,
}

impl ScriptedCounter {
    pub fn new(counts: &[u64]) -> Self {
        Self {
            counts: Mutex::new(counts.iter().copied().collect()),
            polls: Mutex::new(0),
        }
    }

    pub fn polls(&self) -> usize {
        *self.polls.lock().unwrap()
    }
}

#[async_trait]
impl RowCounter for ScriptedCounter {
    async fn row_count(&self) -> Result<u64> {
        *self.polls.lock().unwrap() += 1;
        let mut counts = self.counts.lock().unwrap();
        let count = if counts.len() > 1 {
            counts.pop_front()
        } else {
            counts.front().copied()
        };
        count.ok_or_else(|| Error::transport("no scripted count"))
    }
}
