//! Destinations for chunks of rows.
//!
//! A [ChunkSink] consumes the chunks of one worker lane, strictly in the order
//! they are given. A [SinkFactory] creates one sink per lane.

use std::path::Path;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use crate::error::Result;
use crate::ilp::LineBuffer;
use crate::row::Row;

/// Consumes the chunks assigned to one worker lane.
#[async_trait]
pub trait ChunkSink: Send {
    /// Ingests a single chunk, returning the number of bytes it produced.
    async fn send_chunk(&mut self, rows: &[Row]) -> Result<u64>;

    /// Called once after the last chunk of the lane was sent.
    async fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Creates a sink for each worker lane.
#[async_trait]
pub trait SinkFactory: Send + Sync {
    async fn create(&self, worker: usize) -> Result<Box<dyn ChunkSink>>;
}

/// Serializes chunks to ILP without sending them anywhere.
///
/// The buffer is cleared after each chunk, so memory usage stays bounded
/// by the size of the largest chunk.
pub struct SerializeSinkFactory;

struct SerializeSink {
    buf: LineBuffer,
}

#[async_trait]
impl SinkFactory for SerializeSinkFactory {
    async fn create(&self, _worker: usize) -> Result<Box<dyn ChunkSink>> {
        Ok(Box::new(SerializeSink {
            buf: LineBuffer::new(),
        }))
    }
}

#[async_trait]
impl ChunkSink for SerializeSink {
    async fn send_chunk(&mut self, rows: &[Row]) -> Result<u64> {
        self.buf.write_rows(rows);
        let size = self.buf.len() as u64;
        self.buf.clear();
        Ok(size)
    }
}

/// Sends chunks as ILP over a TCP connection, one connection per lane.
pub struct TcpSinkFactory {
    addr: String,
}

impl TcpSinkFactory {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            addr: format!("{host}:{port}"),
        }
    }
}

struct TcpSink {
    stream: TcpStream,
    buf: LineBuffer,
}

#[async_trait]
impl SinkFactory for TcpSinkFactory {
    async fn create(&self, worker: usize) -> Result<Box<dyn ChunkSink>> {
        let stream = connect(&self.addr).await?;
        debug!(worker, addr = %self.addr, "connected ILP sender");
        Ok(Box::new(TcpSink {
            stream,
            buf: LineBuffer::new(),
        }))
    }
}

#[async_trait]
impl ChunkSink for TcpSink {
    async fn send_chunk(&mut self, rows: &[Row]) -> Result<u64> {
        self.buf.write_rows(rows);
        self.stream.write_all(self.buf.as_bytes()).await?;
        self.stream.flush().await?;
        let size = self.buf.len() as u64;
        self.buf.clear();
        Ok(size)
    }

    async fn finish(&mut self) -> Result<()> {
        self.stream.flush().await?;
        self.stream.shutdown().await?;
        Ok(())
    }
}

async fn connect(addr: &str) -> Result<TcpStream> {
    let stream = TcpStream::connect(addr).await?;
    stream.set_nodelay(true)?;
    Ok(stream)
}

pub const DEFAULT_RAW_CHUNK_SIZE: usize = 64 * 1024;

/// Streams the contents of a prewritten ILP file to `host:port`,
/// in pieces of at most `chunk_size` bytes. Returns the number of bytes sent.
pub async fn send_raw_file(
    host: &str,
    port: u16,
    path: impl AsRef<Path>,
    chunk_size: usize,
) -> Result<u64> {
    crate::error::ensure_arg!(chunk_size > 0, "chunk size must be greater than zero");

    let mut file = tokio::fs::File::open(path.as_ref()).await?;
    let mut stream = connect(&format!("{host}:{port}")).await?;

    let mut piece = vec![0u8; chunk_size];
    let mut sent = 0u64;
    loop {
        let n = file.read(&mut piece).await?;
        if n == 0 {
            break;
        }
        stream.write_all(&piece[..n]).await?;
        sent += n as u64;
    }
    stream.flush().await?;
    stream.shutdown().await?;

    Ok(sent)
}
