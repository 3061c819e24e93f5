//! Record sinks
//!
//! The destination side of a sync. The engine hands over one page of records
//! at a time and commits the cursor only once `accept` returned `Ok`.

use crate::error::Result;
use crate::extract::ExtractedRecord;
use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Receives each page's records
#[async_trait]
pub trait RecordSink: Send {
    /// Accept one page of records
    async fn accept(&mut self, records: Vec<ExtractedRecord>) -> Result<()>;
}

/// Collects records in memory
#[derive(Debug, Clone, Default)]
pub struct VecSink {
    /// Every record accepted so far, in order
    pub records: Vec<ExtractedRecord>,
    /// Number of pages accepted
    pub pages: usize,
}

impl VecSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of the collected records
    pub fn ids(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.id.as_str()).collect()
    }
}

#[async_trait]
impl RecordSink for VecSink {
    async fn accept(&mut self, records: Vec<ExtractedRecord>) -> Result<()> {
        self.records.extend(records);
        self.pages += 1;
        Ok(())
    }
}

/// Writes each record as one JSON line, flushing after every page
#[derive(Debug)]
pub struct JsonLinesSink<W> {
    writer: W,
}

impl<W> JsonLinesSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W> RecordSink for JsonLinesSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn accept(&mut self, records: Vec<ExtractedRecord>) -> Result<()> {
        for record in &records {
            let mut line = serde_json::to_vec(record)?;
            line.push(b'\n');
            self.writer.write_all(&line).await?;
        }
        self.writer.flush().await?;
        Ok(())
    }
}
