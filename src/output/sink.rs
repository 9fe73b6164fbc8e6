//! Trait abstraction for output sink operations to enable testing

use async_trait::async_trait;
use std::io;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Trait for output sink I/O operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OutputSink: Send {
    /// Write all data to the sink
    async fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Flush buffered data
    async fn flush(&mut self) -> io::Result<()>;
}

/// Sink over any tokio writer (stdout, a file, a pipe)
pub struct WriterSink<W> {
    writer: W,
}

impl<W> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl WriterSink<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl WriterSink<tokio::fs::File> {
    /// Open a file for appending, creating it if needed
    pub async fn append(path: &str) -> io::Result<Self> {
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        Ok(Self::new(file))
    }
}

#[async_trait]
impl<W> OutputSink for WriterSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.writer.write_all(data).await
    }

    async fn flush(&mut self) -> io::Result<()> {
        self.writer.flush().await
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// In-memory sink that splits published output back into messages.
    ///
    /// Clones share the same buffer, so a test can keep one handle while the
    /// publisher owns another. Error paths use the generated `MockOutputSink`.
    #[derive(Clone, Default)]
    pub struct RecordingSink {
        buffer: Arc<Mutex<Vec<u8>>>,
        flushes: Arc<Mutex<usize>>,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            Self::default()
        }

        /// Every published line, without its newline.
        pub fn lines(&self) -> Vec<String> {
            let buffer = self.buffer.lock().unwrap();
            String::from_utf8_lossy(&buffer)
                .lines()
                .map(str::to_string)
                .collect()
        }

        /// Every published line decoded as JSON.
        pub fn messages(&self) -> Vec<serde_json::Value> {
            self.lines()
                .iter()
                .map(|line| serde_json::from_str(line).unwrap())
                .collect()
        }

        /// The `topic` field of every published message, in order.
        pub fn topics(&self) -> Vec<String> {
            self.messages()
                .iter()
                .map(|message| message["topic"].as_str().unwrap_or_default().to_string())
                .collect()
        }

        pub fn flush_count(&self) -> usize {
            *self.flushes.lock().unwrap()
        }
    }

    #[async_trait]
    impl OutputSink for RecordingSink {
        async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
            self.buffer.lock().unwrap().extend_from_slice(data);
            Ok(())
        }

        async fn flush(&mut self) -> io::Result<()> {
            *self.flushes.lock().unwrap() += 1;
            Ok(())
        }
    }
}
