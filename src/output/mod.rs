//! # Output Module
//!
//! Publishes mapping results to the host's output channel.
//!
//! This module handles:
//! - Opening the configured sink (stdout or an append-only file)
//! - Encoding drive commands as `hmi_signals` lines every frame
//! - Encoding the zero-pose `reset_heading` odometry on pose reset
//! - Flushing after every message so downstream readers see frames promptly

pub mod sink;

use chrono::Utc;
use tracing::{debug, info};

use crate::config::{OutputConfig, SinkKind};
use crate::error::{HmiAgentError, Result};
use crate::mapping::pipeline::{DriveCommand, MappingOutput};
use crate::messages::encoder::encode_line;
use crate::messages::odometry::Odometry;
use crate::messages::protocol::OutputMessage;
use sink::{OutputSink, WriterSink};

/// Encodes and writes output messages to a sink.
pub struct Publisher {
    sink: Box<dyn OutputSink>,
    odom_frame_id: String,
    child_frame_id: String,
    messages_sent: u64,
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("odom_frame_id", &self.odom_frame_id)
            .field("child_frame_id", &self.child_frame_id)
            .field("messages_sent", &self.messages_sent)
            .finish_non_exhaustive()
    }
}

impl Publisher {
    /// Wrap an already opened sink
    pub fn new(sink: Box<dyn OutputSink>, config: &OutputConfig) -> Self {
        Self {
            sink,
            odom_frame_id: config.odom_frame_id.clone(),
            child_frame_id: config.child_frame_id.clone(),
            messages_sent: 0,
        }
    }

    /// Open the sink named by the configuration
    ///
    /// # Errors
    ///
    /// Returns `Io` error if the output file cannot be opened
    pub async fn open(config: &OutputConfig) -> Result<Self> {
        let sink: Box<dyn OutputSink> = match config.sink {
            SinkKind::Stdout => {
                info!("Publishing to stdout");
                Box::new(WriterSink::stdout())
            }
            SinkKind::File => {
                let sink = WriterSink::append(&config.path).await?;
                info!("Publishing to {}", config.path);
                Box::new(sink)
            }
        };
        Ok(Self::new(sink, config))
    }

    /// Number of messages written so far
    pub fn messages_sent(&self) -> u64 {
        self.messages_sent
    }

    /// Publish a single message
    ///
    /// # Errors
    ///
    /// Returns `Output` error if writing or flushing the sink fails
    pub async fn publish(&mut self, message: &OutputMessage) -> Result<()> {
        let line = encode_line(message)?;

        self.sink.write_all(&line).await.map_err(|e| {
            HmiAgentError::Output(format!("Failed to write {}: {}", message.topic(), e))
        })?;

        self.sink
            .flush()
            .await
            .map_err(|e| HmiAgentError::Output(format!("Failed to flush sink: {}", e)))?;

        self.messages_sent += 1;
        debug!("Published {} ({} bytes)", message.topic(), line.len());
        Ok(())
    }

    /// Publish a drive command on `hmi_signals`
    pub async fn publish_command(&mut self, command: DriveCommand) -> Result<()> {
        self.publish(&OutputMessage::HmiSignals(command)).await
    }

    /// Publish the zero-pose template on `reset_heading`, stamped now
    pub async fn publish_reset(&mut self) -> Result<()> {
        let odom = Odometry::reset_template(Utc::now(), &self.odom_frame_id, &self.child_frame_id);
        info!("Publishing pose reset");
        self.publish(&OutputMessage::ResetHeading(odom)).await
    }

    /// Publish everything one frame produced
    ///
    /// The reset message goes out first so consumers reset before applying
    /// the frame's command.
    pub async fn publish_output(&mut self, output: &MappingOutput) -> Result<()> {
        if output.reset.is_some() {
            self.publish_reset().await?;
        }
        self.publish_command(output.command).await
    }
}
