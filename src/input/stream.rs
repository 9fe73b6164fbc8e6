//! # Stream Input Source
//!
//! Reads JSON Lines input messages (see [`crate::messages::protocol`]) and
//! forwards the drive joystick's frames to the control loop.
//!
//! Malformed lines are logged and skipped: one bad line never stops input.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::HostInput;
use crate::config::InputConfig;
use crate::error::{HmiAgentError, Result};
use crate::mapping::frame::RawInputFrame;
use crate::messages::decoder::decode_line;
use crate::messages::protocol::InputMessage;

/// Counters reported when a stream ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub lines: u64,
    pub frames: u64,
    pub skipped: u64,
}

/// Turns decoded messages into [`HostInput`]s.
#[derive(Debug, Clone)]
pub struct StreamSource {
    drive_joystick_index: usize,
    missing_joystick_warned: bool,
}

impl StreamSource {
    pub fn new(drive_joystick_index: usize) -> Self {
        Self {
            drive_joystick_index,
            missing_joystick_warned: false,
        }
    }

    /// Converts one message. A status without the drive joystick yields a
    /// neutral frame.
    pub fn convert(&mut self, message: InputMessage) -> HostInput {
        match message {
            InputMessage::JoystickStatus(status) => {
                let frame = match status.joystick(self.drive_joystick_index) {
                    Some(frame) => {
                        self.missing_joystick_warned = false;
                        frame.clone()
                    }
                    None => {
                        if !self.missing_joystick_warned {
                            warn!(
                                "Joystick {} missing from status, using neutral input",
                                self.drive_joystick_index
                            );
                            self.missing_joystick_warned = true;
                        }
                        RawInputFrame::neutral()
                    }
                };
                HostInput::Frame(frame)
            }
            InputMessage::RobotStatus(status) => HostInput::RobotMode(status.robot_state),
        }
    }

    /// Reads `reader` to the end, forwarding every input to `tx`.
    ///
    /// Stops early, without error, if the receiving side is dropped.
    ///
    /// # Errors
    ///
    /// Returns `Io` error if reading fails.
    pub async fn run<R>(mut self, reader: R, tx: mpsc::Sender<HostInput>) -> Result<StreamStats>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut stats = StreamStats::default();
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            stats.lines += 1;

            let message = match decode_line(&line) {
                Ok(Some(message)) => message,
                Ok(None) => continue,
                Err(e) => {
                    stats.skipped += 1;
                    warn!("Skipping input line {}: {}", stats.lines, e);
                    continue;
                }
            };

            let input = self.convert(message);
            if matches!(input, HostInput::Frame(_)) {
                stats.frames += 1;
            }

            if tx.send(input).await.is_err() {
                debug!("Control loop closed, stopping stream input");
                break;
            }
        }

        info!(
            "Input stream ended: {} lines, {} frames, {} skipped",
            stats.lines, stats.frames, stats.skipped
        );
        Ok(stats)
    }
}

/// Spawns a task reading stdin, or the configured stream file.
///
/// # Errors
///
/// Returns `Input` error if the stream file cannot be opened.
pub async fn spawn(
    config: &InputConfig,
    tx: mpsc::Sender<HostInput>,
) -> Result<JoinHandle<Result<StreamStats>>> {
    let source = StreamSource::new(config.drive_joystick_index);

    if config.stream_path.is_empty() {
        info!("Reading input messages from stdin");
        let reader = BufReader::new(tokio::io::stdin());
        return Ok(tokio::spawn(source.run(reader, tx)));
    }

    let file = tokio::fs::File::open(&config.stream_path).await.map_err(|e| {
        HmiAgentError::Input(format!("Failed to open {}: {}", config.stream_path, e))
    })?;
    info!("Reading input messages from {}", config.stream_path);
    Ok(tokio::spawn(source.run(BufReader::new(file), tx)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::INPUT_QUEUE_CAPACITY;
    use crate::mapping::frame::AxisId;
    use crate::mapping::pipeline::RobotMode;
    use crate::messages::protocol::{JoystickStatus, RobotStatus};

    async fn run_lines(index: usize, input: &str) -> (StreamStats, Vec<HostInput>) {
        let (tx, mut rx) = mpsc::channel(INPUT_QUEUE_CAPACITY);
        let stats = StreamSource::new(index)
            .run(input.as_bytes(), tx)
            .await
            .unwrap();

        let mut received = Vec::new();
        while let Some(item) = rx.recv().await {
            received.push(item);
        }
        (stats, received)
    }

    #[test]
    fn test_convert_selects_drive_joystick() {
        let mut source = StreamSource::new(1);
        let status = JoystickStatus {
            joysticks: vec![
                RawInputFrame::new(vec![0.1], vec![]),
                RawInputFrame::new(vec![0.9], vec![]),
            ],
        };
        match source.convert(InputMessage::JoystickStatus(status)) {
            HostInput::Frame(frame) => assert_eq!(frame.axis(AxisId::new(0)), 0.9),
            other => panic!("Expected Frame, got: {:?}", other),
        }
    }

    #[test]
    fn test_convert_missing_joystick_is_neutral() {
        let mut source = StreamSource::new(3);
        let input = source.convert(InputMessage::JoystickStatus(JoystickStatus::default()));
        assert_eq!(input, HostInput::Frame(RawInputFrame::neutral()));
    }

    #[test]
    fn test_convert_robot_status() {
        let mut source = StreamSource::new(0);
        let input = source.convert(InputMessage::RobotStatus(RobotStatus {
            robot_state: RobotMode::Autonomous,
        }));
        assert_eq!(input, HostInput::RobotMode(RobotMode::Autonomous));
    }

    #[tokio::test]
    async fn test_run_forwards_frames_in_order() {
        let input = concat!(
            r#"{"type":"robot_status","robot_state":"teleop"}"#, "\n",
            r#"{"type":"joystick_status","joysticks":[{"axes":[0.25]}]}"#, "\n",
            r#"{"type":"joystick_status","joysticks":[{"axes":[0.5]}]}"#, "\n",
        );
        let (stats, received) = run_lines(0, input).await;

        assert_eq!(stats.lines, 3);
        assert_eq!(stats.frames, 2);
        assert_eq!(stats.skipped, 0);
        assert_eq!(received.len(), 3);
        assert_eq!(received[0], HostInput::RobotMode(RobotMode::Teleop));
        assert_eq!(
            received[2],
            HostInput::Frame(RawInputFrame::new(vec![0.5], vec![]))
        );
    }

    #[tokio::test]
    async fn test_run_skips_malformed_and_blank_lines() {
        let input = concat!(
            "\n",
            "# header comment\n",
            "not json at all\n",
            r#"{"type":"joystick_status","joysticks":[{"axes":[0.25]}]}"#, "\n",
            r#"{"type":"mystery"}"#, "\n",
        );
        let (stats, received) = run_lines(0, input).await;

        assert_eq!(stats.lines, 5);
        assert_eq!(stats.frames, 1);
        assert_eq!(stats.skipped, 2);
        assert_eq!(received.len(), 1);
    }

    #[tokio::test]
    async fn test_run_stops_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let input = r#"{"type":"joystick_status","joysticks":[]}"#;
        let stats = StreamSource::new(0).run(input.as_bytes(), tx).await.unwrap();
        assert_eq!(stats.frames, 1);
    }

    #[tokio::test]
    async fn test_spawn_missing_file() {
        let config = InputConfig {
            stream_path: "/nonexistent/input.jsonl".to_string(),
            ..InputConfig::default()
        };
        let (tx, _rx) = mpsc::channel(1);
        let result = spawn(&config, tx).await;
        assert!(matches!(result, Err(HmiAgentError::Input(_))));
    }

    #[tokio::test]
    async fn test_spawn_reads_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"type":"joystick_status","joysticks":[{{"buttons":[true]}}]}}"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = InputConfig {
            stream_path: file.path().to_str().unwrap().to_string(),
            ..InputConfig::default()
        };
        let (tx, mut rx) = mpsc::channel(4);
        let handle = spawn(&config, tx).await.unwrap();

        let stats = handle.await.unwrap().unwrap();
        assert_eq!(stats.frames, 1);
        assert!(matches!(rx.recv().await, Some(HostInput::Frame(_))));
    }

    #[tokio::test]
    async fn test_run_read_error_is_reported() {
        let reader = tokio_test::io::Builder::new()
            .read(b"{\"type\":\"joystick_status\",\"joysticks\":[]}\n")
            .read_error(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "unplugged"))
            .build();
        let (tx, mut rx) = mpsc::channel(4);

        let result = StreamSource::new(0).run(BufReader::new(reader), tx).await;
        assert!(matches!(result, Err(HmiAgentError::Io(_))));
        assert!(matches!(rx.recv().await, Some(HostInput::Frame(_))));
    }
}
