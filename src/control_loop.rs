//! # Control Loop
//!
//! Single consumer of the input queue. Every mapping call happens here, one
//! frame at a time, so the pipeline's carried state never needs a lock.
//!
//! ## Per-iteration behavior
//!
//! - **Frame**: map it and publish the command (plus the reset odometry on a
//!   reset-button rising edge).
//! - **Robot mode**: record it on the pipeline.
//! - **No frame within `stale_timeout_ms`**: feed the pipeline a neutral
//!   frame (`zero`) or the last frame again (`hold`), once per timeout.
//! - **Input closed or shutdown signal**: stop and report counters.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Duration, Instant};
use tracing::{info, warn};

use crate::config::{Config, StalePolicy};
use crate::input::HostInput;
use crate::mapping::frame::RawInputFrame;
use crate::mapping::pipeline::InputMappingPipeline;
use crate::output::Publisher;

/// Number of frames between status log messages
const LOG_INTERVAL_FRAMES: u64 = 500;

/// Counters reported at shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Frames mapped, including stale substitutes
    pub frames: u64,
    /// Frames substituted because input went stale
    pub stale_frames: u64,
    /// Pose reset events published
    pub resets: u64,
    /// Messages that could not be written
    pub publish_errors: u64,
}

/// Owns the pipeline state and the publisher for one robot.
#[derive(Debug)]
pub struct ControlLoop {
    pipeline: InputMappingPipeline,
    publisher: Publisher,
    stale_timeout: Duration,
    stale_policy: StalePolicy,
    last_frame: RawInputFrame,
    stale: bool,
    stats: LoopStats,
    last_log_frames: u64,
}

impl ControlLoop {
    pub fn new(config: &Config, publisher: Publisher) -> Self {
        Self {
            pipeline: InputMappingPipeline::new(Arc::new(config.drive.clone())),
            publisher,
            stale_timeout: Duration::from_millis(config.input.stale_timeout_ms),
            stale_policy: config.input.stale_policy,
            last_frame: RawInputFrame::neutral(),
            stale: false,
            stats: LoopStats::default(),
            last_log_frames: 0,
        }
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    pub fn pipeline(&self) -> &InputMappingPipeline {
        &self.pipeline
    }

    /// Handles one input from the queue.
    pub async fn handle_input(&mut self, input: HostInput) {
        match input {
            HostInput::Frame(frame) => {
                if self.stale {
                    info!("Input resumed");
                    self.stale = false;
                }
                self.process_frame(&frame).await;
                self.last_frame = frame;
            }
            HostInput::RobotMode(mode) => self.pipeline.set_robot_mode(mode),
        }
    }

    /// Substitutes a frame because nothing arrived within the timeout.
    pub async fn handle_stale(&mut self) {
        if !self.stale {
            warn!(
                "No input for {}ms, applying {:?} policy",
                self.stale_timeout.as_millis(),
                self.stale_policy
            );
            self.stale = true;
        }

        let frame = match self.stale_policy {
            StalePolicy::Zero => self.zeroed_frame(),
            StalePolicy::Hold => self.last_frame.clone(),
        };

        self.stats.stale_frames += 1;
        self.process_frame(&frame).await;
    }

    /// Stand-in for the `zero` policy: axes centered, buttons released,
    /// except the reset button, which keeps its last real state so a press
    /// held across an input gap is not seen as a second edge.
    fn zeroed_frame(&self) -> RawInputFrame {
        let mut frame = RawInputFrame::new(
            vec![0.0; self.last_frame.axis_count()],
            vec![false; self.last_frame.button_count()],
        );

        let reset_id = self.pipeline.config().reset_odometry_button_id;
        if let Some(pressed) = reset_id
            .index()
            .and_then(|index| frame.buttons_mut().get_mut(index))
        {
            *pressed = self.last_frame.button(reset_id);
        }
        frame
    }

    async fn process_frame(&mut self, frame: &RawInputFrame) {
        let output = self.pipeline.process(frame);

        self.stats.frames += 1;
        if output.reset.is_some() {
            self.stats.resets += 1;
        }

        if let Err(e) = self.publisher.publish_output(&output).await {
            self.stats.publish_errors += 1;
            warn!("Failed to publish frame {}: {}", self.stats.frames, e);
        }

        // Log status every LOG_INTERVAL_FRAMES
        if self.stats.frames - self.last_log_frames >= LOG_INTERVAL_FRAMES {
            info!(
                "Mapped {} frames ({} stale, {} resets, mode {:?}, robot {:?})",
                self.stats.frames,
                self.stats.stale_frames,
                self.stats.resets,
                self.pipeline.orientation_mode(),
                self.pipeline.robot_mode()
            );
            self.last_log_frames = self.stats.frames;
        }
    }

    /// Runs until the input queue closes or `shutdown` completes.
    pub async fn run<F>(mut self, mut rx: mpsc::Receiver<HostInput>, shutdown: F) -> LoopStats
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut deadline = Instant::now() + self.stale_timeout;

        info!("Control loop started (stale timeout {}ms)", self.stale_timeout.as_millis());

        loop {
            tokio::select! {
                maybe_input = rx.recv() => {
                    match maybe_input {
                        Some(input) => {
                            if matches!(input, HostInput::Frame(_)) {
                                deadline = Instant::now() + self.stale_timeout;
                            }
                            self.handle_input(input).await;
                        }
                        None => {
                            info!("Input closed, stopping control loop");
                            break;
                        }
                    }
                }

                _ = sleep_until(deadline) => {
                    self.handle_stale().await;
                    deadline = Instant::now() + self.stale_timeout;
                }

                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping control loop");
                    break;
                }
            }
        }

        info!(
            "Total frames mapped: {} ({} stale, {} resets, {} messages sent, {} publish errors)",
            self.stats.frames,
            self.stats.stale_frames,
            self.stats.resets,
            self.publisher.messages_sent(),
            self.stats.publish_errors
        );
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MappingConfig, OutputConfig};
    use crate::mapping::frame::{AxisId, ButtonId};
    use crate::mapping::orientation::OrientationMode;
    use crate::mapping::pipeline::RobotMode;
    use crate::output::sink::mocks::RecordingSink;
    use crate::output::sink::MockOutputSink;

    fn test_config(policy: StalePolicy) -> Config {
        let mut config = Config::default();
        config.drive = MappingConfig {
            drive_fwd_back_axis_id: AxisId::new(1),
            drive_fwd_back_axis_inverted: true,
            drive_left_right_axis_id: AxisId::new(0),
            drive_z_axis_id: AxisId::new(2),
            robot_orient_button_id: ButtonId::new(0),
            reset_odometry_button_id: ButtonId::new(1),
            ..MappingConfig::default()
        };
        config.input.stale_timeout_ms = 100;
        config.input.stale_policy = policy;
        config
    }

    fn control_loop(policy: StalePolicy) -> (ControlLoop, RecordingSink) {
        let sink = RecordingSink::new();
        let publisher = Publisher::new(Box::new(sink.clone()), &OutputConfig::default());
        (ControlLoop::new(&test_config(policy), publisher), sink)
    }

    fn frame(axes: [f64; 3], robot_orient: bool, reset: bool) -> HostInput {
        HostInput::Frame(RawInputFrame::new(axes.to_vec(), vec![robot_orient, reset]))
    }

    #[tokio::test]
    async fn test_frame_publishes_command() {
        let (mut control, sink) = control_loop(StalePolicy::Zero);
        control.handle_input(frame([0.6, -0.6, 0.0], false, false)).await;

        let written = sink.messages();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0]["topic"], "hmi_signals");
        assert!((written[0]["drivetrain_fwd_back"].as_f64().unwrap() - 0.6).abs() < 1e-9);
        assert_eq!(control.stats().frames, 1);
    }

    #[tokio::test]
    async fn test_reset_published_once_per_press() {
        let (mut control, sink) = control_loop(StalePolicy::Zero);
        for reset in [false, true, true, false, true] {
            control.handle_input(frame([0.0; 3], false, reset)).await;
        }

        let resets = sink.topics().iter().filter(|t| *t == "reset_heading").count();
        assert_eq!(resets, 2);
        assert_eq!(control.stats().resets, 2);
        assert_eq!(control.stats().frames, 5);
    }

    #[tokio::test]
    async fn test_robot_mode_recorded() {
        let (mut control, sink) = control_loop(StalePolicy::Zero);
        control.handle_input(HostInput::RobotMode(RobotMode::Autonomous)).await;
        assert!(control.pipeline().is_autonomous());
        assert!(sink.lines().is_empty());
    }

    #[tokio::test]
    async fn test_stale_zero_policy_feeds_neutral_frame() {
        let (mut control, sink) = control_loop(StalePolicy::Zero);
        control.handle_input(frame([0.8, 0.0, 0.0], false, false)).await;
        control.handle_stale().await;

        let written = sink.messages();
        assert_eq!(written.len(), 2);
        assert_eq!(written[1]["drivetrain_left_right"], 0.0);
        assert_eq!(control.stats().stale_frames, 1);
    }

    #[tokio::test]
    async fn test_stale_hold_policy_repeats_last_frame() {
        let (mut control, sink) = control_loop(StalePolicy::Hold);
        control.handle_input(frame([0.8, 0.0, 0.0], false, true)).await;
        control.handle_stale().await;

        let written = sink.messages();
        // reset + command, then only a command: holding the button is not a new edge
        assert_eq!(sink.topics(), vec!["reset_heading", "hmi_signals", "hmi_signals"]);
        assert_eq!(written[2]["drivetrain_left_right"], 0.8);
    }

    #[tokio::test]
    async fn test_orientation_survives_stale_input() {
        let (mut control, _sink) = control_loop(StalePolicy::Zero);
        control.handle_input(frame([0.0; 3], true, false)).await;
        control.handle_stale().await;
        assert_eq!(control.pipeline().orientation_mode(), OrientationMode::RobotRelative);
    }

    #[tokio::test]
    async fn test_publish_errors_do_not_stop_mapping() {
        let mut sink = MockOutputSink::new();
        sink.expect_write_all()
            .times(2)
            .returning(|_| Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed")));
        let publisher = Publisher::new(Box::new(sink), &OutputConfig::default());
        let mut control = ControlLoop::new(&test_config(StalePolicy::Zero), publisher);

        control.handle_input(frame([0.5, 0.0, 0.0], false, false)).await;
        control.handle_input(frame([0.5, 0.0, 0.0], false, false)).await;

        assert_eq!(control.stats().frames, 2);
        assert_eq!(control.stats().publish_errors, 2);
    }

    #[tokio::test]
    async fn test_reset_held_through_zero_stale_gap_fires_once() {
        let (mut control, sink) = control_loop(StalePolicy::Zero);
        control.handle_input(frame([0.4, 0.0, 0.0], false, true)).await;
        control.handle_stale().await;
        control.handle_stale().await;
        control.handle_input(frame([0.4, 0.0, 0.0], false, true)).await;

        let resets = sink.topics().iter().filter(|t| *t == "reset_heading").count();
        assert_eq!(resets, 1);
        assert_eq!(control.stats().resets, 1);
    }

    #[tokio::test]
    async fn test_reset_released_during_gap_then_pressed_fires_again() {
        let (mut control, _sink) = control_loop(StalePolicy::Zero);
        control.handle_input(frame([0.0; 3], false, true)).await;
        control.handle_input(frame([0.0; 3], false, false)).await;
        control.handle_stale().await;
        control.handle_input(frame([0.0; 3], false, true)).await;

        assert_eq!(control.stats().resets, 2);
    }

    #[test]
    fn test_zeroed_frame_keeps_only_reset_button() {
        let (mut control, _sink) = control_loop(StalePolicy::Zero);
        control.last_frame = RawInputFrame::new(vec![0.9, -0.9, 0.5], vec![true, true]);

        let stand_in = control.zeroed_frame();
        assert_eq!(stand_in.axis_count(), 3);
        assert_eq!(stand_in.axis(AxisId::new(0)), 0.0);
        assert_eq!(stand_in.axis(AxisId::new(2)), 0.0);
        assert!(!stand_in.button(ButtonId::new(0)));
        assert!(stand_in.button(ButtonId::new(1)));
    }

    #[tokio::test]
    async fn test_run_stops_when_input_closes() {
        let (control, sink) = control_loop(StalePolicy::Zero);
        let (tx, rx) = mpsc::channel(8);

        tx.send(frame([0.1, 0.2, 0.3], false, false)).await.unwrap();
        tx.send(frame([0.0; 3], false, true)).await.unwrap();
        drop(tx);

        let stats = control.run(rx, std::future::pending()).await;
        assert_eq!(stats.frames, 2);
        assert_eq!(stats.resets, 1);
        assert_eq!(sink.lines().len(), 3);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let (control, _sink) = control_loop(StalePolicy::Zero);
        let (_tx, rx) = mpsc::channel::<HostInput>(8);

        let stats = control.run(rx, async {}).await;
        assert_eq!(stats.frames, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_substitutes_frames_when_stale() {
        let (control, sink) = control_loop(StalePolicy::Zero);
        let (tx, rx) = mpsc::channel(8);

        let shutdown = tokio::time::sleep(Duration::from_millis(350));
        tx.send(frame([0.5, 0.0, 0.0], false, false)).await.unwrap();

        let stats = control.run(rx, shutdown).await;
        drop(tx);

        // one real frame, then a substitute at 100ms, 200ms and 300ms
        assert_eq!(stats.stale_frames, 3);
        assert_eq!(stats.frames, 4);
        assert_eq!(sink.lines().len(), 4);
    }
}
