//! # Reset Event Detector
//!
//! Rising-edge detector for the pose-reset button. A held button produces a
//! single [`PoseResetEvent`]; releasing it produces nothing.

use tracing::debug;

/// One-shot request to reset the robot's pose estimate.
///
/// Carries no data: the host publishes a fixed zero-pose template for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PoseResetEvent;

/// Tracks the previous button state to find rising edges.
#[derive(Debug, Clone, Default)]
pub struct ResetEventDetector {
    previous: bool,
}

impl ResetEventDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one frame's button state.
    ///
    /// The latch is updated on every call, whether or not an event fires.
    ///
    /// # Examples
    ///
    /// ```
    /// use hmi_agent::mapping::reset::ResetEventDetector;
    ///
    /// let mut detector = ResetEventDetector::new();
    /// assert!(detector.update(true).is_some());
    /// assert!(detector.update(true).is_none());
    /// assert!(detector.update(false).is_none());
    /// ```
    pub fn update(&mut self, pressed: bool) -> Option<PoseResetEvent> {
        let rising = pressed && !self.previous;
        self.previous = pressed;

        if rising {
            debug!("Pose reset button pressed");
            Some(PoseResetEvent)
        } else {
            None
        }
    }
}
