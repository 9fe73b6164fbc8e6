//! # Evdev Joystick Source
//!
//! Reads a Linux joystick through evdev and turns its event stream into
//! [`RawInputFrame`]s.
//!
//! ## Channel Order
//!
//! Axis and button ids from the configuration index these tables:
//!
//! | Axis id | evdev Code | Range | | Button id | evdev Code |
//! |---------|------------|-------|-|-----------|------------|
//! | 0 | ABS_X | -1..1 | | 0 | BTN_SOUTH |
//! | 1 | ABS_Y | -1..1 | | 1 | BTN_EAST |
//! | 2 | ABS_Z | -1..1 | | 2 | BTN_NORTH |
//! | 3 | ABS_RX (L2) | 0..1 | | 3 | BTN_WEST |
//! | 4 | ABS_RY (R2) | 0..1 | | 4 | BTN_TL |
//! | 5 | ABS_RZ | -1..1 | | 5 | BTN_TR |
//! | 6 | ABS_HAT0X | -1/0/1 | | 6 | BTN_TL2 |
//! | 7 | ABS_HAT0Y | -1/0/1 | | 7 | BTN_TR2 |
//! | | | | 8 | BTN_SELECT |
//! | | | | 9 | BTN_START |
//! | | | | 10 | BTN_MODE |
//! | | | | 11 | BTN_THUMBL |
//! | | | | 12 | BTN_THUMBR |
//!
//! Stick axes are normalized from `[axis_min, axis_max]` to `[-1, 1]`.
//! Triggers rest at `axis_min`, so they map to `[0, 1]` and read 0 when
//! released. Hat axes already report -1/0/1 and pass through.

use evdev::{AbsoluteAxisType, Device, InputEvent, InputEventKind, Key};
use std::path::Path;
use std::thread::JoinHandle;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use super::HostInput;
use crate::config::InputConfig;
use crate::error::{HmiAgentError, Result};
use crate::mapping::frame::RawInputFrame;

/// Absolute axes in axis-id order.
pub const AXIS_CODES: [AbsoluteAxisType; 8] = [
    AbsoluteAxisType::ABS_X,
    AbsoluteAxisType::ABS_Y,
    AbsoluteAxisType::ABS_Z,
    AbsoluteAxisType::ABS_RX,
    AbsoluteAxisType::ABS_RY,
    AbsoluteAxisType::ABS_RZ,
    AbsoluteAxisType::ABS_HAT0X,
    AbsoluteAxisType::ABS_HAT0Y,
];

/// Buttons in button-id order.
pub const BUTTON_CODES: [Key; 13] = [
    Key::BTN_SOUTH,
    Key::BTN_EAST,
    Key::BTN_NORTH,
    Key::BTN_WEST,
    Key::BTN_TL,
    Key::BTN_TR,
    Key::BTN_TL2,
    Key::BTN_TR2,
    Key::BTN_SELECT,
    Key::BTN_START,
    Key::BTN_MODE,
    Key::BTN_THUMBL,
    Key::BTN_THUMBR,
];

/// Maps a raw reading in `[min, max]` to `[-1, 1]`.
///
/// # Examples
///
/// ```
/// use hmi_agent::input::evdev_source::normalize_axis;
///
/// assert_eq!(normalize_axis(0, 0, 255), -1.0);
/// assert_eq!(normalize_axis(255, 0, 255), 1.0);
/// assert!(normalize_axis(128, 0, 255).abs() < 0.01);
/// ```
#[must_use]
pub fn normalize_axis(raw: i32, min: i32, max: i32) -> f64 {
    let min = f64::from(min);
    let max = f64::from(max);
    if max <= min {
        return 0.0;
    }
    let center = (min + max) / 2.0;
    let half_range = (max - min) / 2.0;
    ((f64::from(raw) - center) / half_range).clamp(-1.0, 1.0)
}

/// Maps a raw trigger reading in `[min, max]` to `[0, 1]`.
///
/// # Examples
///
/// ```
/// use hmi_agent::input::evdev_source::normalize_trigger;
///
/// assert_eq!(normalize_trigger(0, 0, 255), 0.0);
/// assert_eq!(normalize_trigger(255, 0, 255), 1.0);
/// ```
#[must_use]
pub fn normalize_trigger(raw: i32, min: i32, max: i32) -> f64 {
    let min = f64::from(min);
    let max = f64::from(max);
    if max <= min {
        return 0.0;
    }
    ((f64::from(raw) - min) / (max - min)).clamp(0.0, 1.0)
}

fn is_trigger(axis: AbsoluteAxisType) -> bool {
    axis == AbsoluteAxisType::ABS_RX || axis == AbsoluteAxisType::ABS_RY
}

fn is_hat(axis: AbsoluteAxisType) -> bool {
    axis == AbsoluteAxisType::ABS_HAT0X || axis == AbsoluteAxisType::ABS_HAT0Y
}

/// Accumulates evdev events into the current frame.
///
/// Not thread-safe; owned by the reader thread.
#[derive(Debug, Clone)]
pub struct FrameAccumulator {
    frame: RawInputFrame,
    axis_min: i32,
    axis_max: i32,
}

impl FrameAccumulator {
    /// Creates an accumulator with all axes centered and buttons released.
    #[must_use]
    pub fn new(axis_min: i32, axis_max: i32) -> Self {
        Self {
            frame: RawInputFrame::new(vec![0.0; AXIS_CODES.len()], vec![false; BUTTON_CODES.len()]),
            axis_min,
            axis_max,
        }
    }

    #[must_use]
    pub fn frame(&self) -> &RawInputFrame {
        &self.frame
    }

    #[must_use]
    pub fn snapshot(&self) -> RawInputFrame {
        self.frame.clone()
    }

    /// Applies one event. Sync events and unmapped codes are ignored.
    pub fn process_event(&mut self, event: &InputEvent) {
        match event.kind() {
            InputEventKind::AbsAxis(axis) => self.process_axis_event(axis, event.value()),
            InputEventKind::Key(key) => self.process_key_event(key, event.value() != 0),
            _ => {}
        }
    }

    fn process_axis_event(&mut self, axis: AbsoluteAxisType, value: i32) {
        let Some(index) = AXIS_CODES.iter().position(|&code| code == axis) else {
            return;
        };
        let normalized = if is_hat(axis) {
            f64::from(value.clamp(-1, 1))
        } else if is_trigger(axis) {
            normalize_trigger(value, self.axis_min, self.axis_max)
        } else {
            normalize_axis(value, self.axis_min, self.axis_max)
        };
        self.frame.axes_mut()[index] = normalized;
    }

    fn process_key_event(&mut self, key: Key, pressed: bool) {
        if let Some(index) = BUTTON_CODES.iter().position(|&code| code == key) {
            self.frame.buttons_mut()[index] = pressed;
        }
    }
}

/// An opened evdev joystick.
pub struct JoystickDevice {
    device: Device,
    device_path: String,
}

impl std::fmt::Debug for JoystickDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoystickDevice")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl JoystickDevice {
    /// Opens the device at `path`.
    ///
    /// # Errors
    ///
    /// Returns `Input` error if the device cannot be opened.
    pub fn open_path(path: &str) -> Result<Self> {
        let device = Device::open(path)
            .map_err(|e| HmiAgentError::Input(format!("Failed to open {}: {}", path, e)))?;
        info!("Opened joystick {:?} at {}", device.name().unwrap_or("unknown"), path);
        Ok(Self {
            device,
            device_path: path.to_string(),
        })
    }

    /// Opens the first `/dev/input/event*` device that reports joystick axes.
    ///
    /// # Errors
    ///
    /// - `DeviceNotFound`: no matching device
    /// - `Input`: `/dev/input` could not be read
    pub fn detect() -> Result<Self> {
        let input_dir = Path::new("/dev/input");

        let mut entries: Vec<_> = std::fs::read_dir(input_dir)
            .map_err(|e| HmiAgentError::Input(format!("Failed to read /dev/input: {}", e)))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .map_or(false, |name| name.to_string_lossy().starts_with("event"))
            })
            .collect();

        // Deterministic choice when several joysticks are plugged in
        entries.sort();

        for path in entries {
            match Device::open(&path) {
                Ok(device) => {
                    let has_sticks = device
                        .supported_absolute_axes()
                        .map_or(false, |axes| axes.contains(AbsoluteAxisType::ABS_X));
                    let has_buttons = device
                        .supported_keys()
                        .map_or(false, |keys| keys.contains(Key::BTN_SOUTH));

                    debug!(
                        "Found input device: {} ({:?}, sticks: {}, buttons: {})",
                        path.display(),
                        device.name(),
                        has_sticks,
                        has_buttons
                    );

                    if has_sticks && has_buttons {
                        let device_path = path.to_string_lossy().to_string();
                        info!("Found joystick at: {}", device_path);
                        return Ok(Self { device, device_path });
                    }
                }
                Err(e) => {
                    debug!("Could not open {}: {}", path.display(), e);
                }
            }
        }

        Err(HmiAgentError::DeviceNotFound)
    }

    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Number of axes this source provides.
    pub fn axis_count(&self) -> usize {
        AXIS_CODES.len()
    }

    /// Number of buttons this source provides.
    pub fn button_count(&self) -> usize {
        BUTTON_CODES.len()
    }

    /// Reads events on a dedicated thread until the device fails or the
    /// control loop goes away. One frame is sent per event batch.
    pub fn spawn_reader(
        mut self,
        config: &InputConfig,
        tx: mpsc::Sender<HostInput>,
    ) -> std::io::Result<JoinHandle<Result<()>>> {
        let mut accumulator = FrameAccumulator::new(config.axis_min, config.axis_max);

        std::thread::Builder::new()
            .name("evdev-reader".to_string())
            .spawn(move || loop {
                let events = match self.device.fetch_events() {
                    Ok(events) => events,
                    Err(e) => {
                        error!("Joystick {} read failed: {}", self.device_path, e);
                        return Err(HmiAgentError::Input(format!("Failed to fetch events: {}", e)));
                    }
                };
                for event in events {
                    accumulator.process_event(&event);
                }

                if tx.blocking_send(HostInput::Frame(accumulator.snapshot())).is_err() {
                    debug!("Control loop closed, stopping joystick reader");
                    return Ok(());
                }
            })
    }
}

/// Opens the configured (or auto-detected) joystick.
pub fn open(config: &InputConfig) -> Result<JoystickDevice> {
    if config.device_path.is_empty() {
        JoystickDevice::detect()
    } else {
        JoystickDevice::open_path(&config.device_path)
    }
}
