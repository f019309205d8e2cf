//! Seams to the platform power/focus driver and the audio devices.
//!
//! Device handles are owned exclusively by the lifecycle controller and
//! its workers; nothing else touches them. The output and capture devices
//! are created through factories so they can be constructed on the worker
//! thread that uses them (device streams are not generally `Send`).

use std::time::Duration;

use thiserror::Error;

use crate::core::MIC_FRAME_SAMPLES;
use clamshell_support::resample::OUTPUT_BLOCK_PAIRS;

/// Interleaved i16 samples per output block.
pub const OUTPUT_BLOCK_SAMPLES: usize = OUTPUT_BLOCK_PAIRS * 2;

/// Selectable CPU clock rates; index 0 is the baseline, restored whenever
/// the core pauses.
pub const CLOCK_RATES_HZ: [u32; 4] = [1_020_000_000, 1_224_000_000, 1_581_000_000, 1_785_000_000];

#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    #[error("audio device: {0}")]
    AudioDevice(String),

    #[error("capture device: {0}")]
    CaptureDevice(String),

    #[error("power driver: {0}")]
    Power(String),

    #[error("focus ownership: {0}")]
    Focus(String),
}

pub type ModeChangeCallback = Box<dyn Fn() + Send + Sync>;

/// CPU clock-rate requests.
pub trait ClockControl: Send {
    fn set_clock_rate(&mut self, hz: u32) -> Result<(), PlatformError>;
}

/// Foreground/focus ownership and operating-mode change notifications.
///
/// The mode-change subscription fires whenever the platform switches
/// operating or performance mode; the registered callback re-applies the
/// configured clock rate idempotently.
pub trait PlatformHost: Send {
    /// Takes exclusive foreground ownership and blocks external exit.
    fn acquire_focus(&mut self) -> Result<(), PlatformError>;
    fn release_focus(&mut self);

    fn subscribe_mode_changes(&mut self, callback: ModeChangeCallback)
        -> Result<(), PlatformError>;
    fn unsubscribe_mode_changes(&mut self);
}

/// Fixed-block audio output.
///
/// The device consumes blocks of [`OUTPUT_BLOCK_SAMPLES`] interleaved
/// samples and reports consumption through [`AudioSink::wait_consumed`].
pub trait AudioSink {
    fn start(&mut self) -> Result<(), PlatformError>;

    /// Blocks until the device can take another block, at most `timeout`.
    /// `Ok(false)` means the timeout elapsed; callers re-check their
    /// cancel token and wait again.
    fn wait_consumed(&mut self, timeout: Duration) -> Result<bool, PlatformError>;

    fn submit(&mut self, block: &[i16; OUTPUT_BLOCK_SAMPLES]) -> Result<(), PlatformError>;

    fn stop(&mut self);
}

/// Microphone capture in fixed frames of [`MIC_FRAME_SAMPLES`] samples.
pub trait MicSource {
    fn start(&mut self) -> Result<(), PlatformError>;

    /// Blocks until a full frame is captured, at most `timeout`.
    /// `Ok(false)` means the timeout elapsed with no complete frame.
    fn capture(
        &mut self,
        frame: &mut [i16; MIC_FRAME_SAMPLES],
        timeout: Duration,
    ) -> Result<bool, PlatformError>;

    fn stop(&mut self);
}

/// Constructs the output device on the audio worker thread.
pub type AudioSinkFactory = Box<dyn FnMut() -> Result<Box<dyn AudioSink>, PlatformError> + Send>;

/// Constructs the capture device on the microphone worker thread.
pub type MicSourceFactory = Box<dyn FnMut() -> Result<Box<dyn MicSource>, PlatformError> + Send>;
