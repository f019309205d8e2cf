//! Seam to the emulation engine.
//!
//! The engine itself is an external collaborator; this trait is the full
//! surface the orchestration layer needs from it. All calls happen behind
//! a mutex shared between the stepping worker, the microphone pump, and
//! the main thread.

use std::path::Path;

use clamshell_support::input::Button;
use thiserror::Error;

/// Native resolution of one emulated screen.
pub const SCREEN_WIDTH: usize = 256;
pub const SCREEN_HEIGHT: usize = 192;

/// Composite framebuffer: top screen stacked above the bottom screen.
pub const FRAME_PIXELS: usize = SCREEN_WIDTH * SCREEN_HEIGHT * 2;

/// Samples in one microphone input frame.
pub const MIC_FRAME_SAMPLES: usize = 1440;

/// An error reported by the engine. Errors from [`EmulatorCore::run_frame`]
/// are fatal to the stepping loop; session errors abort the operation that
/// caused them.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct CoreError(pub String);

pub trait EmulatorCore: Send {
    /// Runs one emulation step (one 60 Hz frame).
    fn run_frame(&mut self) -> Result<(), CoreError>;

    /// The composite framebuffer produced by the last step.
    fn framebuffer(&self) -> &[u32; FRAME_PIXELS];

    /// Destructively reads up to `max_pairs` interleaved stereo pairs into
    /// `dst`; returns how many pairs were actually available.
    fn read_audio_output(&mut self, dst: &mut [i16], max_pairs: usize) -> usize;

    /// Feeds one microphone frame; `None` means no input this frame.
    fn mic_input_frame(&mut self, samples: Option<&[i16]>);

    fn set_key(&mut self, button: Button, pressed: bool);

    /// Touch in native bottom-screen coordinates.
    fn touch(&mut self, x: u16, y: u16);
    fn release_touch(&mut self);

    fn set_lid_closed(&mut self, closed: bool);

    /// (Re)initializes the emulation session for the given ROM.
    fn reset_session(
        &mut self,
        rom: &Path,
        save: &Path,
        direct_boot: bool,
    ) -> Result<(), CoreError>;

    /// Tears the session down (used before returning to the browser).
    fn stop_session(&mut self);

    fn save_state(&mut self, path: &Path) -> Result<(), CoreError>;
    fn load_state(&mut self, path: &Path) -> Result<(), CoreError>;

    /// Points the battery save at `path`, copying current contents when
    /// `saving` is set. Used when savestates relocate their SRAM.
    fn relocate_save(&mut self, path: &Path, saving: bool) -> Result<(), CoreError>;
}
