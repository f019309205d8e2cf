use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use clamshell_support::input::Hotkeys;

/// State shared between the main loop and the workers.
///
/// The hotkey mask is written by the main loop's input translation and
/// read by the microphone pump (MIC is level-sensitive). Cancellation is
/// an explicit token rather than a hotkey bit: every worker polls it at
/// iteration boundaries, so termination latency is bounded by one
/// iteration.
pub struct SharedState {
    cancel: AtomicBool,
    hotkeys: AtomicU8,
    lid_closed: AtomicBool,
}

impl SharedState {
    pub(crate) fn new() -> Self {
        Self {
            cancel: AtomicBool::new(false),
            hotkeys: AtomicU8::new(0),
            lid_closed: AtomicBool::new(false),
        }
    }

    pub fn cancel_requested(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }

    pub(crate) fn request_cancel(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    pub(crate) fn reset_cancel(&self) {
        self.cancel.store(false, Ordering::Release);
    }

    pub fn hotkeys(&self) -> Hotkeys {
        Hotkeys::from_bits_truncate(self.hotkeys.load(Ordering::Acquire))
    }

    pub fn raise_hotkeys(&self, set: Hotkeys) {
        if !set.is_empty() {
            self.hotkeys.fetch_or(set.bits(), Ordering::AcqRel);
        }
    }

    pub fn clear_hotkeys(&self, clear: Hotkeys) {
        if !clear.is_empty() {
            self.hotkeys.fetch_and(!clear.bits(), Ordering::AcqRel);
        }
    }

    /// One-shot consumption: clears `hotkey` and reports whether it was
    /// set. This is what turns the level signal into an edge for the lid
    /// and pause handlers.
    pub fn take_hotkey(&self, hotkey: Hotkeys) -> bool {
        self.hotkeys.fetch_and(!hotkey.bits(), Ordering::AcqRel) & hotkey.bits() != 0
    }

    /// Flips the lid flag and returns the new value.
    pub fn toggle_lid(&self) -> bool {
        !self.lid_closed.fetch_xor(true, Ordering::AcqRel)
    }

    pub fn lid_closed(&self) -> bool {
        self.lid_closed.load(Ordering::Acquire)
    }
}
