//! Session file paths derived from the ROM path.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

const SAVE_EXTENSION: &str = "sav";
const STATE_EXTENSION: &str = "mln";

/// Paths that stay constant for the lifetime of one session; recomputed
/// only on a start-with-reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPaths {
    /// Battery save: ROM path with its extension replaced.
    pub save: PathBuf,
    /// Savestate: ROM path with the state extension.
    pub state: PathBuf,
    /// Relocated battery save accompanying a savestate.
    pub state_save: PathBuf,
}

impl SessionPaths {
    pub fn derive(rom_path: &Path) -> Self {
        let save = rom_path.with_extension(SAVE_EXTENSION);
        let state = rom_path.with_extension(STATE_EXTENSION);

        let mut state_save = OsString::from(state.as_os_str());
        state_save.push(".");
        state_save.push(SAVE_EXTENSION);

        Self {
            save,
            state,
            state_save: PathBuf::from(state_save),
        }
    }
}
