//! Session lifecycle glue: ROM selection, the pause menu's actions, and
//! the paused-state configuration gateway.

use std::path::PathBuf;

use tracing::{info, warn};

use clamshell_config::Config;
use clamshell_runtime::Runtime;

use crate::ShellError;

/// The pause menu's action set. Widget presentation belongs to the
/// embedding front-end; the semantics live here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseAction {
    Resume,
    SaveState,
    LoadState,
    OpenBrowser,
}

/// Where the flow goes after a pause action is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseFlow {
    Resumed,
    ToBrowser,
}

pub struct Session {
    runtime: Runtime,
    config_path: PathBuf,
}

impl Session {
    pub fn new(runtime: Runtime, config_path: impl Into<PathBuf>) -> Self {
        Self {
            runtime,
            config_path: config_path.into(),
        }
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut Runtime {
        &mut self.runtime
    }

    /// Starts a fresh session for the picked ROM.
    pub fn begin(&mut self, rom: PathBuf) -> Result<(), ShellError> {
        self.runtime.set_rom_path(rom);
        self.runtime.start(true)?;
        Ok(())
    }

    /// The main loop calls this after consuming the pause hotkey.
    pub fn request_pause(&mut self) -> Result<(), ShellError> {
        self.runtime.pause()?;
        Ok(())
    }

    /// Handles one pause-menu pick. Savestate failures are skipped
    /// without touching any worker state; the session resumes either way.
    pub fn handle_pause_action(&mut self, action: PauseAction) -> Result<PauseFlow, ShellError> {
        match action {
            PauseAction::Resume => {
                self.runtime.resume()?;
                Ok(PauseFlow::Resumed)
            }
            PauseAction::SaveState | PauseAction::LoadState => {
                self.do_savestate(action == PauseAction::SaveState);
                self.runtime.resume()?;
                Ok(PauseFlow::Resumed)
            }
            PauseAction::OpenBrowser => {
                self.runtime.with_core(|core| core.stop_session());
                info!("session ended, returning to browser");
                Ok(PauseFlow::ToBrowser)
            }
        }
    }

    fn do_savestate(&mut self, saving: bool) {
        let Some(paths) = self.runtime.session_paths().cloned() else {
            warn!("savestate requested without a session");
            return;
        };
        let reloc = self.runtime.config_snapshot().savestate_reloc_sram;

        self.runtime.with_core(|core| {
            let result = if saving {
                core.save_state(&paths.state)
            } else {
                core.load_state(&paths.state)
            };

            match result {
                Ok(()) => {
                    if reloc {
                        if let Err(e) = core.relocate_save(&paths.state_save, saving) {
                            warn!("save relocation skipped: {e}");
                        }
                    }
                }
                // Known gap carried from the original front-end: the user
                // is not told, the action is simply skipped.
                Err(e) => warn!(saving, "savestate skipped: {e}"),
            }
        });
    }

    /// The paused-state settings gateway: mutates, re-clamps, persists.
    pub fn update_settings(&mut self, f: impl FnOnce(&mut Config)) -> Result<(), ShellError> {
        self.runtime.update_config(f)?;
        self.runtime.config_snapshot().save(&self.config_path)?;
        Ok(())
    }

    /// Persists the current configuration unchanged (used for the volume
    /// clamp migration on startup and for last-folder updates).
    pub fn persist_config(&self) -> Result<(), ShellError> {
        self.runtime.config_snapshot().save(&self.config_path)?;
        Ok(())
    }
}
