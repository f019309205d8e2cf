//! Main-loop layer of the front-end: per-tick input handling, the pause
//! menu's action set, the ROM browser flow, and the startup preflight.
//!
//! The renderer and the raw input source are collaborator traits; the
//! emulation engine comes in through `clamshell-runtime`'s seams. Nothing
//! here draws widgets - menu presentation belongs to the embedding
//! front-end.

pub mod browser;
pub mod frontend;
pub mod preflight;
pub mod session;
pub mod tick;

use thiserror::Error;

pub use browser::{BrowserItem, RomBrowser, ROM_EXTENSION};
pub use frontend::{InputSource, Renderer};
pub use preflight::{check_system_files, ensure_system_files, MissingFile, REQUIRED_SYSTEM_FILES};
pub use session::{PauseAction, PauseFlow, Session};
pub use tick::{MainLoop, TickFlow};

#[derive(Error, Debug)]
pub enum ShellError {
    #[error(transparent)]
    Runtime(#[from] clamshell_runtime::RuntimeError),

    #[error(transparent)]
    Config(#[from] clamshell_config::ConfigError),

    #[error(transparent)]
    Support(#[from] clamshell_support::SupportError),

    #[error("required system files are missing: {}", .missing.join(", "))]
    MissingSystemFiles { missing: Vec<String> },
}
