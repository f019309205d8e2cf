pub mod browse;
pub mod icon;
pub mod input;
pub mod layout;
pub mod paths;
pub mod resample;
pub mod touch;

use thiserror::Error;

pub use browse::FileBrowser;
pub use icon::RomIcon;
pub use input::{Button, Hotkeys, InputMap, InputSnapshot, InputTranslator};
pub use layout::{ScreenGeometry, ScreenGap, ScreenLayout, ScreenRect, ScreenRotation, ScreenSizing};
pub use paths::SessionPaths;

#[derive(Error, Debug)]
pub enum SupportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("icon data out of range: {0}")]
    IconOutOfRange(String),
}
