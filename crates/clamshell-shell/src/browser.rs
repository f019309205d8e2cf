//! ROM selection flow on top of the support crate's directory browser.

use std::path::{Path, PathBuf};

use tracing::debug;

use clamshell_config::Config;
use clamshell_support::browse::FileBrowser;
use clamshell_support::icon::{decode_rom_icon, RomIcon};

use crate::ShellError;

/// ROM file extension the browser lists.
pub const ROM_EXTENSION: &str = "nds";

/// One presentable row: directories carry no icon and the front-end shows
/// its generic folder art; ROMs carry their decoded banner icon unless
/// decoding failed, which falls back the same way.
pub struct BrowserItem {
    pub name: String,
    pub is_dir: bool,
    pub icon: Option<RomIcon>,
}

/// Navigable ROM picker with a hard root boundary.
pub struct RomBrowser {
    inner: FileBrowser,
}

impl RomBrowser {
    /// Starts where the user last picked a ROM, clamped to the root.
    pub fn new(root: impl Into<PathBuf>, config: &Config) -> Self {
        Self {
            inner: FileBrowser::new(root, PathBuf::from(&config.last_rom_folder)),
        }
    }

    pub fn current_folder(&self) -> &Path {
        self.inner.current()
    }

    pub fn items(&self) -> Result<Vec<BrowserItem>, ShellError> {
        let entries = self.inner.entries(ROM_EXTENSION)?;
        Ok(entries
            .into_iter()
            .map(|entry| {
                let icon = if entry.is_dir {
                    None
                } else {
                    match decode_rom_icon(&self.inner.resolve(&entry.name)) {
                        Ok(icon) => Some(icon),
                        Err(e) => {
                            debug!(name = %entry.name, "icon decode failed: {e}");
                            None
                        }
                    }
                };
                BrowserItem {
                    name: entry.name,
                    is_dir: entry.is_dir,
                    icon,
                }
            })
            .collect())
    }

    /// Opens a listed entry: descends into directories, yields the full
    /// path for a ROM pick.
    pub fn open(&mut self, item: &BrowserItem) -> Option<PathBuf> {
        if item.is_dir {
            self.inner.descend(&item.name);
            None
        } else {
            Some(self.inner.resolve(&item.name))
        }
    }

    /// Up one level; a no-op at the root.
    pub fn back(&mut self) -> bool {
        self.inner.ascend()
    }

    /// Persists the current folder as the next session's starting point.
    pub fn remember_folder(&self, config: &mut Config) {
        config.last_rom_folder = self.inner.current().to_string_lossy().into_owned();
        config.sanitize();
    }
}
