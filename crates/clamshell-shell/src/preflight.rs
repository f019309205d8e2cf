//! Startup check for the required firmware/boot images.
//!
//! Missing files are fatal before the run loop is ever entered; the whole
//! list is reported so the user can fix everything in one pass.

use std::path::Path;

use crate::ShellError;

/// File name and human-readable description of every required image.
pub const REQUIRED_SYSTEM_FILES: [(&str, &str); 3] = [
    ("bios7.bin", "ARM7 BIOS"),
    ("bios9.bin", "ARM9 BIOS"),
    ("firmware.bin", "firmware image"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingFile {
    pub name: &'static str,
    pub description: &'static str,
}

/// Returns every required file absent from `system_dir`.
pub fn check_system_files(system_dir: &Path) -> Vec<MissingFile> {
    REQUIRED_SYSTEM_FILES
        .iter()
        .filter(|(name, _)| !system_dir.join(name).is_file())
        .map(|&(name, description)| MissingFile { name, description })
        .collect()
}

/// Like [`check_system_files`], but as a fatal error.
pub fn ensure_system_files(system_dir: &Path) -> Result<(), ShellError> {
    let missing = check_system_files(system_dir);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ShellError::MissingSystemFiles {
            missing: missing
                .into_iter()
                .map(|f| format!("{} ({})", f.name, f.description))
                .collect(),
        })
    }
}
