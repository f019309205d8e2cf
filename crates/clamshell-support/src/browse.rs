//! Directory listing and navigation for the ROM browser.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::SupportError;

/// One entry of a browsable listing: directories first, then files whose
/// extension matched the filter, both sorted by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub is_dir: bool,
}

/// Lists `dir`, keeping subdirectories and files with `extension`.
///
/// Entries whose names are not valid UTF-8 are skipped rather than failing
/// the listing.
pub fn dir_contents(dir: &Path, extension: &str) -> Result<Vec<DirEntryInfo>, SupportError> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let Ok(name) = entry.file_name().into_string() else {
            debug!(entry = %entry.path().display(), "skipping non-UTF-8 name");
            continue;
        };

        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            dirs.push(DirEntryInfo { name, is_dir: true });
        } else if entry
            .path()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        {
            files.push(DirEntryInfo {
                name,
                is_dir: false,
            });
        }
    }

    dirs.sort_by(|a, b| a.name.cmp(&b.name));
    files.sort_by(|a, b| a.name.cmp(&b.name));
    dirs.extend(files);
    Ok(dirs)
}

/// Navigable cursor over the directory tree under a fixed root.
///
/// Ascending above the root is a hard boundary, not an error: the call is
/// simply a no-op.
#[derive(Debug, Clone)]
pub struct FileBrowser {
    root: PathBuf,
    current: PathBuf,
}

impl FileBrowser {
    /// Starts at `start` if it lies under `root`, otherwise at the root.
    pub fn new(root: impl Into<PathBuf>, start: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let start = start.into();
        let current = if start.starts_with(&root) && start.is_dir() {
            start
        } else {
            root.clone()
        };
        Self { root, current }
    }

    pub fn current(&self) -> &Path {
        &self.current
    }

    pub fn entries(&self, extension: &str) -> Result<Vec<DirEntryInfo>, SupportError> {
        dir_contents(&self.current, extension)
    }

    /// Resolves a listed name against the current directory.
    pub fn resolve(&self, name: &str) -> PathBuf {
        self.current.join(name)
    }

    pub fn descend(&mut self, name: &str) {
        self.current.push(name);
    }

    /// Moves up one level; returns false (and stays put) at the root.
    pub fn ascend(&mut self) -> bool {
        if self.current == self.root {
            return false;
        }
        self.current.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_tree() -> PathBuf {
        let dir = std::env::temp_dir().join("clamshell_browse_tests");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("library/nested")).unwrap();
        std::fs::write(dir.join("library/beta.nds"), b"b").unwrap();
        std::fs::write(dir.join("library/alpha.NDS"), b"a").unwrap();
        std::fs::write(dir.join("library/notes.txt"), b"n").unwrap();
        dir
    }

    #[test]
    fn listing_is_dirs_first_and_extension_filtered() {
        let dir = scratch_tree();
        let entries = dir_contents(&dir.join("library"), "nds").unwrap();

        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["nested", "alpha.NDS", "beta.nds"]);
        assert!(entries[0].is_dir);
        assert!(!entries[1].is_dir);
    }

    #[test]
    fn ascend_stops_at_the_root() {
        let dir = scratch_tree();
        let mut browser = FileBrowser::new(&dir, dir.join("library/nested"));

        assert!(browser.ascend());
        assert!(browser.ascend());
        assert_eq!(browser.current(), dir.as_path());

        // At the root the boundary holds.
        assert!(!browser.ascend());
        assert_eq!(browser.current(), dir.as_path());
    }

    #[test]
    fn start_outside_the_root_falls_back_to_the_root() {
        let dir = scratch_tree();
        let browser = FileBrowser::new(&dir, "/somewhere/else");
        assert_eq!(browser.current(), dir.as_path());
    }
}
