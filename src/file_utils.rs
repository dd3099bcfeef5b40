use chrono::Local;
use log::{debug, info, warn};
use regex::Regex;
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::CleanupError;

// @module: Directory walking and file mutation

/// Translate a glob-style filename pattern (`*`, `?`) into an anchored regex
pub fn glob_to_regex(pattern: &str) -> Regex {
    let mut re = String::with_capacity(pattern.len() + 8);
    re.push('^');
    for c in pattern.chars() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            other => re.push_str(&regex::escape(&other.to_string())),
        }
    }
    re.push('$');
    Regex::new(&re).expect("escaped glob is a valid regex")
}

// @struct: Recursive walk of one content directory
#[derive(Debug, Clone)]
pub struct DirectoryWalker {
    root: PathBuf,
    pattern: Regex,
}

impl DirectoryWalker {
    /// Walker over files whose name matches `pattern` (glob syntax)
    pub fn new<P: AsRef<Path>>(root: P, pattern: &str) -> Self {
        Self::with_regex(root, glob_to_regex(pattern))
    }

    /// Walker over files whose name matches an arbitrary regex
    pub fn with_regex<P: AsRef<Path>>(root: P, pattern: Regex) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            pattern,
        }
    }

    // @checks: Root exists, is a directory and can be listed
    fn check_root(&self) -> Result<(), CleanupError> {
        let unreadable = |source| CleanupError::UnreadableRoot {
            path: self.root.clone(),
            source,
        };
        let metadata = fs::metadata(&self.root).map_err(unreadable)?;
        if !metadata.is_dir() {
            return Err(unreadable(io::Error::new(
                io::ErrorKind::NotADirectory,
                "not a directory",
            )));
        }
        fs::read_dir(&self.root).map_err(unreadable)?;
        Ok(())
    }

    /// Lazily yield matching files in traversal order.
    ///
    /// Each call starts a fresh walk. Unreadable subtrees are skipped with a warning.
    pub fn files(&self) -> Result<impl Iterator<Item = PathBuf> + '_, CleanupError> {
        self.check_root()?;

        let files = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_map(skip_unreadable)
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| self.pattern.is_match(&entry.file_name().to_string_lossy()))
            .map(|entry| entry.into_path());

        Ok(files)
    }

    /// Lazily yield every directory strictly below the root, deepest first
    pub fn directories_bottom_up(&self) -> Result<impl Iterator<Item = PathBuf>, CleanupError> {
        self.check_root()?;

        let dirs = WalkDir::new(&self.root)
            .follow_links(false)
            .min_depth(1)
            .contents_first(true)
            .into_iter()
            .filter_map(skip_unreadable)
            .filter(|entry| entry.file_type().is_dir())
            .map(|entry| entry.into_path());

        Ok(dirs)
    }
}

fn skip_unreadable(entry: walkdir::Result<walkdir::DirEntry>) -> Option<walkdir::DirEntry> {
    match entry {
        Ok(entry) => Some(entry),
        Err(e) => {
            let path = e.path().map(|p| p.display().to_string()).unwrap_or_default();
            warn!("Skipping unreadable entry '{}': {}", path, e);
            None
        }
    }
}

// @struct: File operations utility
//
// All mutations go through here so a dry run can log instead of touching the tree.
#[derive(Debug, Clone, Default)]
pub struct FileManager {
    dry_run: bool,
}

impl FileManager {
    /// Manager that applies every change
    pub fn new() -> Self {
        Self { dry_run: false }
    }

    /// Manager that only logs what it would do
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    /// Size of a file in bytes
    pub fn file_size<P: AsRef<Path>>(path: P) -> Result<u64, CleanupError> {
        let path = path.as_ref();
        fs::metadata(path)
            .map(|m| m.len())
            .map_err(|source| CleanupError::Metadata {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Rename a file, replacing the target if it exists
    pub fn rename(&self, from: &Path, to: &Path) -> Result<(), CleanupError> {
        if self.dry_run {
            info!("[dry run] Would rename '{}' to '{}'", from.display(), to.display());
            return Ok(());
        }

        fs::rename(from, to).map_err(|source| CleanupError::Rename {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        })
    }

    /// Delete a single file
    pub fn remove_file(&self, path: &Path) -> Result<(), CleanupError> {
        if self.dry_run {
            info!("[dry run] Would delete '{}'", path.display());
            return Ok(());
        }

        fs::remove_file(path).map_err(|source| CleanupError::Delete {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Remove a directory if it is empty.
    ///
    /// Returns `Ok(false)` when the directory still has entries; that is the expected
    /// outcome for most directories and is not an error. `pruned` holds directories
    /// removed earlier in the same walk: a dry run counts them as gone, so a parent
    /// left with only pruned children is reported as removable too.
    pub fn remove_dir_if_empty(&self, path: &Path, pruned: &HashSet<PathBuf>) -> Result<bool, CleanupError> {
        let delete_error = |source| CleanupError::Delete {
            path: path.to_path_buf(),
            source,
        };

        if self.dry_run {
            let mut empty = true;
            for entry in fs::read_dir(path).map_err(delete_error)? {
                if !pruned.contains(&entry.map_err(delete_error)?.path()) {
                    empty = false;
                    break;
                }
            }
            if empty {
                info!("[dry run] Would delete empty directory '{}'", path.display());
            }
            return Ok(empty);
        }

        match fs::remove_dir(path) {
            Ok(()) => {
                info!("Deleted empty directory at '{}'", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::DirectoryNotEmpty => {
                debug!("Not deleting non-empty directory at '{}'", path.display());
                Ok(false)
            }
            Err(e) => Err(delete_error(e)),
        }
    }

    /// Append a line to a log file with timestamp
    pub fn append_to_log_file<P: AsRef<Path>>(&self, path: P, content: &str) -> Result<(), CleanupError> {
        let path = path.as_ref();
        if self.dry_run {
            debug!("[dry run] Would append to '{}': {}", path.display(), content);
            return Ok(());
        }

        let log_error = |source| CleanupError::ReviewLog {
            path: path.to_path_buf(),
            source,
        };
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(log_error)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(log_error)?;

        writeln!(file, "[{}] {}", timestamp, content).map_err(log_error)
    }
}
