use log::{debug, error, info};
use std::collections::HashSet;
use std::path::Path;

use crate::errors::CleanupError;
use crate::file_utils::{DirectoryWalker, FileManager};
use crate::report::{ItemFailure, PassReport, Stage};

// @module: Metadata file deletion and empty directory pruning

/// Delete every file below `content_dir` whose extension is in `extensions`.
///
/// Extensions are compared case-insensitively and given without the leading dot.
pub fn delete_metadata_files(
    content_dir: &Path,
    extensions: &[String],
    files: &FileManager,
) -> Result<PassReport, CleanupError> {
    info!(
        "Deleting {} files for content dir: '{}'",
        extensions.join("/"),
        content_dir.display()
    );

    let mut report = PassReport::new(Stage::MetadataFiles);
    let targets: Vec<_> = DirectoryWalker::new(content_dir, "*")
        .files()?
        .filter(|path| has_extension(path, extensions))
        .collect();

    for path in targets {
        debug!("Deleting '{}'", path.display());
        match files.remove_file(&path) {
            Ok(()) => report.deleted += 1,
            Err(e) => {
                error!("{}", e);
                report.failures.push(ItemFailure::new(path, e));
            }
        }
    }

    Ok(report)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension() else {
        return false;
    };
    let ext = ext.to_string_lossy();
    extensions
        .iter()
        .any(|wanted| ext.eq_ignore_ascii_case(wanted.trim_start_matches('.')))
}

/// Remove empty directories below `content_dir`, deepest first.
///
/// The root itself is never removed, even when it ends up empty.
pub fn delete_empty_directories(content_dir: &Path, files: &FileManager) -> Result<PassReport, CleanupError> {
    info!("Deleting empty directories for content dir: '{}'", content_dir.display());

    let mut report = PassReport::new(Stage::EmptyDirectories);
    let mut pruned = HashSet::new();
    for dir in DirectoryWalker::new(content_dir, "*").directories_bottom_up()? {
        match files.remove_dir_if_empty(&dir, &pruned) {
            Ok(true) => {
                report.deleted += 1;
                pruned.insert(dir);
            }
            Ok(false) => {}
            Err(e) => {
                error!("{}", e);
                report.failures.push(ItemFailure::new(dir, e));
            }
        }
    }

    Ok(report)
}
