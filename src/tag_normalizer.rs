use log::{debug, error, info};
use std::path::Path;

use crate::errors::CleanupError;
use crate::file_utils::{DirectoryWalker, FileManager};
use crate::language_utils::{LanguageTable, LanguageTag, SurfaceForm};
use crate::report::{ItemFailure, PassReport, Stage};
use crate::subtitle_name::{SubtitleName, Variant};

// @module: Rewrite 2-letter subtitle language tags to their 3-letter form

/// What happened to one 2-letter subtitle file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagAction {
    /// A 3-letter file already existed, the 2-letter one was deleted
    DeletedDuplicate,
    Renamed,
}

// @struct: Language tag normalization pass
pub struct TagNormalizer<'a> {
    languages: &'a LanguageTable,
    files: &'a FileManager,
}

impl<'a> TagNormalizer<'a> {
    pub fn new(languages: &'a LanguageTable, files: &'a FileManager) -> Self {
        Self { languages, files }
    }

    /// Normalize a single file already known to carry a 2-letter tag
    pub fn normalize_file(&self, name: &SubtitleName, long: &str) -> Result<TagAction, CleanupError> {
        let short_path = name.to_path();
        let long_path = name.with_language(long).to_path();

        if FileManager::file_exists(&long_path) {
            info!(
                "Accompanying '{}' exists; deleting '{}'",
                long_path.display(),
                short_path.display()
            );
            self.files.remove_file(&short_path)?;
            return Ok(TagAction::DeletedDuplicate);
        }

        info!("Renaming '{}' to '{}'", short_path.display(), long_path.display());
        self.files.rename(&short_path, &long_path)?;
        Ok(TagAction::Renamed)
    }

    /// Normalize every 2-letter subtitle below `content_dir`.
    ///
    /// Members of a `.1.`/`.2.` pair belong to the forced-subtitle pass and are left
    /// alone; a `.2.` name without a partner is just a title and gets normalized.
    pub fn run(&self, content_dir: &Path) -> Result<PassReport, CleanupError> {
        info!("Renaming 2-letter subtitle tags for content dir: '{}'", content_dir.display());

        let mut report = PassReport::new(Stage::LanguageTags);
        let candidates: Vec<_> = DirectoryWalker::new(content_dir, "*.srt")
            .files()?
            .filter_map(|path| SubtitleName::parse(&path))
            .filter_map(|name| match self.languages.lookup(&name.language) {
                Some((tag, SurfaceForm::Short)) if !is_pair_member(&name, tag) => {
                    Some((name, tag.long.clone()))
                }
                _ => None,
            })
            .collect();

        for (name, long) in candidates {
            debug!("Found 2-letter subtitle file: '{}'", name);
            match self.normalize_file(&name, &long) {
                Ok(TagAction::DeletedDuplicate) => report.deleted += 1,
                Ok(TagAction::Renamed) => report.renamed += 1,
                Err(e) => {
                    error!("{}", e);
                    report.failures.push(ItemFailure::new(name.to_path(), e));
                }
            }
        }

        Ok(report)
    }
}

// @checks: Variant-marked file still owned by the forced-subtitle pass.
//
// Every `.1.` file is. A `.2.` file is when its `.1.` partner exists in either surface
// form (dry run) or when the partner was already renamed to `<base>.<3-letter>.srt`
// (an ambiguous candidate kept for review, on this run and every later one).
fn is_pair_member(name: &SubtitleName, tag: &LanguageTag) -> bool {
    match name.variant {
        None => false,
        Some(Variant::First) => true,
        Some(Variant::Second) => {
            let first = name.with_variant(Some(Variant::First));
            FileManager::file_exists(name.canonical_original(&tag.long).to_path())
                || [SurfaceForm::Short, SurfaceForm::Long]
                    .into_iter()
                    .any(|form| FileManager::file_exists(first.with_language(tag.surface(form)).to_path()))
        }
    }
}
