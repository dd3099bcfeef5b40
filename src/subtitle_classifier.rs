/*!
 * Forced subtitle classification.
 *
 * Upstream tooling that finds two subtitle tracks of the same language writes them as
 * `<base>.1.<lang>.srt` and `<base>.2.<lang>.srt` without recording which one is the
 * full track and which one only covers foreign dialogue. The first file is always taken
 * as the full track. The second one is judged by its size relative to the first:
 *
 * - not smaller than the original: a copy, deleted
 * - more than `forced_max_percent` of the original: ambiguous, left alone and reported
 * - otherwise: renamed to `<base>.<lang>.forced.srt`
 */

use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};

use crate::errors::CleanupError;
use crate::file_utils::{DirectoryWalker, FileManager};
use crate::language_utils::{LanguageTable, LanguageTag, SurfaceForm};
use crate::report::{ItemFailure, PassReport, Stage};
use crate::subtitle_name::{SubtitleName, Variant};

/// Default upper bound for a forced track, as a percentage of the original's size
pub const DEFAULT_FORCED_MAX_PERCENT: u64 = 40;

/// Role a subtitle file ends up with after classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleRole {
    Original,
    Forced,
    Unclassified,
}

/// A subtitle file as seen by the classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleFile {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub surface_form: SurfaceForm,
    pub role: SubtitleRole,
}

/// A discovered `.1.` file and everything needed to resolve it
#[derive(Debug, Clone)]
pub struct SubtitleCandidateGroup {
    /// Decomposed name of the variant-1 file
    pub name: SubtitleName,
    pub language_tag: LanguageTag,
    /// Surface form the variant-1 file was written in
    pub surface_form: SurfaceForm,
    pub variant_1_file: PathBuf,
    /// Filled in at classification time, if a sibling exists then
    pub variant_2_file: Option<PathBuf>,
}

impl SubtitleCandidateGroup {
    /// Directory plus the filename stem shared by both variants
    pub fn base_path(&self) -> PathBuf {
        self.name.dir.join(&self.name.base)
    }

    // @returns: Would-be path of the `.2.` sibling in the given surface form
    fn sibling_path(&self, form: SurfaceForm) -> PathBuf {
        self.name
            .with_variant(Some(Variant::Second))
            .with_language(self.language_tag.surface(form))
            .to_path()
    }
}

/// Size verdict for a `.2.` file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForcedVerdict {
    /// Not smaller than the original
    Duplicate,
    /// Smaller, but too large to be sure
    Ambiguous,
    Forced,
}

/// Judge a forced candidate by size.
///
/// Integer arithmetic keeps the boundary exact: with 40 percent, 400 bytes against
/// 1000 is `Forced`, 401 is `Ambiguous`.
pub fn classify_forced(orig_size: u64, forced_size: u64, forced_max_percent: u64) -> ForcedVerdict {
    if forced_size >= orig_size {
        ForcedVerdict::Duplicate
    } else if u128::from(forced_size) * 100 > u128::from(orig_size) * u128::from(forced_max_percent) {
        ForcedVerdict::Ambiguous
    } else {
        ForcedVerdict::Forced
    }
}

/// How a group was resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupOutcome {
    /// No `.2.` sibling; only the original was renamed
    OriginalOnly { original: SubtitleFile },
    /// The sibling was a copy of the original and was deleted
    DuplicateRemoved { original: SubtitleFile, removed: PathBuf },
    /// The sibling was renamed to the canonical forced name
    ForcedRenamed { original: SubtitleFile, forced: SubtitleFile },
    /// The sibling was left untouched for manual review
    NeedsReview { original: SubtitleFile, candidate: SubtitleFile },
}

impl GroupOutcome {
    pub fn original(&self) -> &SubtitleFile {
        match self {
            Self::OriginalOnly { original }
            | Self::DuplicateRemoved { original, .. }
            | Self::ForcedRenamed { original, .. }
            | Self::NeedsReview { original, .. } => original,
        }
    }
}

/// Result of one classification pass over a content directory
#[derive(Debug, Default)]
pub struct ClassificationReport {
    pub outcomes: Vec<GroupOutcome>,
    pub failures: Vec<ItemFailure>,
}

impl ClassificationReport {
    /// Collapse outcomes into the counts every pass reports
    pub fn into_pass_report(self) -> PassReport {
        let mut report = PassReport::new(Stage::ForcedSubtitles);
        for outcome in self.outcomes {
            // variant-1 is renamed in every outcome
            report.renamed += 1;
            match outcome {
                GroupOutcome::OriginalOnly { .. } => {}
                GroupOutcome::DuplicateRemoved { .. } => report.deleted += 1,
                GroupOutcome::ForcedRenamed { .. } => report.renamed += 1,
                GroupOutcome::NeedsReview { candidate, .. } => report.flagged.push(candidate.path),
            }
        }
        report.failures = self.failures;
        report
    }
}

// @struct: Forced subtitle classification engine
pub struct SubtitleClassifier<'a> {
    languages: &'a LanguageTable,
    files: &'a FileManager,
    forced_max_percent: u64,
    review_log: Option<&'a Path>,
}

impl<'a> SubtitleClassifier<'a> {
    pub fn new(languages: &'a LanguageTable, files: &'a FileManager) -> Self {
        Self {
            languages,
            files,
            forced_max_percent: DEFAULT_FORCED_MAX_PERCENT,
            review_log: None,
        }
    }

    pub fn with_forced_max_percent(mut self, percent: u64) -> Self {
        self.forced_max_percent = percent;
        self
    }

    pub fn with_review_log(mut self, path: Option<&'a Path>) -> Self {
        self.review_log = path;
        self
    }

    /// Find every `.1.` subtitle file of a recognized language below `content_dir`.
    ///
    /// Groups come back 2-letter files first, then by path. When `M.1.en.srt` and
    /// `M.1.eng.srt` both exist, the 3-letter group runs last and its track ends up
    /// as `M.eng.srt`.
    pub fn discover(&self, content_dir: &Path) -> Result<Vec<SubtitleCandidateGroup>, CleanupError> {
        let walker = DirectoryWalker::new(content_dir, "*.1.*.srt");
        let mut groups = Vec::new();

        for path in walker.files()? {
            let Some(name) = SubtitleName::parse(&path) else {
                continue;
            };
            if name.variant != Some(Variant::First) || name.forced {
                continue;
            }
            let Some((tag, form)) = self.languages.lookup(&name.language) else {
                continue;
            };

            debug!("Found `.1.{}.srt` subtitle file: '{}'", name.language, path.display());
            groups.push(SubtitleCandidateGroup {
                language_tag: tag.clone(),
                surface_form: form,
                variant_1_file: path,
                variant_2_file: None,
                name,
            });
        }

        groups.sort_by(|a, b| (a.surface_form, &a.variant_1_file).cmp(&(b.surface_form, &b.variant_1_file)));
        Ok(groups)
    }

    /// Resolve one group: canonicalize the original, then classify its sibling
    pub fn process_group(&self, group: &mut SubtitleCandidateGroup) -> Result<GroupOutcome, CleanupError> {
        let long = group.language_tag.long.as_str();
        let original_size = FileManager::file_size(&group.variant_1_file)?;
        let canonical = group.name.canonical_original(long).to_path();

        if canonical != group.variant_1_file && FileManager::file_exists(&canonical) {
            warn!("Replacing existing subtitle file '{}'", canonical.display());
        }
        info!(
            "Renaming original subtitle '{}' to '{}'",
            group.variant_1_file.display(),
            canonical.display()
        );
        self.files.rename(&group.variant_1_file, &canonical)?;

        let original = SubtitleFile {
            path: canonical,
            size_bytes: original_size,
            surface_form: SurfaceForm::Long,
            role: SubtitleRole::Original,
        };

        let sibling = [group.surface_form, group.surface_form.other()]
            .into_iter()
            .map(|form| (form, group.sibling_path(form)))
            .find(|(_, path)| FileManager::file_exists(path));
        let Some((sibling_form, sibling_path)) = sibling else {
            return Ok(GroupOutcome::OriginalOnly { original });
        };

        debug!("Found `.2.` subtitle file: '{}'", sibling_path.display());
        group.variant_2_file = Some(sibling_path.clone());
        let forced_size = FileManager::file_size(&sibling_path)?;
        let candidate = SubtitleFile {
            path: sibling_path,
            size_bytes: forced_size,
            surface_form: sibling_form,
            role: SubtitleRole::Unclassified,
        };

        match classify_forced(original_size, forced_size, self.forced_max_percent) {
            ForcedVerdict::Duplicate => {
                info!(
                    "Forced subtitle candidate '{}' ({} bytes) is not smaller than the original ({} bytes); deleting",
                    candidate.path.display(),
                    forced_size,
                    original_size
                );
                self.files.remove_file(&candidate.path)?;
                Ok(GroupOutcome::DuplicateRemoved {
                    original,
                    removed: candidate.path,
                })
            }
            ForcedVerdict::Ambiguous => {
                warn!(
                    "'{}' might not be a forced subtitle ({} of {} bytes); skipping, check manually",
                    candidate.path.display(),
                    forced_size,
                    original_size
                );
                self.record_for_review(&candidate, original_size);
                Ok(GroupOutcome::NeedsReview { original, candidate })
            }
            ForcedVerdict::Forced => {
                let forced_path = group.name.canonical_forced(long).to_path();
                info!(
                    "Renaming forced subtitle '{}' to '{}'",
                    candidate.path.display(),
                    forced_path.display()
                );
                self.files.rename(&candidate.path, &forced_path)?;
                Ok(GroupOutcome::ForcedRenamed {
                    original,
                    forced: SubtitleFile {
                        path: forced_path,
                        size_bytes: forced_size,
                        surface_form: SurfaceForm::Long,
                        role: SubtitleRole::Forced,
                    },
                })
            }
        }
    }

    fn record_for_review(&self, candidate: &SubtitleFile, original_size: u64) {
        let Some(review_log) = self.review_log else {
            return;
        };
        let line = format!(
            "possible forced subtitle: {} ({} of {} bytes)",
            candidate.path.display(),
            candidate.size_bytes,
            original_size
        );
        if let Err(e) = self.files.append_to_log_file(review_log, &line) {
            warn!("{}", e);
        }
    }

    /// Discover and resolve every group below `content_dir`.
    ///
    /// A failing group is recorded and does not stop the others.
    pub fn run(&self, content_dir: &Path) -> Result<ClassificationReport, CleanupError> {
        info!("Renaming forced subs for content dir: '{}'", content_dir.display());

        let mut report = ClassificationReport::default();
        for mut group in self.discover(content_dir)? {
            match self.process_group(&mut group) {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(e) => {
                    error!("Failed to process subtitle group '{}': {}", group.base_path().display(), e);
                    report.failures.push(ItemFailure::new(group.variant_1_file.clone(), e));
                }
            }
        }

        Ok(report)
    }
}
