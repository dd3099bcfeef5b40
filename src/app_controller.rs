use log::{error, info, warn};
use std::path::Path;
use std::time::Instant;

use crate::app_config::Config;
use crate::errors::{AppError, CleanupError};
use crate::file_utils::FileManager;
use crate::housekeeping;
use crate::language_utils::{LanguageTable, get_language_name};
use crate::report::{CleanupSummary, PassReport, Stage};
use crate::subtitle_classifier::SubtitleClassifier;
use crate::tag_normalizer::TagNormalizer;

// @module: Application controller running the cleanup pipeline

/// Runs every cleanup pass, in order, over each configured content directory
pub struct Controller {
    // @field: App configuration
    config: Config,
    languages: LanguageTable,
    files: FileManager,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        Self::build(config, FileManager::new())
    }

    /// Controller that logs intended changes without touching the filesystem
    pub fn dry_run(config: Config) -> Result<Self, AppError> {
        Self::build(config, FileManager::dry_run())
    }

    fn build(config: Config, files: FileManager) -> Result<Self, AppError> {
        config.validate()?;
        let languages = config.language_table()?;
        Ok(Self {
            config,
            languages,
            files,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Clean every configured content directory.
    ///
    /// A directory that cannot be read is reported in its summary; the others still run.
    pub fn run(&self) -> Vec<CleanupSummary> {
        let start_time = Instant::now();
        if self.files.is_dry_run() {
            info!("Dry run: no files will be changed");
        }
        info!("Recognized subtitle languages: {}", self.language_names().join(", "));

        let summaries: Vec<_> = self
            .config
            .content_dirs
            .iter()
            .map(|dir| self.run_content_dir(dir))
            .collect();

        let failures: usize = summaries.iter().map(CleanupSummary::failure_count).sum();
        info!(
            "Cleaned {} content dir(s) in {:.1}s with {} error(s)",
            summaries.len(),
            start_time.elapsed().as_secs_f64(),
            failures
        );
        summaries
    }

    // @returns: "English (en/eng)" style labels for the configured tags
    fn language_names(&self) -> Vec<String> {
        self.languages
            .tags()
            .iter()
            .map(|tag| match get_language_name(&tag.long) {
                Ok(name) => format!("{} ({}/{})", name, tag.short, tag.long),
                Err(_) => format!("{}/{}", tag.short, tag.long),
            })
            .collect()
    }

    /// Run the full pipeline on one content directory
    pub fn run_content_dir(&self, content_dir: &Path) -> CleanupSummary {
        info!("Cleaning media for content dir: '{}'", content_dir.display());

        let mut summary = CleanupSummary::new(content_dir);
        for stage in Stage::ALL {
            match self.run_stage(stage, content_dir) {
                Ok(report) => {
                    if report.is_noop() {
                        info!("{}: nothing to do", stage);
                    } else {
                        info!("{}", report.summary());
                    }
                    for path in &report.flagged {
                        warn!("Needs manual review: '{}'", path.display());
                    }
                    summary.passes.push(report);
                }
                Err(e) => {
                    // Only an unreadable root gets here, and it fails every later stage too
                    error!("Aborting cleanup of '{}': {}", content_dir.display(), e);
                    summary.fatal = Some(e);
                    break;
                }
            }
        }

        summary
    }

    /// Run a single stage; stages see the tree the previous stage left behind
    pub fn run_stage(&self, stage: Stage, content_dir: &Path) -> Result<PassReport, CleanupError> {
        match stage {
            Stage::ForcedSubtitles => SubtitleClassifier::new(&self.languages, &self.files)
                .with_forced_max_percent(self.config.forced_max_percent)
                .with_review_log(self.config.review_log.as_deref())
                .run(content_dir)
                .map(|report| report.into_pass_report()),
            Stage::LanguageTags => TagNormalizer::new(&self.languages, &self.files).run(content_dir),
            Stage::MetadataFiles => {
                housekeeping::delete_metadata_files(content_dir, &self.config.metadata_extensions, &self.files)
            }
            Stage::EmptyDirectories => housekeeping::delete_empty_directories(content_dir, &self.files),
        }
    }
}
