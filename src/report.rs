use std::fmt;
use std::path::PathBuf;

use crate::errors::CleanupError;

// @module: Per-pass results collected by the cleanup pipeline

/// Pipeline stages, in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ForcedSubtitles,
    LanguageTags,
    MetadataFiles,
    EmptyDirectories,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::ForcedSubtitles,
        Stage::LanguageTags,
        Stage::MetadataFiles,
        Stage::EmptyDirectories,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ForcedSubtitles => "forced subtitles",
            Self::LanguageTags => "language tags",
            Self::MetadataFiles => "metadata files",
            Self::EmptyDirectories => "empty directories",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One item (group, file or directory) whose processing failed
#[derive(Debug)]
pub struct ItemFailure {
    pub path: PathBuf,
    pub error: CleanupError,
}

impl ItemFailure {
    pub fn new(path: impl Into<PathBuf>, error: CleanupError) -> Self {
        Self {
            path: path.into(),
            error,
        }
    }
}

/// What one pass did to one content directory
#[derive(Debug)]
pub struct PassReport {
    pub stage: Stage,
    pub renamed: usize,
    pub deleted: usize,
    /// Files left in place for a human to look at
    pub flagged: Vec<PathBuf>,
    pub failures: Vec<ItemFailure>,
}

impl PassReport {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            renamed: 0,
            deleted: 0,
            flagged: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// True when the pass neither changed nor flagged anything and nothing failed
    pub fn is_noop(&self) -> bool {
        self.renamed == 0 && self.deleted == 0 && self.flagged.is_empty() && self.failures.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: {} renamed, {} deleted, {} flagged, {} errors",
            self.stage,
            self.renamed,
            self.deleted,
            self.flagged.len(),
            self.failures.len()
        )
    }
}

/// Everything the pipeline did to one content directory
#[derive(Debug)]
pub struct CleanupSummary {
    pub content_dir: PathBuf,
    pub passes: Vec<PassReport>,
    /// Set when the directory could not be processed at all
    pub fatal: Option<CleanupError>,
}

impl CleanupSummary {
    pub fn new(content_dir: impl Into<PathBuf>) -> Self {
        Self {
            content_dir: content_dir.into(),
            passes: Vec::new(),
            fatal: None,
        }
    }

    pub fn pass(&self, stage: Stage) -> Option<&PassReport> {
        self.passes.iter().find(|p| p.stage == stage)
    }

    pub fn failure_count(&self) -> usize {
        self.passes.iter().map(|p| p.failures.len()).sum::<usize>() + usize::from(self.fatal.is_some())
    }

    pub fn is_noop(&self) -> bool {
        self.fatal.is_none() && self.passes.iter().all(PassReport::is_noop)
    }
}
