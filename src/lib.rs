/*!
 * # mediatidy - subtitle naming and leftover cleanup for media libraries
 *
 * Media managers such as Sonarr, Radarr and Bazarr leave subtitle files named
 * `Movie.1.en.srt` / `Movie.2.en.srt` when they find two tracks of one language, plus
 * `.nfo`/`.txt` sidecars and empty folders. This crate converges a library onto
 * `Movie.eng.srt` / `Movie.eng.forced.srt` and removes the leftovers.
 *
 * ## Architecture
 *
 * - `app_config`: Configuration loading and validation
 * - `app_controller`: Runs the passes, in order, over each content directory
 * - `subtitle_classifier`: Original vs forced classification of `.1.`/`.2.` pairs
 * - `subtitle_name`: Decomposition of subtitle file names
 * - `tag_normalizer`: 2-letter to 3-letter language tag renaming
 * - `housekeeping`: Metadata file deletion and empty directory pruning
 * - `file_utils`: Directory walking and dry-run aware file mutation
 * - `language_utils`: ISO language code utilities
 * - `report`: Per-pass results
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

#![allow(clippy::uninlined_format_args)]

pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod housekeeping;
pub mod language_utils;
pub mod report;
pub mod subtitle_classifier;
pub mod subtitle_name;
pub mod tag_normalizer;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use errors::{AppError, CleanupError, ConfigError};
pub use language_utils::{LanguageTable, LanguageTag, SurfaceForm};
pub use report::{CleanupSummary, PassReport, Stage};
pub use subtitle_classifier::{ForcedVerdict, GroupOutcome, SubtitleClassifier, classify_forced};
