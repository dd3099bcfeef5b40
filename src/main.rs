#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

use mediatidy::app_config::{Config, LogLevel};
use mediatidy::{Controller, LanguageTag};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Clean one or more content directories (default command)
    Clean(CleanArgs),

    /// Generate shell completions for mediatidy
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
struct CleanArgs {
    /// Content directories to clean (overrides `content_dirs` from the config file)
    #[arg(value_name = "CONTENT_DIR")]
    content_dirs: Vec<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Log what would change without touching any file
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Recognized language as `en` or `en=eng` (repeatable, replaces the config list)
    #[arg(short = 'L', long = "language", value_name = "CODE[=CODE3]")]
    languages: Vec<String>,

    /// Append subtitles that need manual review to this file
    #[arg(long, value_name = "FILE")]
    review_log: Option<PathBuf>,
}

/// mediatidy - subtitle naming and leftover cleanup for media libraries
#[derive(Parser, Debug)]
#[command(name = "mediatidy")]
#[command(version)]
#[command(about = "Normalize subtitle names and prune media manager leftovers")]
#[command(long_about = "mediatidy renames `.1.en.srt`/`.2.en.srt` subtitle pairs to `.eng.srt` and
`.eng.forced.srt`, rewrites 2-letter language tags to 3-letter ones, deletes .nfo/.txt
files and removes empty directories.

EXAMPLES:
    mediatidy /media/movies /media/tv         # Clean two libraries
    mediatidy -n /media/movies                # Show what would change
    mediatidy -L en -L de=ger /media/movies   # Recognize English and German tags
    mediatidy completions bash > mediatidy.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't exist,
    a default one is created.")]
#[command(args_conflicts_with_subcommands = true)]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    clean: CleanArgs,
}

// @struct: Custom logger implementation; filtering follows `log::max_level`
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "mediatidy", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Clean(args)) => run_clean(args),
        None => run_clean(cli.clean),
    }
}

fn run_clean(options: CleanArgs) -> Result<()> {
    if let Some(level) = &options.log_level {
        log::set_max_level(LogLevel::from(level.clone()).to_level_filter());
    }

    let mut config = Config::load_or_create(&options.config_path)?;
    apply_overrides(&mut config, &options)?;

    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let controller = if options.dry_run {
        Controller::dry_run(config)
    } else {
        Controller::with_config(config)
    }
    .context("Configuration validation failed")?;

    let summaries = controller.run();
    let mut failures = 0;
    for summary in &summaries {
        if let Some(fatal) = &summary.fatal {
            error!("'{}' was not cleaned: {}", summary.content_dir.display(), fatal);
        }
        failures += summary.failure_count();
    }

    if failures > 0 {
        bail!("{} item(s) could not be cleaned, see the log above", failures);
    }
    Ok(())
}

// CLI values win over the config file
fn apply_overrides(config: &mut Config, options: &CleanArgs) -> Result<()> {
    if !options.content_dirs.is_empty() {
        config.content_dirs = options.content_dirs.clone();
    }

    if !options.languages.is_empty() {
        let mut languages = BTreeMap::new();
        for arg in &options.languages {
            let tag = parse_language_arg(arg)?;
            languages.insert(tag.short, tag.long);
        }
        config.languages = languages;
    }

    if let Some(review_log) = &options.review_log {
        config.review_log = Some(review_log.clone());
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    Ok(())
}

fn parse_language_arg(arg: &str) -> Result<LanguageTag> {
    let tag = match arg.split_once('=') {
        Some((short, long)) => LanguageTag::new(short, long),
        None => LanguageTag::from_short(arg),
    };
    tag.map_err(|e| anyhow!("Invalid --language '{}': {}", arg, e))
}
