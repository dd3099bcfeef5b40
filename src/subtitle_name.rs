use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};

// @module: Structured view of subtitle file names

// @const: <base>[.<variant>].<lang>[.forced].srt
static SUBTITLE_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<base>.+?)(?:\.(?P<variant>[12]))?\.(?P<lang>[a-z]{2,3})(?P<forced>\.forced)?\.srt$")
        .unwrap()
});

/// Upstream numbering of two same-language subtitle files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// `.1.` marker, assumed to be the full track
    First,
    /// `.2.` marker, the forced candidate
    Second,
}

impl Variant {
    fn marker(self) -> &'static str {
        match self {
            Self::First => "1",
            Self::Second => "2",
        }
    }
}

/// A subtitle file name split into its parts.
///
/// `Movie (2019).1.en.srt` decomposes into base `Movie (2019)`, variant `First`,
/// language `en`, not forced. [`SubtitleName::to_path`] re-synthesizes the path,
/// so renames are expressed as edits of the parts instead of string splicing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleName {
    pub dir: PathBuf,
    pub base: String,
    pub variant: Option<Variant>,
    pub language: String,
    pub forced: bool,
}

impl SubtitleName {
    /// Decompose a path, or `None` if its file name is not a tagged `.srt` name
    pub fn parse(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        let caps = SUBTITLE_NAME_REGEX.captures(file_name)?;

        let variant = caps.name("variant").map(|m| match m.as_str() {
            "1" => Variant::First,
            _ => Variant::Second,
        });

        Some(Self {
            dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            base: caps["base"].to_string(),
            variant,
            language: caps["lang"].to_string(),
            forced: caps.name("forced").is_some(),
        })
    }

    pub fn file_name(&self) -> String {
        let mut name = self.base.clone();
        if let Some(variant) = self.variant {
            name.push('.');
            name.push_str(variant.marker());
        }
        name.push('.');
        name.push_str(&self.language);
        if self.forced {
            name.push_str(".forced");
        }
        name.push_str(".srt");
        name
    }

    pub fn to_path(&self) -> PathBuf {
        self.dir.join(self.file_name())
    }

    pub fn with_variant(&self, variant: Option<Variant>) -> Self {
        Self {
            variant,
            ..self.clone()
        }
    }

    pub fn with_language(&self, language: &str) -> Self {
        Self {
            language: language.to_string(),
            ..self.clone()
        }
    }

    pub fn with_forced(&self, forced: bool) -> Self {
        Self {
            forced,
            ..self.clone()
        }
    }

    /// Canonical full-track name: `<base>.<lang>.srt`
    pub fn canonical_original(&self, long_tag: &str) -> Self {
        self.with_variant(None).with_language(long_tag).with_forced(false)
    }

    /// Canonical forced-track name: `<base>.<lang>.forced.srt`
    pub fn canonical_forced(&self, long_tag: &str) -> Self {
        self.with_variant(None).with_language(long_tag).with_forced(true)
    }
}

impl fmt::Display for SubtitleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_path().display())
    }
}
