use anyhow::{Result, anyhow};
use isolang::Language;
use std::collections::BTreeMap;

use crate::errors::ConfigError;

/// Language utilities for ISO language code handling
///
/// Subtitle files carry their language either as an ISO 639-1 (2-letter) tag or as an
/// ISO 639-2 (3-letter) tag. The cleanup passes only act on the pairs listed in a
/// [`LanguageTable`], which is validated against `isolang` when it is built.
/// Language code type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-2/T (3-letter) code
    Part2T,
    /// ISO 639-2/B (3-letter) code
    Part2B,
}

// ISO 639-2/B codes that differ from their 639-2/T counterpart
const PART2B_TO_PART2T: &[(&str, &str)] = &[
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

fn part2b_to_part2t(code: &str) -> Option<&'static str> {
    PART2B_TO_PART2T
        .iter()
        .find(|(b, _)| *b == code)
        .map(|(_, t)| *t)
}

/// Validate if a language code is a valid ISO 639-1 or ISO 639-2 code
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if Language::from_639_1(&normalized_code).is_some() {
            return Ok(LanguageCodeType::Part1);
        }
    } else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(LanguageCodeType::Part2T);
        }
        if part2b_to_part2t(&normalized_code).is_some() {
            return Ok(LanguageCodeType::Part2B);
        }
    }

    Err(anyhow!("Invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if let Some(lang) = Language::from_639_1(&normalized_code) {
            return Ok(lang.to_639_3().to_string());
        }
    } else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(normalized_code);
        }
        if let Some(part2t) = part2b_to_part2t(&normalized_code) {
            return Ok(part2t.to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

/// Which of the two surface forms a tag is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SurfaceForm {
    /// 2-letter form, e.g. `en`
    Short,
    /// 3-letter form, e.g. `eng`
    Long,
}

impl SurfaceForm {
    /// The other surface form of the same tag
    pub fn other(self) -> Self {
        match self {
            Self::Short => Self::Long,
            Self::Long => Self::Short,
        }
    }
}

/// A recognized language: the same language in its 2-letter and 3-letter spelling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageTag {
    pub short: String,
    pub long: String,
}

impl LanguageTag {
    /// Build a validated pair. Both codes must name the same language.
    pub fn new(short: &str, long: &str) -> Result<Self, ConfigError> {
        let short = short.trim().to_lowercase();
        let long = long.trim().to_lowercase();
        let invalid = |reason: &str| ConfigError::InvalidLanguagePair {
            short: short.clone(),
            long: long.clone(),
            reason: reason.to_string(),
        };

        if !matches!(validate_language_code(&short), Ok(LanguageCodeType::Part1)) {
            return Err(invalid("first code is not an ISO 639-1 code"));
        }
        match validate_language_code(&long) {
            Ok(LanguageCodeType::Part2T) | Ok(LanguageCodeType::Part2B) => {}
            _ => return Err(invalid("second code is not an ISO 639-2 code")),
        }
        if !language_codes_match(&short, &long) {
            return Err(invalid("codes name different languages"));
        }

        Ok(Self { short, long })
    }

    /// Pair a 2-letter code with its ISO 639-2/T spelling
    pub fn from_short(short: &str) -> Result<Self, ConfigError> {
        let long = normalize_to_part2t(short).map_err(|e| ConfigError::InvalidLanguagePair {
            short: short.to_string(),
            long: String::new(),
            reason: e.to_string(),
        })?;
        Self::new(short, &long)
    }

    /// The tag as written in the given surface form
    pub fn surface(&self, form: SurfaceForm) -> &str {
        match form {
            SurfaceForm::Short => &self.short,
            SurfaceForm::Long => &self.long,
        }
    }
}

/// The set of language tags the cleanup passes act on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageTable {
    tags: Vec<LanguageTag>,
}

impl LanguageTable {
    /// Build from a 2-letter -> 3-letter mapping, validating every pair
    pub fn from_pairs(pairs: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let tags = pairs
            .iter()
            .map(|(short, long)| LanguageTag::new(short, long))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { tags })
    }

    /// Find the tag written as `code` and report which surface form was used
    pub fn lookup(&self, code: &str) -> Option<(&LanguageTag, SurfaceForm)> {
        self.tags.iter().find_map(|tag| {
            if tag.short == code {
                Some((tag, SurfaceForm::Short))
            } else if tag.long == code {
                Some((tag, SurfaceForm::Long))
            } else {
                None
            }
        })
    }

    pub fn tags(&self) -> &[LanguageTag] {
        &self.tags
    }
}

impl Default for LanguageTable {
    fn default() -> Self {
        Self {
            tags: vec![LanguageTag {
                short: "en".to_string(),
                long: "eng".to_string(),
            }],
        }
    }
}
