//! Language codes, tags and per-user language profiles
//!
//! Language lists supplied by users are always passed through
//! [`normalize_codes`] before they are stored or compared. Codes are held in
//! ordered sets so that iteration (and serialization) is lexicographic.

use crate::{Error, Result, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Ordered set of normalized language codes
pub type LanguageSet = BTreeSet<String>;

/// Longest accepted code (BCP 47 language tags stay well below this)
pub const MAX_CODE_LEN: usize = 35;

/// Whether a user speaks a language natively or wants to learn it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageKind {
    Native,
    Target,
}

impl LanguageKind {
    /// Value stored in the `user_languages.kind` column
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageKind::Native => "native",
            LanguageKind::Target => "target",
        }
    }
}

impl fmt::Display for LanguageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LanguageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "native" => Ok(LanguageKind::Native),
            "target" => Ok(LanguageKind::Target),
            other => Err(Error::InvalidInput(format!("Unknown language kind: {}", other))),
        }
    }
}

/// One stored `(user, code, kind)` triple
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LanguageTag {
    pub user_id: UserId,
    pub code: String,
    pub kind: LanguageKind,
}

/// A user's languages, partitioned by kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageProfile {
    pub natives: LanguageSet,
    pub targets: LanguageSet,
}

impl LanguageProfile {
    /// Build a profile from raw user input, normalizing both lists
    pub fn from_raw<N, T, S1, S2>(natives: N, targets: T) -> Self
    where
        N: IntoIterator<Item = S1>,
        T: IntoIterator<Item = S2>,
        S1: AsRef<str>,
        S2: AsRef<str>,
    {
        Self {
            natives: normalize_codes(natives),
            targets: normalize_codes(targets),
        }
    }

    /// Add one already-normalized code
    pub fn insert(&mut self, kind: LanguageKind, code: String) {
        match kind {
            LanguageKind::Native => self.natives.insert(code),
            LanguageKind::Target => self.targets.insert(code),
        };
    }

    pub fn is_empty(&self) -> bool {
        self.natives.is_empty() && self.targets.is_empty()
    }

    /// Reject codes that do not look like language tags
    pub fn validate(&self) -> Result<()> {
        self.natives
            .iter()
            .chain(self.targets.iter())
            .try_for_each(|code| validate_code(code))
    }

    /// Flatten into storable tags, natives first
    pub fn to_tags(&self, user_id: UserId) -> Vec<LanguageTag> {
        let natives = self.natives.iter().map(|code| LanguageTag {
            user_id,
            code: code.clone(),
            kind: LanguageKind::Native,
        });
        let targets = self.targets.iter().map(|code| LanguageTag {
            user_id,
            code: code.clone(),
            kind: LanguageKind::Target,
        });
        natives.chain(targets).collect()
    }
}

impl FromIterator<LanguageTag> for LanguageProfile {
    fn from_iter<I: IntoIterator<Item = LanguageTag>>(iter: I) -> Self {
        let mut profile = LanguageProfile::default();
        for tag in iter {
            profile.insert(tag.kind, tag.code);
        }
        profile
    }
}

/// Normalize a single code: trim and lower-case; `None` when empty
pub fn normalize_code(raw: &str) -> Option<String> {
    let code = raw.trim().to_lowercase();
    if code.is_empty() {
        None
    } else {
        Some(code)
    }
}

/// Normalize a user-supplied list of language codes into a set
///
/// Trims whitespace, lower-cases, drops empty strings and de-duplicates.
///
/// # Examples
///
/// ```
/// use tandem_common::languages::normalize_codes;
///
/// let codes = normalize_codes(["EN", " en ", "en", "  "]);
/// assert_eq!(codes.into_iter().collect::<Vec<_>>(), vec!["en".to_string()]);
/// ```
pub fn normalize_codes<I, S>(raw: I) -> LanguageSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .filter_map(|s| normalize_code(s.as_ref()))
        .collect()
}

/// Check that a normalized code has the shape of a language tag
pub fn validate_code(code: &str) -> Result<()> {
    if code.is_empty() || code.len() > MAX_CODE_LEN {
        return Err(Error::InvalidInput(format!(
            "Language code must be 1-{} characters: {:?}",
            MAX_CODE_LEN, code
        )));
    }
    if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(Error::InvalidInput(format!(
            "Language code may only contain letters, digits and '-': {:?}",
            code
        )));
    }
    Ok(())
}

/// Normalize an e-mail address for storage and lookup
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Entry in the catalog of languages offered at setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LanguageInfo {
    pub code: &'static str,
    pub label: &'static str,
}

/// Languages offered by the setup screen; other codes are still accepted
pub const LANGUAGE_CATALOG: &[LanguageInfo] = &[
    LanguageInfo { code: "en", label: "English" },
    LanguageInfo { code: "zh", label: "Chinese" },
    LanguageInfo { code: "id", label: "Indonesian" },
    LanguageInfo { code: "ja", label: "Japanese" },
    LanguageInfo { code: "ko", label: "Korean" },
    LanguageInfo { code: "fr", label: "French" },
    LanguageInfo { code: "de", label: "German" },
];

/// Display label for a catalog code
pub fn language_label(code: &str) -> Option<&'static str> {
    LANGUAGE_CATALOG
        .iter()
        .find(|info| info.code == code)
        .map(|info| info.label)
}
