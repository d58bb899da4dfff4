//! Reciprocal match engine
//!
//! Two users match when each one natively speaks a language the other wants
//! to learn. Both directions need their own witness code:
//!
//! - `my_native`: a code in `requester.natives ∩ candidate.targets`
//! - `my_target`: a code in `candidate.natives ∩ requester.targets`
//!
//! When several codes qualify, the lexicographically smallest one is chosen,
//! so repeated queries over the same data report the same pair.
//!
//! Everything here is pure computation over in-memory sets. Loading the
//! population and resolving the requester belong to the caller.

use crate::languages::{language_label, LanguageProfile, LanguageSet};
use crate::UserId;
use serde::{Deserialize, Serialize};

/// A user together with their language sets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub display_name: String,
    pub email: String,
    #[serde(flatten)]
    pub languages: LanguageProfile,
}

/// The requester's side of a reciprocal pairing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguagePair {
    /// Requester's native language the candidate wants to learn
    pub my_native: String,
    /// Candidate's native language the requester wants to learn
    pub my_target: String,
}

impl LanguagePair {
    /// Find the reciprocal witnesses between two profiles
    ///
    /// Returns `None` unless both directions have a witness.
    pub fn find(requester: &LanguageProfile, candidate: &LanguageProfile) -> Option<Self> {
        let my_native = first_common(&requester.natives, &candidate.targets)?;
        let my_target = first_common(&candidate.natives, &requester.targets)?;

        Some(Self {
            my_native: my_native.clone(),
            my_target: my_target.clone(),
        })
    }
}

/// Smallest code present in both sets
fn first_common<'a>(left: &'a LanguageSet, right: &LanguageSet) -> Option<&'a String> {
    left.iter().find(|code| right.contains(*code))
}

/// One reciprocal match, as reported to the requester
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    #[serde(rename = "id")]
    pub candidate_id: UserId,
    #[serde(rename = "displayName")]
    pub candidate_display_name: String,
    #[serde(rename = "natives")]
    pub candidate_natives: LanguageSet,
    #[serde(rename = "targets")]
    pub candidate_targets: LanguageSet,
    pub pair: LanguagePair,
    pub reason: String,
}

impl MatchResult {
    fn new(candidate: &UserProfile, pair: LanguagePair) -> Self {
        let reason = format!(
            "{} speaks {} and wants to learn {}, which you speak.",
            candidate.display_name,
            describe_code(&pair.my_target),
            describe_code(&pair.my_native)
        );

        Self {
            candidate_id: candidate.id,
            candidate_display_name: candidate.display_name.clone(),
            candidate_natives: candidate.languages.natives.clone(),
            candidate_targets: candidate.languages.targets.clone(),
            pair,
            reason,
        }
    }
}

/// "Chinese (zh)" for catalog codes, the bare code otherwise
fn describe_code(code: &str) -> String {
    match language_label(code) {
        Some(label) => format!("{} ({})", label, code),
        None => code.to_string(),
    }
}

/// Compute the reciprocal matches of one requester against a candidate pool
///
/// Any pool entry carrying `requester_id` is skipped. Results are ordered by
/// candidate id. An empty native or target set on the requester yields no
/// matches.
///
/// # Examples
///
/// ```
/// use tandem_common::languages::LanguageProfile;
/// use tandem_common::matching::{compute_matches, UserProfile};
///
/// let alice = LanguageProfile::from_raw(["en"], ["zh"]);
/// let bob = UserProfile {
///     id: 2,
///     display_name: "Bob".to_string(),
///     email: "bob@example.com".to_string(),
///     languages: LanguageProfile::from_raw(["zh"], ["en"]),
/// };
///
/// let matches = compute_matches(1, &alice, &[bob]);
/// assert_eq!(matches.len(), 1);
/// assert_eq!(matches[0].pair.my_native, "en");
/// assert_eq!(matches[0].pair.my_target, "zh");
/// ```
pub fn compute_matches(
    requester_id: UserId,
    requester: &LanguageProfile,
    candidates: &[UserProfile],
) -> Vec<MatchResult> {
    if requester.natives.is_empty() || requester.targets.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<MatchResult> = candidates
        .iter()
        .filter(|candidate| candidate.id != requester_id)
        .filter_map(|candidate| {
            LanguagePair::find(requester, &candidate.languages)
                .map(|pair| MatchResult::new(candidate, pair))
        })
        .collect();

    matches.sort_by_key(|m| m.candidate_id);
    matches
}
