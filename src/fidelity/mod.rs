//! Response-fidelity validation.
//!
//! [`FidelityValidator`] decides whether a model's rewrite of a source text
//! is usable. Checks run in a fixed order and the first failure names the
//! [`RejectionReason`]:
//!
//! 1. the candidate contains a refusal phrase,
//! 2. the candidate is blank or the source has no words,
//! 3. the candidate is too short relative to the source,
//! 4. too few of the source's words survive,
//! 5. too few of the source's key terms (non-stopwords longer than two
//!    characters) survive.
//!
//! When the source has no key terms, step 5 is skipped and general word
//! overlap decides alone.
//!
//! Rejection is data, not an error: callers inspect [`ValidationResult`]
//! and fall back as they see fit.

pub mod humanness;
pub mod terms;

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::telemetry;
use terms::{DEFAULT_REFUSAL_PHRASES, DEFAULT_STOPWORDS, key_terms, normalize, overlap, words};

pub use humanness::humanness_score;

/// Validator thresholds and word lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FidelityConfig {
    /// Minimum `chars(candidate) / chars(source)`. Default: 0.6.
    pub min_content_ratio: f64,
    /// Minimum fraction of source words present in the candidate. Default: 0.5.
    pub min_overlap: f64,
    /// Minimum fraction of source key terms present in the candidate. Default: 0.7.
    pub min_key_term_overlap: f64,
    /// Substrings that mark a refusal, matched case-insensitively.
    pub refusal_phrases: Vec<String>,
    /// Words excluded from key terms, matched case-insensitively.
    pub stopwords: HashSet<String>,
}

impl Default for FidelityConfig {
    fn default() -> Self {
        Self {
            min_content_ratio: 0.6,
            min_overlap: 0.5,
            min_key_term_overlap: 0.7,
            refusal_phrases: DEFAULT_REFUSAL_PHRASES
                .iter()
                .map(|p| (*p).to_owned())
                .collect(),
            stopwords: DEFAULT_STOPWORDS.iter().map(|w| (*w).to_owned()).collect(),
        }
    }
}

impl FidelityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_content_ratio(mut self, ratio: f64) -> Self {
        self.min_content_ratio = ratio;
        self
    }

    pub fn min_overlap(mut self, overlap: f64) -> Self {
        self.min_overlap = overlap;
        self
    }

    pub fn min_key_term_overlap(mut self, overlap: f64) -> Self {
        self.min_key_term_overlap = overlap;
        self
    }

    /// Add an extra refusal phrase (matched case-insensitively).
    pub fn refusal_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.refusal_phrases.push(normalize(&phrase.into()));
        self
    }

    /// Add an extra stopword (matched case-insensitively).
    pub fn stopword(mut self, word: impl Into<String>) -> Self {
        self.stopwords.insert(normalize(&word.into()));
        self
    }
}

/// Why a candidate was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    Refused,
    Empty,
    TooShort,
    LowOverlap,
    LowKeyTerms,
}

impl RejectionReason {
    /// Stable tag used in logs and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Refused => "refused",
            Self::Empty => "empty",
            Self::TooShort => "too_short",
            Self::LowOverlap => "low_overlap",
            Self::LowKeyTerms => "low_key_terms",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scores for one source/candidate pair.
///
/// All scores are computed even when an earlier check already rejected the
/// candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub accepted: bool,
    pub content_ratio: f64,
    pub general_overlap: f64,
    /// `None` when the source has no key terms.
    pub key_term_overlap: Option<f64>,
    pub reason: Option<RejectionReason>,
}

/// Checks candidate rewrites against their source.
#[derive(Debug, Clone, Default)]
pub struct FidelityValidator {
    config: FidelityConfig,
}

impl FidelityValidator {
    pub fn new(config: FidelityConfig) -> Self {
        let mut config = config;
        for phrase in &mut config.refusal_phrases {
            *phrase = normalize(phrase);
        }
        config.stopwords = config.stopwords.iter().map(|w| normalize(w)).collect();
        Self { config }
    }

    pub fn config(&self) -> &FidelityConfig {
        &self.config
    }

    /// Whether `text` contains any configured refusal phrase.
    pub fn is_refusal(&self, text: &str) -> bool {
        let text = normalize(text);
        self.config
            .refusal_phrases
            .iter()
            .any(|phrase| text.contains(phrase.as_str()))
    }

    /// Validate `candidate` as a rewrite of `source`.
    pub fn validate(&self, source: &str, candidate: &str) -> ValidationResult {
        let source_chars = source.trim().chars().count();
        let content_ratio = if source_chars == 0 {
            0.0
        } else {
            candidate.trim().chars().count() as f64 / source_chars as f64
        };

        let source_words = words(source);
        let candidate_words = words(candidate);
        let general_overlap = overlap(&source_words, &candidate_words);

        let source_keys = key_terms(source, &self.config.stopwords);
        let key_term_overlap = (!source_keys.is_empty())
            .then(|| overlap(&source_keys, &key_terms(candidate, &self.config.stopwords)));

        let reason = if self.is_refusal(candidate) {
            Some(RejectionReason::Refused)
        } else if candidate.trim().is_empty() || source_words.is_empty() {
            Some(RejectionReason::Empty)
        } else if content_ratio < self.config.min_content_ratio {
            Some(RejectionReason::TooShort)
        } else if general_overlap < self.config.min_overlap {
            Some(RejectionReason::LowOverlap)
        } else if key_term_overlap.is_some_and(|k| k < self.config.min_key_term_overlap) {
            Some(RejectionReason::LowKeyTerms)
        } else {
            None
        };

        if let Some(reason) = reason {
            metrics::counter!(telemetry::VALIDATION_REJECTIONS_TOTAL,
                "reason" => reason.as_str(),
            )
            .increment(1);
            warn!(
                reason = reason.as_str(),
                content_ratio,
                general_overlap,
                key_term_overlap,
                "candidate rejected"
            );
        }

        ValidationResult {
            accepted: reason.is_none(),
            content_ratio,
            general_overlap,
            key_term_overlap,
            reason,
        }
    }
}
