//! Rewrite text so it reads as written by a person.
//!
//! [`Humanizer`] asks the gateway for a conversational rewrite, checks the
//! rewrite with a [`FidelityValidator`], and scores it with
//! [`humanness_score`]. Every failure (provider error, refusal, rejected
//! rewrite) falls back to the original text with `applied: false`, so
//! callers can always use [`HumanizeOutcome::humanized`].
//!
//! Accepted rewrites get a light post-process that swaps stiff connectors
//! ("In conclusion", "Sin embargo") for conversational ones. Two smaller
//! enrichers, [`Humanizer::add_anecdote`] and [`Humanizer::add_humor`],
//! splice extra material into content without the fidelity check.

use std::sync::Arc;

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::fidelity::{FidelityValidator, humanness_score};
use crate::{GenerationRequest, TextGateway};

/// Texts shorter than this (after trimming) are returned unchanged.
pub const MIN_TEXT_CHARS: usize = 20;

const MAX_TOKENS: u32 = 1500;
const BASE_TEMPERATURE: f32 = 0.7;
const DEFAULT_TONE: &str = "conversational and authentic";

const ENRICH_MAX_TOKENS: u32 = 800;
const ANECDOTE_TEMPERATURE: f32 = 0.7;
const HUMOR_TEMPERATURE: f32 = 0.8;

/// Formal connectors and their conversational stand-ins. Only the first
/// occurrence of each is replaced.
const CONNECTORS: &[(&str, &str)] = &[
    ("En conclusión", "Al final"),
    ("Por otro lado", "Pero mira"),
    ("Además", "Y encima"),
    ("Sin embargo", "Pero"),
    ("In conclusion", "In the end"),
    ("On the other hand", "Then again"),
    ("Furthermore", "Plus"),
    ("Moreover", "On top of that"),
];

/// Rewriting technique requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Technique {
    ConversationalTone,
    Humor,
    Professional,
    Anecdotes,
    EmotionalTriggers,
    Vulnerability,
    Relatability,
}

impl Technique {
    /// Sampling temperature suited to the technique.
    pub fn temperature(self) -> f32 {
        match self {
            Self::ConversationalTone => 0.7,
            Self::Humor => 0.9,
            Self::Professional => 0.5,
            Self::Anecdotes => 0.8,
            Self::EmotionalTriggers => 0.75,
            Self::Vulnerability => 0.65,
            Self::Relatability => 0.7,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ConversationalTone => "conversational_tone",
            Self::Humor => "humor",
            Self::Professional => "professional",
            Self::Anecdotes => "anecdotes",
            Self::EmotionalTriggers => "emotional_triggers",
            Self::Vulnerability => "vulnerability",
            Self::Relatability => "relatability",
        }
    }

    /// Techniques for a voice tone such as "casual" or "professional".
    pub fn for_tone(tone: Option<&str>) -> Vec<Technique> {
        let mut techniques = vec![Self::ConversationalTone, Self::Relatability];
        let tone = tone.unwrap_or_default().to_lowercase();
        if tone.contains("casual") || tone.contains("friendly") {
            techniques.extend([Self::Humor, Self::Anecdotes]);
        } else if tone.contains("professional") {
            techniques.push(Self::Vulnerability);
        } else if tone.contains("inspirational") {
            techniques.extend([Self::EmotionalTriggers, Self::Anecdotes]);
        }
        techniques
    }
}

/// Highest technique temperature, or the base temperature for none.
pub fn temperature_for(techniques: &[Technique]) -> f32 {
    techniques
        .iter()
        .map(|t| t.temperature())
        .reduce(f32::max)
        .unwrap_or(BASE_TEMPERATURE)
}

/// Result of one humanization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HumanizeOutcome {
    pub original: String,
    /// The rewrite when `applied`, otherwise the original.
    pub humanized: String,
    pub applied: bool,
    /// 0 unless `applied`.
    pub humanness_score: u32,
    pub techniques: Vec<Technique>,
    /// Why the rewrite was not applied.
    pub reason: Option<String>,
}

impl HumanizeOutcome {
    fn unchanged(text: &str, techniques: Vec<Technique>, reason: impl Into<String>) -> Self {
        Self {
            original: text.to_owned(),
            humanized: text.to_owned(),
            applied: false,
            humanness_score: 0,
            techniques,
            reason: Some(reason.into()),
        }
    }
}

/// Flavor of humor requested by [`Humanizer::add_humor`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HumorStyle {
    #[default]
    Subtle,
    Conversational,
    Observational,
}

impl HumorStyle {
    fn description(self) -> &'static str {
        match self {
            Self::Subtle => "subtle, professional humor",
            Self::Conversational => "casual, friendly humor",
            Self::Observational => "observational humor about the topic",
        }
    }
}

/// Result of an enrichment pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enrichment {
    /// The enriched content when `applied`, otherwise the input.
    pub content: String,
    pub applied: bool,
    pub reason: Option<String>,
}

/// Conversational rewriter built on a [`TextGateway`].
pub struct Humanizer {
    gateway: Arc<dyn TextGateway>,
    validator: FidelityValidator,
    max_tokens: u32,
}

impl Humanizer {
    pub fn new(gateway: Arc<dyn TextGateway>, validator: FidelityValidator) -> Self {
        Self {
            gateway,
            validator,
            max_tokens: MAX_TOKENS,
        }
    }

    /// Override the generation budget (default 1500 tokens).
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Rewrite `text` using `techniques`.
    ///
    /// An empty technique list uses the defaults for an unspecified tone.
    pub async fn humanize(&self, text: &str, techniques: &[Technique]) -> HumanizeOutcome {
        let techniques = if techniques.is_empty() {
            Technique::for_tone(None)
        } else {
            techniques.to_vec()
        };
        self.rewrite(text, None, techniques).await
    }

    /// Rewrite `text` in a voice tone such as "casual" or "professional".
    ///
    /// The tone picks the techniques (see [`Technique::for_tone`]) and is
    /// passed to the model as the desired tone.
    pub async fn humanize_for_tone(&self, text: &str, tone: Option<&str>) -> HumanizeOutcome {
        self.rewrite(text, tone, Technique::for_tone(tone)).await
    }

    async fn rewrite(
        &self,
        text: &str,
        tone: Option<&str>,
        techniques: Vec<Technique>,
    ) -> HumanizeOutcome {
        if text.trim().chars().count() < MIN_TEXT_CHARS {
            return HumanizeOutcome::unchanged(text, techniques, "text too short");
        }

        let request = GenerationRequest::new(rewrite_prompt(text, tone, &techniques))
            .max_tokens(self.max_tokens)
            .temperature(temperature_for(&techniques));

        let rewrite = match self.gateway.generate(&request).await {
            Ok(rewrite) => rewrite.trim().to_owned(),
            Err(e) => {
                warn!(error = %e, "humanize generation failed");
                return HumanizeOutcome::unchanged(text, techniques, e.to_string());
            }
        };

        let validation = self.validator.validate(text, &rewrite);
        if let Some(reason) = validation.reason {
            return HumanizeOutcome::unchanged(
                text,
                techniques,
                format!("rewrite rejected: {reason}"),
            );
        }

        let rewrite = soften_connectors(&rewrite);
        let score = humanness_score(&rewrite);
        info!(
            original_chars = text.chars().count(),
            humanized_chars = rewrite.chars().count(),
            humanness_score = score,
            "humanized text"
        );
        HumanizeOutcome {
            original: text.to_owned(),
            humanized: rewrite,
            applied: true,
            humanness_score: score,
            techniques,
            reason: None,
        }
    }

    /// Weave a short anecdote about `topic` into `content`.
    pub async fn add_anecdote(&self, content: &str, topic: &str) -> Enrichment {
        let prompt = format!(
            "Add a brief, relevant anecdote to this content.\n\n\
             Content: {content}\n\
             Topic: {topic}\n\n\
             Keep it to two or three sentences that illustrate the main point \
             and sound authentic.\n\
             Return the full content with the anecdote included."
        );
        self.enrich(content, prompt, ANECDOTE_TEMPERATURE).await
    }

    /// Work humor of the given style into `content`.
    pub async fn add_humor(&self, content: &str, style: HumorStyle) -> Enrichment {
        let prompt = format!(
            "Add {} to this content:\n\n{content}\n\n\
             Keep it natural and suited to the context. It should support the \
             message, not distract from it.\n\
             Return the content with the humor included.",
            style.description()
        );
        self.enrich(content, prompt, HUMOR_TEMPERATURE).await
    }

    async fn enrich(&self, content: &str, prompt: String, temperature: f32) -> Enrichment {
        let request = GenerationRequest::new(prompt)
            .max_tokens(ENRICH_MAX_TOKENS)
            .temperature(temperature);
        let reason = match self.gateway.generate(&request).await {
            Ok(enhanced) if !enhanced.trim().is_empty() => {
                return Enrichment {
                    content: enhanced.trim().to_owned(),
                    applied: true,
                    reason: None,
                };
            }
            Ok(_) => "empty reply".to_owned(),
            Err(e) => e.to_string(),
        };
        warn!(reason = %reason, "enrichment failed");
        Enrichment {
            content: content.to_owned(),
            applied: false,
            reason: Some(reason),
        }
    }

    /// Humanize several texts concurrently with the same techniques.
    pub async fn humanize_batch(
        &self,
        texts: &[&str],
        techniques: &[Technique],
    ) -> Vec<HumanizeOutcome> {
        join_all(texts.iter().map(|text| self.humanize(text, techniques))).await
    }
}

fn rewrite_prompt(text: &str, tone: Option<&str>, techniques: &[Technique]) -> String {
    let names: Vec<&str> = techniques.iter().map(|t| t.as_str()).collect();
    format!(
        "Rewrite the following text so it sounds written by a person, not generated.\n\
         Desired tone: {}\n\
         Techniques: {}\n\
         Keep the core message and every fact. Do not invent data.\n\
         Vary sentence length; a rhetorical question or a pause (...) is welcome.\n\
         Return only the rewritten text.\n\n\
         Text:\n{text}",
        tone.unwrap_or(DEFAULT_TONE),
        names.join(", ")
    )
}

/// Replace the first occurrence of each formal connector, ignoring case
/// and matching whole words only.
fn soften_connectors(text: &str) -> String {
    let mut out = text.to_owned();
    for (formal, casual) in CONNECTORS {
        if let Some((start, end)) = find_phrase(&out, formal) {
            let starts_lower = out[start..].chars().next().is_some_and(char::is_lowercase);
            let replacement = if starts_lower {
                lowercase_first(casual)
            } else {
                (*casual).to_owned()
            };
            out.replace_range(start..end, &replacement);
        }
    }
    out
}

/// Byte range of the first case-insensitive, word-bounded match of `phrase`.
fn find_phrase(text: &str, phrase: &str) -> Option<(usize, usize)> {
    let is_word = |c: char| c.is_alphanumeric();
    for (start, _) in text.char_indices() {
        if text[..start].chars().next_back().is_some_and(is_word) {
            continue;
        }
        let mut rest = text[start..].char_indices();
        let mut end = start;
        let mut matched = true;
        for p in phrase.chars() {
            match rest.next() {
                Some((offset, c)) if c.to_lowercase().eq(p.to_lowercase()) => {
                    end = start + offset + c.len_utf8();
                }
                _ => {
                    matched = false;
                    break;
                }
            }
        }
        if matched && !text[end..].chars().next().is_some_and(is_word) {
            return Some((start, end));
        }
    }
    None
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_is_highest_of_techniques() {
        assert_eq!(
            temperature_for(&[Technique::Professional, Technique::Humor]),
            0.9
        );
        assert_eq!(temperature_for(&[Technique::Professional]), 0.5);
        assert_eq!(temperature_for(&[]), BASE_TEMPERATURE);
    }

    #[test]
    fn tone_selects_techniques() {
        assert_eq!(
            Technique::for_tone(Some("Casual and warm")),
            vec![
                Technique::ConversationalTone,
                Technique::Relatability,
                Technique::Humor,
                Technique::Anecdotes
            ]
        );
        assert_eq!(Technique::for_tone(None).len(), 2);
    }

    #[test]
    fn prompt_lists_tone_techniques_and_text() {
        let prompt = rewrite_prompt("Our Q3 numbers improved.", None, &[Technique::Humor]);
        assert!(prompt.contains("humor"));
        assert!(prompt.contains(DEFAULT_TONE));
        assert!(prompt.ends_with("Our Q3 numbers improved."));

        let prompt = rewrite_prompt("Our Q3 numbers improved.", Some("playful"), &[]);
        assert!(prompt.contains("Desired tone: playful"));
    }

    #[test]
    fn connectors_are_softened_once() {
        assert_eq!(
            soften_connectors("Sin embargo, funciona. Sin embargo, cuesta."),
            "Pero, funciona. Sin embargo, cuesta."
        );
        assert_eq!(
            soften_connectors("EN CONCLUSIÓN, vale la pena."),
            "Al final, vale la pena."
        );
        assert_eq!(
            soften_connectors("It works. furthermore, it is cheap."),
            "It works. plus, it is cheap."
        );
    }

    #[test]
    fn connectors_match_whole_words_only() {
        assert_eq!(soften_connectors("Furthermores are rare."), "Furthermores are rare.");
        assert_eq!(soften_connectors("NoAdemás"), "NoAdemás");
    }

    #[test]
    fn find_phrase_handles_multibyte_text() {
        let text = "¿Y además? sí";
        let (start, end) = find_phrase(text, "Además").unwrap();
        assert_eq!(&text[start..end], "además");
    }
}
