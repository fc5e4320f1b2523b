//! Structured text analysis through the gateway.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::extract::extract_json;
use crate::{GenerationRequest, Result, TextGateway, VerbatimError};

const MAX_TOKENS: u32 = 2000;
const TEMPERATURE: f32 = 0.3;

/// Field holding the raw model output when no JSON object was returned.
pub const RAW_ANALYSIS_KEY: &str = "analysis";

/// What to analyse a text for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    /// Tone, style, personality traits, recurring phrases.
    VoiceAnalysis,
    /// Grammar, clarity, engagement, with a 0-100 score.
    QualityCheck,
    /// Keywords, hashtags, readability, calls to action.
    SeoAnalysis,
}

impl AnalysisKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::VoiceAnalysis => "voice_analysis",
            Self::QualityCheck => "quality_check",
            Self::SeoAnalysis => "seo_analysis",
        }
    }

    fn instructions(self) -> &'static str {
        match self {
            Self::VoiceAnalysis => {
                "Analyze the text for voice and style. Include: tone, writing style, \
                 key personality traits, common phrases or patterns, emotional resonance."
            }
            Self::QualityCheck => {
                "Analyze the quality of the text. Check grammar and spelling, clarity and \
                 readability, engagement potential, platform appropriateness and SEO. \
                 Include a quality_score from 0 to 100 and specific suggestions."
            }
            Self::SeoAnalysis => {
                "Analyze the text for SEO. Identify primary keywords, secondary keywords, \
                 suggested hashtags, a readability score, emotional triggers and \
                 call-to-action opportunities."
            }
        }
    }

    fn prompt(self, text: &str) -> String {
        format!(
            "{}\nRespond with a single JSON object.\n\nText:\n{text}",
            self.instructions()
        )
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisKind {
    type Err = VerbatimError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "voice_analysis" => Ok(Self::VoiceAnalysis),
            "quality_check" => Ok(Self::QualityCheck),
            "seo_analysis" => Ok(Self::SeoAnalysis),
            other => Err(VerbatimError::InvalidInput(format!(
                "unknown analysis type: {other}"
            ))),
        }
    }
}

/// Analyse `text` and return the model's findings as a JSON object.
///
/// Generation errors propagate. Output without a JSON object is returned
/// as `{"analysis": <raw output>}`.
pub async fn analyze_text(
    gateway: &dyn TextGateway,
    text: &str,
    kind: AnalysisKind,
) -> Result<Map<String, Value>> {
    let request = GenerationRequest::new(kind.prompt(text))
        .max_tokens(MAX_TOKENS)
        .temperature(TEMPERATURE);
    let output = gateway.generate(&request).await?;
    Ok(extract_json(&output).into_object_or(RAW_ANALYSIS_KEY))
}
