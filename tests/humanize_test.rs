use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use verbatim::analysis::{AnalysisKind, analyze_text};
use verbatim::humanize::{HumorStyle, Humanizer, Technique};
use verbatim::{FidelityValidator, GenerationRequest, Result, TextGateway, VerbatimError};

const ORIGINAL: &str = "Our bakery opens a second location downtown next Monday with fresh sourdough.";

/// Gateway that answers every request with a fixed reply and records requests.
struct Canned {
    reply: std::result::Result<String, VerbatimError>,
    seen: Mutex<Vec<GenerationRequest>>,
}

impl Canned {
    fn ok(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_owned()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn failing(err: VerbatimError) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(err),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<GenerationRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGateway for Canned {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.seen.lock().unwrap().push(request.clone());
        self.reply.clone()
    }

    fn list_available(&self) -> Vec<String> {
        vec!["canned".into()]
    }

    fn active_provider(&self) -> String {
        "canned".into()
    }

    fn switch_active(&self, name: &str) -> Result<()> {
        Err(VerbatimError::UnknownProvider(name.into()))
    }
}

fn humanizer(gateway: Arc<Canned>) -> Humanizer {
    Humanizer::new(gateway, FidelityValidator::default())
}

// =========================================================================
// Humanizer
// =========================================================================

#[tokio::test]
async fn accepted_rewrite_is_applied_and_scored() {
    let rewrite = "Guess what? Our bakery opens a second location downtown... next Monday, \
                   with fresh sourdough waiting for you.";
    let gateway = Canned::ok(rewrite);

    let outcome = humanizer(gateway.clone())
        .humanize(ORIGINAL, &[Technique::Humor, Technique::Professional])
        .await;

    assert!(outcome.applied, "{outcome:?}");
    assert_eq!(outcome.humanized, rewrite);
    assert_eq!(outcome.original, ORIGINAL);
    assert!(outcome.humanness_score > 0);
    assert_eq!(outcome.reason, None);

    let requests = gateway.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].temperature, 0.9);
    assert_eq!(requests[0].max_tokens, 1500);
    assert!(requests[0].prompt.contains(ORIGINAL));
}

#[tokio::test]
async fn short_text_is_returned_untouched_without_a_call() {
    let gateway = Canned::ok("unused");

    let outcome = humanizer(gateway.clone()).humanize("  too short  ", &[]).await;

    assert!(!outcome.applied);
    assert_eq!(outcome.humanized, "  too short  ");
    assert_eq!(outcome.humanness_score, 0);
    assert!(gateway.requests().is_empty());
}

#[tokio::test]
async fn refused_rewrite_falls_back_to_original() {
    let gateway = Canned::ok("I'm sorry, but I can't rewrite this text.");

    let outcome = humanizer(gateway).humanize(ORIGINAL, &[]).await;

    assert!(!outcome.applied);
    assert_eq!(outcome.humanized, ORIGINAL);
    assert!(outcome.reason.unwrap().contains("refused"));
}

#[tokio::test]
async fn generation_error_falls_back_to_original() {
    let gateway = Canned::failing(VerbatimError::GatewayTimeout {
        attempts: 5,
        last: Box::new(VerbatimError::Transport("timed out".into())),
    });

    let outcome = humanizer(gateway).humanize(ORIGINAL, &[]).await;

    assert!(!outcome.applied);
    assert_eq!(outcome.humanized, ORIGINAL);
    assert!(outcome.reason.unwrap().contains("gateway timeout"));
}

#[tokio::test]
async fn default_techniques_use_base_temperature() {
    let gateway = Canned::ok(ORIGINAL);

    let outcome = humanizer(gateway.clone()).humanize(ORIGINAL, &[]).await;

    assert_eq!(
        outcome.techniques,
        vec![Technique::ConversationalTone, Technique::Relatability]
    );
    assert_eq!(gateway.requests()[0].temperature, 0.7);
}

#[tokio::test]
async fn batch_yields_one_outcome_per_text() {
    let gateway = Canned::ok(ORIGINAL);

    let outcomes = humanizer(gateway.clone())
        .humanize_batch(&[ORIGINAL, "short", ORIGINAL], &[])
        .await;

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].applied);
    assert!(!outcomes[1].applied);
    assert!(outcomes[2].applied);
    assert_eq!(gateway.requests().len(), 2);
}

#[tokio::test]
async fn tone_selects_techniques_and_reaches_the_prompt() {
    let gateway = Canned::ok(ORIGINAL);

    let outcome = humanizer(gateway.clone())
        .humanize_for_tone(ORIGINAL, Some("Friendly"))
        .await;

    assert!(outcome.applied, "{outcome:?}");
    assert_eq!(
        outcome.techniques,
        vec![
            Technique::ConversationalTone,
            Technique::Relatability,
            Technique::Humor,
            Technique::Anecdotes
        ]
    );
    let request = &gateway.requests()[0];
    assert_eq!(request.temperature, 0.9);
    assert!(request.prompt.contains("Desired tone: Friendly"));
}

#[tokio::test]
async fn professional_tone_adds_vulnerability() {
    let gateway = Canned::ok(ORIGINAL);

    let outcome = humanizer(gateway.clone())
        .humanize_for_tone(ORIGINAL, Some("professional"))
        .await;

    assert!(outcome.techniques.contains(&Technique::Vulnerability));
    assert_eq!(gateway.requests()[0].temperature, 0.7);
}

#[tokio::test]
async fn accepted_rewrite_has_formal_connectors_softened() {
    let gateway = Canned::ok(
        "In conclusion, our bakery opens a second location downtown next Monday \
         with fresh sourdough.",
    );

    let outcome = humanizer(gateway).humanize(ORIGINAL, &[]).await;

    assert!(outcome.applied, "{outcome:?}");
    assert!(outcome.humanized.starts_with("In the end, our bakery"));
}

#[tokio::test]
async fn rejected_rewrite_is_not_post_processed() {
    let gateway = Canned::ok("Sin embargo, lo siento, no puedo.");

    let outcome = humanizer(gateway).humanize(ORIGINAL, &[]).await;

    assert!(!outcome.applied);
    assert_eq!(outcome.humanized, ORIGINAL);
}

// =========================================================================
// Enrichers
// =========================================================================

#[tokio::test]
async fn anecdote_is_applied_with_its_own_budget() {
    let gateway = Canned::ok("  Last spring a regular asked for rye. Now we bake it daily.  ");

    let enrichment = humanizer(gateway.clone())
        .add_anecdote(ORIGINAL, "sourdough")
        .await;

    assert!(enrichment.applied);
    assert_eq!(
        enrichment.content,
        "Last spring a regular asked for rye. Now we bake it daily."
    );
    let request = &gateway.requests()[0];
    assert_eq!(request.max_tokens, 800);
    assert_eq!(request.temperature, 0.7);
    assert!(request.prompt.contains("Topic: sourdough"));
    assert!(request.prompt.contains(ORIGINAL));
}

#[tokio::test]
async fn humor_uses_style_and_higher_temperature() {
    let gateway = Canned::ok("Our bakery opens downtown. Bring an appetite.");

    let enrichment = humanizer(gateway.clone())
        .add_humor(ORIGINAL, HumorStyle::Observational)
        .await;

    assert!(enrichment.applied);
    let request = &gateway.requests()[0];
    assert_eq!(request.temperature, 0.8);
    assert!(request.prompt.contains("observational humor"));
}

#[tokio::test]
async fn failed_enrichment_returns_content_unchanged() {
    let gateway = Canned::failing(VerbatimError::Transport("reset".into()));

    let enrichment = humanizer(gateway)
        .add_humor(ORIGINAL, HumorStyle::default())
        .await;

    assert!(!enrichment.applied);
    assert_eq!(enrichment.content, ORIGINAL);
    assert!(enrichment.reason.unwrap().contains("reset"));
}

#[tokio::test]
async fn blank_enrichment_reply_is_not_applied() {
    let gateway = Canned::ok("   ");

    let enrichment = humanizer(gateway).add_anecdote(ORIGINAL, "bread").await;

    assert!(!enrichment.applied);
    assert_eq!(enrichment.content, ORIGINAL);
}

// =========================================================================
// Analysis
// =========================================================================

#[tokio::test]
async fn analysis_extracts_json_from_fenced_reply() {
    let gateway = Canned::ok("Here is the analysis:\n```json\n{\"quality_score\": 82}\n```");

    let analysis = analyze_text(gateway.as_ref(), ORIGINAL, AnalysisKind::QualityCheck)
        .await
        .unwrap();

    assert_eq!(Value::Object(analysis), json!({"quality_score": 82}));
    let request = &gateway.requests()[0];
    assert_eq!(request.max_tokens, 2000);
    assert_eq!(request.temperature, 0.3);
}

#[tokio::test]
async fn analysis_without_json_wraps_raw_reply() {
    let gateway = Canned::ok("Warm, direct, slightly playful.");

    let analysis = analyze_text(gateway.as_ref(), ORIGINAL, AnalysisKind::VoiceAnalysis)
        .await
        .unwrap();

    assert_eq!(
        Value::Object(analysis),
        json!({"analysis": "Warm, direct, slightly playful."})
    );
}

#[tokio::test]
async fn analysis_propagates_generation_errors() {
    let gateway = Canned::failing(VerbatimError::Client {
        status: Some(400),
        message: "bad".into(),
    });

    let err = analyze_text(gateway.as_ref(), ORIGINAL, AnalysisKind::SeoAnalysis)
        .await
        .unwrap_err();

    assert!(matches!(err, VerbatimError::Client { .. }));
}
