//! The reasoning gateway: the single shared call boundary.
//!
//! Every external call in the system funnels through one `ReasoningGateway`
//! so rate limiting is observed globally, not per unit. A call moves through
//! an explicit bounded state machine:
//!
//! ```text
//! Ready -> Sending -> success
//!                  -> Throttled -> (cooldown, counter reset) -> Sending
//!                                   second throttle => failure
//!                  -> any other error => failure
//! ```
//!
//! Retry is bounded at exactly one attempt after a cooldown. The gateway
//! never fabricates content; callers own their fallback behavior.

use crate::backend::{BackendError, ReasoningBackend};
use crate::parse::{self, ReviewAnalysis};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Errors surfaced to the gateway's callers. All of them mean "no content";
/// the distinction only matters for logging.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("reasoning service call failed: {0}")]
    Backend(String),

    #[error("reasoning service still throttled after cooldown retry")]
    Exhausted,

    #[error("unparseable reasoning response: {0}")]
    Unparseable(String),
}

/// Gateway tuning knobs, read once at construction.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Fixed spacing between consecutive calls once the first call has been
    /// made. Matches the external service's rate ceiling.
    pub call_delay: Duration,
    /// Wait after a throttling response before the single retry.
    pub throttle_cooldown: Duration,
    /// Sampling temperature for structured batch analysis.
    pub batch_temperature: f32,
    /// Sampling temperature for free-form answer synthesis.
    pub synthesis_temperature: f32,
    /// Response token budget per call.
    pub max_output_tokens: u32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            call_delay: Duration::from_secs(4),
            throttle_cooldown: Duration::from_secs(60),
            batch_temperature: 0.3,
            synthesis_temperature: 0.7,
            max_output_tokens: 300,
        }
    }
}

/// A review as the gateway sees it. Units convert their domain types at the
/// call site; the gateway has no dependency on the catalog.
#[derive(Debug, Clone)]
pub struct ReviewInput {
    pub text: String,
    pub rating: u8,
}

#[derive(Debug, Default)]
struct GatewayState {
    /// Process-wide successful call counter. Non-zero means the next call
    /// waits `call_delay` first; reset after a throttle cooldown.
    calls_made: u64,
}

/// Per-call phases of the bounded retry machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallPhase {
    Ready,
    Sending { retry: bool },
    Throttled,
}

/// The one component permitted to call the external reasoning service.
pub struct ReasoningGateway {
    backend: Box<dyn ReasoningBackend>,
    config: GatewayConfig,
    state: Mutex<GatewayState>,
}

impl ReasoningGateway {
    pub fn new(backend: Box<dyn ReasoningBackend>, config: GatewayConfig) -> Self {
        Self {
            backend,
            config,
            state: Mutex::new(GatewayState::default()),
        }
    }

    /// Analyze a batch of reviews; returns one parsed entry per input review
    /// or the failure that prevented it.
    pub async fn analyze_batch(
        &self,
        reviews: &[ReviewInput],
    ) -> Result<Vec<ReviewAnalysis>, GatewayError> {
        let prompt = build_batch_prompt(reviews);
        let response = self.call(&prompt, self.config.batch_temperature).await?;
        parse::parse_batch_response(&response, reviews.len())
    }

    /// One free-form synthesis call.
    pub async fn synthesize(&self, prompt: &str) -> Result<String, GatewayError> {
        self.call(prompt, self.config.synthesis_temperature).await
    }

    /// Successful calls made so far (diagnostics only).
    pub async fn calls_made(&self) -> u64 {
        self.state.lock().await.calls_made
    }

    /// Drive one call through the state machine.
    ///
    /// The state lock is held across the whole call, including the pacing
    /// delay and cooldown: the gateway is a deliberate single bottleneck so
    /// the spacing holds globally across concurrent callers.
    async fn call(&self, prompt: &str, temperature: f32) -> Result<String, GatewayError> {
        let mut state = self.state.lock().await;
        let mut phase = CallPhase::Ready;

        loop {
            phase = match phase {
                CallPhase::Ready => {
                    if state.calls_made > 0 {
                        debug!(
                            "Pacing: waiting {:?} before next reasoning call",
                            self.config.call_delay
                        );
                        sleep(self.config.call_delay).await;
                    }
                    CallPhase::Sending { retry: false }
                }
                CallPhase::Sending { retry } => {
                    match self
                        .backend
                        .complete(prompt, temperature, self.config.max_output_tokens)
                        .await
                    {
                        Ok(text) => {
                            state.calls_made += 1;
                            debug!("Reasoning call #{} succeeded", state.calls_made);
                            return Ok(text);
                        }
                        Err(BackendError::Throttled) if !retry => CallPhase::Throttled,
                        Err(BackendError::Throttled) => {
                            warn!("Throttled again after cooldown; giving up on this call");
                            return Err(GatewayError::Exhausted);
                        }
                        Err(err) => {
                            warn!("Reasoning call failed: {err}");
                            return Err(GatewayError::Backend(err.to_string()));
                        }
                    }
                }
                CallPhase::Throttled => {
                    warn!(
                        "Rate limit hit; cooling down {:?} before one retry",
                        self.config.throttle_cooldown
                    );
                    sleep(self.config.throttle_cooldown).await;
                    state.calls_made = 0;
                    CallPhase::Sending { retry: true }
                }
            };
        }
    }
}

/// Build the structured batch-analysis prompt: numbered reviews with text and
/// rating, plus the exact response format the parser expects.
fn build_batch_prompt(reviews: &[ReviewInput]) -> String {
    let batch_text = reviews
        .iter()
        .enumerate()
        .map(|(i, review)| {
            format!(
                "Review {}:\nText: \"{}\"\nRating: {}/5",
                i + 1,
                review.text,
                review.rating
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Analyze these customer reviews. For EACH review, provide:\n\
         1. Sentiment: positive OR negative OR neutral\n\
         2. Pro: one positive point (or \"none\")\n\
         3. Con: one negative point (or \"none\")\n\
         \n\
         {batch_text}\n\
         \n\
         Format your response EXACTLY like this for each review:\n\
         Review 1:\n\
         Sentiment: positive\n\
         Pro: great performance\n\
         Con: none\n\
         \n\
         Review 2:\n\
         Sentiment: negative\n\
         Pro: none\n\
         Con: expensive\n\
         \n\
         Do this for all {} reviews.",
        reviews.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex as StdMutex};
    use tokio::time::Instant;

    /// Scripted backend: pops one canned result per call and counts calls.
    struct ScriptedBackend {
        script: StdMutex<Vec<Result<String, BackendError>>>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedBackend {
        fn new(script: Vec<Result<String, BackendError>>) -> Self {
            Self {
                script: StdMutex::new(script),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl ReasoningBackend for ScriptedBackend {
        async fn complete(
            &self,
            _prompt: &str,
            _temperature: f32,
            _max_output_tokens: u32,
        ) -> Result<String, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock().unwrap();
            if script.is_empty() {
                return Err(BackendError::Transport("script exhausted".to_string()));
            }
            script.remove(0)
        }
    }

    fn gateway_with(script: Vec<Result<String, BackendError>>) -> ReasoningGateway {
        ReasoningGateway::new(Box::new(ScriptedBackend::new(script)), GatewayConfig::default())
    }

    fn reviews(n: usize) -> Vec<ReviewInput> {
        (0..n)
            .map(|i| ReviewInput {
                text: format!("review {i}"),
                rating: 4,
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn first_call_has_no_pacing_delay() {
        let gateway = gateway_with(vec![Ok("hello".to_string())]);

        let start = Instant::now();
        let text = gateway.synthesize("prompt").await.unwrap();

        assert_eq!(text, "hello");
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(gateway.calls_made().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn subsequent_calls_wait_the_inter_call_delay() {
        let gateway = gateway_with(vec![Ok("one".to_string()), Ok("two".to_string())]);

        gateway.synthesize("first").await.unwrap();

        let start = Instant::now();
        gateway.synthesize("second").await.unwrap();

        assert_eq!(start.elapsed(), Duration::from_secs(4));
        assert_eq!(gateway.calls_made().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn throttle_triggers_cooldown_counter_reset_and_single_retry() {
        let gateway = gateway_with(vec![
            Ok("warmup".to_string()),
            Err(BackendError::Throttled),
            Ok("recovered".to_string()),
        ]);

        gateway.synthesize("warmup").await.unwrap();

        let start = Instant::now();
        let text = gateway.synthesize("retry me").await.unwrap();

        assert_eq!(text, "recovered");
        // 4s pacing + 60s cooldown before the retry.
        assert_eq!(start.elapsed(), Duration::from_secs(64));
        // Counter was reset during cooldown, then the retry succeeded.
        assert_eq!(gateway.calls_made().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn second_throttle_in_one_call_fails_without_further_retry() {
        let gateway = gateway_with(vec![
            Err(BackendError::Throttled),
            Err(BackendError::Throttled),
            Ok("never reached".to_string()),
        ]);

        let err = gateway.synthesize("prompt").await.unwrap_err();

        assert!(matches!(err, GatewayError::Exhausted));
        assert_eq!(gateway.calls_made().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_failure_is_not_retried() {
        let backend = ScriptedBackend::new(vec![
            Err(BackendError::Transport("connection refused".to_string())),
            Ok("never reached".to_string()),
        ]);
        let calls = backend.calls.clone();
        let gateway = ReasoningGateway::new(Box::new(backend), GatewayConfig::default());

        let err = gateway.synthesize("prompt").await.unwrap_err();

        assert!(matches!(err, GatewayError::Backend(_)));
        // One attempt only.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn analyze_batch_parses_one_entry_per_review() {
        let response = "Sentiment: positive\nPro: fast\nCon: none\n\
                        Sentiment: neutral\nPro: none\nCon: none\n";
        let gateway = gateway_with(vec![Ok(response.to_string())]);

        let analyses = gateway.analyze_batch(&reviews(2)).await.unwrap();

        assert_eq!(analyses.len(), 2);
        assert_eq!(analyses[0].pro.as_deref(), Some("fast"));
    }

    #[tokio::test(start_paused = true)]
    async fn analyze_batch_with_wrong_entry_count_is_unparseable() {
        let gateway = gateway_with(vec![Ok("Sentiment: positive\n".to_string())]);

        let err = gateway.analyze_batch(&reviews(3)).await.unwrap_err();

        assert!(matches!(err, GatewayError::Unparseable(_)));
    }

    #[test]
    fn batch_prompt_numbers_reviews_and_carries_ratings() {
        let prompt = build_batch_prompt(&[
            ReviewInput {
                text: "Amazing product!".to_string(),
                rating: 5,
            },
            ReviewInput {
                text: "Too pricey".to_string(),
                rating: 2,
            },
        ]);

        assert!(prompt.contains("Review 1:\nText: \"Amazing product!\"\nRating: 5/5"));
        assert!(prompt.contains("Review 2:\nText: \"Too pricey\"\nRating: 2/5"));
        assert!(prompt.contains("Do this for all 2 reviews."));
    }
}
