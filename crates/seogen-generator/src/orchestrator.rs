//! Generation orchestrator: the entry point shared by the server and the REPL.
//!
//! Per request: resolve the active provider → build the prompt → call the
//! provider → normalize. `generate_all` runs the four single kinds
//! concurrently and fails as a whole if any branch fails.
//!
//! Each call reads the active provider exactly once, before its first await.
//! The four `generate_all` branches read it independently, so a switch that
//! lands mid-fan-out can yield a mixed-provider result.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, warn};

use seogen_core::records::{GenerationRecord, RecordSink};
use seogen_core::{
    AggregatedContent, ContentKind, GenerationError, GenerationOutput, GenerationRequest,
    KeywordItem, MetaDescription, Result,
};
use seogen_providers::{ProviderFactory, ProviderKind, ProviderSelector};

use crate::{normalizer, prompts};

/// Answer to a free-form chat message.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatReply {
    pub response: String,
    /// Tag of the provider that answered.
    pub provider: String,
}

/// Text returned by one provider call, plus who produced it.
struct ProviderAnswer {
    text: String,
    provider: ProviderKind,
}

// ─────────────────────────────────────────────
// GenerationOrchestrator
// ─────────────────────────────────────────────

pub struct GenerationOrchestrator {
    selector: Arc<ProviderSelector>,
    factory: Arc<dyn ProviderFactory>,
    /// Per provider call; `None` waits indefinitely.
    timeout: Option<Duration>,
    sink: Option<Arc<dyn RecordSink>>,
}

impl GenerationOrchestrator {
    pub fn new(selector: Arc<ProviderSelector>, factory: Arc<dyn ProviderFactory>) -> Self {
        Self {
            selector,
            factory,
            timeout: None,
            sink: None,
        }
    }

    /// Bound every provider call. Expiry fails the call with `ProviderCall`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Record every successful [`run`](Self::run) and [`chat`](Self::chat).
    pub fn with_sink(mut self, sink: Arc<dyn RecordSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn selector(&self) -> &ProviderSelector {
        &self.selector
    }

    // ── Provider passthrough ──

    /// Switch the active provider. See [`ProviderSelector::set_active`].
    pub fn switch_provider(&self, tag: &str) -> Result<String> {
        self.selector.set_active(tag)
    }

    pub fn active_provider(&self) -> ProviderKind {
        self.selector.active_kind()
    }

    pub fn available_providers(&self) -> Vec<ProviderKind> {
        self.selector.list_available()
    }

    // ── Single kinds ──

    pub async fn generate_keywords(&self, topic: &str) -> Result<Vec<KeywordItem>> {
        let answer = self.generate_raw(ContentKind::Keywords, topic).await?;
        let keywords = normalizer::parse_keywords(&answer.text)?;
        debug!(stage = "normalized", kind = "keywords", count = keywords.len());
        Ok(keywords)
    }

    pub async fn generate_title(&self, topic: &str) -> Result<Vec<String>> {
        let answer = self.generate_raw(ContentKind::Title, topic).await?;
        let titles = normalizer::parse_titles(&answer.text)?;
        debug!(stage = "normalized", kind = "title", count = titles.len());
        Ok(titles)
    }

    pub async fn generate_meta(&self, topic: &str) -> Result<MetaDescription> {
        let answer = self.generate_raw(ContentKind::Meta, topic).await?;
        let meta = normalizer::parse_meta(&answer.text)?;
        debug!(stage = "normalized", kind = "meta");
        Ok(meta)
    }

    pub async fn generate_content(&self, topic: &str) -> Result<String> {
        let answer = self.generate_raw(ContentKind::Content, topic).await?;
        debug!(stage = "normalized", kind = "content", chars = answer.text.len());
        Ok(normalizer::parse_content(&answer.text))
    }

    // ── Fan-out ──

    /// Run all four kinds concurrently and merge them.
    ///
    /// Any branch failure fails the whole call, wrapped in `Aggregate`; no
    /// partial result is returned. When `selected_keywords` is non-empty,
    /// only keywords whose text is an exact member survive.
    pub async fn generate_all(
        &self,
        topic: &str,
        selected_keywords: Option<&HashSet<String>>,
    ) -> Result<AggregatedContent> {
        validate_topic(topic)?;

        let (mut keywords, titles, meta, content) = tokio::try_join!(
            self.generate_keywords(topic),
            self.generate_title(topic),
            self.generate_meta(topic),
            self.generate_content(topic),
        )
        .map_err(|e| GenerationError::Aggregate(Box::new(e)))?;

        if let Some(selected) = selected_keywords.filter(|s| !s.is_empty()) {
            let before = keywords.len();
            keywords.retain(|k| selected.contains(&k.keyword));
            debug!(before, after = keywords.len(), "keywords filtered by selection");
        }

        Ok(AggregatedContent {
            keywords,
            titles,
            meta,
            content,
        })
    }

    // ── Request dispatch ──

    /// Dispatch a request by kind, time it, and append a record on success.
    pub async fn run(&self, request: &GenerationRequest) -> Result<GenerationOutput> {
        let started = Instant::now();
        let provider = self.active_provider();
        let topic = request.topic.as_str();

        let output = match request.kind {
            ContentKind::Keywords => GenerationOutput::Keywords(self.generate_keywords(topic).await?),
            ContentKind::Title => GenerationOutput::Titles(self.generate_title(topic).await?),
            ContentKind::Meta => GenerationOutput::Meta(self.generate_meta(topic).await?),
            ContentKind::Content => GenerationOutput::Content(self.generate_content(topic).await?),
            ContentKind::All => GenerationOutput::All(
                self.generate_all(topic, request.selected_keywords.as_ref())
                    .await?,
            ),
        };

        self.record(request.kind.as_str(), topic, provider, &output, started.elapsed())
            .await;
        Ok(output)
    }

    /// Send `message` verbatim to the active provider; no normalization.
    pub async fn chat(&self, message: &str) -> Result<ChatReply> {
        validate_topic(message)?;
        let started = Instant::now();

        let answer = self.call_provider(message).await?;
        let reply = ChatReply {
            response: answer.text,
            provider: answer.provider.tag().to_string(),
        };

        self.record("chat", message, answer.provider, &reply.response, started.elapsed())
            .await;
        Ok(reply)
    }

    // ── Internals ──

    async fn generate_raw(&self, kind: ContentKind, topic: &str) -> Result<ProviderAnswer> {
        validate_topic(topic)?;
        let prompt = prompts::build(kind, topic)
            .ok_or_else(|| GenerationError::provider_call("orchestrator", "no prompt for kind all"))?;
        debug!(stage = "prompt_built", kind = %kind, chars = prompt.len());
        self.call_provider(&prompt).await
    }

    async fn call_provider(&self, prompt: &str) -> Result<ProviderAnswer> {
        let descriptor = self.selector.get_active()?;
        let provider = self.factory.create(&descriptor)?;
        debug!(stage = "provider_resolved", provider = %descriptor.kind, model = %provider.model());

        debug!(stage = "requested", provider = %descriptor.kind);
        let text = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, provider.generate(prompt))
                .await
                .map_err(|_| {
                    GenerationError::provider_call(
                        provider.display_name(),
                        format!("timed out after {}s", limit.as_secs_f64()),
                    )
                })??,
            None => provider.generate(prompt).await?,
        };

        Ok(ProviderAnswer {
            text,
            provider: descriptor.kind,
        })
    }

    /// Append a record off the async worker; sinks may block on file I/O.
    /// Failures are logged and never fail the request.
    async fn record<T: Serialize>(
        &self,
        request_type: &str,
        input: &str,
        provider: ProviderKind,
        output: &T,
        elapsed: Duration,
    ) {
        let Some(sink) = self.sink.clone() else {
            return;
        };

        let output = match serde_json::to_value(output) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "could not serialize generation output; not recorded");
                return;
            }
        };

        let record = GenerationRecord {
            request_type: request_type.to_string(),
            input: input.to_string(),
            provider: provider.tag().to_string(),
            output,
            process_time_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            timestamp: Utc::now(),
        };

        match tokio::task::spawn_blocking(move || sink.append(&record)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, request_type, "failed to persist generation record"),
            Err(e) => warn!(error = %e, request_type, "record writer task failed"),
        }
    }
}

fn validate_topic(topic: &str) -> Result<()> {
    if topic.trim().is_empty() {
        return Err(GenerationError::EmptyTopic);
    }
    Ok(())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use seogen_core::config::schema::ProvidersConfig;
    use seogen_providers::claude::ClaudeProvider;
    use seogen_providers::{ProviderDescriptor, ProviderRegistry, TextProvider};

    /// Canned answers keyed on which prompt was sent.
    #[derive(Clone)]
    struct Script {
        keywords: String,
        titles: String,
        meta: String,
        content: Result<String, String>,
        delay: Option<Duration>,
        /// Every call waits here before answering.
        barrier: Option<Arc<tokio::sync::Barrier>>,
    }

    impl Default for Script {
        fn default() -> Self {
            Self {
                keywords: r#"```json
[{"keyword":"x","relevance":9},{"keyword":"y","relevance":7}]
```"#
                    .into(),
                titles: r#"["<h1>X and Y</h1>"]"#.into(),
                meta: r#"{"description":"About x"}"#.into(),
                content: Ok("<p>Long form</p>".into()),
                delay: None,
                barrier: None,
            }
        }
    }

    struct ScriptedProvider {
        kind: ProviderKind,
        script: Script,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TextProvider for ScriptedProvider {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(barrier) = &self.script.barrier {
                barrier.wait().await;
            }
            if let Some(delay) = self.script.delay {
                tokio::time::sleep(delay).await;
            }
            if prompt.contains("SEO keywords") {
                Ok(self.script.keywords.clone())
            } else if prompt.contains("engaging title") {
                Ok(self.script.titles.clone())
            } else if prompt.contains("meta description") {
                Ok(self.script.meta.clone())
            } else if prompt.contains("detailed article") {
                self.script
                    .content
                    .clone()
                    .map_err(|m| GenerationError::provider_call("Scripted", m))
            } else {
                Ok(format!("echo: {prompt}"))
            }
        }

        fn kind(&self) -> ProviderKind {
            self.kind
        }

        fn display_name(&self) -> &str {
            "Scripted"
        }

        fn model(&self) -> &str {
            "scripted-1"
        }
    }

    struct ScriptedFactory {
        script: Script,
        calls: Arc<AtomicUsize>,
    }

    impl ProviderFactory for ScriptedFactory {
        fn create(&self, descriptor: &ProviderDescriptor) -> Result<Arc<dyn TextProvider>> {
            descriptor.require_credential()?;
            if descriptor.kind == ProviderKind::Claude {
                return Ok(Arc::new(ClaudeProvider::new(descriptor)?));
            }
            Ok(Arc::new(ScriptedProvider {
                kind: descriptor.kind,
                script: self.script.clone(),
                calls: self.calls.clone(),
            }))
        }
    }

    #[derive(Default)]
    struct MemorySink {
        records: Mutex<Vec<GenerationRecord>>,
    }

    impl RecordSink for MemorySink {
        fn append(&self, record: &GenerationRecord) -> std::io::Result<()> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    struct Harness {
        orchestrator: GenerationOrchestrator,
        calls: Arc<AtomicUsize>,
        sink: Arc<MemorySink>,
    }

    fn harness(keys: &[&str], script: Script) -> Harness {
        let mut config = ProvidersConfig::default();
        for name in keys {
            config.get_by_name_mut(name).unwrap().api_key = format!("{name}-key");
        }
        let registry = Arc::new(ProviderRegistry::from_config_with_env(&config, |_| None));
        let selector = Arc::new(ProviderSelector::new(registry, ProviderKind::Gemini));
        let calls = Arc::new(AtomicUsize::new(0));
        let sink = Arc::new(MemorySink::default());
        let factory = Arc::new(ScriptedFactory {
            script,
            calls: calls.clone(),
        });
        let orchestrator =
            GenerationOrchestrator::new(selector, factory).with_sink(sink.clone());
        Harness {
            orchestrator,
            calls,
            sink,
        }
    }

    fn selection(words: &[&str]) -> HashSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    // ── Single kinds ──

    #[tokio::test]
    async fn test_generate_keywords_strips_fence() {
        let h = harness(&["gemini"], Script::default());
        let keywords = h.orchestrator.generate_keywords("AI").await.unwrap();
        assert_eq!(
            keywords,
            vec![KeywordItem::new("x", 9.0), KeywordItem::new("y", 7.0)]
        );
    }

    #[tokio::test]
    async fn test_generate_title_and_meta() {
        let h = harness(&["gemini"], Script::default());
        assert_eq!(
            h.orchestrator.generate_title("AI").await.unwrap(),
            vec!["<h1>X and Y</h1>".to_string()]
        );
        assert_eq!(
            h.orchestrator.generate_meta("AI").await.unwrap().description,
            "About x"
        );
    }

    #[tokio::test]
    async fn test_malformed_meta_carries_raw_text() {
        let script = Script {
            meta: "not json".into(),
            ..Script::default()
        };
        let h = harness(&["gemini"], script);
        let err = h.orchestrator.generate_meta("AI").await.unwrap_err();
        match err {
            GenerationError::MalformedResponse { raw, kind, .. } => {
                assert_eq!(raw, "not json");
                assert_eq!(kind, ContentKind::Meta);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unavailable_provider_never_calls_out() {
        let h = harness(&["openai"], Script::default());
        let err = h.orchestrator.generate_keywords("AI").await.unwrap_err();
        assert!(matches!(err, GenerationError::UnavailableProvider(ref t) if t == "GEMINI"));
        assert_eq!(h.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_topic_rejected_before_provider() {
        let h = harness(&["gemini"], Script::default());
        let err = h.orchestrator.generate_content("   ").await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyTopic));
        assert_eq!(h.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_claude_fails_cleanly() {
        let h = harness(&["gemini", "claude"], Script::default());
        h.orchestrator.switch_provider("claude").unwrap();
        let err = h.orchestrator.generate_title("AI").await.unwrap_err();
        assert!(matches!(err, GenerationError::NotImplemented(_)));
        assert_eq!(err.to_string(), "Claude integration not implemented yet");
    }

    // ── Switching ──

    #[tokio::test]
    async fn test_switch_then_generate_uses_new_provider() {
        let h = harness(&["gemini", "openai"], Script::default());
        for tag in ["openai", "GEMINI", "OpenAI"] {
            h.orchestrator.switch_provider(tag).unwrap();
            assert_eq!(
                h.orchestrator.active_provider().tag(),
                tag.to_uppercase()
            );
        }
        let reply = h.orchestrator.chat("hello").await.unwrap();
        assert_eq!(reply.provider, "OPENAI");
    }

    #[tokio::test]
    async fn test_switch_to_unconfigured_keeps_active() {
        let h = harness(&["gemini"], Script::default());
        assert!(h.orchestrator.switch_provider("openai").is_err());
        assert!(h.orchestrator.switch_provider("llama").is_err());
        assert_eq!(h.orchestrator.active_provider(), ProviderKind::Gemini);
        assert_eq!(h.orchestrator.available_providers(), vec![ProviderKind::Gemini]);
    }

    // ── Fan-out ──

    #[tokio::test]
    async fn test_generate_all_filters_by_selection() {
        let h = harness(&["gemini"], Script::default());
        let selected = selection(&["x"]);
        let all = h.orchestrator.generate_all("AI", Some(&selected)).await.unwrap();
        assert_eq!(all.keywords, vec![KeywordItem::new("x", 9.0)]);
        assert_eq!(all.titles.len(), 1);
        assert_eq!(all.meta.description, "About x");
        assert_eq!(all.content, "<p>Long form</p>");
        assert_eq!(h.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_generate_all_without_selection_keeps_everything() {
        let h = harness(&["gemini"], Script::default());
        let all = h.orchestrator.generate_all("AI", None).await.unwrap();
        assert_eq!(all.keywords.len(), 2);

        let empty = HashSet::new();
        let all = h.orchestrator.generate_all("AI", Some(&empty)).await.unwrap();
        assert_eq!(all.keywords.len(), 2);
    }

    #[tokio::test]
    async fn test_generate_all_selection_is_case_sensitive() {
        let h = harness(&["gemini"], Script::default());
        let selected = selection(&["X"]);
        let all = h.orchestrator.generate_all("AI", Some(&selected)).await.unwrap();
        assert!(all.keywords.is_empty());
    }

    #[tokio::test]
    async fn test_generate_all_fails_when_one_branch_fails() {
        let script = Script {
            content: Err("502 Bad Gateway".into()),
            ..Script::default()
        };
        let h = harness(&["gemini"], script);
        let err = h.orchestrator.generate_all("AI", None).await.unwrap_err();
        assert!(matches!(err, GenerationError::Aggregate(_)));
        assert!(matches!(err.root_cause(), GenerationError::ProviderCall { .. }));
        assert!(err.to_string().starts_with("Failed to generate all content:"));
        assert!(err.to_string().contains("502 Bad Gateway"));
    }

    #[tokio::test]
    async fn test_generate_all_issues_calls_concurrently() {
        // Each call blocks until all four are in flight, so a sequential
        // fan-out would never get past the first one.
        let script = Script {
            barrier: Some(Arc::new(tokio::sync::Barrier::new(4))),
            ..Script::default()
        };
        let h = harness(&["gemini"], script);
        let all = tokio::time::timeout(
            Duration::from_secs(5),
            h.orchestrator.generate_all("AI", None),
        )
        .await
        .expect("all four provider calls should be in flight together")
        .unwrap();
        assert_eq!(all.keywords.len(), 2);
        assert_eq!(h.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_switch_during_generate_all_still_completes() {
        let script = Script {
            delay: Some(Duration::from_millis(100)),
            ..Script::default()
        };
        let h = harness(&["gemini", "openai"], script);
        let orchestrator = Arc::new(h.orchestrator);

        let running = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.generate_all("AI", None).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        let message = orchestrator.switch_provider("openai").unwrap();
        assert_eq!(message, "Switched to OPENAI model.");

        let all = running.await.unwrap().unwrap();
        assert_eq!(all.meta.description, "About x");
        assert_eq!(h.calls.load(Ordering::SeqCst), 4);

        let reply = orchestrator.chat("next").await.unwrap();
        assert_eq!(reply.provider, "OPENAI");
    }

    #[tokio::test]
    async fn test_timeout_maps_to_provider_call() {
        let script = Script {
            delay: Some(Duration::from_secs(5)),
            ..Script::default()
        };
        let mut h = harness(&["gemini"], script);
        h.orchestrator = h.orchestrator.with_timeout(Some(Duration::from_millis(20)));
        let err = h.orchestrator.generate_meta("AI").await.unwrap_err();
        assert!(matches!(err, GenerationError::ProviderCall { .. }));
        assert!(err.to_string().contains("timed out"));
    }

    // ── run / chat / records ──

    #[tokio::test]
    async fn test_run_records_success() {
        let h = harness(&["gemini"], Script::default());
        let request = GenerationRequest::new(ContentKind::All, "AI").with_selected_keywords(["y"]);
        let output = h.orchestrator.run(&request).await.unwrap();
        assert_eq!(output.kind(), ContentKind::All);

        let records = h.sink.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].request_type, "all");
        assert_eq!(records[0].input, "AI");
        assert_eq!(records[0].provider, "GEMINI");
        assert_eq!(records[0].output["keywords"][0]["keyword"], "y");
    }

    #[tokio::test]
    async fn test_run_failure_not_recorded() {
        let h = harness(&["gemini"], Script {
            titles: "oops".into(),
            ..Script::default()
        });
        let request = GenerationRequest::new(ContentKind::Title, "AI");
        assert!(h.orchestrator.run(&request).await.is_err());
        assert!(h.sink.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_chat_is_verbatim_and_recorded() {
        let h = harness(&["gemini"], Script::default());
        let reply = h.orchestrator.chat("What is SEO?").await.unwrap();
        assert_eq!(reply.response, "echo: What is SEO?");
        assert_eq!(reply.provider, "GEMINI");

        let records = h.sink.records.lock().unwrap();
        assert_eq!(records[0].request_type, "chat");
        assert_eq!(records[0].output, serde_json::json!("echo: What is SEO?"));
    }

    #[tokio::test]
    async fn test_chat_rejects_blank_message() {
        let h = harness(&["gemini"], Script::default());
        assert!(matches!(
            h.orchestrator.chat("").await.unwrap_err(),
            GenerationError::EmptyTopic
        ));
    }
}
