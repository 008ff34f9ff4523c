//! §4.6 ingestion handler: wires the matcher, classifier, silence,
//! inhibition, routing, publishing, and history crates into the single
//! `Accept(payload) -> (received, processed, fingerprints[])` contract.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use alertgate_classifier::Classifier;
use alertgate_core::{Alert, ClassificationVerdict, Fingerprint, GatewayError, Priority, PublishJob, ReceiverName, Severity};
use alertgate_history::{HistoryRecord, HistoryStore};
use alertgate_inhibition::{should_inhibit, ActiveAlertCache, InhibitionRule};
use alertgate_matcher::RegexCache;
use alertgate_publisher::Publisher;
use alertgate_routing::RouteTreeHandle;
use alertgate_silence::SilenceStore;
use chrono::Utc;
use futures::FutureExt;
use tracing::{instrument, warn};

use crate::format::{format_payload, ReceiverKind};
use crate::metrics::PipelineMetrics;
use crate::mode::{EnrichmentMode, EnrichmentModeController};
use crate::webhook;

/// Outcome of processing one alert from a batch.
#[derive(Debug, Clone)]
pub struct AlertOutcome {
    pub fingerprint: Fingerprint,
    pub error: Option<String>,
}

/// Result of one `Accept` call, from which the HTTP layer derives the
/// 200/207/500 status per §4.6 step 6.
#[derive(Debug, Clone)]
pub struct IngestResult {
    pub received: usize,
    pub outcomes: Vec<AlertOutcome>,
}

impl IngestResult {
    #[must_use]
    pub fn processed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.error.is_none()).count()
    }

    /// True only when the batch was non-empty and every alert failed.
    #[must_use]
    pub fn all_failed(&self) -> bool {
        self.received > 0 && self.outcomes.iter().all(|o| o.error.is_some())
    }

    #[must_use]
    pub fn is_partial(&self) -> bool {
        let processed = self.processed();
        processed > 0 && processed < self.received
    }

    #[must_use]
    pub fn fingerprints(&self) -> Vec<String> {
        self.outcomes.iter().filter(|o| o.error.is_none()).map(|o| o.fingerprint.as_str().to_string()).collect()
    }
}

fn priority_for(verdict: Option<&ClassificationVerdict>) -> Priority {
    match verdict.map(|v| v.severity) {
        Some(Severity::Critical) => Priority::Critical,
        Some(Severity::Warning) => Priority::High,
        _ => Priority::Normal,
    }
}

/// The wired-together pipeline. One instance per running gateway; every
/// field is a shared collaborator safe for concurrent use from many
/// in-flight ingestion requests.
pub struct Pipeline {
    classifier: Arc<Classifier>,
    silences: Arc<SilenceStore>,
    active_cache: Arc<ActiveAlertCache>,
    inhibition_rules: Vec<InhibitionRule>,
    routes: Arc<RouteTreeHandle>,
    publisher: Arc<Publisher>,
    history: Arc<dyn HistoryStore>,
    mode: Arc<EnrichmentModeController>,
    receivers: HashMap<ReceiverName, ReceiverKind>,
    regex_cache: RegexCache,
    metrics: Arc<PipelineMetrics>,
}

impl Pipeline {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        classifier: Arc<Classifier>,
        silences: Arc<SilenceStore>,
        active_cache: Arc<ActiveAlertCache>,
        inhibition_rules: Vec<InhibitionRule>,
        routes: Arc<RouteTreeHandle>,
        publisher: Arc<Publisher>,
        history: Arc<dyn HistoryStore>,
        mode: Arc<EnrichmentModeController>,
        receivers: HashMap<ReceiverName, ReceiverKind>,
    ) -> Self {
        Self {
            classifier,
            silences,
            active_cache,
            inhibition_rules,
            routes,
            publisher,
            history,
            mode,
            receivers,
            regex_cache: RegexCache::default(),
            metrics: Arc::new(PipelineMetrics::new()),
        }
    }

    #[must_use]
    pub fn metrics(&self) -> Arc<PipelineMetrics> {
        self.metrics.clone()
    }

    #[must_use]
    pub fn mode_controller(&self) -> Arc<EnrichmentModeController> {
        self.mode.clone()
    }

    /// `Accept(payload) -> (received, processed, fingerprints[])`.
    ///
    /// Parse/validation failure is the only way this returns `Err`; it
    /// rejects the whole batch (400) before any alert is processed.
    /// Per-alert processing failures (caught panics) surface as entries in
    /// `IngestResult::outcomes` instead, so one bad alert in a batch never
    /// loses the rest.
    #[instrument(skip(self, body))]
    pub async fn accept(&self, body: &[u8]) -> Result<IngestResult, GatewayError> {
        let alerts = webhook::parse_and_validate(body)?;
        let received = alerts.len();
        let (mode, _source) = self.mode.current();
        self.metrics.record_received(received as u64);

        let mut outcomes = Vec::with_capacity(alerts.len());
        for alert in alerts {
            let fingerprint = alert.fingerprint.clone();
            let outcome = AssertUnwindSafe(self.process_one(alert, mode)).catch_unwind().await;
            outcomes.push(match outcome {
                Ok(()) => AlertOutcome { fingerprint, error: None },
                Err(_) => AlertOutcome { fingerprint, error: Some("internal error processing alert".to_string()) },
            });
        }

        self.metrics.record_processed(outcomes.iter().filter(|o| o.error.is_none()).count() as u64);
        Ok(IngestResult { received, outcomes })
    }

    async fn process_one(&self, alert: Alert, mode: EnrichmentMode) {
        // Regardless of mode, the active cache reflects reality: silenced
        // alerts still act as inhibition sources (Open Question 2).
        self.active_cache.observe(&alert);

        let now = Utc::now();
        let mut verdict: Option<ClassificationVerdict> = None;
        let mut silenced: Vec<String> = Vec::new();
        let mut inhibited = false;

        match mode {
            EnrichmentMode::Bypass => {}
            EnrichmentMode::Transparent => {
                silenced = self.silences.matches_any(&alert, now).into_iter().map(|id| id.as_str().to_string()).collect();
                inhibited = should_inhibit(&alert, &self.active_cache, &self.inhibition_rules, &self.regex_cache);
            }
            EnrichmentMode::Enriched => {
                verdict = Some(self.classifier.classify(&alert, false).await);
                silenced = self.silences.matches_any(&alert, now).into_iter().map(|id| id.as_str().to_string()).collect();
                inhibited = should_inhibit(&alert, &self.active_cache, &self.inhibition_rules, &self.regex_cache);
            }
        }

        for id in &silenced {
            self.metrics.record_silence_matched(id);
        }
        if inhibited {
            self.metrics.record_inhibited();
        }

        if silenced.is_empty() && !inhibited {
            self.route_and_publish(&alert, verdict.as_ref()).await;
        }

        // §4.6 step 5: history persistence never blocks or fails ingestion.
        self.spawn_history_write(&alert, verdict, !silenced.is_empty(), inhibited, now);
    }

    async fn route_and_publish(&self, alert: &Alert, verdict: Option<&ClassificationVerdict>) {
        let tree = self.routes.load();
        let bindings = tree.evaluate(alert, &self.regex_cache);
        if bindings.is_empty() {
            return;
        }

        let now = Utc::now();
        let mut jobs = Vec::with_capacity(bindings.len());
        for binding in bindings {
            let Some(kind) = self.receivers.get(&binding.receiver) else {
                warn!(receiver = %binding.receiver, "route bound to a receiver with no payload formatter registered, dropping");
                continue;
            };
            let payload = format_payload(alert, verdict, kind);
            let priority = priority_for(verdict);
            jobs.push(PublishJob::new(alert.fingerprint.clone(), binding.receiver.clone(), payload, priority, now));
        }
        if jobs.is_empty() {
            return;
        }

        let dispatched = jobs.len() as u64;
        self.publisher.publish(jobs).await;
        self.metrics.record_published(dispatched);
    }

    fn spawn_history_write(&self, alert: &Alert, verdict: Option<ClassificationVerdict>, silenced: bool, inhibited: bool, received_at: chrono::DateTime<Utc>) {
        let history = self.history.clone();
        let metrics = self.metrics.clone();
        let record = HistoryRecord {
            fingerprint: alert.fingerprint.clone(),
            alertname: alert.alertname.clone(),
            status: alert.status,
            starts_at: alert.starts_at,
            ends_at: alert.ends_at,
            labels: alert.labels.clone(),
            annotations: alert.annotations.clone(),
            verdict,
            silenced,
            inhibited,
            received_at,
        };
        tokio::spawn(async move {
            if let Err(e) = history.insert(record).await {
                metrics.record_history_write_failure();
                warn!(error = %e, "failed to persist alert history record");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alertgate_classifier::ClassifierConfig;
    use alertgate_core::CircuitBreakerConfig;
    use alertgate_history::MemoryHistoryStore;
    use alertgate_inhibition::ActiveAlertCache;
    use alertgate_matcher::{Matcher, Operator};
    use alertgate_provider::{Provider, ProviderError, ProviderRegistry};
    use alertgate_publisher::{DlqStore, PublisherConfig};
    use alertgate_routing::{RouteNode, RouteTree};
    use alertgate_state_memory::MemoryStateStore;
    use async_trait::async_trait;
    use std::collections::{BTreeMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingProvider {
        name: String,
        calls: Arc<AtomicUsize>,
    }

    impl Provider for CountingProvider {
        fn name(&self) -> &str {
            &self.name
        }
        async fn publish(&self, _payload: &[u8]) -> Result<(), ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn health_check(&self) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    struct StubModelClient;
    #[async_trait]
    impl alertgate_classifier::ModelClient for StubModelClient {
        async fn classify(&self, _alert: &Alert) -> Result<ClassificationVerdict, alertgate_classifier::ClassifierError> {
            Ok(ClassificationVerdict {
                severity: Severity::Warning,
                confidence: 0.9,
                reasoning: "stub".into(),
                recommendations: vec![],
                source: alertgate_core::VerdictSource::Model,
                model_id: Some("m1".into()),
            })
        }
    }

    fn webhook_body(alertname: &str, env: &str) -> Vec<u8> {
        format!(
            r#"{{"alerts":[{{"status":"firing","labels":{{"alertname":"{alertname}","env":"{env}"}},"startsAt":"2025-01-09T10:00:00Z"}}]}}"#
        )
        .into_bytes()
    }

    async fn build_pipeline(slack_calls: Arc<AtomicUsize>, pagerduty_calls: Arc<AtomicUsize>) -> Pipeline {
        let mut registry = ProviderRegistry::new();
        registry.register(ReceiverName::new("slack"), Arc::new(CountingProvider { name: "slack".into(), calls: slack_calls }));
        registry.register(ReceiverName::new("pagerduty"), Arc::new(CountingProvider { name: "pagerduty".into(), calls: pagerduty_calls }));

        let dlq = Arc::new(DlqStore::new(Arc::new(MemoryStateStore::new()), "alertgate"));
        let publisher = Arc::new(Publisher::new(Arc::new(registry), dlq, PublisherConfig::default()));

        let root = RouteNode {
            matchers: vec![],
            receiver: Some(ReceiverName::new("slack")),
            children: vec![RouteNode {
                matchers: vec![Matcher::new("env", "prod", Operator::Eq).unwrap()],
                receiver: Some(ReceiverName::new("pagerduty")),
                children: vec![],
                continue_: true,
                group_by: vec![],
                group_wait: None,
                group_interval: None,
                repeat_interval: None,
            }],
            continue_: false,
            group_by: vec![],
            group_wait: None,
            group_interval: None,
            repeat_interval: None,
        };
        let known: HashSet<ReceiverName> = [ReceiverName::new("slack"), ReceiverName::new("pagerduty")].into_iter().collect();
        let tree = RouteTree::parse(root, &known).unwrap();
        let routes = Arc::new(RouteTreeHandle::new(tree));

        let mut receivers = HashMap::new();
        receivers.insert(ReceiverName::new("slack"), ReceiverKind::Slack { channel: "#alerts".into() });
        receivers.insert(ReceiverName::new("pagerduty"), ReceiverKind::PagerDuty { routing_key: "R1".into() });

        let silences = Arc::new(SilenceStore::load(Arc::new(MemoryStateStore::new()), "alertgate").await.unwrap());
        let active_cache = Arc::new(ActiveAlertCache::new(Duration::from_secs(300)));
        let history: Arc<dyn HistoryStore> = Arc::new(MemoryHistoryStore::new());

        let mut classifier_config = ClassifierConfig::new("http://model", "key", "m1");
        classifier_config.breaker = CircuitBreakerConfig { failure_threshold: 5, window_min_samples: 1000, ..CircuitBreakerConfig::default() };
        let classifier = Arc::new(Classifier::new(Arc::new(StubModelClient), Arc::new(MemoryStateStore::new()), classifier_config));

        let mode = EnrichmentModeController::load(Arc::new(MemoryStateStore::new()), "alertgate", "ALERTGATE_TEST_MODE_UNSET").await;

        Pipeline::new(classifier, silences, active_cache, vec![], routes, publisher, history, mode, receivers)
    }

    #[tokio::test]
    async fn enriched_mode_classifies_routes_and_publishes_to_both_receivers() {
        let slack_calls = Arc::new(AtomicUsize::new(0));
        let pagerduty_calls = Arc::new(AtomicUsize::new(0));
        let pipeline = build_pipeline(slack_calls.clone(), pagerduty_calls.clone()).await;

        let result = pipeline.accept(&webhook_body("HighCPU", "prod")).await.unwrap();
        assert_eq!(result.received, 1);
        assert_eq!(result.processed(), 1);

        // publish() fans out and returns synchronously, but the provider
        // calls themselves happen inside tokio::spawn'd join handles the
        // fan-out executor awaits before returning.
        assert_eq!(slack_calls.load(Ordering::SeqCst), 1);
        assert_eq!(pagerduty_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn bypass_mode_still_routes_but_skips_classification() {
        let slack_calls = Arc::new(AtomicUsize::new(0));
        let pagerduty_calls = Arc::new(AtomicUsize::new(0));
        let pipeline = build_pipeline(slack_calls.clone(), pagerduty_calls.clone()).await;
        pipeline.mode_controller().set_mode(EnrichmentMode::Bypass).await.unwrap();

        let result = pipeline.accept(&webhook_body("HighCPU", "staging")).await.unwrap();
        assert_eq!(result.processed(), 1);
        assert_eq!(slack_calls.load(Ordering::SeqCst), 1);
        assert_eq!(pagerduty_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn silenced_alert_is_processed_but_not_published() {
        let slack_calls = Arc::new(AtomicUsize::new(0));
        let pagerduty_calls = Arc::new(AtomicUsize::new(0));
        let pipeline = build_pipeline(slack_calls.clone(), pagerduty_calls.clone()).await;

        let now = Utc::now();
        pipeline
            .silences
            .create(
                vec![Matcher::new("alertname", "HighCPU", Operator::Eq).unwrap()],
                now - chrono::Duration::minutes(1),
                now + chrono::Duration::hours(1),
                "oncall",
                "known flapping",
            )
            .await
            .unwrap();

        let result = pipeline.accept(&webhook_body("HighCPU", "prod")).await.unwrap();
        assert_eq!(result.processed(), 1);
        assert_eq!(slack_calls.load(Ordering::SeqCst), 0);
        assert_eq!(pagerduty_calls.load(Ordering::SeqCst), 0);

        let snap = pipeline.metrics().snapshot();
        assert_eq!(snap.silence_matched.iter().map(|(_, n)| n).sum::<u64>(), 1);
    }

    #[tokio::test]
    async fn malformed_payload_is_rejected_before_any_processing() {
        let pipeline = build_pipeline(Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0))).await;
        assert!(pipeline.accept(b"not json").await.is_err());
    }

    #[tokio::test]
    async fn history_record_reflects_silencing() {
        let pipeline = build_pipeline(Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0))).await;
        pipeline.accept(&webhook_body("HighCPU", "prod")).await.unwrap();

        let page = pipeline.history.query(&alertgate_history::HistoryFilter::default(), 1, 10).await.unwrap();
        assert_eq!(page.total, 1);
        assert!(!page.records[0].silenced);
    }
}
