//! Binary entry point: wires every collaborator from environment-derived
//! configuration into a running axum server with graceful shutdown.
//! Grounded on `acteon-server`'s `main.rs` composition root, replacing its
//! TOML-file config load and JWT/audit wiring with the env-only config
//! layer and bearer-token auth this gateway uses instead.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use alertgate_classifier::{Classifier, HttpModelClient};
use alertgate_ingestion::{EnrichmentModeController, Pipeline, ReceiverKind};
use alertgate_inhibition::ActiveAlertCache;
use alertgate_pagerduty::{PagerDutyConfig, PagerDutyProvider};
use alertgate_provider::ProviderRegistry;
use alertgate_publisher::{DlqStore, Publisher};
use alertgate_routing::{RouteTree, RouteTreeHandle};
use alertgate_silence::SilenceStore;
use alertgate_slack::{SlackConfig, SlackProvider};
use alertgate_state::StateStore;
use alertgate_state_memory::MemoryStateStore;
use alertgate_webhook::{AuthMethod, HttpMethod, WebhookConfig, WebhookProvider};
use alertgate_core::ReceiverName;

use alertgate_server::api::{router, AppState};
use alertgate_server::config::{
    classifier_config_from_env, inhibition_rules_from_env, publisher_config_from_env, receivers_from_env,
    route_root_from_env, state_namespace_from_env, AuthConfig, ListenConfig, RateLimitConfig, ReceiverConfig,
    ENRICHMENT_MODE_ENV_VAR,
};
use alertgate_server::ratelimit::RateLimiter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")))
        .init();

    let listen = ListenConfig::from_env()?;
    let namespace = state_namespace_from_env();
    let state_backend: Arc<dyn StateStore> = Arc::new(MemoryStateStore::new());

    let receiver_configs = receivers_from_env()?;
    let mut provider_registry = ProviderRegistry::new();
    let mut receiver_kinds: HashMap<ReceiverName, ReceiverKind> = HashMap::new();

    for (name, cfg) in receiver_configs {
        let receiver_name = ReceiverName::new(name.clone());
        match cfg {
            ReceiverConfig::Pagerduty { routing_key } => {
                provider_registry.register(receiver_name.clone(), Arc::new(PagerDutyProvider::new(name, PagerDutyConfig::new(routing_key.clone()))));
                receiver_kinds.insert(receiver_name, ReceiverKind::PagerDuty { routing_key });
            }
            ReceiverConfig::Slack { token, channel } => {
                provider_registry.register(receiver_name.clone(), Arc::new(SlackProvider::new(name, SlackConfig::new(token))));
                receiver_kinds.insert(receiver_name, ReceiverKind::Slack { channel });
            }
            ReceiverConfig::Webhook { url, bearer } => {
                let mut webhook_cfg = WebhookConfig::new(url).with_method(HttpMethod::Post);
                if let Some(token) = bearer {
                    webhook_cfg = webhook_cfg.with_auth(AuthMethod::Bearer(token));
                }
                provider_registry.register(receiver_name.clone(), Arc::new(WebhookProvider::new(name, webhook_cfg)));
                receiver_kinds.insert(receiver_name, ReceiverKind::Webhook);
            }
        }
    }
    let provider_registry = Arc::new(provider_registry);
    let known_receivers = provider_registry.known_receivers();

    let classifier_config = classifier_config_from_env()?;
    let model_client = Arc::new(HttpModelClient::new(classifier_config.clone())?);
    let classifier = Arc::new(Classifier::new(model_client, state_backend.clone(), classifier_config));

    let silences = Arc::new(SilenceStore::load(state_backend.clone(), namespace.clone()).await?);
    let active_cache = Arc::new(ActiveAlertCache::new(Duration::from_secs(3600)));
    let inhibition_rules = inhibition_rules_from_env()?;

    let route_root = route_root_from_env()?;
    let route_tree = RouteTree::parse(route_root, &known_receivers)?;
    let routes = Arc::new(RouteTreeHandle::new(route_tree));

    let dlq = Arc::new(DlqStore::new(state_backend.clone(), namespace.clone()));
    let publisher_config = publisher_config_from_env()?;
    let publisher = Arc::new(Publisher::new(provider_registry, dlq.clone(), publisher_config));
    publisher.spawn_retry_worker();

    let history: Arc<dyn alertgate_history::HistoryStore> = Arc::new(alertgate_history::MemoryHistoryStore::new());

    let mode = EnrichmentModeController::load(state_backend.clone(), namespace.clone(), ENRICHMENT_MODE_ENV_VAR).await;
    mode.clone().spawn_refresh(Duration::from_secs(30));

    let pipeline = Arc::new(Pipeline::new(
        classifier.clone(),
        silences.clone(),
        active_cache,
        inhibition_rules,
        routes,
        publisher.clone(),
        history.clone(),
        mode.clone(),
        receiver_kinds,
    ));

    let auth = AuthConfig::from_env();
    let rate_limiter = Arc::new(RateLimiter::new(RateLimitConfig::from_env()?));

    let state = AppState { pipeline, classifier, silences, dlq, history, mode, publisher, auth, rate_limiter };

    let app = router(state);
    let addr = format!("{}:{}", listen.host, listen.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "alertgate-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()).expect("failed to install SIGTERM handler").recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    tracing::info!("shutdown signal received");
}
