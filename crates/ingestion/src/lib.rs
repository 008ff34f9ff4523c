//! §4.6 ingestion handler, §4.7 enrichment mode controller, and the pipeline
//! wiring that composes matching, classification, silencing, inhibition,
//! routing, publishing, and history into one `Accept` entry point — the
//! `acteon-gateway` analog in this workspace.

pub mod format;
pub mod metrics;
pub mod mode;
pub mod pipeline;
pub mod webhook;

pub use format::{format_payload, ReceiverKind};
pub use metrics::{PipelineMetrics, PipelineMetricsSnapshot};
pub use mode::{EnrichmentMode, EnrichmentModeController, ModeSource};
pub use pipeline::{AlertOutcome, IngestResult, Pipeline};
pub use webhook::{build_single_alert, parse_and_validate, parse_payload, WebhookAlert, WebhookPayload};
