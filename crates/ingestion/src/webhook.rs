//! Parsing and validation of the alert-manager-shaped webhook payload
//! (§6 "Webhook payload (ingress)"), and the within-batch fingerprint
//! deduplication step from §4.6.

use std::collections::{BTreeMap, HashSet};

use alertgate_core::{Alert, AlertStatus, Fingerprint, GatewayError};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Maximum length tolerated for a single label or annotation value.
pub const MAX_LABEL_VALUE_LEN: usize = 2048;
pub const MAX_ANNOTATION_VALUE_LEN: usize = 16384;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub receiver: Option<String>,
    #[serde(default)]
    pub group_labels: BTreeMap<String, String>,
    #[serde(default)]
    pub common_labels: BTreeMap<String, String>,
    pub alerts: Vec<WebhookAlert>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAlert {
    pub status: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    pub starts_at: DateTime<Utc>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub generator_url: Option<String>,
    #[serde(default)]
    pub fingerprint: Option<String>,
}

/// Parse the raw request body. A JSON syntax error is a validation failure,
/// not an internal one — the caller sent a malformed payload.
pub fn parse_payload(body: &[u8]) -> Result<WebhookPayload, GatewayError> {
    serde_json::from_slice(body)
        .map_err(|e| GatewayError::validation("malformed webhook payload").with_details(e.to_string()))
}

fn parse_status(raw: &str) -> Result<AlertStatus, GatewayError> {
    match raw {
        "firing" => Ok(AlertStatus::Firing),
        "resolved" => Ok(AlertStatus::Resolved),
        other => Err(GatewayError::validation(format!("alert status must be \"firing\" or \"resolved\", got {other:?}"))),
    }
}

fn validate_label_name(name: &str) -> Result<(), GatewayError> {
    if name.is_empty() {
        return Err(GatewayError::validation("label name must not be empty"));
    }
    if name.chars().any(char::is_control) {
        return Err(GatewayError::validation(format!("label name {name:?} contains control characters")));
    }
    Ok(())
}

fn validate_values(labels: &BTreeMap<String, String>, annotations: &BTreeMap<String, String>) -> Result<(), GatewayError> {
    for (name, value) in labels {
        validate_label_name(name)?;
        if value.len() > MAX_LABEL_VALUE_LEN {
            return Err(GatewayError::validation(format!("label {name:?} value exceeds {MAX_LABEL_VALUE_LEN} bytes")));
        }
    }
    for (name, value) in annotations {
        if value.len() > MAX_ANNOTATION_VALUE_LEN {
            return Err(GatewayError::validation(format!("annotation {name:?} value exceeds {MAX_ANNOTATION_VALUE_LEN} bytes")));
        }
    }
    Ok(())
}

/// Validate one wire alert and turn it into a domain [`Alert`]. Merges the
/// batch-level `commonLabels`/`groupLabels` the way the alert-manager
/// convention intends: per-alert labels take precedence over common ones.
fn build_alert(common_labels: &BTreeMap<String, String>, raw: WebhookAlert) -> Result<Alert, GatewayError> {
    let status = parse_status(&raw.status)?;

    let mut labels = common_labels.clone();
    labels.extend(raw.labels);
    validate_values(&labels, &raw.annotations)?;

    let alertname = labels
        .get("alertname")
        .cloned()
        .ok_or_else(|| GatewayError::validation("alert is missing required label \"alertname\""))?;

    let alert = match raw.fingerprint {
        Some(fp) if !fp.is_empty() => {
            Alert::with_fingerprint(Fingerprint::new(fp), alertname, status, raw.starts_at, raw.ends_at, labels, raw.annotations, raw.generator_url)
        }
        _ => Alert::new(alertname, status, raw.starts_at, raw.ends_at, labels, raw.annotations, raw.generator_url),
    };
    Ok(alert)
}

/// Validate a single wire alert outside of a batch context, for callers
/// (the classification endpoint) that accept one alert at a time rather
/// than an ingestion-shaped payload.
pub fn build_single_alert(raw: WebhookAlert) -> Result<Alert, GatewayError> {
    build_alert(&BTreeMap::new(), raw)
}

/// Parse, validate, and deduplicate an entire batch. A single malformed or
/// invalid alert fails the whole request with 400, matching §4.6 step 1's
/// "reject malformed JSON or missing required alert fields" — validation
/// happens before any alert in the batch is processed.
pub fn parse_and_validate(body: &[u8]) -> Result<Vec<Alert>, GatewayError> {
    let payload = parse_payload(body)?;
    let mut seen = HashSet::new();
    let mut alerts = Vec::with_capacity(payload.alerts.len());
    for raw in payload.alerts {
        let alert = build_alert(&payload.common_labels, raw)?;
        if seen.insert(alert.fingerprint.clone()) {
            alerts.push(alert);
        }
    }
    Ok(alerts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(json: &str) -> Vec<u8> {
        json.as_bytes().to_vec()
    }

    #[test]
    fn parses_minimal_valid_payload() {
        let b = body(
            r#"{"alerts":[{"status":"firing","labels":{"alertname":"HighCPU","severity":"warning"},"startsAt":"2025-01-09T10:00:00Z"}]}"#,
        );
        let alerts = parse_and_validate(&b).unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alertname, "HighCPU");
        assert!(alerts[0].is_firing());
    }

    #[test]
    fn malformed_json_is_rejected() {
        let b = body("not json");
        assert!(parse_and_validate(&b).is_err());
    }

    #[test]
    fn missing_alertname_is_rejected() {
        let b = body(r#"{"alerts":[{"status":"firing","labels":{"severity":"warning"},"startsAt":"2025-01-09T10:00:00Z"}]}"#);
        assert!(parse_and_validate(&b).is_err());
    }

    #[test]
    fn unknown_status_is_rejected() {
        let b = body(r#"{"alerts":[{"status":"flapping","labels":{"alertname":"X"},"startsAt":"2025-01-09T10:00:00Z"}]}"#);
        assert!(parse_and_validate(&b).is_err());
    }

    #[test]
    fn control_character_in_label_name_is_rejected() {
        let b = body("{\"alerts\":[{\"status\":\"firing\",\"labels\":{\"alertname\":\"X\",\"bad\\u0007\":\"v\"},\"startsAt\":\"2025-01-09T10:00:00Z\"}]}");
        assert!(parse_and_validate(&b).is_err());
    }

    #[test]
    fn duplicate_fingerprints_within_batch_are_deduplicated() {
        let b = body(
            r#"{"alerts":[
                {"status":"firing","labels":{"alertname":"X","instance":"a"},"startsAt":"2025-01-09T10:00:00Z"},
                {"status":"firing","labels":{"alertname":"X","instance":"a"},"startsAt":"2025-01-09T10:00:05Z"}
            ]}"#,
        );
        let alerts = parse_and_validate(&b).unwrap();
        assert_eq!(alerts.len(), 1);
    }

    #[test]
    fn common_labels_are_merged_but_overridden_by_per_alert_labels() {
        let b = body(
            r#"{"commonLabels":{"env":"prod","alertname":"fallback"},"alerts":[
                {"status":"firing","labels":{"alertname":"X"},"startsAt":"2025-01-09T10:00:00Z"}
            ]}"#,
        );
        let alerts = parse_and_validate(&b).unwrap();
        assert_eq!(alerts[0].alertname, "X");
        assert_eq!(alerts[0].label("env"), Some("prod"));
    }

    #[test]
    fn explicit_fingerprint_is_honored() {
        let b = body(
            r#"{"alerts":[{"status":"firing","fingerprint":"abc123","labels":{"alertname":"X"},"startsAt":"2025-01-09T10:00:00Z"}]}"#,
        );
        let alerts = parse_and_validate(&b).unwrap();
        assert_eq!(alerts[0].fingerprint.as_str(), "abc123");
    }
}
