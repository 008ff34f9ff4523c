//! Renders an alert (plus its verdict, if any) into the wire payload a
//! specific receiver adapter expects to publish verbatim.
//!
//! Per the "closed, compile-time-known family" design note, this is a
//! tagged variant over the three known adapters, not a plugin surface.
//! The variant carries whatever per-receiver, non-secret routing detail
//! (PagerDuty's routing key, Slack's target channel) the wire shape needs;
//! the adapter itself still owns transport auth and response handling.

use alertgate_core::{Alert, ClassificationVerdict, Severity};
use alertgate_pagerduty::{PagerDutyEvent, PagerDutyPayload};
use serde_json::json;

#[derive(Debug, Clone)]
pub enum ReceiverKind {
    PagerDuty { routing_key: String },
    Slack { channel: String },
    Webhook,
}

fn severity_str(alert: &Alert, verdict: Option<&ClassificationVerdict>) -> &'static str {
    match verdict.map(|v| v.severity) {
        Some(Severity::Critical) => "critical",
        Some(Severity::Warning) => "warning",
        Some(Severity::Info | Severity::Noise) => "info",
        None => match alert.label("severity") {
            Some("critical") => "critical",
            Some("info") => "info",
            _ => "warning",
        },
    }
}

fn summary(alert: &Alert) -> String {
    alert.annotations.get("summary").cloned().unwrap_or_else(|| alert.alertname.clone())
}

fn format_pagerduty(alert: &Alert, verdict: Option<&ClassificationVerdict>, routing_key: &str) -> Vec<u8> {
    let event = PagerDutyEvent {
        routing_key: routing_key.to_string(),
        event_action: if alert.is_firing() { "trigger".to_string() } else { "resolve".to_string() },
        dedup_key: Some(alert.fingerprint.as_str().to_string()),
        payload: Some(PagerDutyPayload {
            summary: summary(alert),
            source: alert.label("instance").unwrap_or("alertgate").to_string(),
            severity: severity_str(alert, verdict).to_string(),
            component: alert.label("component").map(str::to_string),
            group: alert.label("cluster").map(str::to_string),
            class: None,
            custom_details: Some(json!({
                "labels": alert.labels,
                "annotations": alert.annotations,
                "verdict": verdict,
            })),
        }),
        images: None,
        links: None,
    };
    serde_json::to_vec(&event).expect("PagerDutyEvent always serializes")
}

fn format_slack(alert: &Alert, verdict: Option<&ClassificationVerdict>, channel: &str) -> Vec<u8> {
    let severity = severity_str(alert, verdict);
    let text = format!("[{}] {} — {}", severity.to_uppercase(), alert.alertname, summary(alert));
    let body = json!({
        "channel": channel,
        "text": text,
        "attachments": [{
            "color": match severity { "critical" => "danger", "warning" => "warning", _ => "#439FE0" },
            "fields": alert.labels.iter().map(|(k, v)| json!({"title": k, "value": v, "short": true})).collect::<Vec<_>>(),
        }],
    });
    serde_json::to_vec(&body).expect("Slack message always serializes")
}

fn format_webhook(alert: &Alert, verdict: Option<&ClassificationVerdict>) -> Vec<u8> {
    let body = json!({ "alert": alert, "verdict": verdict });
    serde_json::to_vec(&body).expect("generic webhook body always serializes")
}

#[must_use]
pub fn format_payload(alert: &Alert, verdict: Option<&ClassificationVerdict>, kind: &ReceiverKind) -> Vec<u8> {
    match kind {
        ReceiverKind::PagerDuty { routing_key } => format_pagerduty(alert, verdict, routing_key),
        ReceiverKind::Slack { channel } => format_slack(alert, verdict, channel),
        ReceiverKind::Webhook => format_webhook(alert, verdict),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alertgate_core::AlertStatus;
    use std::collections::BTreeMap;

    fn alert() -> Alert {
        let mut labels = BTreeMap::new();
        labels.insert("severity".to_string(), "critical".to_string());
        labels.insert("instance".to_string(), "api-1".to_string());
        Alert::new("HighCPU", AlertStatus::Firing, chrono::Utc::now(), None, labels, BTreeMap::new(), None)
    }

    #[test]
    fn pagerduty_format_includes_routing_key_and_dedup_key() {
        let bytes = format_payload(&alert(), None, &ReceiverKind::PagerDuty { routing_key: "R123".into() });
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["routing_key"], "R123");
        assert_eq!(v["event_action"], "trigger");
        assert_eq!(v["payload"]["severity"], "critical");
    }

    #[test]
    fn slack_format_mentions_alertname_and_channel() {
        let bytes = format_payload(&alert(), None, &ReceiverKind::Slack { channel: "#alerts".into() });
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["channel"], "#alerts");
        assert!(v["text"].as_str().unwrap().contains("HighCPU"));
    }

    #[test]
    fn webhook_format_embeds_the_full_alert() {
        let bytes = format_payload(&alert(), None, &ReceiverKind::Webhook);
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["alert"]["alertname"], "HighCPU");
        assert!(v["verdict"].is_null());
    }

    #[test]
    fn resolved_alert_uses_resolve_action() {
        let mut a = alert();
        a.status = AlertStatus::Resolved;
        let bytes = format_payload(&a, None, &ReceiverKind::PagerDuty { routing_key: "R1".into() });
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["event_action"], "resolve");
    }
}
