use alertgate_core::{Alert, ClassificationVerdict, Severity};

/// Deterministic rule-based verdict derived solely from an alert's labels,
/// used when the remote model is unreachable. Never errors.
#[must_use]
pub fn classify_fallback(alert: &Alert, confidence_ceiling: f64) -> ClassificationVerdict {
    let (severity, reasoning) = match alert.label("severity") {
        Some("critical") => (Severity::Critical, "derived from severity label"),
        Some("warning") => (Severity::Warning, "derived from severity label"),
        Some("info") => (Severity::Info, "derived from severity label"),
        Some("noise") | Some("none") => (Severity::Noise, "derived from severity label"),
        _ => (Severity::Warning, "no severity label present, defaulting to warning"),
    };
    let mut v = ClassificationVerdict::fallback(severity, reasoning);
    v.confidence = v.confidence.min(confidence_ceiling);
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use alertgate_core::AlertStatus;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn alert_with_severity(sev: Option<&str>) -> Alert {
        let mut labels = BTreeMap::new();
        if let Some(s) = sev {
            labels.insert("severity".to_string(), s.to_string());
        }
        Alert::new("X", AlertStatus::Firing, Utc::now(), None, labels, BTreeMap::new(), None)
    }

    #[test]
    fn honors_severity_label() {
        let v = classify_fallback(&alert_with_severity(Some("critical")), 0.5);
        assert_eq!(v.severity, Severity::Critical);
    }

    #[test]
    fn defaults_to_warning_without_label() {
        let v = classify_fallback(&alert_with_severity(None), 0.5);
        assert_eq!(v.severity, Severity::Warning);
    }

    #[test]
    fn respects_confidence_ceiling() {
        let v = classify_fallback(&alert_with_severity(Some("critical")), 0.2);
        assert!(v.confidence <= 0.2);
    }
}
