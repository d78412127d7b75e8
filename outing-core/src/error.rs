use std::time::Duration;
use thiserror::Error;

/// Failures while fetching or reading a forecast.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Forecast request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Failed to send forecast request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Forecast request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse forecast JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Forecast response contained no hourly data")]
    EmptyHourly,
}

impl ForecastError {
    /// Whether asking again with a different forecast model may help.
    pub fn model_may_help(&self) -> bool {
        matches!(self, ForecastError::EmptyHourly | ForecastError::Status { .. })
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_bodies_are_truncated_on_char_boundaries() {
        let body = "ã".repeat(300);
        let t = truncate_body(&body);
        assert!(t.ends_with("..."));
        assert_eq!(t.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn only_payload_errors_suggest_another_model() {
        assert!(ForecastError::EmptyHourly.model_may_help());
        assert!(
            ForecastError::Status {
                status: 400,
                body: "bad model".into()
            }
            .model_may_help()
        );
        assert!(!ForecastError::Timeout(Duration::from_secs(12)).model_may_help());
    }

    #[test]
    fn timeout_message_names_seconds() {
        let msg = ForecastError::Timeout(Duration::from_secs(12)).to_string();
        assert_eq!(msg, "Forecast request timed out after 12s");
    }
}
