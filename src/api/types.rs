use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

// Response DTOs

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy(now: DateTime<Utc>) -> Self {
        Self {
            status: "healthy",
            timestamp: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let json = serde_json::to_value(HealthResponse::healthy(now)).unwrap();

        assert_eq!(json["status"], "healthy");
        assert_eq!(json["timestamp"], "2024-01-01T00:00:00Z");
    }
}
