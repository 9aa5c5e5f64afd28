use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of the `/health` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Health service shared by the REST server and the runner.
#[derive(Debug, Clone, Default)]
pub struct HealthService;

impl HealthService {
    pub fn new() -> Self {
        Self
    }

    /// Report the service as healthy.
    ///
    /// There is no external dependency to probe; the simulated backend lives in-process.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "CHORDS is alive".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_is_ok() {
        let res = HealthService::check_health();
        assert!(res.ok);
        assert_eq!(
            serde_json::to_value(&res).unwrap(),
            serde_json::json!({"ok": true, "message": "CHORDS is alive"})
        );
    }
}
