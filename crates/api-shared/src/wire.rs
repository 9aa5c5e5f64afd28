//! Bodies exchanged between the REST service and the HTTP client that do not belong to the
//! domain model.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// JSON error body returned with every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

impl ErrorRes {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Body of endpoints that only acknowledge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AckRes {
    pub ok: bool,
}

/// Query string of `GET /api/patients/search`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Health card number, digital health ID or part of a name.
    #[serde(default)]
    pub q: String,
}

/// Body of `POST /api/emergency-access/enable`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EmergencyCodeReq {
    /// Six-digit verification code sent to the patient's phone.
    pub code: String,
}
