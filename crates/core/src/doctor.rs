//! Domain types for the doctor access workflow.
//!
//! Field names serialize in camelCase so the JSON matches what the dashboard and the
//! placeholder API exchange.

use chords_types::{NonEmptyText, Password};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub health_card_number: String,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub home_province: String,
    pub digital_health_id: String,
}

/// Why a doctor is asking for a patient's records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VisitReason {
    EmergencyCare,
    Consultation,
    Referral,
    FollowUp,
    SpecialistVisit,
}

impl VisitReason {
    /// Every reason, in the order the selection screen lists them.
    pub const ALL: [VisitReason; 5] = [
        VisitReason::EmergencyCare,
        VisitReason::Consultation,
        VisitReason::Referral,
        VisitReason::FollowUp,
        VisitReason::SpecialistVisit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VisitReason::EmergencyCare => "emergency_care",
            VisitReason::Consultation => "consultation",
            VisitReason::Referral => "referral",
            VisitReason::FollowUp => "follow_up",
            VisitReason::SpecialistVisit => "specialist_visit",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VisitReason::EmergencyCare => "Emergency Care",
            VisitReason::Consultation => "Consultation",
            VisitReason::Referral => "Referral",
            VisitReason::FollowUp => "Follow-up",
            VisitReason::SpecialistVisit => "Specialist Visit",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            VisitReason::EmergencyCare => {
                "Immediate medical attention required for acute conditions"
            }
            VisitReason::Consultation => "General medical consultation or second opinion",
            VisitReason::Referral => "Patient referred by another healthcare provider",
            VisitReason::FollowUp => "Follow-up visit for existing condition or treatment",
            VisitReason::SpecialistVisit => "Specialized medical consultation",
        }
    }
}

impl std::fmt::Display for VisitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisitReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VisitReason::ALL
            .into_iter()
            .find(|r| r.as_str() == s.trim())
            .ok_or_else(|| format!("unknown visit reason: {s}"))
    }
}

/// How the patient proves they consent to the access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    Biometric,
    Otp,
}

impl AuthMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthMethod::Biometric => "biometric",
            AuthMethod::Otp => "otp",
        }
    }
}

impl std::fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "biometric" => Ok(AuthMethod::Biometric),
            "otp" => Ok(AuthMethod::Otp),
            other => Err(format!("unknown authentication method: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationRequest {
    pub patient_id: String,
    pub authentication_type: AuthMethod,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of patient-side authentication.
///
/// The optional fields mirror the wire shape; a status produced by [`Self::granted`] always has
/// all of them set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientAuthenticationStatus {
    pub is_authenticated: bool,
    pub method: Option<AuthMethod>,
    pub timestamp: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl PatientAuthenticationStatus {
    pub fn granted(method: AuthMethod, at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            is_authenticated: true,
            method: Some(method),
            timestamp: Some(at),
            expires_at: Some(expires_at),
        }
    }
}

/// Doctor sign-in details. All four fields are required.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoctorCredentials {
    #[schema(value_type = String)]
    pub username: NonEmptyText,
    /// Compared exactly as typed; surrounding whitespace is not stripped.
    #[schema(value_type = String)]
    pub password: Password,
    #[schema(value_type = String)]
    pub license_number: NonEmptyText,
    #[schema(value_type = String)]
    pub province: NonEmptyText,
}

impl std::fmt::Debug for DoctorCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DoctorCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("license_number", &self.license_number)
            .field("province", &self.province)
            .finish()
    }
}

/// Audit entry written whenever a doctor opens a patient's records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessLog {
    pub id: Uuid,
    pub doctor_id: String,
    pub patient_id: String,
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub visit_reason: VisitReason,
    pub accessed_data: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Provider {
    pub name: String,
    pub organization: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Final,
    Preliminary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub title: String,
    pub date: NaiveDate,
    pub provider: Provider,
    pub status: RecordStatus,
    pub category: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visit_reasons_use_snake_case_wire_values() {
        let json = serde_json::to_string(&VisitReason::SpecialistVisit).unwrap();
        assert_eq!(json, "\"specialist_visit\"");
        let parsed: VisitReason = serde_json::from_str("\"follow_up\"").unwrap();
        assert_eq!(parsed, VisitReason::FollowUp);
    }

    #[test]
    fn visit_reason_parses_every_listed_value() {
        for reason in VisitReason::ALL {
            assert_eq!(reason.as_str().parse::<VisitReason>(), Ok(reason));
        }
        assert!("walk_in".parse::<VisitReason>().is_err());
    }

    #[test]
    fn patient_serializes_camel_case() {
        let patient = Patient {
            id: "1".into(),
            health_card_number: "ON1234567".into(),
            name: "John Doe".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1980, 1, 1).unwrap(),
            home_province: "Ontario".into(),
            digital_health_id: "DHI123456".into(),
        };
        let value = serde_json::to_value(&patient).unwrap();
        assert_eq!(value["healthCardNumber"], "ON1234567");
        assert_eq!(value["dateOfBirth"], "1980-01-01");
        assert_eq!(value["digitalHealthId"], "DHI123456");
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = DoctorCredentials {
            username: NonEmptyText::new("dr.smith").unwrap(),
            password: Password::new("test1234").unwrap(),
            license_number: NonEmptyText::new("MD123456").unwrap(),
            province: NonEmptyText::new("Ontario").unwrap(),
        };
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("dr.smith"));
        assert!(!rendered.contains("test1234"));
    }

    #[test]
    fn health_record_type_field_is_renamed() {
        let json = r#"{
            "id": "9",
            "type": "imaging",
            "title": "Chest X-Ray",
            "date": "2024-02-10",
            "provider": {"name": "Dr. Michael Chen", "organization": "Radiology Partners"},
            "status": "final",
            "category": "Radiology",
            "description": "Frontal and lateral views."
        }"#;
        let record: HealthRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.record_type, "imaging");
        assert_eq!(record.status, RecordStatus::Final);
    }
}
