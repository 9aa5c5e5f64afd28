//! The calls the doctor workflow makes to the outside world.
//!
//! [`DoctorAccessBackend`] is the seam between the workflow controller and whatever answers it.
//! [`SimulatedBackend`] answers from the built-in fixtures after a fixed delay; the
//! `chords-api-client` crate provides an implementation over HTTP.

use crate::auth::UserRole;
use crate::config::CoreConfig;
use crate::constants::DIGITAL_HEALTH_ID_PREFIX;
use crate::doctor::{AuthenticationRequest, DoctorCredentials, HealthRecord, Patient};
use crate::error::BackendError;
use crate::fixtures::{test_account, test_health_records, test_patients, TestAccount};
use async_trait::async_trait;
use chords_types::HealthCardNumber;
use std::time::Duration;

#[async_trait]
pub trait DoctorAccessBackend: Send + Sync {
    /// Verify the doctor's credentials.
    async fn login(&self, credentials: &DoctorCredentials) -> Result<(), BackendError>;

    async fn search_patients(&self, query: &str) -> Result<Vec<Patient>, BackendError>;

    /// Deliver a one-time code to the patient's registered device.
    async fn send_otp(&self, patient_id: &str) -> Result<(), BackendError>;

    async fn authenticate_patient(
        &self,
        request: &AuthenticationRequest,
    ) -> Result<(), BackendError>;

    async fn health_records(&self, patient_id: &str) -> Result<Vec<HealthRecord>, BackendError>;
}

/// How a free-text patient search is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    HealthCard(HealthCardNumber),
    DigitalHealthId(String),
    Name(String),
}

impl SearchQuery {
    /// Classify `query`. Returns `None` for a blank query.
    pub fn parse(query: &str) -> Option<SearchQuery> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        if let Ok(card) = HealthCardNumber::parse(query) {
            return Some(SearchQuery::HealthCard(card));
        }

        let upper = query.to_uppercase();
        if upper.starts_with(DIGITAL_HEALTH_ID_PREFIX)
            && upper.len() > DIGITAL_HEALTH_ID_PREFIX.len()
            && upper[DIGITAL_HEALTH_ID_PREFIX.len()..]
                .chars()
                .all(|c| c.is_ascii_digit())
        {
            return Some(SearchQuery::DigitalHealthId(upper));
        }

        Some(SearchQuery::Name(query.to_lowercase()))
    }

    pub fn matches(&self, patient: &Patient) -> bool {
        match self {
            SearchQuery::HealthCard(card) => patient.health_card_number == card.as_str(),
            SearchQuery::DigitalHealthId(id) => patient.digital_health_id.eq_ignore_ascii_case(id),
            SearchQuery::Name(name) => patient.name.to_lowercase().contains(name.as_str()),
        }
    }
}

/// Fixture-backed backend that waits a fixed latency before answering.
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    latency: Duration,
    doctor: TestAccount,
    patients: Vec<Patient>,
    records: Vec<HealthRecord>,
}

impl SimulatedBackend {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            doctor: test_account(UserRole::Doctor),
            patients: test_patients(),
            records: test_health_records(),
        }
    }

    pub fn from_config(cfg: &CoreConfig) -> Self {
        Self::new(cfg.simulated_latency())
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn require_patient(&self, patient_id: &str) -> Result<&Patient, BackendError> {
        self.patients
            .iter()
            .find(|p| p.id == patient_id)
            .ok_or_else(|| BackendError::PatientNotFound(patient_id.to_string()))
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

#[async_trait]
impl DoctorAccessBackend for SimulatedBackend {
    async fn login(&self, credentials: &DoctorCredentials) -> Result<(), BackendError> {
        self.simulate_latency().await;
        tracing::debug!(username = %credentials.username, "simulated doctor login");

        if credentials.username.as_str() == self.doctor.username
            && credentials.password.as_str() == self.doctor.password
        {
            Ok(())
        } else {
            Err(BackendError::InvalidCredentials)
        }
    }

    async fn search_patients(&self, query: &str) -> Result<Vec<Patient>, BackendError> {
        self.simulate_latency().await;
        tracing::debug!(query, "simulated patient search");

        let Some(query) = SearchQuery::parse(query) else {
            return Ok(Vec::new());
        };
        Ok(self
            .patients
            .iter()
            .filter(|p| query.matches(p))
            .cloned()
            .collect())
    }

    async fn send_otp(&self, patient_id: &str) -> Result<(), BackendError> {
        self.simulate_latency().await;
        self.require_patient(patient_id)?;
        tracing::debug!(patient_id, "simulated OTP sent");
        Ok(())
    }

    async fn authenticate_patient(
        &self,
        request: &AuthenticationRequest,
    ) -> Result<(), BackendError> {
        self.simulate_latency().await;
        self.require_patient(&request.patient_id)?;
        tracing::debug!(
            patient_id = %request.patient_id,
            method = %request.authentication_type,
            "simulated patient authentication"
        );
        Ok(())
    }

    async fn health_records(&self, patient_id: &str) -> Result<Vec<HealthRecord>, BackendError> {
        self.simulate_latency().await;
        self.require_patient(patient_id)?;
        Ok(self.records.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doctor::AuthMethod;
    use chords_types::{NonEmptyText, Password};
    use chrono::Utc;

    fn credentials(username: &str, password: &str) -> DoctorCredentials {
        DoctorCredentials {
            username: NonEmptyText::new(username).unwrap(),
            password: Password::new(password).unwrap(),
            license_number: NonEmptyText::new("MD123456").unwrap(),
            province: NonEmptyText::new("Ontario").unwrap(),
        }
    }

    #[test]
    fn query_classification() {
        assert!(matches!(
            SearchQuery::parse(" ON1234567 "),
            Some(SearchQuery::HealthCard(_))
        ));
        assert_eq!(
            SearchQuery::parse("dhi789012"),
            Some(SearchQuery::DigitalHealthId("DHI789012".into()))
        );
        assert_eq!(
            SearchQuery::parse("Jane"),
            Some(SearchQuery::Name("jane".into()))
        );
        assert_eq!(SearchQuery::parse("   "), None);
    }

    #[tokio::test]
    async fn search_matches_each_identifier_kind() {
        let backend = SimulatedBackend::default();

        let by_card = backend.search_patients("BC9876543").await.unwrap();
        assert_eq!(by_card.len(), 1);
        assert_eq!(by_card[0].name, "Jane Smith");

        let by_dhi = backend.search_patients("DHI123456").await.unwrap();
        assert_eq!(by_dhi[0].name, "John Doe");

        let by_name = backend.search_patients("doe").await.unwrap();
        assert_eq!(by_name.len(), 1);

        assert!(backend.search_patients("Nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn login_checks_username_and_password() {
        let backend = SimulatedBackend::default();
        assert!(backend
            .login(&credentials("dr.smith", "test1234"))
            .await
            .is_ok());
        assert_eq!(
            backend.login(&credentials("dr.smith", "wrong")).await,
            Err(BackendError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn unknown_patient_cannot_authenticate() {
        let backend = SimulatedBackend::default();
        let request = AuthenticationRequest {
            patient_id: "99".into(),
            authentication_type: AuthMethod::Biometric,
            timestamp: Utc::now(),
        };
        assert_eq!(
            backend.authenticate_patient(&request).await,
            Err(BackendError::PatientNotFound("99".into()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn latency_is_applied() {
        let backend = SimulatedBackend::new(Duration::from_secs(1));
        let started = tokio::time::Instant::now();
        backend.send_otp("1").await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(1));
    }
}
