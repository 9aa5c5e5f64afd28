//! [`DoctorAccessBackend`] over the REST API.

use crate::client::ApiClient;
use crate::error::ApiError;
use api_shared::AckRes;
use async_trait::async_trait;
use chords_core::{
    AuthenticationRequest, BackendError, DoctorAccessBackend, DoctorCredentials, HealthRecord,
    Patient,
};
use reqwest::Method;

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: ApiClient,
}

/// Which call failed, for turning HTTP statuses into backend errors.
#[derive(Clone, Copy)]
enum Call<'a> {
    Login,
    Search,
    Patient(&'a str),
}

fn backend_error(call: Call<'_>, e: ApiError) -> BackendError {
    match (e.status(), call) {
        (Some(401), Call::Login) => BackendError::InvalidCredentials,
        (Some(404), Call::Patient(id)) => BackendError::PatientNotFound(id.to_string()),
        (Some(status), _) if (400..500).contains(&status) => match e {
            ApiError::Status { message, .. } => BackendError::Rejected(message),
            other => BackendError::Rejected(other.to_string()),
        },
        _ => BackendError::Unavailable(e.to_string()),
    }
}

impl HttpBackend {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DoctorAccessBackend for HttpBackend {
    async fn login(&self, credentials: &DoctorCredentials) -> Result<(), BackendError> {
        self.client
            .post::<_, AckRes>("api/doctor/login", credentials)
            .await
            .map_err(|e| backend_error(Call::Login, e))?;
        Ok(())
    }

    async fn search_patients(&self, query: &str) -> Result<Vec<Patient>, BackendError> {
        let mut url = self
            .client
            .endpoint(&["api", "patients", "search"])
            .map_err(|e| backend_error(Call::Search, e))?;
        url.query_pairs_mut().append_pair("q", query);
        self.client
            .execute::<_, ()>(Method::GET, url, None)
            .await
            .map_err(|e| backend_error(Call::Search, e))
    }

    async fn send_otp(&self, patient_id: &str) -> Result<(), BackendError> {
        let call = Call::Patient(patient_id);
        let url = self
            .client
            .endpoint(&["api", "patients", patient_id, "otp"])
            .map_err(|e| backend_error(call, e))?;
        self.client
            .execute::<AckRes, ()>(Method::POST, url, None)
            .await
            .map_err(|e| backend_error(call, e))?;
        Ok(())
    }

    async fn authenticate_patient(
        &self,
        request: &AuthenticationRequest,
    ) -> Result<(), BackendError> {
        let call = Call::Patient(&request.patient_id);
        let url = self
            .client
            .endpoint(&["api", "patients", &request.patient_id, "authenticate"])
            .map_err(|e| backend_error(call, e))?;
        self.client
            .execute::<AckRes, _>(Method::POST, url, Some(request))
            .await
            .map_err(|e| backend_error(call, e))?;
        Ok(())
    }

    async fn health_records(&self, patient_id: &str) -> Result<Vec<HealthRecord>, BackendError> {
        let call = Call::Patient(patient_id);
        let url = self
            .client
            .endpoint(&["api", "patients", patient_id, "records"])
            .map_err(|e| backend_error(call, e))?;
        self.client
            .execute::<_, ()>(Method::GET, url, None)
            .await
            .map_err(|e| backend_error(call, e))
    }
}
