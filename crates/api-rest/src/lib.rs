//! # API REST
//!
//! REST API for the CHORDS doctor-access flow.
//!
//! Handles:
//! - the `/api` endpoints the HTTP backend calls, answered by a [`DoctorAccessBackend`]
//! - the patient's emergency access switch and the record access trail
//! - the optional bearer-token check on `/api`
//! - `/health` and the OpenAPI/Swagger documentation
//!
//! Uses `api-shared` for the health service and the non-domain bodies.

#![warn(rust_2018_idioms)]

use api_shared::{
    bearer_token, validate_api_key, AckRes, EmergencyCodeReq, ErrorRes, HealthRes, HealthService,
    SearchParams,
};
use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use chords_core::{
    AccessLog, AuditError, AuditFilter, AuditLogStore, AuthMethod, AuthenticationRequest,
    BackendError, CoreConfig, DoctorAccessBackend, DoctorCredentials, EmergencyAccess,
    EmergencyAccessStatus, EmergencyError, FileStore, HealthRecord, KeyValueStore, MemoryStore,
    Patient, Provider, RecordStatus, SimulatedBackend, StorageError, VisitReason,
};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

type ApiError = (StatusCode, Json<ErrorRes>);

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    backend: Arc<dyn DoctorAccessBackend>,
    api_key: Option<Arc<str>>,
    emergency: Arc<Mutex<EmergencyAccess>>,
    audit: AuditLogStore,
}

impl AppState {
    /// State whose emergency switch and access trail live in memory.
    pub fn new(backend: Arc<dyn DoctorAccessBackend>, api_key: Option<String>) -> Self {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::default());
        Self {
            backend,
            api_key: api_key.map(Arc::from),
            emergency: Arc::new(Mutex::new(EmergencyAccess::new(Arc::clone(&storage)))),
            audit: AuditLogStore::new(storage),
        }
    }

    /// Keep the emergency switch and the access trail in `storage` instead.
    pub fn with_storage(self, storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            emergency: Arc::new(Mutex::new(EmergencyAccess::new(Arc::clone(&storage)))),
            audit: AuditLogStore::new(storage),
            ..self
        }
    }

    /// Serve the simulated backend, guarded by the configured API token if there is one, with
    /// state persisted in the configured data directory.
    pub fn from_config(cfg: &CoreConfig) -> Self {
        Self::new(
            Arc::new(SimulatedBackend::from_config(cfg)),
            cfg.api_token().map(str::to_string),
        )
        .with_storage(Arc::new(FileStore::from_config(cfg)))
    }

    fn emergency(&self) -> MutexGuard<'_, EmergencyAccess> {
        self.emergency
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        doctor_login,
        search_patients,
        send_otp,
        authenticate_patient,
        health_records,
        emergency_access_status,
        enable_emergency_access,
        disable_emergency_access,
        list_audit_logs,
        record_audit_log,
    ),
    components(schemas(
        HealthRes,
        AckRes,
        ErrorRes,
        DoctorCredentials,
        Patient,
        AuthMethod,
        AuthenticationRequest,
        HealthRecord,
        Provider,
        RecordStatus,
        EmergencyAccessStatus,
        EmergencyCodeReq,
        AccessLog,
        VisitReason,
    ))
)]
pub struct ApiDoc;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/doctor/login", post(doctor_login))
        .route("/patients/search", get(search_patients))
        .route("/patients/:id/otp", post(send_otp))
        .route("/patients/:id/authenticate", post(authenticate_patient))
        .route("/patients/:id/records", get(health_records))
        .route("/emergency-access", get(emergency_access_status))
        .route("/emergency-access/enable", post(enable_emergency_access))
        .route("/emergency-access/disable", post(disable_emergency_access))
        .route("/audit-logs", get(list_audit_logs).post(record_audit_log))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorRes::new(message)))
}

fn backend_error(e: BackendError) -> ApiError {
    let status = match &e {
        BackendError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        BackendError::PatientNotFound(_) => StatusCode::NOT_FOUND,
        BackendError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
        BackendError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    if status.is_server_error() {
        tracing::error!("Backend error: {}", e);
    } else {
        tracing::warn!("Request refused: {}", e);
    }
    error(status, e.to_string())
}

fn storage_error(e: StorageError) -> ApiError {
    tracing::error!("Storage error: {}", e);
    error(StatusCode::INTERNAL_SERVER_ERROR, "storage unavailable")
}

fn emergency_error(e: EmergencyError) -> ApiError {
    let message = e.to_string();
    let status = match e {
        EmergencyError::Storage(e) => return storage_error(e),
        EmergencyError::MalformedCode => StatusCode::BAD_REQUEST,
        EmergencyError::InvalidCode => StatusCode::FORBIDDEN,
        EmergencyError::NotPending => StatusCode::CONFLICT,
    };
    tracing::warn!("Emergency access refused: {}", message);
    error(status, message)
}

async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(expected) = state.api_key.as_deref() {
        let provided = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token);
        validate_api_key(provided, expected).map_err(|e| {
            tracing::warn!(path = %request.uri().path(), "rejected request: {}", e);
            error(StatusCode::UNAUTHORIZED, e.to_string())
        })?;
    }
    Ok(next.run(request).await)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for monitoring and load balancers.
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/api/doctor/login",
    request_body = DoctorCredentials,
    responses(
        (status = 200, description = "Credentials accepted", body = AckRes),
        (status = 401, description = "Invalid credentials", body = ErrorRes)
    )
)]
/// Verify a doctor's sign-in details.
#[axum::debug_handler]
async fn doctor_login(
    State(state): State<AppState>,
    Json(credentials): Json<DoctorCredentials>,
) -> Result<Json<AckRes>, ApiError> {
    state
        .backend
        .login(&credentials)
        .await
        .map_err(backend_error)?;
    tracing::info!(username = %credentials.username, "doctor login accepted");
    Ok(Json(AckRes { ok: true }))
}

#[utoipa::path(
    get,
    path = "/api/patients/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching patients", body = [Patient])
    )
)]
/// Search patients by health card number, digital health ID or name.
#[axum::debug_handler]
async fn search_patients(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Patient>>, ApiError> {
    let patients = state
        .backend
        .search_patients(&params.q)
        .await
        .map_err(backend_error)?;
    Ok(Json(patients))
}

#[utoipa::path(
    post,
    path = "/api/patients/{id}/otp",
    params(("id" = String, Path, description = "Patient identifier")),
    responses(
        (status = 200, description = "Code sent", body = AckRes),
        (status = 404, description = "Unknown patient", body = ErrorRes)
    )
)]
/// Send a one-time code to the patient's registered device.
async fn send_otp(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AckRes>, ApiError> {
    state.backend.send_otp(&id).await.map_err(backend_error)?;
    Ok(Json(AckRes { ok: true }))
}

#[utoipa::path(
    post,
    path = "/api/patients/{id}/authenticate",
    params(("id" = String, Path, description = "Patient identifier")),
    request_body = AuthenticationRequest,
    responses(
        (status = 200, description = "Patient authenticated", body = AckRes),
        (status = 400, description = "Path and body disagree", body = ErrorRes),
        (status = 404, description = "Unknown patient", body = ErrorRes)
    )
)]
/// Record the patient's biometric or one-time-code authentication.
async fn authenticate_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AuthenticationRequest>,
) -> Result<Json<AckRes>, ApiError> {
    if request.patient_id != id {
        return Err(error(
            StatusCode::BAD_REQUEST,
            "patientId does not match the request path",
        ));
    }
    state
        .backend
        .authenticate_patient(&request)
        .await
        .map_err(backend_error)?;
    tracing::info!(
        patient_id = %id,
        method = %request.authentication_type,
        "patient authenticated"
    );
    Ok(Json(AckRes { ok: true }))
}

#[utoipa::path(
    get,
    path = "/api/patients/{id}/records",
    params(("id" = String, Path, description = "Patient identifier")),
    responses(
        (status = 200, description = "Patient health records", body = [HealthRecord]),
        (status = 404, description = "Unknown patient", body = ErrorRes)
    )
)]
/// List a patient's health records.
async fn health_records(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<HealthRecord>>, ApiError> {
    let records = state
        .backend
        .health_records(&id)
        .await
        .map_err(backend_error)?;
    Ok(Json(records))
}

#[utoipa::path(
    get,
    path = "/api/emergency-access",
    responses(
        (status = 200, description = "Current emergency access setting", body = EmergencyAccessStatus)
    )
)]
async fn emergency_access_status(
    State(state): State<AppState>,
) -> Result<Json<EmergencyAccessStatus>, ApiError> {
    let status = state.emergency().status().map_err(storage_error)?;
    Ok(Json(status))
}

#[utoipa::path(
    post,
    path = "/api/emergency-access/enable",
    request_body = EmergencyCodeReq,
    responses(
        (status = 200, description = "Emergency access enabled", body = EmergencyAccessStatus),
        (status = 400, description = "Code is not six digits", body = ErrorRes),
        (status = 403, description = "Wrong verification code", body = ErrorRes)
    )
)]
/// Switch emergency access on. Needs the verification code sent to the patient's phone.
async fn enable_emergency_access(
    State(state): State<AppState>,
    Json(req): Json<EmergencyCodeReq>,
) -> Result<Json<EmergencyAccessStatus>, ApiError> {
    let status = state
        .emergency()
        .enable(&req.code)
        .map_err(emergency_error)?;
    Ok(Json(status))
}

#[utoipa::path(
    post,
    path = "/api/emergency-access/disable",
    responses(
        (status = 200, description = "Emergency access disabled", body = EmergencyAccessStatus)
    )
)]
async fn disable_emergency_access(
    State(state): State<AppState>,
) -> Result<Json<EmergencyAccessStatus>, ApiError> {
    let status = state.emergency().disable().map_err(emergency_error)?;
    Ok(Json(status))
}

#[utoipa::path(
    get,
    path = "/api/audit-logs",
    params(AuditFilter),
    responses(
        (status = 200, description = "Matching access entries, newest first", body = [AccessLog]),
        (status = 400, description = "End date before start date", body = ErrorRes)
    )
)]
/// List record access entries filtered by text and date range.
async fn list_audit_logs(
    State(state): State<AppState>,
    Query(filter): Query<AuditFilter>,
) -> Result<Json<Vec<AccessLog>>, ApiError> {
    let entries = state.audit.query(&filter).map_err(|e| match e {
        AuditError::Validation(e) => error(StatusCode::BAD_REQUEST, e.to_string()),
        AuditError::Storage(e) => storage_error(e),
    })?;
    Ok(Json(entries))
}

#[utoipa::path(
    post,
    path = "/api/audit-logs",
    request_body = AccessLog,
    responses(
        (status = 201, description = "Entry stored", body = AckRes)
    )
)]
/// Report a record access made by a client.
async fn record_audit_log(
    State(state): State<AppState>,
    Json(entry): Json<AccessLog>,
) -> Result<(StatusCode, Json<AckRes>), ApiError> {
    state
        .audit
        .append(std::slice::from_ref(&entry))
        .map_err(storage_error)?;
    tracing::info!(
        doctor_id = %entry.doctor_id,
        patient_id = %entry.patient_id,
        "record access reported"
    );
    Ok((StatusCode::CREATED, Json(AckRes { ok: true })))
}
