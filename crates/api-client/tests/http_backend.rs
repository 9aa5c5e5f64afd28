use api_rest::{router, AppState};
use chords_api_client::{ApiClient, ApiError, HttpBackend};
use chords_core::screens::LoginField;
use chords_core::{
    AuthMethod, BackendError, DoctorAccessBackend, DoctorWorkflow, SimulatedBackend, Step,
    VisitReason,
};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Serve the REST router on an ephemeral port and return its base URL.
async fn spawn_server(api_key: Option<&str>) -> String {
    let app = router(AppState::new(
        Arc::new(SimulatedBackend::default()),
        api_key.map(str::to_string),
    ));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn client_reads_json_and_reports_status() {
    let base = spawn_server(None).await;
    let client = ApiClient::new(&base).unwrap();

    let health: serde_json::Value = client.get("/health").await.unwrap();
    assert_eq!(health["ok"], true);

    let err = client
        .get::<serde_json::Value>("/api/patients/42/records")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 404, .. }));
    assert_eq!(err.to_string(), "HTTP error! status: 404");
}

#[tokio::test]
async fn bearer_token_is_sent_when_configured() {
    let base = spawn_server(Some("secret")).await;

    let anonymous = HttpBackend::new(ApiClient::new(&base).unwrap());
    let err = anonymous.search_patients("John").await.unwrap_err();
    assert!(matches!(err, BackendError::Rejected(_)));

    let authorised = HttpBackend::new(
        ApiClient::new(&base)
            .unwrap()
            .with_token(Some("secret".into())),
    );
    let patients = authorised.search_patients("John").await.unwrap();
    assert_eq!(patients.len(), 1);
    assert_eq!(patients[0].health_card_number, "ON1234567");
}

#[tokio::test]
async fn search_query_is_encoded() {
    let base = spawn_server(None).await;
    let backend = HttpBackend::new(ApiClient::new(&base).unwrap());

    let patients = backend.search_patients("jane smith").await.unwrap();
    assert_eq!(patients.len(), 1);
    assert_eq!(patients[0].id, "2");
}

#[tokio::test]
async fn unknown_patient_maps_to_not_found() {
    let base = spawn_server(None).await;
    let backend = HttpBackend::new(ApiClient::new(&base).unwrap());

    assert_eq!(
        backend.send_otp("404").await,
        Err(BackendError::PatientNotFound("404".into()))
    );
}

#[tokio::test]
async fn workflow_runs_end_to_end_over_http() {
    let base = spawn_server(None).await;
    let backend = Arc::new(HttpBackend::new(ApiClient::new(&base).unwrap()));
    let mut workflow = DoctorWorkflow::with_system_clock(backend);

    workflow.set_login_field(LoginField::Username, "dr.smith");
    workflow.set_login_field(LoginField::Password, "wrong-pass");
    workflow.set_login_field(LoginField::LicenseNumber, "MD123456");
    workflow.set_login_field(LoginField::Province, "Ontario");
    assert!(workflow.submit_login().await.is_err());
    assert_eq!(workflow.step(), Step::Login);
    assert_eq!(workflow.session().error(), Some("Invalid credentials"));

    workflow.set_login_field(LoginField::Password, "test1234");
    workflow.submit_login().await.unwrap();
    workflow.search_patients("BC9876543").await.unwrap();
    workflow.select_patient("2").unwrap();
    workflow.select_reason(VisitReason::FollowUp).unwrap();
    workflow.confirm_reason().unwrap();
    workflow.send_otp().await.unwrap();
    workflow.set_otp("482913");
    workflow.verify_otp().await.unwrap();

    assert_eq!(workflow.step(), Step::RecordView);
    assert_eq!(
        workflow.session().auth_status().unwrap().method,
        Some(AuthMethod::Otp)
    );
    assert_eq!(workflow.record_view().records().len(), 2);
}
