//! Doctor workflow controller.
//!
//! [`DoctorWorkflow`] owns the [`Session`], the screen-local state and the backend handle. Each
//! public action validates its input, runs at most one backend round-trip and then commits a
//! single stepper event. A failed action records a banner message and leaves the step where it
//! was; nothing is retried and fields that were already set are not rolled back.
//!
//! Every visible screen gets its own [`CancellationToken`]. Leaving the screen (or dropping the
//! workflow) cancels it, so a request started from a screen that is no longer shown resolves as
//! [`WorkflowError::Cancelled`] instead of touching the session.

use crate::backend::DoctorAccessBackend;
use crate::clock::{Clock, SystemClock};
use crate::constants::{
    AUTHENTICATION_FAILED_MESSAGE, DOCTOR_SESSION_DURATION, LOGIN_FAILED_MESSAGE,
    OTP_SEND_FAILED_MESSAGE, PATIENT_AUTHORIZATION_DURATION, SEARCH_FAILED_MESSAGE,
    SESSION_EXPIRED_MESSAGE,
};
use crate::doctor::{
    AccessLog, AuthMethod, AuthenticationRequest, DoctorCredentials, Patient,
    PatientAuthenticationStatus, VisitReason,
};
use crate::error::{BackendError, TransitionError, WorkflowError, WorkflowResult};
use crate::expiry::{expiry_banner, has_expired, ExpiryBanner};
use crate::screens::{
    can_confirm, LoginField, LoginForm, PatientAuthState, PatientSearchState, RecordTab, RecordViewState,
    ScreenState,
};
use crate::stepper::{Event, Screen, Session, Step};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

const VIEW_RECORDS_ACTION: &str = "view_patient_records";

/// Serializable snapshot of the workflow for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowView {
    pub step: Step,
    pub step_index: usize,
    pub step_label: &'static str,
    pub loading: bool,
    pub error: Option<String>,
    pub session_expires_at: Option<DateTime<Utc>>,
    pub can_go_back: bool,
    pub can_confirm_reason: bool,
    pub can_verify_otp: bool,
    pub patient: Option<Patient>,
    pub visit_reason: Option<VisitReason>,
    pub auth_status: Option<PatientAuthenticationStatus>,
    pub banner: Option<ExpiryBanner>,
}

pub struct DoctorWorkflow {
    session: Session,
    screens: ScreenState,
    backend: Arc<dyn DoctorAccessBackend>,
    clock: Arc<dyn Clock>,
    cancel: CancellationToken,
    doctor_id: Option<String>,
    access_log: Vec<AccessLog>,
}

impl DoctorWorkflow {
    pub fn new(backend: Arc<dyn DoctorAccessBackend>, clock: Arc<dyn Clock>) -> Self {
        Self {
            session: Session::new(),
            screens: ScreenState::default(),
            backend,
            clock,
            cancel: CancellationToken::new(),
            doctor_id: None,
            access_log: Vec::new(),
        }
    }

    pub fn with_system_clock(backend: Arc<dyn DoctorAccessBackend>) -> Self {
        Self::new(backend, Arc::new(SystemClock))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn step(&self) -> Step {
        self.session.step()
    }

    pub fn screen(&self) -> Option<Screen<'_>> {
        self.session.screen()
    }

    pub fn login_form(&self) -> &LoginForm {
        &self.screens.login
    }

    pub fn search_state(&self) -> &PatientSearchState {
        &self.screens.search
    }

    pub fn auth_state(&self) -> &PatientAuthState {
        &self.screens.auth
    }

    pub fn record_view(&self) -> &RecordViewState {
        &self.screens.record_view
    }

    pub fn access_log(&self) -> &[AccessLog] {
        &self.access_log
    }

    /// Token scoped to the currently visible screen.
    ///
    /// Cancelling it aborts whatever request that screen has in flight.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel every request started from the current screen and hand out a fresh token.
    pub fn cancel_in_flight(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
    }

    pub fn view(&self) -> WorkflowView {
        let step = self.session.step();
        WorkflowView {
            step,
            step_index: step.index(),
            step_label: step.label(),
            loading: self.session.is_loading(),
            error: self.session.error().map(str::to_string),
            session_expires_at: self.session.session_expires_at(),
            can_go_back: step != Step::Login && step != Step::RecordView,
            can_confirm_reason: step == Step::VisitReason
                && can_confirm(self.session.visit_reason()),
            can_verify_otp: step == Step::PatientAuth && self.screens.auth.can_verify(),
            patient: self.session.patient().cloned(),
            visit_reason: self.session.visit_reason(),
            auth_status: self.session.auth_status().cloned(),
            banner: self.expiry_banner(),
        }
    }

    /// Banner for the record view, `None` on every other screen.
    pub fn expiry_banner(&self) -> Option<ExpiryBanner> {
        match self.session.screen() {
            Some(Screen::RecordView { expires_at, .. }) => {
                Some(expiry_banner(expires_at, self.clock.now()))
            }
            _ => None,
        }
    }

    pub fn set_login_field(&mut self, field: LoginField, value: impl Into<String>) {
        self.screens.login.set(field, value);
    }

    /// Validate the login form and sign in with it.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Validation`] for an incomplete form, otherwise as
    /// [`DoctorWorkflow::login`].
    pub async fn submit_login(&mut self) -> WorkflowResult<()> {
        let credentials = match self.screens.login.validate() {
            Ok(credentials) => credentials,
            Err(e) => {
                self.screens.login.set_error(Some(e.to_string()));
                return Err(e.into());
            }
        };
        self.login(credentials).await
    }

    /// Check `credentials` with the backend and, on success, start an eight-hour session on
    /// the patient search step.
    ///
    /// # Errors
    ///
    /// - [`WorkflowError::Transition`] when not on the login step
    /// - [`WorkflowError::Backend`] if the backend refuses or fails; the banner is set
    /// - [`WorkflowError::Cancelled`] if the login screen was left meanwhile
    pub async fn login(&mut self, credentials: DoctorCredentials) -> WorkflowResult<()> {
        self.require_step(Step::Login, "logged_in")?;
        self.screens.login.set_error(None);

        let backend = Arc::clone(&self.backend);
        match self.run(backend.login(&credentials)).await {
            Ok(()) => {
                let session_expires_at = self.clock.now() + DOCTOR_SESSION_DURATION;
                self.commit(Event::LoggedIn { session_expires_at })?;
                self.doctor_id = Some(credentials.username.to_string());
                tracing::info!(
                    username = %credentials.username,
                    %session_expires_at,
                    "doctor signed in"
                );
                Ok(())
            }
            Err(e) => {
                let banner = match &e {
                    WorkflowError::Backend(BackendError::InvalidCredentials) => e.to_string(),
                    _ => LOGIN_FAILED_MESSAGE.to_string(),
                };
                if !matches!(e, WorkflowError::Cancelled) {
                    self.screens.login.set_error(Some(e.to_string()));
                }
                self.fail(&banner, &e);
                Err(e)
            }
        }
    }

    /// Run a patient search. A blank query performs no search.
    ///
    /// # Returns
    ///
    /// The matching patients, which also become the selectable results.
    ///
    /// # Errors
    ///
    /// - [`WorkflowError::SessionExpired`] once the doctor session has lapsed
    /// - [`WorkflowError::Backend`] if the search fails; earlier results are dropped
    pub async fn search_patients(&mut self, query: &str) -> WorkflowResult<Vec<Patient>> {
        self.ensure_active()?;
        self.require_step(Step::PatientSearch, "search")?;
        self.screens.search.set_query(query);
        if query.trim().is_empty() {
            return Ok(self.screens.search.results().to_vec());
        }

        let backend = Arc::clone(&self.backend);
        match self.run(backend.search_patients(query)).await {
            Ok(results) => {
                tracing::info!(count = results.len(), "patient search completed");
                self.screens.search.set_results(results.clone());
                Ok(results)
            }
            Err(e) => {
                if !matches!(e, WorkflowError::Cancelled) {
                    self.screens.search.set_failed(e.to_string());
                }
                self.fail(SEARCH_FAILED_MESSAGE, &e);
                Err(e)
            }
        }
    }

    pub fn clear_search(&mut self) {
        self.screens.search.clear();
    }

    /// Choose one of the current search results.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::UnknownPatient`] if `patient_id` is not among the results.
    pub fn select_patient(&mut self, patient_id: &str) -> WorkflowResult<()> {
        self.ensure_active()?;
        self.require_step(Step::PatientSearch, "patient_selected")?;
        let patient = self
            .screens
            .search
            .find(patient_id)
            .cloned()
            .ok_or_else(|| WorkflowError::UnknownPatient(patient_id.to_string()))?;
        self.commit(Event::PatientSelected(patient))
    }

    pub fn select_reason(&mut self, reason: VisitReason) -> WorkflowResult<()> {
        self.ensure_active()?;
        self.commit(Event::ReasonSelected(reason))
    }

    pub fn confirm_reason(&mut self) -> WorkflowResult<()> {
        self.ensure_active()?;
        self.commit(Event::ReasonConfirmed)
    }

    pub fn choose_auth_method(&mut self, method: AuthMethod) -> WorkflowResult<()> {
        self.ensure_active()?;
        self.require_step(Step::PatientAuth, "choose_auth_method")?;
        self.screens.auth.choose(method);
        Ok(())
    }

    pub fn set_otp(&mut self, code: impl Into<String>) {
        self.screens.auth.set_otp(code);
    }

    pub async fn authenticate_biometric(&mut self) -> WorkflowResult<()> {
        self.ensure_active()?;
        self.require_step(Step::PatientAuth, "authenticate_biometric")?;
        self.screens.auth.choose(AuthMethod::Biometric);
        self.authenticate(AuthMethod::Biometric).await
    }

    /// Send (or resend) a one-time code to the selected patient.
    pub async fn send_otp(&mut self) -> WorkflowResult<()> {
        self.ensure_active()?;
        self.require_step(Step::PatientAuth, "send_otp")?;
        let patient_id = self.current_patient_id()?;
        self.screens.auth.choose(AuthMethod::Otp);

        let backend = Arc::clone(&self.backend);
        match self.run(backend.send_otp(&patient_id)).await {
            Ok(()) => {
                self.screens.auth.mark_otp_sent();
                tracing::info!(%patient_id, "one-time code sent");
                Ok(())
            }
            Err(e) => {
                if !matches!(e, WorkflowError::Cancelled) {
                    self.screens
                        .auth
                        .set_error(Some(OTP_SEND_FAILED_MESSAGE.to_string()));
                }
                self.fail(OTP_SEND_FAILED_MESSAGE, &e);
                Err(e)
            }
        }
    }

    /// Verify the typed one-time code. An empty code is refused without calling the backend.
    ///
    /// # Errors
    ///
    /// - [`WorkflowError::OtpNotSent`] before a code was sent
    /// - [`WorkflowError::EmptyOtp`] when nothing was typed
    /// - [`WorkflowError::Backend`] if the patient cannot be authenticated
    pub async fn verify_otp(&mut self) -> WorkflowResult<()> {
        self.ensure_active()?;
        self.require_step(Step::PatientAuth, "verify_otp")?;
        if !self.screens.auth.otp_sent() {
            return Err(WorkflowError::OtpNotSent);
        }
        if self.screens.auth.otp().trim().is_empty() {
            return Err(WorkflowError::EmptyOtp);
        }
        self.authenticate(AuthMethod::Otp).await
    }

    pub fn cancel_authentication(&mut self) -> WorkflowResult<()> {
        self.ensure_active()?;
        self.commit(Event::AuthenticationCancelled)
    }

    pub fn select_tab(&mut self, tab: RecordTab) -> WorkflowResult<()> {
        self.ensure_active()?;
        self.require_step(Step::RecordView, "select_tab")?;
        self.screens.record_view.select_tab(tab);
        Ok(())
    }

    pub fn back(&mut self) -> WorkflowResult<()> {
        self.ensure_active()?;
        self.commit(Event::Back)
    }

    pub fn end_session(&mut self) -> WorkflowResult<()> {
        self.ensure_active()?;
        self.commit(Event::SessionEnded)?;
        tracing::info!("doctor ended the access session");
        Ok(())
    }

    /// Force the workflow back to login if the doctor session or, on the record view, the
    /// patient's authorization has lapsed. Returns true when it did.
    pub fn check_expiry(&mut self) -> bool {
        let now = self.clock.now();
        let step = self.session.step();

        let session_lapsed = step != Step::Login
            && self
                .session
                .session_expires_at()
                .is_some_and(|at| has_expired(at, now));
        let authorization_lapsed = step == Step::RecordView
            && self
                .session
                .auth_status()
                .and_then(|s| s.expires_at)
                .is_some_and(|at| has_expired(at, now));

        if !(session_lapsed || authorization_lapsed) {
            return false;
        }

        if let Err(e) = self.commit(Event::SessionExpired) {
            tracing::warn!(error = %e, "could not expire session");
            return false;
        }
        self.session.set_error(SESSION_EXPIRED_MESSAGE);
        tracing::info!(
            from = %step,
            session_lapsed,
            authorization_lapsed,
            "access session expired"
        );
        true
    }

    async fn authenticate(&mut self, method: AuthMethod) -> WorkflowResult<()> {
        let patient_id = self.current_patient_id()?;
        let request = AuthenticationRequest {
            patient_id: patient_id.clone(),
            authentication_type: method,
            timestamp: self.clock.now(),
        };

        let backend = Arc::clone(&self.backend);
        let outcome = self
            .run(async {
                backend.authenticate_patient(&request).await?;
                backend.health_records(&request.patient_id).await
            })
            .await;

        match outcome {
            Ok(records) => {
                let now = self.clock.now();
                let status = PatientAuthenticationStatus::granted(
                    method,
                    now,
                    now + PATIENT_AUTHORIZATION_DURATION,
                );
                self.screens.record_view.load(records);
                self.commit(Event::PatientAuthenticated(status))?;
                self.record_access(patient_id, now);
                Ok(())
            }
            Err(e) => {
                if !matches!(e, WorkflowError::Cancelled) {
                    self.screens.auth.set_error(Some(e.to_string()));
                }
                self.fail(AUTHENTICATION_FAILED_MESSAGE, &e);
                Err(e)
            }
        }
    }

    fn record_access(&mut self, patient_id: String, timestamp: DateTime<Utc>) {
        let Some(visit_reason) = self.session.visit_reason() else {
            return;
        };
        let entry = AccessLog {
            id: Uuid::new_v4(),
            doctor_id: self.doctor_id.clone().unwrap_or_default(),
            patient_id,
            timestamp,
            action: VIEW_RECORDS_ACTION.to_string(),
            visit_reason,
            accessed_data: RecordTab::ALL
                .iter()
                .map(|t| t.category().to_string())
                .collect(),
        };
        tracing::info!(
            doctor_id = %entry.doctor_id,
            patient_id = %entry.patient_id,
            visit_reason = %entry.visit_reason,
            "patient records opened"
        );
        self.access_log.push(entry);
    }

    /// Await `fut` with the loading flag raised, racing it against the screen's token.
    async fn run<T, F>(&mut self, fut: F) -> WorkflowResult<T>
    where
        F: Future<Output = Result<T, BackendError>>,
    {
        let token = self.cancel.clone();
        self.session.set_loading(true);
        self.session.clear_error();

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => Err(WorkflowError::Cancelled),
            r = fut => r.map_err(WorkflowError::from),
        };

        self.session.set_loading(false);
        if self.cancel.is_cancelled() {
            self.cancel = CancellationToken::new();
        }
        result
    }

    fn commit(&mut self, event: Event) -> WorkflowResult<()> {
        let name = event.name();
        let next = self.session.apply(event)?;
        let from = self.session.step();
        let to = next.step();
        self.session = next;

        if from != to {
            self.leave(from);
            tracing::info!(event = name, %from, %to, "workflow step changed");
        }
        Ok(())
    }

    fn leave(&mut self, step: Step) {
        self.cancel_in_flight();
        self.screens.reset(step);
    }

    fn fail(&mut self, banner: &str, error: &WorkflowError) {
        if matches!(error, WorkflowError::Cancelled) {
            tracing::debug!(step = %self.session.step(), "workflow action cancelled");
            return;
        }
        self.session.set_error(banner);
        tracing::warn!(step = %self.session.step(), error = %error, "workflow action failed");
    }

    fn ensure_active(&mut self) -> WorkflowResult<()> {
        if self.check_expiry() {
            return Err(WorkflowError::SessionExpired);
        }
        Ok(())
    }

    fn require_step(&self, step: Step, action: &'static str) -> WorkflowResult<()> {
        let current = self.session.step();
        if current == step {
            Ok(())
        } else {
            Err(TransitionError::InvalidEvent {
                step: current,
                event: action,
            }
            .into())
        }
    }

    fn current_patient_id(&self) -> WorkflowResult<String> {
        self.session
            .patient()
            .map(|p| p.id.clone())
            .ok_or(WorkflowError::NoPatientSelected)
    }
}

impl Drop for DoctorWorkflow {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for DoctorWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DoctorWorkflow")
            .field("session", &self.session)
            .field("screens", &self.screens)
            .field("doctor_id", &self.doctor_id)
            .field("access_log", &self.access_log.len())
            .finish_non_exhaustive()
    }
}
