//! The doctor-access session stepper.
//!
//! A session moves through five fixed steps:
//!
//! `Login → PatientSearch → VisitReason → PatientAuth → RecordView`
//!
//! [`Session::apply`] is a pure transition function: it never mutates the session it is called
//! on and returns either the next session or the reason the event was refused. Which screen is
//! visible is derived separately by [`Session::screen`], so rendering never has to reason about
//! step indices.

use crate::doctor::{Patient, PatientAuthenticationStatus, VisitReason};
use crate::error::TransitionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Login,
    PatientSearch,
    VisitReason,
    PatientAuth,
    RecordView,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::Login,
        Step::PatientSearch,
        Step::VisitReason,
        Step::PatientAuth,
        Step::RecordView,
    ];

    pub fn index(self) -> usize {
        match self {
            Step::Login => 0,
            Step::PatientSearch => 1,
            Step::VisitReason => 2,
            Step::PatientAuth => 3,
            Step::RecordView => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Step> {
        Step::ALL.get(index).copied()
    }

    /// Label shown in the progress indicator.
    pub fn label(self) -> &'static str {
        match self {
            Step::Login => "Doctor Login",
            Step::PatientSearch => "Patient Search",
            Step::VisitReason => "Visit Reason",
            Step::PatientAuth => "Patient Authentication",
            Step::RecordView => "Access Records",
        }
    }

    /// The step before this one, clamped at [`Step::Login`].
    pub fn previous(self) -> Step {
        Step::from_index(self.index().saturating_sub(1)).unwrap_or(Step::Login)
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Inputs to the stepper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    LoggedIn { session_expires_at: DateTime<Utc> },
    PatientSelected(Patient),
    ReasonSelected(VisitReason),
    ReasonConfirmed,
    PatientAuthenticated(PatientAuthenticationStatus),
    AuthenticationCancelled,
    Back,
    SessionEnded,
    SessionExpired,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::LoggedIn { .. } => "logged_in",
            Event::PatientSelected(_) => "patient_selected",
            Event::ReasonSelected(_) => "reason_selected",
            Event::ReasonConfirmed => "reason_confirmed",
            Event::PatientAuthenticated(_) => "patient_authenticated",
            Event::AuthenticationCancelled => "authentication_cancelled",
            Event::Back => "back",
            Event::SessionEnded => "session_ended",
            Event::SessionExpired => "session_expired",
        }
    }
}

/// What the visible screen needs, borrowed from the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen<'a> {
    Login,
    PatientSearch,
    VisitReason {
        selected: Option<VisitReason>,
    },
    PatientAuth {
        patient: &'a Patient,
    },
    RecordView {
        patient: &'a Patient,
        expires_at: DateTime<Utc>,
    },
}

/// State carried across the steps of one doctor session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    step: Step,
    error: Option<String>,
    loading: bool,
    session_expires_at: Option<DateTime<Utc>>,
    patient: Option<Patient>,
    visit_reason: Option<VisitReason>,
    auth_status: Option<PatientAuthenticationStatus>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn session_expires_at(&self) -> Option<DateTime<Utc>> {
        self.session_expires_at
    }

    pub fn patient(&self) -> Option<&Patient> {
        self.patient.as_ref()
    }

    pub fn visit_reason(&self) -> Option<VisitReason> {
        self.visit_reason
    }

    pub fn auth_status(&self) -> Option<&PatientAuthenticationStatus> {
        self.auth_status.as_ref()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Compute the session that results from `event`.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::InvalidEvent`] when `event` has no meaning on the current step
    /// and [`TransitionError::NoReasonSelected`] when confirming without a reason.
    pub fn apply(&self, event: Event) -> Result<Session, TransitionError> {
        let mut next = self.clone();

        match (self.step, event) {
            (Step::Login, Event::LoggedIn { session_expires_at }) => {
                next.session_expires_at = Some(session_expires_at);
                next.step = Step::PatientSearch;
            }
            (Step::PatientSearch, Event::PatientSelected(patient)) => {
                next.patient = Some(patient);
                next.step = Step::VisitReason;
            }
            (Step::VisitReason, Event::ReasonSelected(reason)) => {
                next.visit_reason = Some(reason);
            }
            (Step::VisitReason, Event::ReasonConfirmed) => {
                if self.visit_reason.is_none() {
                    return Err(TransitionError::NoReasonSelected);
                }
                next.step = Step::PatientAuth;
            }
            (Step::PatientAuth, Event::PatientAuthenticated(status)) => {
                next.auth_status = Some(status);
                next.step = Step::RecordView;
            }
            (Step::PatientAuth, Event::AuthenticationCancelled) => {
                next.step = Step::VisitReason;
            }
            (step, Event::Back) => {
                next.step = step.previous();
            }
            // Partial reset: the patient, reason and authorization stay behind.
            (Step::RecordView, Event::SessionEnded) => {
                next.step = Step::Login;
                next.error = None;
            }
            (_, Event::SessionExpired) => {
                next.step = Step::Login;
                next.session_expires_at = None;
            }
            (step, event) => {
                return Err(TransitionError::InvalidEvent {
                    step,
                    event: event.name(),
                });
            }
        }

        Ok(next)
    }

    /// Project the session onto the screen for its current step.
    ///
    /// # Returns
    ///
    /// The current step's [`Screen`] borrowing the session data it shows, or `None` when that
    /// step's prerequisites are missing (for example a record view without an expiry).
    pub fn screen(&self) -> Option<Screen<'_>> {
        match self.step {
            Step::Login => Some(Screen::Login),
            Step::PatientSearch => Some(Screen::PatientSearch),
            Step::VisitReason => Some(Screen::VisitReason {
                selected: self.visit_reason,
            }),
            Step::PatientAuth => self
                .patient
                .as_ref()
                .map(|patient| Screen::PatientAuth { patient }),
            Step::RecordView => {
                let patient = self.patient.as_ref()?;
                let expires_at = self.auth_status.as_ref()?.expires_at?;
                Some(Screen::RecordView {
                    patient,
                    expires_at,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doctor::AuthMethod;
    use crate::fixtures::test_patients;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    fn granted() -> PatientAuthenticationStatus {
        PatientAuthenticationStatus::granted(AuthMethod::Otp, t0(), t0() + Duration::hours(1))
    }

    fn at_record_view() -> Session {
        Session::new()
            .apply(Event::LoggedIn {
                session_expires_at: t0() + Duration::hours(8),
            })
            .and_then(|s| s.apply(Event::PatientSelected(test_patients()[0].clone())))
            .and_then(|s| s.apply(Event::ReasonSelected(VisitReason::Consultation)))
            .and_then(|s| s.apply(Event::ReasonConfirmed))
            .and_then(|s| s.apply(Event::PatientAuthenticated(granted())))
            .unwrap()
    }

    #[test]
    fn new_session_starts_at_login() {
        let session = Session::new();
        assert_eq!(session.step(), Step::Login);
        assert_eq!(session.screen(), Some(Screen::Login));
        assert!(session.session_expires_at().is_none());
    }

    #[test]
    fn each_completion_advances_by_exactly_one_and_keeps_payload() {
        let patient = test_patients()[1].clone();
        let expiry = t0() + Duration::hours(8);

        let s1 = Session::new()
            .apply(Event::LoggedIn {
                session_expires_at: expiry,
            })
            .unwrap();
        assert_eq!(s1.step().index(), 1);
        assert_eq!(s1.session_expires_at(), Some(expiry));

        let s2 = s1.apply(Event::PatientSelected(patient.clone())).unwrap();
        assert_eq!(s2.step().index(), 2);
        assert_eq!(s2.patient(), Some(&patient));

        let s2b = s2
            .apply(Event::ReasonSelected(VisitReason::Referral))
            .unwrap();
        assert_eq!(s2b.step().index(), 2, "selecting alone must not advance");
        let s3 = s2b.apply(Event::ReasonConfirmed).unwrap();
        assert_eq!(s3.step().index(), 3);
        assert_eq!(s3.visit_reason(), Some(VisitReason::Referral));

        let s4 = s3.apply(Event::PatientAuthenticated(granted())).unwrap();
        assert_eq!(s4.step().index(), 4);
        assert_eq!(s4.auth_status(), Some(&granted()));
    }

    #[test]
    fn back_moves_one_step_and_clamps_at_login() {
        let session = at_record_view();
        let mut expected = 4;
        let mut current = session;
        while expected > 0 {
            current = current.apply(Event::Back).unwrap();
            expected -= 1;
            assert_eq!(current.step().index(), expected);
        }
        let again = current.apply(Event::Back).unwrap();
        assert_eq!(again, current);
    }

    #[test]
    fn confirm_without_reason_is_refused() {
        let session = Session::new()
            .apply(Event::LoggedIn {
                session_expires_at: t0(),
            })
            .and_then(|s| s.apply(Event::PatientSelected(test_patients()[0].clone())))
            .unwrap();
        assert_eq!(
            session.apply(Event::ReasonConfirmed),
            Err(TransitionError::NoReasonSelected)
        );
    }

    #[test]
    fn events_outside_their_step_are_refused() {
        let session = Session::new();
        let err = session.apply(Event::ReasonConfirmed).unwrap_err();
        assert_eq!(
            err,
            TransitionError::InvalidEvent {
                step: Step::Login,
                event: "reason_confirmed"
            }
        );
        assert!(session.apply(Event::SessionEnded).is_err());
        assert!(session
            .apply(Event::PatientSelected(test_patients()[0].clone()))
            .is_err());
    }

    #[test]
    fn cancelling_authentication_returns_to_reason() {
        let session = at_record_view().apply(Event::Back).unwrap();
        assert_eq!(session.step(), Step::PatientAuth);
        let back = session.apply(Event::AuthenticationCancelled).unwrap();
        assert_eq!(back.step(), Step::VisitReason);
    }

    #[test]
    fn ending_session_is_a_partial_reset() {
        let mut session = at_record_view();
        session.set_error("stale");
        let ended = session.apply(Event::SessionEnded).unwrap();
        assert_eq!(ended.step(), Step::Login);
        assert!(ended.error().is_none());
        assert!(ended.patient().is_some());
        assert_eq!(ended.visit_reason(), Some(VisitReason::Consultation));
    }

    #[test]
    fn expiry_returns_to_login_from_any_step() {
        let expired = at_record_view().apply(Event::SessionExpired).unwrap();
        assert_eq!(expired.step(), Step::Login);
        assert!(expired.session_expires_at().is_none());
    }

    #[test]
    fn record_view_requires_expiry_on_auth_status() {
        let session = at_record_view();
        match session.screen() {
            Some(Screen::RecordView { expires_at, .. }) => {
                assert_eq!(expires_at, t0() + Duration::hours(1));
            }
            other => panic!("expected record view, got {other:?}"),
        }

        let mut without_expiry = granted();
        without_expiry.expires_at = None;
        let session = at_record_view()
            .apply(Event::Back)
            .and_then(|s| s.apply(Event::PatientAuthenticated(without_expiry)))
            .unwrap();
        assert_eq!(session.step(), Step::RecordView);
        assert_eq!(session.screen(), None);
    }

    #[test]
    fn step_labels_follow_progress_order() {
        let labels: Vec<_> = Step::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(
            labels,
            [
                "Doctor Login",
                "Patient Search",
                "Visit Reason",
                "Patient Authentication",
                "Access Records"
            ]
        );
        assert_eq!(Step::from_index(5), None);
    }
}
