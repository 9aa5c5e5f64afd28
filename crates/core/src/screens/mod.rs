//! Screen-local input state for the five workflow steps.
//!
//! Each screen only collects input and hands it to one workflow action. The workflow controller
//! resets a screen's state when its step is left, the same way an unmounted view loses its
//! fields.

pub mod authentication;
pub mod login;
pub mod reason;
pub mod record_view;
pub mod search;

pub use authentication::PatientAuthState;
pub use login::{LoginField, LoginForm};
pub use reason::{can_confirm, visit_reason_options, VisitReasonOption};
pub use record_view::{RecordTab, RecordViewState, TabContent};
pub use search::{PatientSearchState, NO_RESULTS_MESSAGE};

use crate::stepper::Step;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScreenState {
    pub login: LoginForm,
    pub search: PatientSearchState,
    pub auth: PatientAuthState,
    pub record_view: RecordViewState,
}

impl ScreenState {
    /// Drop whatever the screen for `step` was holding.
    pub fn reset(&mut self, step: Step) {
        match step {
            Step::Login => self.login = LoginForm::default(),
            Step::PatientSearch => self.search = PatientSearchState::default(),
            // The selected reason lives in the session, not on the screen.
            Step::VisitReason => {}
            Step::PatientAuth => self.auth = PatientAuthState::default(),
            Step::RecordView => self.record_view = RecordViewState::default(),
        }
    }
}
