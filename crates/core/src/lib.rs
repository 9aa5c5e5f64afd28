//! # CHORDS Core
//!
//! Client-side logic for the CHORDS doctor-access flow.
//!
//! A doctor signs in, finds a patient, states why they need the record, has the patient
//! authenticate, and then views the record for a limited time:
//! - [`stepper`]: the five-step session state machine and its screen projection
//! - [`workflow`]: the controller that drives the stepper against a backend
//! - [`backend`]: the backend seam and the simulated implementation
//! - [`auth`] and [`routes`]: portal sign-in state and the page guard
//! - [`emergency`] and [`audit`]: the patient's emergency access switch and the access trail
//!
//! **No transport concerns**: HTTP serving lives in `api-rest`, the HTTP client in `api-client`.

pub mod audit;
pub mod auth;
pub mod backend;
pub mod clock;
pub mod config;
pub mod constants;
pub mod doctor;
pub mod emergency;
pub mod error;
pub mod expiry;
pub mod fixtures;
pub mod routes;
pub mod screens;
pub mod stepper;
pub mod storage;
pub mod workflow;

pub use audit::{AuditFilter, AuditLogStore};
pub use auth::{AuthState, AuthStore, PortalLogin, PortalLoginOutcome, UserRole};
pub use backend::{DoctorAccessBackend, SearchQuery, SimulatedBackend};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CoreConfig;
pub use doctor::{
    AccessLog, AuthMethod, AuthenticationRequest, DoctorCredentials, HealthRecord, Patient,
    PatientAuthenticationStatus, Provider, RecordStatus, VisitReason,
};
pub use emergency::{EmergencyAccess, EmergencyAccessStatus, ToggleOutcome};
pub use error::{
    AuditError, AuditResult, AuthError, AuthResult, BackendError, ConfigError, EmergencyError,
    EmergencyResult, StorageError, TransitionError, ValidationError, WorkflowError,
    WorkflowResult,
};
pub use expiry::{BannerSeverity, ExpiryBanner};
pub use routes::{resolve, Route, RouteDecision};
pub use stepper::{Event, Screen, Session, Step};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use workflow::{DoctorWorkflow, WorkflowView};

pub use chords_types::{HealthCardNumber, NonEmptyText, Password, TextError};
