use crate::stepper::Step;

/// Rejected stepper transitions. The session is left untouched when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("{event} is not valid on the {step} step")]
    InvalidEvent { step: Step, event: &'static str },
    #[error("no visit reason selected")]
    NoReasonSelected,
}

/// Client-side form validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("{field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

/// Failures reported by a [`crate::backend::DoctorAccessBackend`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("patient not found: {0}")]
    PatientNotFound(String),
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("operation cancelled")]
    Cancelled,
    #[error("session expired")]
    SessionExpired,
    #[error("patient {0} is not in the current search results")]
    UnknownPatient(String),
    #[error("a one-time code must be sent before it can be verified")]
    OtpNotSent,
    #[error("one-time code is required")]
    EmptyOtp,
    #[error("no patient selected")]
    NoPatientSelected,
}

pub type WorkflowResult<T> = std::result::Result<T, WorkflowError>;

/// Errors reading or writing the persisted key/value store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to create storage directory: {0}")]
    DirCreation(std::io::Error),
    #[error("failed to read storage file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write storage file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to serialize storage: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize storage: {0}")]
    Deserialization(serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials. Please try again.")]
    InvalidCredentials,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type AuthResult<T> = std::result::Result<T, AuthError>;

#[derive(Debug, thiserror::Error)]
pub enum EmergencyError {
    #[error("verification code must be 6 digits")]
    MalformedCode,
    #[error("Invalid verification code")]
    InvalidCode,
    #[error("no emergency access confirmation is pending")]
    NotPending,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type EmergencyResult<T> = std::result::Result<T, EmergencyError>;

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type AuditResult<T> = std::result::Result<T, AuditError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("{0} cannot be empty")]
    Empty(&'static str),
}
