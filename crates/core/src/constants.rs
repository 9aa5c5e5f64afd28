//! Constants used throughout the CHORDS core crate.

use chrono::Duration;

/// How long a doctor stays signed in after a successful login.
pub const DOCTOR_SESSION_DURATION: Duration = Duration::hours(8);

/// How long a patient's authorization lasts once they have authenticated.
pub const PATIENT_AUTHORIZATION_DURATION: Duration = Duration::hours(1);

/// Remaining time below which the record view shows the warning banner.
pub const EXPIRY_WARNING_THRESHOLD: Duration = Duration::minutes(5);

/// Default delay applied by the simulated backend to every call.
pub const DEFAULT_SIMULATED_LATENCY_MS: u64 = 1_000;

/// Default directory for locally persisted client state.
pub const DEFAULT_DATA_DIR: &str = ".chords";

/// Filename of the persisted key/value store inside the data directory.
pub const LOCAL_STORAGE_FILENAME: &str = "local_storage.json";

/// Storage key holding the signed-in role.
pub const USER_ROLE_KEY: &str = "userRole";

/// Storage key holding the API bearer token.
pub const TOKEN_KEY: &str = "token";

/// Minimum password length accepted by the portal sign-in form.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Prefix of digital health identifiers, e.g. `DHI123456`.
pub const DIGITAL_HEALTH_ID_PREFIX: &str = "DHI";

pub const LOGIN_FAILED_MESSAGE: &str = "Login failed. Please check your credentials.";
pub const SEARCH_FAILED_MESSAGE: &str = "Failed to search for patients. Please try again.";
pub const AUTHENTICATION_FAILED_MESSAGE: &str = "Authentication failed. Please try again.";
pub const OTP_SEND_FAILED_MESSAGE: &str = "Failed to send OTP";
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please sign in again.";

/// Storage key holding whether emergency access is switched on.
pub const EMERGENCY_ACCESS_KEY: &str = "emergencyAccess";

/// Storage key holding the JSON-encoded record access audit trail.
pub const ACCESS_LOG_KEY: &str = "accessLog";

/// Verification code the simulated phone check accepts when enabling emergency access.
pub const EMERGENCY_VERIFICATION_CODE: &str = "123456";

pub const EMERGENCY_CODE_LENGTH: usize = 6;

pub const EMERGENCY_ENABLED_MESSAGE: &str =
    "Emergency access has been enabled. Healthcare providers can now access your records in urgent situations.";
pub const EMERGENCY_DISABLED_MESSAGE: &str =
    "Emergency access has been disabled. Your records are now under normal access controls.";
