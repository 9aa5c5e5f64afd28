//! Portal sign-in state.
//!
//! [`AuthStore`] holds the signed-in role and mirrors it into a [`KeyValueStore`] under
//! `userRole`, so a restart picks up where the last run left off. [`PortalLogin`] is the
//! dashboard sign-in form with its two-phase MFA submit.

use crate::constants::{MIN_PASSWORD_LENGTH, USER_ROLE_KEY};
use crate::error::{AuthError, AuthResult, ValidationError};
use crate::fixtures::test_account;
use crate::storage::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Patient,
    Doctor,
    Admin,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [UserRole::Patient, UserRole::Doctor, UserRole::Admin];

    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Patient => "patient",
            UserRole::Doctor => "doctor",
            UserRole::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserRole::ALL
            .into_iter()
            .find(|r| r.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| format!("unknown role: {s}"))
    }
}

/// Snapshot of who is signed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub is_authenticated: bool,
    pub role: Option<UserRole>,
}

impl AuthState {
    pub fn signed_in(role: UserRole) -> Self {
        Self {
            is_authenticated: true,
            role: Some(role),
        }
    }
}

#[derive(Debug)]
pub struct AuthStore {
    storage: Arc<dyn KeyValueStore>,
    state: AuthState,
}

impl AuthStore {
    /// Restore the persisted role, if any. An unrecognised stored value counts as signed out.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Storage`](crate::AuthError::Storage) if the store cannot be read.
    pub fn init(storage: Arc<dyn KeyValueStore>) -> AuthResult<Self> {
        let state = match storage.get(USER_ROLE_KEY)? {
            Some(stored) => match stored.parse::<UserRole>() {
                Ok(role) => AuthState::signed_in(role),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring persisted role");
                    AuthState::default()
                }
            },
            None => AuthState::default(),
        };
        tracing::debug!(?state, "auth store initialised");
        Ok(Self { storage, state })
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated
    }

    pub fn role(&self) -> Option<UserRole> {
        self.state.role
    }

    /// Sign in as `role` and persist it.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Storage`](crate::AuthError::Storage) if the role cannot be written.
    pub fn login(&mut self, role: UserRole) -> AuthResult<()> {
        self.storage.set(USER_ROLE_KEY, role.as_str())?;
        self.state = AuthState::signed_in(role);
        tracing::info!(%role, "signed in");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`AuthError::Storage`](crate::AuthError::Storage) if the role cannot be removed.
    pub fn logout(&mut self) -> AuthResult<()> {
        self.storage.remove(USER_ROLE_KEY)?;
        self.state = AuthState::default();
        tracing::info!("signed out");
        Ok(())
    }
}

/// Result of submitting the portal sign-in form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalLoginOutcome {
    /// Credentials look well-formed; the form now wants the MFA code.
    MfaRequired,
    SignedIn(UserRole),
}

#[derive(Clone, PartialEq, Eq)]
pub struct PortalLogin {
    pub role: UserRole,
    pub username: String,
    pub password: String,
    pub mfa_code: String,
    mfa_requested: bool,
}

impl PortalLogin {
    pub fn new(role: UserRole) -> Self {
        Self {
            role,
            username: String::new(),
            password: String::new(),
            mfa_code: String::new(),
            mfa_requested: false,
        }
    }

    pub fn mfa_requested(&self) -> bool {
        self.mfa_requested
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::MissingFields`] without a username and
    /// [`ValidationError::Invalid`] for a password shorter than eight characters.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.username.trim().is_empty() {
            return Err(ValidationError::Invalid {
                field: "username",
                message: "Username is required".to_string(),
            });
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::Invalid {
                field: "password",
                message: format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
            });
        }
        Ok(())
    }

    /// First valid submit asks for the MFA code; the second checks the role's account and
    /// signs in through `store`.
    ///
    /// # Returns
    ///
    /// [`PortalLoginOutcome::MfaRequired`] after the first submit and
    /// [`PortalLoginOutcome::SignedIn`] once the account checks out.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Validation`](crate::AuthError::Validation) if the form is incomplete
    /// - [`AuthError::InvalidCredentials`](crate::AuthError::InvalidCredentials) on a mismatch
    /// - [`AuthError::Storage`](crate::AuthError::Storage) if the role cannot be persisted
    pub fn submit(&mut self, store: &mut AuthStore) -> AuthResult<PortalLoginOutcome> {
        self.validate()?;
        if !self.mfa_requested {
            self.mfa_requested = true;
            return Ok(PortalLoginOutcome::MfaRequired);
        }

        let account = test_account(self.role);
        if self.username.trim() != account.username || self.password != account.password {
            tracing::warn!(role = %self.role, "portal sign-in rejected");
            return Err(AuthError::InvalidCredentials);
        }
        store.login(self.role)?;
        Ok(PortalLoginOutcome::SignedIn(self.role))
    }
}

impl fmt::Debug for PortalLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortalLogin")
            .field("role", &self.role)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("mfa_requested", &self.mfa_requested)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStore, MemoryStore};
    use tempfile::TempDir;

    #[test]
    fn role_survives_reinit_and_logout_clears_it() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("local_storage.json");

        let mut store = AuthStore::init(Arc::new(FileStore::new(&path))).unwrap();
        assert!(!store.is_authenticated());
        store.login(UserRole::Doctor).unwrap();

        let mut restored = AuthStore::init(Arc::new(FileStore::new(&path))).unwrap();
        assert_eq!(restored.state(), AuthState::signed_in(UserRole::Doctor));

        restored.logout().unwrap();
        let cleared = AuthStore::init(Arc::new(FileStore::new(&path))).unwrap();
        assert_eq!(cleared.role(), None);
    }

    #[test]
    fn unknown_stored_role_counts_as_signed_out() {
        let storage = Arc::new(MemoryStore::default());
        storage.set(USER_ROLE_KEY, "superuser").unwrap();
        let store = AuthStore::init(storage).unwrap();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn portal_login_asks_for_mfa_then_checks_account() {
        let mut store = AuthStore::init(Arc::new(MemoryStore::default())).unwrap();
        let mut form = PortalLogin::new(UserRole::Patient);
        form.username = "john.doe".into();
        form.password = "test1234".into();

        assert_eq!(
            form.submit(&mut store).unwrap(),
            PortalLoginOutcome::MfaRequired
        );
        assert!(!store.is_authenticated());

        form.mfa_code = "000000".into();
        assert_eq!(
            form.submit(&mut store).unwrap(),
            PortalLoginOutcome::SignedIn(UserRole::Patient)
        );
        assert_eq!(store.role(), Some(UserRole::Patient));
    }

    #[test]
    fn portal_login_rejects_wrong_account() {
        let mut store = AuthStore::init(Arc::new(MemoryStore::default())).unwrap();
        let mut form = PortalLogin::new(UserRole::Admin);
        form.username = "john.doe".into();
        form.password = "test1234".into();
        form.submit(&mut store).unwrap();

        let err = form.submit(&mut store).unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials. Please try again.");
        assert!(!store.is_authenticated());
    }

    #[test]
    fn portal_login_validates_before_mfa() {
        let mut store = AuthStore::init(Arc::new(MemoryStore::default())).unwrap();
        let mut form = PortalLogin::new(UserRole::Doctor);
        form.username = "dr.smith".into();
        form.password = "short".into();

        let err = form.submit(&mut store).unwrap_err();
        assert!(matches!(
            err,
            AuthError::Validation(ValidationError::Invalid { field: "password", .. })
        ));
        assert!(!form.mfa_requested());
    }

    #[test]
    fn roles_parse_case_insensitively() {
        assert_eq!("Doctor".parse(), Ok(UserRole::Doctor));
        assert!("nurse".parse::<UserRole>().is_err());
    }
}
