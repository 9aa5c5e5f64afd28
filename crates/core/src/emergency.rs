//! Patient-controlled emergency access switch.
//!
//! Switching emergency access on takes a six-digit verification code sent to the patient's phone.
//! Switching it off takes effect at once. The flag lives in a [`KeyValueStore`] under
//! `emergencyAccess`, so every holder of the same store sees the same setting.

use crate::constants::{
    EMERGENCY_ACCESS_KEY, EMERGENCY_CODE_LENGTH, EMERGENCY_DISABLED_MESSAGE,
    EMERGENCY_ENABLED_MESSAGE, EMERGENCY_VERIFICATION_CODE,
};
use crate::error::{EmergencyError, EmergencyResult, StorageError};
use crate::storage::KeyValueStore;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyAccessStatus {
    pub enabled: bool,
    pub message: String,
}

impl EmergencyAccessStatus {
    fn new(enabled: bool) -> Self {
        let message = if enabled {
            EMERGENCY_ENABLED_MESSAGE
        } else {
            EMERGENCY_DISABLED_MESSAGE
        };
        Self {
            enabled,
            message: message.to_string(),
        }
    }
}

/// What flipping the switch did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Enabling waits for [`EmergencyAccess::confirm`].
    ConfirmationRequired,
    Disabled(EmergencyAccessStatus),
}

/// True once `code` has the shape the confirm step accepts.
pub fn is_complete_code(code: &str) -> bool {
    code.len() == EMERGENCY_CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug)]
pub struct EmergencyAccess {
    storage: Arc<dyn KeyValueStore>,
    awaiting_code: bool,
}

impl EmergencyAccess {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            awaiting_code: false,
        }
    }

    /// Whether emergency access is currently switched on.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the persisted flag cannot be read.
    pub fn is_enabled(&self) -> Result<bool, StorageError> {
        Ok(self.storage.get(EMERGENCY_ACCESS_KEY)?.as_deref() == Some("true"))
    }

    pub fn status(&self) -> Result<EmergencyAccessStatus, StorageError> {
        self.is_enabled().map(EmergencyAccessStatus::new)
    }

    /// Flip the switch. Turning it off is immediate; turning it on only opens the confirmation
    /// step.
    ///
    /// # Errors
    ///
    /// Returns [`EmergencyError::Storage`] if the flag cannot be read or written.
    pub fn toggle(&mut self) -> EmergencyResult<ToggleOutcome> {
        if self.is_enabled()? {
            return self.disable().map(ToggleOutcome::Disabled);
        }
        self.awaiting_code = true;
        Ok(ToggleOutcome::ConfirmationRequired)
    }

    /// Finish enabling with the verification code.
    ///
    /// A wrong code leaves the confirmation step open so the patient can try again.
    ///
    /// # Errors
    ///
    /// - [`EmergencyError::NotPending`] if no enable request is waiting
    /// - [`EmergencyError::MalformedCode`] if the code is not six digits
    /// - [`EmergencyError::InvalidCode`] if the code does not match
    /// - [`EmergencyError::Storage`] if the flag cannot be written
    pub fn confirm(&mut self, code: &str) -> EmergencyResult<EmergencyAccessStatus> {
        if !self.awaiting_code {
            return Err(EmergencyError::NotPending);
        }
        let code = code.trim();
        if !is_complete_code(code) {
            return Err(EmergencyError::MalformedCode);
        }
        if code != EMERGENCY_VERIFICATION_CODE {
            tracing::warn!("emergency access verification code rejected");
            return Err(EmergencyError::InvalidCode);
        }

        self.storage.set(EMERGENCY_ACCESS_KEY, "true")?;
        self.awaiting_code = false;
        tracing::warn!("emergency access enabled");
        Ok(EmergencyAccessStatus::new(true))
    }

    pub fn cancel_confirmation(&mut self) {
        self.awaiting_code = false;
    }

    /// Request and confirm in one call. Already enabled is not an error.
    ///
    /// # Errors
    ///
    /// Same as [`EmergencyAccess::confirm`].
    pub fn enable(&mut self, code: &str) -> EmergencyResult<EmergencyAccessStatus> {
        if self.is_enabled()? {
            return Ok(EmergencyAccessStatus::new(true));
        }
        self.awaiting_code = true;
        let result = self.confirm(code);
        if result.is_err() {
            self.awaiting_code = false;
        }
        result
    }

    /// # Errors
    ///
    /// Returns [`EmergencyError::Storage`] if the flag cannot be written.
    pub fn disable(&mut self) -> EmergencyResult<EmergencyAccessStatus> {
        self.storage.set(EMERGENCY_ACCESS_KEY, "false")?;
        self.awaiting_code = false;
        tracing::info!("emergency access disabled");
        Ok(EmergencyAccessStatus::new(false))
    }
}
