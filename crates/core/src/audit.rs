//! Record-access audit trail.
//!
//! [`AuditLogStore`] keeps [`AccessLog`] entries as a JSON array under `accessLog` in a
//! [`KeyValueStore`]. [`AuditFilter`] narrows them by free text and an inclusive date range.

use crate::constants::ACCESS_LOG_KEY;
use crate::doctor::AccessLog;
use crate::error::{AuditResult, StorageError, ValidationError};
use crate::storage::KeyValueStore;
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

/// Search text plus an optional date range, both ends inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuditFilter {
    /// Matches doctor, patient, action, visit reason or accessed data, ignoring case
    #[serde(default)]
    pub q: String,
    /// First day to include (YYYY-MM-DD)
    pub from: Option<NaiveDate>,
    /// Last day to include (YYYY-MM-DD)
    pub to: Option<NaiveDate>,
}

impl AuditFilter {
    /// # Errors
    ///
    /// Returns [`ValidationError::Invalid`] when `to` falls before `from`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match (self.from, self.to) {
            (Some(from), Some(to)) if to < from => Err(ValidationError::Invalid {
                field: "to",
                message: format!("end date {to} is before start date {from}"),
            }),
            _ => Ok(()),
        }
    }

    pub fn matches(&self, entry: &AccessLog) -> bool {
        let day = entry.timestamp.date_naive();
        if self.from.is_some_and(|from| day < from) || self.to.is_some_and(|to| day > to) {
            return false;
        }

        let needle = self.q.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let action = entry.action.replace('_', " ");
        let found = [
            entry.doctor_id.as_str(),
            entry.patient_id.as_str(),
            entry.action.as_str(),
            action.as_str(),
            entry.visit_reason.as_str(),
            entry.visit_reason.label(),
        ]
        .into_iter()
        .chain(entry.accessed_data.iter().map(String::as_str))
        .any(|field| field.to_lowercase().contains(&needle));
        found
    }

    /// Matching entries, newest first.
    pub fn apply<'a>(&self, entries: impl IntoIterator<Item = &'a AccessLog>) -> Vec<AccessLog> {
        let mut matched: Vec<AccessLog> = entries
            .into_iter()
            .filter(|e| self.matches(e))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matched
    }
}

#[derive(Debug, Clone)]
pub struct AuditLogStore {
    storage: Arc<dyn KeyValueStore>,
}

impl AuditLogStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Every stored entry in the order it was appended.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the store cannot be read or holds something other than a
    /// list of entries.
    pub fn entries(&self) -> Result<Vec<AccessLog>, StorageError> {
        match self.storage.get(ACCESS_LOG_KEY)? {
            Some(json) => serde_json::from_str(&json).map_err(StorageError::Deserialization),
            None => Ok(Vec::new()),
        }
    }

    /// Add entries to the end of the trail. Entries whose id is already stored are skipped.
    ///
    /// # Returns
    ///
    /// The number of entries actually added.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the trail cannot be read back or written.
    pub fn append(&self, new_entries: &[AccessLog]) -> Result<usize, StorageError> {
        if new_entries.is_empty() {
            return Ok(0);
        }
        let mut entries = self.entries()?;
        let before = entries.len();
        for entry in new_entries {
            if !entries.iter().any(|e| e.id == entry.id) {
                entries.push(entry.clone());
            }
        }
        let added = entries.len() - before;
        if added > 0 {
            let json = serde_json::to_string(&entries).map_err(StorageError::Serialization)?;
            self.storage.set(ACCESS_LOG_KEY, &json)?;
            tracing::debug!(added, total = entries.len(), "access log updated");
        }
        Ok(added)
    }

    /// Stored entries matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// - [`crate::AuditError::Validation`] if the date range is reversed
    /// - [`crate::AuditError::Storage`] if the trail cannot be read
    pub fn query(&self, filter: &AuditFilter) -> AuditResult<Vec<AccessLog>> {
        filter.validate()?;
        Ok(filter.apply(&self.entries()?))
    }
}
