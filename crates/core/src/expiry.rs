//! Record-view expiry banner.

use crate::constants::EXPIRY_WARNING_THRESHOLD;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BannerSeverity {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiryBanner {
    pub severity: BannerSeverity,
    pub message: String,
    pub expires_at: DateTime<Utc>,
    /// Negative once the authorization has lapsed.
    pub remaining_seconds: i64,
}

/// True when less than the warning threshold remains before `expires_at`.
pub fn is_expiring_soon(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    expires_at - now < EXPIRY_WARNING_THRESHOLD
}

pub fn has_expired(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now >= expires_at
}

pub fn expiry_banner(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> ExpiryBanner {
    let (severity, message) = if is_expiring_soon(expires_at, now) {
        (
            BannerSeverity::Warning,
            "Session expiring soon! Please save any changes.".to_string(),
        )
    } else {
        (
            BannerSeverity::Info,
            format!("Session expires at {}", expires_at.format("%H:%M:%S")),
        )
    };

    ExpiryBanner {
        severity,
        message,
        expires_at,
        remaining_seconds: (expires_at - now).num_seconds(),
    }
}
