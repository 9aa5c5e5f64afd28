use crate::doctor::AuthMethod;

/// Local state of the patient authentication screen.
///
/// Biometric and one-time code are mutually exclusive; the code path has to send a code before
/// it can verify one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientAuthState {
    method: Option<AuthMethod>,
    otp: String,
    otp_sent: bool,
    error: Option<String>,
}

impl PatientAuthState {
    pub fn method(&self) -> Option<AuthMethod> {
        self.method
    }

    pub fn otp(&self) -> &str {
        &self.otp
    }

    pub fn otp_sent(&self) -> bool {
        self.otp_sent
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn choose(&mut self, method: AuthMethod) {
        self.method = Some(method);
    }

    pub fn set_otp(&mut self, code: impl Into<String>) {
        self.otp = code.into();
    }

    /// Verify is enabled once a code was sent and something has been typed.
    pub fn can_verify(&self) -> bool {
        self.otp_sent && !self.otp.trim().is_empty()
    }

    pub(crate) fn mark_otp_sent(&mut self) {
        self.otp_sent = true;
        self.method = Some(AuthMethod::Otp);
        self.error = None;
    }

    pub(crate) fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }
}
