use crate::doctor::DoctorCredentials;
use crate::error::ValidationError;
use chords_types::{NonEmptyText, Password, TextError};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Username,
    Password,
    LicenseNumber,
    Province,
}

impl LoginField {
    pub const ALL: [LoginField; 4] = [
        LoginField::Username,
        LoginField::Password,
        LoginField::LicenseNumber,
        LoginField::Province,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LoginField::Username => "username",
            LoginField::Password => "password",
            LoginField::LicenseNumber => "licenseNumber",
            LoginField::Province => "province",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LoginField::Username => "Username",
            LoginField::Password => "Password",
            LoginField::LicenseNumber => "Medical License Number",
            LoginField::Province => "Province",
        }
    }
}

impl FromStr for LoginField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LoginField::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| format!("unknown login field: {s}"))
    }
}

/// The doctor sign-in form.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    username: String,
    password: String,
    license_number: String,
    province: String,
    error: Option<String>,
}

impl LoginForm {
    pub fn set(&mut self, field: LoginField, value: impl Into<String>) {
        let value = value.into();
        match field {
            LoginField::Username => self.username = value,
            LoginField::Password => self.password = value,
            LoginField::LicenseNumber => self.license_number = value,
            LoginField::Province => self.province = value,
        }
    }

    pub fn value(&self, field: LoginField) -> &str {
        match field {
            LoginField::Username => &self.username,
            LoginField::Password => &self.password,
            LoginField::LicenseNumber => &self.license_number,
            LoginField::Province => &self.province,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub(crate) fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    /// Check every field is filled in and build the credentials.
    pub fn validate(&self) -> Result<DoctorCredentials, ValidationError> {
        let missing: Vec<&'static str> = LoginField::ALL
            .into_iter()
            .filter(|f| self.value(*f).trim().is_empty())
            .map(LoginField::name)
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let invalid = |field: LoginField| {
            move |e: TextError| ValidationError::Invalid {
                field: field.name(),
                message: e.to_string(),
            }
        };
        let text = |field: LoginField| {
            NonEmptyText::new(self.value(field)).map_err(invalid(field))
        };

        Ok(DoctorCredentials {
            username: text(LoginField::Username)?,
            password: Password::new(self.value(LoginField::Password))
                .map_err(invalid(LoginField::Password))?,
            license_number: text(LoginField::LicenseNumber)?,
            province: text(LoginField::Province)?,
        })
    }
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("license_number", &self.license_number)
            .field("province", &self.province)
            .field("error", &self.error)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_form_reports_every_field() {
        let err = LoginForm::default().validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields(vec![
                "username",
                "password",
                "licenseNumber",
                "province"
            ])
        );
    }

    #[test]
    fn filled_form_builds_trimmed_credentials() {
        let mut form = LoginForm::default();
        form.set(LoginField::Username, " dr.smith ");
        form.set(LoginField::Password, "test1234");
        form.set(LoginField::LicenseNumber, "MD123456");
        form.set(LoginField::Province, "Ontario");

        let creds = form.validate().unwrap();
        assert_eq!(creds.username.as_str(), "dr.smith");
        assert_eq!(creds.password.as_str(), "test1234");
        assert_eq!(creds.license_number.as_str(), "MD123456");
    }

    #[test]
    fn password_is_not_trimmed() {
        let mut form = LoginForm::default();
        form.set(LoginField::Username, "dr.smith");
        form.set(LoginField::Password, "  test1234  ");
        form.set(LoginField::LicenseNumber, "MD123456");
        form.set(LoginField::Province, "Ontario");

        let creds = form.validate().unwrap();
        assert_eq!(creds.password.as_str(), "  test1234  ");
    }

    #[test]
    fn whitespace_only_field_is_missing() {
        let mut form = LoginForm::default();
        form.set(LoginField::Username, "dr.smith");
        form.set(LoginField::Password, "test1234");
        form.set(LoginField::LicenseNumber, "   ");
        form.set(LoginField::Province, "Ontario");
        assert_eq!(
            form.validate(),
            Err(ValidationError::MissingFields(vec!["licenseNumber"]))
        );
    }

    #[test]
    fn field_names_round_trip() {
        for field in LoginField::ALL {
            assert_eq!(field.name().parse::<LoginField>(), Ok(field));
        }
    }
}
