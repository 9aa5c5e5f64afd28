//! Validated text types shared across the CHORDS crates.

use regex::Regex;
use std::sync::LazyLock;

static HEALTH_CARD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{2}[0-9]{7}$").expect("health card pattern is a valid regex")
});

/// Errors that can occur when creating validated text types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input was not two uppercase letters followed by seven digits
    #[error("invalid health card number: {0}")]
    InvalidHealthCard(String),
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] if the trimmed result is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A secret that must not be blank.
///
/// Unlike [`NonEmptyText`] the input is kept exactly as given, so surrounding whitespace is
/// part of the secret. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Creates a new `Password` from the given input.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] if the input is empty or only whitespace.
    pub fn new(input: impl Into<String>) -> Result<Self, TextError> {
        let input = input.into();
        if input.trim().is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(input))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

impl serde::Serialize for Password {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Password {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Password::new(s).map_err(serde::de::Error::custom)
    }
}

/// A provincial health card number such as `ON1234567`.
///
/// Two uppercase province letters followed by seven digits. Surrounding whitespace is
/// trimmed; no case folding is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HealthCardNumber(String);

impl HealthCardNumber {
    /// # Errors
    ///
    /// Returns [`TextError::InvalidHealthCard`] if the trimmed input does not match.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if HEALTH_CARD_PATTERN.is_match(trimmed) {
            Ok(Self(trimmed.to_owned()))
        } else {
            Err(TextError::InvalidHealthCard(trimmed.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The two-letter province prefix.
    pub fn province_code(&self) -> &str {
        &self.0[..2]
    }
}

impl std::fmt::Display for HealthCardNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_input() {
        let text = NonEmptyText::new("  dr.smith ").unwrap();
        assert_eq!(text.as_str(), "dr.smith");
    }

    #[test]
    fn non_empty_text_rejects_whitespace() {
        assert_eq!(NonEmptyText::new("   "), Err(TextError::Empty));
    }

    #[test]
    fn non_empty_text_deserialize_rejects_empty() {
        let err = serde_json::from_str::<NonEmptyText>("\"\"").expect_err("empty should fail");
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn password_keeps_surrounding_whitespace() {
        let password = Password::new("  test1234  ").unwrap();
        assert_eq!(password.as_str(), "  test1234  ");
        assert_eq!(Password::new(" \t "), Err(TextError::Empty));
        assert_eq!(format!("{password:?}"), "Password(<redacted>)");
    }

    #[test]
    fn password_deserialize_is_not_trimmed() {
        let password: Password = serde_json::from_str("\" secret \"").unwrap();
        assert_eq!(password.as_str(), " secret ");
        assert!(serde_json::from_str::<Password>("\"  \"").is_err());
    }

    #[test]
    fn health_card_accepts_province_prefix_and_digits() {
        let card = HealthCardNumber::parse("ON1234567").unwrap();
        assert_eq!(card.province_code(), "ON");
        assert_eq!(
            HealthCardNumber::parse(" BC9876543 ").unwrap().as_str(),
            "BC9876543"
        );
    }

    #[test]
    fn health_card_rejects_malformed_numbers() {
        for input in [
            "on1234567",
            "ON123456",
            "ON12345678",
            "O11234567",
            "DHI123456",
            "ON١٢٣٤٥٦٧",
        ] {
            assert!(
                HealthCardNumber::parse(input).is_err(),
                "{input} should be rejected"
            );
        }
    }
}
