//! Validated, normalized email address value type.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// RFC 5322 style address pattern (dot-atom or quoted local part, host name or
/// bracketed IP literal), anchored and ASCII case-insensitive.
#[allow(clippy::expect_used)] // Pattern is a compile-time constant
static EMAIL_ADDRESS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r##"(?i-u)^(?:[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*"##,
        r##"|"(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21\x23-\x5b\x5d-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])*")"##,
        r##"@(?:(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?"##,
        r##"|\[(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}"##,
        r##"(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?|[a-z0-9-]*[a-z0-9]:"##,
        r##"(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21-\x5a\x53-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])+)\])$"##,
    ))
    .expect("email address pattern is valid")
});

/// Error returned when a string is not a valid email address.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Value is not a valid email address.")]
pub struct EmailAddressError;

/// An email address that has passed validation.
///
/// The stored value is always lowercase, so two addresses differing only in
/// case compare equal.
///
/// # Examples
///
/// ```
/// use webapi_core::EmailAddress;
///
/// let address: EmailAddress = "Jane.Doe@Example.com".parse().unwrap();
/// assert_eq!(address.as_str(), "jane.doe@example.com");
///
/// assert!(EmailAddress::parse("not an address").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress {
    value: String,
}

impl EmailAddress {
    /// Validate and normalize `value`.
    ///
    /// # Errors
    ///
    /// Returns [`EmailAddressError`] if `value` does not match the address pattern.
    pub fn parse(value: &str) -> Result<Self, EmailAddressError> {
        if !Self::is_valid(value) {
            return Err(EmailAddressError);
        }

        Ok(Self {
            value: value.to_lowercase(),
        })
    }

    /// Whether `value` matches the address pattern.
    #[must_use]
    pub fn is_valid(value: &str) -> bool {
        EMAIL_ADDRESS_REGEX.is_match(value)
    }

    /// The normalized address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl FromStr for EmailAddress {
    type Err = EmailAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = EmailAddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EmailAddress> for String {
    fn from(address: EmailAddress) -> Self {
        address.value
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;

    #[test]
    fn test_valid_addresses() {
        assert!(EmailAddress::is_valid("user@example.com"));
        assert!(EmailAddress::is_valid("user.name+tag@sub.example.co.uk"));
        assert!(EmailAddress::is_valid("o'brien@example.ie"));
        assert!(EmailAddress::is_valid("\"john..doe\"@example.com"));
        assert!(EmailAddress::is_valid("admin@[192.168.0.1]"));
        assert!(EmailAddress::is_valid("UPPER@EXAMPLE.COM"));
    }

    #[test]
    fn test_invalid_addresses() {
        assert!(!EmailAddress::is_valid(""));
        assert!(!EmailAddress::is_valid("plainaddress"));
        assert!(!EmailAddress::is_valid("@example.com"));
        assert!(!EmailAddress::is_valid("user@"));
        assert!(!EmailAddress::is_valid("user@@example.com"));
        assert!(!EmailAddress::is_valid("user..name@example.com"));
        assert!(!EmailAddress::is_valid("user@example"));
        assert!(!EmailAddress::is_valid("prefix junk user@example.com"));
        assert!(!EmailAddress::is_valid("admin@[999.1.1.1]"));
    }

    #[test]
    fn test_non_ascii_letters_rejected() {
        // KELVIN SIGN and LONG S fold to 'k' and 's' under Unicode rules.
        assert!(!EmailAddress::is_valid("\u{212A}\u{17F}@example.com"));
        assert!(!EmailAddress::is_valid("user@\u{212A}elvin.example.com"));
        assert!(!EmailAddress::is_valid("j\u{f6}rg@example.de"));
        assert_eq!(
            EmailAddress::parse("\u{212A}\u{17F}@example.com"),
            Err(EmailAddressError)
        );
    }

    #[test]
    fn test_parse_normalizes_case() {
        let address = EmailAddress::parse("Jane.Doe@Example.COM").unwrap();
        assert_eq!(address.as_str(), "jane.doe@example.com");
        assert_eq!(address.to_string(), "jane.doe@example.com");
        assert_eq!(address, EmailAddress::parse("jane.doe@example.com").unwrap());
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert_eq!(EmailAddress::parse("nope"), Err(EmailAddressError));
        assert_eq!(
            EmailAddressError.to_string(),
            "Value is not a valid email address."
        );
    }

    #[test]
    fn test_serde_validates_and_normalizes() {
        let address: EmailAddress = serde_json::from_str("\"Someone@Example.org\"").unwrap();
        assert_eq!(address.as_str(), "someone@example.org");
        assert_eq!(serde_json::to_string(&address).unwrap(), "\"someone@example.org\"");

        let invalid = serde_json::from_str::<EmailAddress>("\"invalid\"");
        assert!(invalid.is_err());
    }
}
