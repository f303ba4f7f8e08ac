//! Credential handling for the request header.
//!
//! The three secret values travel in every request header and nowhere else;
//! the practice-scope identifier stays out of the header entirely.

use std::fmt;

use practicebridge_domain::constants::REDACTED;
use practicebridge_domain::{BridgeError, Result};
use quick_xml::escape::{escape, partial_escape};

/// A secret that never prints its value.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw value. Only the envelope writer should need this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Process-wide API credential, loaded once at startup.
#[derive(Clone, Debug)]
pub struct Credential {
    pub customer_key: Secret,
    pub user: Secret,
    pub password: Secret,
    pub practice_name: String,
}

impl Credential {
    pub fn new(
        customer_key: impl Into<Secret>,
        user: impl Into<Secret>,
        password: impl Into<Secret>,
        practice_name: impl Into<String>,
    ) -> Self {
        Self {
            customer_key: customer_key.into(),
            user: user.into(),
            password: password.into(),
            practice_name: practice_name.into(),
        }
    }

    /// # Errors
    /// `BridgeError::InvalidInput` naming every missing value.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("customer key", self.customer_key.is_blank()),
            ("user", self.user.is_blank()),
            ("password", self.password.is_blank()),
            ("practice name", self.practice_name.trim().is_empty()),
        ]
        .into_iter()
        .filter(|(_, blank)| *blank)
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(BridgeError::InvalidInput(format!("missing credential: {}", missing.join(", "))))
        }
    }

    /// Header children in wire order.
    pub fn header_fields(&self) -> [(&'static str, &str); 3] {
        [
            ("CustomerKey", self.customer_key.expose()),
            ("Password", self.password.expose()),
            ("User", self.user.expose()),
        ]
    }

    /// Replace every secret value in `text`, raw or markup-escaped, with `***`.
    pub fn redact(&self, text: &str) -> String {
        let mut redacted = text.to_string();
        for secret in [&self.password, &self.customer_key, &self.user] {
            let raw = secret.expose();
            if raw.is_empty() {
                continue;
            }
            let escaped = escape(raw);
            let partial = partial_escape(raw);
            for form in [escaped.as_ref(), partial.as_ref(), raw] {
                if redacted.contains(form) {
                    redacted = redacted.replace(form, REDACTED);
                }
            }
        }
        redacted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential() -> Credential {
        Credential::new("ck-123", "front.desk@clinic", "p<a&ss\"word", "Main Street Clinic")
    }

    #[test]
    fn debug_output_never_contains_secrets() {
        let rendered = format!("{:?}", credential());

        assert!(!rendered.contains("ck-123"));
        assert!(!rendered.contains("p<a&ss"));
        assert!(rendered.contains("Main Street Clinic"));
    }

    #[test]
    fn redact_covers_raw_and_escaped_forms() {
        let cred = credential();
        let text = "<Password>p&lt;a&amp;ss&quot;word</Password> raw=p<a&ss\"word key=ck-123";

        let redacted = cred.redact(text);

        assert_eq!(redacted, "<Password>***</Password> raw=*** key=***");
    }

    #[test]
    fn validate_names_missing_values() {
        let cred = Credential::new("ck", "", " ", "Clinic");

        let err = cred.validate().unwrap_err();

        assert_eq!(err, BridgeError::InvalidInput("missing credential: user, password".into()));
    }

    #[test]
    fn header_fields_are_in_wire_order() {
        let names: Vec<&str> = credential().header_fields().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["CustomerKey", "Password", "User"]);
    }
}
