//! Response classification by targeted pattern search
//!
//! Success-shaped envelopes can still carry a failure, and fault documents
//! vary in prefixing, so classification looks for the handful of markers
//! that matter instead of decoding the whole document.

use once_cell::sync::Lazy;
use practicebridge_domain::{BridgeError, Result};
use quick_xml::escape::unescape;
use regex::Regex;

static FAULT_STRING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<(?:[\w.-]+:)?faultstring(?:\s[^>]*)?>(.*?)</(?:[\w.-]+:)?faultstring>")
        .expect("fault string regex should compile - this is a bug")
});

static FAULT_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<(?:[\w.-]+:)?faultcode(?:\s[^>]*)?>(.*?)</(?:[\w.-]+:)?faultcode>")
        .expect("fault code regex should compile - this is a bug")
});

static IS_ERROR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<(?:[\w.-]+:)?IsError>\s*true\s*</")
        .expect("error flag regex should compile - this is a bug")
});

static ERROR_MESSAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<(?:[\w.-]+:)?ErrorMessage>(.*?)</(?:[\w.-]+:)?ErrorMessage>")
        .expect("error message regex should compile - this is a bug")
});

static SECURITY_FLAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<(?:[\w.-]+:)?(Authenticated|Authorized|SecurityResultSuccess)>\s*false\s*</")
        .expect("security flag regex should compile - this is a bug")
});

static SECURITY_RESULT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<(?:[\w.-]+:)?SecurityResult>(.*?)</(?:[\w.-]+:)?SecurityResult>")
        .expect("security result regex should compile - this is a bug")
});

/// How a response body reads, before any structured extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Success,
    Fault { code: String, message: String },
    Application(String),
    Auth(String),
}

impl Classification {
    pub fn into_result(self) -> Result<()> {
        match self {
            Classification::Success => Ok(()),
            Classification::Fault { code, message } => Err(BridgeError::Fault { code, message }),
            Classification::Application(message) => Err(BridgeError::Application(message)),
            Classification::Auth(message) => Err(BridgeError::Auth(message)),
        }
    }
}

/// Classify a body: fault, then embedded error flag, then security flags.
pub fn classify(body: &str) -> Classification {
    if let Some(message) = capture(&FAULT_STRING, body) {
        let code = capture(&FAULT_CODE, body).unwrap_or_default();
        return Classification::Fault { code, message };
    }

    if IS_ERROR.is_match(body) {
        let message = capture(&ERROR_MESSAGE, body)
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| "remote service reported an error without a message".to_string());
        return Classification::Application(message);
    }

    if let Some(flag) = SECURITY_FLAG.captures(body).and_then(|caps| caps.get(1)) {
        let message = capture(&SECURITY_RESULT, body)
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| security_message(flag.as_str()));
        return Classification::Auth(message);
    }

    Classification::Success
}

/// The fault string of a body, if it is a fault document.
pub fn fault_message(body: &str) -> Option<String> {
    capture(&FAULT_STRING, body)
}

fn security_message(flag: &str) -> String {
    match flag.to_ascii_lowercase().as_str() {
        "authenticated" => "credentials were rejected (not authenticated)".to_string(),
        "authorized" => "user is not authorized for this practice".to_string(),
        _ => "security check failed".to_string(),
    }
}

fn capture(pattern: &Regex, body: &str) -> Option<String> {
    pattern.captures(body).and_then(|caps| caps.get(1)).map(|m| decode(m.as_str()))
}

fn decode(raw: &str) -> String {
    let trimmed = raw.trim();
    unescape(trimmed).map(|text| text.into_owned()).unwrap_or_else(|_| trimmed.to_string())
}
