//! Normalization between the remote schema and the domain records
//!
//! Each domain field has one declarative alias list; a single resolver takes
//! the first present, non-empty source. Nested sub-records are always built,
//! with `None` leaves, so consumers never branch on presence.

pub mod outbound;
pub mod rules;

use std::str::FromStr;

use practicebridge_domain::{AppointmentStatus, BridgeError, Gender, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::protocol::FlatRecord;

/// How a resolved source value becomes a domain value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coerce {
    Text,
    Bool,
    Number,
    Gender,
    AppointmentStatus,
}

/// One target field: camelCase path in the domain record plus its wire aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub path: &'static str,
    pub sources: &'static [&'static str],
    pub coerce: Coerce,
}

impl FieldRule {
    pub const fn text(path: &'static str, sources: &'static [&'static str]) -> Self {
        Self { path, sources, coerce: Coerce::Text }
    }

    pub const fn with(path: &'static str, sources: &'static [&'static str], coerce: Coerce) -> Self {
        Self { path, sources, coerce }
    }

    /// Wire aliases in precedence order, then the internal path itself.
    pub fn aliases(&self) -> impl Iterator<Item = &'static str> {
        self.sources.iter().copied().chain(std::iter::once(self.path))
    }

    fn resolve<'r>(&self, record: &'r FlatRecord) -> Option<&'r str> {
        self.aliases()
            .filter_map(|alias| record.get(alias))
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
    }
}

/// Build one domain record from a flattened response map.
///
/// # Errors
/// `BridgeError::Internal` if the rules and the record type disagree.
pub fn normalize<T: DeserializeOwned>(record: &FlatRecord, rules: &[FieldRule]) -> Result<T> {
    let mut root = Map::new();
    for rule in rules {
        let value = rule.resolve(record).map_or(Value::Null, |raw| coerce(rule, raw));
        set_path(&mut root, rule.path, value);
    }

    serde_json::from_value(Value::Object(root))
        .map_err(|err| BridgeError::Internal(format!("failed to normalize record: {err}")))
}

/// Normalize every record, in order.
pub fn normalize_all<T: DeserializeOwned>(records: &[FlatRecord], rules: &[FieldRule]) -> Result<Vec<T>> {
    records.iter().map(|record| normalize(record, rules)).collect()
}

/// Render a domain record back into a wire-shaped map, writing each
/// populated field under its first alias.
pub fn to_record<T: Serialize>(value: &T, rules: &[FieldRule]) -> Result<FlatRecord> {
    let json = serde_json::to_value(value)
        .map_err(|err| BridgeError::Internal(format!("failed to serialize record: {err}")))?;

    let mut record = FlatRecord::new();
    for rule in rules {
        let Some(text) = lookup(&json, rule.path).and_then(|value| wire_text(rule, value)) else {
            continue;
        };
        let alias = rule.sources.first().copied().unwrap_or(rule.path);
        record.insert(alias.to_string(), text);
    }
    Ok(record)
}

/// Normalize `returned` on top of `base`: every field the response carries
/// wins, everything else keeps the value that was sent.
///
/// Create and update responses echo only part of the record.
pub fn overlay<T>(base: &T, returned: &FlatRecord, rules: &[FieldRule]) -> Result<T>
where
    T: Serialize + DeserializeOwned,
{
    let mut record = to_record(base, rules)?;
    for rule in rules {
        if let Some(value) = rule.resolve(returned) {
            let value = value.to_string();
            record.retain(|key, _| !rule.aliases().any(|alias| alias == key));
            record.insert(rule.path.to_string(), value);
        }
    }
    normalize(&record, rules)
}

/// Flatten an already-normalized record into dotted camelCase paths, the
/// form [`normalize`] accepts through each rule's internal alias.
pub fn flatten_value(value: &Value) -> FlatRecord {
    let mut record = FlatRecord::new();
    flatten_into(value, None, &mut record);
    record
}

fn flatten_into(value: &Value, prefix: Option<&str>, out: &mut FlatRecord) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = prefix.map_or_else(|| key.clone(), |prefix| format!("{prefix}.{key}"));
                flatten_into(child, Some(&path), out);
            }
        }
        Value::Null => {}
        Value::String(text) => {
            if let Some(path) = prefix {
                out.insert(path.to_string(), text.clone());
            }
        }
        other => {
            if let Some(path) = prefix {
                out.insert(path.to_string(), other.to_string());
            }
        }
    }
}

fn coerce(rule: &FieldRule, raw: &str) -> Value {
    match rule.coerce {
        Coerce::Text => Value::String(raw.to_string()),
        Coerce::Bool => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "y" => Value::Bool(true),
            "false" | "0" | "no" | "n" => Value::Bool(false),
            _ => unparsed(rule, raw),
        },
        Coerce::Number => raw.parse::<u32>().map(Value::from).unwrap_or_else(|_| unparsed(rule, raw)),
        Coerce::Gender => {
            enum_value::<Gender>(raw).unwrap_or_else(|| unparsed(rule, raw))
        }
        Coerce::AppointmentStatus => {
            enum_value::<AppointmentStatus>(raw).unwrap_or_else(|| unparsed(rule, raw))
        }
    }
}

fn enum_value<E: FromStr + Serialize>(raw: &str) -> Option<Value> {
    E::from_str(raw).ok().and_then(|parsed| serde_json::to_value(parsed).ok())
}

fn unparsed(rule: &FieldRule, raw: &str) -> Value {
    debug!(field = rule.path, value = raw, "dropping unrecognized value");
    Value::Null
}

fn wire_text(rule: &FieldRule, value: &Value) -> Option<String> {
    match (rule.coerce, value) {
        (_, Value::Null) => None,
        (Coerce::Gender, Value::String(raw)) => Gender::from_str(raw).ok().map(|g| g.to_string()),
        (Coerce::AppointmentStatus, Value::String(raw)) => {
            AppointmentStatus::from_str(raw).ok().map(|status| status.to_string())
        }
        (_, Value::String(text)) => Some(text.clone()),
        (_, Value::Bool(flag)) => Some(flag.to_string()),
        (_, Value::Number(number)) => Some(number.to_string()),
        _ => None,
    }
}

fn set_path(root: &mut Map<String, Value>, path: &str, value: Value) {
    let mut segments = path.split('.').peekable();
    let mut current = root;
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_string(), value);
            return;
        }
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        let Value::Object(next) = entry else {
            return;
        };
        current = next;
    }
}

fn lookup<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.').try_fold(value, |current, segment| current.get(segment))
}

#[cfg(test)]
mod tests {
    use practicebridge_domain::{Appointment, Patient, Practice, Provider, Reason};

    use super::rules::{APPOINTMENT_RULES, PATIENT_RULES, PRACTICE_RULES, PROVIDER_RULES, REASON_RULES};
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> FlatRecord {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn first_present_alias_wins_and_blank_is_skipped() {
        let flat = record(&[("ID", "  "), ("PatientID", "501"), ("PatientId", "999"), ("FirstName", "Ada")]);

        let patient: Patient = normalize(&flat, PATIENT_RULES).unwrap();

        assert_eq!(patient.id.as_deref(), Some("501"));
        assert_eq!(patient.first_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn nested_sub_records_are_always_present() {
        let patient: Patient = normalize(&FlatRecord::new(), PATIENT_RULES).unwrap();
        let json = serde_json::to_value(&patient).unwrap();

        for nested in ["address", "emergencyContact", "insurance", "primaryProvider", "practice"] {
            assert!(json[nested].is_object(), "{nested} should be an object");
        }
        assert!(json["address"]["city"].is_null());
    }

    #[test]
    fn enums_and_flags_are_coerced() {
        let flat = record(&[("Gender", "F"), ("ConfirmationStatus", "Check-in"), ("Active", "True")]);

        let patient: Patient = normalize(&flat, PATIENT_RULES).unwrap();
        let appointment: Appointment = normalize(&flat, APPOINTMENT_RULES).unwrap();
        let provider: Provider = normalize(&flat, PROVIDER_RULES).unwrap();

        assert_eq!(patient.gender, Some(Gender::Female));
        assert_eq!(appointment.status, Some(AppointmentStatus::CheckedIn));
        assert_eq!(provider.active, Some(true));
    }

    #[test]
    fn unrecognized_enum_value_becomes_none() {
        let flat = record(&[("Gender", "Other"), ("DefaultDurationMinutes", "thirty")]);

        let patient: Patient = normalize(&flat, PATIENT_RULES).unwrap();
        let reason: Reason = normalize(&flat, REASON_RULES).unwrap();

        assert_eq!(patient.gender, None);
        assert_eq!(reason.default_duration_minutes, None);
    }

    #[test]
    fn round_trip_through_wire_map_preserves_populated_fields() {
        let flat = record(&[
            ("ID", "501"),
            ("FirstName", "Ada"),
            ("LastName", "Lovelace"),
            ("DOB", "1990-05-17T00:00:00"),
            ("Gender", "Female"),
            ("City", "Boston"),
            ("EmergencyName", "Charles"),
            ("PrimaryInsurancePolicyCompanyName", "Acme Health"),
            ("DefaultRenderingProviderFullName", "Dr. Who"),
            ("PracticeName", "North"),
        ]);
        let original: Patient = normalize(&flat, PATIENT_RULES).unwrap();

        let wire = to_record(&original, PATIENT_RULES).unwrap();
        let again: Patient = normalize(&wire, PATIENT_RULES).unwrap();

        assert_eq!(again, original);
    }

    #[test]
    fn normalizing_a_normalized_record_is_a_no_op() {
        let flat = record(&[
            ("ID", "7"),
            ("PracticeName", "North"),
            ("Active", "false"),
            ("PracticeCity", "Boston"),
        ]);
        let practice: Practice = normalize(&flat, PRACTICE_RULES).unwrap();

        let flattened = flatten_value(&serde_json::to_value(&practice).unwrap());
        let again: Practice = normalize(&flattened, PRACTICE_RULES).unwrap();

        assert_eq!(again, practice);
        assert_eq!(again.address.city.as_deref(), Some("Boston"));

        let appointment: Appointment =
            normalize(&record(&[("ID", "1"), ("ConfirmationStatus", "No Show")]), APPOINTMENT_RULES).unwrap();
        let flattened = flatten_value(&serde_json::to_value(&appointment).unwrap());
        let again: Appointment = normalize(&flattened, APPOINTMENT_RULES).unwrap();
        assert_eq!(again, appointment);
    }

    #[test]
    fn overlay_prefers_returned_values_and_keeps_the_rest() {
        let sent = Patient {
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            gender: Some(Gender::Female),
            ..Default::default()
        };
        let returned = record(&[("PatientID", "501"), ("LastName", "Byron"), ("FirstName", "")]);

        let merged: Patient = overlay(&sent, &returned, PATIENT_RULES).unwrap();

        assert_eq!(merged.id.as_deref(), Some("501"));
        assert_eq!(merged.first_name.as_deref(), Some("Ada"));
        assert_eq!(merged.last_name.as_deref(), Some("Byron"));
        assert_eq!(merged.gender, Some(Gender::Female));
    }
}
