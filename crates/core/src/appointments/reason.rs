//! Appointment-reason resolution
//!
//! A missing reason id makes the appointment service answer with an opaque
//! translation error, so the id is settled before the first creation
//! attempt: explicit value, then configured id, then configured GUID/name
//! matched against the live directory, then the first directory entry.

use practicebridge_domain::{BridgeError, Reason, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ports::ReasonDirectory;

/// Configured defaults, any of which may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonDefaults {
    pub id: Option<String>,
    pub guid: Option<String>,
    pub name: Option<String>,
}

/// Where the resolved id came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonSource {
    Explicit,
    ConfiguredId,
    ConfiguredLookup,
    DirectoryFirst,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReason {
    pub id: String,
    pub name: Option<String>,
    pub source: ReasonSource,
}

/// Resolve the appointment-reason id for one creation request.
///
/// The directory is queried at most once.
///
/// # Errors
/// `BridgeError::InvalidInput` when every source is exhausted. A directory
/// failure counts as exhausted; its message is appended.
pub async fn resolve_reason(
    explicit: Option<&str>,
    defaults: &ReasonDefaults,
    directory: &dyn ReasonDirectory,
) -> Result<ResolvedReason> {
    if let Some(id) = non_empty(explicit) {
        return Ok(ResolvedReason { id, name: None, source: ReasonSource::Explicit });
    }

    if let Some(id) = non_empty(defaults.id.as_deref()) {
        debug!(reason_id = %id, "using configured default appointment reason");
        return Ok(ResolvedReason { id, name: None, source: ReasonSource::ConfiguredId });
    }

    let reasons = match directory.list_reasons().await {
        Ok(reasons) => reasons,
        Err(err) => {
            warn!(error = %err, "appointment reason directory lookup failed");
            return Err(BridgeError::InvalidInput(format!(
                "appointment reason is required and could not be resolved (directory lookup failed: {})",
                err.message()
            )));
        }
    };

    if let Some(reason) = match_configured(&reasons, defaults) {
        if let Some(id) = non_empty(reason.id.as_deref()) {
            return Ok(ResolvedReason {
                id,
                name: reason.name.clone(),
                source: ReasonSource::ConfiguredLookup,
            });
        }
    }

    if defaults.guid.is_some() || defaults.name.is_some() {
        warn!("configured appointment reason not found in directory, using first listed reason");
    }

    reasons
        .iter()
        .find_map(|reason| {
            non_empty(reason.id.as_deref()).map(|id| ResolvedReason {
                id,
                name: reason.name.clone(),
                source: ReasonSource::DirectoryFirst,
            })
        })
        .ok_or_else(|| {
            BridgeError::InvalidInput(
                "appointment reason is required: none supplied, none configured and the reason \
                 directory is empty"
                    .into(),
            )
        })
}

fn match_configured<'r>(reasons: &'r [Reason], defaults: &ReasonDefaults) -> Option<&'r Reason> {
    let by_guid = non_empty(defaults.guid.as_deref()).and_then(|guid| {
        reasons
            .iter()
            .find(|r| r.guid.as_deref().is_some_and(|g| g.trim().eq_ignore_ascii_case(&guid)))
    });

    by_guid.or_else(|| {
        non_empty(defaults.name.as_deref()).and_then(|name| {
            reasons
                .iter()
                .find(|r| r.name.as_deref().is_some_and(|n| n.trim().eq_ignore_ascii_case(&name)))
        })
    })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    struct StaticDirectory {
        reasons: Result<Vec<Reason>>,
        calls: AtomicUsize,
    }

    impl StaticDirectory {
        fn with(reasons: Vec<Reason>) -> Self {
            Self { reasons: Ok(reasons), calls: AtomicUsize::new(0) }
        }

        fn failing(message: &str) -> Self {
            Self { reasons: Err(BridgeError::Network(message.into())), calls: AtomicUsize::new(0) }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReasonDirectory for StaticDirectory {
        async fn list_reasons(&self) -> Result<Vec<Reason>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reasons.clone()
        }
    }

    fn reason(id: &str, guid: &str, name: &str) -> Reason {
        Reason {
            id: Some(id.into()),
            guid: Some(guid.into()),
            name: Some(name.into()),
            ..Default::default()
        }
    }

    fn directory() -> StaticDirectory {
        StaticDirectory::with(vec![
            reason("11", "AAA-1", "New Patient"),
            reason("12", "BBB-2", "Follow Up"),
        ])
    }

    #[tokio::test]
    async fn explicit_value_wins_without_directory_query() {
        let dir = directory();
        let defaults = ReasonDefaults { id: Some("99".into()), ..Default::default() };

        let resolved = resolve_reason(Some("5"), &defaults, &dir).await.unwrap();

        assert_eq!(resolved.id, "5");
        assert_eq!(resolved.source, ReasonSource::Explicit);
        assert_eq!(dir.calls(), 0);
    }

    #[tokio::test]
    async fn configured_id_beats_directory() {
        let dir = directory();
        let defaults = ReasonDefaults { id: Some("99".into()), ..Default::default() };

        let resolved = resolve_reason(Some("  "), &defaults, &dir).await.unwrap();

        assert_eq!(resolved.id, "99");
        assert_eq!(resolved.source, ReasonSource::ConfiguredId);
        assert_eq!(dir.calls(), 0);
    }

    #[tokio::test]
    async fn configured_name_is_matched_in_directory() {
        let dir = directory();
        let defaults = ReasonDefaults { name: Some("follow up".into()), ..Default::default() };

        let resolved = resolve_reason(None, &defaults, &dir).await.unwrap();

        assert_eq!(resolved.id, "12");
        assert_eq!(resolved.source, ReasonSource::ConfiguredLookup);
    }

    #[tokio::test]
    async fn configured_guid_takes_precedence_over_name() {
        let dir = directory();
        let defaults = ReasonDefaults {
            guid: Some("aaa-1".into()),
            name: Some("Follow Up".into()),
            ..Default::default()
        };

        let resolved = resolve_reason(None, &defaults, &dir).await.unwrap();

        assert_eq!(resolved.id, "11");
    }

    #[tokio::test]
    async fn falls_back_to_first_listed_reason() {
        let dir = directory();

        let resolved = resolve_reason(None, &ReasonDefaults::default(), &dir).await.unwrap();

        assert_eq!(resolved.id, "11");
        assert_eq!(resolved.name.as_deref(), Some("New Patient"));
        assert_eq!(resolved.source, ReasonSource::DirectoryFirst);
        assert_eq!(dir.calls(), 1);
    }

    #[tokio::test]
    async fn empty_directory_is_a_validation_error() {
        let dir = StaticDirectory::with(vec![]);

        let err = resolve_reason(None, &ReasonDefaults::default(), &dir).await.unwrap_err();

        assert!(matches!(err, BridgeError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn failing_directory_is_a_validation_error_with_cause() {
        let dir = StaticDirectory::failing("HTTP connection failure");

        let err = resolve_reason(None, &ReasonDefaults::default(), &dir).await.unwrap_err();

        match err {
            BridgeError::InvalidInput(msg) => assert!(msg.contains("HTTP connection failure")),
            other => panic!("expected invalid input, got {other:?}"),
        }
    }
}
