//! Appointment-creation retry/fallback state machine
//!
//! States are the payload variants in priority order followed by one typed
//! client attempt. A state either succeeds (an appointment id came back),
//! moves to the next state (the service answered with a known
//! schema-translation failure) or aborts the whole operation (anything else).
//!
//! Which variant a given server generation accepts is inferred, never
//! negotiated; the winning strategy is logged so the chain can be refined.

use std::fmt;

use async_trait::async_trait;
use practicebridge_domain::constants::SCHEMA_TRANSLATION_FAILURES;
use practicebridge_domain::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::variants::{AppointmentPayload, PayloadVariant};

/// Sends one variant through the raw envelope pipeline.
///
/// Returns the numeric appointment id on success; embedded application
/// errors must surface as [`BridgeError::Application`] carrying the remote
/// message unchanged.
#[async_trait]
pub trait VariantExecutor: Send + Sync {
    async fn submit_variant(
        &self,
        variant: PayloadVariant,
        payload: &AppointmentPayload,
    ) -> Result<String>;
}

/// Sends the canonical payload through a typed client instead of the raw
/// serializer.
#[async_trait]
pub trait TypedFallback: Send + Sync {
    async fn submit_typed(&self, payload: &AppointmentPayload) -> Result<String>;
}

/// Which path the adapter is configured to take for appointment creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientMode {
    /// Raw envelope variants first, typed client as the last resort.
    #[default]
    Raw,
    /// Typed client only.
    Typed,
}

/// The strategy that produced the appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "variant")]
pub enum CreationStrategy {
    Raw(PayloadVariant),
    Typed,
}

impl fmt::Display for CreationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw(variant) => write!(f, "raw:{variant}"),
            Self::Typed => f.write_str("typed"),
        }
    }
}

/// Successful outcome of the state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentCreation {
    pub appointment_id: String,
    pub strategy: CreationStrategy,
    pub attempts: u32,
}

/// Outcome of a single attempt as seen by the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Success(String),
    NextVariant(String),
    Abort(BridgeError),
}

impl Transition {
    /// Map one attempt's result onto a state transition.
    pub fn from_attempt(result: Result<String>) -> Self {
        match result {
            Ok(id) => Self::Success(id),
            Err(BridgeError::Application(message)) if is_schema_translation_failure(&message) => {
                Self::NextVariant(message)
            }
            Err(err) => Self::Abort(err),
        }
    }
}

/// Exact (trimmed) match against the known translation-failure messages.
pub fn is_schema_translation_failure(message: &str) -> bool {
    let trimmed = message.trim();
    SCHEMA_TRANSLATION_FAILURES.iter().any(|known| *known == trimmed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Variant(usize),
    TypedFallback,
}

/// Drives appointment creation across variants and the typed fallback.
pub struct CreationOrchestrator<'a> {
    executor: &'a dyn VariantExecutor,
    fallback: &'a dyn TypedFallback,
    mode: ClientMode,
}

impl<'a> CreationOrchestrator<'a> {
    pub fn new(
        executor: &'a dyn VariantExecutor,
        fallback: &'a dyn TypedFallback,
        mode: ClientMode,
    ) -> Self {
        Self { executor, fallback, mode }
    }

    /// Run the state machine to completion.
    ///
    /// # Errors
    /// - The first non-translation failure, verbatim.
    /// - The last translation failure once every state is exhausted.
    pub async fn run(&self, canonical: &AppointmentPayload) -> Result<AppointmentCreation> {
        let mut state = match self.mode {
            ClientMode::Raw => State::Variant(0),
            ClientMode::Typed => State::TypedFallback,
        };
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let (strategy, result) = match state {
                State::Variant(index) => {
                    let variant = PayloadVariant::ORDER[index];
                    let payload = variant.apply(canonical);
                    debug!(%variant, attempt = attempts, "submitting appointment variant");
                    (CreationStrategy::Raw(variant), self.executor.submit_variant(variant, &payload).await)
                }
                State::TypedFallback => {
                    debug!(attempt = attempts, "submitting appointment through typed client");
                    (CreationStrategy::Typed, self.fallback.submit_typed(canonical).await)
                }
            };

            match Transition::from_attempt(result) {
                Transition::Success(appointment_id) => {
                    info!(
                        strategy = %strategy,
                        attempts,
                        appointment_id = %appointment_id,
                        "appointment created"
                    );
                    return Ok(AppointmentCreation { appointment_id, strategy, attempts });
                }
                Transition::NextVariant(message) => {
                    warn!(strategy = %strategy, message = %message, "schema translation failure");
                    state = match state {
                        State::Variant(index) if index + 1 < PayloadVariant::ORDER.len() => {
                            State::Variant(index + 1)
                        }
                        State::Variant(_) => State::TypedFallback,
                        State::TypedFallback => return Err(BridgeError::Application(message)),
                    };
                }
                Transition::Abort(err) => {
                    warn!(strategy = %strategy, error = %err, "appointment creation aborted");
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    const V3_FAILURE: &str = "Error translating AppointmentCreate to CreateAppointmentV3Request";

    /// Replays canned results in order and records which variants were tried.
    struct Scripted {
        results: Mutex<Vec<Result<String>>>,
        seen: Mutex<Vec<CreationStrategy>>,
    }

    impl Scripted {
        fn new(results: Vec<Result<String>>) -> Self {
            Self { results: Mutex::new(results), seen: Mutex::new(Vec::new()) }
        }

        fn next(&self, strategy: CreationStrategy) -> Result<String> {
            self.seen.lock().unwrap().push(strategy);
            let mut results = self.results.lock().unwrap();
            if results.is_empty() {
                panic!("no scripted result left for {strategy}");
            }
            results.remove(0)
        }

        fn seen(&self) -> Vec<CreationStrategy> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl VariantExecutor for Scripted {
        async fn submit_variant(
            &self,
            variant: PayloadVariant,
            _payload: &AppointmentPayload,
        ) -> Result<String> {
            self.next(CreationStrategy::Raw(variant))
        }
    }

    #[async_trait]
    impl TypedFallback for Scripted {
        async fn submit_typed(&self, _payload: &AppointmentPayload) -> Result<String> {
            self.next(CreationStrategy::Typed)
        }
    }

    fn payload() -> AppointmentPayload {
        AppointmentPayload { patient_id: "1".into(), reason_id: "2".into(), ..Default::default() }
    }

    #[tokio::test]
    async fn second_variant_wins_after_translation_failure() {
        let script = Scripted::new(vec![
            Err(BridgeError::Application(V3_FAILURE.into())),
            Ok("4242".into()),
        ]);

        let outcome = CreationOrchestrator::new(&script, &script, ClientMode::Raw)
            .run(&payload())
            .await
            .unwrap();

        assert_eq!(outcome.appointment_id, "4242");
        assert_eq!(outcome.strategy, CreationStrategy::Raw(PayloadVariant::WithoutCaseId));
        assert_eq!(outcome.attempts, 2);
        assert_eq!(script.seen().len(), 2);
    }

    #[tokio::test]
    async fn other_embedded_errors_are_terminal() {
        let script = Scripted::new(vec![Err(BridgeError::Application(
            "Patient 1 does not exist".into(),
        ))]);

        let err = CreationOrchestrator::new(&script, &script, ClientMode::Raw)
            .run(&payload())
            .await
            .unwrap_err();

        assert_eq!(err, BridgeError::Application("Patient 1 does not exist".into()));
        assert_eq!(script.seen().len(), 1);
    }

    #[tokio::test]
    async fn transport_errors_are_terminal() {
        let script = Scripted::new(vec![Err(BridgeError::Network("HTTP request timed out".into()))]);

        let err = CreationOrchestrator::new(&script, &script, ClientMode::Raw)
            .run(&payload())
            .await
            .unwrap_err();

        assert!(err.is_retryable());
        assert_eq!(script.seen().len(), 1);
    }

    #[tokio::test]
    async fn typed_fallback_runs_once_after_all_variants() {
        let mut results: Vec<Result<String>> = PayloadVariant::ORDER
            .iter()
            .map(|_| Err(BridgeError::Application(V3_FAILURE.into())))
            .collect();
        results.push(Ok("99".into()));
        let script = Scripted::new(results);

        let outcome = CreationOrchestrator::new(&script, &script, ClientMode::Raw)
            .run(&payload())
            .await
            .unwrap();

        assert_eq!(outcome.strategy, CreationStrategy::Typed);
        assert_eq!(outcome.attempts, 5);
        assert_eq!(script.seen().last(), Some(&CreationStrategy::Typed));
    }

    #[tokio::test]
    async fn exhausting_everything_surfaces_last_message() {
        let script = Scripted::new(
            (0..5).map(|_| Err(BridgeError::Application(format!(" {V3_FAILURE} ")))).collect(),
        );

        let err = CreationOrchestrator::new(&script, &script, ClientMode::Raw)
            .run(&payload())
            .await
            .unwrap_err();

        assert_eq!(err.message().trim(), V3_FAILURE);
        assert_eq!(script.seen().len(), 5);
    }

    #[tokio::test]
    async fn typed_mode_skips_raw_variants() {
        let script = Scripted::new(vec![Ok("7".into())]);

        let outcome = CreationOrchestrator::new(&script, &script, ClientMode::Typed)
            .run(&payload())
            .await
            .unwrap();

        assert_eq!(outcome.strategy, CreationStrategy::Typed);
        assert_eq!(script.seen(), vec![CreationStrategy::Typed]);
    }

    #[test]
    fn translation_failure_match_is_exact() {
        assert!(is_schema_translation_failure(V3_FAILURE));
        assert!(is_schema_translation_failure(&format!("\n{V3_FAILURE}\n")));
        assert!(!is_schema_translation_failure(&format!("{V3_FAILURE}: PatientId")));
        assert!(!is_schema_translation_failure("error translating appointmentcreate"));
    }
}
