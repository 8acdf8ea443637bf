use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use shared::{
    domain::{FormFields, SubmissionState},
    error::{SubmissionFailed, SUBMISSION_FAILED_MESSAGE},
    protocol::SubmissionPayload,
};
use tokio::sync::{Mutex as AsyncMutex, Notify};

use super::*;

/// Scripted collector: records payloads, fails while `fail_with` is set,
/// and optionally parks each call until `release` is notified.
struct ScriptedClient {
    calls: AtomicUsize,
    payloads: AsyncMutex<Vec<SubmissionPayload>>,
    fail_with: std::sync::Mutex<Option<String>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedClient {
    fn ok() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            payloads: AsyncMutex::new(Vec::new()),
            fail_with: std::sync::Mutex::new(None),
            gate: None,
        }
    }

    fn failing(detail: &str) -> Self {
        let client = Self::ok();
        client.set_failure(Some(detail));
        client
    }

    fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::ok()
        }
    }

    fn set_failure(&self, detail: Option<&str>) {
        *self.fail_with.lock().expect("fail_with lock") = detail.map(str::to_string);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubmissionClient for ScriptedClient {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<(), SubmissionFailed> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads.lock().await.push(payload.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let failure = self.fail_with.lock().expect("fail_with lock").clone();
        match failure {
            Some(detail) => Err(SubmissionFailed::new(detail)),
            None => Ok(()),
        }
    }
}

fn controller_with(
    client: ScriptedClient,
) -> (FormController<Arc<ScriptedClient>>, Arc<ScriptedClient>) {
    let client = Arc::new(client);
    (FormController::new(Arc::clone(&client)), client)
}

#[tokio::test]
async fn scenario_a_submits_trimmed_message_and_keeps_name() {
    let (controller, client) = controller_with(ScriptedClient::ok());
    controller.set_name("Riya");
    controller.set_message("  Thank you for everything  ");

    assert!(controller.can_submit());
    assert_eq!(controller.submit().await, SubmitOutcome::Submitted);
    assert_eq!(
        controller.state(),
        SubmissionState::Submitted {
            name: "Riya".to_string()
        }
    );

    let payloads = client.payloads.lock().await;
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].name, "Riya");
    assert_eq!(payloads[0].message, "Thank you for everything");
}

#[tokio::test]
async fn scenario_b_empty_name_is_a_noop() {
    let (controller, client) = controller_with(ScriptedClient::ok());
    controller.set_message("hello");

    assert!(!controller.can_submit());
    assert_eq!(controller.submit().await, SubmitOutcome::Incomplete);
    assert_eq!(controller.state(), SubmissionState::Idle);
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn scenario_c_whitespace_message_is_a_noop() {
    let (controller, client) = controller_with(ScriptedClient::ok());
    controller.set_name("Arjun");
    controller.set_message("   ");

    assert!(!controller.can_submit());
    assert_eq!(controller.submit().await, SubmitOutcome::Incomplete);
    assert_eq!(controller.state(), SubmissionState::Idle);
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn scenario_d_failure_keeps_form_interactive_and_allows_retry() {
    let (controller, client) = controller_with(ScriptedClient::failing("connection refused"));
    controller.set_name("Riya");
    controller.set_message("see you");

    assert_eq!(controller.submit().await, SubmitOutcome::Failed);
    assert_eq!(
        controller.state(),
        SubmissionState::Failed {
            reason: SUBMISSION_FAILED_MESSAGE.to_string()
        }
    );
    assert!(controller.can_submit());
    assert_eq!(
        controller.view().error.as_deref(),
        Some("Something went wrong. Please try again.")
    );

    client.set_failure(None);
    assert_eq!(controller.submit().await, SubmitOutcome::Submitted);
    assert_eq!(client.calls(), 2);
    assert_eq!(controller.view().error, None);
}

#[tokio::test]
async fn second_submit_while_in_flight_makes_no_second_call() {
    let gate = Arc::new(Notify::new());
    let (controller, client) = controller_with(ScriptedClient::gated(Arc::clone(&gate)));
    let controller = Arc::new(controller);
    controller.set_name("Riya");
    controller.set_message("hi");

    let first = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move { controller.submit().await }
    });

    while client.calls() == 0 {
        tokio::task::yield_now().await;
    }
    assert_eq!(controller.state(), SubmissionState::Submitting);
    assert!(!controller.can_submit());
    assert_eq!(controller.submit().await, SubmitOutcome::AlreadyInFlight);
    assert_eq!(controller.view().button_label, "Sending...");

    gate.notify_one();
    assert_eq!(first.await.expect("join"), SubmitOutcome::Submitted);
    assert_eq!(client.calls(), 1);
}

#[test]
fn begin_submit_moves_to_submitting_synchronously() {
    let (controller, _client) = controller_with(ScriptedClient::ok());
    controller.set_name("Riya");
    controller.set_message("  thanks ");

    let payload = controller.begin_submit().expect("payload");
    assert_eq!(payload.message, "thanks");
    assert_eq!(controller.state(), SubmissionState::Submitting);
    assert_eq!(
        controller.begin_submit().expect_err("guarded"),
        SubmitOutcome::AlreadyInFlight
    );

    assert_eq!(
        controller.finish_submit(Err(SubmissionFailed::new("dns"))),
        SubmitOutcome::Failed
    );
    assert!(controller.begin_submit().is_ok(), "failed form must accept a new submit");
}

#[test]
fn submitted_is_terminal_and_freezes_fields() {
    let (controller, _client) = controller_with(ScriptedClient::ok());
    controller.set_name("Riya");
    controller.set_message("bye");
    controller.begin_submit().expect("payload");
    assert_eq!(controller.finish_submit(Ok(())), SubmitOutcome::Submitted);

    controller.set_name("Someone else");
    controller.set_message("");
    assert_eq!(controller.fields(), FormFields::new("Riya", "bye"));
    assert!(!controller.can_submit());
    assert_eq!(
        controller.begin_submit().expect_err("terminal"),
        SubmitOutcome::AlreadySubmitted
    );
    assert!(SubmitOutcome::AlreadySubmitted.is_noop());
}

#[test]
fn late_result_without_submission_does_not_mark_submitted() {
    let (controller, _client) = controller_with(ScriptedClient::ok());
    controller.set_name("Riya");
    controller.set_message("bye");

    assert_eq!(controller.finish_submit(Ok(())), SubmitOutcome::Stale);
    assert_eq!(controller.state(), SubmissionState::Idle);

    controller.begin_submit().expect("payload");
    controller.finish_submit(Err(SubmissionFailed::new("dns")));
    assert_eq!(
        controller.finish_submit(Err(SubmissionFailed::new("dns again"))),
        SubmitOutcome::Stale
    );
    assert!(SubmitOutcome::Stale.is_noop());
}

#[tokio::test]
async fn name_edited_mid_flight_does_not_replace_submitted_name() {
    let gate = Arc::new(Notify::new());
    let (controller, client) = controller_with(ScriptedClient::gated(Arc::clone(&gate)));
    let controller = Arc::new(controller);
    controller.set_name("Riya");
    controller.set_message("Thank you for everything");

    let first = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move { controller.submit().await }
    });
    while client.calls() == 0 {
        tokio::task::yield_now().await;
    }

    controller.set_name("");
    gate.notify_one();
    assert_eq!(first.await.expect("join"), SubmitOutcome::Submitted);

    assert_eq!(client.payloads.lock().await[0].name, "Riya");
    assert_eq!(
        controller.state(),
        SubmissionState::Submitted {
            name: "Riya".to_string()
        }
    );
    assert_eq!(
        controller.view().thank_you.as_deref(),
        Some("Thank you, Riya")
    );
}

#[test]
fn setters_are_idempotent() {
    let (controller, _client) = controller_with(ScriptedClient::ok());
    controller.set_name("Riya");
    let once = controller.fields();
    controller.set_name("Riya");
    assert_eq!(controller.fields(), once);
}

#[test]
fn view_reflects_fields_and_state() {
    let (controller, _client) = controller_with(ScriptedClient::ok());
    let view = controller.view();
    assert!(!view.submit_enabled);
    assert_eq!(view.button_label, "Send Your Message");
    assert_eq!(view.message_char_count, 0);
    assert_eq!(view.thank_you, None);

    controller.set_name("Riya");
    controller.set_message(" hello ");
    let view = controller.view();
    assert!(view.submit_enabled);
    assert_eq!(view.message_char_count, 7);
}

#[tokio::test]
async fn subscribers_see_every_transition() {
    let (controller, _client) = controller_with(ScriptedClient::failing("timeout"));
    let mut events = controller.subscribe();
    controller.set_name("Riya");
    controller.set_message("hi");

    controller.submit().await;

    assert_eq!(events.recv().await.expect("event"), SubmissionState::Submitting);
    assert_eq!(
        events.recv().await.expect("event"),
        SubmissionState::Failed {
            reason: SUBMISSION_FAILED_MESSAGE.to_string()
        }
    );
}
