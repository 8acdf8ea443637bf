//! RSVP form state: field ownership, submit gating, and the submission state machine.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use shared::{
    domain::{FormFields, SubmissionState},
    error::SubmissionFailed,
    protocol::SubmissionPayload,
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::SubmissionClient;

const STATE_EVENT_CAPACITY: usize = 32;
const SEND_LABEL: &str = "Send Your Message";
const SENDING_LABEL: &str = "Sending...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Name empty or message blank; nothing was sent.
    Incomplete,
    /// A submission is already in flight; nothing was sent.
    AlreadyInFlight,
    /// The form was already accepted; nothing was sent.
    AlreadySubmitted,
    /// A result arrived with no submission in flight; nothing changed.
    Stale,
    Submitted,
    Failed,
}

impl SubmitOutcome {
    pub fn is_noop(self) -> bool {
        matches!(
            self,
            Self::Incomplete | Self::AlreadyInFlight | Self::AlreadySubmitted | Self::Stale
        )
    }
}

/// What a presentation layer needs to draw the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub submit_enabled: bool,
    pub button_label: &'static str,
    pub error: Option<String>,
    pub message_char_count: usize,
    pub thank_you: Option<String>,
}

#[derive(Default)]
struct FormInner {
    fields: FormFields,
    state: SubmissionState,
    /// Name carried by the payload in flight; edits made meanwhile don't reach `Submitted`.
    pending_name: Option<String>,
}

impl FormInner {
    fn can_submit(&self) -> bool {
        self.fields.is_complete() && !self.state.is_submitting() && !self.state.is_terminal()
    }
}

pub struct FormController<S: SubmissionClient> {
    client: S,
    inner: Mutex<FormInner>,
    events: broadcast::Sender<SubmissionState>,
}

impl<S: SubmissionClient> FormController<S> {
    pub fn new(client: S) -> Self {
        let (events, _) = broadcast::channel(STATE_EVENT_CAPACITY);
        Self {
            client,
            inner: Mutex::new(FormInner::default()),
            events,
        }
    }

    pub fn client(&self) -> &S {
        &self.client
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SubmissionState> {
        self.events.subscribe()
    }

    pub fn set_name(&self, value: impl Into<String>) {
        let mut inner = self.lock();
        if inner.state.is_terminal() {
            debug!("rsvp: ignoring name edit after submission");
            return;
        }
        inner.fields.name = value.into();
    }

    pub fn set_message(&self, value: impl Into<String>) {
        let mut inner = self.lock();
        if inner.state.is_terminal() {
            debug!("rsvp: ignoring message edit after submission");
            return;
        }
        inner.fields.message = value.into();
    }

    pub fn fields(&self) -> FormFields {
        self.lock().fields.clone()
    }

    pub fn state(&self) -> SubmissionState {
        self.lock().state.clone()
    }

    pub fn can_submit(&self) -> bool {
        self.lock().can_submit()
    }

    pub fn view(&self) -> FormView {
        let inner = self.lock();
        let thank_you = match &inner.state {
            SubmissionState::Submitted { name } => Some(format!("Thank you, {name}")),
            _ => None,
        };
        FormView {
            submit_enabled: inner.can_submit(),
            button_label: if inner.state.is_submitting() {
                SENDING_LABEL
            } else {
                SEND_LABEL
            },
            error: inner.state.failure_reason().map(str::to_string),
            message_char_count: inner.fields.message_char_count(),
            thank_you,
        }
    }

    /// Validates and moves to `Submitting`, handing back the payload to send.
    /// `Err` carries the reason this call was a no-op.
    pub fn begin_submit(&self) -> Result<SubmissionPayload, SubmitOutcome> {
        let mut inner = self.lock();
        match &inner.state {
            SubmissionState::Submitting => return Err(SubmitOutcome::AlreadyInFlight),
            SubmissionState::Submitted { .. } => return Err(SubmitOutcome::AlreadySubmitted),
            SubmissionState::Idle | SubmissionState::Failed { .. } => {}
        }
        if !inner.fields.is_complete() {
            return Err(SubmitOutcome::Incomplete);
        }

        let payload = SubmissionPayload::from_fields(&inner.fields, Utc::now());
        inner.pending_name = Some(payload.name.clone());
        self.transition(&mut inner, SubmissionState::Submitting);
        Ok(payload)
    }

    /// Applies the client's result to a submission started by [`Self::begin_submit`].
    pub fn finish_submit(&self, result: Result<(), SubmissionFailed>) -> SubmitOutcome {
        let mut inner = self.lock();
        if !inner.state.is_submitting() {
            warn!(state = ?inner.state, "rsvp: submission result arrived outside of submitting state");
            return match inner.state {
                SubmissionState::Submitted { .. } => SubmitOutcome::AlreadySubmitted,
                _ => SubmitOutcome::Stale,
            };
        }

        let name = inner.pending_name.take().unwrap_or_default();
        match result {
            Ok(()) => {
                info!(%name, "rsvp: submission accepted");
                self.transition(&mut inner, SubmissionState::Submitted { name });
                SubmitOutcome::Submitted
            }
            Err(err) => {
                warn!(detail = %err.detail, "rsvp: submission failed");
                self.transition(
                    &mut inner,
                    SubmissionState::Failed {
                        reason: err.user_message().to_string(),
                    },
                );
                SubmitOutcome::Failed
            }
        }
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let payload = match self.begin_submit() {
            Ok(payload) => payload,
            Err(outcome) => {
                debug!(?outcome, "rsvp: submit ignored");
                return outcome;
            }
        };
        let result = self.client.submit(&payload).await;
        self.finish_submit(result)
    }

    fn transition(&self, inner: &mut FormInner, next: SubmissionState) {
        debug!(from = ?inner.state, to = ?next, "rsvp: state transition");
        inner.state = next;
        let _ = self.events.send(inner.state.clone());
    }

    fn lock(&self) -> MutexGuard<'_, FormInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
