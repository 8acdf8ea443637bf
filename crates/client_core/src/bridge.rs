//! Command queue between a UI event loop and a form controller.
//!
//! The UI pushes [`FormCommand`]s without waiting; a worker task applies them
//! in order. A `Submit` enters `Submitting` before the next command is read;
//! the network call then runs on its own task, so a second `Submit` queued
//! behind it hits the controller's single-flight guard.

use std::sync::Arc;

use tokio::{
    sync::mpsc::{self, error::TrySendError},
    task::JoinHandle,
};

use crate::{controller::FormController, SubmissionClient};

pub const COMMAND_QUEUE_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormCommand {
    SetName(String),
    SetMessage(String),
    Submit,
}

impl FormCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::SetName(_) => "set_name",
            Self::SetMessage(_) => "set_message",
            Self::Submit => "submit",
        }
    }
}

pub fn spawn_form_worker<S>(
    controller: Arc<FormController<S>>,
) -> (mpsc::Sender<FormCommand>, JoinHandle<()>)
where
    S: SubmissionClient + 'static,
{
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<FormCommand>(COMMAND_QUEUE_CAPACITY);
    let handle = tokio::spawn(async move {
        let mut in_flight: Vec<JoinHandle<()>> = Vec::new();
        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                FormCommand::SetName(value) => controller.set_name(value),
                FormCommand::SetMessage(value) => controller.set_message(value),
                FormCommand::Submit => match controller.begin_submit() {
                    Ok(payload) => {
                        let controller = Arc::clone(&controller);
                        in_flight.push(tokio::spawn(async move {
                            let result = controller.client().submit(&payload).await;
                            let outcome = controller.finish_submit(result);
                            tracing::debug!(?outcome, "rsvp: worker submit finished");
                        }));
                    }
                    Err(outcome) => tracing::debug!(?outcome, "rsvp: worker submit ignored"),
                },
            }
            in_flight.retain(|task| !task.is_finished());
        }
        for task in in_flight {
            let _ = task.await;
        }
    });
    (cmd_tx, handle)
}

/// Queues `cmd` without blocking. On failure `status` receives a line the UI
/// can show in place of the action.
pub fn dispatch_form_command(
    cmd_tx: &mpsc::Sender<FormCommand>,
    cmd: FormCommand,
    status: &mut String,
) -> bool {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->form command");
            true
        }
        Err(TrySendError::Full(_)) => {
            *status = "Form is busy; please retry".to_string();
            false
        }
        Err(TrySendError::Closed(_)) => {
            *status = "Form worker stopped; reload the page to try again".to_string();
            false
        }
    }
}

#[cfg(test)]
#[path = "tests/bridge_tests.rs"]
mod tests;
