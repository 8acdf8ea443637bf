use thiserror::Error;

/// The only message a visitor ever sees for a failed submission.
pub const SUBMISSION_FAILED_MESSAGE: &str = "Something went wrong. Please try again.";

/// Any failure while delivering a submission: transport, timeout, encoding,
/// or a rejected status. `detail` is diagnostic only and never displayed.
#[derive(Debug, Clone, Error)]
#[error("submission failed: {detail}")]
pub struct SubmissionFailed {
    pub detail: String,
}

impl SubmissionFailed {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }

    pub fn user_message(&self) -> &'static str {
        SUBMISSION_FAILED_MESSAGE
    }
}

#[derive(Debug, Clone, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownOption {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownOption {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}
