use serde::{Deserialize, Serialize};

/// Text the visitor typed into the RSVP form.
///
/// Nothing is validated on mutation; see [`FormFields::is_complete`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFields {
    pub name: String,
    pub message: String,
}

impl FormFields {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    /// `name` is non-empty and `message` has content once trimmed.
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.trimmed_message().is_empty()
    }

    pub fn trimmed_message(&self) -> &str {
        self.message.trim()
    }

    /// Character count of the raw message, as echoed under the message box.
    pub fn message_char_count(&self) -> usize {
        self.message.chars().count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Submitted {
        name: String,
    },
    /// Idle-equivalent: the form stays interactive.
    Failed {
        reason: String,
    },
}

impl SubmissionState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Submitted { .. })
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    pub date: String,
    pub time: String,
    pub venue: String,
}

impl Default for EventDetails {
    fn default() -> Self {
        Self {
            date: "16th February 2026".into(),
            time: "TBA".into(),
            venue: "TBA".into(),
        }
    }
}
