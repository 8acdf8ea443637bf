use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{domain::FormFields, error::UnknownOption};

pub const NAME_FIELD: &str = "name";
pub const MESSAGE_FIELD: &str = "message";

/// Body of a single outbound submission. Built at submit time and dropped
/// once the request resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub name: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl SubmissionPayload {
    pub fn from_fields(fields: &FormFields, timestamp: DateTime<Utc>) -> Self {
        Self {
            name: fields.name.clone(),
            message: fields.trimmed_message().to_string(),
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
    /// `name` and `message` as multipart form fields.
    #[default]
    Multipart,
    /// `{ name, message, timestamp }` as a JSON body.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    /// Non-success statuses count as failures.
    #[default]
    Transparent,
    /// Only transport errors count as failures; the status is never read.
    Opaque,
}

impl FromStr for WireFormat {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "multipart" | "form" => Ok(Self::Multipart),
            "json" => Ok(Self::Json),
            other => Err(UnknownOption::new("wire format", other)),
        }
    }
}

impl FromStr for ResponseMode {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "transparent" => Ok(Self::Transparent),
            "opaque" | "no-cors" | "no_cors" => Ok(Self::Opaque),
            other => Err(UnknownOption::new("response mode", other)),
        }
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Multipart => f.write_str("multipart"),
            Self::Json => f.write_str("json"),
        }
    }
}

impl fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transparent => f.write_str("transparent"),
            Self::Opaque => f.write_str("opaque"),
        }
    }
}
