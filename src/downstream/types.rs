//! Shared annotation payloads and the downstream error taxonomy.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors returned by a single downstream call.
#[derive(Debug, Error)]
pub enum DownstreamError {
    /// Call exceeded its deadline and was abandoned.
    #[error("Downstream call exceeded its {limit:?} deadline")]
    Timeout {
        /// Deadline that was in effect.
        limit: Duration,
    },
    /// Downstream answered with a non-success status.
    #[error("Unexpected downstream response ({status}): {body}")]
    BadStatus {
        /// HTTP status returned by the downstream.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Payload could not be parsed into the expected shape.
    #[error("Malformed downstream payload: {0}")]
    Malformed(String),
    /// HTTP layer failed before receiving a response.
    #[error("Downstream request failed: {0}")]
    Transport(#[source] reqwest::Error),
}

impl DownstreamError {
    /// Stable tag identifying the failure class.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::BadStatus { .. } => "bad_status",
            Self::Malformed(_) => "malformed",
            Self::Transport(_) => "transport",
        }
    }

    /// HTTP status attached to the failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadStatus { status, .. } => Some(status.as_u16()),
            _ => None,
        }
    }

    /// Response body attached to the failure, if any.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::BadStatus { body, .. } => Some(body.as_str()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for DownstreamError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Malformed(error.to_string())
        } else {
            Self::Transport(error)
        }
    }
}

/// Named entity returned by the NER backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelledEntity {
    /// Surface text of the entity.
    pub text: String,
    /// Category label, e.g. `sport` or `person`.
    pub label: String,
}

/// Entity annotation for one sentence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityAnnotation {
    /// Surface texts of `labelled_entities`, in the same order.
    pub entities: Vec<String>,
    /// Entities with their category labels.
    pub labelled_entities: Vec<LabelledEntity>,
}

impl EntityAnnotation {
    /// Build an annotation from labelled entities, deriving the flattened text list.
    pub fn from_labelled(labelled_entities: Vec<LabelledEntity>) -> Self {
        let entities = labelled_entities
            .iter()
            .map(|entity| entity.text.clone())
            .collect();
        Self {
            entities,
            labelled_entities,
        }
    }
}

/// Dialog context paired with the candidate responses to rank.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RankingItem {
    /// Dialog context the hypotheses respond to.
    pub context: String,
    /// Candidate responses, scored in order.
    #[serde(default)]
    pub hypotheses: Vec<String>,
}

/// Pattern flags signalling that a user may need assistance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AssistanceFlags {
    /// Mentions of suicide, depression or death.
    pub depression: bool,
    /// Mentions of a bad, awful or hard day.
    pub bad_day: bool,
    /// Mentions of problems, trouble, tiredness or sadness.
    pub problems: bool,
}
