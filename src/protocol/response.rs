// src/protocol/response.rs

use serde::{Deserialize, Serialize};

use crate::protocol::ErrorCode;
use crate::types::{Liveness, Reference, Termination};

/// One response line. `ok` is always present; the rest only when set.
///
/// Text values are escaped by `serde_json` on encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub ok: bool,

    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<Reference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quit: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorCode>,
}

impl Response {
    /// Bare `{"ok":true}`.
    pub fn ack() -> Self {
        Self {
            ok: true,
            ..Self::default()
        }
    }

    pub fn created(reference: Reference) -> Self {
        Self {
            reference: Some(reference),
            ..Self::ack()
        }
    }

    pub fn liveness(liveness: Liveness) -> Self {
        match liveness {
            Liveness::Running => Self {
                quit: Some(false),
                ..Self::ack()
            },
            Liveness::Terminated(Termination::Exited(code)) => Self {
                quit: Some(true),
                exit_code: Some(code),
                ..Self::ack()
            },
            Liveness::Terminated(Termination::Signaled(signal)) => Self {
                quit: Some(true),
                signal: Some(signal),
                ..Self::ack()
            },
        }
    }

    pub fn failure(code: ErrorCode) -> Self {
        Self {
            ok: false,
            error: Some(code),
            ..Self::default()
        }
    }

    /// Encode as a single JSON line, without the trailing newline.
    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
