// src/protocol/mod.rs

//! Line protocol spoken with the driver.
//!
//! One JSON object per line in each direction. [`request`] turns an input
//! line into a typed [`Request`]; [`response`] builds and encodes the
//! matching [`Response`]. Field names and error codes here are the
//! compatibility contract with existing drivers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::process::channel::WriteError;
use crate::process::monitor::PollError;
use crate::process::shutdown::InvalidReference;
use crate::process::LaunchError;

pub mod request;
pub mod response;

pub use request::{Request, parse_request};
pub use response::Response;

/// Failure codes carried in the `error` field of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ParseError,
    UnknownCommand,
    InvalidRef,
    PipeCreationFailed,
    ForkFailed,
    WriteFailed,
    ProcessCheckFailed,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ParseError => "parse_error",
            ErrorCode::UnknownCommand => "unknown_command",
            ErrorCode::InvalidRef => "invalid_ref",
            ErrorCode::PipeCreationFailed => "pipe_creation_failed",
            ErrorCode::ForkFailed => "fork_failed",
            ErrorCode::WriteFailed => "write_failed",
            ErrorCode::ProcessCheckFailed => "process_check_failed",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&LaunchError> for ErrorCode {
    fn from(err: &LaunchError) -> Self {
        match err {
            LaunchError::PipeCreationFailed(_) => ErrorCode::PipeCreationFailed,
            LaunchError::ForkFailed { .. } => ErrorCode::ForkFailed,
        }
    }
}

impl From<&PollError> for ErrorCode {
    fn from(_: &PollError) -> Self {
        ErrorCode::ProcessCheckFailed
    }
}

impl From<&WriteError> for ErrorCode {
    fn from(_: &WriteError) -> Self {
        ErrorCode::WriteFailed
    }
}

impl From<&InvalidReference> for ErrorCode {
    fn from(_: &InvalidReference) -> Self {
        ErrorCode::InvalidRef
    }
}
