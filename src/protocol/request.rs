// src/protocol/request.rs

use serde::Deserialize;

use crate::process::LaunchRequest;
use crate::protocol::ErrorCode;
use crate::types::Reference;

/// Wire shape of a request. Every field is optional here; which ones are
/// mandatory depends on `cmd` and is checked in [`parse_request`].
#[derive(Debug, Default, Deserialize)]
struct RawRequest {
    cmd: Option<String>,
    #[serde(rename = "ref")]
    reference: Option<String>,
    args: Option<Vec<String>>,
    msg: Option<String>,
    lib_path: Option<String>,
}

/// A fully validated command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Create(LaunchRequest),
    Start { reference: Reference },
    Iteration { reference: Reference },
    SendMessage { reference: Reference, msg: String },
    Shutdown { reference: Reference },
}

impl Request {
    /// Protocol name of the command.
    pub fn name(&self) -> &'static str {
        match self {
            Request::Create(_) => "create",
            Request::Start { .. } => "start",
            Request::Iteration { .. } => "iteration",
            Request::SendMessage { .. } => "send_message",
            Request::Shutdown { .. } => "shutdown",
        }
    }
}

/// Parse one input line.
///
/// - malformed JSON, a missing `cmd`, or a missing mandatory field for the
///   command → [`ErrorCode::ParseError`]
/// - a `cmd` nobody knows → [`ErrorCode::UnknownCommand`]
///
/// Unrecognised fields are ignored.
pub fn parse_request(line: &str) -> Result<Request, ErrorCode> {
    let raw: RawRequest = serde_json::from_str(line).map_err(|_| ErrorCode::ParseError)?;
    let cmd = raw.cmd.as_deref().ok_or(ErrorCode::ParseError)?;

    let request = match cmd {
        "create" => {
            let launch = LaunchRequest::new(raw.args.unwrap_or_default(), raw.lib_path)
                .ok_or(ErrorCode::ParseError)?;
            Request::Create(launch)
        }
        "start" => Request::Start {
            reference: required(raw.reference)?,
        },
        "iteration" => Request::Iteration {
            reference: required(raw.reference)?,
        },
        "send_message" => Request::SendMessage {
            reference: required(raw.reference)?,
            msg: required(raw.msg)?,
        },
        "shutdown" => Request::Shutdown {
            reference: required(raw.reference)?,
        },
        _ => return Err(ErrorCode::UnknownCommand),
    };

    Ok(request)
}

fn required(field: Option<String>) -> Result<String, ErrorCode> {
    field.ok_or(ErrorCode::ParseError)
}
