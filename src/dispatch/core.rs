// src/dispatch/core.rs

use tracing::{debug, info, warn};

use crate::config::SupervisorSettings;
use crate::process::channel::{self, Framing};
use crate::process::{LaunchRequest, Launcher, monitor, shutdown};
use crate::protocol::{ErrorCode, Request, Response, parse_request};
use crate::registry::Registry;

/// Routes requests to the registry and process components.
///
/// Each call runs to completion before returning; there is never more than
/// one command in flight.
pub struct Dispatcher<L: Launcher> {
    launcher: L,
    registry: Registry<L::Process>,
    framing: Framing,
    settings: SupervisorSettings,
}

impl<L: Launcher> Dispatcher<L> {
    pub fn new(launcher: L, settings: SupervisorSettings) -> Self {
        Self {
            launcher,
            registry: Registry::new(&settings.reference_prefix),
            framing: settings.framing(),
            settings,
        }
    }

    pub fn registry(&self) -> &Registry<L::Process> {
        &self.registry
    }

    /// Handle one raw input line. Blank lines produce no response.
    pub async fn handle_line(&mut self, line: &str) -> Option<Response> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let response = match parse_request(line) {
            Ok(request) => self.handle(request).await,
            Err(code) => {
                debug!(%line, error = %code, "rejected request line");
                Response::failure(code)
            }
        };
        Some(response)
    }

    /// Execute one parsed request.
    pub async fn handle(&mut self, request: Request) -> Response {
        debug!(cmd = request.name(), "dispatching request");
        match request {
            Request::Create(launch) => self.create(&launch),
            Request::Start { reference } => self.start(&reference),
            Request::Iteration { reference } => self.iteration(&reference),
            Request::SendMessage { reference, msg } => self.send_message(&reference, &msg).await,
            Request::Shutdown { reference } => self.shutdown(&reference).await,
        }
    }

    fn create(&mut self, launch: &LaunchRequest) -> Response {
        match self.launcher.launch(launch) {
            Ok(process) => {
                let reference = self.registry.register(process);
                info!(reference = %reference, program = %launch.program, "engine instance created");
                Response::created(reference)
            }
            Err(e) => {
                warn!(program = %launch.program, error = %e, "failed to launch engine");
                Response::failure(ErrorCode::from(&e))
            }
        }
    }

    /// The child has been running since `create`; this only confirms the
    /// reference is live.
    fn start(&self, reference: &str) -> Response {
        if self.registry.contains(reference) {
            Response::ack()
        } else {
            Response::failure(ErrorCode::InvalidRef)
        }
    }

    fn iteration(&mut self, reference: &str) -> Response {
        let Some(handle) = self.registry.lookup_mut(reference) else {
            return Response::failure(ErrorCode::InvalidRef);
        };

        match monitor::poll(handle) {
            Ok(liveness) => Response::liveness(liveness),
            Err(e) => {
                warn!(reference = %reference, error = %e, "liveness check failed");
                Response::failure(ErrorCode::from(&e))
            }
        }
    }

    async fn send_message(&mut self, reference: &str, msg: &str) -> Response {
        let Some(handle) = self.registry.lookup_mut(reference) else {
            return Response::failure(ErrorCode::InvalidRef);
        };

        match channel::send(handle, &self.framing, msg).await {
            Ok(()) => Response::ack(),
            Err(e) => {
                info!(reference = %reference, error = %e, "message undeliverable");
                Response::failure(ErrorCode::from(&e))
            }
        }
    }

    async fn shutdown(&mut self, reference: &str) -> Response {
        let grace = self.settings.grace_period;
        match shutdown::shutdown(&mut self.registry, reference, &self.framing, grace).await {
            Ok(_) => Response::ack(),
            Err(e) => Response::failure(ErrorCode::from(&e)),
        }
    }

    /// Stop every child still in the registry. Run once, after the input
    /// loop has ended.
    pub async fn teardown(&mut self) {
        let handles = self.registry.drain();
        if handles.is_empty() {
            return;
        }

        info!(count = handles.len(), "tearing down remaining engine processes");
        for handle in handles {
            shutdown::terminate(handle, self.settings.grace_period).await;
        }
    }
}
