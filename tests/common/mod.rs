#![allow(dead_code)]

pub use engine_supervisor_test_utils::builders;
pub use engine_supervisor_test_utils::{init_tracing, parse_response, parse_responses, with_timeout};

use std::time::Duration;

use engine_supervisor::config::SupervisorSettings;

/// Default settings with a grace period short enough for tests.
pub fn quick_settings() -> SupervisorSettings {
    SupervisorSettings::default().with_grace_period(Duration::from_millis(50))
}
