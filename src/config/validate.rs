// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{RawConfigFile, SupervisorSection, SupervisorSettings};
use crate::errors::{Result, SupervisorError};

impl TryFrom<RawConfigFile> for SupervisorSettings {
    type Error = SupervisorError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;
        let section = raw.supervisor;
        let grace_period =
            parse_duration(&section.grace_period).map_err(SupervisorError::ConfigError)?;
        Ok(SupervisorSettings {
            grace_period,
            reference_prefix: section.reference_prefix,
            message_prefix: section.message_prefix,
            quit_token: section.quit_token,
        })
    }
}

/// Check a raw config for values the supervisor cannot work with.
pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    validate_grace_period(&cfg.supervisor)?;
    validate_reference_prefix(&cfg.supervisor)?;
    validate_framing(&cfg.supervisor)?;
    Ok(())
}

fn validate_grace_period(section: &SupervisorSection) -> Result<()> {
    parse_duration(&section.grace_period).map_err(|e| {
        SupervisorError::ConfigError(format!("[supervisor].grace_period: {e}"))
    })?;
    Ok(())
}

fn validate_reference_prefix(section: &SupervisorSection) -> Result<()> {
    if section.reference_prefix.is_empty() {
        return Err(SupervisorError::ConfigError(
            "[supervisor].reference_prefix must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_framing(section: &SupervisorSection) -> Result<()> {
    if section.quit_token.is_empty() {
        return Err(SupervisorError::ConfigError(
            "[supervisor].quit_token must not be empty".to_string(),
        ));
    }

    for (field, value) in [
        ("message_prefix", &section.message_prefix),
        ("quit_token", &section.quit_token),
    ] {
        if value.contains(['\n', '\r']) {
            return Err(SupervisorError::ConfigError(format!(
                "[supervisor].{field} must not contain line breaks"
            )));
        }
    }

    Ok(())
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{}' is too large", s))
}
