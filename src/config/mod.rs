// src/config/mod.rs

//! Configuration loading and validation for engine-supervisor.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate the raw values and turn them into [`SupervisorSettings`]
//!   (`validate.rs`).
//!
//! A config file is optional; without one the supervisor runs on
//! [`SupervisorSettings::default`].

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{RawConfigFile, SupervisorSection, SupervisorSettings};
pub use validate::{parse_duration, validate_config};
