// tests/config_loading.rs

use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;

use engine_supervisor::cli::CliArgs;
use engine_supervisor::config::{SupervisorSettings, load_and_validate};
use engine_supervisor::errors::SupervisorError;
use engine_supervisor::resolve_settings;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn full_config_is_loaded() {
    let file = config_file(
        r#"
[supervisor]
grace_period = "250ms"
reference_prefix = "engine-"
message_prefix = "APP "
quit_token = "EXIT"
"#,
    );

    let settings = load_and_validate(file.path()).unwrap();
    assert_eq!(settings.grace_period, Duration::from_millis(250));
    assert_eq!(settings.reference_prefix, "engine-");
    assert_eq!(settings.framing().message("x"), b"APP x\n".to_vec());
    assert_eq!(settings.framing().quit(), b"EXIT\n".to_vec());
}

#[test]
fn empty_config_uses_defaults() {
    let file = config_file("");
    assert_eq!(load_and_validate(file.path()).unwrap(), SupervisorSettings::default());
}

#[test]
fn partial_section_keeps_other_defaults() {
    let file = config_file("[supervisor]\ngrace_period = \"2s\"\n");
    let settings = load_and_validate(file.path()).unwrap();

    assert_eq!(settings.grace_period, Duration::from_secs(2));
    assert_eq!(settings.reference_prefix, "godot_");
    assert_eq!(settings.quit_token, "QUIT");
}

#[test]
fn invalid_grace_period_returns_config_error() {
    let file = config_file("[supervisor]\ngrace_period = \"soon\"\n");

    match load_and_validate(file.path()) {
        Err(SupervisorError::ConfigError(msg)) => assert!(msg.contains("grace_period")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn empty_reference_prefix_returns_config_error() {
    let file = config_file("[supervisor]\nreference_prefix = \"\"\n");

    match load_and_validate(file.path()) {
        Err(SupervisorError::ConfigError(msg)) => assert!(msg.contains("reference_prefix")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn malformed_toml_returns_toml_error() {
    let file = config_file("[supervisor\ngrace_period = 1");

    assert!(matches!(
        load_and_validate(file.path()),
        Err(SupervisorError::TomlError(_))
    ));
}

#[test]
fn missing_file_returns_io_error() {
    assert!(matches!(
        load_and_validate("/nonexistent/engine-supervisor.toml"),
        Err(SupervisorError::IoError(_))
    ));
}

#[test]
fn cli_grace_period_overrides_config_file() {
    let file = config_file("[supervisor]\ngrace_period = \"5s\"\nquit_token = \"BYE\"\n");
    let path = file.path().to_string_lossy().to_string();

    let args = CliArgs {
        config: Some(path),
        grace_period: Some(Duration::from_millis(100)),
        log_level: None,
    };

    let settings = resolve_settings(&args).unwrap();
    assert_eq!(settings.grace_period, Duration::from_millis(100));
    assert_eq!(settings.quit_token, "BYE");
}

#[test]
fn no_config_means_defaults() {
    let args = CliArgs {
        config: None,
        grace_period: None,
        log_level: None,
    };
    assert_eq!(resolve_settings(&args).unwrap(), SupervisorSettings::default());
}
