//! Tests for logging configuration.

use super::*;

#[test]
fn test_default_threshold_is_warn() {
    let config = LoggingConfig::default();

    assert_eq!(config.level, "warn");
    assert!(!config.json_format);
    assert!(config.file_path.is_none());
}

#[test]
fn test_invalid_level_is_rejected() {
    if std::env::var_os("RUST_LOG").is_some() {
        return;
    }

    let config = LoggingConfig {
        level: "sqs_async=loud".to_string(),
        ..LoggingConfig::default()
    };

    assert!(matches!(
        config.filter(),
        Err(ConfigurationError::Invalid { .. })
    ));
}

#[test]
fn test_unwritable_log_file_is_rejected() {
    let config = LoggingConfig {
        file_path: Some(PathBuf::from("/nonexistent-directory/sqs_async.log")),
        ..LoggingConfig::default()
    };

    assert!(matches!(
        init_logging(&config),
        Err(ConfigurationError::Invalid { .. })
    ));
}

#[test]
fn test_init_writes_to_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sqs_async.log");
    let config = LoggingConfig {
        level: "error".to_string(),
        json_format: false,
        file_path: Some(path.clone()),
    };

    init_logging(&config).unwrap();
    tracing::error!("queue unreachable");

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("queue unreachable"));

    assert!(
        init_logging(&config).is_err(),
        "A second global subscriber must be rejected"
    );
}
