//! Tests for error types

use abtest_engine::experiment::ExperimentStatus;
use abtest_engine::Error;

#[test]
fn test_invalid_experiment_error() {
    let error = Error::InvalidExperiment("experiment has no variants".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Invalid experiment definition"));
    assert!(error_str.contains("experiment has no variants"));
    assert!(error_str.contains("at most one control"));
}

#[test]
fn test_invalid_transition_error() {
    let error = Error::InvalidTransition {
        from: ExperimentStatus::Completed,
        to: ExperimentStatus::Running,
    };
    let error_str = format!("{error}");
    assert_eq!(error_str, "Invalid status transition: completed -> running");
}

#[test]
fn test_store_error() {
    let error = Error::StoreError("disk full".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Assignment store error"));
    assert!(error_str.contains("disk full"));
}

#[test]
fn test_sink_error() {
    let error = Error::SinkError("collector offline".to_string());
    assert!(format!("{error}").contains("Event sink error"));
}

#[test]
fn test_io_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error: Error = io_error.into();
    let error_str = format!("{error}");
    assert!(error_str.contains("IO error"));
}

#[test]
fn test_serialization_error_conversion() {
    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error: Error = json_error.into();
    assert!(format!("{error}").contains("Serialization error"));
}

#[test]
fn test_other_error() {
    let error = Error::Other("custom error message".to_string());
    let error_str = format!("{error}");
    assert_eq!(error_str, "custom error message");
}

#[test]
fn test_error_debug() {
    let error = Error::StoreError("x".to_string());
    let debug_str = format!("{error:?}");
    assert!(debug_str.contains("StoreError"));
}

#[test]
fn test_result_type_alias() {
    // Test that Result<T> can be used
    #[allow(clippy::unnecessary_wraps)]
    fn returns_result() -> abtest_engine::Result<i32> {
        Ok(42)
    }

    let result = returns_result();
    assert!(result.is_ok());
    assert_eq!(result.unwrap(), 42);
}

#[test]
fn test_result_type_alias_error() {
    fn returns_error() -> abtest_engine::Result<i32> {
        Err(Error::Other("test error".to_string()))
    }

    let result = returns_error();
    assert!(result.is_err());
}
