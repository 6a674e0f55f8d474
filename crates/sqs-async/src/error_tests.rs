//! Tests for error types.

use super::*;

fn service_error(status: u16, body: &str) -> ServiceError {
    ServiceError {
        status,
        code: "AWS.SimpleQueueService.NonExistentQueue".to_string(),
        message: "The specified queue does not exist".to_string(),
        request_id: Some("42d59b56-7407-4c4a-be0f-4c88daeea257".to_string()),
        body: body.to_string(),
    }
}

#[test]
fn test_error_transience() {
    assert!(DispatchError::from(TransportError::new(
        TransportErrorKind::Timeout,
        "timed out"
    ))
    .is_transient());

    assert!(DispatchError::from(service_error(503, "")).is_transient());
    assert!(!DispatchError::from(service_error(400, "")).is_transient());

    assert!(!DispatchError::from(TransportError::new(
        TransportErrorKind::Aborted,
        "task cancelled"
    ))
    .is_transient());

    assert!(!DispatchError::from(ParseError::MissingElement {
        element: "QueueUrl".to_string()
    })
    .is_transient());
}

#[test]
fn test_detail_prefers_body_for_service_errors() {
    let body = "<ErrorResponse><Error><Code>X</Code></Error></ErrorResponse>";
    let error = DispatchError::from(service_error(400, body));

    assert_eq!(error.detail(), body);
    assert_eq!(error.kind(), "service");
}

#[test]
fn test_detail_renders_transport_error() {
    let error = DispatchError::from(TransportError::new(
        TransportErrorKind::Connect,
        "connection refused",
    ));

    assert_eq!(
        error.detail(),
        "Transport error (connect): connection refused"
    );
    assert_eq!(error.kind(), "transport");
}

#[test]
fn test_missing_argument_is_configuration_error() {
    let error = SqsError::missing_argument("queue_name");

    assert!(matches!(
        error,
        SqsError::Configuration(ConfigurationError::MissingArgument { ref argument })
            if argument == "queue_name"
    ));
    assert_eq!(
        error.to_string(),
        "Configuration error: Missing required argument: queue_name"
    );
}
