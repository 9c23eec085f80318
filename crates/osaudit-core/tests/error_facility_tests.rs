use osaudit_core::errors::{ExError, ExErrorKind, OsAuditError};
use osaudit_core_types::RunId;

#[test]
fn test_stream_open_is_transport_failure() {
    let err = OsAuditError::StreamOpen {
        path: "missing.ndjson".to_string(),
        message: "No such file or directory".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::StreamUnreadable);
    assert_eq!(ex_err.code(), "ERR_STREAM_UNREADABLE");
    assert_eq!(ex_err.path(), Some("missing.ndjson"));
    assert_eq!(ex_err.line(), None);
    assert!(!ex_err.kind().is_parse_failure());
}

#[test]
fn test_invalid_json_carries_line() {
    let err = OsAuditError::InvalidJson {
        path: "current.ndjson".to_string(),
        line: 12,
        message: "expected `,` or `}`".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::InvalidRecord);
    assert_eq!(ex_err.code(), "ERR_INVALID_RECORD");
    assert_eq!(ex_err.line(), Some(12));
    assert!(ex_err.message().contains("invalid JSON at line 12"));
    assert!(ex_err.kind().is_parse_failure());
}

#[test]
fn test_not_an_object_and_utf8_are_invalid_records() {
    let cases = [
        OsAuditError::NotAnObject {
            path: "a.ndjson".to_string(),
            line: 2,
        },
        OsAuditError::InvalidUtf8 {
            path: "a.ndjson".to_string(),
            line: 3,
        },
    ];

    for err in cases {
        let ex_err: ExError = err.into();
        assert_eq!(ex_err.kind(), ExErrorKind::InvalidRecord);
    }
}

#[test]
fn test_line_too_long_distinct_from_invalid_record() {
    let err = OsAuditError::LineTooLong {
        path: "big.ndjson".to_string(),
        line: 1,
        limit: 1024 * 1024,
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::LineTooLong);
    assert_eq!(ex_err.code(), "ERR_LINE_TOO_LONG");
    assert_ne!(ex_err.kind(), ExErrorKind::InvalidRecord);
    assert!(ex_err.message().contains("1048576"));
}

#[test]
fn test_invalid_config_conversion() {
    let err = OsAuditError::InvalidConfig {
        source_name: "tables.yaml".to_string(),
        message: "unknown variant `critical`".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::InvalidConfig);
    assert_eq!(ex_err.code(), "ERR_INVALID_CONFIG");
    assert_eq!(ex_err.op(), Some("load_classification_tables"));
    assert_eq!(ex_err.path(), Some("tables.yaml"));
}

#[test]
fn test_output_failure_conversion() {
    let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
    let err: OsAuditError = io.into();

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::Io);
    assert_eq!(ex_err.code(), "ERR_IO");
    assert!(ex_err.message().contains("pipe closed"));
}

#[test]
fn test_ex_error_builder_pattern() {
    let run_id = RunId::new();
    let ex_err = ExError::new(ExErrorKind::InvalidRecord)
        .with_op("read_stream")
        .with_path("baseline.ndjson")
        .with_line(7)
        .with_message("row is not a JSON object")
        .with_run_id(run_id.clone());

    assert_eq!(ex_err.kind(), ExErrorKind::InvalidRecord);
    assert_eq!(ex_err.op(), Some("read_stream"));
    assert_eq!(ex_err.path(), Some("baseline.ndjson"));
    assert_eq!(ex_err.line(), Some(7));
    assert_eq!(ex_err.run_id(), Some(&run_id));
}

#[test]
fn test_ex_error_display() {
    let ex_err = ExError::new(ExErrorKind::StreamUnreadable)
        .with_op("read_stream")
        .with_message("open failed")
        .with_path("x.ndjson");

    assert_eq!(
        ex_err.to_string(),
        "[ERR_STREAM_UNREADABLE] in operation 'read_stream': open failed (path: x.ndjson)"
    );
}
