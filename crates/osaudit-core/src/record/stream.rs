//! NDJSON record stream reader.
//!
//! A stream either reads completely or fails as a whole: the first
//! malformed line aborts the read and no partial result is returned.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::time::Instant;

use serde_json::Value;

use crate::errors::{OsAuditError, Result};
use crate::record::model::Record;
use crate::{log_op_end, log_op_error, log_op_start};

/// Maximum size of a single line, excluding its terminator
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

const MAX_ERROR_MESSAGE_CHARS: usize = 200;

/// Read every record from the NDJSON file at `path`.
///
/// # Errors
///
/// - `StreamOpen` / `StreamRead` when the file cannot be opened or read
/// - `InvalidJson`, `NotAnObject`, `InvalidUtf8`, `LineTooLong` for the
///   first malformed non-blank line, carrying its 1-based line number
pub fn read_stream(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let source = path.display().to_string();

    log_op_start!("read_stream", source = %source);
    let start = Instant::now();

    let result = File::open(path)
        .map_err(|e| OsAuditError::StreamOpen {
            path: source.clone(),
            message: e.to_string(),
        })
        .and_then(|file| read_records(BufReader::new(file), &source))
        .map_err(|e| {
            log_op_error!(
                "read_stream",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                source = %source
            );
            e
        })?;

    log_op_end!(
        "read_stream",
        duration_ms = start.elapsed().as_millis() as u64,
        source = %source,
        record_count = result.len()
    );

    Ok(result)
}

/// Read every record from an already-open source.
///
/// `source` names the input in error messages.
///
/// # Errors
///
/// Same as [`read_stream`], minus `StreamOpen`.
pub fn read_records<R: BufRead>(mut reader: R, source: &str) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    let mut buf = Vec::new();
    let mut line = 0usize;

    loop {
        buf.clear();
        // Room for the limit plus a CRLF terminator.
        let read = (&mut reader)
            .take(MAX_LINE_BYTES as u64 + 2)
            .read_until(b'\n', &mut buf)
            .map_err(|e| OsAuditError::StreamRead {
                path: source.to_string(),
                message: e.to_string(),
            })?;
        if read == 0 {
            break;
        }
        line += 1;

        if content_len(&buf) > MAX_LINE_BYTES {
            return Err(OsAuditError::LineTooLong {
                path: source.to_string(),
                line,
                limit: MAX_LINE_BYTES,
            });
        }

        let text = std::str::from_utf8(&buf).map_err(|_| OsAuditError::InvalidUtf8 {
            path: source.to_string(),
            line,
        })?;
        let text = text.trim();
        if text.is_empty() {
            continue;
        }

        let value: Value = serde_json::from_str(text).map_err(|e| OsAuditError::InvalidJson {
            path: source.to_string(),
            line,
            message: truncate_message(&e.to_string()),
        })?;

        match value {
            Value::Object(fields) => records.push(Record::from_object(fields)),
            _ => {
                return Err(OsAuditError::NotAnObject {
                    path: source.to_string(),
                    line,
                })
            }
        }
    }

    Ok(records)
}

/// Line length without its `\n` or `\r\n` terminator
fn content_len(buf: &[u8]) -> usize {
    let content = buf.strip_suffix(b"\n").unwrap_or(buf);
    content.strip_suffix(b"\r").unwrap_or(content).len()
}

/// First line of `message`, capped at a fixed number of characters
fn truncate_message(message: &str) -> String {
    let first = message.lines().next().unwrap_or_default();
    first.chars().take(MAX_ERROR_MESSAGE_CHARS).collect()
}
