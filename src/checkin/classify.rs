//! Failure classification and expiry selection.
//!
//! | Transport outcome | Result            | TTL                        |
//! |-------------------|-------------------|----------------------------|
//! | connect failure   | `ServerError`     | `server_error_secs`        |
//! | 2xx               | `Success`         | `success_secs`             |
//! | 422               | `ValidationError` | `validation_secs`          |
//! | 429               | `RateLimited`     | `Retry-After` (seconds)    |
//! | 5xx               | `ServerError`     | `server_error_secs`        |
//! | anything else     | `UnhandledStatus` error, not cached            |

use serde_json::{Map, Value};

use crate::checkin::types::{CheckInError, CheckInOutcome, CheckInResult};
use crate::config::TtlConfig;
use crate::transport::{header_value, Headers, TransportError, TransportResponse};

/// A classified result and how long it may be reused, in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Classified {
    pub result: CheckInResult,
    pub ttl_secs: u64,
}

/// Fold a transport outcome into a result and its cache lifetime.
pub fn classify(
    outcome: Result<TransportResponse, TransportError>,
    ttl: &TtlConfig,
) -> CheckInOutcome<Classified> {
    match outcome {
        Ok(response) => classify_response(response.status, &response.headers, &response.body, ttl),
        Err(TransportError::Connect(reason)) => {
            tracing::warn!(reason = %reason, "Check-in endpoint unreachable");
            Ok(Classified {
                result: CheckInResult::ServerError,
                ttl_secs: ttl.server_error_secs,
            })
        }
        Err(TransportError::Http {
            status,
            headers,
            body,
        }) => classify_response(status, &headers, &body, ttl),
    }
}

fn classify_response(
    status: u16,
    headers: &Headers,
    body: &[u8],
    ttl: &TtlConfig,
) -> CheckInOutcome<Classified> {
    let classified = match status {
        200..=299 => Classified {
            result: CheckInResult::Success {
                data: decode_object(body)?,
            },
            ttl_secs: ttl.success_secs,
        },
        422 => Classified {
            result: CheckInResult::ValidationError {
                errors: validation_errors(body),
            },
            ttl_secs: ttl.validation_secs,
        },
        429 => {
            let ttl_secs = match retry_after(headers) {
                Some(secs) => secs,
                None => {
                    tracing::warn!(
                        fallback_secs = ttl.server_error_secs,
                        "Rate limited without a usable Retry-After header"
                    );
                    ttl.server_error_secs
                }
            };
            Classified {
                result: CheckInResult::RateLimited,
                ttl_secs,
            }
        }
        500..=599 => Classified {
            result: CheckInResult::ServerError,
            ttl_secs: ttl.server_error_secs,
        },
        _ => {
            return Err(CheckInError::UnhandledStatus {
                status,
                body: String::from_utf8_lossy(body).into_owned(),
            })
        }
    };

    Ok(classified)
}

/// Parse a success body. An empty body is an empty object.
fn decode_object(body: &[u8]) -> CheckInOutcome<Map<String, Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(CheckInError::Decode(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(CheckInError::Decode(e.to_string())),
    }
}

/// The `errors` object of a 422 body; empty when absent or malformed.
fn validation_errors(body: &[u8]) -> Map<String, Value> {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|mut value| match value.get_mut("errors").map(Value::take) {
            Some(Value::Object(errors)) => Some(errors),
            _ => None,
        })
        .unwrap_or_default()
}

/// Delta-seconds form of `Retry-After`. HTTP-date values are not honored.
fn retry_after(headers: &Headers) -> Option<u64> {
    header_value(headers, "retry-after").and_then(|value| value.trim().parse().ok())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
