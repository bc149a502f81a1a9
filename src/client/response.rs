//! Response handling: success bodies and error-message normalization.

use reqwest::StatusCode;
use serde_json::Value;
use tracing::warn;

use crate::error::{Error, GENERIC_FAILURE_MESSAGE, Result};

/// How a successful body is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    #[default]
    Json,
    Text,
}

/// Fields consulted for a readable error, highest precedence first.
const MESSAGE_FIELDS: [&str; 4] = ["detail", "message", "error", "status"];

pub(crate) async fn read_body(
    method: &str,
    path: &str,
    response: reqwest::Response,
) -> Result<Vec<u8>> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        let message = extract_error_message(status, &body);
        warn!(method, path, status = status.as_u16(), %message, "cleaner service rejected request");
        return Err(Error::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(body.to_vec())
}

/// Picks a human-readable message out of an error response body.
///
/// The first present, non-empty value among `detail`, `message`, `error` and
/// `status` wins, otherwise the status reason phrase. A non-string winner, or a
/// body that is not JSON at all, yields [`GENERIC_FAILURE_MESSAGE`].
pub fn extract_error_message(status: StatusCode, body: &[u8]) -> String {
    let Ok(data) = serde_json::from_slice::<Value>(body) else {
        return GENERIC_FAILURE_MESSAGE.to_string();
    };

    let chosen = MESSAGE_FIELDS
        .iter()
        .filter_map(|field| data.get(*field))
        .find(|value| is_truthy(value));

    match chosen {
        Some(Value::String(message)) => message.clone(),
        Some(_) => GENERIC_FAILURE_MESSAGE.to_string(),
        None => status
            .canonical_reason()
            .unwrap_or(GENERIC_FAILURE_MESSAGE)
            .to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
