use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Uniform JSON response body returned by every resource handler.
///
/// `data` and `error` are omitted from the wire form when absent; a handler
/// that reports "found nothing" sets `data` to `Some(Value::Null)` instead.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self { success: true, message: message.into(), data: Some(data), error: None }
    }
}

impl Envelope<()> {
    /// Success without a payload (e.g. order placed).
    pub fn ack(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into(), data: None, error: None }
    }

    pub fn failure(message: impl Into<String>, error: Option<String>) -> Self {
        Self { success: false, message: message.into(), data: None, error }
    }
}
