//! Request and reply envelopes
//!
//! ```json
//! {"id": "cb7", "action": "watchHeading", "args": [50, 5]}
//! {"id": "cb7", "status": "noResult", "keepAlive": true}
//! {"id": "cb7", "status": "ok", "payload": {"magneticHeading": 91.2, ...}, "keepAlive": true}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::BridgeError;

/// One action invocation from the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Host callback id, echoed on every reply
    pub id: String,
    /// Action name
    pub action: String,
    /// Positional arguments
    #[serde(default)]
    pub args: Vec<Value>,
}

impl Request {
    /// Request without arguments
    pub fn new(id: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            action: action.into(),
            args: Vec::new(),
        }
    }

    /// Append a positional argument
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }
}

/// Outcome carried by a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReplyStatus {
    /// Success; payload holds the result
    Ok,
    /// Failure; payload holds `{code, message}`
    Error,
    /// Acknowledged, results follow on the same callback
    NoResult,
}

/// One answer to a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    /// Id of the request being answered
    pub id: String,
    /// Outcome
    pub status: ReplyStatus,
    /// Result or error object
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub payload: Value,
    /// More replies will follow for this id
    #[serde(default)]
    pub keep_alive: bool,
}

impl Reply {
    /// Terminal success
    pub fn ok(id: impl Into<String>, payload: Value) -> Self {
        Self {
            id: id.into(),
            status: ReplyStatus::Ok,
            payload,
            keep_alive: false,
        }
    }

    /// Terminal failure
    pub fn error(id: impl Into<String>, error: &BridgeError) -> Self {
        let payload = serde_json::to_value(error.payload()).unwrap_or(Value::Null);
        Self {
            id: id.into(),
            status: ReplyStatus::Error,
            payload,
            keep_alive: false,
        }
    }

    /// Watch acknowledgement
    pub fn no_result(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: ReplyStatus::NoResult,
            payload: Value::Null,
            keep_alive: true,
        }
    }

    /// Mark the callback as staying open
    pub fn keep_alive(mut self) -> Self {
        self.keep_alive = true;
        self
    }

    /// True for the last reply a request will get
    pub fn is_terminal(&self) -> bool {
        !self.keep_alive
    }
}
