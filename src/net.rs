//! Wire formats shared by the server and client transports.
//!
//! HTTP carries [`CallRequest`] as a JSON body on `POST /rpc` and answers
//! with the bare output JSON on success, or an [`ErrorBody`] with a
//! kind-specific status on failure. TCP carries [`TcpRequest`] /
//! [`TcpResponse`] as length-prefixed bincode frames.

#[cfg(feature = "client")]
pub mod client;
#[cfg(feature = "server")]
pub mod server;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Path of the call endpoint.
pub const CALL_PATH: &str = "/rpc";

/// Path of the method listing endpoint.
pub const METHODS_PATH: &str = "/rpc/methods";

/// Path of the endpoint listing each method with its input and output types.
pub const SIGNATURES_PATH: &str = "/rpc/signatures";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CallRequest {
    pub method: String,
    #[serde(default)]
    pub input: Value,
}

/// A registered method and the Rust types it takes and returns.
///
/// Type names come from [`std::any::type_name`] and are meant for people
/// reading them, not for matching on.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    pub name: String,
    pub input: String,
    pub output: String,
}

/// Body of every non-success response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub kind: FailureKind,
    pub message: String,
}

impl ErrorBody {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The request was not a call request at all.
    MalformedRequest,
    UnknownMethod,
    ValidationFailed,
    ImplementationError,
}

impl FailureKind {
    /// HTTP status a failure of this kind is reported with.
    pub const fn status_code(self) -> u16 {
        match self {
            FailureKind::MalformedRequest => 400,
            FailureKind::UnknownMethod => 404,
            FailureKind::ValidationFailed => 422,
            FailureKind::ImplementationError => 500,
        }
    }

    fn name(self) -> &'static str {
        use FailureKind::*;
        match self {
            MalformedRequest => "malformed request",
            UnknownMethod => "unknown method",
            ValidationFailed => "validation failed",
            ImplementationError => "implementation error",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Frames sent by a TCP client. Inputs travel as JSON text since bincode
/// cannot carry a self-describing value.
#[cfg(any(feature = "server", feature = "client"))]
#[derive(Serialize, Deserialize, Debug)]
pub(crate) enum TcpRequest {
    Ping,
    Methods,
    Signatures,
    Call { method: String, input: String },
}

#[cfg(any(feature = "server", feature = "client"))]
#[derive(Serialize, Deserialize, Debug)]
pub(crate) enum TcpResponse {
    Pong,
    Methods(Vec<String>),
    Signatures(Vec<MethodInfo>),
    Call(Result<String, ErrorBody>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn call_request_input_defaults_to_null() {
        let request: CallRequest = serde_json::from_value(json!({"method": "ping"})).unwrap();
        assert_eq!(request.input, Value::Null);
    }

    #[test]
    fn error_body_uses_snake_case_kinds() {
        let body = ErrorBody::new(FailureKind::UnknownMethod, "Unrecognized method name x");
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"kind": "unknown_method", "message": "Unrecognized method name x"})
        );
    }

    #[test]
    fn every_kind_has_a_distinct_status() {
        let kinds = [
            FailureKind::MalformedRequest,
            FailureKind::UnknownMethod,
            FailureKind::ValidationFailed,
            FailureKind::ImplementationError,
        ];
        let mut codes: Vec<_> = kinds.iter().map(|k| k.status_code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
    }
}
