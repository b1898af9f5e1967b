use crate::{
    net::FailureKind,
    registry::Registry,
    spec::BoxError,
    validate::ValidationErrors,
    Service,
};
use serde_json::Value;
use thiserror::Error;

/// Looks up `name`, validates `raw` against the method's validator and, on
/// success, runs its implementation.
///
/// Steps run strictly in that order. The implementation is never invoked for
/// input that fails validation, and its own failures are returned untouched
/// as [`DispatchError::Implementation`].
pub async fn dispatch<S: Service>(
    registry: &Registry<S>,
    name: &str,
    raw: Value,
) -> Result<Value, DispatchError> {
    let method = registry
        .lookup(name)
        .ok_or_else(|| DispatchError::UnknownMethod(name.to_owned()))?;
    let pending = method.prepare(raw).map_err(DispatchError::ValidationFailed)?;
    pending.run().await.map_err(DispatchError::Implementation)
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Unrecognized method name {0}")]
    UnknownMethod(String),

    #[error("invalid input: {0}")]
    ValidationFailed(ValidationErrors),

    #[error("method failed: {0}")]
    Implementation(#[source] BoxError),
}

impl DispatchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            DispatchError::UnknownMethod(_) => FailureKind::UnknownMethod,
            DispatchError::ValidationFailed(_) => FailureKind::ValidationFailed,
            DispatchError::Implementation(_) => FailureKind::ImplementationError,
        }
    }
}
