use crate::{
    dispatch::DispatchError,
    net::{CallRequest, ErrorBody, FailureKind, TcpRequest, TcpResponse, MethodInfo, CALL_PATH, METHODS_PATH, SIGNATURES_PATH},
    registry::Registry,
    Service,
};
use async_bincode::tokio::AsyncBincodeStream;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::{SinkExt, StreamExt};
use std::{io, sync::Arc, time::Duration};
use tokio::{io::BufStream, net::TcpListener, task, time};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

/// HTTP routes for `registry`: `POST /rpc`, `GET /rpc/methods` and
/// `GET /rpc/signatures`.
pub fn router<S: Service>(registry: Arc<Registry<S>>) -> Router {
    Router::new()
        .route(CALL_PATH, post(call::<S>))
        .route(METHODS_PATH, get(methods::<S>))
        .route(SIGNATURES_PATH, get(signatures::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(registry)
}

async fn call<S: Service>(
    State(registry): State<Arc<Registry<S>>>,
    request: Result<Json<CallRequest>, JsonRejection>,
) -> Response {
    let Json(CallRequest { method, input }) = match request {
        Ok(request) => request,
        Err(rejection) => {
            warn!(%rejection, "rejecting malformed call request");
            let body = ErrorBody::new(FailureKind::MalformedRequest, rejection.body_text());
            return body.into_response();
        }
    };

    debug!(service = S::NAME, %method, "dispatching http call");
    match registry.dispatch(&method, input).await {
        Ok(output) => Json(output).into_response(),
        Err(err) => {
            log_failure(&method, &err);
            err.into_response()
        }
    }
}

async fn methods<S: Service>(State(registry): State<Arc<Registry<S>>>) -> Json<Vec<&'static str>> {
    Json(registry.method_names().collect())
}

async fn signatures<S: Service>(State(registry): State<Arc<Registry<S>>>) -> Json<Vec<MethodInfo>> {
    Json(registry.signatures())
}

impl IntoResponse for ErrorBody {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.kind.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        ErrorBody::from(self).into_response()
    }
}

impl From<DispatchError> for ErrorBody {
    fn from(err: DispatchError) -> Self {
        ErrorBody::new(err.kind(), err.to_string())
    }
}

fn log_failure(method: &str, err: &DispatchError) {
    match err {
        DispatchError::Implementation(source) => {
            error!(%method, error = %source, "method implementation failed");
        }
        DispatchError::UnknownMethod(_) | DispatchError::ValidationFailed(_) => {
            warn!(%method, error = %err, "rejected call");
        }
    }
}

/// Serves `registry` over length-prefixed bincode frames, any number of
/// requests per connection.
///
/// Failed accepts are logged and retried, so this only returns an error if
/// the listener's address can't be read at startup.
pub async fn serve_tcp<S: Service>(registry: Arc<Registry<S>>, listener: TcpListener) -> io::Result<()> {
    info!(service = S::NAME, addr = %listener.local_addr()?, "serving tcp");
    loop {
        let (sock, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                match accept_backoff(&e) {
                    Some(delay) => {
                        warn!(error = %e, ?delay, "tcp accept failed, backing off");
                        time::sleep(delay).await;
                    }
                    None => debug!(error = %e, "tcp connection dropped before accept"),
                }
                continue;
            }
        };
        let registry = Arc::clone(&registry);
        let mut sock =
            AsyncBincodeStream::<_, TcpRequest, TcpResponse, _>::from(BufStream::new(sock))
                .for_async();

        task::spawn(async move {
            while let Some(request) = sock.next().await {
                let request = match request {
                    Ok(request) => request,
                    Err(e) => {
                        warn!(%peer, error = %e, "dropping tcp connection on bad frame");
                        break;
                    }
                };
                let response = handle_tcp_request(&registry, request).await;
                if let Err(e) = sock.send(response).await {
                    warn!(%peer, error = %e, "failed to send tcp response");
                    break;
                }
            }
        });
    }
}

const ACCEPT_BACKOFF: Duration = Duration::from_secs(1);

/// How long to wait before accepting again. Errors that only concern the
/// one incoming connection retry at once; anything else (typically running
/// out of file descriptors) waits [`ACCEPT_BACKOFF`].
fn accept_backoff(err: &io::Error) -> Option<Duration> {
    match err.kind() {
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::ConnectionReset => None,
        _ => Some(ACCEPT_BACKOFF),
    }
}

async fn handle_tcp_request<S: Service>(registry: &Registry<S>, request: TcpRequest) -> TcpResponse {
    match request {
        TcpRequest::Ping => TcpResponse::Pong,
        TcpRequest::Methods => {
            TcpResponse::Methods(registry.method_names().map(str::to_owned).collect())
        }
        TcpRequest::Signatures => TcpResponse::Signatures(registry.signatures()),
        TcpRequest::Call { method, input } => {
            TcpResponse::Call(call_json(registry, &method, &input).await)
        }
    }
}

async fn call_json<S: Service>(
    registry: &Registry<S>,
    method: &str,
    input: &str,
) -> Result<String, ErrorBody> {
    let input = serde_json::from_str(input).map_err(|e| {
        ErrorBody::new(FailureKind::MalformedRequest, format!("input is not JSON: {e}"))
    })?;

    debug!(service = S::NAME, %method, "dispatching tcp call");
    let output = registry.dispatch(method, input).await.map_err(|err| {
        log_failure(method, &err);
        ErrorBody::from(err)
    })?;

    serde_json::to_string(&output)
        .map_err(|e| ErrorBody::new(FailureKind::ImplementationError, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_errors_are_retried() {
        for kind in [
            io::ErrorKind::ConnectionAborted,
            io::ErrorKind::ConnectionReset,
            io::ErrorKind::ConnectionRefused,
        ] {
            assert_eq!(accept_backoff(&io::Error::from(kind)), None, "{kind:?}");
        }

        // EMFILE
        let too_many_files = io::Error::from_raw_os_error(24);
        assert_eq!(accept_backoff(&too_many_files), Some(ACCEPT_BACKOFF));
        assert_eq!(
            accept_backoff(&io::Error::new(io::ErrorKind::Other, "out of memory")),
            Some(ACCEPT_BACKOFF)
        );
    }
}
