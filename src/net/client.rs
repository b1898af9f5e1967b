use crate::{
    net::{
        CallRequest, ErrorBody, FailureKind, MethodInfo, TcpRequest, TcpResponse, CALL_PATH,
        METHODS_PATH, SIGNATURES_PATH,
    },
    Method, MethodName, Provides, Service,
};
use async_bincode::{tokio::AsyncBincodeStream, AsyncDestination};
use futures::{future::BoxFuture, SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{marker::PhantomData, net::SocketAddr};
use thiserror::Error;
use tokio::{io::BufStream, net::TcpStream};
use tracing::debug;

/// Carries one untyped call to a server and brings back its output.
pub trait Transport: Send + Sync {
    fn call_raw<'a>(
        &'a self,
        method: &'a str,
        input: Value,
    ) -> BoxFuture<'a, Result<Value, ClientError>>;

    /// Names of the methods the server has registered.
    fn methods(&self) -> BoxFuture<'_, Result<Vec<String>, ClientError>>;

    /// Registered methods with their input and output type names.
    fn signatures(&self) -> BoxFuture<'_, Result<Vec<MethodInfo>, ClientError>>;
}

/// Typed client for service `S`.
///
/// [`call`](Client::call) only accepts methods `S` declares, takes exactly
/// their input type and returns their output type. Only the service's type
/// declarations are needed to build one.
pub struct Client<S, T> {
    transport: T,
    _service: PhantomData<fn() -> S>,
}

impl<S: Service, T: Transport> Client<S, T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            _service: PhantomData,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn call<M>(&self, input: M::Input) -> Result<M::Output, ClientError>
    where
        M: Method,
        S: Provides<M>,
    {
        let input = serde_json::to_value(input).map_err(ClientError::Encode)?;
        debug!(service = S::NAME, method = M::NAME, "calling");
        let output = self.transport.call_raw(M::NAME, input).await?;
        serde_json::from_value(output).map_err(ClientError::Decode)
    }

    /// Untyped call, still restricted to the names `S` declares.
    pub async fn call_by_name(
        &self,
        method: S::MethodName,
        input: Value,
    ) -> Result<Value, ClientError> {
        debug!(service = S::NAME, %method, "calling by name");
        self.transport.call_raw(method.as_str(), input).await
    }

    pub async fn methods(&self) -> Result<Vec<String>, ClientError> {
        self.transport.methods().await
    }

    pub async fn signatures(&self) -> Result<Vec<MethodInfo>, ClientError> {
        self.transport.signatures().await
    }
}

impl<S: Service> Client<S, HttpTransport> {
    pub fn http(base_url: &str) -> Self {
        Self::new(HttpTransport::new(base_url))
    }
}

impl<S: Service> Client<S, TcpTransport> {
    pub fn tcp(addr: SocketAddr) -> Self {
        Self::new(TcpTransport(addr))
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http transport: {0}")]
    Http(#[from] reqwest::Error),

    #[error("tcp transport: {0}")]
    Tcp(String),

    #[error("server responded with status {status}")]
    Status { status: u16 },

    #[error("{kind}: {message}")]
    Remote { kind: FailureKind, message: String },

    #[error("encoding input: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("decoding output: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ClientError {
    /// Failure kind reported by the server, if the server got that far.
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            ClientError::Remote { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl From<ErrorBody> for ClientError {
    fn from(ErrorBody { kind, message }: ErrorBody) -> Self {
        ClientError::Remote { kind, message }
    }
}

/// JSON over `POST /rpc`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status {
                status: response.status().as_u16(),
            });
        }
        Ok(response.json().await?)
    }

    async fn post_call(&self, request: CallRequest) -> Result<Value, ClientError> {
        let url = format!("{}{CALL_PATH}", self.base_url);
        let response = self.http.post(url).json(&request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.bytes().await?;
        Err(match serde_json::from_slice::<ErrorBody>(&body) {
            Ok(body) => body.into(),
            Err(_) => ClientError::Status {
                status: status.as_u16(),
            },
        })
    }
}

impl Transport for HttpTransport {
    fn call_raw<'a>(
        &'a self,
        method: &'a str,
        input: Value,
    ) -> BoxFuture<'a, Result<Value, ClientError>> {
        let request = CallRequest {
            method: method.to_owned(),
            input,
        };
        Box::pin(self.post_call(request))
    }

    fn methods(&self) -> BoxFuture<'_, Result<Vec<String>, ClientError>> {
        Box::pin(self.get_json::<Vec<String>>(METHODS_PATH))
    }

    fn signatures(&self) -> BoxFuture<'_, Result<Vec<MethodInfo>, ClientError>> {
        Box::pin(self.get_json::<Vec<MethodInfo>>(SIGNATURES_PATH))
    }
}

/// Bincode frames over a TCP connection opened per request.
#[derive(Debug, Clone, Copy)]
pub struct TcpTransport(pub SocketAddr);

type TcpClientStream = AsyncBincodeStream<BufStream<TcpStream>, TcpResponse, TcpRequest, AsyncDestination>;

impl TcpTransport {
    async fn connect(&self) -> Result<TcpClientStream, ClientError> {
        let sock = TcpStream::connect(self.0)
            .await
            .map_err(|e| ClientError::Tcp(e.to_string()))?;
        let sock = BufStream::new(sock);
        Ok(AsyncBincodeStream::from(sock).for_async())
    }

    async fn send_recv(&self, req: TcpRequest) -> Result<TcpResponse, ClientError> {
        let mut sock = self.connect().await?;
        sock.send(req)
            .await
            .map_err(|e| ClientError::Tcp(e.to_string()))?;
        sock.next()
            .await
            .ok_or_else(|| ClientError::Tcp("No response from server".to_owned()))?
            .map_err(|e| ClientError::Tcp(e.to_string()))
    }

    pub async fn ping(&self) -> Result<(), ClientError> {
        match self.send_recv(TcpRequest::Ping).await? {
            TcpResponse::Pong => Ok(()),
            other => Err(unexpected(&other)),
        }
    }

    async fn list_methods(&self) -> Result<Vec<String>, ClientError> {
        match self.send_recv(TcpRequest::Methods).await? {
            TcpResponse::Methods(names) => Ok(names),
            other => Err(unexpected(&other)),
        }
    }

    async fn list_signatures(&self) -> Result<Vec<MethodInfo>, ClientError> {
        match self.send_recv(TcpRequest::Signatures).await? {
            TcpResponse::Signatures(infos) => Ok(infos),
            other => Err(unexpected(&other)),
        }
    }

    async fn call_json(&self, method: &str, input: Value) -> Result<Value, ClientError> {
        let input = serde_json::to_string(&input).map_err(ClientError::Encode)?;
        let req = TcpRequest::Call {
            method: method.to_owned(),
            input,
        };
        match self.send_recv(req).await? {
            TcpResponse::Call(Ok(output)) => {
                serde_json::from_str(&output).map_err(ClientError::Decode)
            }
            TcpResponse::Call(Err(body)) => Err(body.into()),
            other => Err(unexpected(&other)),
        }
    }
}

impl Transport for TcpTransport {
    fn call_raw<'a>(
        &'a self,
        method: &'a str,
        input: Value,
    ) -> BoxFuture<'a, Result<Value, ClientError>> {
        Box::pin(self.call_json(method, input))
    }

    fn methods(&self) -> BoxFuture<'_, Result<Vec<String>, ClientError>> {
        Box::pin(self.list_methods())
    }

    fn signatures(&self) -> BoxFuture<'_, Result<Vec<MethodInfo>, ClientError>> {
        Box::pin(self.list_signatures())
    }
}

fn unexpected(response: &TcpResponse) -> ClientError {
    ClientError::Tcp(format!("unexpected response {response:?}"))
}
