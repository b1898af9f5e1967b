//! Typed RPC without an IDL.
//!
//! A service is declared once as types ([`method!`], [`service!`]). The server
//! pairs each method with a [`Validator`] and an [`Implementation`] in a
//! [`Registry`] and dispatches untyped calls against it; clients project input
//! and output types from the same declarations through [`Client::call`].
//!
//! Without default features only the declaration side is compiled, which is
//! all a crate that publishes a service's types needs.

mod macros;
mod method;
pub mod net;

#[cfg(feature = "server")]
mod dispatch;
#[cfg(feature = "server")]
mod registry;
#[cfg(feature = "server")]
mod spec;
#[cfg(feature = "server")]
pub mod validate;

pub use method::{
    names_are_valid, parse_method_name, InputOf, Method, MethodName, OutputOf, Provides, Service,
    UnknownMethodName,
};
pub use net::{ErrorBody, FailureKind, MethodInfo};

#[cfg(feature = "server")]
pub use dispatch::{dispatch, DispatchError};
#[cfg(feature = "server")]
pub use registry::{Registry, RegistryBuilder, RegistryError};
#[cfg(feature = "server")]
pub use spec::{BoxError, ErasedMethodSpec, Implementation, MethodSpec, PendingCall};
#[cfg(feature = "server")]
pub use validate::{Issue, Schema, ValidationErrors, Validator};

#[cfg(feature = "client")]
pub use net::client::{Client, ClientError, HttpTransport, TcpTransport, Transport};
