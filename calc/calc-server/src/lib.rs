//! Calculator server
//!
//! Pairs the method declarations from `calc-sdk` with validators and
//! implementations, and exposes the resulting registry to the transports.

#![forbid(unsafe_code)]

pub mod config;
mod methods;

pub use config::ServerConfig;
pub use methods::{registry, ArithmeticError};
