//! Calculator client
//!
//! Calls are typed by the declarations in `calc-sdk`; this crate never sees
//! the server's validators or implementations. Calls the service does not
//! declare are rejected at compile time:
//!
//! ```compile_fail
//! use calc_sdk::{AddInput, AddOutput, Calculator};
//! use typedrpc::{Client, HttpTransport};
//!
//! typedrpc::method! {
//!     pub Multiply = "multiply": AddInput => AddOutput;
//! }
//!
//! async fn multiply(client: &Client<Calculator, HttpTransport>) {
//!     let _ = client.call::<Multiply>(AddInput { augend: 1.0, addend: 2.0 }).await;
//! }
//! ```
//!
//! as is an input of the wrong shape:
//!
//! ```compile_fail
//! use calc_sdk::{Add, Calculator, SubtractInput};
//! use typedrpc::{Client, HttpTransport};
//!
//! async fn add(client: &Client<Calculator, HttpTransport>) {
//!     let _ = client.call::<Add>(SubtractInput { minuend: 1.0, subtrahend: 2.0 }).await;
//! }
//! ```
//!
//! and a method name outside the declared set:
//!
//! ```compile_fail
//! let _ = calc_sdk::CalculatorMethod::Multiply;
//! ```
//!
//! The well-typed call compiles and its output is the projected type:
//!
//! ```no_run
//! use calc_sdk::{Add, AddInput, AddOutput, Calculator};
//! use typedrpc::{Client, HttpTransport};
//!
//! async fn add(client: &Client<Calculator, HttpTransport>) -> AddOutput {
//!     client.call::<Add>(AddInput { augend: 2.0, addend: 2.0 }).await.unwrap()
//! }
//! ```

#![forbid(unsafe_code)]

use anyhow::Context;
use calc_sdk::{Add, AddInput, Calculator, CalculatorMethod, Subtract, SubtractInput};
use clap::{ArgAction, Parser, Subcommand};
use serde_json::Value;
use std::net::SocketAddr;
use tracing::debug;
use typedrpc::{Client, HttpTransport, TcpTransport, Transport};

pub const DEFAULT_URL: &str = "http://127.0.0.1:3000";

/// Call the calculator service
#[derive(Debug, Parser)]
#[command(name = "calc-client")]
pub struct Cli {
    /// Base URL of the HTTP endpoint
    #[arg(long, env = "CALC_URL", default_value = DEFAULT_URL)]
    pub url: String,

    /// Use the TCP transport at this address instead of HTTP
    #[arg(long)]
    pub tcp: Option<SocketAddr>,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum Command {
    /// augend + addend
    Add {
        #[arg(allow_negative_numbers = true)]
        augend: f64,
        #[arg(allow_negative_numbers = true)]
        addend: f64,
    },
    /// minuend - subtrahend
    Subtract {
        #[arg(allow_negative_numbers = true)]
        minuend: f64,
        #[arg(allow_negative_numbers = true)]
        subtrahend: f64,
    },
    /// Call a declared method with raw JSON input
    Call {
        method: CalculatorMethod,
        input: String,
    },
    /// List the methods the server has registered
    Methods,
    /// List the registered methods with their input and output types
    Signatures,
}

/// Runs `cli.command` against the selected transport and returns the
/// server's answer as JSON.
pub async fn run(cli: Cli) -> anyhow::Result<Value> {
    match cli.tcp {
        Some(addr) => {
            debug!(%addr, "using tcp transport");
            execute(&Client::<Calculator, TcpTransport>::tcp(addr), cli.command).await
        }
        None => {
            debug!(url = %cli.url, "using http transport");
            execute(&Client::<Calculator, HttpTransport>::http(&cli.url), cli.command).await
        }
    }
}

async fn execute<T: Transport>(
    client: &Client<Calculator, T>,
    command: Command,
) -> anyhow::Result<Value> {
    let output = match command {
        Command::Add { augend, addend } => {
            let output = client.call::<Add>(AddInput { augend, addend }).await?;
            serde_json::to_value(output)?
        }
        Command::Subtract {
            minuend,
            subtrahend,
        } => {
            let input = SubtractInput {
                minuend,
                subtrahend,
            };
            serde_json::to_value(client.call::<Subtract>(input).await?)?
        }
        Command::Call { method, input } => {
            let input = serde_json::from_str(&input).context("input is not valid JSON")?;
            client.call_by_name(method, input).await?
        }
        Command::Methods => serde_json::to_value(client.methods().await?)?,
        Command::Signatures => serde_json::to_value(client.signatures().await?)?,
    };
    Ok(output)
}
