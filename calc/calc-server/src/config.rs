//! Server configuration, read from the environment over built-in defaults.
//!
//! | variable   | default   |
//! |------------|-----------|
//! | `HOST`     | `0.0.0.0` |
//! | `PORT`     | `3000`    |
//! | `TCP_PORT` | unset (TCP transport disabled) |

use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcp_port: Option<u16>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            tcp_port: None,
        }
    }
}

impl ServerConfig {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Env::raw().only(&["host", "port", "tcp_port"]))
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn tcp_addr(&self) -> Option<SocketAddr> {
        self.tcp_port.map(|port| SocketAddr::new(self.host, port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_without_environment() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            let config = ServerConfig::load()?;
            assert_eq!(config, ServerConfig::default());
            assert_eq!(config.http_addr().port(), DEFAULT_PORT);
            assert_eq!(config.tcp_addr(), None);
            Ok(())
        });
    }

    #[test]
    fn port_from_environment() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("PORT", "8080");
            jail.set_env("HOST", "127.0.0.1");
            jail.set_env("TCP_PORT", "8888");
            let config = ServerConfig::load()?;
            assert_eq!(config.http_addr(), "127.0.0.1:8080".parse().unwrap());
            assert_eq!(config.tcp_addr(), Some("127.0.0.1:8888".parse().unwrap()));
            Ok(())
        });
    }

    #[test]
    fn invalid_port_is_an_error() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("PORT", "not-a-port");
            assert!(ServerConfig::load().is_err());
            Ok(())
        });
    }
}
