//! Server configuration.
//!
//! # Design
//! Defaults suit a test harness: loopback only, an OS-assigned port, and a
//! one second bound on how long `stop` waits for the accept thread. Values
//! can come from code, a TOML document, or the environment.

use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ServerError;

pub const ENV_HOST: &str = "MOCKHTTP_HOST";
pub const ENV_PORT: &str = "MOCKHTTP_PORT";
/// Fallback port variable, honored when `MOCKHTTP_PORT` is unset.
pub const ENV_PORT_FALLBACK: &str = "PORT";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: IpAddr,
    /// Port to bind; 0 lets the OS pick a free one.
    pub port: u16,
    /// How long `stop` waits for the accept thread before abandoning it.
    pub stop_timeout_ms: u64,
    /// Read timeout applied to each accepted connection. `None` waits forever.
    pub read_timeout_ms: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            stop_timeout_ms: 1000,
            read_timeout_ms: Some(30_000),
        }
    }
}

impl ServerConfig {
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ServerError> {
        toml::from_str(raw).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ServerError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Defaults overridden by `MOCKHTTP_HOST` and `MOCKHTTP_PORT` (or `PORT`).
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`ServerConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServerError> {
        let mut config = Self::default();

        if let Some(host) = lookup(ENV_HOST) {
            config.host = host
                .trim()
                .parse()
                .map_err(|_| ServerError::Config(format!("{ENV_HOST}={host:?} is not an IP address")))?;
        }

        if let Some((key, port)) = lookup(ENV_PORT)
            .map(|port| (ENV_PORT, port))
            .or_else(|| lookup(ENV_PORT_FALLBACK).map(|port| (ENV_PORT_FALLBACK, port)))
        {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| ServerError::Config(format!("{key}={port:?} is not a port number")))?;
        }

        Ok(config)
    }
}
