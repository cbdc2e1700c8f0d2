//! Visualizer configuration.

use std::net::SocketAddr;
use std::time::Duration;

use arbor_tree::{ParseLimits, Viewport};

use crate::error::{Error, Result};
use crate::replay::DEFAULT_SPEED;

/// Tree shown when nothing else is configured.
pub const DEFAULT_INPUT: &str = "[3,9,20,null,null,15,7]";

/// Viewport used for layout requests that omit a size.
pub const DEFAULT_VIEWPORT: Viewport = Viewport::new(800.0, 500.0);

/// Visualizer configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct VisConfig {
    /// HTTP listen address
    pub addr: SocketAddr,

    /// Initial level-order input, in textual form
    pub input: String,

    /// Initial delay between auto-play steps
    pub speed: Duration,

    /// Bounds enforced on submitted input
    pub limits: ParseLimits,

    /// Layout viewport when a request omits one
    pub viewport: Viewport,
}

impl Default for VisConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            input: DEFAULT_INPUT.to_string(),
            speed: DEFAULT_SPEED,
            limits: ParseLimits::default(),
            viewport: DEFAULT_VIEWPORT,
        }
    }
}

impl VisConfig {
    /// Create config from `ARBOR_*` environment variables with defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(addr) = lookup("ARBOR_ADDR") {
            config.addr = addr
                .parse()
                .map_err(|_| Error::Config(format!("invalid ARBOR_ADDR: {addr:?}")))?;
        }

        if let Some(input) = lookup("ARBOR_INPUT") {
            config.input = input;
        }

        if let Some(speed) = lookup("ARBOR_SPEED_MS") {
            let millis: u64 = speed
                .parse()
                .map_err(|_| Error::Config(format!("invalid ARBOR_SPEED_MS: {speed:?}")))?;
            config.speed = Duration::from_millis(millis);
        }

        if let Some(max) = lookup("ARBOR_MAX_NODES") {
            config.limits.max_len = max
                .parse()
                .map_err(|_| Error::Config(format!("invalid ARBOR_MAX_NODES: {max:?}")))?;
        }

        if let Some(max) = lookup("ARBOR_MAX_HEIGHT") {
            config.limits.max_height = max
                .parse()
                .map_err(|_| Error::Config(format!("invalid ARBOR_MAX_HEIGHT: {max:?}")))?;
        }

        Ok(config)
    }

    /// Override the listen port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.addr.set_port(port);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_variables() {
        let config = VisConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, VisConfig::default());
        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.speed, Duration::from_millis(1000));
        assert_eq!(config.limits.max_len, 10_000);
        assert_eq!(config.limits.max_height, 64);
    }

    #[test]
    fn variables_override_defaults() {
        let config = VisConfig::from_lookup(lookup(&[
            ("ARBOR_ADDR", "127.0.0.1:8080"),
            ("ARBOR_INPUT", "[1,null,2]"),
            ("ARBOR_SPEED_MS", "250"),
            ("ARBOR_MAX_NODES", "64"),
            ("ARBOR_MAX_HEIGHT", "8"),
        ]))
        .unwrap();

        assert_eq!(config.addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.input, "[1,null,2]");
        assert_eq!(config.speed, Duration::from_millis(250));
        assert_eq!(config.limits.max_len, 64);
        assert_eq!(config.limits.max_height, 8);
    }

    #[test]
    fn invalid_values_are_errors() {
        let err = VisConfig::from_lookup(lookup(&[("ARBOR_SPEED_MS", "fast")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("ARBOR_SPEED_MS"));

        assert!(VisConfig::from_lookup(lookup(&[("ARBOR_ADDR", "nowhere")])).is_err());
    }

    #[test]
    fn port_override() {
        let config = VisConfig::default().with_port(4000);
        assert_eq!(config.addr.port(), 4000);
    }
}
