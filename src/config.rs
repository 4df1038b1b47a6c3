//! Process configuration from environment variables

use crate::llm::ModelSource;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_MODEL_REPO: &str = "microsoft/DialoGPT-medium";
pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub model: ModelSource,
    /// Fixed seed for reproducible sampling
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            model: ModelSource::Hub {
                repo: DEFAULT_MODEL_REPO.to_string(),
                revision: "main".to_string(),
            },
            seed: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup; unparseable values fall back
    /// to defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let host = parse_or(&lookup, "CHAT_HOST", defaults.host);
        let port = parse_or(&lookup, "CHAT_PORT", defaults.port);
        let seed = lookup("CHAT_SEED").and_then(|raw| match raw.parse() {
            Ok(seed) => Some(seed),
            Err(_) => {
                tracing::warn!(value = %raw, "Ignoring unparseable CHAT_SEED");
                None
            }
        });

        let model = match lookup("CHAT_MODEL_DIR") {
            Some(dir) if !dir.is_empty() => ModelSource::Local(PathBuf::from(dir)),
            _ => ModelSource::Hub {
                repo: lookup("CHAT_MODEL_REPO").unwrap_or_else(|| DEFAULT_MODEL_REPO.to_string()),
                revision: lookup("CHAT_MODEL_REVISION").unwrap_or_else(|| "main".to_string()),
            },
        };

        Self {
            host,
            port,
            model,
            seed,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    match lookup(key) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Ignoring unparseable setting");
            default
        }),
        None => default,
    }
}
