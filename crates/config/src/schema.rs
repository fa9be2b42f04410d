use std::path::PathBuf;

use tracing::warn;

/// Default HTTP listen port.
pub const DEFAULT_PORT: u16 = 3000;
/// Default upload staging directory.
pub const DEFAULT_UPLOAD_DIR: &str = "./uploads";
/// Default WebSocket port for the sidecar bridge.
pub const DEFAULT_SIDECAR_PORT: u16 = 3441;

/// Top-level gateway configuration.
#[derive(Debug, Clone, serde::Serialize)]
pub struct GatewayConfig {
    /// Address to bind the HTTP server to.
    pub bind: String,
    /// HTTP listen port.
    pub port: u16,
    /// Directory where uploaded media is staged before dispatch.
    pub upload_dir: PathBuf,
    /// Sidecar bridge settings.
    pub sidecar: SidecarSettings,
}

/// Settings for the sidecar transport bridge.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct SidecarSettings {
    /// Directory containing the sidecar code. When unset, well-known
    /// locations are probed at startup.
    pub dir: Option<PathBuf>,
    /// WebSocket port the sidecar listens on.
    pub port: u16,
    /// Directory where the sidecar persists session credentials.
    /// Opaque to the gateway.
    pub auth_dir: Option<PathBuf>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".into(),
            port: DEFAULT_PORT,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            sidecar: SidecarSettings {
                dir: None,
                port: DEFAULT_SIDECAR_PORT,
                auth_dir: None,
            },
        }
    }
}

impl GatewayConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup (testable seam).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            bind: lookup("WAGATE_BIND").unwrap_or(defaults.bind),
            port: parse_port(lookup("PORT"), defaults.port, "PORT"),
            upload_dir: lookup("UPLOAD_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            sidecar: SidecarSettings {
                dir: lookup("WAGATE_SIDECAR_DIR").map(PathBuf::from),
                port: parse_port(
                    lookup("WAGATE_SIDECAR_PORT"),
                    defaults.sidecar.port,
                    "WAGATE_SIDECAR_PORT",
                ),
                auth_dir: lookup("WAGATE_AUTH_DIR").map(PathBuf::from),
            },
        }
    }
}

/// Parse a port value, falling back to the default on malformed input.
fn parse_port(raw: Option<String>, default: u16, var: &str) -> u16 {
    match raw {
        None => default,
        Some(value) => match value.parse() {
            Ok(port) => port,
            Err(_) => {
                warn!(var, value, "ignoring non-numeric port value");
                default
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
        }
    }

    #[test]
    fn defaults_when_env_is_empty() {
        let config = GatewayConfig::from_lookup(|_| None);
        assert_eq!(config.bind, "0.0.0.0");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.upload_dir, PathBuf::from("./uploads"));
        assert_eq!(config.sidecar.port, DEFAULT_SIDECAR_PORT);
        assert!(config.sidecar.dir.is_none());
    }

    #[test]
    fn env_values_override_defaults() {
        let pairs = [
            ("PORT", "8080"),
            ("UPLOAD_PATH", "/tmp/staging"),
            ("WAGATE_BIND", "127.0.0.1"),
            ("WAGATE_SIDECAR_PORT", "9001"),
            ("WAGATE_SIDECAR_DIR", "/opt/sidecar"),
        ];
        let config = GatewayConfig::from_lookup(lookup_from(&pairs));
        assert_eq!(config.port, 8080);
        assert_eq!(config.upload_dir, PathBuf::from("/tmp/staging"));
        assert_eq!(config.bind, "127.0.0.1");
        assert_eq!(config.sidecar.port, 9001);
        assert_eq!(config.sidecar.dir, Some(PathBuf::from("/opt/sidecar")));
    }

    #[test]
    fn malformed_port_falls_back_to_default() {
        let pairs = [("PORT", "not-a-port")];
        let config = GatewayConfig::from_lookup(lookup_from(&pairs));
        assert_eq!(config.port, DEFAULT_PORT);
    }
}
