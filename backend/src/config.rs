//! Configuration management.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Origins of the browser client during development.
pub const DEFAULT_CORS_ORIGINS: [&str; 2] = ["https://localhost:7601", "http://localhost:5601"];

/// Configuration structure that matches the TOML file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ServerConfig {
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_bind_address")]
    bind_address: IpAddr,
    #[serde(default = "default_cors_origins")]
    cors_allowed_origins: Vec<String>,
    tls_cert: Option<PathBuf>,
    tls_key: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_bind_address(),
            cors_allowed_origins: default_cors_origins(),
            tls_cert: None,
            tls_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct LoggingConfig {
    /// Path to log file (if set, logs will be written to file in addition to stdout)
    log_file: Option<PathBuf>,
    /// Log level (trace, debug, info, warn, error)
    /// If not set, uses RUST_LOG environment variable or defaults to "info"
    log_level: Option<String>,
}

fn default_port() -> u16 {
    ahkflow_types::DEFAULT_PORT
}

fn default_bind_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_cors_origins() -> Vec<String> {
    DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect()
}

/// TLS certificate and private key locations (PEM).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port to listen on
    pub port: u16,
    /// Address to bind to
    pub bind_address: IpAddr,
    /// Origins allowed to call the API from a browser (empty allows any)
    pub cors_allowed_origins: Vec<String>,
    /// TLS files; plain HTTP when not set
    pub tls: Option<TlsPaths>,
    /// Path to log file (if set, logs will be written to file in addition to stdout)
    pub log_file: Option<PathBuf>,
    /// Log level (if set, overrides RUST_LOG environment variable)
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration with full priority chain: CLI args > env vars > config files > defaults.
    ///
    /// Config files are searched in this order:
    /// 1. `config.toml` in user config directory (~/.config/ahkflow/ on Linux)
    /// 2. `.ahkflow.toml` in current directory
    ///
    /// Environment variables use the `AHKFLOW_` prefix with `__` between
    /// sections, e.g. `AHKFLOW_SERVER__PORT=8000`.
    pub fn from_figment(
        port: Option<u16>,
        tls_cert: Option<PathBuf>,
        tls_key: Option<PathBuf>,
    ) -> anyhow::Result<Self> {
        let local_config = std::env::current_dir()
            .ok()
            .map(|d| d.join(".ahkflow.toml"));
        let user_config = directories::ProjectDirs::from("", "", "ahkflow")
            .map(|dirs| dirs.config_dir().join("config.toml"));

        // Priority: defaults < user config < local config < env vars < CLI args
        let mut figment = Figment::new().merge(Serialized::defaults(ConfigFile::default()));

        if let Some(ref path) = user_config {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        if let Some(ref path) = local_config {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        figment = figment.merge(Env::prefixed("AHKFLOW_").split("__"));

        if let Some(p) = port {
            figment = figment.merge(Serialized::default("server.port", p));
        }
        if let Some(ref cert) = tls_cert {
            figment = figment.merge(Serialized::default("server.tls_cert", cert));
        }
        if let Some(ref key) = tls_key {
            figment = figment.merge(Serialized::default("server.tls_key", key));
        }

        let config_file: ConfigFile = figment.extract()?;
        Self::from_file(config_file)
    }

    fn from_file(config_file: ConfigFile) -> anyhow::Result<Self> {
        let ConfigFile { server, logging } = config_file;

        let tls = match (server.tls_cert, server.tls_key) {
            (Some(cert_path), Some(key_path)) => Some(TlsPaths {
                cert_path,
                key_path,
            }),
            (None, None) => None,
            (Some(_), None) => anyhow::bail!("server.tls_cert is set but server.tls_key is missing"),
            (None, Some(_)) => anyhow::bail!("server.tls_key is set but server.tls_cert is missing"),
        };

        Ok(Self {
            port: server.port,
            bind_address: server.bind_address,
            cors_allowed_origins: server.cors_allowed_origins,
            tls,
            log_file: logging.log_file,
            log_level: logging.log_level,
        })
    }

    /// Socket address the server listens on.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    /// Run `f` with the current directory set to a fresh temp dir, so no
    /// project `.ahkflow.toml` is picked up.
    fn in_temp_dir<T>(config_content: Option<&str>, f: impl FnOnce() -> T) -> T {
        let temp_dir = TempDir::new().unwrap();
        if let Some(content) = config_content {
            fs::write(temp_dir.path().join(".ahkflow.toml"), content).unwrap();
        }

        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();
        let result = f();
        // Restore before temp_dir is dropped (ignore errors)
        let _ = std::env::set_current_dir(original_dir);
        result
    }

    fn clear_env() {
        std::env::remove_var("AHKFLOW_SERVER__PORT");
        std::env::remove_var("AHKFLOW_SERVER__CORS_ALLOWED_ORIGINS");
        std::env::remove_var("AHKFLOW_LOGGING__LOG_LEVEL");
    }

    #[test]
    #[serial]
    fn test_from_figment_defaults() {
        clear_env();

        let config = in_temp_dir(None, || Config::from_figment(None, None, None).unwrap());

        assert_eq!(config.port, 7600);
        assert_eq!(config.bind_address, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(
            config.cors_allowed_origins,
            vec!["https://localhost:7601", "http://localhost:5601"]
        );
        assert!(config.tls.is_none());
        assert!(config.log_file.is_none());
        assert!(config.log_level.is_none());
    }

    #[test]
    #[serial]
    fn test_from_figment_config_file() {
        clear_env();

        let config = in_temp_dir(
            Some(
                r#"
[server]
port = 7777
bind_address = "127.0.0.1"
cors_allowed_origins = ["https://ahkflow.example.com"]

[logging]
log_level = "debug"
"#,
            ),
            || Config::from_figment(None, None, None).unwrap(),
        );

        assert_eq!(config.port, 7777);
        assert_eq!(config.socket_addr(), "127.0.0.1:7777".parse().unwrap());
        assert_eq!(
            config.cors_allowed_origins,
            vec!["https://ahkflow.example.com"]
        );
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    #[serial]
    fn test_from_figment_env_vars_override_config_file() {
        clear_env();
        std::env::set_var("AHKFLOW_SERVER__PORT", "8888");

        let config = in_temp_dir(Some("[server]\nport = 7777"), || {
            Config::from_figment(None, None, None).unwrap()
        });

        clear_env();
        assert_eq!(config.port, 8888);
    }

    #[test]
    #[serial]
    fn test_from_figment_cli_overrides_env_and_config() {
        clear_env();
        std::env::set_var("AHKFLOW_SERVER__PORT", "8888");

        let config = in_temp_dir(Some("[server]\nport = 7777"), || {
            Config::from_figment(Some(9999), None, None).unwrap()
        });

        clear_env();
        assert_eq!(config.port, 9999);
    }

    #[test]
    #[serial]
    fn test_tls_requires_cert_and_key() {
        clear_env();

        let config = in_temp_dir(None, || {
            Config::from_figment(
                None,
                Some(PathBuf::from("cert.pem")),
                Some(PathBuf::from("key.pem")),
            )
            .unwrap()
        });
        assert_eq!(
            config.tls,
            Some(TlsPaths {
                cert_path: PathBuf::from("cert.pem"),
                key_path: PathBuf::from("key.pem"),
            })
        );

        let result = in_temp_dir(None, || {
            Config::from_figment(None, Some(PathBuf::from("cert.pem")), None)
        });
        assert!(result.is_err());
    }
}
