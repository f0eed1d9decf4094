//! Startup configuration.
//!
//! Values come from command-line flags and an optional TOML file. Flags win over
//! the file, and the file wins over built-in defaults.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

use crate::server::DEFAULT_READ_BUFFER_SIZE;

/// Port the original server listened on.
pub const DEFAULT_PORT: u16 = 4221;

/// Command-line arguments.
#[derive(Parser, Debug, Default)]
#[command(name = "courier")]
#[command(version)]
#[command(about = "A minimal HTTP/1.1 server with echo, user-agent, and file routes", long_about = None)]
pub struct CliArgs {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory served and written by the /files routes
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Interface to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// TCP port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Size in bytes of the single read per connection
    #[arg(long)]
    pub read_buffer: Option<usize>,

    /// Abort a connection that sends nothing within this many milliseconds
    #[arg(long)]
    pub read_timeout_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

/// TOML configuration file structure.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub files: FilesSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// `[server]` table.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub read_buffer_size: Option<usize>,
    pub read_timeout_ms: Option<u64>,
}

/// `[files]` table.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FilesSection {
    pub directory: Option<PathBuf>,
}

/// `[logging]` table.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    pub level: Option<String>,
}

/// Settings the [`Server`](crate::server::Server) needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// `host:port` to bind.
    pub addr: String,
    pub read_buffer_size: usize,
    pub read_timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: format!("0.0.0.0:{DEFAULT_PORT}"),
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            read_timeout: None,
        }
    }
}

/// Final resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server: ServerConfig,
    pub directory: PathBuf,
    pub log_level: String,
}

impl Config {
    /// Parses argv and the optional TOML file it names.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed, or the bind address is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let cli = CliArgs::parse();

        let file = match cli.config {
            Some(ref path) => {
                let contents =
                    std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
                        path: path.clone(),
                        source,
                    })?;
                toml::from_str(&contents).map_err(|source| ConfigError::TomlParse {
                    path: path.clone(),
                    source,
                })?
            }
            None => FileConfig::default(),
        };

        Self::from_parts(cli, file)
    }

    /// Merges CLI arguments over file values over defaults.
    pub fn from_parts(cli: CliArgs, file: FileConfig) -> Result<Self, ConfigError> {
        let host = cli
            .host
            .or(file.server.host)
            .unwrap_or_else(|| "0.0.0.0".to_owned());
        let port = cli.port.or(file.server.port).unwrap_or(DEFAULT_PORT);

        if host.is_empty() || host.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidAddress(host));
        }
        let addr = format_addr(&host, port);

        let read_buffer_size = cli
            .read_buffer
            .or(file.server.read_buffer_size)
            .unwrap_or(DEFAULT_READ_BUFFER_SIZE);
        if read_buffer_size == 0 {
            return Err(ConfigError::ZeroReadBuffer);
        }

        let read_timeout = cli
            .read_timeout_ms
            .or(file.server.read_timeout_ms)
            .map(Duration::from_millis);

        Ok(Config {
            server: ServerConfig {
                addr,
                read_buffer_size,
                read_timeout,
            },
            directory: cli
                .directory
                .or(file.files.directory)
                .unwrap_or_else(|| PathBuf::from(".")),
            log_level: cli
                .log_level
                .or(file.logging.level)
                .unwrap_or_else(|| "info".to_owned()),
        })
    }
}

// IPv6 literals need brackets to be combined with a port.
fn format_addr(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{}': {source}", .path.display())]
    TomlParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid bind host: {0:?}")]
    InvalidAddress(String),

    #[error("read buffer size must be at least one byte")]
    ZeroReadBuffer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::from_parts(CliArgs::default(), FileConfig::default()).unwrap();
        assert_eq!(config.server, ServerConfig::default());
        assert_eq!(config.server.addr, "0.0.0.0:4221");
        assert_eq!(config.server.read_buffer_size, 1024);
        assert_eq!(config.server.read_timeout, None);
        assert_eq!(config.directory, PathBuf::from("."));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn toml_parsing() {
        let toml_str = r#"
            [server]
            host = "127.0.0.1"
            port = 8080
            read_buffer_size = 4096
            read_timeout_ms = 2500

            [files]
            directory = "/srv/files"

            [logging]
            level = "debug"
        "#;

        let file: FileConfig = toml::from_str(toml_str).unwrap();
        let config = Config::from_parts(CliArgs::default(), file).unwrap();
        assert_eq!(config.server.addr, "127.0.0.1:8080");
        assert_eq!(config.server.read_buffer_size, 4096);
        assert_eq!(config.server.read_timeout, Some(Duration::from_millis(2500)));
        assert_eq!(config.directory, PathBuf::from("/srv/files"));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn cli_overrides_file() {
        let file: FileConfig = toml::from_str(
            r#"
            [server]
            port = 8080
            [files]
            directory = "/from/file"
        "#,
        )
        .unwrap();
        let cli = CliArgs {
            port: Some(9090),
            directory: Some(PathBuf::from("/from/cli")),
            ..CliArgs::default()
        };

        let config = Config::from_parts(cli, file).unwrap();
        assert_eq!(config.server.addr, "0.0.0.0:9090");
        assert_eq!(config.directory, PathBuf::from("/from/cli"));
    }

    #[test]
    fn cli_flags_parse() {
        let cli = CliArgs::try_parse_from([
            "courier",
            "--directory",
            "/tmp/data",
            "--port",
            "5000",
            "--read-timeout-ms",
            "100",
        ])
        .unwrap();
        assert_eq!(cli.directory, Some(PathBuf::from("/tmp/data")));
        assert_eq!(cli.port, Some(5000));
        assert_eq!(cli.read_timeout_ms, Some(100));
    }

    #[test]
    fn ipv6_host_is_bracketed() {
        let cli = CliArgs {
            host: Some("::1".to_owned()),
            ..CliArgs::default()
        };
        let config = Config::from_parts(cli, FileConfig::default()).unwrap();
        assert_eq!(config.server.addr, "[::1]:4221");
    }

    #[test]
    fn invalid_host_is_rejected() {
        let cli = CliArgs {
            host: Some("not a host".to_owned()),
            ..CliArgs::default()
        };
        assert!(matches!(
            Config::from_parts(cli, FileConfig::default()),
            Err(ConfigError::InvalidAddress(_))
        ));
    }

    #[test]
    fn zero_read_buffer_is_rejected() {
        let cli = CliArgs {
            read_buffer: Some(0),
            ..CliArgs::default()
        };
        assert!(matches!(
            Config::from_parts(cli, FileConfig::default()),
            Err(ConfigError::ZeroReadBuffer)
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<FileConfig>("[server]\nlisten = \"x\"").is_err());
    }
}
