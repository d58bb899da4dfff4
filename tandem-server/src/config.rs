//! Server configuration
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments (`--port`, `--bind`, `--root-folder`)
//! 2. Environment variables (`TANDEM_PORT`, `TANDEM_BIND`, `TANDEM_ROOT_FOLDER`)
//! 3. TOML configuration file
//! 4. Compiled defaults
//!
//! Everything here is bootstrap-only; changes need a restart.

use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tandem_common::config::{
    find_config_file, load_toml_config, CompiledDefaults, RootFolderResolver, TomlConfig,
};
use tandem_common::{Error, Result};

/// Command-line arguments for tandem-server
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "tandem-server")]
#[command(about = "Language-exchange partner matching service")]
#[command(version)]
pub struct CliArgs {
    /// Root folder holding tandem.db (env: TANDEM_ROOT_FOLDER)
    #[arg(short, long)]
    pub root_folder: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "TANDEM_PORT")]
    pub port: Option<u16>,

    /// Address to bind (e.g. 127.0.0.1 or 0.0.0.0)
    #[arg(short, long, env = "TANDEM_BIND")]
    pub bind: Option<String>,

    /// Explicit TOML config file; otherwise the platform location is tried
    #[arg(short, long, env = "TANDEM_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Where the bootstrap TOML came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

/// Load the bootstrap TOML
///
/// An explicit path must exist and parse. Without one, the platform config
/// file is used when present; a missing file is never fatal.
pub fn load_bootstrap_config(explicit: Option<&Path>) -> Result<(TomlConfig, ConfigSource)> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match find_config_file() {
            Some(path) => path,
            None => return Ok((TomlConfig::default(), ConfigSource::Defaults)),
        },
    };

    let config = load_toml_config(&path)?;
    Ok((config, ConfigSource::File(path)))
}

/// Fully resolved server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub root_folder: PathBuf,
    pub port: u16,
    pub bind: String,
    pub session_ttl: Duration,
    pub log_level: String,
}

impl ServerConfig {
    /// Merge CLI arguments over the TOML file over compiled defaults
    pub fn from_sources(cli: &CliArgs, toml: &TomlConfig) -> Self {
        let defaults = CompiledDefaults::for_current_platform();

        let root_folder = RootFolderResolver::new("tandem-server")
            .with_cli_arg(cli.root_folder.clone())
            .with_toml_config(toml.clone())
            .resolve();

        Self {
            root_folder,
            port: cli.port.or(toml.port).unwrap_or(defaults.port),
            bind: cli
                .bind
                .clone()
                .or_else(|| toml.bind.clone())
                .unwrap_or(defaults.bind),
            session_ttl: Duration::from_secs(
                toml.session_ttl_secs.unwrap_or(defaults.session_ttl_secs),
            ),
            log_level: toml.logging.level.clone(),
        }
    }

    /// Address the HTTP listener binds to
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .bind
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid bind address {:?}: {}", self.bind, e)))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tandem_common::config::{DEFAULT_PORT, DEFAULT_SESSION_TTL_SECS};

    fn cli_with_root() -> CliArgs {
        CliArgs {
            root_folder: Some(PathBuf::from("/tmp/tandem-test-root")),
            ..CliArgs::default()
        }
    }

    #[test]
    fn test_defaults_apply() {
        let config = ServerConfig::from_sources(&cli_with_root(), &TomlConfig::default());

        assert_eq!(config.root_folder, PathBuf::from("/tmp/tandem-test-root"));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.bind, "127.0.0.1");
        assert_eq!(config.session_ttl, Duration::from_secs(DEFAULT_SESSION_TTL_SECS));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let toml: TomlConfig = toml::from_str(
            r#"
            port = 6100
            bind = "0.0.0.0"
            session_ttl_secs = 3600

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        let config = ServerConfig::from_sources(&cli_with_root(), &toml);
        assert_eq!(config.port, 6100);
        assert_eq!(config.bind, "0.0.0.0");
        assert_eq!(config.session_ttl, Duration::from_secs(3600));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_cli_overrides_toml() {
        let toml = TomlConfig {
            port: Some(6100),
            bind: Some("0.0.0.0".to_string()),
            ..TomlConfig::default()
        };
        let cli = CliArgs {
            port: Some(7000),
            bind: Some("::1".to_string()),
            ..cli_with_root()
        };

        let config = ServerConfig::from_sources(&cli, &toml);
        assert_eq!(config.port, 7000);
        assert_eq!(config.bind, "::1");
        assert_eq!(config.socket_addr().unwrap().to_string(), "[::1]:7000");
    }

    #[test]
    fn test_invalid_bind_address() {
        let cli = CliArgs {
            bind: Some("not-an-ip".to_string()),
            ..cli_with_root()
        };
        let config = ServerConfig::from_sources(&cli, &TomlConfig::default());
        assert!(matches!(config.socket_addr(), Err(Error::Config(_))));
    }

    #[test]
    fn test_explicit_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 6200").unwrap();

        let (config, source) = load_bootstrap_config(Some(file.path())).unwrap();
        assert_eq!(config.port, Some(6200));
        assert_eq!(source, ConfigSource::File(file.path().to_path_buf()));
    }

    #[test]
    fn test_explicit_config_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(load_bootstrap_config(Some(&missing)).is_err());
    }

    #[test]
    fn test_cli_parsing() {
        let cli = CliArgs::try_parse_from([
            "tandem-server",
            "--root-folder",
            "/srv/tandem",
            "--port",
            "6300",
        ])
        .unwrap();
        assert_eq!(cli.root_folder, Some(PathBuf::from("/srv/tandem")));
        assert_eq!(cli.port, Some(6300));
    }
}
