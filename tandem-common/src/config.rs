//! Configuration loading and root folder resolution
//!
//! Bootstrap configuration is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`TANDEM_ROOT_FOLDER`, then `TANDEM_ROOT`)
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing config file is never fatal; compiled defaults apply.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Default HTTP port for tandem-server
pub const DEFAULT_PORT: u16 = 5780;

/// Default session lifetime (7 days)
pub const DEFAULT_SESSION_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "tandem.db";

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional so that a partial file still loads.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Root folder holding the database
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Bind address (e.g. "127.0.0.1" or "0.0.0.0")
    #[serde(default)]
    pub bind: Option<String>,

    /// Session token lifetime in seconds
    #[serde(default)]
    pub session_ttl_secs: Option<u64>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Compiled defaults used when nothing else is configured
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub port: u16,
    pub bind: String,
    pub session_ttl_secs: u64,
    pub log_level: String,
}

impl CompiledDefaults {
    /// Defaults for the platform this binary was compiled for
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: get_default_root_folder(),
            port: DEFAULT_PORT,
            bind: "127.0.0.1".to_string(),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            log_level: default_log_level(),
        }
    }
}

/// Get OS-dependent default root folder path
fn get_default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/tandem (or /var/lib/tandem for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("tandem"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/tandem"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/tandem
        dirs::data_dir()
            .map(|d| d.join("tandem"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/tandem"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\tandem
        dirs::data_local_dir()
            .map(|d| d.join("tandem"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\tandem"))
    } else {
        PathBuf::from("./tandem_data")
    }
}

/// Locate the platform config file, if one exists
pub fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("tandem").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/tandem/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Resolves the root folder following the documented priority order
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
    toml_config: Option<TomlConfig>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_arg: None,
            toml_config: None,
        }
    }

    /// Set the command-line override
    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    /// Use an already-loaded TOML config instead of reading the platform file
    pub fn with_toml_config(mut self, config: TomlConfig) -> Self {
        self.toml_config = Some(config);
        self
    }

    pub fn resolve(&self) -> PathBuf {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_arg {
            info!("[{}] Root folder from command line: {}", self.module_name, path.display());
            return path.clone();
        }

        // Priority 2: Environment variables
        for var in ["TANDEM_ROOT_FOLDER", "TANDEM_ROOT"] {
            if let Ok(path) = std::env::var(var) {
                if !path.trim().is_empty() {
                    info!("[{}] Root folder from {}: {}", self.module_name, var, path);
                    return PathBuf::from(path);
                }
            }
        }

        // Priority 3: TOML config file
        let from_toml = match &self.toml_config {
            Some(config) => config.root_folder.clone(),
            None => find_config_file()
                .and_then(|path| load_toml_config(&path).ok())
                .and_then(|config| config.root_folder),
        };
        if let Some(path) = from_toml {
            info!("[{}] Root folder from config file: {}", self.module_name, path.display());
            return path;
        }

        // Priority 4: OS-dependent compiled default
        let path = CompiledDefaults::for_current_platform().root_folder;
        info!("[{}] Root folder from compiled default: {}", self.module_name, path.display());
        path
    }
}

/// Creates the root folder and derives file locations inside it
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }

    pub fn database_exists(&self) -> bool {
        self.database_path().exists()
    }
}
