//! Server configuration management.
//!
//! Configuration is stored as TOML at `$ASSETMGR_CONFIG`, or by default:
//! - Linux: `~/.config/assetmgr/server.toml`
//! - Windows: `%APPDATA%/assetmgr/server.toml`

use std::path::{Path, PathBuf};
use std::time::Duration;

use assetmgr_api::ClientConfig;
use assetmgr_protocol::FileTypeTable;
use assetmgr_protocol::constants::{DEFAULT_API_BASE_URL, DEFAULT_PLATFORM, DEFAULT_UPLOAD_BASE_URL};
use assetmgr_upload::UploadSettings;
use serde::{Deserialize, Serialize};

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV: &str = "ASSETMGR_CONFIG";

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Address the HTTP server binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Folder whose files are listed, uploaded and deleted.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Base URL for organization, project and health reads.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Base URL for the multipart upload protocol.
    #[serde(default = "default_upload_base_url")]
    pub upload_base_url: String,

    /// Timeout for control calls; part uploads get twice this.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_chunk_size_mib")]
    pub chunk_size_mib: usize,

    /// Platform tag sent with every asset.
    #[serde(default = "default_platform")]
    pub platform: String,

    /// Files uploaded at once within a batch.
    #[serde(default = "default_max_concurrent_sessions")]
    pub max_concurrent_sessions: usize,

    /// Used when a request carries no API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn default_bind_address() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    8188
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./output")
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.into()
}

fn default_upload_base_url() -> String {
    DEFAULT_UPLOAD_BASE_URL.into()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_chunk_size_mib() -> usize {
    10
}

fn default_platform() -> String {
    DEFAULT_PLATFORM.into()
}

fn default_max_concurrent_sessions() -> usize {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            output_dir: default_output_dir(),
            api_base_url: default_api_base_url(),
            upload_base_url: default_upload_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            chunk_size_mib: default_chunk_size_mib(),
            platform: default_platform(),
            max_concurrent_sessions: default_max_concurrent_sessions(),
            api_key: None,
        }
    }
}

impl Config {
    /// Loads configuration from disk, or creates a default if not found.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_path())
    }

    /// Loads from an explicit path, writing defaults there if it is missing.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Saves the configuration to `path`.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        // May hold an API key.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.chunk_size_mib > 0, "chunk_size_mib must be at least 1");
        anyhow::ensure!(
            self.request_timeout_secs > 0,
            "request_timeout_secs must be at least 1"
        );
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            api_base_url: self.api_base_url.clone(),
            upload_base_url: self.upload_base_url.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn upload_settings(&self) -> UploadSettings {
        UploadSettings {
            chunk_size: self.chunk_size_mib * 1024 * 1024,
            platform: self.platform.clone(),
            file_types: FileTypeTable::standard(),
            max_concurrent_sessions: self.max_concurrent_sessions.max(1),
        }
    }

    /// Picks the request's key, falling back to the configured one.
    pub fn resolve_api_key(&self, requested: Option<&str>) -> Option<String> {
        requested
            .filter(|k| !k.is_empty())
            .or(self.api_key.as_deref().filter(|k| !k.is_empty()))
            .map(str::to_string)
    }
}

/// Returns the configuration file path.
fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        PathBuf::from(appdata).join("assetmgr").join("server.toml")
    }

    #[cfg(not(target_os = "windows"))]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        PathBuf::from(home)
            .join(".config")
            .join("assetmgr")
            .join("server.toml")
    }
}
