//! Configuration for the vmouse endpoint
//!
//! Stored as TOML, by default in `~/.config/vmouse/vmouse.toml`. Every field
//! is optional; missing ones fall back to the built-in defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use vmouse_device::{DeviceIdentity, BUS_VIRTUAL};

/// Errors from loading or saving the config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Who may write to the control socket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// `c-w-------`
    OwnerWriteOnly,
    /// `c-w--w--w-`
    WorldWritable,
}

impl AccessPolicy {
    pub fn from_flag(allow_non_root_write: bool) -> Self {
        if allow_non_root_write {
            AccessPolicy::WorldWritable
        } else {
            AccessPolicy::OwnerWriteOnly
        }
    }

    /// File mode applied to the socket node
    pub fn mode(self) -> u32 {
        match self {
            AccessPolicy::OwnerWriteOnly => 0o200,
            AccessPolicy::WorldWritable => 0o222,
        }
    }
}

/// Identity advertised to the input subsystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub name: String,
    pub vendor: u16,
    pub product: u16,
    pub version: u16,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        let identity = DeviceIdentity::default();
        Self {
            name: identity.name,
            vendor: identity.vendor,
            product: identity.product,
            version: identity.version,
        }
    }
}

impl DeviceConfig {
    pub fn identity(&self) -> DeviceIdentity {
        DeviceIdentity {
            name: self.name.clone(),
            bus: BUS_VIRTUAL,
            vendor: self.vendor,
            product: self.product,
            version: self.version,
        }
    }
}

/// Complete endpoint configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmouseConfig {
    /// Path of the control socket
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,
    /// Let non-root users write commands
    #[serde(default)]
    pub allow_non_root_write: bool,
    #[serde(default)]
    pub device: DeviceConfig,
}

fn default_socket_path() -> PathBuf {
    PathBuf::from("/run/vmouse.sock")
}

impl Default for VmouseConfig {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
            allow_non_root_write: false,
            device: DeviceConfig::default(),
        }
    }
}

impl VmouseConfig {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vmouse")
            .join("vmouse.toml")
    }

    /// Load config from a file, or return default if not found
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Save config to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source: std::io::Error| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(write_err)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn access_policy(&self) -> AccessPolicy {
        AccessPolicy::from_flag(self.allow_non_root_write)
    }

    pub fn identity(&self) -> DeviceIdentity {
        self.device.identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("vmouse-config-test-does-not-exist.toml");
        let config = VmouseConfig::load(&path).unwrap();
        assert_eq!(config, VmouseConfig::default());
        assert_eq!(config.access_policy(), AccessPolicy::OwnerWriteOnly);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: VmouseConfig = toml::from_str(
            r#"
allow_non_root_write = true

[device]
name = "Test Mouse"
"#,
        )
        .unwrap();
        assert_eq!(config.socket_path, PathBuf::from("/run/vmouse.sock"));
        assert_eq!(config.device.name, "Test Mouse");
        assert_eq!(config.device.version, 1);
        assert_eq!(config.access_policy(), AccessPolicy::WorldWritable);
    }

    #[test]
    fn test_access_policy_modes() {
        assert_eq!(AccessPolicy::from_flag(false).mode(), 0o200);
        assert_eq!(AccessPolicy::from_flag(true).mode(), 0o222);
    }

    #[test]
    fn test_identity_is_virtual_bus() {
        let identity = VmouseConfig::default().identity();
        assert_eq!(identity.bus, BUS_VIRTUAL);
        assert_eq!(identity, DeviceIdentity::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("vmouse-config-{}", std::process::id()));
        let path = dir.join("nested").join("vmouse.toml");
        let mut config = VmouseConfig::default();
        config.socket_path = PathBuf::from("/tmp/custom.sock");
        config.device.product = 0x1234;

        config.save(&path).unwrap();
        let loaded = VmouseConfig::load(&path).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = std::env::temp_dir().join(format!("vmouse-badcfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("vmouse.toml");
        std::fs::write(&path, "allow_non_root_write = \"maybe\"").unwrap();
        assert!(matches!(
            VmouseConfig::load(&path),
            Err(ConfigError::Parse(_))
        ));
        std::fs::remove_dir_all(&dir).ok();
    }
}
