use anyhow::{Context, Result};
use plugin_core::{LinkType, DEFAULT_LAYER_MAX};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[cfg(windows)]
pub fn config_dir() -> PathBuf {
    std::env::var("APPDATA")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("vigil")
}

#[cfg(not(windows))]
pub fn config_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".config")
        .join("vigil")
}

fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct PluginsConfig {
    /// Directories searched for plugin libraries.
    #[serde(default)]
    pub paths: Vec<PathBuf>,
    /// `type::name` keys that are never registered.
    #[serde(default)]
    pub disabled: Vec<String>,
}

fn default_num_layers() -> u8 {
    DEFAULT_LAYER_MAX
}

fn default_link_type() -> LinkType {
    plugin_core::codec::ids::DLT_EN10MB
}

fn default_lanes() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DecodeConfig {
    #[serde(default = "default_num_layers")]
    pub num_layers: u8,
    #[serde(default = "default_link_type")]
    pub link_type: LinkType,
    #[serde(default = "default_lanes")]
    pub lanes: usize,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            num_layers: default_num_layers(),
            link_type: default_link_type(),
            lanes: default_lanes(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub plugins: PluginsConfig,
    #[serde(default)]
    pub decode: DecodeConfig,
}

/// Loads `explicit` when given, otherwise the default file if it exists.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let p = config_file_path();
            if !p.exists() {
                return Ok(Config::default());
            }
            p
        }
    };
    let content =
        fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}
