use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::tiling::TileSize;

pub const DEFAULT_CONFIG_PATH: &str = "tessera.toml";
pub const CONFIG_PATH_ENV: &str = "TESSERA_CONFIG";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub storage_root: PathBuf,
    pub tile_width: u32,
    pub tile_height: u32,
    /// Requests with a larger body are refused before being read.
    pub max_body_bytes: usize,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let tile_size = TileSize::default();
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            storage_root: PathBuf::from("static"),
            tile_width: tile_size.width,
            tile_height: tile_size.height,
            max_body_bytes: 16 * 1024 * 1024,
            log_level: "info".to_string(),
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl ServerConfig {
    /// Reads the file named by `TESSERA_CONFIG`, or `tessera.toml`.
    /// A missing file gives the defaults; an unreadable one is an error.
    pub fn load_or_default() -> anyhow::Result<Self> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load(&path)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let serialized = std::fs::read(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let format = common::SerdeFormat::from_file_name(&path.to_string_lossy())?;

        common::serde::deserialize(&serialized, format)
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let format = common::SerdeFormat::from_file_name(&path.to_string_lossy())?;
        let serialized = common::serde::serialize(self, format)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_storage_root(mut self, storage_root: impl Into<PathBuf>) -> Self {
        self.storage_root = storage_root.into();
        self
    }

    pub fn with_tile_size(mut self, tile_size: TileSize) -> Self {
        self.tile_width = tile_size.width;
        self.tile_height = tile_size.height;
        self
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub fn tile_size(&self) -> TileSize {
        TileSize::new(self.tile_width, self.tile_height)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
