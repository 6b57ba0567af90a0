//! Configuration system for cardscan.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CardScanError, CardScanResult};
use crate::events::DEFAULT_CAPACITY;
use crate::traits::{CameraConstraints, FacingMode};
use crate::types::LanguageHints;
use crate::workflow::WorkflowOptions;

/// Card store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    Memory,
    #[default]
    Sqlite,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory served for unmatched paths (the capture front-end).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            static_dir: None,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Card store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub provider: StorageProvider,
    /// SQLite database file. `:memory:` keeps everything in process.
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let cardscan_dir = dirs::home_dir()
            .map(|h| h.join(".cardscan"))
            .unwrap_or_else(|| PathBuf::from(".cardscan"));

        Self {
            provider: StorageProvider::Sqlite,
            db_path: cardscan_dir.join("cards.db"),
        }
    }
}

/// OCR engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub engine: String,
    pub languages: LanguageHints,
    pub dpi: u32,
    /// Tesseract page segmentation mode.
    pub psm: u8,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engine: "tesseract".to_string(),
            languages: LanguageHints::default(),
            dpi: 300,
            psm: 3,
        }
    }
}

/// Persistence client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Capture workflow settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub attach_image: bool,
    pub notice_capacity: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            attach_image: false,
            notice_capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Main cardscan configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardScanConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub ocr: OcrConfig,
    pub camera: CameraConstraints,
    pub client: ClientConfig,
    pub workflow: WorkflowConfig,
}

impl CardScanConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<Path>) -> CardScanResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| CardScanError::Configuration(e.to_string()))
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| CardScanError::Configuration(e.to_string())),
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| CardScanError::Configuration(e.to_string())),
            _ => Err(CardScanError::Configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
            )),
        }
    }

    /// Load configuration from `CARDSCAN_*` environment variables.
    ///
    /// Unparseable numeric values are ignored and keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Load from `CARDSCAN_CONFIG` if set, then apply environment overrides.
    pub fn load() -> CardScanResult<Self> {
        let mut config = match std::env::var("CARDSCAN_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Server
        if let Some(host) = var("CARDSCAN_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("CARDSCAN_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(dir) = var("CARDSCAN_STATIC_DIR") {
            self.server.static_dir = Some(PathBuf::from(dir));
        }

        // Storage
        if let Some(provider) = var("CARDSCAN_STORAGE") {
            self.storage.provider = match provider.to_lowercase().as_str() {
                "memory" => StorageProvider::Memory,
                _ => StorageProvider::Sqlite,
            };
        }
        if let Some(path) = var("CARDSCAN_DB_PATH") {
            self.storage.db_path = PathBuf::from(path);
        }

        // OCR
        if let Some(engine) = var("CARDSCAN_OCR_ENGINE") {
            self.ocr.engine = engine;
        }
        if let Some(langs) = var("CARDSCAN_OCR_LANGUAGES") {
            self.ocr.languages = LanguageHints::parse(&langs);
        }

        // Camera
        if let Some(facing) = var("CARDSCAN_CAMERA_FACING") {
            self.camera.facing = match facing.to_lowercase().as_str() {
                "user" => FacingMode::User,
                _ => FacingMode::Environment,
            };
        }

        // Client
        if let Some(url) = var("CARDSCAN_BASE_URL") {
            self.client.base_url = url;
        }
        if let Some(secs) = var("CARDSCAN_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            self.client.timeout_secs = secs;
        }

        // Workflow
        if let Some(attach) = var("CARDSCAN_ATTACH_IMAGE") {
            self.workflow.attach_image = matches!(attach.as_str(), "1" | "true" | "yes");
        }
    }

    /// Options for a capture workflow built from this configuration.
    pub fn workflow_options(&self) -> WorkflowOptions {
        WorkflowOptions {
            camera: self.camera.clone(),
            languages: self.ocr.languages.clone(),
            attach_image: self.workflow.attach_image,
        }
    }
}
