use anyhow::Context;
use serde::Deserialize;
use std::{path::PathBuf, time::Duration};

use crate::tagging::writer::DEFAULT_MAX_TAG_SIZE;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub version: u32,
    pub http: HttpConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub cover: CoverConfig,
    #[serde(default)]
    pub transcode: TranscodeConfig,
    #[serde(default)]
    pub tagging: TaggingConfig,
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path}"))?;
        toml::from_str(&contents).with_context(|| "Failed to parse config TOML")
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub bind_addr: String,
    pub port: u16,
    /// Browser origins allowed to call the API. Requests without an `Origin` header
    /// are always allowed.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: u64,
}

fn default_max_upload_mb() -> u64 {
    100
}

impl HttpConfig {
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ResolverConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.deezer.com".to_string(),
            timeout_secs: 10,
        }
    }
}

impl ResolverConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CoverConfig {
    pub timeout_secs: u64,
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

impl CoverConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TranscodeConfig {
    pub ffmpeg_path: PathBuf,
    pub bitrate_kbps: u32,
    pub sample_rate: u32,
    pub channels: u8,
    pub timeout_secs: u64,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            bitrate_kbps: 192,
            sample_rate: 44_100,
            channels: 2,
            timeout_secs: 120,
        }
    }
}

impl TranscodeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TaggingConfig {
    pub max_tag_size: u32,
}

impl Default for TaggingConfig {
    fn default() -> Self {
        Self {
            max_tag_size: DEFAULT_MAX_TAG_SIZE,
        }
    }
}
