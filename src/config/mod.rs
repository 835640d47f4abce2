// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Configuration module

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::alert::AlertConfig;
use crate::detection::PERSON_CLASS;
use crate::error::SentryError;
use crate::streaming::StreamingConfig;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Application name
    pub app_name: String,

    /// Log filter directive (`info`, `debug`, `sentrycam=trace,warn`, ...)
    pub log_level: String,

    /// Enable demo mode (simulated detector)
    pub demo_mode: bool,

    /// Frame source configuration
    pub camera: CameraConfig,

    /// Detection loop configuration
    pub detection: DetectionConfig,

    /// Alert configuration
    pub alert: AlertConfig,

    /// Control server configuration
    pub streaming: StreamingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "SentryCam".to_string(),
            log_level: "info".to_string(),
            demo_mode: false,
            camera: CameraConfig::default(),
            detection: DetectionConfig::default(),
            alert: AlertConfig::default(),
            streaming: StreamingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load or create default configuration
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            let config = Self::default();

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            config.save(path)?;
            Ok(config)
        }
    }

    /// Reject values the detection loop cannot run with
    pub fn validate(&self) -> std::result::Result<(), SentryError> {
        if let Err(e) = EnvFilter::try_new(&self.log_level) {
            return Err(SentryError::InvalidConfig {
                key: "log_level",
                message: e.to_string(),
            });
        }
        if self.detection.period_ms == 0 {
            return Err(SentryError::InvalidConfig {
                key: "detection.period_ms",
                message: "must be greater than zero".into(),
            });
        }
        if self.detection.remote_timeout_ms == 0 {
            return Err(SentryError::InvalidConfig {
                key: "detection.remote_timeout_ms",
                message: "must be greater than zero".into(),
            });
        }
        if let Some(min) = self.detection.min_confidence {
            if !(0.0..=1.0).contains(&min) {
                return Err(SentryError::InvalidConfig {
                    key: "detection.min_confidence",
                    message: format!("{} is outside [0, 1]", min),
                });
            }
        }
        if !(0.0..=1.0).contains(&self.camera.failure_rate) {
            return Err(SentryError::InvalidConfig {
                key: "camera.failure_rate",
                message: format!("{} is outside [0, 1]", self.camera.failure_rate),
            });
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(SentryError::InvalidConfig {
                key: "camera.width",
                message: "frame dimensions must be non-zero".into(),
            });
        }
        Ok(())
    }

    /// Log filter for the subscriber
    ///
    /// A level forced on the command line wins, then `RUST_LOG`, then
    /// `log_level` from the file.
    pub fn log_filter(&self, forced: Option<&str>) -> EnvFilter {
        let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
        EnvFilter::new(self.log_directive(forced, env.as_deref()))
    }

    fn log_directive<'a>(&'a self, forced: Option<&'a str>, env: Option<&'a str>) -> &'a str {
        forced
            .or(env.filter(|e| !e.trim().is_empty() && EnvFilter::try_new(e).is_ok()))
            .unwrap_or(&self.log_level)
    }

    /// Get configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("sentrycam"))
            .unwrap_or_else(|| PathBuf::from("./config"))
    }

    /// Get default configuration path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}

/// Frame source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Device identifier
    pub id: String,

    /// Frame width in pixels
    pub width: u32,

    /// Frame height in pixels
    pub height: u32,

    /// Probability of a simulated dropped read
    pub failure_rate: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            id: "cam0".to_string(),
            width: 320,
            height: 240,
            failure_rate: 0.0,
        }
    }
}

/// What to do when a frame read fails
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FrameFaultPolicy {
    /// Log, wait one period and read again; stop only on a reported disconnect
    #[default]
    Retry,
    /// Stop detection for good on the first failed read
    Halt,
}

/// Detection loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Class id treated as an intrusion (COCO 0 = person)
    pub target_class: u32,

    /// Minimum detector confidence for a detection to count; unset counts every detection of the class
    pub min_confidence: Option<f32>,

    /// Wait between iterations in milliseconds
    pub period_ms: u64,

    /// Frame read failure handling
    pub frame_fault_policy: FrameFaultPolicy,

    /// Set the running flag at startup
    pub start_on_launch: bool,

    /// Inference service endpoint
    pub remote_url: Option<String>,

    /// Inference request timeout in milliseconds
    pub remote_timeout_ms: u64,

    /// Demo mode: probability of a target detection per frame
    pub simulated_hit_rate: f64,

    /// Demo mode: probability of a detector fault per frame
    pub simulated_fault_rate: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            target_class: PERSON_CLASS,
            min_confidence: None,
            period_ms: 1000,
            frame_fault_policy: FrameFaultPolicy::Retry,
            start_on_launch: false,
            remote_url: None,
            remote_timeout_ms: 5000,
            simulated_hit_rate: 0.2,
            simulated_fault_rate: 0.0,
        }
    }
}

impl DetectionConfig {
    /// Wait between iterations
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    /// Inference request timeout
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.detection.target_class, 0);
        assert_eq!(config.detection.period(), Duration::from_secs(1));
        assert_eq!(config.detection.frame_fault_policy, FrameFaultPolicy::Retry);
        assert!(!config.detection.start_on_launch);
    }

    #[test]
    fn test_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            demo_mode = true

            [detection]
            period_ms = 250
            frame_fault_policy = "halt"
            "#,
        )
        .unwrap();

        assert!(config.demo_mode);
        assert_eq!(config.detection.period_ms, 250);
        assert_eq!(config.detection.frame_fault_policy, FrameFaultPolicy::Halt);
        assert_eq!(config.camera.width, 320);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.detection.period_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(SentryError::InvalidConfig { key: "detection.period_ms", .. })
        ));

        let mut config = Config::default();
        config.detection.min_confidence = Some(1.5);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.detection.remote_timeout_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(SentryError::InvalidConfig { key: "detection.remote_timeout_ms", .. })
        ));

        let mut config = Config::default();
        config.log_level = "sentrycam=loud".to_string();
        assert!(matches!(
            config.validate(),
            Err(SentryError::InvalidConfig { key: "log_level", .. })
        ));

        let mut config = Config::default();
        config.camera.height = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_level_from_file() {
        let config: Config = toml::from_str(r#"log_level = "debug""#).unwrap();
        assert!(config.validate().is_ok());

        assert_eq!(config.log_directive(None, None), "debug");
        assert_eq!(config.log_directive(None, Some("warn")), "warn");
        assert_eq!(config.log_directive(Some("trace"), Some("warn")), "trace");
        assert_eq!(config.log_directive(None, Some("sentrycam=loud")), "debug");
        assert_eq!(config.log_directive(None, Some("")), "debug");

        let filter = EnvFilter::new(config.log_directive(None, None));
        assert_eq!(filter.max_level_hint(), Some(tracing::level_filters::LevelFilter::DEBUG));
    }

    #[test]
    fn test_min_confidence_unset_by_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.detection.min_confidence, None);

        let config: Config = toml::from_str("[detection]\nmin_confidence = 0.6").unwrap();
        assert_eq!(config.detection.min_confidence, Some(0.6));
    }

    #[test]
    fn test_load_or_create() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let created = Config::load_or_create(&path).unwrap();
        assert!(path.exists());

        let mut edited = created.clone();
        edited.detection.period_ms = 40;
        edited.save(&path).unwrap();

        let loaded = Config::load_or_create(&path).unwrap();
        assert_eq!(loaded.detection.period_ms, 40);
        assert_eq!(loaded.app_name, created.app_name);
    }
}
