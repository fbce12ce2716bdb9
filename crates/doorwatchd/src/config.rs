use doorwatch_core::{ContactId, Embedding, Person, Roster, RosterError, DEFAULT_TOLERANCE};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/doorwatch/doorwatch.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("telegram token missing (set [telegram].token or DOORWATCH_TELEGRAM_TOKEN)")]
    MissingToken,
    #[error("vision endpoint missing (set [vision].endpoint or DOORWATCH_VISION_ENDPOINT)")]
    MissingVisionEndpoint,
    #[error("roster: {0}")]
    Roster(#[from] RosterError),
}

/// Daemon configuration: a TOML file with `DOORWATCH_*` environment overrides.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub vision: VisionConfig,
    #[serde(default)]
    pub persons: Vec<PersonConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Device node or index (`"0"` means `/dev/video0`).
    pub device: String,
    pub width: u32,
    pub height: u32,
    /// Delay between frame reads.
    pub interval_ms: u64,
    /// Frames are shrunk by this factor before detection.
    pub downscale: u32,
    /// Number of frames to discard after opening (exposure stabilization).
    pub warmup_frames: usize,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: "/dev/video0".to_string(),
            width: 640,
            height: 480,
            interval_ms: 750,
            downscale: 4,
            warmup_frames: 4,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub token: String,
    pub api_url: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_url: "https://api.telegram.org".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// URL of the face encoding service.
    pub endpoint: String,
    /// Euclidean distance at or below which a face matches a roster entry.
    pub tolerance: f32,
    pub timeout_secs: u64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            tolerance: DEFAULT_TOLERANCE,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersonConfig {
    pub name: String,
    pub contact_id: String,
    pub encoding: Vec<f32>,
}

impl Config {
    /// Load `path`, apply environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&text)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Override values from `DOORWATCH_*` variables, read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(device) = lookup("DOORWATCH_CAMERA_DEVICE") {
            self.camera.device = device;
        }
        if let Some(token) = lookup("DOORWATCH_TELEGRAM_TOKEN") {
            self.telegram.token = token;
        }
        if let Some(endpoint) = lookup("DOORWATCH_VISION_ENDPOINT") {
            self.vision.endpoint = endpoint;
        }
        self.camera.interval_ms = parse_or(&lookup, "DOORWATCH_INTERVAL_MS", self.camera.interval_ms);
        self.vision.tolerance = parse_or(&lookup, "DOORWATCH_VISION_TOLERANCE", self.vision.tolerance);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram.token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if self.vision.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingVisionEndpoint);
        }
        self.roster()?;
        Ok(())
    }

    pub fn roster(&self) -> Result<Roster, RosterError> {
        Roster::new(
            self.persons
                .iter()
                .map(|p| Person {
                    name: p.name.clone(),
                    encoding: Embedding::new(p.encoding.clone()),
                    contact_id: ContactId(p.contact_id.clone()),
                })
                .collect(),
        )
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.camera.interval_ms)
    }
}

fn parse_or<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    const SAMPLE: &str = r#"
        [camera]
        device = "0"
        interval_ms = 500

        [telegram]
        token = "123:abc"

        [vision]
        endpoint = "http://127.0.0.1:8089/encode"

        [[persons]]
        name = "Alice"
        contact_id = "1001"
        encoding = [0.1, 0.2, 0.3]

        [[persons]]
        name = "Bob"
        contact_id = "1002"
        encoding = [0.3, 0.2, 0.1]
    "#;

    #[test]
    fn test_parse_sample_with_defaults() {
        let config = Config::from_toml(SAMPLE).unwrap();
        assert_eq!(config.camera.device, "0");
        assert_eq!(config.camera.interval_ms, 500);
        assert_eq!(config.camera.width, 640);
        assert_eq!(config.camera.downscale, 4);
        assert_eq!(config.telegram.api_url, "https://api.telegram.org");
        assert!((config.vision.tolerance - 0.6).abs() < 1e-6);
        assert!(config.validate().is_ok());

        let roster = config.roster().unwrap();
        let names: Vec<&str> = roster.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
        assert_eq!(roster.contact_of("Bob").map(|c| c.as_str()), Some("1002"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::from_toml(SAMPLE).unwrap();
        let env: HashMap<&str, &str> = HashMap::from([
            ("DOORWATCH_CAMERA_DEVICE", "/dev/video4"),
            ("DOORWATCH_TELEGRAM_TOKEN", "999:zzz"),
            ("DOORWATCH_INTERVAL_MS", "250"),
            ("DOORWATCH_VISION_TOLERANCE", "not-a-number"),
        ]);
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.camera.device, "/dev/video4");
        assert_eq!(config.telegram.token, "999:zzz");
        assert_eq!(config.interval(), Duration::from_millis(250));
        // Unparseable values keep the file value.
        assert!((config.vision.tolerance - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_missing_token_rejected() {
        let config = Config::from_toml("[vision]\nendpoint = \"http://x\"\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::MissingToken)));
    }

    #[test]
    fn test_missing_endpoint_rejected() {
        let config = Config::from_toml("[telegram]\ntoken = \"t\"\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::MissingVisionEndpoint)));
    }

    #[test]
    fn test_duplicate_person_rejected() {
        let text = format!(
            "{SAMPLE}\n[[persons]]\nname = \"Alice\"\ncontact_id = \"1003\"\nencoding = [0.0, 0.0, 0.0]\n"
        );
        let config = Config::from_toml(&text).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Roster(RosterError::DuplicateName(_)))
        ));
    }

    #[test]
    fn test_nan_encoding_rejected() {
        let text = format!(
            "{SAMPLE}\n[[persons]]\nname = \"Carol\"\ncontact_id = \"1003\"\nencoding = [nan, 0.0, 0.0]\n"
        );
        let config = Config::from_toml(&text).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Roster(RosterError::NonFiniteEncoding(name))) if name == "Carol"
        ));
    }

    #[test]
    fn test_empty_roster_is_allowed() {
        let config =
            Config::from_toml("[telegram]\ntoken = \"t\"\n[vision]\nendpoint = \"http://x\"\n").unwrap();
        assert!(config.validate().is_ok());
        assert!(config.roster().unwrap().is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.persons.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/doorwatch.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(Config::from_toml("[camera"), Err(ConfigError::Parse(_))));
    }
}
