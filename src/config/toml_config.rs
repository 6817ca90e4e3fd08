use crate::core::ConfigProvider;
use crate::utils::error::{DeckError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "deck.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub paths: PathsConfig,
    pub shuffle: ShuffleConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub default_deck: PathBuf,
    pub working_deck: PathBuf,
    pub report: PathBuf,
    pub image_folder: PathBuf,
    pub sound_folder: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            default_deck: PathBuf::from("assets/decks/major_arcana.json"),
            working_deck: PathBuf::from("assets/decks/workingDeck.json"),
            report: PathBuf::from("drawn_cards_report.txt"),
            image_folder: PathBuf::from("assets/images"),
            sound_folder: PathBuf::from("assets/sounds"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShuffleConfig {
    pub animation_frames: u32,
    pub frame_millis: u64,
}

impl Default for ShuffleConfig {
    fn default() -> Self {
        Self {
            animation_frames: 12,
            frame_millis: 60,
        }
    }
}

impl ShuffleConfig {
    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.frame_millis)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// 等待請求標頭的秒數
    pub read_timeout_secs: u64,
    /// 請求列加標頭的位元組上限
    pub max_request_bytes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
            read_timeout_secs: 10,
            max_request_bytes: 8 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| DeckError::ConfigError {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DeckError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 使用工作目錄下的配置檔，沒有時用內建預設值
    pub fn discover() -> Result<Self> {
        if Path::new(DEFAULT_CONFIG_FILE).is_file() {
            tracing::debug!("Using {}", DEFAULT_CONFIG_FILE);
            Self::from_file(DEFAULT_CONFIG_FILE)
        } else {
            Ok(Self::default())
        }
    }

    /// 替換環境變數 (例如 ${DECK_HOME})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DeckError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn bind_address(&self) -> Result<SocketAddr> {
        validation::validate_bind_address("server.bind", &self.server.bind)
    }
}

impl ConfigProvider for TomlConfig {
    fn default_deck(&self) -> &Path {
        &self.paths.default_deck
    }

    fn working_deck(&self) -> &Path {
        &self.paths.working_deck
    }

    fn report_path(&self) -> &Path {
        &self.paths.report
    }

    fn image_folder(&self) -> &Path {
        &self.paths.image_folder
    }

    fn sound_folder(&self) -> &Path {
        &self.paths.sound_folder
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        // 驗證路徑
        let paths = &self.paths;
        validation::validate_json_path("paths.default_deck", &paths.default_deck.to_string_lossy())?;
        validation::validate_json_path("paths.working_deck", &paths.working_deck.to_string_lossy())?;
        validation::validate_path("paths.report", &paths.report.to_string_lossy())?;
        validation::validate_path("paths.image_folder", &paths.image_folder.to_string_lossy())?;
        validation::validate_path("paths.sound_folder", &paths.sound_folder.to_string_lossy())?;

        if paths.default_deck == paths.working_deck {
            return Err(DeckError::InvalidConfigValueError {
                field: "paths.working_deck".to_string(),
                value: paths.working_deck.display().to_string(),
                reason: "must differ from paths.default_deck".to_string(),
            });
        }

        // 驗證洗牌動畫設定
        validation::validate_range("shuffle.animation_frames", self.shuffle.animation_frames, 0, 120)?;
        validation::validate_range("shuffle.frame_millis", self.shuffle.frame_millis, 0, 1000)?;
        // 驗證伺服器設定
        validation::validate_range("server.read_timeout_secs", self.server.read_timeout_secs, 1, 300)?;
        validation::validate_range(
            "server.max_request_bytes",
            self.server.max_request_bytes,
            256,
            1024 * 1024,
        )?;
        self.bind_address()?;

        Ok(())
    }
}
