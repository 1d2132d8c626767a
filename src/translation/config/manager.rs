//! 简化的配置管理器
//!
//! 提供统一的配置接口，支持文件配置、环境变量和默认值

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constants;
use crate::translation::error::{TranslationError, TranslationResult};

/// 翻译客户端配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// 文本模式翻译接口地址
    pub endpoint_url: String,
    pub target_lang: String,
    /// 每个请求最多携带的文本条数
    pub batch_size: usize,
    pub request_timeout_secs: u64,
}

impl TranslationConfig {
    /// 创建带指定语言的默认配置
    pub fn default_with_lang(target_lang: &str, endpoint_url: Option<&str>) -> Self {
        let mut config = Self::default();
        config.target_lang = target_lang.to_string();
        if let Some(url) = endpoint_url {
            config.endpoint_url = url.to_string();
        }
        config
    }

    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        match url::Url::parse(&self.endpoint_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => {
                return Err(TranslationError::ConfigError(format!(
                    "不支持的接口协议: {}",
                    url.scheme()
                )))
            }
            Err(e) => {
                return Err(TranslationError::ConfigError(format!(
                    "接口地址无效 '{}': {}",
                    self.endpoint_url, e
                )))
            }
        }

        if self.batch_size == 0 || self.batch_size > constants::MAX_BATCH_SIZE {
            return Err(TranslationError::ConfigError(format!(
                "批次大小必须在 1 到 {} 之间",
                constants::MAX_BATCH_SIZE
            )));
        }

        if self.request_timeout_secs == 0
            || self.request_timeout_secs > constants::MAX_REQUEST_TIMEOUT_SECS
        {
            return Err(TranslationError::ConfigError(format!(
                "请求超时必须在 1 到 {} 秒之间",
                constants::MAX_REQUEST_TIMEOUT_SECS
            )));
        }

        if self.target_lang.trim().is_empty() {
            return Err(TranslationError::ConfigError("目标语言不能为空".to_string()));
        }

        Ok(())
    }

    /// 应用环境变量覆盖（仅覆盖显式设置的变量）
    pub fn apply_env_overrides(&mut self) -> TranslationResult<()> {
        use crate::env::{translation, EnvVar};

        if let Some(endpoint) = translation::Endpoint::get_explicit() {
            self.endpoint_url = endpoint?;
            tracing::info!("环境变量覆盖接口地址: {}", self.endpoint_url);
        }

        if let Some(target_lang) = translation::TargetLang::get_explicit() {
            self.target_lang = target_lang?;
        }

        if let Some(batch_size) = translation::BatchSize::get_explicit() {
            self.batch_size = batch_size?;
        }

        if let Some(timeout) = translation::RequestTimeout::get_explicit() {
            self.request_timeout_secs = timeout?.as_secs();
        }

        Ok(())
    }

    /// 转换为Duration类型
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint_url: constants::DEFAULT_ENDPOINT_URL.to_string(),
            target_lang: constants::DEFAULT_TARGET_LANG.to_string(),
            batch_size: constants::DEFAULT_BATCH_SIZE,
            request_timeout_secs: constants::DEFAULT_REQUEST_TIMEOUT.as_secs(),
        }
    }
}

/// 简化的配置管理器
pub struct ConfigManager {
    config: TranslationConfig,
    source: Option<String>,
}

impl ConfigManager {
    /// 按搜索路径加载配置
    pub fn new() -> TranslationResult<Self> {
        Self::load_dotenv();

        let mut source = None;
        let mut config = TranslationConfig::default();
        for path in constants::CONFIG_PATHS {
            let expanded_path = shellexpand::tilde(path);
            if Path::new(expanded_path.as_ref()).exists() {
                tracing::info!("加载配置文件: {}", expanded_path);
                config = Self::load_from_file(&expanded_path)?;
                source = Some(expanded_path.into_owned());
                break;
            }
        }
        if source.is_none() {
            tracing::debug!("未找到配置文件，使用默认配置");
        }

        Self::finish(config, source)
    }

    /// 从指定文件加载配置
    pub fn from_path(path: &str) -> TranslationResult<Self> {
        Self::load_dotenv();

        let expanded_path = shellexpand::tilde(path);
        let config = Self::load_from_file(&expanded_path)?;
        Self::finish(config, Some(expanded_path.into_owned()))
    }

    fn finish(mut config: TranslationConfig, source: Option<String>) -> TranslationResult<Self> {
        config.apply_env_overrides()?;
        config.validate()?;

        Ok(Self { config, source })
    }

    /// 获取配置
    pub fn get_config(&self) -> &TranslationConfig {
        &self.config
    }

    /// 取出配置
    pub fn into_config(self) -> TranslationConfig {
        self.config
    }

    /// 配置来源文件
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn load_from_file(path: &str) -> TranslationResult<TranslationConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TranslationError::ConfigError(format!("读取配置文件失败: {}", e)))?;

        if path.ends_with(".toml") {
            toml::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析TOML配置失败: {}", e)))
        } else {
            serde_json::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析JSON配置失败: {}", e)))
        }
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        let env_files = [".env.local", ".env.development", ".env.production", ".env"];

        for env_file in &env_files {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::info!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config(path: &str) -> TranslationResult<()> {
        let config = TranslationConfig::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| TranslationError::ConfigError(format!("序列化配置失败: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| TranslationError::ConfigError(format!("写入配置文件失败: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = TranslationConfig::default();
        assert_eq!(config.batch_size, 50);
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = TranslationConfig::default_with_lang("French", Some("ftp://x"));
        assert!(matches!(
            config.validate(),
            Err(TranslationError::ConfigError(_))
        ));

        config.endpoint_url = "https://translate.example.com/api".to_string();
        config.batch_size = 0;
        assert!(config.validate().is_err());

        config.batch_size = 40;
        config.request_timeout_secs = 301;
        assert!(config.validate().is_err());

        config.request_timeout_secs = 25;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "endpoint_url = \"http://localhost:9999/api/translate\"\nbatch_size = 40\n",
        )
        .unwrap();

        let manager = ConfigManager::from_path(path.to_str().unwrap()).unwrap();
        let config = manager.get_config();
        assert_eq!(config.batch_size, 40);
        assert_eq!(config.endpoint_url, "http://localhost:9999/api/translate");
        // 未指定的字段使用默认值
        assert_eq!(config.request_timeout_secs, 60);
        assert!(manager.source().unwrap().ends_with("custom.toml"));
    }

    #[test]
    fn test_example_config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("example.toml");
        ConfigManager::generate_example_config(path.to_str().unwrap()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: TranslationConfig = toml::from_str(&content).unwrap();
        assert_eq!(parsed, TranslationConfig::default());
    }
}
