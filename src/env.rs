//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量访问，编辑器、翻译客户端和代理服务共用

use std::env;
use std::fmt;
use std::time::Duration;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }

    /// 仅当变量被显式设置时返回解析结果
    fn get_explicit() -> Option<EnvResult<T>> {
        env::var(Self::NAME).ok().map(|value| Self::parse(&value))
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "HTMLEDIT_LOG_LEVEL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    /// 禁用颜色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // NO_COLOR 遵循标准：任何值都表示禁用颜色
            Ok(!value.is_empty())
        }
    }

    /// 加载时清理字面量 `\n` 转义
    pub struct Sanitize;
    impl EnvVar<bool> for Sanitize {
        const NAME: &'static str = "HTMLEDIT_SANITIZE";
        const DEFAULT: Option<bool> = Some(true);
        const DESCRIPTION: &'static str =
            "Strip BOM and literal \\n escape sequences when loading documents";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }
}

/// 翻译客户端环境变量
pub mod translation {
    use super::*;

    /// 翻译接口地址
    pub struct Endpoint;
    impl EnvVar<String> for Endpoint {
        const NAME: &'static str = "HTMLEDIT_TRANSLATE_ENDPOINT";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("http://127.0.0.1:7080/api/translate".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Translation endpoint URL (texts mode)";

        fn parse(value: &str) -> EnvResult<String> {
            parse_http_url(value, Self::NAME)
        }
    }

    /// 默认目标语言
    pub struct TargetLang;
    impl EnvVar<String> for TargetLang {
        const NAME: &'static str = "HTMLEDIT_TARGET_LANG";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("English".to_string()),
            }
        }
        const DESCRIPTION: &'static str =
            "Default target language name, e.g. 'Portuguese (Brazil)'";

        fn parse(value: &str) -> EnvResult<String> {
            let lang = value.trim();
            if lang.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Target language must not be empty".to_string(),
                });
            }
            Ok(lang.to_string())
        }
    }

    /// 批次大小（每个请求的文本条数）
    pub struct BatchSize;
    impl EnvVar<usize> for BatchSize {
        const NAME: &'static str = "HTMLEDIT_BATCH_SIZE";
        const DEFAULT: Option<usize> = Some(50);
        const DESCRIPTION: &'static str = "Maximum texts per translation request";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 200)
        }
    }

    /// 单个请求超时
    pub struct RequestTimeout;
    impl EnvVar<Duration> for RequestTimeout {
        const NAME: &'static str = "HTMLEDIT_REQUEST_TIMEOUT";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(60));
        const DESCRIPTION: &'static str = "Translation request timeout in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_timeout_secs(value, Self::NAME, 300)
        }
    }
}

/// 上游模型服务环境变量（代理使用）
pub mod upstream {
    use super::*;

    /// OpenAI API 密钥
    pub struct ApiKey;
    impl EnvVar<String> for ApiKey {
        const NAME: &'static str = "OPENAI_API_KEY";
        const DEFAULT: Option<String> = None; // 无默认值，必须设置
        const DESCRIPTION: &'static str = "API key for the upstream model service";

        fn parse(value: &str) -> EnvResult<String> {
            let key = value.trim();
            if key.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "API key must not be empty".to_string(),
                });
            }
            Ok(key.to_string())
        }
    }

    /// 上游基础地址
    pub struct BaseUrl;
    impl EnvVar<String> for BaseUrl {
        const NAME: &'static str = "HTMLEDIT_UPSTREAM_BASE_URL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("https://api.openai.com".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Base URL of the upstream responses API";

        fn parse(value: &str) -> EnvResult<String> {
            parse_http_url(value, Self::NAME).map(|url| url.trim_end_matches('/').to_string())
        }
    }

    /// 模型名称
    pub struct Model;
    impl EnvVar<String> for Model {
        const NAME: &'static str = "HTMLEDIT_UPSTREAM_MODEL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("gpt-4.1-mini".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Upstream model name";

        fn parse(value: &str) -> EnvResult<String> {
            let model = value.trim();
            if model.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Model name must not be empty".to_string(),
                });
            }
            Ok(model.to_string())
        }
    }

    /// 采样温度
    pub struct Temperature;
    impl EnvVar<f64> for Temperature {
        const NAME: &'static str = "HTMLEDIT_UPSTREAM_TEMPERATURE";
        const DEFAULT: Option<f64> = Some(0.2);
        const DESCRIPTION: &'static str = "Sampling temperature (0.0 - 2.0)";

        fn parse(value: &str) -> EnvResult<f64> {
            let temperature: f64 = value.parse().map_err(|_| EnvError {
                variable: Self::NAME.to_string(),
                message: "Must be a valid number".to_string(),
            })?;

            if !(0.0..=2.0).contains(&temperature) {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Temperature must be between 0.0 and 2.0".to_string(),
                });
            }

            Ok(temperature)
        }
    }

    /// 上游请求超时
    pub struct Timeout;
    impl EnvVar<Duration> for Timeout {
        const NAME: &'static str = "HTMLEDIT_UPSTREAM_TIMEOUT";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(90));
        const DESCRIPTION: &'static str = "Upstream request timeout in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_timeout_secs(value, Self::NAME, 300)
        }
    }
}

/// Web服务环境变量
pub mod web {
    use super::*;

    /// 绑定地址
    pub struct BindAddress;
    impl EnvVar<String> for BindAddress {
        const NAME: &'static str = "HTMLEDIT_WEB_BIND_ADDRESS";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("127.0.0.1".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Proxy server bind address";

        fn parse(value: &str) -> EnvResult<String> {
            let addr = value.trim();
            if addr.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Bind address cannot be empty".to_string(),
                });
            }
            Ok(addr.to_string())
        }
    }

    /// 端口
    pub struct Port;
    impl EnvVar<u16> for Port {
        const NAME: &'static str = "HTMLEDIT_WEB_PORT";
        const DEFAULT: Option<u16> = Some(7080);
        const DESCRIPTION: &'static str = "Proxy server port";

        fn parse(value: &str) -> EnvResult<u16> {
            let port: u16 = value.parse().map_err(|_| EnvError {
                variable: Self::NAME.to_string(),
                message: "Must be a valid port number (1-65535)".to_string(),
            })?;

            if port == 0 {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Port must be greater than 0".to_string(),
                });
            }

            Ok(port)
        }
    }
}

/// 辅助函数
fn parse_bool(value: &str, var_name: &str) -> EnvResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: format!(
                "Invalid boolean value '{}'. Use: true/false, 1/0, yes/no, on/off, enabled/disabled",
                value
            ),
        }),
    }
}

fn parse_positive_usize(value: &str, var_name: &str, min: usize, max: usize) -> EnvResult<usize> {
    let num: usize = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

fn parse_timeout_secs(value: &str, var_name: &str, max: u64) -> EnvResult<Duration> {
    let seconds: u64 = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid number of seconds".to_string(),
    })?;

    if seconds == 0 {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: "Timeout must be greater than 0".to_string(),
        });
    }

    if seconds > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Timeout too long (max {} seconds)", max),
        });
    }

    Ok(Duration::from_secs(seconds))
}

fn parse_http_url(value: &str, var_name: &str) -> EnvResult<String> {
    let raw = value.trim();
    match url::Url::parse(raw) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(raw.to_string()),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: "URL must start with http:// or https://".to_string(),
        }),
    }
}

/// 是否启用彩色输出（`NO_COLOR` 未设置时）
pub fn color_enabled() -> bool {
    !core::NoColor::get_or_default(false)
}

/// 环境变量配置汇总
#[derive(Debug, Clone)]
pub struct EnvConfig {
    // 核心配置
    pub log_level: String,
    pub no_color: bool,
    pub sanitize: bool,

    // 翻译客户端配置
    pub translation_endpoint: String,
    pub translation_target_lang: String,
    pub translation_batch_size: usize,
    pub translation_request_timeout: Duration,

    // 上游配置
    pub upstream_api_key: Option<String>,
    pub upstream_base_url: String,
    pub upstream_model: String,
    pub upstream_temperature: f64,
    pub upstream_timeout: Duration,

    // Web配置
    pub web_bind_address: String,
    pub web_port: u16,
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            log_level: core::LogLevel::get()?,
            no_color: core::NoColor::get()?,
            sanitize: core::Sanitize::get()?,

            translation_endpoint: translation::Endpoint::get()?,
            translation_target_lang: translation::TargetLang::get()?,
            translation_batch_size: translation::BatchSize::get()?,
            translation_request_timeout: translation::RequestTimeout::get()?,

            upstream_api_key: upstream::ApiKey::get().ok(),
            upstream_base_url: upstream::BaseUrl::get()?,
            upstream_model: upstream::Model::get()?,
            upstream_temperature: upstream::Temperature::get()?,
            upstream_timeout: upstream::Timeout::get()?,

            web_bind_address: web::BindAddress::get()?,
            web_port: web::Port::get()?,
        })
    }

    /// 打印配置摘要（隐藏敏感信息）
    pub fn print_summary(&self) {
        println!("Environment Configuration Summary:");
        println!("  Log Level: {}", self.log_level);
        println!("  Translate Endpoint: {}", self.translation_endpoint);
        println!(
            "  Batch: {} texts, {}s timeout",
            self.translation_batch_size,
            self.translation_request_timeout.as_secs()
        );
        println!("  Upstream: {} ({})", self.upstream_base_url, self.upstream_model);
        println!("  Proxy: {}:{}", self.web_bind_address, self.web_port);
        if self.upstream_api_key.is_some() {
            println!("  API Key: [configured]");
        }
    }
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("# Environment Variables\n\n");
    docs.push_str("| Variable | Description | Default |\n");
    docs.push_str("|----------|-------------|---------|\n");

    let rows: [(&str, &str, String); 14] = [
        (core::LogLevel::NAME, core::LogLevel::DESCRIPTION, "info".into()),
        (core::NoColor::NAME, core::NoColor::DESCRIPTION, "unset".into()),
        (core::Sanitize::NAME, core::Sanitize::DESCRIPTION, "true".into()),
        (
            translation::Endpoint::NAME,
            translation::Endpoint::DESCRIPTION,
            "http://127.0.0.1:7080/api/translate".into(),
        ),
        (
            translation::TargetLang::NAME,
            translation::TargetLang::DESCRIPTION,
            "English".into(),
        ),
        (
            translation::BatchSize::NAME,
            translation::BatchSize::DESCRIPTION,
            format!("{:?}", translation::BatchSize::DEFAULT),
        ),
        (
            translation::RequestTimeout::NAME,
            translation::RequestTimeout::DESCRIPTION,
            format!("{:?}", translation::RequestTimeout::DEFAULT),
        ),
        (upstream::ApiKey::NAME, upstream::ApiKey::DESCRIPTION, "required".into()),
        (
            upstream::BaseUrl::NAME,
            upstream::BaseUrl::DESCRIPTION,
            "https://api.openai.com".into(),
        ),
        (upstream::Model::NAME, upstream::Model::DESCRIPTION, "gpt-4.1-mini".into()),
        (
            upstream::Temperature::NAME,
            upstream::Temperature::DESCRIPTION,
            format!("{:?}", upstream::Temperature::DEFAULT),
        ),
        (
            upstream::Timeout::NAME,
            upstream::Timeout::DESCRIPTION,
            format!("{:?}", upstream::Timeout::DEFAULT),
        ),
        (web::BindAddress::NAME, web::BindAddress::DESCRIPTION, "127.0.0.1".into()),
        (
            web::Port::NAME,
            web::Port::DESCRIPTION,
            format!("{:?}", web::Port::DEFAULT),
        ),
    ];

    for (name, description, default) in rows.iter() {
        docs.push_str(&format!("| `{}` | {} | {} |\n", name, description, default));
    }

    docs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(core::LogLevel::parse("DEBUG").unwrap(), "debug");
        assert!(core::LogLevel::parse("verbose").is_err());
    }

    #[test]
    fn test_boolean_parsing() {
        assert!(parse_bool("true", "X").unwrap());
        assert!(parse_bool("YES", "X").unwrap());
        assert!(!parse_bool("off", "X").unwrap());
        assert!(parse_bool("maybe", "X").is_err());
        assert!(!core::Sanitize::parse("disabled").unwrap());
    }

    #[test]
    fn test_url_validation() {
        assert!(translation::Endpoint::parse("http://localhost:7080/api/translate").is_ok());
        assert!(translation::Endpoint::parse("https://edit.example.com/api").is_ok());

        assert!(translation::Endpoint::parse("ftp://example.com").is_err());
        assert!(translation::Endpoint::parse("not-a-url").is_err());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        assert_eq!(
            upstream::BaseUrl::parse("https://api.openai.com/").unwrap(),
            "https://api.openai.com"
        );
    }

    #[test]
    fn test_numeric_validation() {
        assert_eq!(translation::BatchSize::parse("40").unwrap(), 40);
        assert!(translation::BatchSize::parse("0").is_err());
        assert!(translation::BatchSize::parse("201").is_err());

        assert_eq!(
            translation::RequestTimeout::parse("25").unwrap(),
            Duration::from_secs(25)
        );
        assert!(translation::RequestTimeout::parse("0").is_err());
        assert!(translation::RequestTimeout::parse("301").is_err());

        assert!(upstream::Temperature::parse("0.2").is_ok());
        assert!(upstream::Temperature::parse("3").is_err());
    }

    #[test]
    fn test_env_config_loading() {
        env::set_var("HTMLEDIT_WEB_PORT", "8088");
        env::set_var("HTMLEDIT_UPSTREAM_MODEL", "gpt-4.1");

        let config = EnvConfig::from_env().unwrap();
        assert_eq!(config.web_port, 8088);
        assert_eq!(config.upstream_model, "gpt-4.1");

        env::remove_var("HTMLEDIT_WEB_PORT");
        env::remove_var("HTMLEDIT_UPSTREAM_MODEL");
    }

    #[test]
    fn test_env_docs_lists_every_variable() {
        let docs = generate_env_docs();
        assert!(docs.contains("OPENAI_API_KEY"));
        assert!(docs.contains("HTMLEDIT_BATCH_SIZE"));
        assert!(docs.contains("HTMLEDIT_WEB_PORT"));
    }
}
