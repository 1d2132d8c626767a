//! 代理服务配置
//!
//! 使用类型安全的环境变量系统进行配置管理

use std::time::Duration;

use crate::env::{EnvError, EnvResult, EnvVar};

/// 上游模型服务配置
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamConfig {
    /// 缺失时每个翻译请求返回 500
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub timeout: Duration,
}

impl UpstreamConfig {
    /// 从环境变量创建配置
    pub fn from_env() -> EnvResult<Self> {
        use crate::env::upstream;

        Ok(Self {
            api_key: upstream::ApiKey::get_explicit().and_then(Result::ok),
            base_url: upstream::BaseUrl::get()?,
            model: upstream::Model::get()?,
            temperature: upstream::Temperature::get()?,
            timeout: upstream::Timeout::get()?,
        })
    }

    /// 上游 responses 接口地址
    pub fn responses_url(&self) -> String {
        format!("{}/v1/responses", self.base_url.trim_end_matches('/'))
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-4.1-mini".to_string(),
            temperature: 0.2,
            timeout: Duration::from_secs(90),
        }
    }
}

/// Web 服务器配置
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// 绑定地址
    pub bind_addr: String,
    /// 端口
    pub port: u16,
    pub upstream: UpstreamConfig,
}

impl WebConfig {
    /// 从环境变量创建配置
    pub fn from_env() -> EnvResult<Self> {
        use crate::env::web;

        Ok(Self {
            bind_addr: web::BindAddress::get()?,
            port: web::Port::get()?,
            upstream: UpstreamConfig::from_env()?,
        })
    }

    /// 验证配置
    pub fn validate(&self) -> EnvResult<()> {
        if self.bind_addr.is_empty() {
            return Err(EnvError {
                variable: "HTMLEDIT_WEB_BIND_ADDRESS".to_string(),
                message: "Bind address cannot be empty".to_string(),
            });
        }

        if self.port == 0 {
            return Err(EnvError {
                variable: "HTMLEDIT_WEB_PORT".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if self.upstream.api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY 未设置，翻译请求将返回 500");
        }

        Ok(())
    }

    /// 获取完整的监听地址
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self::from_env().unwrap_or_else(|e| {
            tracing::warn!("Failed to load web config from environment: {}. Using defaults.", e);
            Self {
                bind_addr: "127.0.0.1".to_string(),
                port: 7080,
                upstream: UpstreamConfig::default(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_responses_url() {
        let config = UpstreamConfig {
            base_url: "http://localhost:9000/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.responses_url(), "http://localhost:9000/v1/responses");
    }

    #[test]
    fn test_validate_rejects_port_zero() {
        let config = WebConfig {
            bind_addr: "127.0.0.1".to_string(),
            port: 0,
            upstream: UpstreamConfig::default(),
        };
        assert!(config.validate().is_err());
        assert_eq!(
            WebConfig { port: 7080, ..config }.listen_address(),
            "127.0.0.1:7080"
        );
    }
}
