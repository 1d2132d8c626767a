//! Web 模块的数据类型定义

use std::sync::Arc;

use super::config::UpstreamConfig;
use super::upstream::{UpstreamClient, UpstreamError};

/// 应用状态
#[derive(Debug, Clone)]
pub struct AppState {
    pub upstream: UpstreamClient,
}

impl AppState {
    pub fn new(config: UpstreamConfig) -> Result<Arc<Self>, UpstreamError> {
        Ok(Arc::new(Self {
            upstream: UpstreamClient::new(config)?,
        }))
    }
}

/// 请求体的两种模式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslateMode {
    /// `{ texts, targetLang }`
    Texts {
        texts: Vec<String>,
        target_lang: String,
    },
    /// `{ html, targetLang }`
    Html { html: String, target_lang: String },
}
