//! 翻译接口的请求与响应结构
//!
//! 客户端与代理共用这些类型。

use serde::{Deserialize, Serialize};

/// 逐片段翻译请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateTextsRequest {
    pub texts: Vec<String>,
    pub target_lang: String,
}

/// 逐片段翻译响应，`texts` 与请求一一对应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslateTextsResponse {
    pub texts: Vec<String>,
}

/// 整页翻译请求（兼容旧客户端）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyHtmlRequest {
    pub html: String,
    pub target_lang: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyHtmlResponse {
    pub html: String,
}

/// 非 2xx 响应的错误体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new<T: Into<String>>(error: T) -> Self {
        Self { error: error.into() }
    }
}
