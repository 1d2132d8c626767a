//! 上游模型服务（responses 接口）客户端

use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;

use super::config::UpstreamConfig;

/// 逐片段模式的系统提示
pub const TEXTS_SYSTEM_PROMPT: &str = "You are a professional translator.\n\
Translate every string of the JSON array you receive into the target language.\n\
Rules:\n\
- Return ONLY a JSON array of strings with exactly the same number of items, in the same order.\n\
- Keep placeholders such as {{...}}, %%...%%, {{$...}} and ${...} byte-for-byte unchanged.\n\
- Return numbers, codes, URLs and file names unchanged.\n\
- Do not add explanations or Markdown.";

/// 整页模式的系统提示
pub const HTML_SYSTEM_PROMPT: &str = "You are a professional translator.\n\
Translate the human-readable content of the HTML document into the target language.\n\
Rules:\n\
- Keep the HTML structure exactly: tags, order, indentation and attributes.\n\
- Never translate tag names, classes, ids, JavaScript, CSS, URLs, paths or file names.\n\
- Translate only visible text and the title, alt and aria-label attributes.\n\
- Keep placeholders such as {{...}}, %%...%%, {{$...}} and ${...} unchanged.\n\
- Return ONLY the final translated HTML.";

/// 上游调用错误
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("OpenAI request timeout")]
    Timeout,

    /// 上游返回非 2xx，`raw` 为上游响应体
    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        raw: Value,
    },

    #[error("{0}")]
    Network(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            UpstreamError::Timeout
        } else {
            UpstreamError::Network(error.to_string())
        }
    }
}

/// 一次调用的结果：提取出的文本和原始响应
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub text: String,
    pub raw: Value,
}

/// responses 接口客户端
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: Client,
    config: UpstreamConfig,
}

impl UpstreamClient {
    pub fn new(config: UpstreamConfig) -> Result<Self, UpstreamError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    /// 请求体：一条系统消息和一条用户消息
    pub fn request_body(&self, system_prompt: &str, user_prompt: &str) -> Value {
        json!({
            "model": self.config.model,
            "temperature": self.config.temperature,
            "input": [
                {
                    "role": "system",
                    "content": [{ "type": "input_text", "text": system_prompt }]
                },
                {
                    "role": "user",
                    "content": [{ "type": "input_text", "text": user_prompt }]
                }
            ]
        })
    }

    /// 调用上游并提取回复文本
    pub async fn complete(
        &self,
        api_key: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<UpstreamReply, UpstreamError> {
        let url = self.config.responses_url();
        tracing::debug!("POST {} (model {})", url, self.config.model);

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&self.request_body(system_prompt, user_prompt))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let raw: Value = serde_json::from_str(&body).unwrap_or_else(|_| json!({}));

        if !status.is_success() {
            let message = raw
                .pointer("/error/message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or("OpenAI API error")
                .to_string();
            tracing::warn!("上游返回 {}: {}", status, message);
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message,
                raw,
            });
        }

        Ok(UpstreamReply {
            text: extract_output_text(&raw),
            raw,
        })
    }
}

/// 取 `output_text`，否则拼接 `output[].content[]` 中类型为 `output_text` 的片段
pub fn extract_output_text(data: &Value) -> String {
    if let Some(text) = data.get("output_text").and_then(Value::as_str) {
        let text = text.trim();
        if !text.is_empty() {
            return text.to_string();
        }
    }

    let mut combined = String::new();
    let blocks = data.get("output").and_then(Value::as_array);
    for block in blocks.into_iter().flatten() {
        let parts = block.get("content").and_then(Value::as_array);
        for part in parts.into_iter().flatten() {
            if part.get("type").and_then(Value::as_str) != Some("output_text") {
                continue;
            }
            if let Some(text) = part.get("text").and_then(Value::as_str) {
                combined.push_str(text);
            }
        }
    }
    combined.trim().to_string()
}
