//! 翻译接口客户端

use std::time::Duration;

use reqwest::Client;
use url::Url;

use super::config::TranslationConfig;
use super::error::{helpers, TranslationError, TranslationResult};
use super::protocol::{ErrorBody, TranslateTextsRequest, TranslateTextsResponse};

/// 文本翻译能力
///
/// 实现方必须返回与输入等长、顺序一致的译文。
#[allow(async_fn_in_trait)]
pub trait TextTranslator {
    async fn translate_texts(
        &self,
        texts: &[String],
        target_lang: &str,
    ) -> TranslationResult<Vec<String>>;
}

/// 通过 HTTP 调用 `{ texts, targetLang } -> { texts }` 接口
#[derive(Debug, Clone)]
pub struct HttpTranslator {
    client: Client,
    endpoint: Url,
    timeout: Duration,
}

impl HttpTranslator {
    pub fn new(endpoint: &str, timeout: Duration) -> TranslationResult<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            helpers::config_error(format!("接口地址无效 '{}': {}", endpoint, e))
        })?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| helpers::config_error(format!("无法创建 HTTP 客户端: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    pub fn from_config(config: &TranslationConfig) -> TranslationResult<Self> {
        Self::new(&config.endpoint_url, config.request_timeout())
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl TextTranslator for HttpTranslator {
    async fn translate_texts(
        &self,
        texts: &[String],
        target_lang: &str,
    ) -> TranslationResult<Vec<String>> {
        if texts.is_empty() {
            return Err(helpers::validation_error("翻译批次为空"));
        }

        let request = TranslateTextsRequest {
            texts: texts.to_vec(),
            target_lang: target_lang.to_string(),
        };

        tracing::debug!("POST {} ({} 条)", self.endpoint, texts.len());
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TranslationError::TimeoutError(format!(
                        "请求超过 {} 秒未完成",
                        self.timeout.as_secs()
                    ))
                } else {
                    TranslationError::from(e)
                }
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| {
                    status
                        .canonical_reason()
                        .unwrap_or("未知错误")
                        .to_string()
                });
            return Err(TranslationError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: TranslateTextsResponse = serde_json::from_str(&body)?;
        if parsed.texts.len() != texts.len() {
            return Err(helpers::contract_error(format!(
                "期望 {} 条译文，实际 {} 条",
                texts.len(),
                parsed.texts.len()
            )));
        }

        Ok(parsed.texts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_translate_texts_success() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/api/translate"))
            .and(matchers::body_json(serde_json::json!({
                "texts": ["Hello", "World"],
                "targetLang": "Portuguese"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "texts": ["Olá", "Mundo"] })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let translator =
            HttpTranslator::new(&format!("{}/api/translate", server.uri()), Duration::from_secs(5))
                .unwrap();
        let result = translator
            .translate_texts(&strings(&["Hello", "World"]), "Portuguese")
            .await
            .unwrap();
        assert_eq!(result, vec!["Olá", "Mundo"]);
    }

    #[tokio::test]
    async fn test_error_body_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(
                ResponseTemplate::new(429).set_body_json(serde_json::json!({ "error": "Rate limited" })),
            )
            .mount(&server)
            .await;

        let translator = HttpTranslator::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let error = translator
            .translate_texts(&strings(&["Hello"]), "German")
            .await
            .unwrap_err();
        assert_eq!(
            error,
            TranslationError::HttpStatus {
                status: 429,
                message: "Rate limited".into()
            }
        );
    }

    #[tokio::test]
    async fn test_length_mismatch_is_contract_violation() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "texts": ["Olá"] })),
            )
            .mount(&server)
            .await;

        let translator = HttpTranslator::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let error = translator
            .translate_texts(&strings(&["Hello", "World"]), "Portuguese")
            .await
            .unwrap_err();
        assert!(matches!(error, TranslationError::ContractViolation(_)));
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "texts": ["x"] }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let translator = HttpTranslator::new(&server.uri(), Duration::from_millis(50)).unwrap();
        let error = translator
            .translate_texts(&strings(&["Hello"]), "German")
            .await
            .unwrap_err();
        assert!(matches!(error, TranslationError::TimeoutError(_)));
    }

    #[tokio::test]
    async fn test_empty_batch_rejected_without_request() {
        let server = MockServer::start().await;
        Mock::given(matchers::any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let translator = HttpTranslator::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let error = translator.translate_texts(&[], "German").await.unwrap_err();
        assert!(matches!(error, TranslationError::InvalidInput(_)));
    }

    #[test]
    fn test_invalid_endpoint() {
        assert!(matches!(
            HttpTranslator::new("not a url", Duration::from_secs(1)),
            Err(TranslationError::ConfigError(_))
        ));
    }
}
