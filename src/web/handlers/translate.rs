//! `/api/translate` 处理器
//!
//! 无状态代理：校验请求，转发给上游模型，解析并校验回复。

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};

use crate::translation::protocol::{LegacyHtmlResponse, TranslateTextsResponse};
use crate::translation::reply::{parse_translated_texts, unwrap_code_fences};
use crate::web::types::{AppState, TranslateMode};
use crate::web::upstream::{UpstreamError, HTML_SYSTEM_PROMPT, TEXTS_SYSTEM_PROMPT};

type ApiError = (StatusCode, Json<Value>);

fn error_response(status: StatusCode, message: &str) -> ApiError {
    (status, Json(json!({ "error": message })))
}

fn error_with_raw(status: StatusCode, message: &str, raw: Value) -> ApiError {
    (status, Json(json!({ "error": message, "raw": raw })))
}

/// 预检请求
pub async fn translate_options() -> StatusCode {
    StatusCode::OK
}

pub async fn method_not_allowed() -> ApiError {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}

fn non_empty_str<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// 解析请求体，判断翻译模式
pub fn parse_request(body: &[u8]) -> Result<TranslateMode, ApiError> {
    let raw = String::from_utf8_lossy(body);
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(error_response(StatusCode::BAD_REQUEST, "Invalid JSON body"));
    }

    let value: Value = serde_json::from_str(raw)
        .map_err(|_| error_response(StatusCode::BAD_REQUEST, "Invalid JSON body"))?;
    if value.is_null() {
        return Err(error_response(StatusCode::BAD_REQUEST, "Invalid JSON body"));
    }

    let target_lang = non_empty_str(&value, "targetLang");

    if let Some(texts) = value.get("texts") {
        let texts: Option<Vec<String>> = texts.as_array().and_then(|items| {
            items
                .iter()
                .map(|item| item.as_str().map(String::from))
                .collect()
        });
        let (Some(texts), Some(target_lang)) = (texts, target_lang) else {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "Missing texts or targetLang",
            ));
        };
        if texts.is_empty() {
            return Err(error_response(StatusCode::BAD_REQUEST, "Empty texts batch"));
        }
        return Ok(TranslateMode::Texts {
            texts,
            target_lang: target_lang.to_string(),
        });
    }

    match (non_empty_str(&value, "html"), target_lang) {
        (Some(html), Some(target_lang)) => Ok(TranslateMode::Html {
            html: html.to_string(),
            target_lang: target_lang.to_string(),
        }),
        _ => Err(error_response(
            StatusCode::BAD_REQUEST,
            "Missing html or targetLang",
        )),
    }
}

fn upstream_failure(error: UpstreamError) -> ApiError {
    tracing::error!("上游调用失败: {}", error);
    match error {
        UpstreamError::Timeout => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "OpenAI request timeout")
        }
        UpstreamError::Status {
            status,
            message,
            raw,
        } => error_with_raw(
            StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
            &message,
            raw,
        ),
        UpstreamError::Network(message) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &message)
        }
    }
}

/// 翻译接口
pub async fn translate(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    match handle_translate(&state, &body).await {
        Ok(response) => response,
        Err(error) => error.into_response(),
    }
}

async fn handle_translate(state: &AppState, body: &[u8]) -> Result<Response, ApiError> {
    let mode = parse_request(body)?;

    let Some(api_key) = state.upstream.config().api_key.as_deref() else {
        return Err(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Missing OPENAI_API_KEY env var",
        ));
    };

    match mode {
        TranslateMode::Texts { texts, target_lang } => {
            tracing::info!("翻译 {} 条文本 -> {}", texts.len(), target_lang);
            let payload = serde_json::to_string(&texts).map_err(|e| {
                error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
            })?;
            let user_prompt = format!("Target language: {}\n\nTexts (JSON array):\n{}", target_lang, payload);

            let reply = state
                .upstream
                .complete(api_key, TEXTS_SYSTEM_PROMPT, &user_prompt)
                .await
                .map_err(upstream_failure)?;

            let translated = parse_translated_texts(&reply.text, texts.len()).map_err(|e| {
                tracing::error!("上游回复无效: {}", e);
                error_with_raw(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &format!("Invalid translation output: {}", e),
                    reply.raw.clone(),
                )
            })?;

            Ok((StatusCode::OK, Json(TranslateTextsResponse { texts: translated })).into_response())
        }
        TranslateMode::Html { html, target_lang } => {
            tracing::info!("翻译整页 ({} 字节) -> {}", html.len(), target_lang);
            let user_prompt = format!("Target language: {}\n\nHTML:\n{}", target_lang, html);

            let reply = state
                .upstream
                .complete(api_key, HTML_SYSTEM_PROMPT, &user_prompt)
                .await
                .map_err(upstream_failure)?;

            let translated = unwrap_code_fences(&reply.text);
            if translated.is_empty() {
                return Err(error_with_raw(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Translation returned empty output",
                    reply.raw,
                ));
            }

            Ok((StatusCode::OK, Json(LegacyHtmlResponse { html: translated })).into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_message(result: Result<TranslateMode, ApiError>) -> (StatusCode, String) {
        let (status, Json(body)) = result.unwrap_err();
        (status, body["error"].as_str().unwrap_or_default().to_string())
    }

    #[test]
    fn test_invalid_bodies() {
        for body in ["", "   ", "{not json", "null"] {
            assert_eq!(
                error_message(parse_request(body.as_bytes())),
                (StatusCode::BAD_REQUEST, "Invalid JSON body".to_string())
            );
        }
    }

    #[test]
    fn test_missing_fields() {
        assert_eq!(
            error_message(parse_request(br#"{"html":"<p>x</p>"}"#)).1,
            "Missing html or targetLang"
        );
        assert_eq!(
            error_message(parse_request(br#"{"texts":["a"]}"#)).1,
            "Missing texts or targetLang"
        );
        assert_eq!(
            error_message(parse_request(br#"{"texts":[1],"targetLang":"German"}"#)).1,
            "Missing texts or targetLang"
        );
        assert_eq!(
            error_message(parse_request(br#"{"texts":[],"targetLang":"German"}"#)).1,
            "Empty texts batch"
        );
    }

    #[test]
    fn test_modes() {
        assert_eq!(
            parse_request(br#"{"texts":["Hello"],"targetLang":"German"}"#).unwrap(),
            TranslateMode::Texts {
                texts: vec!["Hello".into()],
                target_lang: "German".into()
            }
        );
        assert_eq!(
            parse_request(br#"{"html":"<p>Hi</p>","targetLang":"German"}"#).unwrap(),
            TranslateMode::Html {
                html: "<p>Hi</p>".into(),
                target_lang: "German".into()
            }
        );
    }
}
