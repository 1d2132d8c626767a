//! 翻译代理集成测试
//!
//! 路由通过 tower oneshot 调用，上游模型服务由 wiremock 模拟

#![cfg(feature = "web")]

use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

use htmledit::web::{create_router, AppState, UpstreamConfig};

fn upstream_config(base_url: &str, api_key: Option<&str>) -> UpstreamConfig {
    UpstreamConfig {
        api_key: api_key.map(String::from),
        base_url: base_url.to_string(),
        timeout: Duration::from_secs(5),
        ..Default::default()
    }
}

fn router(config: UpstreamConfig) -> Router {
    create_router(AppState::new(config).unwrap())
}

async fn call(app: Router, method: Method, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri("/api/translate")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn reply_with_text(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "output": [{
            "type": "message",
            "content": [{ "type": "output_text", "text": text }]
        }]
    }))
}

#[cfg(test)]
mod passing {
    use super::*;

    #[tokio::test]
    async fn texts_mode_round_trip() {
        let upstream = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/v1/responses"))
            .and(matchers::header("authorization", "Bearer test-key"))
            .and(matchers::body_partial_json(json!({
                "model": "gpt-4.1-mini",
                "temperature": 0.2
            })))
            .respond_with(reply_with_text("Sure! [\"Olá\", \"{{name}}\"]"))
            .expect(1)
            .mount(&upstream)
            .await;

        let app = router(upstream_config(&upstream.uri(), Some("test-key")));
        let (status, body) = call(
            app,
            Method::POST,
            r#"{"texts":["Hello","{{name}}"],"targetLang":"Portuguese"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "texts": ["Olá", "{{name}}"] }));
    }

    #[tokio::test]
    async fn html_mode_unwraps_code_fences() {
        let upstream = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/v1/responses"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "output_text": "```html\n<p>Hallo</p>\n```" })),
            )
            .mount(&upstream)
            .await;

        let app = router(upstream_config(&upstream.uri(), Some("test-key")));
        let (status, body) = call(
            app,
            Method::POST,
            r#"{"html":"<p>Hello</p>","targetLang":"German"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "html": "<p>Hallo</p>" }));
    }

    #[tokio::test]
    async fn options_is_ok() {
        let app = router(upstream_config("http://127.0.0.1:9", None));
        let (status, _) = call(app, Method::OPTIONS, "").await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[cfg(test)]
mod failing {
    use super::*;

    #[tokio::test]
    async fn wrong_method() {
        let app = router(upstream_config("http://127.0.0.1:9", Some("k")));
        let (status, body) = call(app, Method::GET, "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], "Method Not Allowed");
    }

    #[tokio::test]
    async fn invalid_and_incomplete_bodies() {
        let cases = [
            ("", "Invalid JSON body"),
            ("{oops", "Invalid JSON body"),
            (r#"{"html":"<p>x</p>"}"#, "Missing html or targetLang"),
            (r#"{"texts":["x"]}"#, "Missing texts or targetLang"),
            (r#"{"texts":[],"targetLang":"German"}"#, "Empty texts batch"),
        ];

        for (body, message) in cases {
            let app = router(upstream_config("http://127.0.0.1:9", Some("k")));
            let (status, response) = call(app, Method::POST, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
            assert_eq!(response["error"], message);
        }
    }

    #[tokio::test]
    async fn missing_api_key() {
        let app = router(upstream_config("http://127.0.0.1:9", None));
        let (status, body) = call(
            app,
            Method::POST,
            r#"{"texts":["Hello"],"targetLang":"German"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Missing OPENAI_API_KEY env var");
    }

    #[tokio::test]
    async fn upstream_status_is_forwarded() {
        let upstream = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({ "error": { "message": "Incorrect API key provided" } })),
            )
            .mount(&upstream)
            .await;

        let app = router(upstream_config(&upstream.uri(), Some("bad")));
        let (status, body) = call(
            app,
            Method::POST,
            r#"{"texts":["Hello"],"targetLang":"German"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Incorrect API key provided");
        assert_eq!(body["raw"]["error"]["message"], "Incorrect API key provided");
    }

    #[tokio::test]
    async fn upstream_error_without_message() {
        let upstream = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&upstream)
            .await;

        let app = router(upstream_config(&upstream.uri(), Some("k")));
        let (status, body) = call(
            app,
            Method::POST,
            r#"{"html":"<p>Hello</p>","targetLang":"German"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "OpenAI API error");
    }

    #[tokio::test]
    async fn count_mismatch_is_server_error() {
        let upstream = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(reply_with_text("[\"only one\"]"))
            .mount(&upstream)
            .await;

        let app = router(upstream_config(&upstream.uri(), Some("k")));
        let (status, body) = call(
            app,
            Method::POST,
            r#"{"texts":["one","two"],"targetLang":"German"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("期望 2"));
    }

    #[tokio::test]
    async fn empty_html_output() {
        let upstream = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "output": [] })))
            .mount(&upstream)
            .await;

        let app = router(upstream_config(&upstream.uri(), Some("k")));
        let (status, body) = call(
            app,
            Method::POST,
            r#"{"html":"<p>Hello</p>","targetLang":"German"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Translation returned empty output");
        assert_eq!(body["raw"], json!({ "output": [] }));
    }

    #[tokio::test]
    async fn upstream_timeout() {
        let upstream = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(reply_with_text("[\"x\"]").set_delay(Duration::from_millis(500)))
            .mount(&upstream)
            .await;

        let config = UpstreamConfig {
            timeout: Duration::from_millis(50),
            ..upstream_config(&upstream.uri(), Some("k"))
        };
        let (status, body) = call(
            router(config),
            Method::POST,
            r#"{"texts":["Hello"],"targetLang":"German"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "OpenAI request timeout");
    }
}
