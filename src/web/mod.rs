//! 翻译代理服务
//!
//! 把 `{ texts, targetLang }` 和 `{ html, targetLang }` 请求转发给上游模型服务

pub mod config;
pub mod handlers;
pub mod routes;
pub mod types;
pub mod upstream;

pub use config::{UpstreamConfig, WebConfig};
pub use routes::create_routes;
pub use types::AppState;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;

use crate::core::{EditorError, EditorResult};

/// Web 服务器
pub struct WebServer {
    config: WebConfig,
}

impl WebServer {
    /// 创建新的 Web 服务器
    pub fn new(config: WebConfig) -> Self {
        Self { config }
    }

    /// 启动 Web 服务器
    pub async fn start(&self) -> EditorResult<()> {
        let app_state = AppState::new(self.config.upstream.clone())
            .map_err(|e| EditorError::invalid_input(format!("无法创建上游客户端: {}", e)))?;
        let app = create_router(app_state);

        let listener = tokio::net::TcpListener::bind(self.config.listen_address()).await?;
        tracing::info!(
            "翻译代理已启动: http://{}/api/translate (上游 {}, 模型 {})",
            self.config.listen_address(),
            self.config.upstream.base_url,
            self.config.upstream.model
        );

        axum::serve(listener, app).await?;
        Ok(())
    }
}

/// 创建路由器
pub fn create_router(app_state: Arc<AppState>) -> Router {
    create_routes()
        .with_state(app_state)
        .layer(CorsLayer::permissive())
}
