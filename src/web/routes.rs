//! Web 路由定义

use std::sync::Arc;

use axum::{routing::post, Router};

use crate::web::{handlers::*, types::AppState};

/// 创建路由结构
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api/translate",
        post(translate)
            .options(translate_options)
            .fallback(method_not_allowed),
    )
}
