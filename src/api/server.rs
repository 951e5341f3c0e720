//! HTTP 服务 - 编排层
//!
//! 把业务能力挂到 axum 路由上。所有响应带 `Access-Control-Allow-Origin: *`，
//! OPTIONS 预检由 CORS 中间件统一处理

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::routes;
use crate::clients::GeminiClient;
use crate::config::Config;
use crate::services::{ProfileService, QuestionService, VideoService, VisualizationService};

/// 各 handler 共享的应用状态
pub struct AppState {
    pub profile_service: ProfileService,
    pub question_service: QuestionService,
    pub visualization_service: VisualizationService,
    pub video_service: VideoService,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let client = Arc::new(GeminiClient::new(config));
        Self {
            profile_service: ProfileService::new(client.clone(), config),
            question_service: QuestionService::new(client.clone(), config),
            visualization_service: VisualizationService::new(client.clone(), config),
            video_service: VideoService::new(client, config),
        }
    }
}

/// 组装路由（测试也从这里拿 Router）
pub fn build_router(state: Arc<AppState>) -> Router {
    // 前端域名不固定，放开所有来源
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::quiz_routes())
        .merge(routes::video_routes())
        .merge(routes::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// 运行 HTTP 服务
pub async fn run(state: AppState, bind_addr: &str) -> Result<()> {
    let app = build_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("📡 监听 http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
