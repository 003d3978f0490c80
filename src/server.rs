//! # HTTP 服务器
//!
//! 单一 API 端点加健康检查。前端以 GET 或 POST 带 `action` 参数呼叫 `/api`，
//! 根路径与 `/api` 等价，兼容旧版前端的两种呼叫方式。

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, routing::get};
use sea_orm::DatabaseConnection;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api::WriteGate;
use crate::api::dispatch::{handle_get, handle_post};
use crate::config::AppConfig;
use crate::error::{Result, SiteLogError};

/// 路由共享状态
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub gate: Arc<WriteGate>,
}

impl AppState {
    #[must_use]
    pub fn new(db: DatabaseConnection, config: Arc<AppConfig>) -> Self {
        let gate = Arc::new(WriteGate::new(Duration::from_secs(
            config.locks.wait_timeout_secs,
        )));
        Self { db, config, gate }
    }
}

/// 组装路由与中间件
pub fn build_router(state: AppState) -> Router {
    let enable_cors = state.config.server.enable_cors;
    let cors_origins = state.config.server.cors_origins.clone();

    let mut app = Router::new()
        .route("/api", get(handle_get).post(handle_post))
        .route("/", get(handle_get).post(handle_post))
        .route("/ping", get(ping))
        .with_state(state);

    let service_builder = ServiceBuilder::new().layer(TraceLayer::new_for_http());
    if enable_cors {
        app = app.layer(service_builder.layer(build_cors_layer(&cors_origins)));
    } else {
        app = app.layer(service_builder);
    }
    app
}

fn build_cors_layer(cors_origins: &[String]) -> CorsLayer {
    let mut cors_layer = CorsLayer::new()
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
            axum::http::header::ORIGIN,
        ]);

    if cors_origins.contains(&"*".to_string()) {
        cors_layer = cors_layer.allow_origin(Any);
    } else {
        let origins = cors_origins
            .iter()
            .map(|origin| origin.parse::<axum::http::HeaderValue>())
            .collect::<std::result::Result<Vec<_>, _>>();
        match origins {
            Ok(origins) => cors_layer = cors_layer.allow_origin(origins),
            Err(e) => {
                warn!("CORS 源设置无效: {e}，回退为允许任意源");
                cors_layer = cors_layer.allow_origin(Any);
            }
        }
    }
    cors_layer
}

async fn ping() -> &'static str {
    "pong"
}

/// 绑定端口并开始服务
pub async fn serve(state: AppState) -> Result<()> {
    let bind_address = state.config.server.bind_address.clone();
    let port = state.config.server.port;
    let ip = bind_address
        .parse::<std::net::IpAddr>()
        .map_err(|e| SiteLogError::config(format!("无效的监听地址 '{bind_address}': {e}")))?;
    let addr = SocketAddr::new(ip, port);

    let router = build_router(state);
    info!("API 服务器启动于 {addr}");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
