//! 核心中间件模块

use axum::{extract::Request, middleware::Next, response::Response};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{info, warn};

static REQ_ID: AtomicU64 = AtomicU64::new(1);

/// 请求日志中间件：记录方法、路径、状态码和耗时，失败请求用 warn 级别
pub async fn request_logging_middleware(req: Request, next: Next) -> Response {
    let req_id = REQ_ID.fetch_add(1, Ordering::Relaxed);
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;
    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis() as u64;

    if status.is_success() {
        info!(req_id, %method, %uri, status = status.as_u16(), elapsed_ms, "请求完成");
    } else {
        warn!(req_id, %method, %uri, status = status.as_u16(), elapsed_ms, "请求失败");
    }

    response
}
