//! 本地沙箱 REST 服务
//!
//! 与公共沙箱 API 相同的 `/objects` 接口，数据保存在内存中，
//! 用于离线运行和端到端测试。

use axum::{
    extract::{Path, Query, State},
    middleware,
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use uuid::Uuid;

use crate::app::product::model::{DeleteAck, Product, ProductData, ProductPayload};
use crate::core::{error::CoreError, middleware::request_logging_middleware};

/// 沙箱中保存的对象
#[derive(Debug, Clone)]
struct StoredObject {
    id: String,
    name: String,
    data: ProductData,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    seq: u64,
}

#[derive(Default)]
struct Objects {
    by_id: HashMap<String, StoredObject>,
    next_seq: u64,
}

/// 沙箱共享状态
#[derive(Clone, Default)]
pub struct SandboxState {
    objects: Arc<Mutex<Objects>>,
}

impl SandboxState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Objects> {
        // 持锁期间不会 panic，中毒时直接沿用内部数据
        self.objects.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl From<&StoredObject> for Product {
    fn from(obj: &StoredObject) -> Self {
        Product {
            id: Some(obj.id.clone()),
            name: obj.name.clone(),
            data: obj.data.clone(),
            created_at: Some(obj.created_at),
            updated_at: obj.updated_at,
        }
    }
}

/// 创建路由
pub fn router(state: SandboxState) -> Router {
    Router::new()
        .route("/objects", get(list_objects).post(create_object))
        .route(
            "/objects/:id",
            get(get_object).put(update_object).delete(delete_object),
        )
        .route("/health", get(health_check))
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 在给定监听器上运行沙箱服务
pub async fn serve(listener: TcpListener, state: SandboxState) -> std::io::Result<()> {
    info!("🚀 沙箱服务运行在 http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await
}

fn validate(payload: &ProductPayload) -> Result<(), CoreError> {
    if payload.name.trim().is_empty() {
        return Err(CoreError::MissingField("name"));
    }
    Ok(())
}

/// 获取对象列表，支持 `?id=a&id=b` 过滤
async fn list_objects(
    State(state): State<SandboxState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Json<Vec<Product>> {
    let wanted: Vec<String> = params
        .into_iter()
        .filter(|(k, _)| k == "id")
        .map(|(_, v)| v)
        .collect();

    let objects = state.lock();
    let mut found: Vec<&StoredObject> = objects
        .by_id
        .values()
        .filter(|o| wanted.is_empty() || wanted.contains(&o.id))
        .collect();
    found.sort_by_key(|o| o.seq);

    Json(found.into_iter().map(Product::from).collect())
}

async fn get_object(
    State(state): State<SandboxState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, CoreError> {
    let found = state.lock().by_id.get(&id).map(Product::from);
    found
        .map(Json)
        .ok_or_else(|| CoreError::NotFound(format!("Object with id={} was not found.", id)))
}

async fn create_object(
    State(state): State<SandboxState>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<Product>, CoreError> {
    validate(&payload)?;

    let mut objects = state.lock();
    objects.next_seq += 1;
    let obj = StoredObject {
        id: Uuid::new_v4().simple().to_string(),
        name: payload.name,
        data: payload.data,
        created_at: Utc::now(),
        updated_at: None,
        seq: objects.next_seq,
    };
    let product = Product::from(&obj);
    objects.by_id.insert(obj.id.clone(), obj);

    info!(id = ?product.id, "沙箱对象已创建");
    Ok(Json(product))
}

async fn update_object(
    State(state): State<SandboxState>,
    Path(id): Path<String>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<Product>, CoreError> {
    validate(&payload)?;

    let mut objects = state.lock();
    let obj = objects.by_id.get_mut(&id).ok_or_else(|| {
        CoreError::NotFound(format!("The Object with id='{}' was not found.", id))
    })?;

    obj.name = payload.name;
    obj.data = payload.data;
    obj.updated_at = Some(Utc::now());

    // 与公共 API 一致：更新响应只带 updatedAt
    let mut product = Product::from(&*obj);
    product.created_at = None;
    Ok(Json(product))
}

async fn delete_object(
    State(state): State<SandboxState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteAck>, CoreError> {
    let mut objects = state.lock();
    match objects.by_id.remove(&id) {
        Some(_) => Ok(Json(DeleteAck {
            message: format!("Object with id = {} has been deleted.", id),
        })),
        None => Err(CoreError::NotFound(format!(
            "Object with id={} doesn't exist.",
            id
        ))),
    }
}

/// 健康检查
async fn health_check(State(state): State<SandboxState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "objects": state.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                builder = builder.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn teclado() -> Value {
        json!({"name": "Teclado", "data": {"features": "Mecánico", "price": 1000, "year": 2025}})
    }

    #[tokio::test]
    async fn test_create_assigns_id() {
        let state = SandboxState::new();
        let app = router(state.clone());

        let (status, body) = send(&app, "POST", "/objects", Some(teclado())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"].as_str().unwrap().len(), 32);
        assert_eq!(body["name"], "Teclado");
        assert!(body["createdAt"].is_string());
        assert_eq!(state.len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let app = router(SandboxState::new());
        let mut payload = teclado();
        payload["name"] = json!(" ");

        let (status, body) = send(&app, "POST", "/objects", Some(payload)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown() {
        let app = router(SandboxState::new());

        let (status, body) = send(&app, "PUT", "/objects/nope", Some(teclado())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("nope"));

        let (status, body) = send(&app, "DELETE", "/objects/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Object with id=nope doesn't exist.");
    }

    #[tokio::test]
    async fn test_list_filter_decodes_ids() {
        let state = SandboxState::new();
        state.lock().by_id.insert(
            "a b".to_string(),
            StoredObject {
                id: "a b".to_string(),
                name: "Teclado".to_string(),
                data: ProductData {
                    features: "Mecánico".to_string(),
                    price: 1000.0,
                    year: 2025,
                },
                created_at: Utc::now(),
                updated_at: None,
                seq: 1,
            },
        );
        let app = router(state);

        let (_, plus) = send(&app, "GET", "/objects?id=a+b", None).await;
        assert_eq!(plus[0]["id"], "a b");
        let (_, percent) = send(&app, "GET", "/objects?id=a%20b&id=other", None).await;
        assert_eq!(percent.as_array().unwrap().len(), 1);
        let (_, none) = send(&app, "GET", "/objects?id=ab", None).await;
        assert!(none.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let state = SandboxState::new();
        let app = router(state.clone());

        let (_, created) = send(&app, "POST", "/objects", Some(teclado())).await;
        let id = created["id"].as_str().unwrap().to_string();
        let (_, other) = send(&app, "POST", "/objects", Some(teclado())).await;

        let mut changed = teclado();
        changed["data"]["price"] = json!(1200);
        let (status, updated) = send(&app, "PUT", &format!("/objects/{}", id), Some(changed)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["data"]["price"], json!(1200.0));
        assert!(updated["updatedAt"].is_string());

        let (_, listed) = send(&app, "GET", &format!("/objects?id={}", id), None).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
        let (_, all) = send(&app, "GET", "/objects", None).await;
        assert_eq!(all[0]["id"], json!(id));
        assert_eq!(all[1]["id"], other["id"]);

        let (status, ack) = send(&app, "DELETE", &format!("/objects/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ack["message"], format!("Object with id = {} has been deleted.", id));
        assert_eq!(state.len(), 1);

        let (status, _) = send(&app, "GET", &format!("/objects/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, health) = send(&app, "GET", "/health", None).await;
        assert_eq!(health["objects"], 1);
    }
}
