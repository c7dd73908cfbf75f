//! 远程产品服务客户端

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::future::Future;
use tracing::debug;

use super::model::{ApiErrorBody, DeleteAck, Product, ProductPayload};
use crate::core::error::CoreError;
use crate::infrastructure::config::ApiConfig;

/// 远程产品服务接口
///
/// 所有方法只有在远程返回成功状态码时才返回 `Ok`，
/// 调用方可以放心地在 `Ok` 分支里修改本地状态。
pub trait ProductApi {
    /// `POST /objects`
    fn create(&self, payload: &ProductPayload)
        -> impl Future<Output = Result<Product, CoreError>> + Send;

    /// `PUT /objects/{id}`，整体替换
    fn update(
        &self,
        id: &str,
        payload: &ProductPayload,
    ) -> impl Future<Output = Result<Product, CoreError>> + Send;

    /// `DELETE /objects/{id}`
    fn delete(&self, id: &str) -> impl Future<Output = Result<DeleteAck, CoreError>> + Send;

    /// `GET /objects?id=..&id=..`
    fn list(&self, ids: &[String]) -> impl Future<Output = Result<Vec<Product>, CoreError>> + Send;
}

/// 基于 reqwest 的实现
#[derive(Debug, Clone)]
pub struct HttpProductApi {
    client: Client,
    base_url: String,
}

impl HttpProductApi {
    pub fn new(config: &ApiConfig) -> Result<Self, CoreError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn objects_url(&self) -> String {
        format!("{}/objects", self.base_url)
    }

    fn object_url(&self, id: &str) -> String {
        format!("{}/objects/{}", self.base_url, id)
    }
}

/// 先检查状态码，再解析响应体
async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T, CoreError> {
    let status = response.status();
    let body = response.text().await?;
    debug!(status = status.as_u16(), %body, "远程服务响应");

    if !status.is_success() {
        return Err(status_error(status, &body));
    }

    serde_json::from_str(&body).map_err(|e| CoreError::Decode(e.to_string()))
}

fn status_error(status: StatusCode, body: &str) -> CoreError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .map(|b| b.error)
        .filter(|m| !m.is_empty());
    CoreError::Status {
        status: status.as_u16(),
        message,
    }
}

impl ProductApi for HttpProductApi {
    async fn create(&self, payload: &ProductPayload) -> Result<Product, CoreError> {
        debug!(name = %payload.name, "创建产品请求");
        let response = self
            .client
            .post(self.objects_url())
            .json(payload)
            .send()
            .await?;
        parse_response(response).await
    }

    async fn update(&self, id: &str, payload: &ProductPayload) -> Result<Product, CoreError> {
        debug!(id, name = %payload.name, "更新产品请求");
        let response = self
            .client
            .put(self.object_url(id))
            .json(payload)
            .send()
            .await?;
        parse_response(response).await
    }

    async fn delete(&self, id: &str) -> Result<DeleteAck, CoreError> {
        debug!(id, "删除产品请求");
        let response = self.client.delete(self.object_url(id)).send().await?;
        parse_response(response).await
    }

    async fn list(&self, ids: &[String]) -> Result<Vec<Product>, CoreError> {
        debug!(count = ids.len(), "查询产品请求");
        let query: Vec<(&str, &str)> = ids.iter().map(|id| ("id", id.as_str())).collect();
        let response = self
            .client
            .get(self.objects_url())
            .query(&query)
            .send()
            .await?;
        parse_response(response).await
    }
}
