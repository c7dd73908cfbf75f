//! 产品数据模型
//!
//! 请求体和响应体分开定义：创建和更新都发送 [`ProductPayload`]，
//! 远程服务返回带 `id` 的 [`Product`]，删除返回 [`DeleteAck`]。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 产品，远程服务返回并镜像到本地存储的记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// 由远程服务分配，首次创建成功之前没有
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub data: ProductData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductData {
    pub features: String,
    pub price: f64,
    pub year: i32,
}

/// 创建/更新请求体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPayload {
    pub name: String,
    pub data: ProductData,
}

/// 删除成功时的应答
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteAck {
    pub message: String,
}

/// 远程服务的错误响应体
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}

impl Product {
    /// 只有带 id 的产品才能编辑或删除
    pub fn is_persisted(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.is_empty())
    }

    pub fn has_id(&self, id: &str) -> bool {
        self.id.as_deref() == Some(id)
    }
}

impl ProductPayload {
    pub fn new(
        name: impl Into<String>,
        features: impl Into<String>,
        price: f64,
        year: i32,
    ) -> Self {
        Self {
            name: name.into(),
            data: ProductData {
                features: features.into(),
                price,
                year,
            },
        }
    }
}

impl From<ProductPayload> for Product {
    fn from(payload: ProductPayload) -> Self {
        Self {
            id: None,
            name: payload.name,
            data: payload.data,
            created_at: None,
            updated_at: None,
        }
    }
}
