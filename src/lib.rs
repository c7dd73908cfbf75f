//! # 产品 CRUD 客户端
//!
//! 在远程 REST 沙箱上创建、编辑和删除产品，并把结果镜像到本地槽位：
//! - `app::product`：数据模型、表单、远程客户端、本地镜像、渲染和业务服务
//! - `app::console`：终端前端
//! - `sandbox`：与远程接口一致的内存版沙箱服务
//! - `core` / `infrastructure`：错误、中间件、配置、日志和持久化

pub mod app;
pub mod core;
pub mod infrastructure;
pub mod sandbox;

pub use crate::core::error::{CoreError, Result};
