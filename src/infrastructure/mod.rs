//! 基础设施层：配置、日志和槽位持久化

pub mod config;
pub mod logger;
pub mod storage;
