//! 本地沙箱 REST 服务
//! 提供与公共沙箱相同的 /objects 接口，数据只保存在内存中

use anyhow::{Context, Result};
use crud_productos::infrastructure::{config::load_config, logger::Logger};
use crud_productos::sandbox::{serve, SandboxState};
use std::env;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = env::args().nth(1).map(PathBuf::from);
    let config = load_config(config_path.as_deref()).context("加载配置失败")?;

    let _guard = Logger::init(&config.logging)?;

    let addr = config.sandbox_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("无法绑定到 {}", addr))?;

    info!("📖 API 端点:");
    info!("   GET    /objects       - 获取对象列表 (支持 ?id= 过滤)");
    info!("   POST   /objects       - 创建对象");
    info!("   GET    /objects/:id   - 获取特定对象");
    info!("   PUT    /objects/:id   - 整体替换对象");
    info!("   DELETE /objects/:id   - 删除对象");
    info!("   GET    /health        - 健康检查");

    serve(listener, SandboxState::new()).await?;
    Ok(())
}
