use anyhow::{Context, Result};
use crud_productos::app::console::{run, stdio_console};
use crud_productos::app::product::{HttpProductApi, MirrorStore, ProductService};
use crud_productos::infrastructure::{
    config::load_config, logger::Logger, storage::FileSlotStorage,
};
use std::env;
use std::path::PathBuf;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // 可选的第一个参数：配置文件路径
    let config_path = env::args().nth(1).map(PathBuf::from);
    let config = load_config(config_path.as_deref()).context("加载配置失败")?;

    let _guard = Logger::init(&config.logging)?;
    info!(base_url = %config.api.base_url, data_dir = %config.storage.data_dir.display(), "启动产品 CRUD 客户端");

    let storage = FileSlotStorage::new(&config.storage.data_dir);
    let store = match MirrorStore::open(storage, config.storage.slot.clone()) {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, "本地镜像加载失败");
            return Err(e).context("无法读取本地产品镜像");
        }
    };
    info!(count = store.len(), "本地镜像已加载");

    let api = HttpProductApi::new(&config.api)?;
    let mut service = ProductService::new(api, store);
    let mut console = stdio_console();

    run(&mut service, &mut console).await?;

    info!("客户端退出");
    Ok(())
}
