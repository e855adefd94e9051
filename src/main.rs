use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use namedex::config::Config;
use namedex::index::IndexState;
use namedex::ingest::{generate, Ingestor};
use namedex::query::ApiServer;
use namedex::store::{MemStore, RecordStore};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    info!("Starting namedex: letter-indexed pagination engine");

    let config = Config::load_or_default(Path::new("namedex.toml"))?;
    let store = Arc::new(MemStore::new());
    let index = Arc::new(IndexState::new());

    // 启动查询服务 (HTTP)：索引就绪前接口返回 503
    let server = ApiServer::new(store.clone(), index.clone());
    let port = config.port;
    tokio::spawn(async move {
        if let Err(e) = server.run(port).await {
            tracing::error!("HTTP server exited: {}", e);
        }
    });

    // 导入（仅空库时）：源文件缺失则先生成测试数据
    if store.is_empty() {
        if !config.names_file.exists() {
            info!("no names file, generating {} test names", config.generate_count);
            generate::generate_file(&config.names_file, config.generate_count, 0xDEC0DE)?;
        }

        let f = std::fs::File::open(&config.names_file)?;
        let ingestor = Ingestor::with_batch_size(
            store.clone() as Arc<dyn RecordStore>,
            config.batch_size,
        );
        let imported = ingestor.ingest(BufReader::new(f))?;
        info!("ingested {} names from {:?}", imported, config.names_file);
    }

    // 首次索引构建：有界重试，失败即退出（交给进程监督者）
    index
        .init_with_retry(store.clone() as Arc<dyn RecordStore>, config.retry_policy())
        .await?;
    info!(
        "namedex ready. Browse via: http://localhost:{}/users?start=0&limit=100",
        config.port
    );

    // 优雅退出处理
    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");

    Ok(())
}
