use tracing::info;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // 先加载配置，再初始化日志（guard 必须活到进程结束）
    let config = halalmap::config::init_config();
    let _log_guard = halalmap::system::logging::init_logging(config);

    info!("halalmap {} starting", env!("CARGO_PKG_VERSION"));

    halalmap::runtime::server::run_server().await
}
