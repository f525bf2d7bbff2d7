use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use shared::gateway::{GatewayError, NotificationGateway};
use shared::order::notice::{BroadcastContent, BuyerNotice, OperatorNotice};
use store_server::{Config, ServerState, print_banner};

/// 把通知写进日志的网关
///
/// 独立运行时使用；真实部署应换成接入聊天平台的网关实现。
struct LoggingGateway;

#[async_trait]
impl NotificationGateway for LoggingGateway {
    async fn notify_buyer(&self, buyer_id: &str, notice: BuyerNotice) -> Result<(), GatewayError> {
        tracing::info!(buyer = %buyer_id, notice = ?notice, "buyer notice");
        Ok(())
    }

    async fn notify_operators(
        &self,
        operators: &[String],
        notice: OperatorNotice,
    ) -> Result<(), GatewayError> {
        tracing::info!(operators = operators.len(), notice = ?notice, "operator notice");
        Ok(())
    }

    async fn notify_broadcast(
        &self,
        recipients: &[String],
        content: BroadcastContent,
    ) -> Result<(), GatewayError> {
        tracing::info!(recipients = recipients.len(), content = ?content, "broadcast");
        Ok(())
    }
}

/// Initialize the logger
fn init_logger() {
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 日志
    init_logger();

    // 打印横幅
    print_banner();

    tracing::info!("Code Store Server starting...");

    // 2. 加载配置
    let config = Config::from_env();

    // 3. 初始化服务器状态
    let state = ServerState::initialize(config, Arc::new(LoggingGateway))?;

    // 4. 启动后台任务（过期巡检）
    let shutdown = CancellationToken::new();
    let sweeper = state.start_background_tasks(shutdown.clone());

    // 5. 等待停机信号
    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");
    shutdown.cancel();
    if let Err(e) = sweeper.await {
        tracing::error!("Sweeper task error: {}", e);
    }

    Ok(())
}
