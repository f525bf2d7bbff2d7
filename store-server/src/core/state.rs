use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use shared::gateway::NotificationGateway;

use crate::core::Config;
use crate::expiry_sweeper::ExpirySweeper;
use crate::notify::Notifier;
use crate::store::catalog::CatalogError;
use crate::store::{BuyerRegistry, Catalog, InventoryPool, OrderLedger, SessionStore, StoreFront};

/// 服务器状态 - 持有所有服务的单例引用
///
/// ServerState 是门店引擎的核心数据结构，持有所有服务的共享引用。
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | catalog | Arc<Catalog> | 类别与档位定价 |
/// | pool | Arc<InventoryPool> | 兑换码库存池 |
/// | ledger | Arc<OrderLedger> | 订单台账 |
/// | sessions | Arc<SessionStore> | 购买会话 |
/// | registry | Arc<BuyerRegistry> | 买家注册表 |
/// | notifier | Notifier | 通知派发器 |
/// | storefront | Arc<StoreFront> | 指令门面 |
///
/// # 使用示例
///
/// ```ignore
/// let state = ServerState::initialize(config, gateway)?;
/// let reply = state.storefront().execute(cmd)?;
/// ```
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 类别目录
    pub catalog: Arc<Catalog>,
    /// 库存池
    pub pool: Arc<InventoryPool>,
    /// 订单台账
    pub ledger: Arc<OrderLedger>,
    /// 会话存储
    pub sessions: Arc<SessionStore>,
    /// 买家注册表
    pub registry: Arc<BuyerRegistry>,
    /// 通知派发器
    pub notifier: Notifier,
    /// 指令门面
    pub storefront: Arc<StoreFront>,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 目录取自 `STORE_CATALOG`（缺省用内置目录），库存池按目录建架，
    /// 其余服务围绕两者组装。
    pub fn initialize(
        config: Config,
        gateway: Arc<dyn NotificationGateway>,
    ) -> Result<Self, CatalogError> {
        let catalog = match &config.catalog_json {
            Some(json) => Catalog::from_json(json)?,
            None => Catalog::standard(),
        };
        let catalog = Arc::new(catalog);
        let pool = Arc::new(InventoryPool::new(
            catalog.variant_ids().map(str::to_string),
        ));
        let ledger = Arc::new(OrderLedger::new());
        let sessions = Arc::new(SessionStore::new());
        let registry = Arc::new(BuyerRegistry::new());
        let notifier = Notifier::new(gateway);
        let storefront = Arc::new(StoreFront::new(
            &config,
            catalog.clone(),
            pool.clone(),
            ledger.clone(),
            sessions.clone(),
            registry.clone(),
            notifier.clone(),
        ));

        tracing::info!(
            variants = ?catalog.variant_ids().collect::<Vec<_>>(),
            operators = config.operators.len(),
            "store state initialized"
        );

        Ok(Self {
            config,
            catalog,
            pool,
            ledger,
            sessions,
            registry,
            notifier,
            storefront,
        })
    }

    /// 指令门面
    pub fn storefront(&self) -> &Arc<StoreFront> {
        &self.storefront
    }

    /// 启动后台任务（过期巡检），返回任务句柄
    pub fn start_background_tasks(
        &self,
        shutdown: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        let mut operators = self.config.operators.clone();
        operators.sort();
        let sweeper = ExpirySweeper::new(
            self.sessions.clone(),
            self.ledger.clone(),
            self.notifier.clone(),
            operators,
            &self.config,
            shutdown,
        );
        tokio::spawn(sweeper.run())
    }
}
