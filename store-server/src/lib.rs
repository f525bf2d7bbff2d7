//! Code Store Server - 兑换码销售流程引擎
//!
//! # 架构概述
//!
//! 本模块是门店引擎的主入口，提供以下核心功能：
//!
//! - **目录** (`store::catalog`): 类别、档位定价
//! - **库存池** (`store::inventory`): 每类别 FIFO 货架，原子预留
//! - **订单台账** (`store::ledger`): 订单记录与独立锁单元
//! - **分配协调** (`store::allocation`): 验证即原子分配与交付
//! - **门面** (`store::manager`): 指令分发、查询、通知
//! - **过期巡检** (`expiry_sweeper`): 会话清理、滞留订单上报
//!
//! # 模块结构
//!
//! ```text
//! store-server/src/
//! ├── core/              # 配置、状态
//! ├── store/             # 目录、库存、台账、会话、分配、门面
//! ├── notify.rs          # 通知派发（只发不等）
//! └── expiry_sweeper.rs  # 周期巡检任务
//! ```

pub mod core;
pub mod expiry_sweeper;
pub mod notify;
pub mod store;

// Re-export 公共类型
pub use core::{Config, ServerState};
pub use expiry_sweeper::{ExpirySweeper, SweepReport};
pub use notify::Notifier;
pub use store::{
    AllocationCoordinator, BuyerRegistry, Catalog, InventoryPool, OrderLedger, SessionStore,
    StoreFront,
};

// Re-export the error taxonomy from shared
pub use shared::{StoreError, StoreResult};

pub fn print_banner() {
    println!(
        r#"
   ______          __
  / ____/___  ____/ /__
 / /   / __ \/ __  / _ \
/ /___/ /_/ / /_/ /  __/
\____/\____/\__,_/\___/
   _____ __
  / ___// /_____  ________
  \__ \/ __/ __ \/ ___/ _ \
 ___/ / /_/ /_/ / /  /  __/
/____/\__/\____/_/   \___/
    "#
    );
}
