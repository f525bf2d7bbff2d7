//! 核心模块 - 服务器配置与状态
//!
//! # 模块结构
//!
//! - [`Config`] - 服务器配置
//! - [`ServerState`] - 服务器状态

pub mod config;
pub mod state;

pub use config::Config;
pub use state::ServerState;
