use std::collections::HashSet;

/// 服务器配置 - 门店引擎的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | STORE_OPERATORS | (空) | 操作员 ID 列表，逗号分隔 |
/// | STORE_MAX_PER_ORDER | 50 | 单笔订单数量上限 |
/// | STORE_PAYMENT_WINDOW_MINS | 15 | 付款时限(分钟)，超时只提醒不取消 |
/// | STORE_SESSION_TTL_MINS | 30 | 会话空闲过期(分钟) |
/// | STORE_SWEEP_INTERVAL_SECS | 60 | 巡检间隔(秒) |
/// | STORE_CATALOG | (内置) | JSON 目录定义，替换内置类别 |
///
/// # 示例
///
/// ```ignore
/// STORE_OPERATORS=op-1,op-2 STORE_MAX_PER_ORDER=20 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 操作员 ID 列表（验证、拒绝、补货、广播的授权名单）
    pub operators: Vec<String>,
    /// 单笔订单最大数量
    pub max_per_order: u32,
    /// 付款时限（分钟），超时订单进入滞留上报
    pub payment_window_mins: u64,
    /// 会话空闲过期（分钟）
    pub session_ttl_mins: u64,
    /// 巡检间隔（秒）
    pub sweep_interval_secs: u64,
    /// 目录 JSON（未设置时使用内置目录）
    pub catalog_json: Option<String>,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            operators: std::env::var("STORE_OPERATORS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            max_per_order: std::env::var("STORE_MAX_PER_ORDER")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(50),
            payment_window_mins: std::env::var("STORE_PAYMENT_WINDOW_MINS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(15),
            session_ttl_mins: std::env::var("STORE_SESSION_TTL_MINS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30),
            sweep_interval_secs: std::env::var("STORE_SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(60),
            catalog_json: std::env::var("STORE_CATALOG").ok(),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(operators: Vec<String>, max_per_order: u32) -> Self {
        let mut config = Self::from_env();
        config.operators = operators;
        config.max_per_order = max_per_order;
        config.catalog_json = None;
        config
    }

    /// 操作员 ID 集合
    pub fn operator_set(&self) -> HashSet<String> {
        self.operators.iter().cloned().collect()
    }

    /// 付款时限（毫秒）
    pub fn payment_window_millis(&self) -> i64 {
        self.payment_window_mins as i64 * 60_000
    }

    /// 会话空闲过期（毫秒）
    pub fn session_ttl_millis(&self) -> i64 {
        self.session_ttl_mins as i64 * 60_000
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
