//! 会话过期与滞留订单巡检
//!
//! 周期任务：清理空闲超时的购买会话；对超过付款时限仍未处理的订单，
//! 向操作员上报一次滞留摘要。
//!
//! 只读台账，绝不改写订单状态，也不回收库存（验证前本就没有预留）。
//! 付款时限到期只是提醒信号，订单仍可照常验证或拒绝。

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use shared::order::Order;
use shared::order::notice::OperatorNotice;
use shared::util::now_millis;

use crate::core::Config;
use crate::notify::Notifier;
use crate::store::{OrderLedger, SessionStore};

// ============================================================================
// Sweep Report
// ============================================================================

/// 单次巡检结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepReport {
    /// 本轮清理的空闲会话数
    pub sessions_dropped: usize,
    /// 本轮新上报的滞留订单数
    pub stale_reported: usize,
}

// ============================================================================
// ExpirySweeper
// ============================================================================

/// 过期巡检任务
///
/// 在 `start_background_tasks()` 中启动，收到停机信号后退出。
pub struct ExpirySweeper {
    sessions: Arc<SessionStore>,
    ledger: Arc<OrderLedger>,
    notifier: Notifier,
    operators: Vec<String>,
    session_ttl_millis: i64,
    payment_window_millis: i64,
    interval: Duration,
    shutdown: CancellationToken,
    /// 已上报过的滞留订单，避免每轮重复打扰
    reported: HashSet<String>,
}

impl ExpirySweeper {
    pub fn new(
        sessions: Arc<SessionStore>,
        ledger: Arc<OrderLedger>,
        notifier: Notifier,
        operators: Vec<String>,
        config: &Config,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            sessions,
            ledger,
            notifier,
            operators,
            session_ttl_millis: config.session_ttl_millis(),
            payment_window_millis: config.payment_window_millis(),
            interval: Duration::from_secs(config.sweep_interval_secs),
            shutdown,
            reported: HashSet::new(),
        }
    }

    /// 主循环：固定间隔巡检，直到收到停机信号
    pub async fn run(mut self) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "Expiry sweeper started"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Expiry sweeper received shutdown signal");
                    break;
                }
            }

            let report = self.sweep_once(now_millis());
            if report != SweepReport::default() {
                tracing::info!(
                    sessions_dropped = report.sessions_dropped,
                    stale_reported = report.stale_reported,
                    "sweep finished"
                );
            }
        }

        tracing::info!("Expiry sweeper stopped");
    }

    /// 执行一次巡检。测试可直接调用并传入受控时钟。
    pub fn sweep_once(&mut self, now: i64) -> SweepReport {
        // 1. 清理空闲会话
        let dropped = self
            .sessions
            .remove_idle(self.session_ttl_millis, now);
        for buyer_id in &dropped {
            tracing::info!(buyer = %buyer_id, "session expired");
        }

        // 2. 找出超过付款时限、仍未处理、且还没上报过的订单
        let pending = self.ledger.list_pending();

        // 上报集合只保留仍在等待的订单，防止无限增长
        let pending_ids: HashSet<&str> = pending.iter().map(|o| o.id.as_str()).collect();
        self.reported.retain(|id| pending_ids.contains(id.as_str()));

        let stale: Vec<&Order> = pending
            .iter()
            .filter(|order| now - order.created_at >= self.payment_window_millis)
            .filter(|order| !self.reported.contains(&order.id))
            .collect();

        if !stale.is_empty() {
            for order in &stale {
                self.reported.insert(order.id.clone());
            }
            let digests = stale.iter().map(|order| order.digest()).collect();
            self.notifier.operators(
                self.operators.clone(),
                OperatorNotice::StalePending { digests },
            );
        }

        SweepReport {
            sessions_dropped: dropped.len(),
            stale_reported: stale.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shared::gateway::{GatewayError, NotificationGateway};
    use shared::order::notice::{BroadcastContent, BuyerNotice};
    use shared::util::now_millis;

    struct SilentGateway;

    #[async_trait]
    impl NotificationGateway for SilentGateway {
        async fn notify_buyer(&self, _: &str, _: BuyerNotice) -> Result<(), GatewayError> {
            Ok(())
        }
        async fn notify_operators(
            &self,
            _: &[String],
            _: OperatorNotice,
        ) -> Result<(), GatewayError> {
            Ok(())
        }
        async fn notify_broadcast(
            &self,
            _: &[String],
            _: BroadcastContent,
        ) -> Result<(), GatewayError> {
            Ok(())
        }
    }

    fn sweeper() -> (ExpirySweeper, Arc<SessionStore>, Arc<OrderLedger>) {
        let sessions = Arc::new(SessionStore::new());
        let ledger = Arc::new(OrderLedger::new());
        let notifier = Notifier::new(Arc::new(SilentGateway));
        let mut config = Config::with_overrides(vec!["op-1".to_string()], 50);
        config.session_ttl_mins = 30;
        config.payment_window_mins = 15;
        config.sweep_interval_secs = 60;
        let sweeper = ExpirySweeper::new(
            sessions.clone(),
            ledger.clone(),
            notifier,
            vec!["op-1".to_string()],
            &config,
            CancellationToken::new(),
        );
        (sweeper, sessions, ledger)
    }

    #[tokio::test]
    async fn test_sweep_drops_idle_sessions_only() {
        let (mut sweeper, sessions, _) = sweeper();
        let now = now_millis();
        sessions.begin("stale", "Ana").lock().updated_at = now - 31 * 60_000;
        sessions.begin("fresh", "Ben").lock().updated_at = now - 60_000;

        let report = sweeper.sweep_once(now);
        assert_eq!(report.sessions_dropped, 1);
        assert!(sessions.get("stale").is_none());
        assert!(sessions.get("fresh").is_some());
    }

    #[tokio::test]
    async fn test_sweep_reports_each_stale_order_once() {
        let (mut sweeper, _, ledger) = sweeper();
        let order = ledger.create("b1", "Ana", "500", 2, 60);
        let created = ledger.snapshot(&order.id).unwrap().created_at;

        // Inside the window: nothing to report yet
        let report = sweeper.sweep_once(created + 14 * 60_000);
        assert_eq!(report.stale_reported, 0);

        // Past the window: reported exactly once
        let report = sweeper.sweep_once(created + 16 * 60_000);
        assert_eq!(report.stale_reported, 1);
        let report = sweeper.sweep_once(created + 17 * 60_000);
        assert_eq!(report.stale_reported, 0);
    }

    #[tokio::test]
    async fn test_sweep_never_touches_order_status() {
        let (mut sweeper, _, ledger) = sweeper();
        let order = ledger.create("b1", "Ana", "500", 2, 60);
        let created = ledger.snapshot(&order.id).unwrap().created_at;

        sweeper.sweep_once(created + 60 * 60_000);
        let after = ledger.snapshot(&order.id).unwrap();
        assert!(after.is_pending());
        assert!(!after.delivered);
    }

    #[tokio::test]
    async fn test_sweep_skips_settled_orders() {
        let (mut sweeper, _, ledger) = sweeper();
        let order = ledger.create("b1", "Ana", "500", 2, 60);
        let created = ledger.snapshot(&order.id).unwrap().created_at;
        ledger
            .cell(&order.id)
            .unwrap()
            .lock()
            .mark_delivered(created + 1_000);

        let report = sweeper.sweep_once(created + 60 * 60_000);
        assert_eq!(report.stale_reported, 0);
    }
}
