use super::*;

use async_trait::async_trait;
use tokio::sync::mpsc;

use shared::gateway::{GatewayError, NotificationGateway};
use shared::order::{Delivery, OrderStatus};

const OP: &str = "op-1";
const OP2: &str = "op-2";

// ========================================================================
// 测试网关: 按到达顺序记录每条通知，可选在记录后报投递失败
// ========================================================================

#[derive(Debug, Clone, PartialEq)]
enum Seen {
    Buyer {
        buyer: String,
        notice: BuyerNotice,
    },
    Operators {
        operators: Vec<String>,
        notice: OperatorNotice,
    },
    Broadcast {
        recipients: Vec<String>,
        content: BroadcastContent,
    },
}

struct RecordingGateway {
    tx: mpsc::UnboundedSender<Seen>,
    fail_all: bool,
}

impl RecordingGateway {
    fn outcome(&self) -> Result<(), GatewayError> {
        if self.fail_all {
            Err(GatewayError::new("wired to fail"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl NotificationGateway for RecordingGateway {
    async fn notify_buyer(&self, buyer_id: &str, notice: BuyerNotice) -> Result<(), GatewayError> {
        let _ = self.tx.send(Seen::Buyer {
            buyer: buyer_id.to_string(),
            notice,
        });
        self.outcome()
    }

    async fn notify_operators(
        &self,
        operators: &[String],
        notice: OperatorNotice,
    ) -> Result<(), GatewayError> {
        let _ = self.tx.send(Seen::Operators {
            operators: operators.to_vec(),
            notice,
        });
        self.outcome()
    }

    async fn notify_broadcast(
        &self,
        recipients: &[String],
        content: BroadcastContent,
    ) -> Result<(), GatewayError> {
        let _ = self.tx.send(Seen::Broadcast {
            recipients: recipients.to_vec(),
            content,
        });
        self.outcome()
    }
}

// ========================================================================
// 组装测试门店
// ========================================================================

/// 组装完毕的门店，外加内部服务句柄和通知流
struct TestFront {
    front: StoreFront,
    pool: Arc<InventoryPool>,
    ledger: Arc<OrderLedger>,
    sessions: Arc<SessionStore>,
    notices: mpsc::UnboundedReceiver<Seen>,
}

fn test_config() -> Config {
    Config {
        operators: vec![OP.to_string(), OP2.to_string()],
        max_per_order: 50,
        payment_window_mins: 15,
        session_ttl_mins: 30,
        sweep_interval_secs: 60,
        catalog_json: None,
    }
}

/// 内置目录 + 指定库存（每个类别的码依序命名，便于断言先进先出）
fn test_front(stock: &[(&str, u32)]) -> TestFront {
    test_front_with(stock, false)
}

fn test_front_with(stock: &[(&str, u32)], fail_all: bool) -> TestFront {
    let (tx, notices) = mpsc::unbounded_channel();
    let gateway = Arc::new(RecordingGateway { tx, fail_all });

    let config = test_config();
    let catalog = Arc::new(Catalog::standard());
    let pool = Arc::new(InventoryPool::new(catalog.variant_ids()));
    for (variant, count) in stock {
        let codes: Vec<String> = (0..*count)
            .map(|i| format!("{}-CODE-{:03}", variant, i))
            .collect();
        pool.restock(variant, &codes).unwrap();
    }
    let ledger = Arc::new(OrderLedger::new());
    let sessions = Arc::new(SessionStore::new());
    let registry = Arc::new(BuyerRegistry::new());
    let notifier = Notifier::new(gateway);

    let front = StoreFront::new(
        &config,
        catalog,
        pool.clone(),
        ledger.clone(),
        sessions.clone(),
        registry,
        notifier,
    );
    TestFront {
        front,
        pool,
        ledger,
        sessions,
        notices,
    }
}

// ========================================================================
// 流程快捷步骤
// ========================================================================

/// Helper: 开始购买并选好类别，停在条款确认
fn open_to_terms(front: &StoreFront, buyer: &str, variant: &str) {
    let reply = front
        .execute(StoreCommand::BeginPurchase {
            buyer: buyer.to_string(),
            buyer_name: format!("Buyer {}", buyer),
        })
        .unwrap();
    assert!(matches!(reply, StoreReply::PurchaseOpened { .. }));

    let reply = front
        .execute(StoreCommand::SubmitVariantChoice {
            buyer: buyer.to_string(),
            buyer_name: format!("Buyer {}", buyer),
            variant: variant.to_string(),
        })
        .unwrap();
    assert!(matches!(reply, StoreReply::TermsPresented { .. }));
}

/// Helper: 接受条款，停在数量选择
fn accept_terms(front: &StoreFront, buyer: &str) {
    let reply = front
        .execute(StoreCommand::SubmitTermsDecision {
            buyer: buyer.to_string(),
            accepted: true,
        })
        .unwrap();
    assert!(matches!(reply, StoreReply::QuantityOptions { .. }));
}

/// Helper: 从菜单一路走到账单，返回订单号
fn buy_to_invoice(front: &StoreFront, buyer: &str, variant: &str, quantity: u32) -> String {
    open_to_terms(front, buyer, variant);
    accept_terms(front, buyer);
    let reply = front
        .execute(StoreCommand::SubmitQuantityChoice {
            buyer: buyer.to_string(),
            choice: QuantityChoice::Tier(quantity),
        })
        .unwrap();
    match reply {
        StoreReply::InvoiceIssued { digest } => digest.order_id,
        other => panic!("expected invoice, got {:?}", other),
    }
}

/// Helper: 账单 + 付款声明，订单停在待验证
fn buy_to_claim(front: &StoreFront, buyer: &str, variant: &str, quantity: u32) -> String {
    let order_id = buy_to_invoice(front, buyer, variant, quantity);
    let reply = front
        .execute(StoreCommand::SubmitPaymentClaim {
            buyer: buyer.to_string(),
            order_id: order_id.clone(),
        })
        .unwrap();
    assert!(matches!(reply, StoreReply::ClaimRegistered { .. }));
    order_id
}

/// Helper: 操作员验证并断言送达
fn verify_ok(front: &StoreFront, order_id: &str) -> Delivery {
    let reply = front
        .execute(StoreCommand::SubmitOperatorVerify {
            operator: OP.to_string(),
            order_id: order_id.to_string(),
        })
        .unwrap();
    match reply {
        StoreReply::Delivered(delivery) => delivery,
        other => panic!("expected delivery, got {:?}", other),
    }
}

// ========================================================================
// 断言工具
// ========================================================================

/// Helper: 让排队的通知任务跑完，收走它们产生的全部通知
async fn drain_notices(rx: &mut mpsc::UnboundedReceiver<Seen>) -> Vec<Seen> {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
    let mut seen = Vec::new();
    while let Ok(entry) = rx.try_recv() {
        seen.push(entry);
    }
    seen
}

/// Helper: 过滤出某位买家收到的通知
fn buyer_notices(seen: &[Seen], buyer: &str) -> Vec<BuyerNotice> {
    seen.iter()
        .filter_map(|entry| match entry {
            Seen::Buyer { buyer: b, notice } if b == buyer => Some(notice.clone()),
            _ => None,
        })
        .collect()
}

/// Helper: 当前会话所处的流程状态
fn session_state(sessions: &SessionStore, buyer: &str) -> Option<FlowState> {
    sessions.get(buyer).map(|cell| cell.lock().state)
}

/// Helper: 断言台账中的订单状态
fn assert_order_status(ledger: &OrderLedger, order_id: &str, expected: OrderStatus) {
    let order = ledger.snapshot(order_id).unwrap();
    assert_eq!(
        order.status, expected,
        "expected order status {:?}, got {:?}",
        expected, order.status
    );
}
