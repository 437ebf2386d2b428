//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use atelier_settlement::DbService;
use atelier_settlement::gateways::{ArchivalGateway, GatewayError, NotificationGateway};
use atelier_settlement::settlement::SettlementService;
use shared::models::SettlementPeriod;
use sqlx::SqlitePool;

pub const TZ: chrono_tz::Tz = chrono_tz::Asia::Tokyo;

pub fn may() -> SettlementPeriod {
    SettlementPeriod::new(2024, 5).unwrap()
}

/// Noon (Tokyo) on `day` of `period`, Unix millis
pub fn paid_at(period: SettlementPeriod, day: i64) -> i64 {
    let (start, _) = period.bounds_millis(TZ);
    start + (day - 1) * 86_400_000 + 12 * 3_600_000
}

pub async fn db() -> SqlitePool {
    DbService::in_memory().await.unwrap().pool
}

// ========== Seed data ==========

pub struct CreatorSeed {
    pub id: i64,
    pub name: &'static str,
    pub email: Option<&'static str>,
    pub rate: &'static str,
    pub per_item: i64,
    pub business_type: &'static str,
    pub withholding: bool,
    pub with_bank: bool,
}

impl CreatorSeed {
    /// 20% commission, withheld, full bank details
    pub fn individual(id: i64, name: &'static str) -> Self {
        Self {
            id,
            name,
            email: Some("creator@example.com"),
            rate: "20",
            per_item: 0,
            business_type: "individual",
            withholding: true,
            with_bank: true,
        }
    }

    /// 10% + 100 per order, never withheld
    pub fn corporation(id: i64, name: &'static str) -> Self {
        Self {
            id,
            name,
            email: Some("office@example.com"),
            rate: "10",
            per_item: 100,
            business_type: "corporation",
            withholding: false,
            with_bank: true,
        }
    }
}

pub async fn insert_creator(pool: &SqlitePool, seed: &CreatorSeed) {
    let (bank_code, bank_name, branch_name, account_type, account_number, holder) = if seed.with_bank {
        (
            Some("0036"),
            Some("楽天銀行"),
            Some("ジャズ支店"),
            Some("ordinary"),
            Some("7654321"),
            Some("カブシキガイシャ テスト"),
        )
    } else {
        (None, None, None, None, None, None)
    };

    sqlx::query(
        "INSERT INTO creators (id, name, email, commission_rate, commission_per_item, service_commission_rate, service_commission_per_item, business_type, withholding_tax_required, bank_code, bank_name, branch_name, account_type, account_number, account_holder) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(seed.id)
    .bind(seed.name)
    .bind(seed.email)
    .bind(seed.rate)
    .bind(seed.per_item)
    .bind(seed.rate)
    .bind(seed.per_item)
    .bind(seed.business_type)
    .bind(seed.withholding)
    .bind(bank_code)
    .bind(bank_name)
    .bind(branch_name)
    .bind(account_type)
    .bind(account_number)
    .bind(holder)
    .execute(pool)
    .await
    .unwrap();
}

pub async fn insert_product(pool: &SqlitePool, id: i64, creator_id: i64, kind: &str) {
    sqlx::query("INSERT INTO products (id, creator_id, name, kind) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(creator_id)
        .bind(format!("product-{id}"))
        .bind(kind)
        .execute(pool)
        .await
        .unwrap();
}

/// Order with one line per `(product_id, quantity, subtotal)`
pub async fn insert_order(
    pool: &SqlitePool,
    order_id: i64,
    payment_status: &str,
    paid_at: Option<i64>,
    lines: &[(i64, i64, i64)],
) {
    let total: i64 = lines.iter().map(|(_, _, subtotal)| subtotal).sum();
    sqlx::query("INSERT INTO orders (id, payment_status, paid_at, total) VALUES (?, ?, ?, ?)")
        .bind(order_id)
        .bind(payment_status)
        .bind(paid_at)
        .bind(total)
        .execute(pool)
        .await
        .unwrap();

    for (product_id, quantity, subtotal) in lines {
        sqlx::query(
            "INSERT INTO order_items (order_id, product_id, quantity, unit_price, subtotal) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(order_id)
        .bind(product_id)
        .bind(quantity)
        .bind(subtotal / quantity)
        .bind(subtotal)
        .execute(pool)
        .await
        .unwrap();
    }
}

pub async fn insert_paid_order(pool: &SqlitePool, order_id: i64, paid_at: i64, lines: &[(i64, i64, i64)]) {
    insert_order(pool, order_id, "paid", Some(paid_at), lines).await;
}

/// Creator 1: individual, 500,000 of May sales over 2 orders.
/// Creator 2: corporation, 50,000 of May sales in 1 order.
/// Creator 3: individual without sales.
/// Plus noise: an unpaid May order and a paid June order for creator 1.
pub async fn seed_month(pool: &SqlitePool) {
    insert_creator(pool, &CreatorSeed::individual(1, "山田太郎")).await;
    insert_creator(pool, &CreatorSeed::corporation(2, "株式会社テスト")).await;
    insert_creator(pool, &CreatorSeed::individual(3, "佐藤花子")).await;

    insert_product(pool, 10, 1, "goods").await;
    insert_product(pool, 20, 2, "goods").await;
    insert_product(pool, 30, 3, "goods").await;

    let m = may();
    insert_paid_order(pool, 100, paid_at(m, 3), &[(10, 2, 300_000)]).await;
    insert_paid_order(pool, 101, paid_at(m, 20), &[(10, 1, 200_000)]).await;
    insert_paid_order(pool, 102, paid_at(m, 21), &[(20, 5, 50_000)]).await;
    insert_order(pool, 103, "unpaid", None, &[(10, 1, 99_000)]).await;
    insert_paid_order(pool, 104, paid_at(m.next(), 1), &[(10, 1, 77_000)]).await;
}

// ========== Gateways ==========

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<SentMessage>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationGateway for RecordingNotifier {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<Option<String>, GatewayError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(SentMessage {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(Some(format!("msg-{}", sent.len())))
    }
}

pub struct FailingNotifier;

#[async_trait]
impl NotificationGateway for FailingNotifier {
    async fn send(&self, _recipient: &str, _subject: &str, _body: &str) -> Result<Option<String>, GatewayError> {
        Err(GatewayError::Rejected("mailbox unavailable".into()))
    }
}

/// Never answers within any reasonable timeout
pub struct SlowNotifier(pub Duration);

#[async_trait]
impl NotificationGateway for SlowNotifier {
    async fn send(&self, _recipient: &str, _subject: &str, _body: &str) -> Result<Option<String>, GatewayError> {
        tokio::time::sleep(self.0).await;
        Ok(None)
    }
}

#[derive(Default)]
pub struct RecordingArchive {
    /// (filename, folder)
    pub saved: Mutex<Vec<(String, String)>>,
}

impl RecordingArchive {
    pub fn documents(&self) -> Vec<(String, String)> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArchivalGateway for RecordingArchive {
    async fn save_document(&self, html: &str, filename: &str, folder: &str) -> Result<String, GatewayError> {
        assert!(html.contains("支払通知書"));
        let mut saved = self.saved.lock().unwrap();
        saved.push((filename.to_string(), folder.to_string()));
        Ok(format!("doc-{}", saved.len()))
    }
}

pub struct FailingArchive;

#[async_trait]
impl ArchivalGateway for FailingArchive {
    async fn save_document(&self, _html: &str, _filename: &str, _folder: &str) -> Result<String, GatewayError> {
        Err(GatewayError::Transport("connection refused".into()))
    }
}

pub fn service(
    pool: &SqlitePool,
    notifier: Arc<dyn NotificationGateway>,
    archive: Arc<dyn ArchivalGateway>,
) -> SettlementService {
    SettlementService::new(pool.clone(), TZ, notifier, archive)
        .with_gateway_timeout(Duration::from_millis(200))
        .with_memo_prefix("ATELIER")
}
