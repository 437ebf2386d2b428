//! Database Module
//!
//! Handles SQLite connection pool, migrations and the schema contract

pub mod repository;

use shared::error::{AppError, AppResult, ErrorCode};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::str::FromStr;

/// Tables and columns the settlement engine reads or writes
///
/// Checked once at startup; request handlers never probe the schema.
const SCHEMA_CONTRACT: &[(&str, &[&str])] = &[
    (
        "creators",
        &[
            "id",
            "name",
            "email",
            "commission_rate",
            "commission_per_item",
            "service_commission_rate",
            "service_commission_per_item",
            "business_type",
            "withholding_tax_required",
            "bank_code",
            "bank_name",
            "branch_code",
            "branch_name",
            "account_type",
            "account_number",
            "account_holder",
            "is_active",
        ],
    ),
    ("products", &["id", "creator_id", "kind"]),
    ("orders", &["id", "payment_status", "paid_at"]),
    ("order_items", &["id", "order_id", "product_id", "quantity", "subtotal"]),
    (
        "creator_payments",
        &[
            "id",
            "creator_id",
            "target_year",
            "target_month",
            "gross_sales",
            "commission_amount",
            "withholding_tax",
            "net_payment",
            "order_count",
            "item_count",
            "status",
            "payment_date",
            "transfer_date",
            "notification_sent_at",
            "created_at",
            "updated_at",
        ],
    ),
    (
        "withholding_tax_remittances",
        &[
            "id",
            "target_year",
            "target_month",
            "total_amount",
            "due_date",
            "paid_date",
            "status",
            "created_at",
            "updated_at",
        ],
    ),
];

/// Database service, owns a SQLite connection pool
#[derive(Clone)]
pub struct DbService {
    pub pool: SqlitePool,
}

impl DbService {
    /// Open (or create) the database file with WAL mode, apply migrations
    /// and verify the schema contract
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| AppError::database(format!("Invalid database path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON")
            // busy_timeout: 写冲突时等待 5s 而非立即失败
            .busy_timeout(std::time::Duration::from_secs(5))
            .optimize_on_close(true, None);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        tracing::info!(path = %db_path, "Database connection established (SQLite WAL, busy_timeout=5000ms)");

        Self::prepare(pool).await
    }

    /// Private in-memory database, used by tests and dry runs
    ///
    /// A single connection that never expires: every new connection to
    /// `:memory:` would otherwise see an empty database.
    pub async fn in_memory() -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| AppError::database(format!("Invalid database path: {e}")))?
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        Self::prepare(pool).await
    }

    async fn prepare(pool: SqlitePool) -> Result<Self, AppError> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply migrations: {e}")))?;
        tracing::info!("Database migrations applied");

        verify_schema(&pool).await?;

        Ok(Self { pool })
    }
}

/// Fail fast when a table or column the engine depends on is absent
pub async fn verify_schema(pool: &SqlitePool) -> AppResult<()> {
    for (table, columns) in SCHEMA_CONTRACT {
        let present: Vec<String> =
            sqlx::query_scalar("SELECT name FROM pragma_table_info(?)")
                .bind(*table)
                .fetch_all(pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to inspect {table}: {e}")))?;

        if present.is_empty() {
            return Err(AppError::with_message(
                ErrorCode::SchemaMismatch,
                format!("Missing table: {table}"),
            )
            .with_detail("table", *table));
        }

        let missing: Vec<&str> = columns
            .iter()
            .copied()
            .filter(|c| !present.iter().any(|p| p == c))
            .collect();
        if !missing.is_empty() {
            return Err(AppError::with_message(
                ErrorCode::SchemaMismatch,
                format!("Table {table} is missing columns: {}", missing.join(", ")),
            )
            .with_detail("table", *table)
            .with_detail("columns", missing));
        }
    }

    tracing::debug!(tables = SCHEMA_CONTRACT.len(), "Schema contract verified");
    Ok(())
}
