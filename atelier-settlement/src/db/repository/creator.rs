//! Creator Repository (read-only)

use std::str::FromStr;

use rust_decimal::Decimal;
use shared::models::{AccountType, BankDetails, BusinessType, CommissionSchedule, Creator};
use sqlx::SqlitePool;

use super::{RepoError, RepoResult};

const SELECT_CREATOR: &str = "SELECT id, name, email, commission_rate, commission_per_item, service_commission_rate, service_commission_per_item, business_type, withholding_tax_required, bank_code, bank_name, branch_code, branch_name, account_type, account_number, account_holder, is_active FROM creators";

/// Raw row; commission rates are decimal TEXT
#[derive(Debug, sqlx::FromRow)]
struct CreatorRow {
    id: i64,
    name: String,
    email: Option<String>,
    commission_rate: String,
    commission_per_item: i64,
    service_commission_rate: String,
    service_commission_per_item: i64,
    business_type: BusinessType,
    withholding_tax_required: bool,
    bank_code: Option<String>,
    bank_name: Option<String>,
    branch_code: Option<String>,
    branch_name: Option<String>,
    account_type: Option<AccountType>,
    account_number: Option<String>,
    account_holder: Option<String>,
    is_active: bool,
}

fn parse_schedule(
    creator_id: i64,
    column: &str,
    raw_rate: &str,
    per_item: i64,
) -> RepoResult<CommissionSchedule> {
    let rate = Decimal::from_str(raw_rate.trim()).map_err(|_| RepoError::InvalidCommission {
        creator_id,
        reason: format!("{column} '{raw_rate}' is not a decimal"),
    })?;
    if rate.is_sign_negative() || rate > Decimal::ONE_HUNDRED {
        return Err(RepoError::InvalidCommission {
            creator_id,
            reason: format!("{column} {rate} is outside 0..=100"),
        });
    }
    if per_item < 0 {
        return Err(RepoError::InvalidCommission {
            creator_id,
            reason: format!("per-item fee {per_item} is negative"),
        });
    }
    Ok(CommissionSchedule::new(rate, per_item))
}

impl TryFrom<CreatorRow> for Creator {
    type Error = RepoError;

    fn try_from(row: CreatorRow) -> RepoResult<Self> {
        let goods_commission = parse_schedule(
            row.id,
            "commission_rate",
            &row.commission_rate,
            row.commission_per_item,
        )?;
        let service_commission = parse_schedule(
            row.id,
            "service_commission_rate",
            &row.service_commission_rate,
            row.service_commission_per_item,
        )?;

        Ok(Creator {
            id: row.id,
            name: row.name,
            email: row.email,
            goods_commission,
            service_commission,
            business_type: row.business_type,
            withholding_tax_required: row.withholding_tax_required,
            bank: BankDetails {
                bank_code: row.bank_code,
                bank_name: row.bank_name,
                branch_code: row.branch_code,
                branch_name: row.branch_name,
                account_type: row.account_type,
                account_number: row.account_number,
                account_holder: row.account_holder,
            },
            is_active: row.is_active,
        })
    }
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Creator>> {
    let row = sqlx::query_as::<_, CreatorRow>(&format!("{SELECT_CREATOR} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(Creator::try_from).transpose()
}

/// All active creators, ordered by id
///
/// Rows are converted one by one: a malformed commission schedule fails only
/// its own entry.
pub async fn find_active(pool: &SqlitePool) -> RepoResult<Vec<RepoResult<Creator>>> {
    let rows = sqlx::query_as::<_, CreatorRow>(&format!(
        "{SELECT_CREATOR} WHERE is_active = 1 ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Creator::try_from).collect())
}
