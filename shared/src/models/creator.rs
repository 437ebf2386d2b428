//! Creator Model (external, read-only to the settlement engine)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::sales::SalesKind;

/// Legal form of a creator
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum BusinessType {
    /// 個人 - subject to withholding when flagged
    Individual,
    /// 法人 - never withheld
    Corporation,
}

/// Bank account type (預金種目)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum AccountType {
    /// 普通
    Ordinary,
    /// 当座
    Current,
}

impl AccountType {
    /// Numeric code used by bank transfer files (1=普通, 2=当座)
    pub fn transfer_code(&self) -> &'static str {
        match self {
            Self::Ordinary => "1",
            Self::Current => "2",
        }
    }

    /// Display label used in the generic export
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ordinary => "普通",
            Self::Current => "当座",
        }
    }
}

/// Commission schedule: percentage of sales plus a fixed fee per order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommissionSchedule {
    /// Percentage with fractional precision (e.g. 20.00)
    pub rate: Decimal,
    /// Fixed fee per order, minor currency unit
    pub per_item: i64,
}

impl CommissionSchedule {
    pub fn new(rate: Decimal, per_item: i64) -> Self {
        Self { rate, per_item }
    }
}

/// Bank transfer destination as entered on the creator profile
///
/// Every field is optional at the source; [`BankDetails::missing_fields`]
/// decides whether the row can be exported.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BankDetails {
    pub bank_code: Option<String>,
    pub bank_name: Option<String>,
    pub branch_code: Option<String>,
    pub branch_name: Option<String>,
    pub account_type: Option<AccountType>,
    pub account_number: Option<String>,
    /// Account holder (katakana or romanized)
    pub account_holder: Option<String>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|s| s.trim().is_empty())
}

impl BankDetails {
    /// Names of required fields that are absent or blank
    ///
    /// Bank and branch codes are optional (transfer files allow them blank).
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.bank_name) {
            missing.push("bank_name");
        }
        if is_blank(&self.branch_name) {
            missing.push("branch_name");
        }
        if self.account_type.is_none() {
            missing.push("account_type");
        }
        if is_blank(&self.account_number) {
            missing.push("account_number");
        }
        if is_blank(&self.account_holder) {
            missing.push("account_holder");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// Creator entity (出品者)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Creator {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    /// Goods sales schedule (commission_rate / commission_per_item)
    pub goods_commission: CommissionSchedule,
    /// Service / skill sales schedule
    pub service_commission: CommissionSchedule,
    pub business_type: BusinessType,
    pub withholding_tax_required: bool,
    pub bank: BankDetails,
    pub is_active: bool,
}

impl Creator {
    /// Schedule matching the kind of sales being settled
    pub fn commission_schedule(&self, kind: SalesKind) -> &CommissionSchedule {
        match kind {
            SalesKind::Goods => &self.goods_commission,
            SalesKind::Service => &self.service_commission,
        }
    }

    /// Individual creators flagged for withholding
    pub fn is_withholding_subject(&self) -> bool {
        self.business_type == BusinessType::Individual && self.withholding_tax_required
    }

    /// Non-blank email address, if any
    pub fn contact_email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
