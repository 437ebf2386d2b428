//! Payment export files (振込データ)
//!
//! Renders pending payments into Shift_JIS CSV for bank import. Rendering is
//! a pure transform of a ledger snapshot: completed rows are dropped, rows
//! with missing bank details or unencodable text are skipped and reported,
//! and the rest are written.

use std::str::FromStr;

use atelier_export::{CsvBuilder, LegacyEncoder, ShiftJisEncoder};
use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{Creator, CreatorPayment, SettlementPeriod};

use super::error::{EngineResult, SettlementError};

const GENERIC_COLUMNS: [&str; 10] = [
    "creator_name",
    "bank_name",
    "bank_branch",
    "account_type",
    "account_number",
    "account_name",
    "net_payment",
    "gross_sales",
    "commission",
    "withholding_tax",
];

const TRANSFER_COLUMNS: [&str; 10] = [
    "bank_code",
    "bank_name",
    "branch_code",
    "branch_name",
    "account_type",
    "account_number",
    "account_holder",
    "amount",
    "memo",
    "transfer_type",
];

/// 電信扱い
const TELEGRAPHIC_TRANSFER: &str = "7";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    /// Human-readable list with header row, any bank
    Generic,
    /// Positional bank transfer import, no header
    BankTransfer,
}

impl ExportFormat {
    pub fn filename(&self, period: SettlementPeriod) -> String {
        match self {
            Self::Generic => format!("payment_{}.csv", period.file_suffix()),
            Self::BankTransfer => format!("rakuten_transfer_{}.csv", period.file_suffix()),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = SettlementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generic" => Ok(Self::Generic),
            "bank-transfer" | "bank_transfer" => Ok(Self::BankTransfer),
            other => Err(SettlementError::UnknownFormat(other.to_string())),
        }
    }
}

/// One payment joined with its creator
#[derive(Debug, Clone)]
pub struct ExportRow {
    pub payment: CreatorPayment,
    pub creator: Creator,
}

/// A row left out of the file and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub payment_id: i64,
    pub creator_id: i64,
    pub creator_name: String,
    pub code: ErrorCode,
    pub reason: String,
}

/// Rendered file
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    /// e.g. `text/csv; charset=Shift_JIS`
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub row_count: usize,
    pub skipped: Vec<SkippedRow>,
}

#[derive(Debug, Clone, Default)]
pub struct ExportFormatter {
    /// Prepended to the transfer memo
    memo_prefix: String,
}

impl ExportFormatter {
    pub fn new(memo_prefix: impl Into<String>) -> Self {
        Self {
            memo_prefix: memo_prefix.into(),
        }
    }

    /// Render the snapshot; zero written rows is [`SettlementError::ExportEmpty`]
    pub fn render(
        &self,
        period: SettlementPeriod,
        rows: &[ExportRow],
        format: ExportFormat,
    ) -> EngineResult<ExportFile> {
        let encoder = ShiftJisEncoder;
        let content_type = format!("text/csv; charset={}", encoder.name());
        let mut csv = match format {
            ExportFormat::Generic => {
                let mut csv = CsvBuilder::new(encoder).with_columns(&GENERIC_COLUMNS);
                csv.header()?;
                csv
            }
            ExportFormat::BankTransfer => CsvBuilder::new(encoder).with_columns(&TRANSFER_COLUMNS),
        };

        let mut skipped = Vec::new();
        for row in rows.iter().filter(|r| !r.payment.is_completed()) {
            let fields = match self.fields(period, row, format) {
                Ok(fields) => fields,
                Err(err) => {
                    skipped.push(skip(row, &err));
                    continue;
                }
            };
            if let Err(e) = csv.row(fields.as_slice()) {
                skipped.push(skip(row, &SettlementError::Encoding(e)));
            }
        }

        for s in &skipped {
            tracing::warn!(
                payment_id = s.payment_id,
                creator_id = s.creator_id,
                reason = %s.reason,
                "Export row skipped"
            );
        }

        let row_count = csv.row_count();
        if row_count == 0 {
            return Err(SettlementError::ExportEmpty { period });
        }

        tracing::info!(%period, ?format, row_count, skipped = skipped.len(), "Export rendered");
        Ok(ExportFile {
            filename: format.filename(period),
            content_type,
            bytes: csv.build(),
            row_count,
            skipped,
        })
    }

    fn fields(
        &self,
        period: SettlementPeriod,
        row: &ExportRow,
        format: ExportFormat,
    ) -> EngineResult<Vec<String>> {
        let bank = &row.creator.bank;
        let missing = bank.missing_fields();
        if !missing.is_empty() {
            return Err(SettlementError::BankDetailsMissing {
                creator_id: row.creator.id,
                fields: missing,
            });
        }
        let text = |v: &Option<String>| v.as_deref().map(str::trim).unwrap_or("").to_string();
        let account_type = bank.account_type.ok_or(SettlementError::BankDetailsMissing {
            creator_id: row.creator.id,
            fields: vec!["account_type"],
        })?;
        let p = &row.payment;

        let fields = match format {
            ExportFormat::Generic => vec![
                row.creator.name.clone(),
                text(&bank.bank_name),
                text(&bank.branch_name),
                account_type.label().to_string(),
                text(&bank.account_number),
                text(&bank.account_holder),
                p.net_payment.to_string(),
                p.gross_sales.to_string(),
                p.commission_amount.to_string(),
                p.withholding_tax.to_string(),
            ],
            ExportFormat::BankTransfer => {
                if p.net_payment <= 0 {
                    return Err(SettlementError::App(AppError::with_message(
                        ErrorCode::InvalidSettlementAmount,
                        "Net payment is zero, nothing to transfer",
                    )));
                }
                vec![
                    text(&bank.bank_code),
                    text(&bank.bank_name),
                    text(&bank.branch_code),
                    text(&bank.branch_name),
                    account_type.transfer_code().to_string(),
                    text(&bank.account_number),
                    text(&bank.account_holder),
                    p.net_payment.to_string(),
                    self.memo(period),
                    TELEGRAPHIC_TRANSFER.to_string(),
                ]
            }
        };
        Ok(fields)
    }

    fn memo(&self, period: SettlementPeriod) -> String {
        let prefix = self.memo_prefix.trim();
        if prefix.is_empty() {
            format!("{}分", period.label())
        } else {
            format!("{prefix} {}分", period.label())
        }
    }
}

fn skip(row: &ExportRow, err: &SettlementError) -> SkippedRow {
    SkippedRow {
        payment_id: row.payment.id,
        creator_id: row.creator.id,
        creator_name: row.creator.name.clone(),
        code: err.code(),
        reason: err.to_string(),
    }
}
