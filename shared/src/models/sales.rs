//! Paid sales facts and aggregated totals

use serde::{Deserialize, Serialize};

/// Kind of product a sale belongs to
///
/// Goods and services carry separate commission schedules.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum SalesKind {
    Goods,
    Service,
}

impl SalesKind {
    pub const ALL: [SalesKind; 2] = [SalesKind::Goods, SalesKind::Service];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Goods => "goods",
            Self::Service => "service",
        }
    }
}

/// One paid order line attributed to a creator through product ownership
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PaidOrderLine {
    pub order_id: i64,
    pub creator_id: i64,
    pub product_id: i64,
    pub kind: SalesKind,
    pub quantity: i64,
    /// Line subtotal, minor currency unit
    pub subtotal: i64,
    /// When the parent order was paid (Unix millis)
    pub paid_at: i64,
}

/// Aggregated sales for one creator / period / kind
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SalesTotals {
    pub gross_sales: i64,
    /// Distinct parent orders
    pub order_count: i64,
    /// Sum of line quantities
    pub item_count: i64,
}

impl SalesTotals {
    pub fn is_empty(&self) -> bool {
        self.gross_sales == 0 && self.order_count == 0
    }
}

/// Sales split by kind, plus the combined totals
///
/// `total.order_count` counts distinct orders across both kinds, so it can be
/// lower than `goods.order_count + service.order_count`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SalesBreakdown {
    pub goods: SalesTotals,
    pub service: SalesTotals,
    pub total: SalesTotals,
}

impl SalesBreakdown {
    pub fn for_kind(&self, kind: SalesKind) -> &SalesTotals {
        match kind {
            SalesKind::Goods => &self.goods,
            SalesKind::Service => &self.service,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total.is_empty()
    }
}
