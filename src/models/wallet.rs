use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{CurrencyType, ledger_entry_entity};

use super::PaginatedResponse;

/// 双货币余额响应
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BalanceResponse {
    pub diamonds: i64,
    pub tickets: i64,
}

/// 流水查询参数
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct LedgerQuery {
    /// 页码 (默认 1)
    pub page: Option<u32>,
    /// 每页数量 (默认 20)
    pub per_page: Option<u32>,
    /// 可选: 只看某种货币
    pub currency: Option<CurrencyType>,
}

/// 流水条目响应
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LedgerEntryResponse {
    pub id: i64,
    pub currency: CurrencyType,
    /// 有符号变动额（扣费为负）
    pub delta: i64,
    /// 变动后余额
    pub balance_after: i64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl From<ledger_entry_entity::Model> for LedgerEntryResponse {
    fn from(m: ledger_entry_entity::Model) -> Self {
        LedgerEntryResponse {
            id: m.id,
            currency: m.currency,
            delta: m.delta,
            balance_after: m.balance_after,
            reason: m.reason,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}

/// 流水分页响应
pub type LedgerPageResponse = PaginatedResponse<LedgerEntryResponse>;
