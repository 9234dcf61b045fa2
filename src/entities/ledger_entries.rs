use crate::entities::CurrencyType;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 货币流水（追加式台账，写入后不可变）
/// - delta: 有符号变动额，扣费为负、发放为正
/// - balance_after: 变动后的余额快照，便于审计与展示
/// 不变量: 对任意用户与货币，Σ delta == users 表缓存余额
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub currency: CurrencyType,
    pub delta: i64,
    pub balance_after: i64,
    pub reason: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
