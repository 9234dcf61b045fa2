use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 用户实体（注册/登录/OAuth 由外部系统负责，本服务只持有引擎相关字段）
/// - diamond_balance / ticket_balance: 双货币余额缓存，只在抽卡事务内变动，
///   与 ledger_entries 对账恒等 (balance == Σ delta)
/// - has_completed_ten_draw: 首次完成十连的一次性里程碑标记，false -> true 后不再回退
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub username: String,
    pub diamond_balance: i64,
    pub ticket_balance: i64,
    pub has_completed_ten_draw: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
