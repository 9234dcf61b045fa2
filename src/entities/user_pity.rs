use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 保底计数器（按 (user_id, banner_id) 一行，唯一索引保证）
/// counter >= 0；命中 SSR 及以上清零，否则 +1。
/// 只允许在 perform_draw 的事务内读写，避免并发丢失更新。
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "user_pity")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub banner_id: i64,
    pub counter: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
