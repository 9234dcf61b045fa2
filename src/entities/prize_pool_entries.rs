use crate::entities::Rarity;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 卡池奖品条目（banner 与 prize 的挂载关系）
/// - weight: 同稀有度档内的相对权重 (>0)，档位整体概率由 RarityConfig 决定，
///   档内按 weight 归一化二次抽取
/// - rarity: 条目稀有度快照，须与奖品稀有度一致（配置工具保证）
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "prize_pool_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub banner_id: i64,
    pub prize_id: i64,
    pub rarity: Rarity,
    pub weight: i32,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
