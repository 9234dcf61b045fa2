use crate::entities::{CurrencyType, Rarity};
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 抽卡记录（每一抽一行，写入后不可变）
/// - sequence_index: 在十连批次内的序号 (0..9)
/// - currency_spent: 本抽分摊的货币成本（单抽价格快照）
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "pull_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub banner_id: i64,
    pub prize_id: i64,
    /// 奖品英文名称 (历史快照)
    pub prize_name_en: String,
    pub rarity: Rarity,
    pub currency: CurrencyType,
    pub currency_spent: i64,
    pub sequence_index: i32,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
