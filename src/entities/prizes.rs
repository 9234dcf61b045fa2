use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 稀有度枚举（按价值升序），引擎与展示层共用这一份排序，
/// 不再各自用字符串 switch 重复判定。
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    ToSchema,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "rarity")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rarity {
    #[sea_orm(string_value = "common")]
    Common,
    #[sea_orm(string_value = "rare")]
    Rare,
    #[sea_orm(string_value = "epic")]
    Epic,
    #[sea_orm(string_value = "ssr")]
    Ssr,
    #[sea_orm(string_value = "legendary")]
    Legendary,
}

impl Rarity {
    /// 升序等级 (COMMON=0 .. LEGENDARY=4)
    pub fn rank(&self) -> u8 {
        match self {
            Rarity::Common => 0,
            Rarity::Rare => 1,
            Rarity::Epic => 2,
            Rarity::Ssr => 3,
            Rarity::Legendary => 4,
        }
    }

    /// 前端主题色（展示层直接取这里，避免重复映射表）
    pub fn display_color(&self) -> &'static str {
        match self {
            Rarity::Common => "#9ca3af",
            Rarity::Rare => "#3b82f6",
            Rarity::Epic => "#a855f7",
            Rarity::Ssr => "#f59e0b",
            Rarity::Legendary => "#ef4444",
        }
    }
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rarity::Common => write!(f, "common"),
            Rarity::Rare => write!(f, "rare"),
            Rarity::Epic => write!(f, "epic"),
            Rarity::Ssr => write!(f, "ssr"),
            Rarity::Legendary => write!(f, "legendary"),
        }
    }
}

/// 奖品实体
/// 概念说明:
/// - value_cents: 奖品对应价值(美分)，虚拟道具可为0
/// - stock_limit: 总库存 (NULL 表示无限)
/// - stock_remaining: 剩余库存 (NULL 表示无限, 不参与扣减; 永不为负)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "prizes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// 英文奖品名称 (唯一)
    pub name_en: String,
    pub rarity: Rarity,
    /// 奖品面值(美分)
    pub value_cents: i64,
    /// 库存上限 (NULL=无限)
    pub stock_limit: Option<i64>,
    /// 剩余库存 (NULL=无限)
    pub stock_remaining: Option<i64>,
    /// 是否启用
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    /// 是否还有库存 (无限库存或剩余 > 0)
    pub fn is_available(&self) -> bool {
        match self.stock_remaining {
            None => true,
            Some(remain) => remain > 0,
        }
    }

    /// 是否是限量奖品
    pub fn is_limited(&self) -> bool {
        self.stock_limit.is_some()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rarity_rank_is_ascending() {
        let order = [
            Rarity::Common,
            Rarity::Rare,
            Rarity::Epic,
            Rarity::Ssr,
            Rarity::Legendary,
        ];
        for pair in order.windows(2) {
            assert!(pair[0].rank() < pair[1].rank());
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_stock_availability() {
        let mut prize = Model {
            id: 1,
            name_en: "Signed Polaroid".to_string(),
            rarity: Rarity::Legendary,
            value_cents: 0,
            stock_limit: Some(5),
            stock_remaining: Some(5),
            is_active: true,
            created_at: None,
            updated_at: None,
        };
        assert!(prize.is_limited());
        assert!(prize.is_available());

        prize.stock_remaining = Some(0);
        assert!(!prize.is_available());

        prize.stock_limit = None;
        prize.stock_remaining = None;
        assert!(prize.is_available());
        assert!(!prize.is_limited());
    }
}
