use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 卡池结算货币（单一货币制：一个卡池只收一种货币）
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "currency_type")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CurrencyType {
    #[sea_orm(string_value = "diamonds")]
    Diamonds,
    #[sea_orm(string_value = "tickets")]
    Tickets,
}

impl std::fmt::Display for CurrencyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CurrencyType::Diamonds => write!(f, "diamonds"),
            CurrencyType::Tickets => write!(f, "tickets"),
        }
    }
}

/// Aura Zone 卡池配置实体
/// 概念说明:
/// - currency_type: 本卡池使用的货币（钻石或抽奖券）
/// - cost_per_pull: 单抽价格 (>0)，十连价格 = cost_per_pull * 10
/// - start_date / end_date: 投放窗口，end_date 当刻即失效 (半开区间)
/// - sort_order: 前台展示排序（升序）
/// 卡池由外部后台工具维护，抽卡引擎只读。
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "banners")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub currency_type: CurrencyType,
    pub cost_per_pull: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    /// 是否在投放窗口内可抽 (is_active 且 start <= now < end)
    pub fn is_available_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.start_date <= now && now < self.end_date
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn banner(start: i64, end: i64, is_active: bool) -> Model {
        Model {
            id: 1,
            name: "Aura Zone Vol. 1".to_string(),
            currency_type: CurrencyType::Diamonds,
            cost_per_pull: 300,
            start_date: Utc.timestamp_opt(start, 0).unwrap(),
            end_date: Utc.timestamp_opt(end, 0).unwrap(),
            is_active,
            sort_order: 1,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_banner_window_is_half_open() {
        let b = banner(100, 200, true);
        assert!(!b.is_available_at(Utc.timestamp_opt(99, 0).unwrap()));
        assert!(b.is_available_at(Utc.timestamp_opt(100, 0).unwrap()));
        assert!(b.is_available_at(Utc.timestamp_opt(199, 0).unwrap()));
        assert!(!b.is_available_at(Utc.timestamp_opt(200, 0).unwrap()));
    }

    #[test]
    fn test_inactive_banner_never_available() {
        let b = banner(100, 200, false);
        assert!(!b.is_available_at(Utc.timestamp_opt(150, 0).unwrap()));
    }
}
