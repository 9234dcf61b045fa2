use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::entities::{CurrencyType, Rarity, banner_entity};
use crate::gacha::BATCH_SIZE;

/// 卡池展示信息
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BannerResponse {
    pub id: i64,
    pub name: String,
    pub currency_type: CurrencyType,
    /// 单抽价格
    pub cost_per_pull: i64,
    /// 十连价格 (cost_per_pull * 10)
    pub batch_cost: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub sort_order: i32,
}

impl From<banner_entity::Model> for BannerResponse {
    fn from(m: banner_entity::Model) -> Self {
        BannerResponse {
            id: m.id,
            name: m.name,
            currency_type: m.currency_type,
            cost_per_pull: m.cost_per_pull,
            batch_cost: m.cost_per_pull * BATCH_SIZE as i64,
            start_date: m.start_date,
            end_date: m.end_date,
            sort_order: m.sort_order,
        }
    }
}

/// 卡池内单个奖品条目（展示）
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PoolEntryResponse {
    pub prize_id: i64,
    pub name_en: String,
    /// 档内相对权重
    pub weight: i32,
    /// 总库存 (None = 无限)
    pub stock_limit: Option<i64>,
    /// 剩余库存 (None = 无限)
    pub stock_remaining: Option<i64>,
}

/// 稀有度档位展示（含档位有效概率）
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PoolTierResponse {
    pub rarity: Rarity,
    /// 前端主题色
    pub rarity_color: String,
    /// 档位概率 (basis points: 100% = 10000)
    pub probability_bp: u32,
    pub entries: Vec<PoolEntryResponse>,
}

/// 卡池详情（奖品池 + 概率公示）
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BannerPoolResponse {
    pub banner: BannerResponse,
    pub tiers: Vec<PoolTierResponse>,
}
