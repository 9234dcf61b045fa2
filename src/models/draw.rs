use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{CurrencyType, Rarity, pull_record_entity as record_entity};

use super::PaginatedResponse;

/// 十连请求（批次大小固定为 10，由产品规则决定，不在请求里）
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct DrawRequest {
    pub banner_id: i64,
    /// 必须与卡池的 currency_type 一致（单一货币制）
    pub payment_method: CurrencyType,
}

/// 批次内的单抽结果
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DrawnPullResponse {
    pub prize_id: i64,
    pub name_en: String,
    pub rarity: Rarity,
    /// 前端主题色（展示元数据）
    pub rarity_color: String,
    /// 奖品面值(美分)
    pub value_cents: i64,
    /// 批次内序号 (0..9)，与抽取顺序一致
    pub sequence_index: i32,
}

/// 十连结果
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DrawResponse {
    pub pulls: Vec<DrawnPullResponse>,
    pub currency: CurrencyType,
    /// 扣费后的余额
    pub new_balance: i64,
}

/// 抽卡记录查询参数
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct PullRecordQuery {
    /// 页码 (默认 1)
    pub page: Option<u32>,
    /// 每页数量 (默认 20)
    pub per_page: Option<u32>,
    /// 可选: 只看某个卡池
    pub banner_id: Option<i64>,
}

/// 抽卡记录响应
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PullRecordResponse {
    pub id: i64,
    pub banner_id: i64,
    pub prize_id: i64,
    /// 奖品英文名称 (历史快照)
    pub prize_name_en: String,
    pub rarity: Rarity,
    pub rarity_color: String,
    pub currency: CurrencyType,
    pub currency_spent: i64,
    pub sequence_index: i32,
    pub created_at: DateTime<Utc>,
}

impl From<record_entity::Model> for PullRecordResponse {
    fn from(m: record_entity::Model) -> Self {
        PullRecordResponse {
            id: m.id,
            banner_id: m.banner_id,
            prize_id: m.prize_id,
            prize_name_en: m.prize_name_en,
            rarity: m.rarity,
            rarity_color: m.rarity.display_color().to_string(),
            currency: m.currency,
            currency_spent: m.currency_spent,
            sequence_index: m.sequence_index,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}

/// 保底状态查询参数（保底按卡池独立计数）
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct AuraStatusQuery {
    pub banner_id: i64,
}

/// 保底/里程碑状态响应
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuraStatusResponse {
    pub banner_id: i64,
    /// 当前连续未出 SSR+ 的次数
    pub pity_counter: i32,
    /// 保底阈值
    pub pity_threshold: i32,
    /// 距离保底还差几抽 (0 表示下一抽必出 SSR+)
    pub draws_until_pity: i32,
    /// 是否已完成过首次十连（一次性里程碑）
    pub has_completed_ten_draw: bool,
}

/// 抽卡记录分页响应
pub type PullRecordPageResponse = PaginatedResponse<PullRecordResponse>;
