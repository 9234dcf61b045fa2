use crate::entities::{
    Rarity, banner_entity as banners, pool_entry_entity as pool_entries, prize_entity as prizes,
};
use crate::error::{AppError, AppResult};
use crate::gacha::probability::Distribution;
use crate::models::{BannerPoolResponse, BannerResponse, PoolEntryResponse, PoolTierResponse};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::collections::HashMap;

/// 卡池目录（配置由外部后台维护，本服务只读）
#[derive(Clone)]
pub struct BannerService {
    pool: DatabaseConnection,
}

impl BannerService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 当前投放窗口内的卡池，按 sort_order 升序再按名称排序
    pub async fn list_active(&self, now: DateTime<Utc>) -> AppResult<Vec<BannerResponse>> {
        let list = banners::Entity::find()
            .filter(banners::Column::IsActive.eq(true))
            .filter(banners::Column::StartDate.lte(now))
            .filter(banners::Column::EndDate.gt(now))
            .order_by_asc(banners::Column::SortOrder)
            .order_by_asc(banners::Column::Name)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    pub async fn get(&self, banner_id: i64) -> AppResult<banners::Model> {
        banners::Entity::find_by_id(banner_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Banner {banner_id} not found")))
    }

    /// 抽卡前置校验：存在且在投放窗口内，否则 BannerUnavailable
    pub async fn get_available(
        &self,
        banner_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<banners::Model> {
        let banner = banners::Entity::find_by_id(banner_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::BannerUnavailable(format!("Banner {banner_id} does not exist"))
            })?;
        if !banner.is_available_at(now) {
            return Err(AppError::BannerUnavailable(format!(
                "Banner {} is not currently active",
                banner.name
            )));
        }
        Ok(banner)
    }

    /// 卡池详情与概率公示（按稀有度分档，含档位有效概率）。
    /// 构建 Distribution 顺带完成配置校验，坏配置在这里就会暴露。
    pub async fn get_pool(&self, banner_id: i64, now: DateTime<Utc>) -> AppResult<BannerPoolResponse> {
        let banner = self.get_available(banner_id, now).await?;

        let entries = pool_entries::Entity::find()
            .filter(pool_entries::Column::BannerId.eq(banner_id))
            .filter(pool_entries::Column::IsActive.eq(true))
            .order_by_asc(pool_entries::Column::Id)
            .all(&self.pool)
            .await?;

        let tuples: Vec<(i64, Rarity, i32)> = entries
            .iter()
            .map(|e| (e.prize_id, e.rarity, e.weight))
            .collect();
        let dist = Distribution::build(&tuples)?;

        let prize_ids: Vec<i64> = entries.iter().map(|e| e.prize_id).collect();
        let prize_map: HashMap<i64, prizes::Model> = prizes::Entity::find()
            .filter(prizes::Column::Id.is_in(prize_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let tiers = dist
            .tier_probabilities()
            .into_iter()
            .map(|(rarity, probability_bp)| PoolTierResponse {
                rarity,
                rarity_color: rarity.display_color().to_string(),
                probability_bp,
                entries: entries
                    .iter()
                    .filter(|e| e.rarity == rarity)
                    .map(|e| {
                        let prize = prize_map.get(&e.prize_id);
                        PoolEntryResponse {
                            prize_id: e.prize_id,
                            name_en: prize.map(|p| p.name_en.clone()).unwrap_or_default(),
                            weight: e.weight,
                            stock_limit: prize.and_then(|p| p.stock_limit),
                            stock_remaining: prize.and_then(|p| p.stock_remaining),
                        }
                    })
                    .collect(),
            })
            .collect();

        Ok(BannerPoolResponse {
            banner: banner.into(),
            tiers,
        })
    }
}
