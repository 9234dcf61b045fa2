use crate::entities::{
    CurrencyType, Rarity, pool_entry_entity as pool_entries, prize_entity as prizes,
    pull_record_entity as records, user_entity as users, user_pity_entity as pity_rows,
};
use crate::error::{AppError, AppResult};
use crate::gacha::probability::{Distribution, Drawn};
use crate::gacha::{BATCH_SIZE, DrawRng, PityState, rarity, thread_draw_rng};
use crate::models::{
    AuraStatusResponse, DrawResponse, DrawnPullResponse, PaginatedResponse, PaginationParams,
    PullRecordPageResponse, PullRecordQuery, PullRecordResponse,
};
use crate::services::{BannerService, LedgerService};
use chrono::Utc;
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, IntoActiveModel, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait, UpdateResult,
};
use std::collections::{HashMap, HashSet};

/// 扣费流水的 reason 标记
const DRAW_REASON: &str = "gacha_pull";

/// secure_prize 的换抽尝试上限，防止配置异常时死循环
const MAX_SECURE_ATTEMPTS: u32 = 16;

/// Aura Zone 抽卡引擎。
/// 一次十连 = 一个数据库事务: 扣费 -> 10 次顺序抽取（保底前馈）
/// -> 抽卡记录 -> 保底计数与十连里程碑持久化，要么全部提交要么全部回滚。
#[derive(Clone)]
pub struct AuraDrawService {
    pool: DatabaseConnection,
    banners: BannerService,
    ledger: LedgerService,
    pity_threshold: i32,
}

impl AuraDrawService {
    pub fn new(
        pool: DatabaseConnection,
        banners: BannerService,
        ledger: LedgerService,
        pity_threshold: i32,
    ) -> Self {
        Self {
            pool,
            banners,
            ledger,
            pity_threshold,
        }
    }

    /// 十连 (perform_draw)
    ///
    /// 逻辑:
    /// 1. 事务外只读校验: 卡池存在且在投放窗口、支付货币匹配
    /// 2. 读取启用的卡池条目并构建累积概率分布（配置错误在扣费前拦截）
    /// 3. 事务内条件扣费（余额不足 / 并发冲突在此区分）
    /// 4. 10 次顺序抽取: 保底计数达到阈值则强制 SSR+，限量奖品原子扣库存
    /// 5. 每抽写一条 pull_record，最后持久化保底计数与首次十连标记
    /// 6. 返回按抽取顺序排列的结果与扣费后余额
    pub async fn perform_draw(
        &self,
        user_id: i64,
        banner_id: i64,
        payment_method: CurrencyType,
    ) -> AppResult<DrawResponse> {
        let mut rng = thread_draw_rng();
        self.perform_draw_with_rng(user_id, banner_id, payment_method, &mut rng)
            .await
    }

    /// 随机源注入版本，属性测试用固定种子/脚本随机源复现结果
    pub async fn perform_draw_with_rng(
        &self,
        user_id: i64,
        banner_id: i64,
        payment_method: CurrencyType,
        rng: &mut dyn DrawRng,
    ) -> AppResult<DrawResponse> {
        let now = Utc::now();
        let banner = self.banners.get_available(banner_id, now).await?;

        // 单一货币制: 支付方式必须与卡池货币一致
        if payment_method != banner.currency_type {
            return Err(AppError::InvalidPaymentMethod(format!(
                "Banner {} only accepts {}",
                banner.name, banner.currency_type
            )));
        }

        let required_cost = banner.cost_per_pull * BATCH_SIZE as i64;

        // 卡池配置与概率分布（坏配置在任何扣费前失败）
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
            .filter(prizes::Column::IsActive.eq(true))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        for e in &entries {
            if !prize_map.contains_key(&e.prize_id) {
                return Err(AppError::MisconfiguredPrizePool(format!(
                    "pool entry references missing or inactive prize {}",
                    e.prize_id
                )));
            }
        }

        let txn = self.pool.begin().await?;

        // 条件扣费: 余额在行锁下复核，不足则整体失败、零副作用
        let debit_entry = self
            .ledger
            .debit(&txn, user_id, payment_method, required_cost, DRAW_REASON)
            .await?;

        // 保底行（不存在则初始化），批内状态在内存中前馈
        let pity_row = self.ensure_pity_tx(&txn, user_id, banner_id).await?;
        let mut pity = PityState::new(pity_row.counter);

        // 开局即无库存的限量奖品直接进排除集
        let mut exhausted: HashSet<i64> = prize_map
            .values()
            .filter(|p| !p.is_available())
            .map(|p| p.id)
            .collect();

        let mut pulls = Vec::with_capacity(BATCH_SIZE as usize);
        for i in 0..BATCH_SIZE {
            // 第 k 抽的保底判定依赖第 k-1 抽的结果，严格顺序执行
            let drawn = if pity.is_forced(self.pity_threshold) {
                dist.draw_min_rank(rarity::min_pity_rank(), rng)?
            } else {
                dist.draw(rng)
            };
            let secured = self
                .secure_prize(&txn, &dist, drawn, &prize_map, &mut exhausted, rng)
                .await?;
            let prize = prize_map.get(&secured.prize_id).ok_or_else(|| {
                AppError::InternalError(format!(
                    "Prize {} missing from preloaded pool",
                    secured.prize_id
                ))
            })?;

            records::ActiveModel {
                user_id: Set(user_id),
                banner_id: Set(banner_id),
                prize_id: Set(secured.prize_id),
                prize_name_en: Set(prize.name_en.clone()),
                rarity: Set(secured.rarity),
                currency: Set(payment_method),
                currency_spent: Set(banner.cost_per_pull),
                sequence_index: Set(i as i32),
                created_at: Set(Some(Utc::now())),
                ..Default::default()
            }
            .insert(&txn)
            .await?;

            pity.record(secured.rarity);

            pulls.push(DrawnPullResponse {
                prize_id: secured.prize_id,
                name_en: prize.name_en.clone(),
                rarity: secured.rarity,
                rarity_color: secured.rarity.display_color().to_string(),
                value_cents: prize.value_cents,
                sequence_index: i as i32,
            });
        }

        // 持久化批后保底计数
        {
            let mut am = pity_row.into_active_model();
            am.counter = Set(pity.counter);
            am.updated_at = Set(Some(Utc::now()));
            am.update(&txn).await?;
        }

        // 首次十连里程碑: 只允许 false -> true，一次性、不可回退
        users::Entity::update_many()
            .col_expr(users::Column::HasCompletedTenDraw, Expr::value(true))
            .filter(users::Column::Id.eq(user_id))
            .filter(users::Column::HasCompletedTenDraw.eq(false))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        log::info!(
            "user {user_id} completed a 10x draw on banner {banner_id}, spent {required_cost} {payment_method}"
        );

        Ok(DrawResponse {
            pulls,
            currency: payment_method,
            new_balance: debit_entry.balance_after,
        })
    }

    /// 保底与里程碑状态（展示用）
    pub async fn get_status(&self, user_id: i64, banner_id: i64) -> AppResult<AuraStatusResponse> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let counter = pity_rows::Entity::find()
            .filter(pity_rows::Column::UserId.eq(user_id))
            .filter(pity_rows::Column::BannerId.eq(banner_id))
            .one(&self.pool)
            .await?
            .map(|m| m.counter)
            .unwrap_or(0);

        Ok(AuraStatusResponse {
            banner_id,
            pity_counter: counter,
            pity_threshold: self.pity_threshold,
            draws_until_pity: Ord::max(self.pity_threshold - 1 - counter, 0),
            has_completed_ten_draw: user.has_completed_ten_draw,
        })
    }

    /// 抽卡记录（分页，倒序，可按卡池过滤）
    pub async fn list_records(
        &self,
        user_id: i64,
        query: &PullRecordQuery,
    ) -> AppResult<PullRecordPageResponse> {
        let params = PaginationParams::new(query.page, query.per_page);
        let offset = params.get_offset();
        let limit = params.get_limit();

        let mut base_query = records::Entity::find().filter(records::Column::UserId.eq(user_id));
        if let Some(banner_id) = query.banner_id {
            base_query = base_query.filter(records::Column::BannerId.eq(banner_id));
        }

        let total = base_query.clone().count(&self.pool).await? as i64;

        let items_models = base_query
            .order_by(records::Column::CreatedAt, Order::Desc)
            .order_by(records::Column::SequenceIndex, Order::Desc)
            .limit(limit as u64)
            .offset(offset as u64)
            .all(&self.pool)
            .await?;

        let items: Vec<PullRecordResponse> = items_models.into_iter().map(Into::into).collect();

        Ok(PaginatedResponse::new(items, &params, total))
    }

    // -----------------------------
    // 内部辅助方法
    // -----------------------------

    async fn ensure_pity_tx(
        &self,
        txn: &DatabaseTransaction,
        user_id: i64,
        banner_id: i64,
    ) -> Result<pity_rows::Model, DbErr> {
        if let Some(m) = pity_rows::Entity::find()
            .filter(pity_rows::Column::UserId.eq(user_id))
            .filter(pity_rows::Column::BannerId.eq(banner_id))
            .one(txn)
            .await?
        {
            return Ok(m);
        }
        pity_rows::ActiveModel {
            user_id: Set(user_id),
            banner_id: Set(banner_id),
            counter: Set(0),
            ..Default::default()
        }
        .insert(txn)
        .await
    }

    /// 把抽中的奖品落到库存上。
    /// 限量奖品用原子条件扣减 (where stock_remaining > 0)；
    /// 扣减失败说明已售罄: 先同档换抽，同档抽干再从最低可用档兜底，
    /// 整池耗尽才报 PrizeOutOfStock（整个批次回滚）。
    async fn secure_prize(
        &self,
        txn: &DatabaseTransaction,
        dist: &Distribution,
        drawn: Drawn,
        prize_map: &HashMap<i64, prizes::Model>,
        exhausted: &mut HashSet<i64>,
        rng: &mut dyn DrawRng,
    ) -> AppResult<Drawn> {
        let mut current = drawn;
        let mut attempts = 0;

        while attempts < MAX_SECURE_ATTEMPTS {
            attempts += 1;

            if exhausted.contains(&current.prize_id) {
                current = match dist.draw_in_tier(current.rarity, exhausted, rng) {
                    Some(prize_id) => Drawn {
                        prize_id,
                        rarity: current.rarity,
                    },
                    None => match dist.draw_fallback(exhausted, rng) {
                        Some(alt) => alt,
                        None => {
                            return Err(AppError::PrizeOutOfStock(
                                "Prize pool fully exhausted".to_string(),
                            ));
                        }
                    },
                };
            }

            let prize = prize_map.get(&current.prize_id).ok_or_else(|| {
                AppError::InternalError(format!(
                    "Prize {} missing from preloaded pool",
                    current.prize_id
                ))
            })?;

            // 无限库存直接返回
            if prize.stock_remaining.is_none() {
                return Ok(current);
            }

            // 限量奖品: 原子扣减 (where stock_remaining > 0)
            let update_result: UpdateResult = prizes::Entity::update_many()
                .col_expr(
                    prizes::Column::StockRemaining,
                    Expr::col(prizes::Column::StockRemaining).sub(1),
                )
                .filter(prizes::Column::Id.eq(current.prize_id))
                .filter(
                    Condition::all()
                        .add(prizes::Column::StockRemaining.is_not_null())
                        .add(prizes::Column::StockRemaining.gt(0)),
                )
                .exec(txn)
                .await?;

            if update_result.rows_affected == 1 {
                return Ok(current);
            }

            // 扣减失败 - 库存已为0，记入排除集后换抽
            exhausted.insert(current.prize_id);
        }

        Err(AppError::PrizeOutOfStock(
            "Failed to secure a prize after several attempts".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn service(db: DatabaseConnection) -> AuraDrawService {
        AuraDrawService::new(
            db.clone(),
            BannerService::new(db.clone()),
            LedgerService::new(db),
            10,
        )
    }

    fn user_row(has_completed_ten_draw: bool) -> users::Model {
        users::Model {
            id: 1,
            username: "mika".to_string(),
            diamond_balance: 3000,
            ticket_balance: 0,
            has_completed_ten_draw,
            created_at: None,
            updated_at: None,
        }
    }

    /// counter = 9（阈值 10）时下一抽即整体第 10 抽，必出 SSR+
    #[tokio::test]
    async fn test_status_zero_draws_until_pity_at_counter_nine() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_row(true)]])
            .append_query_results([vec![pity_rows::Model {
                id: 1,
                user_id: 1,
                banner_id: 2,
                counter: 9,
                created_at: None,
                updated_at: None,
            }]])
            .into_connection();

        let status = service(db).get_status(1, 2).await.unwrap();
        assert_eq!(status.pity_counter, 9);
        assert_eq!(status.draws_until_pity, 0);
        assert!(status.has_completed_ten_draw);
    }

    /// 无计数行视为 0：还差 threshold-1 抽触发保底
    #[tokio::test]
    async fn test_status_defaults_to_fresh_counter_without_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_row(false)]])
            .append_query_results([Vec::<pity_rows::Model>::new()])
            .into_connection();

        let status = service(db).get_status(1, 2).await.unwrap();
        assert_eq!(status.pity_counter, 0);
        assert_eq!(status.draws_until_pity, 9);
        assert!(!status.has_completed_ten_draw);
    }
}
