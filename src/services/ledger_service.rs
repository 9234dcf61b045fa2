use crate::entities::{CurrencyType, ledger_entry_entity as ledger, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::{BalanceResponse, LedgerEntryResponse, LedgerPageResponse, LedgerQuery, PaginatedResponse, PaginationParams};
use chrono::Utc;
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

/// 货币台账：余额缓存列 + 追加式流水。
/// 所有变动都在调用方事务内完成，保证余额与流水原子一致。
#[derive(Clone)]
pub struct LedgerService {
    pool: DatabaseConnection,
}

impl LedgerService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    fn balance_column(currency: CurrencyType) -> users::Column {
        match currency {
            CurrencyType::Diamonds => users::Column::DiamondBalance,
            CurrencyType::Tickets => users::Column::TicketBalance,
        }
    }

    fn balance_of(user: &users::Model, currency: CurrencyType) -> i64 {
        match currency {
            CurrencyType::Diamonds => user.diamond_balance,
            CurrencyType::Tickets => user.ticket_balance,
        }
    }

    /// 获取双货币余额
    pub async fn get_balances(&self, user_id: i64) -> AppResult<BalanceResponse> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        Ok(BalanceResponse {
            diamonds: user.diamond_balance,
            tickets: user.ticket_balance,
        })
    }

    /// 事务内扣费。
    /// 条件更新 (WHERE balance >= amount) 保证余额不可能变负；
    /// 并发请求在行锁上串行化，条件失败的一方拿到余额不足或冲突。
    pub async fn debit(
        &self,
        txn: &DatabaseTransaction,
        user_id: i64,
        currency: CurrencyType,
        amount: i64,
        reason: &str,
    ) -> AppResult<ledger::Model> {
        if amount <= 0 {
            return Err(AppError::ValidationError(
                "Debit amount must be positive".to_string(),
            ));
        }

        let col = Self::balance_column(currency);
        let result = users::Entity::update_many()
            .col_expr(col, Expr::col(col).sub(amount))
            .filter(users::Column::Id.eq(user_id))
            .filter(col.gte(amount))
            .exec(txn)
            .await?;

        if result.rows_affected == 0 {
            let user = users::Entity::find_by_id(user_id)
                .one(txn)
                .await?
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
            let balance = Self::balance_of(&user, currency);
            if balance >= amount {
                // 行存在且余额足够但条件更新没生效，只可能是并发窗口
                return Err(AppError::ConcurrencyConflict);
            }
            return Err(AppError::InsufficientFunds {
                balance,
                required: amount,
            });
        }

        let balance_after = self.read_balance_tx(txn, user_id, currency).await?;
        self.append_entry(txn, user_id, currency, -amount, balance_after, reason)
            .await
    }

    /// 事务内发放（货币合法即成功）
    pub async fn credit(
        &self,
        txn: &DatabaseTransaction,
        user_id: i64,
        currency: CurrencyType,
        amount: i64,
        reason: &str,
    ) -> AppResult<ledger::Model> {
        if amount <= 0 {
            return Err(AppError::ValidationError(
                "Credit amount must be positive".to_string(),
            ));
        }

        let col = Self::balance_column(currency);
        let result = users::Entity::update_many()
            .col_expr(col, Expr::col(col).add(amount))
            .filter(users::Column::Id.eq(user_id))
            .exec(txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        let balance_after = self.read_balance_tx(txn, user_id, currency).await?;
        self.append_entry(txn, user_id, currency, amount, balance_after, reason)
            .await
    }

    /// 流水分页（倒序，可按货币过滤）
    pub async fn list_entries(&self, user_id: i64, query: &LedgerQuery) -> AppResult<LedgerPageResponse> {
        let params = PaginationParams::new(query.page, query.per_page);
        let offset = params.get_offset();
        let limit = params.get_limit();

        let mut base_query = ledger::Entity::find().filter(ledger::Column::UserId.eq(user_id));
        if let Some(currency) = query.currency {
            base_query = base_query.filter(ledger::Column::Currency.eq(currency));
        }

        let total = base_query.clone().count(&self.pool).await? as i64;

        let items_models = base_query
            .order_by(ledger::Column::CreatedAt, Order::Desc)
            .limit(limit as u64)
            .offset(offset as u64)
            .all(&self.pool)
            .await?;

        let items: Vec<LedgerEntryResponse> = items_models.into_iter().map(Into::into).collect();

        Ok(PaginatedResponse::new(items, &params, total))
    }

    /// 对账：重放某用户某货币的全部流水，校验 Σ delta == 缓存余额。
    /// 不在每次调用时强制执行，供审计任务与测试使用。
    pub async fn verify_balance(&self, user_id: i64, currency: CurrencyType) -> AppResult<bool> {
        #[derive(Debug, sea_orm::FromQueryResult)]
        struct SumRow {
            total: Option<i64>,
        }

        let replayed = ledger::Entity::find()
            .filter(ledger::Column::UserId.eq(user_id))
            .filter(ledger::Column::Currency.eq(currency))
            .select_only()
            .column_as(Expr::col(ledger::Column::Delta).sum(), "total")
            .into_model::<SumRow>()
            .one(&self.pool)
            .await?
            .and_then(|r| r.total)
            .unwrap_or(0);

        let cached = Self::balance_of(
            &users::Entity::find_by_id(user_id)
                .one(&self.pool)
                .await?
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?,
            currency,
        );

        Ok(replayed == cached)
    }

    async fn read_balance_tx(
        &self,
        txn: &DatabaseTransaction,
        user_id: i64,
        currency: CurrencyType,
    ) -> AppResult<i64> {
        let user = users::Entity::find_by_id(user_id)
            .one(txn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        Ok(Self::balance_of(&user, currency))
    }

    async fn append_entry<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: i64,
        currency: CurrencyType,
        delta: i64,
        balance_after: i64,
        reason: &str,
    ) -> AppResult<ledger::Model> {
        let entry = ledger::ActiveModel {
            user_id: Set(user_id),
            currency: Set(currency),
            delta: Set(delta),
            balance_after: Set(balance_after),
            reason: Set(reason.to_string()),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(conn)
        .await?;
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, TransactionTrait, Value};
    use std::collections::BTreeMap;

    fn user_row(diamonds: i64) -> users::Model {
        users::Model {
            id: 1,
            username: "mika".to_string(),
            diamond_balance: diamonds,
            ticket_balance: 0,
            has_completed_ten_draw: false,
            created_at: None,
            updated_at: None,
        }
    }

    fn entry_row(delta: i64, balance_after: i64) -> ledger::Model {
        ledger::Model {
            id: 1,
            user_id: 1,
            currency: CurrencyType::Diamonds,
            delta,
            balance_after,
            reason: "gacha_pull".to_string(),
            created_at: Some(Utc::now()),
        }
    }

    #[tokio::test]
    async fn test_debit_rejects_non_positive_amount() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = LedgerService::new(db.clone());
        let txn = db.begin().await.unwrap();

        let err = service
            .debit(&txn, 1, CurrencyType::Diamonds, 0, "gacha_pull")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    /// 条件更新 0 行 + 复读余额不足 → InsufficientFunds（带余额与所需金额）
    #[tokio::test]
    async fn test_debit_reports_insufficient_funds_with_balance() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([vec![user_row(100)]])
            .into_connection();
        let service = LedgerService::new(db.clone());
        let txn = db.begin().await.unwrap();

        let err = service
            .debit(&txn, 1, CurrencyType::Diamonds, 3000, "gacha_pull")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::InsufficientFunds {
                balance: 100,
                required: 3000
            }
        ));
    }

    /// 条件更新 0 行但复读余额足够，只可能是并发窗口 → ConcurrencyConflict
    #[tokio::test]
    async fn test_debit_reports_conflict_when_balance_would_suffice() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([vec![user_row(5000)]])
            .into_connection();
        let service = LedgerService::new(db.clone());
        let txn = db.begin().await.unwrap();

        let err = service
            .debit(&txn, 1, CurrencyType::Diamonds, 3000, "gacha_pull")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConcurrencyConflict));
    }

    /// 扣费成功：流水 delta 为负且 balance_after 为扣后余额
    #[tokio::test]
    async fn test_debit_appends_entry_with_balance_after() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([vec![user_row(2700)]])
            .append_query_results([vec![entry_row(-300, 2700)]])
            .into_connection();
        let service = LedgerService::new(db.clone());
        let txn = db.begin().await.unwrap();

        let entry = service
            .debit(&txn, 1, CurrencyType::Diamonds, 300, "gacha_pull")
            .await
            .unwrap();
        assert_eq!(entry.delta, -300);
        assert_eq!(entry.balance_after, 2700);
    }

    /// 发放 + 重放对账：Σ delta 与缓存余额一致
    #[tokio::test]
    async fn test_credit_then_replay_matches_cached_balance() {
        let sum_row: BTreeMap<&str, Value> = [("total", Value::BigInt(Some(500)))]
            .into_iter()
            .collect();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([vec![user_row(500)]])
            .append_query_results([vec![entry_row(500, 500)]])
            .append_query_results([vec![sum_row]])
            .append_query_results([vec![user_row(500)]])
            .into_connection();
        let service = LedgerService::new(db.clone());

        let txn = db.begin().await.unwrap();
        let entry = service
            .credit(&txn, 1, CurrencyType::Diamonds, 500, "gacha_pull")
            .await
            .unwrap();
        txn.commit().await.unwrap();
        assert_eq!(entry.delta, 500);

        assert!(service
            .verify_balance(1, CurrencyType::Diamonds)
            .await
            .unwrap());
    }
}
