use crate::models::*;
use crate::services::LedgerService;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

fn get_user_id_from_request(req: &HttpRequest) -> Option<i64> {
    req.extensions().get::<i64>().copied()
}

#[utoipa::path(
    get,
    path = "/wallet/balance",
    tag = "wallet",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取双货币余额成功", body = BalanceResponse),
        (status = 401, description = "未授权")
    )
)]
/// 当前钻石 / 抽奖券余额（余额只在抽卡事务内变动，与流水恒等）
pub async fn get_balance(
    service: web::Data<LedgerService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);
    match service.get_balances(user_id).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/wallet/ledger",
    tag = "wallet",
    params(
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("per_page" = Option<u32>, Query, description = "每页数量 (默认20)"),
        ("currency" = Option<String>, Query, description = "可选: DIAMONDS 或 TICKETS")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取流水成功", body = LedgerEntryPage),
        (status = 401, description = "未授权")
    )
)]
/// 分页获取货币流水（倒序，可按货币过滤）
pub async fn get_ledger(
    service: web::Data<LedgerService>,
    req: HttpRequest,
    query: web::Query<LedgerQuery>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);
    match service.list_entries(user_id, &query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn wallet_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/wallet")
            .route("/balance", web::get().to(get_balance))
            .route("/ledger", web::get().to(get_ledger)),
    );
}
