use crate::models::*;
use crate::services::{AuraDrawService, BannerService};
use actix_web::{HttpMessage, HttpRequest, HttpResponse, ResponseError, Result, web};
use chrono::Utc;
use serde_json::json;

/// 从请求扩展中获取用户ID（中间件在鉴权后注入）
fn get_user_id_from_request(req: &HttpRequest) -> Option<i64> {
    req.extensions().get::<i64>().copied()
}

#[utoipa::path(
    get,
    path = "/aura-zone/banners",
    tag = "aura_zone",
    responses(
        (status = 200, description = "获取当前投放中的卡池列表成功", body = [BannerResponse])
    )
)]
/// 当前投放窗口内的卡池（公开接口，按 sort_order 升序）
pub async fn get_banners(service: web::Data<BannerService>) -> Result<HttpResponse> {
    match service.list_active(Utc::now()).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/aura-zone/banners/{banner_id}/pool",
    tag = "aura_zone",
    params(
        ("banner_id" = i64, Path, description = "卡池ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取卡池奖品与概率公示成功", body = BannerPoolResponse),
        (status = 400, description = "卡池不存在或不在投放窗口"),
        (status = 401, description = "未授权")
    )
)]
/// 卡池详情: 奖品池按稀有度分档展示，附带档位概率 (bp) 与限量库存
pub async fn get_pool(
    service: web::Data<BannerService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let banner_id = path.into_inner();
    match service.get_pool(banner_id, Utc::now()).await {
        Ok(pool) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": pool }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/aura-zone/draw",
    tag = "aura_zone",
    request_body = DrawRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "十连成功", body = DrawResponse),
        (status = 400, description = "卡池不可用 / 货币不匹配 / 余额不足"),
        (status = 401, description = "未授权"),
        (status = 409, description = "并发冲突，可整体重试"),
        (status = 500, description = "卡池配置错误")
    )
)]
/// 进行一次十连:
/// 1. 校验卡池在投放窗口内且支付货币匹配
/// 2. 事务内条件扣费（余额不足零副作用拒绝）
/// 3. 10 次顺序抽取，保底计数批内前馈，限量奖品原子扣库存
/// 4. 全部成功才提交，任一步失败整体回滚
pub async fn draw(
    service: web::Data<AuraDrawService>,
    req: HttpRequest,
    body: web::Json<DrawRequest>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);
    let request = body.into_inner();
    match service
        .perform_draw(user_id, request.banner_id, request.payment_method)
        .await
    {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": result }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/aura-zone/status",
    tag = "aura_zone",
    params(
        ("banner_id" = i64, Query, description = "卡池ID（保底按卡池独立计数）")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取保底与里程碑状态成功", body = AuraStatusResponse),
        (status = 401, description = "未授权")
    )
)]
/// 当前保底计数、距保底抽数与首次十连里程碑
pub async fn get_status(
    service: web::Data<AuraDrawService>,
    req: HttpRequest,
    query: web::Query<AuraStatusQuery>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);
    match service.get_status(user_id, query.banner_id).await {
        Ok(status) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": status }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/aura-zone/records",
    tag = "aura_zone",
    params(
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("per_page" = Option<u32>, Query, description = "每页数量 (默认20)"),
        ("banner_id" = Option<i64>, Query, description = "可选: 只看某个卡池")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取抽卡记录成功", body = PullRecordPage),
        (status = 401, description = "未授权")
    )
)]
/// 分页获取用户抽卡记录（倒序）
pub async fn get_records(
    service: web::Data<AuraDrawService>,
    req: HttpRequest,
    query: web::Query<PullRecordQuery>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);
    match service.list_records(user_id, &query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn aura_zone_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/aura-zone")
            .route("/banners", web::get().to(get_banners))
            .route("/banners/{banner_id}/pool", web::get().to(get_pool))
            .route("/draw", web::post().to(draw))
            .route("/status", web::get().to(get_status))
            .route("/records", web::get().to(get_records)),
    );
}
