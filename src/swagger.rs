use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{CurrencyType, Rarity};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::aura_zone::get_banners,
        handlers::aura_zone::get_pool,
        handlers::aura_zone::draw,
        handlers::aura_zone::get_status,
        handlers::aura_zone::get_records,
        handlers::wallet::get_balance,
        handlers::wallet::get_ledger,
    ),
    components(
        schemas(
            CurrencyType,
            Rarity,
            BannerResponse,
            PoolEntryResponse,
            PoolTierResponse,
            BannerPoolResponse,
            DrawRequest,
            DrawnPullResponse,
            DrawResponse,
            PullRecordQuery,
            PullRecordResponse,
            AuraStatusQuery,
            AuraStatusResponse,
            BalanceResponse,
            LedgerQuery,
            LedgerEntryResponse,
            PaginationInfo,
            PullRecordPage,
            LedgerEntryPage,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "aura_zone", description = "Aura Zone gacha API"),
        (name = "wallet", description = "Wallet balance and ledger API"),
    ),
    info(
        title = "AuraZone Backend API",
        version = "1.0.0",
        description = "AuraZone gacha backend REST API documentation",
        contact(
            name = "API Support",
            email = "support@aurazone.dev"
        )
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
