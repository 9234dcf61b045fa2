use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Banner unavailable: {0}")]
    BannerUnavailable(String),

    #[error("Invalid payment method: {0}")]
    InvalidPaymentMethod(String),

    #[error("Insufficient funds: balance {balance}, required {required}")]
    InsufficientFunds { balance: i64, required: i64 },

    #[error("Misconfigured prize pool: {0}")]
    MisconfiguredPrizePool(String),

    #[error("Prize out of stock: {0}")]
    PrizeOutOfStock(String),

    #[error("Concurrency conflict, retry the draw")]
    ConcurrencyConflict,

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        use actix_web::http::StatusCode;

        let (status_code, error_code, message) = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                (StatusCode::UNAUTHORIZED, "AUTH_ERROR", msg.clone())
            }
            AppError::JwtError(err) => {
                log::warn!("JWT error: {err}");
                (
                    StatusCode::UNAUTHORIZED,
                    "AUTH_ERROR",
                    "Invalid or expired token".to_string(),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::BannerUnavailable(msg) => {
                log::warn!("Banner unavailable: {msg}");
                (StatusCode::BAD_REQUEST, "BANNER_UNAVAILABLE", msg.clone())
            }
            AppError::InvalidPaymentMethod(msg) => {
                log::warn!("Invalid payment method: {msg}");
                (
                    StatusCode::BAD_REQUEST,
                    "INVALID_PAYMENT_METHOD",
                    msg.clone(),
                )
            }
            AppError::InsufficientFunds { balance, required } => (
                StatusCode::BAD_REQUEST,
                "INSUFFICIENT_FUNDS",
                format!("Insufficient funds: balance {balance}, required {required}"),
            ),
            // 配置级故障：告警给运维，用户侧只给通用提示，不自动重试
            AppError::MisconfiguredPrizePool(msg) => {
                log::error!("Misconfigured prize pool: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PRIZE_POOL_MISCONFIGURED",
                    "Aura Zone is temporarily unavailable, please try again later".to_string(),
                )
            }
            AppError::PrizeOutOfStock(msg) => {
                log::error!("Prize out of stock: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PRIZE_OUT_OF_STOCK",
                    "Aura Zone is temporarily unavailable, please try again later".to_string(),
                )
            }
            // 瞬态冲突：无副作用，客户端可整体重试
            AppError::ConcurrencyConflict => (
                StatusCode::CONFLICT,
                "CONCURRENCY_CONFLICT",
                "Another draw is in progress, please retry".to_string(),
            ),
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database error".to_string(),
                )
            }
            AppError::InternalError(msg) => {
                log::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        HttpResponse::build(status_code).json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message
            }
        }))
    }
}
