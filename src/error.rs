use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::response::{ApiResponse, Meta};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Validation failed")]
    Validation(ValidationErrors),

    #[error("Insufficient stock")]
    StockConflict(Vec<Uuid>),

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

#[derive(Serialize)]
struct ValidationData {
    errors: serde_json::Value,
}

#[derive(Serialize)]
struct StockConflictData {
    unavailable: Vec<Uuid>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::StockConflict(_) => StatusCode::CONFLICT,
            AppError::DbError(_) | AppError::OrmError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        match self {
            AppError::Validation(errors) => {
                let body = ApiResponse {
                    message: "Validation failed".to_string(),
                    data: Some(ValidationData {
                        errors: serde_json::to_value(&errors)
                            .unwrap_or_else(|_| serde_json::json!({})),
                    }),
                    meta: Some(Meta::empty()),
                };
                (status, axum::Json(body)).into_response()
            }
            AppError::StockConflict(product_ids) => {
                let body = ApiResponse {
                    message: "Insufficient stock".to_string(),
                    data: Some(StockConflictData {
                        unavailable: product_ids,
                    }),
                    meta: Some(Meta::empty()),
                };
                (status, axum::Json(body)).into_response()
            }
            other => {
                let body = ApiResponse {
                    message: other.to_string(),
                    data: Some(ErrorData {
                        error: other.to_string(),
                    }),
                    meta: Some(Meta::empty()),
                };
                (status, axum::Json(body)).into_response()
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
