use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};

use crate::{
    dto::checkout::{CheckoutRequest, CheckoutResponse},
    error::AppResult,
    response::ApiResponse,
    services::checkout_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/{session}", post(checkout))
}

#[utoipa::path(
    post,
    path = "/api/checkout/{session}",
    params(("session" = String, Path, description = "Session key")),
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Order created from the session cart", body = ApiResponse<CheckoutResponse>),
        (status = 409, description = "A cart line no longer has enough stock"),
        (status = 422, description = "Contact field validation failed"),
    ),
    tag = "Checkout"
)]
pub async fn checkout(
    State(state): State<AppState>,
    Path(session): Path<String>,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<ApiResponse<CheckoutResponse>>> {
    let resp = checkout_service::checkout(&state, &session, payload).await?;
    Ok(Json(resp))
}
