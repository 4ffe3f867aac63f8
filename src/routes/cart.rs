use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, CartView, SetQuantityRequest, StockCheck},
    error::AppResult,
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{session}", get(view_cart).post(add_to_cart).delete(clear_cart))
        .route("/{session}/validate", get(validate_cart))
        .route(
            "/{session}/items/{product_id}",
            patch(set_quantity).delete(remove_line),
        )
}

#[utoipa::path(
    get,
    path = "/api/cart/{session}",
    params(("session" = String, Path, description = "Session key")),
    responses(
        (status = 200, description = "Current cart for the session", body = ApiResponse<CartView>)
    ),
    tag = "Cart"
)]
pub async fn view_cart(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::view_cart(&state, &session).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cart/{session}",
    params(("session" = String, Path, description = "Session key")),
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Add product or increase quantity", body = ApiResponse<CartView>),
        (status = 400, description = "Unknown product or invalid quantity"),
        (status = 409, description = "Requested quantity exceeds stock"),
    ),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    Path(session): Path<String>,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::add_to_cart(&state, &session, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart/{session}",
    params(("session" = String, Path, description = "Session key")),
    responses(
        (status = 200, description = "Empty the cart", body = ApiResponse<CartView>)
    ),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::clear_cart(&state, &session).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/cart/{session}/validate",
    params(("session" = String, Path, description = "Session key")),
    responses(
        (status = 200, description = "Re-check stock for every cart line", body = ApiResponse<StockCheck>)
    ),
    tag = "Cart"
)]
pub async fn validate_cart(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> AppResult<Json<ApiResponse<StockCheck>>> {
    let resp = cart_service::check_cart(&state, &session).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/cart/{session}/items/{product_id}",
    params(
        ("session" = String, Path, description = "Session key"),
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    request_body = SetQuantityRequest,
    responses(
        (status = 200, description = "Overwrite a line's quantity; zero removes it", body = ApiResponse<CartView>),
        (status = 404, description = "Line not in cart"),
        (status = 409, description = "Requested quantity exceeds stock"),
    ),
    tag = "Cart"
)]
pub async fn set_quantity(
    State(state): State<AppState>,
    Path((session, product_id)): Path<(String, Uuid)>,
    Json(payload): Json<SetQuantityRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::set_quantity(&state, &session, product_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart/{session}/items/{product_id}",
    params(
        ("session" = String, Path, description = "Session key"),
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Remove a line; absent lines are a no-op", body = ApiResponse<CartView>)
    ),
    tag = "Cart"
)]
pub async fn remove_line(
    State(state): State<AppState>,
    Path((session, product_id)): Path<(String, Uuid)>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::remove_line(&state, &session, product_id).await?;
    Ok(Json(resp))
}
