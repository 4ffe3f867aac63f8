use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::analytics::{Dashboard, PeriodComparison, SalesBucket, StockAlerts, TopProduct},
    dto::checkout::UpdateCustomerRequest,
    dto::orders::{OrderDetail, OrderList, UpdateOrderStatusRequest},
    dto::products::{
        AddImageRequest, CreateProductRequest, ProductDetail, StockAdjustRequest,
        UpdateProductRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Customer, Order, Product, ProductImage},
    response::ApiResponse,
    routes::params::{OrderListQuery, ThresholdQuery, TopProductsQuery, WindowQuery},
    services::{analytics_service, customer_service, order_service, product_service},
    state::AppState,
};

const DEFAULT_WINDOW_DAYS: i64 = 30;
const DEFAULT_TOP_LIMIT: usize = 10;
const DEFAULT_STOCK_THRESHOLD: i32 = 5;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/status", patch(update_order_status))
        .route("/orders/{id}/viewed", patch(mark_order_viewed))
        .route("/customers/{id}", get(get_customer).patch(update_customer))
        .route("/products", post(create_product))
        .route("/products/{id}", axum::routing::put(update_product).delete(delete_product))
        .route("/products/{id}/stock", patch(adjust_stock))
        .route("/products/{id}/images", post(add_image))
        .route("/images/{image_id}", axum::routing::delete(remove_image))
        .route("/dashboard", get(dashboard))
        .route("/analytics/sales", get(sales_evolution))
        .route("/analytics/comparison", get(period_comparison))
        .route("/analytics/top-products", get(top_products))
        .route("/analytics/stock-alerts", get(stock_alerts))
        .route("/exports/orders", get(export_orders))
        .route("/exports/products", get(export_products))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter: in_progress, delivered, cancelled"),
        ("unviewed" = Option<bool>, Query, description = "Only orders not yet opened"),
        ("days" = Option<i64>, Query, description = "Trailing window in days"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "List orders with customer and lines", body = ApiResponse<OrderList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with customer and lines", body = ApiResponse<OrderDetail>),
        (status = 404, description = "Not Found"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let resp = order_service::get_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Move an in-progress order to delivered or cancelled", body = ApiResponse<Order>),
        (status = 400, description = "Transition not allowed"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::update_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/orders/{id}/viewed",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Mark an order as seen by staff", body = ApiResponse<Order>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn mark_order_viewed(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::mark_viewed(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer record", body = ApiResponse<Customer>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_customer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let resp = customer_service::get_customer(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer ID")),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Update customer contact fields", body = ApiResponse<Customer>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Validation failed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_customer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCustomerRequest>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let resp = customer_service::update_customer(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/products",
    request_body = CreateProductRequest,
    responses(
        (status = 200, description = "Create product with images", body = ApiResponse<ProductDetail>),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Validation failed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<Json<ApiResponse<ProductDetail>>> {
    let resp = product_service::create_product(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Update product fields", body = ApiResponse<Product>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::update_product(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Delete product and its images", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = product_service::delete_product(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/products/{id}/stock",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = StockAdjustRequest,
    responses(
        (status = 200, description = "Adjust stock by delta; never below zero", body = ApiResponse<Product>),
        (status = 400, description = "Invalid adjustment"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn adjust_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<StockAdjustRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::adjust_stock(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/products/{id}/images",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = AddImageRequest,
    responses(
        (status = 200, description = "Append an image to the product gallery", body = ApiResponse<ProductImage>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn add_image(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddImageRequest>,
) -> AppResult<Json<ApiResponse<ProductImage>>> {
    let resp = product_service::add_image(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/images/{image_id}",
    params(("image_id" = Uuid, Path, description = "Image ID")),
    responses(
        (status = 200, description = "Remove an image", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn remove_image(
    State(state): State<AppState>,
    user: AuthUser,
    Path(image_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = product_service::remove_image(&state, &user, image_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    responses(
        (status = 200, description = "Headline metrics, status breakdown, recent activity", body = ApiResponse<Dashboard>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Dashboard>>> {
    let resp = analytics_service::dashboard(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/analytics/sales",
    params(("days" = Option<i64>, Query, description = "Window in days, default 30")),
    responses(
        (status = 200, description = "Daily order count and revenue buckets", body = ApiResponse<Vec<SalesBucket>>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
pub async fn sales_evolution(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<WindowQuery>,
) -> AppResult<Json<ApiResponse<Vec<SalesBucket>>>> {
    let days = query.days.unwrap_or(DEFAULT_WINDOW_DAYS);
    let resp = analytics_service::sales_evolution(&state, &user, days).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/analytics/comparison",
    params(("days" = Option<i64>, Query, description = "Window in days, default 30")),
    responses(
        (status = 200, description = "Trailing window vs the one before it", body = ApiResponse<PeriodComparison>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
pub async fn period_comparison(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<WindowQuery>,
) -> AppResult<Json<ApiResponse<PeriodComparison>>> {
    let days = query.days.unwrap_or(DEFAULT_WINDOW_DAYS);
    let resp = analytics_service::period_comparison(&state, &user, days).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/analytics/top-products",
    params(
        ("limit" = Option<usize>, Query, description = "How many products, default 10"),
        ("days" = Option<i64>, Query, description = "Window in days; omit for all time")
    ),
    responses(
        (status = 200, description = "Best sellers by quantity", body = ApiResponse<Vec<TopProduct>>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
pub async fn top_products(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<TopProductsQuery>,
) -> AppResult<Json<ApiResponse<Vec<TopProduct>>>> {
    let limit = query.limit.unwrap_or(DEFAULT_TOP_LIMIT);
    let resp = analytics_service::top_products(&state, &user, limit, query.days).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/analytics/stock-alerts",
    params(("threshold" = Option<i32>, Query, description = "Low stock threshold, default 5")),
    responses(
        (status = 200, description = "Out-of-stock and low-stock products", body = ApiResponse<StockAlerts>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
pub async fn stock_alerts(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ThresholdQuery>,
) -> AppResult<Json<ApiResponse<StockAlerts>>> {
    let threshold = query.threshold.unwrap_or(DEFAULT_STOCK_THRESHOLD);
    let resp = analytics_service::stock_alerts(&state, &user, threshold).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/exports/orders",
    params(("days" = Option<i64>, Query, description = "Window in days, default 30")),
    responses(
        (status = 200, description = "Orders as CSV (UTF-8 with BOM)", content_type = "text/csv"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
pub async fn export_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<WindowQuery>,
) -> AppResult<impl IntoResponse> {
    let days = query.days.unwrap_or(DEFAULT_WINDOW_DAYS);
    let bytes = analytics_service::export_orders(&state, &user, days).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"orders.csv\"",
            ),
        ],
        bytes,
    ))
}

#[utoipa::path(
    get,
    path = "/api/admin/exports/products",
    responses(
        (status = 200, description = "Products as CSV (UTF-8 with BOM)", content_type = "text/csv"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
pub async fn export_products(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let bytes = analytics_service::export_products(&state, &user).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"products.csv\"",
            ),
        ],
        bytes,
    ))
}
