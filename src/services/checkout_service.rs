use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit::log_audit,
    cart::Cart,
    dto::checkout::{CheckoutRequest, CheckoutResponse},
    entity::order_items::ActiveModel as OrderItemActive,
    entity::orders::ActiveModel as OrderActive,
    entity::products::{Column as ProductCol, Entity as Products},
    error::{AppError, AppResult},
    models::OrderStatus,
    response::{ApiResponse, Meta},
    services::{customer_service, order_service::order_from_entity},
    state::AppState,
};

/// The checkout sequence: validate the contact form, re-check stock, reuse
/// or create the customer, then write the order header, its lines and the
/// stock decrements in a single transaction. Mail goes out after commit and
/// is allowed to fail; the session cart is only dropped on success.
pub async fn checkout(
    state: &AppState,
    session: &str,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<CheckoutResponse>> {
    payload.validate().map_err(AppError::Validation)?;

    let cart = state.carts.snapshot(session);
    if cart.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let txn = state.orm.begin().await?;

    let unavailable = lock_and_check_stock(&txn, &cart).await?;
    if !unavailable.is_empty() {
        return Err(AppError::StockConflict(unavailable));
    }

    let customer = customer_service::resolve_or_create(
        &txn,
        &payload.first_name,
        &payload.last_name,
        &payload.email,
        &payload.phone,
        &payload.address,
    )
    .await?;

    // The total comes from the server-held cart, never from the request.
    let total = cart.total();
    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        customer_id: Set(customer.id),
        total: Set(total),
        status: Set(OrderStatus::InProgress.as_str().to_string()),
        viewed: Set(false),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    for line in cart.lines() {
        OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity),
            price: Set(line.price),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;

        // Conditional decrement: even with the rows locked above, never
        // let stock cross below zero.
        let result = Products::update_many()
            .col_expr(
                ProductCol::Stock,
                Expr::col(ProductCol::Stock).sub(line.quantity),
            )
            .filter(
                ProductCol::Id
                    .eq(line.product_id)
                    .and(ProductCol::Stock.gte(line.quantity)),
            )
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::StockConflict(vec![line.product_id]));
        }
    }

    txn.commit().await?;

    let order = order_from_entity(order);
    let lines: Vec<_> = cart.lines().cloned().collect();
    if !state
        .mailer
        .send_order_confirmation(&order, &customer, &lines)
        .await
    {
        tracing::warn!(order_id = %order.id, "order confirmation mail not sent");
    }
    if !state.mailer.send_admin_alert(&order, &customer, &lines).await {
        tracing::warn!(order_id = %order.id, "admin alert mail not sent");
    }

    if let Err(err) = log_audit(
        &state.pool,
        None,
        "checkout",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "customer_id": customer.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    state.carts.clear(session);

    Ok(ApiResponse::success(
        "Order placed",
        CheckoutResponse {
            order_id: order.id,
            total: order.total,
        },
        Some(Meta::empty()),
    ))
}

/// Locks every product referenced by the cart and returns the ids whose
/// live stock no longer covers the requested quantity. Dropping the
/// transaction releases the locks, so an abort leaves nothing behind.
async fn lock_and_check_stock(
    txn: &sea_orm::DatabaseTransaction,
    cart: &Cart,
) -> AppResult<Vec<Uuid>> {
    let mut unavailable = Vec::new();
    for line in cart.lines() {
        let product = Products::find_by_id(line.product_id)
            .lock(LockType::Update)
            .one(txn)
            .await?;
        match product {
            Some(p) if p.stock >= line.quantity => {}
            _ => unavailable.push(line.product_id),
        }
    }
    Ok(unavailable)
}
