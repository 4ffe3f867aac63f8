use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, FromQueryResult,
    JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{OrderDetail, OrderLineDetail, OrderList, UpdateOrderStatusRequest},
    entity::customers::{Column as CustomerCol, Entity as Customers},
    entity::order_items::{Column as OrderItemCol, Entity as OrderItems, Relation as OrderItemRel},
    entity::orders::{
        ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Order, OrderStatus},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::customer_service::customer_from_entity,
    state::AppState,
};

/// One order line flattened with its product name and the owning order's
/// creation time; the unit analytics aggregates over.
#[derive(Debug, Clone, FromQueryResult)]
pub struct SaleLine {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub order_created_at: DateTime<Utc>,
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }
    if query.unviewed.unwrap_or(false) {
        condition = condition.add(OrderCol::Viewed.eq(false));
    }
    if let Some(days) = query.days {
        let start = Utc::now() - Duration::days(days);
        condition = condition.add(OrderCol::CreatedAt.gte(start));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let items = assemble_details(&state.orm, orders).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Orders", OrderList { items }, Some(meta)))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderDetail>> {
    ensure_admin(user)?;
    let order = Orders::find_by_id(id).one(&state.orm).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let mut details = assemble_details(&state.orm, vec![order]).await?;
    let detail = details.pop().ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success("Order", detail, Some(Meta::empty())))
}

/// First staff open of an order; flips only false to true, never back.
pub async fn mark_viewed(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;

    let existing = Orders::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    if existing.viewed {
        return Ok(ApiResponse::success(
            "Order already viewed",
            order_from_entity(existing),
            Some(Meta::empty()),
        ));
    }

    let mut active: OrderActive = existing.into();
    active.viewed = Set(true);
    let order = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_viewed",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order marked as viewed",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

/// `in_progress` may move to `delivered` or `cancelled`; both end states
/// reject any further change.
pub async fn update_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;

    let existing = Orders::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let current =
        OrderStatus::parse(&existing.status).unwrap_or(OrderStatus::InProgress);
    if current.is_terminal() {
        return Err(AppError::BadRequest(format!(
            "Order is already {}",
            current.as_str()
        )));
    }
    if payload.status == OrderStatus::InProgress {
        return Err(AppError::BadRequest("Invalid status transition".into()));
    }

    let mut active: OrderActive = existing.into();
    active.status = Set(payload.status.as_str().to_string());
    let order = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": order.status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order updated",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

/// Orders created inside the trailing window, oldest first. `None` means
/// the whole history.
pub async fn fetch_orders_window<C: ConnectionTrait>(
    conn: &C,
    days: Option<i64>,
) -> AppResult<Vec<Order>> {
    let mut condition = Condition::all();
    if let Some(days) = days {
        let start = Utc::now() - Duration::days(days);
        condition = condition.add(OrderCol::CreatedAt.gte(start));
    }
    let orders = Orders::find()
        .filter(condition)
        .order_by_asc(OrderCol::CreatedAt)
        .all(conn)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();
    Ok(orders)
}

/// Line items joined with product names, ordered by the owning order's
/// creation time so ranking ties resolve by first-encountered order.
pub async fn fetch_sale_lines_window<C: ConnectionTrait>(
    conn: &C,
    days: Option<i64>,
) -> AppResult<Vec<SaleLine>> {
    let mut condition = Condition::all();
    if let Some(days) = days {
        let start = Utc::now() - Duration::days(days);
        condition = condition.add(OrderCol::CreatedAt.gte(start));
    }

    let lines = OrderItems::find()
        .select_only()
        .column_as(OrderItemCol::OrderId, "order_id")
        .column_as(OrderItemCol::ProductId, "product_id")
        .column_as(
            crate::entity::products::Column::Name,
            "product_name",
        )
        .column_as(OrderItemCol::Quantity, "quantity")
        .column_as(OrderCol::CreatedAt, "order_created_at")
        .join(JoinType::InnerJoin, OrderItemRel::Products.def())
        .join(JoinType::InnerJoin, OrderItemRel::Orders.def())
        .filter(condition)
        .order_by_asc(OrderCol::CreatedAt)
        .into_model::<SaleLine>()
        .all(conn)
        .await?;
    Ok(lines)
}

/// Full order rows (customer + lines) for a window, for lists and exports.
pub async fn fetch_details_window<C: ConnectionTrait>(
    conn: &C,
    days: Option<i64>,
) -> AppResult<Vec<OrderDetail>> {
    let mut condition = Condition::all();
    if let Some(days) = days {
        let start = Utc::now() - Duration::days(days);
        condition = condition.add(OrderCol::CreatedAt.gte(start));
    }
    let orders = Orders::find()
        .filter(condition)
        .order_by_asc(OrderCol::CreatedAt)
        .all(conn)
        .await?;
    assemble_details(conn, orders).await
}

async fn assemble_details<C: ConnectionTrait>(
    conn: &C,
    orders: Vec<OrderModel>,
) -> AppResult<Vec<OrderDetail>> {
    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let customer_ids: Vec<Uuid> = orders.iter().map(|o| o.customer_id).collect();

    let customers: HashMap<Uuid, _> = Customers::find()
        .filter(CustomerCol::Id.is_in(customer_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|c| (c.id, customer_from_entity(c)))
        .collect();

    #[derive(Debug, FromQueryResult)]
    struct LineRow {
        order_id: Uuid,
        product_id: Uuid,
        product_name: String,
        quantity: i32,
        price: i64,
    }

    let rows = OrderItems::find()
        .select_only()
        .column_as(OrderItemCol::OrderId, "order_id")
        .column_as(OrderItemCol::ProductId, "product_id")
        .column_as(
            crate::entity::products::Column::Name,
            "product_name",
        )
        .column_as(OrderItemCol::Quantity, "quantity")
        .column_as(OrderItemCol::Price, "price")
        .join(JoinType::InnerJoin, OrderItemRel::Products.def())
        .filter(OrderItemCol::OrderId.is_in(order_ids))
        .order_by_asc(OrderItemCol::CreatedAt)
        .into_model::<LineRow>()
        .all(conn)
        .await?;

    let mut lines_by_order: HashMap<Uuid, Vec<OrderLineDetail>> = HashMap::new();
    for row in rows {
        lines_by_order
            .entry(row.order_id)
            .or_default()
            .push(OrderLineDetail {
                product_id: row.product_id,
                product_name: row.product_name,
                quantity: row.quantity,
                price: row.price,
            });
    }

    let mut details = Vec::with_capacity(orders.len());
    for order in orders {
        let customer = customers
            .get(&order.customer_id)
            .cloned()
            .ok_or(AppError::NotFound)?;
        let items = lines_by_order.remove(&order.id).unwrap_or_default();
        details.push(OrderDetail {
            order: order_from_entity(order),
            customer,
            items,
        });
    }
    Ok(details)
}

pub fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        customer_id: model.customer_id,
        total: model.total,
        status: OrderStatus::parse(&model.status).unwrap_or(OrderStatus::InProgress),
        viewed: model.viewed,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
