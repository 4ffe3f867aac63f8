use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit::log_audit,
    dto::checkout::UpdateCustomerRequest,
    entity::customers::{ActiveModel as CustomerActive, Column as CustomerCol, Entity as Customers, Model as CustomerModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Customer,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn get_by_email<C: ConnectionTrait>(conn: &C, email: &str) -> AppResult<Option<Customer>> {
    let found = Customers::find()
        .filter(CustomerCol::Email.eq(email))
        .one(conn)
        .await?
        .map(customer_from_entity);
    Ok(found)
}

pub async fn get_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<Customer> {
    let found = Customers::find_by_id(id)
        .one(conn)
        .await?
        .map(customer_from_entity);
    found.ok_or(AppError::NotFound)
}

pub async fn create<C: ConnectionTrait>(
    conn: &C,
    first_name: &str,
    last_name: &str,
    email: &str,
    phone: &str,
    address: &str,
) -> AppResult<Customer> {
    let customer = CustomerActive {
        id: Set(Uuid::new_v4()),
        first_name: Set(first_name.trim().to_string()),
        last_name: Set(last_name.trim().to_string()),
        email: Set(email.trim().to_lowercase()),
        phone: Set(phone.trim().to_string()),
        address: Set(address.trim().to_string()),
        created_at: NotSet,
    }
    .insert(conn)
    .await?;
    Ok(customer_from_entity(customer))
}

/// Checkout reuses an existing record matched by email rather than
/// creating a duplicate; contact fields stay as first submitted.
pub async fn resolve_or_create<C: ConnectionTrait>(
    conn: &C,
    first_name: &str,
    last_name: &str,
    email: &str,
    phone: &str,
    address: &str,
) -> AppResult<Customer> {
    if let Some(existing) = get_by_email(conn, &email.trim().to_lowercase()).await? {
        return Ok(existing);
    }
    create(conn, first_name, last_name, email, phone, address).await
}

pub async fn get_customer(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Customer>> {
    ensure_admin(user)?;
    let customer = get_by_id(&state.orm, id).await?;
    Ok(ApiResponse::success("Customer", customer, Some(Meta::empty())))
}

pub async fn update_customer(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCustomerRequest,
) -> AppResult<ApiResponse<Customer>> {
    ensure_admin(user)?;
    payload.validate().map_err(AppError::Validation)?;

    let existing = Customers::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };

    let mut active: CustomerActive = existing.into();
    active.first_name = Set(payload.first_name.trim().to_string());
    active.last_name = Set(payload.last_name.trim().to_string());
    active.email = Set(payload.email.trim().to_lowercase());
    active.phone = Set(payload.phone.trim().to_string());
    active.address = Set(payload.address.trim().to_string());
    let customer = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "customer_update",
        Some("customers"),
        Some(serde_json::json!({ "customer_id": customer.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Customer updated",
        customer_from_entity(customer),
        Some(Meta::empty()),
    ))
}

pub fn customer_from_entity(model: CustomerModel) -> Customer {
    Customer {
        id: model.id,
        first_name: model.first_name,
        last_name: model.last_name,
        email: model.email,
        phone: model.phone,
        address: model.address,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
