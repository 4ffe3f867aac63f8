use std::collections::BTreeMap;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    cart::{Cart, CartError, ProductSnapshot},
    dto::cart::{AddToCartRequest, CartView, SetQuantityRequest, StockCheck},
    entity::product_images::{Column as ImageCol, Entity as ProductImages},
    entity::products::Entity as Products,
    error::{AppError, AppResult},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn view_cart(state: &AppState, session: &str) -> AppResult<ApiResponse<CartView>> {
    let cart = state.carts.snapshot(session);
    Ok(ApiResponse::success("OK", cart_view(&cart), Some(Meta::empty())))
}

/// Looks the product up, captures a snapshot of name/price/stock, then
/// inserts or grows the line. The stock bound uses the catalog value read
/// here, not whatever the cart remembered from an earlier visit.
pub async fn add_to_cart(
    state: &AppState,
    session: &str,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartView>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let product = Products::find_by_id(payload.product_id)
        .one(&state.orm)
        .await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::BadRequest("product not found".to_string())),
    };

    let image = ProductImages::find()
        .filter(ImageCol::ProductId.eq(product.id))
        .order_by_asc(ImageCol::CreatedAt)
        .one(&state.orm)
        .await?
        .map(|image| image.url);

    let snapshot = ProductSnapshot {
        name: product.name,
        price: product.price,
        image,
        stock: product.stock,
    };

    let result = state
        .carts
        .update(session, |cart| {
            cart.add(payload.product_id, snapshot, payload.quantity)?;
            Ok::<CartView, CartError>(cart_view(cart))
        });

    match result {
        Ok(view) => Ok(ApiResponse::success("Added to cart", view, Some(Meta::empty()))),
        Err(err) => Err(cart_error(payload.product_id, err)),
    }
}

pub async fn set_quantity(
    state: &AppState,
    session: &str,
    product_id: Uuid,
    payload: SetQuantityRequest,
) -> AppResult<ApiResponse<CartView>> {
    let result = state.carts.update(session, |cart| {
        cart.set_quantity(product_id, payload.quantity)?;
        Ok::<CartView, CartError>(cart_view(cart))
    });

    match result {
        Ok(view) => Ok(ApiResponse::success("Cart updated", view, Some(Meta::empty()))),
        Err(err) => Err(cart_error(product_id, err)),
    }
}

/// Removing a line that is not there is deliberately a success.
pub async fn remove_line(
    state: &AppState,
    session: &str,
    product_id: Uuid,
) -> AppResult<ApiResponse<CartView>> {
    let view = state.carts.update(session, |cart| {
        cart.remove(product_id);
        cart_view(cart)
    });
    Ok(ApiResponse::success(
        "Removed from cart",
        view,
        Some(Meta::empty()),
    ))
}

pub async fn clear_cart(state: &AppState, session: &str) -> AppResult<ApiResponse<CartView>> {
    state.carts.clear(session);
    Ok(ApiResponse::success(
        "Cart cleared",
        cart_view(&Cart::new()),
        Some(Meta::empty()),
    ))
}

/// Re-reads every referenced product so the answer reflects purchases made
/// by other sessions since the lines were added. Advisory only; checkout
/// re-checks under row locks.
pub async fn validate_cart_stock(state: &AppState, cart: &Cart) -> AppResult<StockCheck> {
    let mut availability = BTreeMap::new();
    for line in cart.lines() {
        let product = Products::find_by_id(line.product_id).one(&state.orm).await?;
        let available = match product {
            Some(p) => p.stock >= line.quantity,
            None => false,
        };
        availability.insert(line.product_id, available);
    }
    let all_available = availability.values().all(|ok| *ok);
    Ok(StockCheck {
        availability,
        all_available,
    })
}

pub async fn check_cart(state: &AppState, session: &str) -> AppResult<ApiResponse<StockCheck>> {
    let cart = state.carts.snapshot(session);
    let check = validate_cart_stock(state, &cart).await?;
    Ok(ApiResponse::success("OK", check, Some(Meta::empty())))
}

fn cart_view(cart: &Cart) -> CartView {
    CartView {
        lines: cart.lines().cloned().collect(),
        total: cart.total(),
        count: cart.count(),
    }
}

fn cart_error(product_id: Uuid, err: CartError) -> AppError {
    match err {
        CartError::InsufficientStock { .. } => AppError::StockConflict(vec![product_id]),
        CartError::UnknownLine => AppError::NotFound,
    }
}
