use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Catalog values captured when a product enters the cart. Price and name
/// are snapshots; `stock` is the availability known at the last mutation
/// and may go stale relative to concurrent purchases.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductSnapshot {
    pub name: String,
    pub price: i64,
    pub image: Option<String>,
    pub stock: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub product_id: Uuid,
    pub name: String,
    pub price: i64,
    pub quantity: i32,
    pub image: Option<String>,
    pub stock: i32,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error("insufficient stock: {requested} requested, {available} available")]
    InsufficientStock { available: i32, requested: i32 },
    #[error("product not in cart")]
    UnknownLine,
}

/// One browsing session's cart. Never persisted; dropped with the session.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct Cart {
    lines: BTreeMap<Uuid, CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a line or raise the quantity of an existing one. Fails when
    /// the combined quantity would exceed the stock in `snapshot`, leaving
    /// the cart untouched.
    pub fn add(
        &mut self,
        product_id: Uuid,
        snapshot: ProductSnapshot,
        quantity: i32,
    ) -> Result<(), CartError> {
        if quantity <= 0 {
            return Err(CartError::InsufficientStock {
                available: snapshot.stock,
                requested: quantity,
            });
        }
        let current = self.lines.get(&product_id).map_or(0, |line| line.quantity);
        let requested = current + quantity;
        if requested > snapshot.stock {
            return Err(CartError::InsufficientStock {
                available: snapshot.stock,
                requested,
            });
        }
        self.lines
            .entry(product_id)
            .and_modify(|line| {
                line.quantity = requested;
                line.stock = snapshot.stock;
            })
            .or_insert(CartLine {
                product_id,
                name: snapshot.name,
                price: snapshot.price,
                quantity,
                image: snapshot.image,
                stock: snapshot.stock,
            });
        Ok(())
    }

    /// Overwrite a line's quantity. Zero or less removes the line; more
    /// than the stock known for the line fails.
    pub fn set_quantity(&mut self, product_id: Uuid, quantity: i32) -> Result<(), CartError> {
        if !self.lines.contains_key(&product_id) {
            return Err(CartError::UnknownLine);
        }
        if quantity <= 0 {
            self.lines.remove(&product_id);
            return Ok(());
        }
        let line = self.lines.get_mut(&product_id).ok_or(CartError::UnknownLine)?;
        if quantity > line.stock {
            return Err(CartError::InsufficientStock {
                available: line.stock,
                requested: quantity,
            });
        }
        line.quantity = quantity;
        Ok(())
    }

    /// Removing an absent line is a no-op.
    pub fn remove(&mut self, product_id: Uuid) {
        self.lines.remove(&product_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn total(&self) -> i64 {
        self.lines
            .values()
            .map(|line| line.price * i64::from(line.quantity))
            .sum()
    }

    pub fn count(&self) -> i32 {
        self.lines.values().map(|line| line.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.values()
    }

    pub fn get(&self, product_id: Uuid) -> Option<&CartLine> {
        self.lines.get(&product_id)
    }
}

/// Session-keyed cart storage held on `AppState`. Each session owns its
/// cart exclusively; the map is only shared to route a session key to its
/// cart, so a plain `RwLock` around short critical sections is enough.
#[derive(Clone, Default)]
pub struct CartStore {
    inner: Arc<RwLock<HashMap<String, Cart>>>,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self, session: &str) -> Cart {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(session)
            .cloned()
            .unwrap_or_default()
    }

    pub fn update<T>(&self, session: &str, apply: impl FnOnce(&mut Cart) -> T) -> T {
        let mut carts = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let cart = carts.entry(session.to_string()).or_default();
        apply(cart)
    }

    /// Drops the session's cart entirely (successful checkout, session end).
    pub fn clear(&self, session: &str) {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(session);
    }
}
