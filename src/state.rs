use crate::cart::CartStore;
use crate::db::{DbPool, OrmConn};
use crate::mailer::Mailer;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub carts: CartStore,
    pub mailer: Mailer,
}
