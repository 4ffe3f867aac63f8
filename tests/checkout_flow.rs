use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, Statement};
use uuid::Uuid;

use sensations_api::{
    cart::{CartStore, ProductSnapshot},
    db::{create_orm_conn, create_pool, run_migrations},
    dto::checkout::CheckoutRequest,
    entity::orders::{Column as OrderCol, Entity as Orders},
    entity::order_items::{Column as OrderItemCol, Entity as OrderItems},
    entity::products::{ActiveModel as ProductActive, Entity as Products},
    error::AppError,
    mailer::Mailer,
    services::checkout_service,
    state::AppState,
};

// Integration flow. Both scenarios share the database, so they run
// sequentially inside one test body.
#[tokio::test]
async fn checkout_flows() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    happy_path(&state).await?;
    stale_stock_aborts(&state).await?;
    Ok(())
}

// Two products land in a session cart, checkout creates the order, its
// lines and the stock decrements, and empties the cart.
async fn happy_path(state: &AppState) -> anyhow::Result<()> {
    let p1 = seed_product(&state, "Nuit d'Ambre", 1000, 10).await?;
    let p2 = seed_product(&state, "Fleur de Saison", 2000, 4).await?;

    let session = "session-a";
    state.carts.update(session, |cart| {
        cart.add(p1, snapshot("Nuit d'Ambre", 1000, 10), 2)?;
        cart.add(p2, snapshot("Fleur de Saison", 2000, 4), 1)
    })?;

    let resp = checkout_service::checkout(&state, session, contact_form()).await?;
    let checkout = resp.data.expect("checkout data");
    assert_eq!(checkout.total, 4000);

    let order = Orders::find_by_id(checkout.order_id)
        .one(&state.orm)
        .await?
        .expect("order row");
    assert_eq!(order.total, 4000);
    assert_eq!(order.status, "in_progress");
    assert!(!order.viewed);

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?;
    assert_eq!(items.len(), 2);

    let stock_p1 = Products::find_by_id(p1).one(&state.orm).await?.unwrap().stock;
    let stock_p2 = Products::find_by_id(p2).one(&state.orm).await?.unwrap().stock;
    assert_eq!(stock_p1, 8);
    assert_eq!(stock_p2, 3);

    assert!(state.carts.snapshot(session).is_empty());

    Ok(())
}

// A cart built against stale stock must abort cleanly: no order, no lines,
// cart untouched.
async fn stale_stock_aborts(state: &AppState) -> anyhow::Result<()> {
    let p1 = seed_product(&state, "Essence de Minuit", 3000, 5).await?;

    let session = "session-b";
    state.carts.update(session, |cart| {
        cart.add(p1, snapshot("Essence de Minuit", 3000, 5), 5)
    })?;

    // Another sale happened meanwhile; only 3 left.
    let existing = Products::find_by_id(p1).one(&state.orm).await?.unwrap();
    let mut active: ProductActive = existing.into();
    active.stock = Set(3);
    active.update(&state.orm).await?;

    let result = checkout_service::checkout(&state, session, contact_form()).await;
    match result {
        Err(AppError::StockConflict(ids)) => assert_eq!(ids, vec![p1]),
        other => panic!("expected stock conflict, got {other:?}"),
    }

    let orders = Orders::find()
        .filter(OrderCol::Total.eq(15_000i64))
        .all(&state.orm)
        .await?;
    assert!(orders.is_empty());

    let cart = state.carts.snapshot(session);
    assert_eq!(cart.count(), 5);
    assert_eq!(cart.total(), 15_000);

    let stock = Products::find_by_id(p1).one(&state.orm).await?.unwrap().stock;
    assert_eq!(stock, 3);

    Ok(())
}

fn snapshot(name: &str, price: i64, stock: i32) -> ProductSnapshot {
    ProductSnapshot {
        name: name.into(),
        price,
        image: None,
        stock,
    }
}

fn contact_form() -> CheckoutRequest {
    CheckoutRequest {
        first_name: "Jean".into(),
        last_name: "Mbadinga".into(),
        email: "jean.mbadinga@example.com".into(),
        phone: "+33612345678".into(),
        address: "12 Rue des Fleurs, Libreville".into(),
    }
}

// Allow skipping when no DB is configured in the environment.
async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url).await?;
    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE order_items, orders, customers, product_images, audit_logs, products, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(Some(AppState {
        pool,
        orm,
        carts: CartStore::new(),
        mailer: Mailer::disabled(),
    }))
}

async fn seed_product(state: &AppState, name: &str, price: i64, stock: i32) -> anyhow::Result<Uuid> {
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.into()),
        category: Set("unisex".into()),
        description: Set(Some("A fragrance for testing".into())),
        price: Set(price),
        stock: Set(stock),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(product.id)
}
