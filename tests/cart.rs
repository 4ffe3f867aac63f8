use sensations_api::cart::{Cart, CartError, ProductSnapshot};
use uuid::Uuid;

fn snapshot(price: i64, stock: i32) -> ProductSnapshot {
    ProductSnapshot {
        name: "Nuit d'Ambre".into(),
        price,
        image: None,
        stock,
    }
}

#[test]
fn total_and_count_track_every_mutation() {
    let mut cart = Cart::new();
    let p1 = Uuid::new_v4();
    let p2 = Uuid::new_v4();

    cart.add(p1, snapshot(1000, 10), 2).unwrap();
    assert_eq!(cart.total(), 2000);
    assert_eq!(cart.count(), 2);

    cart.add(p2, snapshot(2000, 5), 1).unwrap();
    assert_eq!(cart.total(), 4000);
    assert_eq!(cart.count(), 3);

    // Growing an existing line accumulates instead of replacing.
    cart.add(p1, snapshot(1000, 10), 3).unwrap();
    assert_eq!(cart.total(), 7000);
    assert_eq!(cart.count(), 6);

    cart.set_quantity(p1, 1).unwrap();
    assert_eq!(cart.total(), 3000);
    assert_eq!(cart.count(), 2);

    cart.remove(p2);
    assert_eq!(cart.total(), 1000);
    assert_eq!(cart.count(), 1);

    // Removing something absent changes nothing.
    cart.remove(Uuid::new_v4());
    assert_eq!(cart.total(), 1000);
    assert_eq!(cart.count(), 1);

    cart.clear();
    assert_eq!(cart.total(), 0);
    assert_eq!(cart.count(), 0);
    assert!(cart.is_empty());
}

#[test]
fn add_beyond_stock_fails_and_leaves_cart_unchanged() {
    let mut cart = Cart::new();
    let p1 = Uuid::new_v4();

    cart.add(p1, snapshot(1000, 5), 4).unwrap();

    let err = cart.add(p1, snapshot(1000, 5), 2).unwrap_err();
    assert_eq!(
        err,
        CartError::InsufficientStock {
            available: 5,
            requested: 6
        }
    );
    assert_eq!(cart.count(), 4);
    assert_eq!(cart.total(), 4000);

    // A fresh line over stock fails the same way.
    let p2 = Uuid::new_v4();
    let err = cart.add(p2, snapshot(500, 1), 2).unwrap_err();
    assert!(matches!(err, CartError::InsufficientStock { .. }));
    assert!(cart.get(p2).is_none());
}

#[test]
fn set_quantity_zero_removes_and_over_stock_fails() {
    let mut cart = Cart::new();
    let p1 = Uuid::new_v4();
    cart.add(p1, snapshot(1000, 3), 2).unwrap();

    let err = cart.set_quantity(p1, 4).unwrap_err();
    assert!(matches!(err, CartError::InsufficientStock { .. }));
    assert_eq!(cart.get(p1).map(|line| line.quantity), Some(2));

    cart.set_quantity(p1, 0).unwrap();
    assert!(cart.get(p1).is_none());
    assert!(cart.is_empty());

    // The line is gone now, so a further set is an unknown-line error.
    assert_eq!(cart.set_quantity(p1, 1), Err(CartError::UnknownLine));
}

#[test]
fn price_snapshot_is_kept_at_add_time() {
    let mut cart = Cart::new();
    let p1 = Uuid::new_v4();
    cart.add(p1, snapshot(1000, 10), 1).unwrap();

    // A later add carries a new catalog price; the line keeps its original.
    cart.add(p1, snapshot(9999, 10), 1).unwrap();
    let line = cart.get(p1).unwrap();
    assert_eq!(line.price, 1000);
    assert_eq!(line.quantity, 2);
    // The stock bound, however, follows the fresher snapshot.
    assert_eq!(line.stock, 10);
}
