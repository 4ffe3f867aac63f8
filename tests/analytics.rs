use chrono::{DateTime, Duration, TimeZone, Utc};
use sensations_api::models::{Order, OrderStatus, Product, ProductCategory};
use sensations_api::services::analytics_service::{
    period_comparison_from, sales_evolution_from, stock_alerts_from, top_products_from,
};
use sensations_api::services::order_service::SaleLine;
use uuid::Uuid;

fn order_at(created_at: DateTime<Utc>, total: i64) -> Order {
    Order {
        id: Uuid::new_v4(),
        customer_id: Uuid::new_v4(),
        total,
        status: OrderStatus::InProgress,
        viewed: false,
        created_at,
    }
}

fn product_with_stock(name: &str, stock: i32) -> Product {
    Product {
        id: Uuid::new_v4(),
        name: name.into(),
        category: ProductCategory::Unisex,
        description: None,
        price: 10_000,
        stock,
        created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
    }
}

#[test]
fn sales_evolution_zero_orders_gives_contiguous_zero_buckets() {
    let now = Utc.with_ymd_and_hms(2025, 6, 15, 14, 30, 0).unwrap();
    let buckets = sales_evolution_from(&[], 7, now);

    assert_eq!(buckets.len(), 7);
    assert_eq!(buckets[6].date, now.date_naive());
    for window in buckets.windows(2) {
        assert_eq!(window[1].date - window[0].date, Duration::days(1));
    }
    assert!(buckets.iter().all(|b| b.orders == 0 && b.revenue == 0));
}

#[test]
fn sales_evolution_accumulates_per_day() {
    let now = Utc.with_ymd_and_hms(2025, 6, 15, 14, 30, 0).unwrap();
    let orders = vec![
        order_at(now - Duration::days(1), 5000),
        order_at(now - Duration::days(1) + Duration::hours(2), 3000),
        order_at(now, 1000),
        // Outside the 7-day window, must be ignored.
        order_at(now - Duration::days(10), 99_999),
    ];

    let buckets = sales_evolution_from(&orders, 7, now);
    assert_eq!(buckets.len(), 7);

    let yesterday = &buckets[5];
    assert_eq!(yesterday.orders, 2);
    assert_eq!(yesterday.revenue, 8000);

    let today = &buckets[6];
    assert_eq!(today.orders, 1);
    assert_eq!(today.revenue, 1000);

    let total_revenue: i64 = buckets.iter().map(|b| b.revenue).sum();
    assert_eq!(total_revenue, 9000);
}

#[test]
fn period_comparison_zero_previous_is_plus_hundred() {
    let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
    let orders = vec![
        order_at(now - Duration::days(2), 4000),
        order_at(now - Duration::days(3), 2000),
    ];

    let comparison = period_comparison_from(&orders, 7, now);
    assert_eq!(comparison.revenue.current, 6000.0);
    assert_eq!(comparison.revenue.previous, 0.0);
    assert_eq!(comparison.revenue.delta, 100.0);
    assert_eq!(comparison.orders.delta, 100.0);
    assert_eq!(comparison.average_cart.delta, 100.0);
}

#[test]
fn period_comparison_both_empty_is_zero() {
    let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
    let comparison = period_comparison_from(&[], 7, now);
    assert_eq!(comparison.revenue.delta, 0.0);
    assert_eq!(comparison.orders.delta, 0.0);
    assert_eq!(comparison.average_cart.delta, 0.0);
}

#[test]
fn period_comparison_splits_windows() {
    let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
    let orders = vec![
        // Current week: 2 orders, 6000.
        order_at(now - Duration::days(1), 4000),
        order_at(now - Duration::days(2), 2000),
        // Previous week: 1 order, 3000.
        order_at(now - Duration::days(9), 3000),
    ];

    let comparison = period_comparison_from(&orders, 7, now);
    assert_eq!(comparison.revenue.current, 6000.0);
    assert_eq!(comparison.revenue.previous, 3000.0);
    assert_eq!(comparison.revenue.delta, 100.0);
    assert_eq!(comparison.orders.current, 2.0);
    assert_eq!(comparison.orders.previous, 1.0);
    // Average cart dropped from 3000 to 3000: no change.
    assert_eq!(comparison.average_cart.delta, 0.0);
}

#[test]
fn top_products_ranks_by_quantity() {
    let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
    let p1 = Uuid::new_v4();
    let p2 = Uuid::new_v4();
    let p3 = Uuid::new_v4();
    let order = Uuid::new_v4();

    let line = |product_id: Uuid, name: &str, quantity: i32| SaleLine {
        order_id: order,
        product_id,
        product_name: name.into(),
        quantity,
        order_created_at: now,
    };

    let lines = vec![
        line(p1, "Nuit d'Ambre", 2),
        line(p2, "Fleur de Saison", 5),
        line(p3, "Essence de Minuit", 1),
        line(p1, "Nuit d'Ambre", 1),
    ];

    let ranking = top_products_from(&lines, 2);
    assert_eq!(ranking.len(), 2);
    assert_eq!(ranking[0].product_id, p2);
    assert_eq!(ranking[0].total_quantity, 5);
    assert_eq!(ranking[1].product_id, p1);
    assert_eq!(ranking[1].total_quantity, 3);
}

#[test]
fn top_products_breaks_ties_by_first_encountered() {
    let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();
    let order = Uuid::new_v4();

    let lines = vec![
        SaleLine {
            order_id: order,
            product_id: first,
            product_name: "First".into(),
            quantity: 3,
            order_created_at: now,
        },
        SaleLine {
            order_id: order,
            product_id: second,
            product_name: "Second".into(),
            quantity: 3,
            order_created_at: now,
        },
    ];

    let ranking = top_products_from(&lines, 10);
    assert_eq!(ranking[0].product_id, first);
    assert_eq!(ranking[1].product_id, second);
}

#[test]
fn stock_alerts_sets_are_disjoint() {
    let products = vec![
        product_with_stock("Gone", 0),
        product_with_stock("Low", 3),
        product_with_stock("Edge", 5),
        product_with_stock("Fine", 12),
    ];

    let alerts = stock_alerts_from(products, 5);

    assert_eq!(alerts.out_of_stock.len(), 1);
    assert_eq!(alerts.out_of_stock[0].name, "Gone");
    assert_eq!(alerts.low_stock.len(), 2);
    assert!(alerts.low_stock.iter().all(|p| p.stock > 0 && p.stock <= 5));
    assert!(
        alerts
            .out_of_stock
            .iter()
            .all(|p| alerts.low_stock.iter().all(|q| q.id != p.id))
    );
}
