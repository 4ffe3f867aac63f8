use chrono::{TimeZone, Utc};
use sensations_api::dto::orders::{OrderDetail, OrderLineDetail};
use sensations_api::export::{orders_to_csv, products_to_csv};
use sensations_api::models::{Customer, Order, OrderStatus, Product, ProductCategory};
use uuid::Uuid;

fn sample_detail() -> OrderDetail {
    let created_at = Utc.with_ymd_and_hms(2025, 6, 15, 9, 30, 0).unwrap();
    OrderDetail {
        order: Order {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            total: 47_000,
            status: OrderStatus::InProgress,
            viewed: false,
            created_at,
        },
        customer: Customer {
            id: Uuid::new_v4(),
            first_name: "Jean".into(),
            last_name: "Mbadinga".into(),
            email: "jean@example.com".into(),
            phone: "+33612345678".into(),
            address: "12 Rue des Fleurs, Libreville".into(),
            created_at,
        },
        items: vec![
            OrderLineDetail {
                product_id: Uuid::new_v4(),
                product_name: "Nuit d'Ambre".into(),
                quantity: 1,
                price: 25_000,
            },
            OrderLineDetail {
                product_id: Uuid::new_v4(),
                product_name: "Fleur de Saison".into(),
                quantity: 1,
                price: 22_000,
            },
        ],
    }
}

#[test]
fn orders_csv_starts_with_bom_and_carries_all_columns() {
    let bytes = orders_to_csv(&[sample_detail()]).unwrap();
    assert_eq!(&bytes[..3], b"\xef\xbb\xbf");

    let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Order ID,Date,Customer,Email,Phone,Address,Products,Total,Status,Viewed"
    );

    let row = lines.next().unwrap();
    assert!(row.contains("15/06/2025 09:30 (UTC)"));
    assert!(row.contains("Jean Mbadinga"));
    assert!(row.contains("Nuit d'Ambre x1 | Fleur de Saison x1"));
    assert!(row.contains("47000"));
    assert!(row.contains("in_progress"));
    assert!(row.contains("No"));
    assert!(lines.next().is_none());
}

#[test]
fn products_csv_flattens_the_catalog() {
    let product = Product {
        id: Uuid::new_v4(),
        name: "Essence de Minuit".into(),
        category: ProductCategory::Unisex,
        description: Some("Oud discret".into()),
        price: 30_000,
        stock: 5,
        created_at: Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap(),
    };

    let bytes = products_to_csv(&[product]).unwrap();
    assert_eq!(&bytes[..3], b"\xef\xbb\xbf");

    let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next().unwrap(),
        "ID,Name,Category,Price,Stock,Description,Created"
    );
    let row = lines.next().unwrap();
    assert!(row.contains("Essence de Minuit"));
    assert!(row.contains("unisex"));
    assert!(row.contains("30000"));
    assert!(row.contains("02/01/2025"));
}
