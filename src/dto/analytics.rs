use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{OrderStatus, Product};

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardMetrics {
    pub total_orders: i64,
    pub new_orders: i64,
    pub orders_24h: i64,
    pub total_products: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusBreakdown {
    pub in_progress: i64,
    pub delivered: i64,
    pub cancelled: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ActivityEntry {
    pub order_id: Uuid,
    pub customer_name: String,
    pub total: i64,
    pub status: OrderStatus,
    pub viewed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Dashboard {
    pub metrics: DashboardMetrics,
    pub status_breakdown: StatusBreakdown,
    pub recent_activity: Vec<ActivityEntry>,
}

/// One calendar day of the sales series; days without orders stay at zero.
#[derive(Debug, PartialEq, Serialize, ToSchema)]
pub struct SalesBucket {
    pub date: NaiveDate,
    pub label: String,
    pub orders: i64,
    pub revenue: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PeriodMetric {
    pub current: f64,
    pub previous: f64,
    pub delta: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PeriodComparison {
    pub revenue: PeriodMetric,
    pub orders: PeriodMetric,
    pub average_cart: PeriodMetric,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopProduct {
    pub product_id: Uuid,
    pub product_name: String,
    pub total_quantity: i64,
}

/// The two sets are disjoint: a product with zero stock is only ever
/// out-of-stock, never low-stock.
#[derive(Debug, Serialize, ToSchema)]
pub struct StockAlerts {
    pub out_of_stock: Vec<Product>,
    pub low_stock: Vec<Product>,
}
