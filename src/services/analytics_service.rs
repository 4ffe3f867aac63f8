use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::{
    dto::analytics::{
        ActivityEntry, Dashboard, DashboardMetrics, PeriodComparison, PeriodMetric, SalesBucket,
        StatusBreakdown, StockAlerts, TopProduct,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Order, OrderStatus, Product},
    response::{ApiResponse, Meta},
    services::{order_service, order_service::SaleLine, product_service},
    state::AppState,
};

const RECENT_ACTIVITY_LIMIT: usize = 10;

pub async fn dashboard(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Dashboard>> {
    ensure_admin(user)?;
    let orders = order_service::fetch_orders_window(&state.orm, None).await?;
    let details = order_service::fetch_details_window(&state.orm, None).await?;
    let products = product_service::fetch_all_products(&state.orm).await?;
    let now = Utc::now();

    let metrics = DashboardMetrics {
        total_orders: orders.len() as i64,
        new_orders: orders.iter().filter(|o| !o.viewed).count() as i64,
        orders_24h: orders
            .iter()
            .filter(|o| now - o.created_at <= Duration::hours(24))
            .count() as i64,
        total_products: products.len() as i64,
    };

    let status_breakdown = status_breakdown_from(&orders);

    let mut recent: Vec<ActivityEntry> = details
        .into_iter()
        .map(|detail| ActivityEntry {
            order_id: detail.order.id,
            customer_name: detail.customer.full_name(),
            total: detail.order.total,
            status: detail.order.status,
            viewed: detail.order.viewed,
            created_at: detail.order.created_at,
        })
        .collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent.truncate(RECENT_ACTIVITY_LIMIT);

    Ok(ApiResponse::success(
        "Dashboard",
        Dashboard {
            metrics,
            status_breakdown,
            recent_activity: recent,
        },
        Some(Meta::empty()),
    ))
}

pub async fn sales_evolution(
    state: &AppState,
    user: &AuthUser,
    days: i64,
) -> AppResult<ApiResponse<Vec<SalesBucket>>> {
    ensure_admin(user)?;
    let days = normalize_days(days)?;
    let orders = order_service::fetch_orders_window(&state.orm, Some(days)).await?;
    let buckets = sales_evolution_from(&orders, days, Utc::now());
    Ok(ApiResponse::success("Sales evolution", buckets, Some(Meta::empty())))
}

pub async fn period_comparison(
    state: &AppState,
    user: &AuthUser,
    days: i64,
) -> AppResult<ApiResponse<PeriodComparison>> {
    ensure_admin(user)?;
    let days = normalize_days(days)?;
    let orders = order_service::fetch_orders_window(&state.orm, Some(days * 2)).await?;
    let comparison = period_comparison_from(&orders, days, Utc::now());
    Ok(ApiResponse::success(
        "Period comparison",
        comparison,
        Some(Meta::empty()),
    ))
}

pub async fn top_products(
    state: &AppState,
    user: &AuthUser,
    limit: usize,
    days: Option<i64>,
) -> AppResult<ApiResponse<Vec<TopProduct>>> {
    ensure_admin(user)?;
    let lines = order_service::fetch_sale_lines_window(&state.orm, days).await?;
    let ranking = top_products_from(&lines, limit);
    Ok(ApiResponse::success("Top products", ranking, Some(Meta::empty())))
}

pub async fn stock_alerts(
    state: &AppState,
    user: &AuthUser,
    threshold: i32,
) -> AppResult<ApiResponse<StockAlerts>> {
    ensure_admin(user)?;
    let products = product_service::fetch_all_products(&state.orm).await?;
    let alerts = stock_alerts_from(products, threshold);
    Ok(ApiResponse::success("Stock alerts", alerts, Some(Meta::empty())))
}

pub async fn export_orders(state: &AppState, user: &AuthUser, days: i64) -> AppResult<Vec<u8>> {
    ensure_admin(user)?;
    let days = normalize_days(days)?;
    let details = order_service::fetch_details_window(&state.orm, Some(days)).await?;
    crate::export::orders_to_csv(&details).map_err(AppError::Internal)
}

pub async fn export_products(state: &AppState, user: &AuthUser) -> AppResult<Vec<u8>> {
    ensure_admin(user)?;
    let products = product_service::fetch_all_products(&state.orm).await?;
    crate::export::products_to_csv(&products).map_err(AppError::Internal)
}

fn normalize_days(days: i64) -> AppResult<i64> {
    if days <= 0 || days > 730 {
        return Err(AppError::BadRequest("days out of range".into()));
    }
    Ok(days)
}

/// Exactly `days` contiguous calendar-day buckets ending today (UTC), each
/// accumulating the count and revenue of orders created on that day. Days
/// with no orders stay zero-filled.
pub fn sales_evolution_from(orders: &[Order], days: i64, now: DateTime<Utc>) -> Vec<SalesBucket> {
    let today = now.date_naive();
    let mut buckets: Vec<SalesBucket> = (0..days)
        .map(|offset| {
            let date = today - Duration::days(days - 1 - offset);
            SalesBucket {
                date,
                label: date.format("%d/%m").to_string(),
                orders: 0,
                revenue: 0,
            }
        })
        .collect();

    let start = today - Duration::days(days - 1);
    for order in orders {
        let date = order.created_at.date_naive();
        if date < start || date > today {
            continue;
        }
        let index = (date - start).num_days() as usize;
        if let Some(bucket) = buckets.get_mut(index) {
            bucket.orders += 1;
            bucket.revenue += order.total;
        }
    }
    buckets
}

/// Trailing window against the equal-length window right before it.
/// A previous period of zero maps to +100% when the current one is
/// positive and 0% when both are empty.
pub fn period_comparison_from(
    orders: &[Order],
    days: i64,
    now: DateTime<Utc>,
) -> PeriodComparison {
    let current_start = now - Duration::days(days);
    let previous_start = current_start - Duration::days(days);

    let mut current_revenue = 0i64;
    let mut current_count = 0i64;
    let mut previous_revenue = 0i64;
    let mut previous_count = 0i64;

    for order in orders {
        if order.created_at >= current_start && order.created_at <= now {
            current_revenue += order.total;
            current_count += 1;
        } else if order.created_at >= previous_start && order.created_at < current_start {
            previous_revenue += order.total;
            previous_count += 1;
        }
    }

    let current_avg = average(current_revenue, current_count);
    let previous_avg = average(previous_revenue, previous_count);

    PeriodComparison {
        revenue: PeriodMetric {
            current: current_revenue as f64,
            previous: previous_revenue as f64,
            delta: pct_delta(current_revenue as f64, previous_revenue as f64),
        },
        orders: PeriodMetric {
            current: current_count as f64,
            previous: previous_count as f64,
            delta: pct_delta(current_count as f64, previous_count as f64),
        },
        average_cart: PeriodMetric {
            current: current_avg,
            previous: previous_avg,
            delta: pct_delta(current_avg, previous_avg),
        },
    }
}

/// Quantity sums per product, ranked descending. The input is ordered by
/// order creation, and the sort is stable, so ties keep the product whose
/// order came first.
pub fn top_products_from(lines: &[SaleLine], limit: usize) -> Vec<TopProduct> {
    let mut totals: Vec<TopProduct> = Vec::new();
    let mut index: std::collections::HashMap<Uuid, usize> = std::collections::HashMap::new();

    for line in lines {
        match index.get(&line.product_id) {
            Some(&at) => {
                if let Some(entry) = totals.get_mut(at) {
                    entry.total_quantity += i64::from(line.quantity);
                }
            }
            None => {
                index.insert(line.product_id, totals.len());
                totals.push(TopProduct {
                    product_id: line.product_id,
                    product_name: line.product_name.clone(),
                    total_quantity: i64::from(line.quantity),
                });
            }
        }
    }

    totals.sort_by(|a, b| b.total_quantity.cmp(&a.total_quantity));
    totals.truncate(limit);
    totals
}

/// Splits the catalog into empty and running-low shelves; a product sits
/// in at most one of the two.
pub fn stock_alerts_from(products: Vec<Product>, threshold: i32) -> StockAlerts {
    let mut out_of_stock = Vec::new();
    let mut low_stock = Vec::new();
    for product in products {
        if product.stock == 0 {
            out_of_stock.push(product);
        } else if product.stock <= threshold {
            low_stock.push(product);
        }
    }
    out_of_stock.sort_by(|a, b| a.name.cmp(&b.name));
    low_stock.sort_by_key(|p| p.stock);
    StockAlerts {
        out_of_stock,
        low_stock,
    }
}

pub fn status_breakdown_from(orders: &[Order]) -> StatusBreakdown {
    let mut breakdown = StatusBreakdown {
        in_progress: 0,
        delivered: 0,
        cancelled: 0,
    };
    for order in orders {
        match order.status {
            OrderStatus::InProgress => breakdown.in_progress += 1,
            OrderStatus::Delivered => breakdown.delivered += 1,
            OrderStatus::Cancelled => breakdown.cancelled += 1,
        }
    }
    breakdown
}

fn average(revenue: i64, count: i64) -> f64 {
    if count > 0 {
        revenue as f64 / count as f64
    } else {
        0.0
    }
}

fn pct_delta(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else if current > 0.0 {
        100.0
    } else {
        0.0
    }
}
