use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    cart::{CartLine, ProductSnapshot},
    dto::{
        analytics::{
            ActivityEntry, Dashboard, DashboardMetrics, PeriodComparison, PeriodMetric,
            SalesBucket, StatusBreakdown, StockAlerts, TopProduct,
        },
        cart::{AddToCartRequest, CartView, SetQuantityRequest, StockCheck},
        checkout::{CheckoutRequest, CheckoutResponse, UpdateCustomerRequest},
        orders::{OrderDetail, OrderLineDetail, OrderList, UpdateOrderStatusRequest},
        products::{
            AddImageRequest, CreateProductRequest, ProductDetail, ProductList,
            StockAdjustRequest, UpdateProductRequest,
        },
    },
    models::{Customer, Order, OrderStatus, Product, ProductCategory, ProductImage, User},
    response::{ApiResponse, Meta},
    routes::{admin, auth, cart, checkout, health, params, products as product_routes},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        product_routes::list_products,
        product_routes::get_product,
        cart::view_cart,
        cart::add_to_cart,
        cart::clear_cart,
        cart::validate_cart,
        cart::set_quantity,
        cart::remove_line,
        checkout::checkout,
        admin::list_orders,
        admin::get_order,
        admin::update_order_status,
        admin::mark_order_viewed,
        admin::get_customer,
        admin::update_customer,
        admin::create_product,
        admin::update_product,
        admin::delete_product,
        admin::adjust_stock,
        admin::add_image,
        admin::remove_image,
        admin::dashboard,
        admin::sales_evolution,
        admin::period_comparison,
        admin::top_products,
        admin::stock_alerts,
        admin::export_orders,
        admin::export_products
    ),
    components(
        schemas(
            User,
            Product,
            ProductCategory,
            ProductImage,
            Customer,
            Order,
            OrderStatus,
            CartLine,
            ProductSnapshot,
            AddToCartRequest,
            SetQuantityRequest,
            CartView,
            StockCheck,
            CheckoutRequest,
            CheckoutResponse,
            UpdateCustomerRequest,
            OrderDetail,
            OrderLineDetail,
            OrderList,
            UpdateOrderStatusRequest,
            CreateProductRequest,
            UpdateProductRequest,
            StockAdjustRequest,
            AddImageRequest,
            ProductDetail,
            ProductList,
            Dashboard,
            DashboardMetrics,
            StatusBreakdown,
            ActivityEntry,
            SalesBucket,
            PeriodMetric,
            PeriodComparison,
            TopProduct,
            StockAlerts,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CartView>,
            ApiResponse<CheckoutResponse>,
            ApiResponse<OrderList>,
            ApiResponse<OrderDetail>,
            ApiResponse<Dashboard>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Staff authentication"),
        (name = "Products", description = "Catalog browsing"),
        (name = "Cart", description = "Session cart"),
        (name = "Checkout", description = "Order pipeline"),
        (name = "Admin", description = "Back-office management"),
        (name = "Analytics", description = "Dashboard, reports and exports"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
