use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::RegisterRequest,
        cart::{AddToCartRequest, CartLine, CartView},
        categories::{CategoryList, CreateCategoryRequest},
        orders::{CheckoutRequest, OrderList, OrderWithItems, UpdateOrderStatusRequest},
        payments::PaymentWebhook,
        products::{ProductList, SaveProductRequest},
        reviews::{CreateReviewRequest, ReviewList, UpdateReviewRequest},
    },
    models::{
        CartItem, Category, Order, OrderItem, OrderStatus, Payment, PaymentMethod, PaymentStatus,
        Product, Review, Role, User,
    },
    response::{ApiResponse, Meta},
    routes::{
        auth, cart, categories, health, orders, params, payments, products, reviews, users,
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        users::get_user,
        categories::list_categories,
        categories::create_category,
        categories::get_category,
        categories::list_category_products,
        products::list_products,
        products::list_all_products,
        products::search_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::list_reviews,
        products::create_review,
        reviews::update_review,
        reviews::delete_review,
        cart::get_cart,
        cart::add_to_cart,
        cart::remove_from_cart,
        cart::clear_cart,
        orders::checkout,
        orders::list_orders,
        orders::get_order,
        orders::update_order_status,
        orders::delete_order,
        orders::get_order_payment,
        payments::payment_webhook
    ),
    components(
        schemas(
            User,
            Role,
            Category,
            Product,
            CartItem,
            Order,
            OrderItem,
            OrderStatus,
            PaymentMethod,
            Payment,
            PaymentStatus,
            Review,
            RegisterRequest,
            CreateCategoryRequest,
            CategoryList,
            SaveProductRequest,
            ProductList,
            CreateReviewRequest,
            UpdateReviewRequest,
            ReviewList,
            AddToCartRequest,
            CartView,
            CartLine,
            CheckoutRequest,
            UpdateOrderStatusRequest,
            OrderWithItems,
            OrderList,
            PaymentWebhook,
            params::Pagination,
            params::SortOrder,
            params::ProductSortBy,
            Meta,
            ApiResponse<User>,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CartView>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<Payment>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration endpoint"),
        (name = "Users", description = "User endpoints"),
        (name = "Categories", description = "Category endpoints"),
        (name = "Products", description = "Product endpoints"),
        (name = "Reviews", description = "Review endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Payments", description = "Payment endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
