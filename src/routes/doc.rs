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
    domain::{
        cart::{CartLine, CartProduct, SlotSelection},
        ledger::{AllBalances, CustomerBalance, Reconciliation, StaffTodoSummary},
        orders::{OrderGroup, OrderLine, OrdererColor},
        time_slots::SlotUpdate,
    },
    dto::{
        auth::{LoginRequest, LoginResponse, MeResponse, RegisterRequest},
        cart::{AddToCartRequest, CartCheckoutRequest, CartView, SelectSlotRequest, UpdateCartItemRequest},
        containers::{ContainerBalance, ContainerRequest, ReconciliationResult, StaffTodoData},
        membership::{RefillTicketResult, UpdateMembershipRequest},
        open_hours::{SaveOpenHoursRequest, SaveOpenHoursResponse, TimeSlotCatalog},
        orders::{
            CancelOrderResponse, ContainerInfo, CreateOrderRequest, CreateOrderResponse,
            OrderGroupList, OrderList, UpdateOrderStatusRequest,
        },
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        reviews::{CreateReviewRequest, ReviewList},
        stock_requests::{CreateStockRequest, StockRequestList},
        todos::{CreateTodoRequest, TodoList},
    },
    models::{
        ContainerStorageItem, DateType, DeliverySlot, Membership, OrderItem, Product,
        RequestSource, Review, StaffStatusCheck, StockRequest, TimeSlot, TodoItem, TodoKind, User,
        UserRole,
    },
    response::{ApiResponse, Meta},
    routes::{
        auth, cart, containers, health, membership, open_hours, orders, params, products,
        reviews, staff, stock_requests,
    },
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
        auth::register,
        auth::login,
        auth::me,
        products::list_products,
        products::get_product,
        open_hours::get_open_hours,
        cart::get_cart,
        cart::add_item,
        cart::update_item,
        cart::remove_item,
        cart::clear_cart,
        cart::select_slot,
        cart::checkout,
        orders::create_order,
        orders::list_orders,
        orders::list_order_groups,
        orders::cancel_order,
        containers::get_balance,
        containers::request_new_customer_call,
        membership::get_membership,
        membership::use_refill_ticket,
        reviews::create_review,
        reviews::list_reviews,
        stock_requests::create_stock_request,
        staff::create_product,
        staff::update_product,
        staff::save_open_hours,
        staff::update_order_status,
        staff::get_staff_todo_data,
        staff::get_all_balances,
        staff::reconcile_container,
        staff::list_todos,
        staff::create_todo,
        staff::delete_todo,
        staff::update_membership,
        staff::list_stock_requests
    ),
    components(
        schemas(
            User,
            UserRole,
            Product,
            TimeSlot,
            DeliverySlot,
            DateType,
            OrderItem,
            StaffStatusCheck,
            ContainerStorageItem,
            RequestSource,
            Membership,
            StockRequest,
            Review,
            TodoItem,
            TodoKind,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            MeResponse,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            SlotUpdate,
            SaveOpenHoursRequest,
            SaveOpenHoursResponse,
            TimeSlotCatalog,
            CartProduct,
            CartLine,
            SlotSelection,
            CartView,
            AddToCartRequest,
            UpdateCartItemRequest,
            SelectSlotRequest,
            CartCheckoutRequest,
            OrderLine,
            ContainerInfo,
            CreateOrderRequest,
            CreateOrderResponse,
            OrderList,
            OrderGroup,
            OrdererColor,
            OrderGroupList,
            CancelOrderResponse,
            UpdateOrderStatusRequest,
            ContainerBalance,
            CustomerBalance,
            AllBalances,
            Reconciliation,
            ReconciliationResult,
            StaffTodoSummary,
            StaffTodoData,
            ContainerRequest,
            UpdateMembershipRequest,
            RefillTicketResult,
            CreateStockRequest,
            StockRequestList,
            CreateReviewRequest,
            ReviewList,
            CreateTodoRequest,
            TodoList,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CartView>,
            ApiResponse<OrderList>,
            ApiResponse<OrderGroupList>,
            ApiResponse<TimeSlotCatalog>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Verification-code registration and login"),
        (name = "Products", description = "Product catalog"),
        (name = "Open Hours", description = "Delivery time slot catalog"),
        (name = "Cart", description = "Cart and slot selection"),
        (name = "Orders", description = "Order placement, history and cancellation"),
        (name = "Containers", description = "Reusable container balance"),
        (name = "Membership", description = "Delivery fee and refill tickets"),
        (name = "Reviews", description = "Delivery reviews"),
        (name = "Stock Requests", description = "Customer requests for new products"),
        (name = "Staff", description = "Staff-only endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
