use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, patch, post, put},
};
use uuid::Uuid;

use crate::{
    domain::ledger::{AllBalances, Reconciliation},
    dto::{
        containers::{ReconciliationResult, StaffTodoData},
        membership::UpdateMembershipRequest,
        open_hours::{SaveOpenHoursRequest, SaveOpenHoursResponse},
        orders::UpdateOrderStatusRequest,
        products::{CreateProductRequest, UpdateProductRequest},
        stock_requests::StockRequestList,
        todos::{CreateTodoRequest, TodoList},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Membership, OrderItem, Product, TodoItem},
    response::ApiResponse,
    services::{
        container_service, membership_service, open_hours_service, order_service,
        product_service, stock_request_service, todo_service,
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", post(create_product))
        .route("/products/{id}", put(update_product))
        .route("/open-hours", put(save_open_hours))
        .route("/orders/{id}/status", patch(update_order_status))
        .route("/containers", get(get_staff_todo_data))
        .route("/containers/balances", get(get_all_balances))
        .route("/containers/{id}", patch(reconcile_container))
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", delete(delete_todo))
        .route("/memberships/{orderer_code}", put(update_membership))
        .route("/stock-requests", get(list_stock_requests))
}

#[utoipa::path(
    post,
    path = "/api/staff/products",
    request_body = CreateProductRequest,
    responses(
        (status = 200, description = "Create product", body = ApiResponse<Product>),
        (status = 400, description = "Invalid pricing"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::create_product(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/staff/products/{id}",
    params(
        ("id" = String, Path, description = "Product code")
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Updated product", body = ApiResponse<Product>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::update_product(&state, &user, &id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/staff/open-hours",
    request_body = SaveOpenHoursRequest,
    responses(
        (status = 200, description = "Replace slot overrides for today or tomorrow", body = ApiResponse<SaveOpenHoursResponse>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn save_open_hours(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SaveOpenHoursRequest>,
) -> AppResult<Json<ApiResponse<SaveOpenHoursResponse>>> {
    let resp = open_hours_service::save_open_hours(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/staff/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order item ID")
    ),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Update one order row's status", body = ApiResponse<OrderItem>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<OrderItem>>> {
    let resp = order_service::update_order_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/staff/containers",
    responses(
        (status = 200, description = "Container ledger with summary", body = ApiResponse<StaffTodoData>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn get_staff_todo_data(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<StaffTodoData>>> {
    let resp = container_service::get_staff_todo_data(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/staff/containers/balances",
    responses(
        (status = 200, description = "Balance per customer and in total", body = ApiResponse<AllBalances>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn get_all_balances(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<AllBalances>>> {
    let resp = container_service::get_all_balances(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/staff/containers/{id}",
    params(
        ("id" = Uuid, Path, description = "Container request row ID")
    ),
    request_body = Reconciliation,
    responses(
        (status = 200, description = "Record verified incoming/outgoing counts", body = ApiResponse<ReconciliationResult>),
        (status = 400, description = "Missing or negative counts"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn reconcile_container(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<Reconciliation>,
) -> AppResult<Json<ApiResponse<ReconciliationResult>>> {
    let resp = container_service::reconcile(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/staff/todos",
    responses(
        (status = 200, description = "Shop to-do lists", body = ApiResponse<TodoList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn list_todos(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<TodoList>>> {
    let resp = todo_service::list_todos(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/staff/todos",
    request_body = CreateTodoRequest,
    responses(
        (status = 200, description = "Todo created", body = ApiResponse<TodoItem>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn create_todo(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateTodoRequest>,
) -> AppResult<Json<ApiResponse<TodoItem>>> {
    let resp = todo_service::create_todo(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/staff/todos/{id}",
    params(
        ("id" = Uuid, Path, description = "Todo ID")
    ),
    responses(
        (status = 200, description = "Todo deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn delete_todo(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = todo_service::delete_todo(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/staff/memberships/{orderer_code}",
    params(
        ("orderer_code" = String, Path, description = "Customer orderer code")
    ),
    request_body = UpdateMembershipRequest,
    responses(
        (status = 200, description = "Set delivery fee or refill tickets", body = ApiResponse<Membership>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Unknown orderer code"),
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn update_membership(
    State(state): State<AppState>,
    user: AuthUser,
    Path(orderer_code): Path<String>,
    Json(payload): Json<UpdateMembershipRequest>,
) -> AppResult<Json<ApiResponse<Membership>>> {
    let resp = membership_service::update_membership(&state, &user, &orderer_code, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/staff/stock-requests",
    responses(
        (status = 200, description = "Customer stock requests, newest first", body = ApiResponse<StockRequestList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn list_stock_requests(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<StockRequestList>>> {
    let resp = stock_request_service::list_stock_requests(&state, &user).await?;
    Ok(Json(resp))
}
