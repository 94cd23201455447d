use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch, post, put},
};

use crate::{
    dto::{
        cart::{
            AddToCartRequest, CartCheckoutRequest, CartView, SelectSlotRequest,
            UpdateCartItemRequest,
        },
        orders::CreateOrderResponse,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart).delete(clear_cart))
        .route("/items", post(add_item))
        .route("/items/{product_id}", patch(update_item).delete(remove_item))
        .route("/slot", put(select_slot))
        .route("/checkout", post(checkout))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Current cart with totals", body = ApiResponse<CartView>)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::get_cart(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cart/items",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Add batches of a product, merging into an existing line", body = ApiResponse<CartView>),
        (status = 400, description = "Bad request"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_item(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::add_item(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/cart/items/{product_id}",
    params(
        ("product_id" = String, Path, description = "Product code")
    ),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Set line quantity; zero or less removes it", body = ApiResponse<CartView>),
        (status = 404, description = "Line not in cart"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn update_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<String>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::update_item(&state, &user, &product_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart/items/{product_id}",
    params(
        ("product_id" = String, Path, description = "Product code")
    ),
    responses(
        (status = 200, description = "OK", body = ApiResponse<CartView>),
        (status = 404, description = "Line not in cart"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<String>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::remove_item(&state, &user, &product_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart",
    responses(
        (status = 200, description = "Empty the cart and drop the slot", body = ApiResponse<CartView>)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::clear_cart(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/cart/slot",
    request_body = SelectSlotRequest,
    responses(
        (status = 200, description = "Select or clear the delivery slot", body = ApiResponse<CartView>),
        (status = 400, description = "Unknown slot or date"),
        (status = 409, description = "Slot closed or already started"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn select_slot(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SelectSlotRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::select_slot(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cart/checkout",
    request_body = CartCheckoutRequest,
    responses(
        (status = 200, description = "Order placed, cart emptied", body = ApiResponse<CreateOrderResponse>),
        (status = 400, description = "Empty cart or no slot selected"),
        (status = 409, description = "Slot no longer available, or an order already exists for that day"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CartCheckoutRequest>,
) -> AppResult<Json<ApiResponse<CreateOrderResponse>>> {
    let resp = cart_service::checkout(&state, &user, payload).await?;
    Ok(Json(resp))
}
