use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    domain::{
        cart::{Cart, CartLine, CartProduct, CartSession, CartStore, SlotSelection},
        time_slots,
    },
    dto::{
        cart::{
            AddToCartRequest, CartCheckoutRequest, CartView, SelectSlotRequest,
            UpdateCartItemRequest,
        },
        orders::{CreateOrderRequest, CreateOrderResponse},
    },
    entity::{
        cart_items::{ActiveModel as CartItemActive, Column as CartCol, Entity as CartItems},
        cart_selections::{ActiveModel as SelectionActive, Entity as CartSelections},
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::DeliverySlot,
    response::{ApiResponse, Meta},
    services::{open_hours_service, order_service, product_service::product_from_entity},
    state::AppState,
};

/// Cart persistence backed by the `cart_items` and `cart_selections` tables.
#[derive(Debug, Clone)]
pub struct OrmCartStore {
    orm: DatabaseConnection,
}

impl OrmCartStore {
    pub fn new(orm: DatabaseConnection) -> Self {
        Self { orm }
    }
}

impl CartStore for OrmCartStore {
    async fn load(&self, owner: Uuid) -> AppResult<Cart> {
        let lines = CartItems::find()
            .filter(CartCol::UserId.eq(owner))
            .order_by_asc(CartCol::Position)
            .find_also_related(Products)
            .all(&self.orm)
            .await?
            .into_iter()
            .filter_map(|(item, product)| {
                let product = product_from_entity(product?);
                Some(CartLine {
                    product: CartProduct::from(&product),
                    quantity: item.quantity,
                })
            })
            .collect();

        // A stored slot id that no longer exists in the base catalog is dropped.
        let selection = CartSelections::find_by_id(owner)
            .one(&self.orm)
            .await?
            .and_then(|row| {
                time_slots::find_base_slot(&row.slot_id).map(|slot| SlotSelection {
                    slot: DeliverySlot::from(&slot),
                    date: row.delivery_date,
                })
            });

        Ok(Cart { lines, selection })
    }

    async fn save(&self, owner: Uuid, cart: &Cart) -> AppResult<()> {
        let txn = self.orm.begin().await?;

        CartItems::delete_many()
            .filter(CartCol::UserId.eq(owner))
            .exec(&txn)
            .await?;
        let rows: Vec<CartItemActive> = cart
            .lines
            .iter()
            .enumerate()
            .map(|(position, line)| CartItemActive {
                id: Set(Uuid::new_v4()),
                user_id: Set(owner),
                product_id: Set(line.product.id.clone()),
                quantity: Set(line.quantity),
                position: Set(position as i32),
            })
            .collect();
        if !rows.is_empty() {
            CartItems::insert_many(rows).exec(&txn).await?;
        }

        CartSelections::delete_by_id(owner).exec(&txn).await?;
        if let Some(selection) = &cart.selection {
            SelectionActive {
                user_id: Set(owner),
                slot_id: Set(selection.slot.id.clone()),
                delivery_date: Set(selection.date),
                updated_at: Set(Utc::now().into()),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        Ok(())
    }
}

async fn open_session(state: &AppState, user: &AuthUser) -> AppResult<CartSession<OrmCartStore>> {
    CartSession::open(OrmCartStore::new(state.orm.clone()), user.user_id).await
}

fn cart_view(cart: &Cart) -> CartView {
    CartView {
        lines: cart.lines.clone(),
        selection: cart.selection.clone(),
        total_price: cart.total_price(),
        total_items: cart.total_items(),
    }
}

fn cart_response(message: &str, cart: &Cart) -> ApiResponse<CartView> {
    ApiResponse::success(message, cart_view(cart), Some(Meta::total(cart.lines.len())))
}

pub async fn get_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    let session = open_session(state, user).await?;
    Ok(cart_response("OK", session.cart()))
}

pub async fn add_item(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartView>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let product = Products::find_by_id(payload.product_id.clone())
        .one(&state.orm)
        .await?
        .filter(|p| p.is_active)
        .map(product_from_entity)
        .ok_or_else(|| AppError::BadRequest("product not found".to_string()))?;
    if !product.in_stock {
        return Err(AppError::BadRequest(format!(
            "Product {} is out of stock",
            product.name
        )));
    }

    let mut session = open_session(state, user).await?;
    session
        .add_item(CartProduct::from(&product), payload.quantity)
        .await?;

    audit::record(
        state,
        Some(user),
        "cart_update",
        "cart_items",
        serde_json::json!({ "product_id": product.id, "quantity": payload.quantity }),
    )
    .await;

    Ok(cart_response("Added to cart", session.cart()))
}

pub async fn update_item(
    state: &AppState,
    user: &AuthUser,
    product_id: &str,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartView>> {
    let mut session = open_session(state, user).await?;
    ensure_line(session.cart(), product_id)?;
    session.update_quantity(product_id, payload.quantity).await?;
    Ok(cart_response("Cart updated", session.cart()))
}

pub async fn remove_item(
    state: &AppState,
    user: &AuthUser,
    product_id: &str,
) -> AppResult<ApiResponse<CartView>> {
    let mut session = open_session(state, user).await?;
    ensure_line(session.cart(), product_id)?;
    session.remove_item(product_id).await?;

    audit::record(
        state,
        Some(user),
        "cart_remove",
        "cart_items",
        serde_json::json!({ "product_id": product_id }),
    )
    .await;

    Ok(cart_response("Removed from cart", session.cart()))
}

pub async fn clear_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    let mut session = open_session(state, user).await?;
    session.clear().await?;
    Ok(cart_response("Cart cleared", session.cart()))
}

/// Picks (or with `slot_id: None`, clears) the cart's delivery slot.
pub async fn select_slot(
    state: &AppState,
    user: &AuthUser,
    payload: SelectSlotRequest,
) -> AppResult<ApiResponse<CartView>> {
    let now = state.business_now();
    let today = now.date();
    let mut session = open_session(state, user).await?;

    let Some(slot_id) = payload.slot_id else {
        session.clear_slot().await?;
        return Ok(cart_response("Time slot cleared", session.cart()));
    };

    let date = payload.date.unwrap_or(today);
    let slot = open_hours_service::bookable_slot(&state.orm, date, &slot_id, today).await?;
    if time_slots::is_slot_expired(date, slot.start_hour, now) {
        return Err(AppError::SlotUnavailable(format!(
            "Time slot {} on {date} has already started",
            slot.label
        )));
    }

    session
        .set_time_slot(Some(DeliverySlot::from(&slot)), Some(date), today)
        .await?;
    Ok(cart_response("Time slot selected", session.cart()))
}

/// Submits the cart as an order. The cart is emptied only once the order is stored.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CartCheckoutRequest,
) -> AppResult<ApiResponse<CreateOrderResponse>> {
    let mut session = open_session(state, user).await?;
    let draft = session.prepare_checkout(state.business_now()).await?;

    let request = CreateOrderRequest {
        items: draft.lines,
        delivery_date: draft.delivery_date,
        delivery_slot_id: draft.slot.id,
        container_info: payload.container_info,
    };

    match order_service::create_order(state, user, request).await {
        Ok(response) => {
            session.clear().await?;
            Ok(response)
        }
        Err(AppError::SlotUnavailable(message)) => {
            tracing::debug!(user_id = %user.user_id, %message, "slot rejected at checkout, clearing selection");
            session.clear_slot().await?;
            Err(AppError::SlotUnavailable(message))
        }
        Err(err) => Err(err),
    }
}

fn ensure_line(cart: &Cart, product_id: &str) -> AppResult<()> {
    if cart.lines.iter().any(|line| line.product.id == product_id) {
        Ok(())
    } else {
        Err(AppError::NotFound)
    }
}
