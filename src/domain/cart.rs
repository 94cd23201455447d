//! Customer cart: product lines plus a single delivery slot selection.
//!
//! [`Cart`] is plain data with the cart arithmetic. [`CartSession`] wraps it with a
//! [`CartStore`] so every mutation is written back as soon as it is applied.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::{orders::OrderLine, time_slots::is_slot_expired},
    error::{AppError, AppResult},
    models::{DeliverySlot, Product},
};

/// Pricing-relevant view of a product held by a cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartProduct {
    pub id: String,
    pub name: String,
    pub order_min_quantity: f64,
    pub order_unit: String,
    pub price_per_min_order: i64,
}

impl From<&Product> for CartProduct {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            order_min_quantity: product.order_min_quantity,
            order_unit: product.order_unit.clone(),
            price_per_min_order: product.price_per_min_order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub product: CartProduct,
    /// Number of minimum-order batches.
    pub quantity: i32,
}

impl CartLine {
    pub fn line_price(&self) -> i64 {
        self.product.price_per_min_order * i64::from(self.quantity)
    }

    /// Amount actually shipped, in `order_unit`.
    pub fn shipped_amount(&self) -> f64 {
        self.product.order_min_quantity * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SlotSelection {
    pub slot: DeliverySlot,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Cart {
    pub lines: Vec<CartLine>,
    pub selection: Option<SlotSelection>,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Adds `quantity` batches, merging into an existing line for the same product.
    pub fn add_item(&mut self, product: CartProduct, quantity: i32) -> AppResult<()> {
        match self.lines.iter_mut().find(|line| line.product.id == product.id) {
            Some(line) => {
                line.quantity = line.quantity.checked_add(quantity).ok_or_else(|| {
                    AppError::BadRequest(format!("Quantity too large for product {}", product.id))
                })?;
            }
            None => self.lines.push(CartLine { product, quantity }),
        }
        Ok(())
    }

    /// Sets the quantity of a line; zero or less removes it.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i32) {
        if quantity <= 0 {
            self.remove_item(product_id);
            return;
        }
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product.id == product_id)
        {
            line.quantity = quantity;
        }
    }

    pub fn remove_item(&mut self, product_id: &str) {
        self.lines.retain(|line| line.product.id != product_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.selection = None;
    }

    /// Records the chosen slot. A missing date means `today`; `None` clears the selection.
    pub fn set_time_slot(
        &mut self,
        slot: Option<DeliverySlot>,
        date: Option<NaiveDate>,
        today: NaiveDate,
    ) {
        self.selection = slot.map(|slot| SlotSelection {
            slot,
            date: date.unwrap_or(today),
        });
    }

    /// Sum of `price_per_min_order * quantity` over all lines.
    pub fn total_price(&self) -> i64 {
        self.lines.iter().map(CartLine::line_price).sum()
    }

    pub fn total_items(&self) -> i64 {
        self.lines.iter().map(|line| i64::from(line.quantity)).sum()
    }

    /// What gets sent to order creation: ids and quantities only, never prices.
    pub fn order_lines(&self) -> Vec<OrderLine> {
        self.lines
            .iter()
            .map(|line| OrderLine {
                product_id: line.product.id.clone(),
                quantity: line.quantity,
            })
            .collect()
    }

    /// Local checks that must pass before anything is submitted.
    pub fn validate_for_checkout(&self) -> AppResult<&SlotSelection> {
        if self.lines.is_empty() {
            return Err(AppError::BadRequest("Cart is empty".into()));
        }
        if let Some(line) = self.lines.iter().find(|line| line.quantity <= 0) {
            return Err(AppError::BadRequest(format!(
                "Invalid quantity for product {}",
                line.product.id
            )));
        }
        self.selection
            .as_ref()
            .ok_or_else(|| AppError::BadRequest("Select a delivery time slot".into()))
    }

    /// Drops the selection when its window is no longer bookable. Returns whether it did.
    pub fn expire_stale_slot(&mut self, now: NaiveDateTime) -> bool {
        let expired = self
            .selection
            .as_ref()
            .is_some_and(|sel| is_slot_expired(sel.date, sel.slot.start_hour, now));
        if expired {
            self.selection = None;
        }
        expired
    }
}

/// Persistence adapter for carts, keyed by the owning user.
pub trait CartStore {
    fn load(&self, owner: Uuid) -> impl Future<Output = AppResult<Cart>> + Send;
    fn save(&self, owner: Uuid, cart: &Cart) -> impl Future<Output = AppResult<()>> + Send;
}

/// Process-local store, used by tests and tooling.
#[derive(Debug, Clone, Default)]
pub struct MemoryCartStore {
    carts: Arc<Mutex<HashMap<Uuid, Cart>>>,
    saves: Arc<Mutex<usize>>,
}

impl MemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `save` calls observed so far.
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|n| *n).unwrap_or_default()
    }

    pub fn snapshot(&self, owner: Uuid) -> Option<Cart> {
        self.carts
            .lock()
            .ok()
            .and_then(|carts| carts.get(&owner).cloned())
    }
}

impl CartStore for MemoryCartStore {
    async fn load(&self, owner: Uuid) -> AppResult<Cart> {
        let carts = self
            .carts
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("cart store poisoned")))?;
        Ok(carts.get(&owner).cloned().unwrap_or_default())
    }

    async fn save(&self, owner: Uuid, cart: &Cart) -> AppResult<()> {
        {
            let mut carts = self
                .carts
                .lock()
                .map_err(|_| AppError::Internal(anyhow::anyhow!("cart store poisoned")))?;
            carts.insert(owner, cart.clone());
        }
        if let Ok(mut saves) = self.saves.lock() {
            *saves += 1;
        }
        Ok(())
    }
}

/// What a validated cart hands to order creation.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutDraft {
    pub lines: Vec<OrderLine>,
    pub delivery_date: NaiveDate,
    pub slot: DeliverySlot,
}

/// A user's cart bound to its store: loaded on open, saved after every mutation.
#[derive(Debug)]
pub struct CartSession<S> {
    owner: Uuid,
    store: S,
    cart: Cart,
}

impl<S: CartStore> CartSession<S> {
    pub async fn open(store: S, owner: Uuid) -> AppResult<Self> {
        let cart = store.load(owner).await?;
        Ok(Self { owner, store, cart })
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn into_cart(self) -> Cart {
        self.cart
    }

    async fn persist(&self) -> AppResult<()> {
        self.store.save(self.owner, &self.cart).await
    }

    pub async fn add_item(&mut self, product: CartProduct, quantity: i32) -> AppResult<()> {
        self.cart.add_item(product, quantity)?;
        self.persist().await
    }

    pub async fn update_quantity(&mut self, product_id: &str, quantity: i32) -> AppResult<()> {
        self.cart.update_quantity(product_id, quantity);
        self.persist().await
    }

    pub async fn remove_item(&mut self, product_id: &str) -> AppResult<()> {
        self.cart.remove_item(product_id);
        self.persist().await
    }

    pub async fn clear(&mut self) -> AppResult<()> {
        self.cart.clear();
        self.persist().await
    }

    pub async fn set_time_slot(
        &mut self,
        slot: Option<DeliverySlot>,
        date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> AppResult<()> {
        self.cart.set_time_slot(slot, date, today);
        self.persist().await
    }

    pub async fn clear_slot(&mut self) -> AppResult<()> {
        self.cart.selection = None;
        self.persist().await
    }

    /// Validates the cart and re-checks the slot against `now`.
    ///
    /// A slot that has expired since it was chosen is dropped (and persisted) and the
    /// call fails with [`AppError::SlotUnavailable`] so the customer picks a new one.
    pub async fn prepare_checkout(&mut self, now: NaiveDateTime) -> AppResult<CheckoutDraft> {
        self.cart.validate_for_checkout()?;
        if self.cart.expire_stale_slot(now) {
            self.persist().await?;
            return Err(AppError::SlotUnavailable(
                "The selected delivery time slot is no longer available".into(),
            ));
        }
        let selection = self.cart.validate_for_checkout()?;
        Ok(CheckoutDraft {
            lines: self.cart.order_lines(),
            delivery_date: selection.date,
            slot: selection.slot.clone(),
        })
    }
}
