//! Reassembles checkouts from flat order-item rows.
//!
//! A checkout is persisted as one row per product; all rows of a checkout share the
//! delivery slot key `"{date}_{slot_id}"`.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    domain::time_slots::is_slot_ahead,
    models::{OrderItem, UserRole},
};

/// One requested product line: an id and a batch count, nothing price-related.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderLine {
    pub product_id: String,
    pub quantity: i32,
}

pub fn delivery_slot_key(order_date: NaiveDate, slot_id: &str) -> String {
    format!("{}_{}", order_date.format("%Y-%m-%d"), slot_id)
}

/// Splits a delivery slot key back into its date and slot id.
pub fn parse_delivery_slot_key(key: &str) -> Option<(NaiveDate, &str)> {
    let (date, slot_id) = key.split_once('_')?;
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    if slot_id.is_empty() {
        return None;
    }
    Some((date, slot_id))
}

/// A checkout may be cancelled until its delivery window starts.
pub fn is_cancellable(order_date: NaiveDate, start_hour: u32, now: NaiveDateTime) -> bool {
    is_slot_ahead(order_date, start_hour, now)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct OrdererColor {
    pub orderer_code: String,
    /// Display cue only, assigned in first-seen order within the group.
    pub color_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrderGroup {
    pub delivery_slot_key: String,
    pub order_date: NaiveDate,
    pub time_slot_label: String,
    pub start_hour: u32,
    pub items: Vec<OrderItem>,
    pub total_price: i64,
    pub orderers: Vec<OrdererColor>,
    pub orderer_count: usize,
    pub can_cancel: bool,
}

impl OrderGroup {
    fn new(first: &OrderItem) -> Self {
        Self {
            delivery_slot_key: first.delivery_slot_key.clone(),
            order_date: first.order_date,
            time_slot_label: first.delivery_time_slot.label.clone(),
            start_hour: first.delivery_time_slot.start_hour,
            items: Vec::new(),
            total_price: 0,
            orderers: Vec::new(),
            orderer_count: 0,
            can_cancel: false,
        }
    }

    fn push(&mut self, item: OrderItem) {
        self.total_price += item.item_price;
        if !self
            .orderers
            .iter()
            .any(|o| o.orderer_code == item.orderer_code)
        {
            self.orderers.push(OrdererColor {
                orderer_code: item.orderer_code.clone(),
                color_index: self.orderers.len(),
            });
        }
        self.items.push(item);
    }
}

/// Groups rows by delivery slot key, newest delivery first.
///
/// Items inside a group are ordered by product id. Groups sort by date, then by the
/// slot's start hour, then by key, all descending. Only customers get `can_cancel`.
pub fn group_orders(items: Vec<OrderItem>, role: UserRole, now: NaiveDateTime) -> Vec<OrderGroup> {
    let mut groups: Vec<OrderGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in items {
        let slot = match index.get(&item.delivery_slot_key) {
            Some(&slot) => slot,
            None => {
                groups.push(OrderGroup::new(&item));
                index.insert(item.delivery_slot_key.clone(), groups.len() - 1);
                groups.len() - 1
            }
        };
        if let Some(group) = groups.get_mut(slot) {
            group.push(item);
        }
    }

    for group in &mut groups {
        group.orderer_count = group.orderers.len();
        group.items.sort_by(|a, b| a.product.id.cmp(&b.product.id));
        group.can_cancel =
            role == UserRole::Customer && is_cancellable(group.order_date, group.start_hour, now);
    }

    groups.sort_by(|a, b| {
        b.order_date
            .cmp(&a.order_date)
            .then_with(|| b.start_hour.cmp(&a.start_hour))
            .then_with(|| b.delivery_slot_key.cmp(&a.delivery_slot_key))
    });
    groups
}
