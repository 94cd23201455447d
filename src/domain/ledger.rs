//! Reusable-container custody ledger.
//!
//! Balances are never stored. They are summed from the event rows on every read:
//! reconciled incoming rows add their actual count, reconciled outgoing rows subtract it.
//! Rows whose count is still `NULL` (a customer request staff has not checked) do not
//! move the balance.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::ContainerStorageItem,
};

/// Contribution of one row to its customer's balance, `None` while unreconciled.
pub fn signed_count(item: &ContainerStorageItem) -> Option<i64> {
    let count = i64::from(item.actual_container_count?);
    Some(if item.is_incoming { count } else { -count })
}

pub fn balance<'a, I>(events: I, orderer_code: &str) -> i64
where
    I: IntoIterator<Item = &'a ContainerStorageItem>,
{
    events
        .into_iter()
        .filter(|item| item.orderer_code == orderer_code)
        .filter_map(signed_count)
        .sum()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CustomerBalance {
    pub orderer_code: String,
    pub balance: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AllBalances {
    /// One entry per orderer code seen in the ledger, ordered by code.
    pub balances: Vec<CustomerBalance>,
    pub total_balance: i64,
}

pub fn all_balances<'a, I>(events: I) -> AllBalances
where
    I: IntoIterator<Item = &'a ContainerStorageItem>,
{
    let mut per_customer: BTreeMap<&str, i64> = BTreeMap::new();
    for item in events {
        let entry = per_customer.entry(item.orderer_code.as_str()).or_default();
        *entry += signed_count(item).unwrap_or(0);
    }
    let total_balance: i64 = per_customer.values().sum();
    let balances = per_customer
        .into_iter()
        .map(|(orderer_code, balance)| CustomerBalance {
            orderer_code: orderer_code.to_string(),
            balance,
        })
        .collect();
    AllBalances {
        balances,
        total_balance,
    }
}

/// Staff-verified counts for one customer request row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
pub struct Reconciliation {
    pub incoming_count: Option<i32>,
    pub outgoing_count: Option<i32>,
    pub staff_comment: Option<String>,
}

impl Reconciliation {
    pub fn validate(&self) -> AppResult<()> {
        if self.incoming_count.is_none() && self.outgoing_count.is_none() {
            return Err(AppError::BadRequest(
                "incoming_count or outgoing_count is required".into(),
            ));
        }
        for (name, count) in [
            ("incoming_count", self.incoming_count),
            ("outgoing_count", self.outgoing_count),
        ] {
            if count.is_some_and(|c| c < 0) {
                return Err(AppError::BadRequest(format!("{name} must not be negative")));
            }
        }
        Ok(())
    }
}

/// What reconciliation does to the linked outgoing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutgoingChange {
    None,
    Create { count: i32 },
    Update { id: Uuid, count: Option<i32> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconciliationPlan {
    pub incoming_count: Option<i32>,
    pub outgoing: OutgoingChange,
}

/// Works out the point updates for reconciling `target`.
///
/// Incoming and outgoing stay separate rows so each nets on its own; the request row
/// never flips sign.
pub fn plan_reconciliation(
    target: &ContainerStorageItem,
    reconciliation: &Reconciliation,
) -> AppResult<ReconciliationPlan> {
    reconciliation.validate()?;
    if !target.is_incoming {
        return Err(AppError::BadRequest(
            "outgoing rows are reconciled through their request row".into(),
        ));
    }

    let outgoing = match (reconciliation.outgoing_count, target.outgoing_container_id) {
        (Some(count), Some(id)) => OutgoingChange::Update {
            id,
            count: Some(count),
        },
        (Some(count), None) => OutgoingChange::Create { count },
        (None, Some(id)) => OutgoingChange::Update { id, count: None },
        (None, None) => OutgoingChange::None,
    };

    Ok(ReconciliationPlan {
        incoming_count: reconciliation.incoming_count,
        outgoing,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct StaffTodoSummary {
    pub total_requested: i64,
    pub total_incoming: i64,
    pub total_outgoing: i64,
    pub pending_count: i64,
    pub total_balance: i64,
}

pub fn summarize(items: &[ContainerStorageItem]) -> StaffTodoSummary {
    let mut summary = StaffTodoSummary::default();
    for item in items {
        let actual = item.actual_container_count.map(i64::from);
        if item.is_incoming {
            summary.total_requested += i64::from(item.requested_container_count);
            match actual {
                Some(count) => summary.total_incoming += count,
                None => summary.pending_count += 1,
            }
        } else {
            summary.total_outgoing += actual.unwrap_or(0);
        }
    }
    summary.total_balance = summary.total_incoming - summary.total_outgoing;
    summary
}

/// Request rows due today, and earlier request rows still waiting for a count.
pub fn split_for_day(
    items: &[ContainerStorageItem],
    today: NaiveDate,
) -> (Vec<ContainerStorageItem>, Vec<ContainerStorageItem>) {
    let due_today = items
        .iter()
        .filter(|item| item.is_incoming && item.order_date == today)
        .cloned()
        .collect();
    let overdue = items
        .iter()
        .filter(|item| {
            item.is_incoming && item.order_date < today && item.actual_container_count.is_none()
        })
        .cloned()
        .collect();
    (due_today, overdue)
}
