//! Booking rules that do not touch the database: the delivery slot catalog, the cart
//! session, order grouping and the reusable-container ledger.

pub mod cart;
pub mod ledger;
pub mod orders;
pub mod time_slots;
