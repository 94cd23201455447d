pub mod auth;
pub mod cart;
pub mod containers;
pub mod membership;
pub mod open_hours;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod stock_requests;
pub mod todos;
