pub mod auth_service;
pub mod cart_service;
pub mod container_service;
pub mod membership_service;
pub mod open_hours_service;
pub mod order_service;
pub mod product_service;
pub mod review_service;
pub mod stock_request_service;
pub mod todo_service;
