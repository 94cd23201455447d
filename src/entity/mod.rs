pub mod audit_logs;
pub mod cart_items;
pub mod cart_selections;
pub mod container_storage;
pub mod memberships;
pub mod open_hours;
pub mod order_items;
pub mod products;
pub mod reviews;
pub mod stock_requests;
pub mod todos;
pub mod users;
pub mod verification_codes;

pub use audit_logs::Entity as AuditLogs;
pub use cart_items::Entity as CartItems;
pub use cart_selections::Entity as CartSelections;
pub use container_storage::Entity as ContainerStorage;
pub use memberships::Entity as Memberships;
pub use open_hours::Entity as OpenHours;
pub use order_items::Entity as OrderItems;
pub use products::Entity as Products;
pub use reviews::Entity as Reviews;
pub use stock_requests::Entity as StockRequests;
pub use todos::Entity as Todos;
pub use users::Entity as Users;
pub use verification_codes::Entity as VerificationCodes;
