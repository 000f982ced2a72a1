pub mod audit_logs;
pub mod categories;
pub mod email_verifications;
pub mod products;
pub mod sale_order_items;
pub mod sale_orders;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use categories::Entity as Categories;
pub use email_verifications::Entity as EmailVerifications;
pub use products::Entity as Products;
pub use sale_order_items::Entity as SaleOrderItems;
pub use sale_orders::Entity as SaleOrders;
pub use users::Entity as Users;
