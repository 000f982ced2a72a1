pub mod admin_service;
pub mod auth_service;
pub mod category_service;
pub mod customer_service;
pub mod directory;
pub mod product_service;
pub mod sale_service;
pub mod stock_ledger;
pub mod supplier_service;
pub mod verification;
