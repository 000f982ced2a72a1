use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{
            AdminRequest, ApproveAdminRequest, ChangePasswordRequest, CreateAdminRequest,
            LoginData, LoginRequest, VerificationPending, VerifyEmailRequest,
        },
        categories::{CategoryDetail, CategoryRequest, CategorySummary, ProductSummary},
        products::{CreateProductRequest, ProductView, UpdateProductRequest},
        sales::{
            CreateSaleRequest, SaleCreated, SaleDetail, SaleRecord, SaleStatusChange,
            UpdateSaleRequest,
        },
        users::{CustomerDetail, CustomerSale, DirectoryUserRequest},
    },
    entity::{sale_orders::OrderStatus, users::Role},
    models::{Address, Category, Product, Profile, SaleOrderItem, User},
    response::{ApiResponse, Meta, Status},
    routes::{admin, categories, health, params::CategorySortBy, products, sales, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "cookie_auth",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("token"))),
        );
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        sales::create_sale,
        sales::list_sales,
        sales::get_sale,
        sales::update_sale,
        sales::delete_sale,
        sales::toggle_status,
        products::list_products,
        products::create_product,
        products::get_product,
        products::update_product,
        products::delete_product,
        categories::create_category,
        categories::list_categories,
        categories::get_category,
        categories::update_category,
        categories::delete_category,
        admin::signup,
        admin::login,
        admin::logout,
        admin::list_requests,
        admin::approve_or_remove,
        admin::verify_email,
        admin::request_change_password,
        admin::change_password,
        users::create_supplier,
        users::list_suppliers,
        users::get_supplier,
        users::update_supplier,
        users::delete_supplier,
        users::create_customer,
        users::list_customers,
        users::get_customer,
        users::update_customer,
        users::delete_customer
    ),
    components(
        schemas(
            Status,
            Meta,
            Role,
            OrderStatus,
            Address,
            Profile,
            User,
            Category,
            Product,
            SaleOrderItem,
            CategorySortBy,
            CreateSaleRequest,
            UpdateSaleRequest,
            SaleCreated,
            SaleRecord,
            SaleDetail,
            SaleStatusChange,
            CreateProductRequest,
            UpdateProductRequest,
            ProductView,
            CategoryRequest,
            CategorySummary,
            CategoryDetail,
            ProductSummary,
            CreateAdminRequest,
            LoginRequest,
            LoginData,
            VerificationPending,
            VerifyEmailRequest,
            ApproveAdminRequest,
            ChangePasswordRequest,
            AdminRequest,
            DirectoryUserRequest,
            CustomerSale,
            CustomerDetail,
            ApiResponse<SaleDetail>,
            ApiResponse<ProductView>,
            ApiResponse<User>
        )
    ),
    security(
        ("cookie_auth" = []),
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Sales", description = "Sale orders and stock"),
        (name = "Products", description = "Product catalog"),
        (name = "Categories", description = "Product categories"),
        (name = "Admin", description = "Admin accounts and sessions"),
        (name = "Suppliers", description = "Supplier directory"),
        (name = "Customers", description = "Customer directory"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
