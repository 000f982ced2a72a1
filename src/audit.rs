use uuid::Uuid;

use crate::{error::AppResult, state::AppState};

/// Closed set of actions recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    NewAdminAdded,
    LoginAdmin,
    LogoutAdmin,
    RemoveAdmin,
    ChangePassword,
    AddSupplier,
    UpdateSupplier,
    DeleteSupplier,
    CreateCategory,
    UpdateCategory,
    DeleteCategory,
    AddProduct,
    UpdateProduct,
    RemoveProduct,
    AddCustomer,
    UpdateCustomer,
    DeleteCustomer,
    CreateSale,
    UpdateSale,
    DeleteSale,
    UpdateSaleStatus,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::NewAdminAdded => "newAdminAdded",
            AuditAction::LoginAdmin => "loginAdmin",
            AuditAction::LogoutAdmin => "logoutAdmin",
            AuditAction::RemoveAdmin => "removeAdmin",
            AuditAction::ChangePassword => "changePassword",
            AuditAction::AddSupplier => "addSupplier",
            AuditAction::UpdateSupplier => "updateSupplier",
            AuditAction::DeleteSupplier => "deleteSupplier",
            AuditAction::CreateCategory => "createCategory",
            AuditAction::UpdateCategory => "updateCategory",
            AuditAction::DeleteCategory => "deleteCategory",
            AuditAction::AddProduct => "addProduct",
            AuditAction::UpdateProduct => "updateProduct",
            AuditAction::RemoveProduct => "removeProduct",
            AuditAction::AddCustomer => "addCustomer",
            AuditAction::UpdateCustomer => "updateCustomer",
            AuditAction::DeleteCustomer => "deleteCustomer",
            AuditAction::CreateSale => "createSale",
            AuditAction::UpdateSale => "updateSale",
            AuditAction::DeleteSale => "deleteSale",
            AuditAction::UpdateSaleStatus => "updateSaleStatus",
        }
    }
}

pub async fn log_audit(
    state: &AppState,
    user_id: Uuid,
    action: AuditAction,
    description: &str,
) -> AppResult<()> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO audit_logs (id, user_id, action, description)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(action.as_str())
    .bind(description)
    .execute(&state.pool)
    .await?;

    tracing::debug!(audit_id = %id, action = action.as_str(), "audit entry written");
    Ok(())
}

/// Writes an audit entry; a failing sink is logged and never fails the request.
pub async fn record(state: &AppState, user_id: Uuid, action: AuditAction, description: String) {
    if let Err(err) = log_audit(state, user_id, action, &description).await {
        tracing::warn!(error = %err, action = action.as_str(), "audit log failed");
    }
}
