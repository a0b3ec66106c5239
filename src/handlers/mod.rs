//! Command Handlers module
//!
//! Handlers own the calendar behaviour behind each endpoint. They receive
//! their repositories and renderer through constructors.

mod category_handler;
mod commands;
mod event_handler;


pub use category_handler::CategoryHandler;
pub use commands::*;
pub use event_handler::EventHandler;

use crate::domain::{OperationContext, Permission};
use crate::error::AppError;

/// Reject the call unless the context holds `permission`
pub(crate) fn require_permission(
    context: &OperationContext,
    permission: Permission,
) -> Result<(), AppError> {
    if context.has_permission(permission) {
        Ok(())
    } else {
        tracing::warn!(
            user_id = ?context.user_id,
            permission = %permission,
            "Permission denied"
        );
        Err(AppError::PermissionDenied(permission.to_string()))
    }
}
