//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod audit;
pub mod auth;
pub mod budget;
pub mod investment;
pub mod records;

pub use audit::*;
pub use auth::*;
pub use budget::*;
pub use investment::*;
pub use records::*;

use axum::http::HeaderMap;

use crate::{get_user_email, AppError, AppState};

/// The caller's identity and user row, registering the user on first use
pub(crate) fn caller(state: &AppState, headers: &HeaderMap) -> Result<(String, i64), AppError> {
    let email = get_user_email(headers);
    let user_id = state.db.ensure_user(&email)?;
    Ok((email, user_id))
}
