use tracing::info;
use crate::db;
use crate::utils::context::ServiceContext;
use crate::utils::errors::{ErrorCode, WardenError};

///
/// Begin a password reset: mint a single-use token for the account and hand
/// the plain token back for out-of-band delivery (email etc.).
///
/// Only the token's hash and expiry are persisted. Callers presenting this
/// flow to end users should mask AccountNotFound behind the same response as
/// success, or the endpoint becomes an account-enumeration oracle.
///
pub async fn start_reset(ctx: &ServiceContext, email: &str) -> Result<String, WardenError> {

    let mut account = match db::account::find_by_email(email, ctx.db()).await? {
        Some(account) => account,
        None => return Err(ErrorCode::AccountNotFound.with_msg("No active account has that email")),
    };

    let token = ctx.credentials().issue_reset_token(&mut account, ctx.now());
    db::account::store_reset_token(&account, ctx.db()).await?;

    info!("Reset started for account {}", account.account_id);

    Ok(token)
}
