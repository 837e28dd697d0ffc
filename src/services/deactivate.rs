use tracing::info;
use crate::db;
use crate::utils::context::ServiceContext;
use crate::utils::errors::WardenError;

///
/// Soft delete an account: it vanishes from every filtered lookup (login
/// included) but the record - and anything referencing it - survives.
///
pub async fn deactivate_account(ctx: &ServiceContext, account_id: &str) -> Result<(), WardenError> {

    // Load first so deactivating a missing (or already deactivated) account
    // reports AccountNotFound rather than silently matching nothing.
    let account = db::account::load(account_id, ctx.db()).await?;

    db::account::deactivate(ctx, &account.account_id).await?;

    info!("Account {} deactivated", account.account_id);

    Ok(())
}
