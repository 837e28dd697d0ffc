use tracing::info;
use crate::db;
use crate::utils::context::ServiceContext;
use crate::utils::errors::WardenError;

///
/// Replace an account's password with a newly hashed one.
///
/// The change stamp this writes invalidates every authorisation token issued
/// before it (see services::token_is_stale). Any outstanding reset token is
/// dropped in the same update - a password change supersedes a pending reset.
///
pub async fn change_password(ctx: &ServiceContext, account_id: &str, new_password: &str)
    -> Result<(), WardenError> {

    let account = db::account::load(account_id, ctx.db()).await?;

    // Hash on the blocking pool - the account travels through the closure.
    let credentials = *ctx.credentials();
    let now = ctx.now();
    let new_password = new_password.to_string();
    let account = tokio::task::spawn_blocking(move || {
            let mut account = account;
            credentials.change_password(&mut account, &new_password, now)?;
            Ok::<_, WardenError>(account)
        })
        .await
        .map_err(WardenError::from)?
        ?;

    db::account::update_password(&account, ctx.db()).await?;

    info!("Password changed for account {}", account.account_id);

    Ok(())
}
