use tracing::info;
use crate::db;
use crate::model::account::{Account, AccountView};
use crate::utils::context::ServiceContext;
use crate::utils::errors::WardenError;

///
/// Create a new account from an email and a plain text password.
///
/// The password is hashed immediately and only the hash is persisted - the
/// plain text (and any confirmation copy the caller collected) dies here.
///
pub async fn register(ctx: &ServiceContext, email: &str, plain_text_password: &str)
    -> Result<AccountView, WardenError> {

    // Hashing is deliberately expensive, so perform it in the blocking thread
    // pool not on the main event loop.
    let credentials = *ctx.credentials();
    let plain_text_password = plain_text_password.to_string();
    let phc = tokio::task::spawn_blocking(move || credentials.hash_password(&plain_text_password))
        .await
        .map_err(WardenError::from)?
        ?;

    let account = Account::new(email, &phc, ctx.now());
    db::account::insert(&account, ctx.db()).await?;

    info!("Registered account {}", account.account_id);

    Ok(AccountView::from(&account))
}
