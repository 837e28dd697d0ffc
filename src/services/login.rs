use tracing::debug;
use crate::db;
use crate::model::account::AccountView;
use crate::model::credentials::CredentialManager;
use crate::utils::context::ServiceContext;
use crate::utils::errors::{ErrorCode, WardenError};

// A throwaway cost-12 hash of random junk. When the email matches no account
// we still burn a verify against this, so the caller's latency and response
// are the same whether the account is absent or the password is wrong.
const DUMMY_PHC: &str = "$2b$12$GhvMmNVjRW29ulnudl.LbuAnUtN/LRfe1JsBm1Xu6LE3059z5Tr8m";

///
/// Authenticate by email and plain text password.
///
/// Soft-deleted accounts are invisible here - the lookup is filter-scoped, so
/// they fail exactly like unknown emails. The single failure code never says
/// which part was wrong.
///
pub async fn login(ctx: &ServiceContext, email: &str, plain_text_password: &str)
    -> Result<AccountView, WardenError> {

    let account = db::account::find_by_email(email, ctx.db()).await?;

    let phc = match &account {
        Some(account) => account.phc.clone(),
        None => DUMMY_PHC.to_string(),
    };

    // Verification is as CPU-bound as hashing - off the event loop with it.
    let plain_text_password = plain_text_password.to_string();
    let valid = tokio::task::spawn_blocking(move || CredentialManager::verify_password(&plain_text_password, &phc))
        .await
        .map_err(WardenError::from)?;

    match account {
        Some(account) if valid => {
            debug!("Account {} authenticated", account.account_id);
            Ok(AccountView::from(&account))
        },
        _ => Err(ErrorCode::AuthenticationFailed.with_msg("The email or password is incorrect")),
    }
}
