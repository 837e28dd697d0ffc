use tracing::{info, warn};
use crate::db;
use crate::model::credentials::ResetOutcome;
use crate::utils::context::ServiceContext;
use crate::utils::errors::{ErrorCode, WardenError};

///
/// Finish a password reset: consume the token and, if it is accepted, assign
/// the new password.
///
/// The new hash, its change stamp and the token removal are persisted as one
/// update filtered on the consumed token hash - of two racing completions
/// exactly one wins, the other finds the token already spent.
///
pub async fn complete_reset(ctx: &ServiceContext, email: &str, candidate_token: &str, new_password: &str)
    -> Result<(), WardenError> {

    let mut account = match db::account::find_by_email(email, ctx.db()).await? {
        Some(account) => account,
        None => return Err(ErrorCode::ResetTokenInvalid.with_msg("The reset token is not valid")),
    };

    let consumed_hash = match &account.reset_token_hash {
        Some(hash) => hash.clone(),
        None => return Err(ErrorCode::ResetTokenInvalid.with_msg("No reset is in progress for that account")),
    };

    match ctx.credentials().consume_reset_token(&mut account, candidate_token, ctx.now()) {
        ResetOutcome::Invalid => {
            Err(ErrorCode::ResetTokenInvalid.with_msg("The reset token is not valid"))
        },

        ResetOutcome::Expired => {
            // An expired token must not remain consumable - clear it before
            // rejecting, so partial state can never revive it.
            db::account::clear_reset_token(&account.account_id, &consumed_hash, ctx.db()).await?;
            warn!("Expired reset token cleared for account {}", account.account_id);
            Err(ErrorCode::ResetTokenExpired.with_msg("The period to reset the password has expired, you must start again"))
        },

        ResetOutcome::Accepted => {
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

            match db::account::complete_reset_update(&account, &consumed_hash, ctx.db()).await? {
                true => {
                    info!("Reset completed for account {}", account.account_id);
                    Ok(())
                },
                // A concurrent completion got there first.
                false => Err(ErrorCode::ResetTokenInvalid.with_msg("The reset token has already been used")),
            }
        },
    }
}
