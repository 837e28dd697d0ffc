use chrono::{DateTime, Utc};
use crate::db;
use crate::utils::context::ServiceContext;
use crate::utils::errors::WardenError;

///
/// For the external authorisation layer: true if the account's password was
/// changed after the given token was issued, meaning the token must be
/// rejected upstream.
///
/// An account that never changed its password has no stale tokens.
///
pub async fn token_is_stale(ctx: &ServiceContext, account_id: &str, token_issued_at: DateTime<Utc>)
    -> Result<bool, WardenError> {

    let account = db::account::load(account_id, ctx.db()).await?;

    Ok(account.changed_after(token_issued_at))
}
