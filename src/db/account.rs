use mongodb::Database;
use bson::{Document, doc};
use crate::db::prelude::*;
use crate::model::account::{Account, normalise_email};
use crate::utils::context::ServiceContext;
use crate::utils::errors::{ErrorCode, WardenError};
use super::mongo;

///
/// The retrieval-time predicate applied to every normal lookup: soft-deleted
/// accounts are invisible without being removed. Matches documents where the
/// flag is absent as well as where it is true.
///
pub fn active_filter() -> Document {
    doc!{ ACTIVE: { "$ne": false } }
}

fn scoped(mut filter: Document) -> Document {
    filter.extend(active_filter());
    filter
}

///
/// Load the requested account - soft-deleted accounts are not found.
///
pub async fn load(account_id: &str, db: &Database) -> Result<Account, WardenError> {

    let filter = scoped(doc!{ ACCOUNT_ID: account_id });

    match db.collection::<Account>(ACCOUNTS).find_one(filter, None).await? {
        Some(account) => Ok(account),
        None => Err(ErrorCode::AccountNotFound.with_msg("The account requested does not exist"))
    }
}

///
/// Load an account regardless of its active flag - the explicit opt-out from
/// the soft-delete policy, for callers that really mean it.
///
pub async fn load_unfiltered(account_id: &str, db: &Database) -> Result<Account, WardenError> {

    match db.collection::<Account>(ACCOUNTS).find_one(doc!{ ACCOUNT_ID: account_id }, None).await? {
        Some(account) => Ok(account),
        None => Err(ErrorCode::AccountNotFound.with_msg("The account requested does not exist"))
    }
}

///
/// Look an account up by its login key. None rather than an error, so the
/// login flow can fail uniformly without branching on existence.
///
pub async fn find_by_email(email: &str, db: &Database) -> Result<Option<Account>, WardenError> {

    let filter = scoped(doc!{ EMAIL: normalise_email(email) });

    Ok(db.collection::<Account>(ACCOUNTS).find_one(filter, None).await?)
}

///
/// Store a newly registered account.
///
pub async fn insert(account: &Account, db: &Database) -> Result<(), WardenError> {

    match db.collection::<Account>(ACCOUNTS).insert_one(account, None).await {
        Ok(_) => Ok(()),
        Err(err) => {
            match mongo::is_duplicate_err(&err) {
                true  => Err(ErrorCode::EmailAlreadyRegistered.with_msg("That email address is already registered")),
                false => Err(WardenError::from(err)),
            }
        },
    }
}

///
/// Persist a completed password change: the new hash, its change stamp and the
/// removal of any outstanding reset token travel in one update, so a storage
/// failure can never leave a new hash without its metadata.
///
pub async fn update_password(account: &Account, db: &Database) -> Result<(), WardenError> {

    let filter = doc!{ ACCOUNT_ID: &account.account_id };

    let mut set = doc!{ PHC: &account.phc };
    if let Some(changed_at) = account.password_changed_at {
        set.insert(PASSWORD_CHANGED_AT, changed_at);
    }

    let update = doc!{
        "$set": set,
        "$unset": { RESET_TOKEN_HASH: "", RESET_EXPIRES_AT: "" }
    };

    db.collection::<Document>(ACCOUNTS).update_one(filter, update, None).await?;

    Ok(())
}

///
/// Persist the completion of a password reset. The filter pins the token hash
/// that was consumed, so of two racing completions only one can match - the
/// loser observes matched_count 0 and must report the token as spent.
///
pub async fn complete_reset_update(account: &Account, consumed_hash: &str, db: &Database)
    -> Result<bool, WardenError> {

    let filter = doc!{
        ACCOUNT_ID: &account.account_id,
        RESET_TOKEN_HASH: consumed_hash,
    };

    let mut set = doc!{ PHC: &account.phc };
    if let Some(changed_at) = account.password_changed_at {
        set.insert(PASSWORD_CHANGED_AT, changed_at);
    }

    let update = doc!{
        "$set": set,
        "$unset": { RESET_TOKEN_HASH: "", RESET_EXPIRES_AT: "" }
    };

    let result = db.collection::<Document>(ACCOUNTS).update_one(filter, update, None).await?;

    Ok(result.matched_count == 1)
}

///
/// Store a freshly issued reset token (hash and expiry together - the pair is
/// never half-written).
///
pub async fn store_reset_token(account: &Account, db: &Database) -> Result<(), WardenError> {

    let (token_hash, expires_at) = match (&account.reset_token_hash, account.reset_expires_at) {
        (Some(token_hash), Some(expires_at)) => (token_hash, expires_at),
        _ => return Err(ErrorCode::BSONFieldNotFound
            .with_msg("The account has no reset token to store")),
    };

    let filter = doc!{ ACCOUNT_ID: &account.account_id };

    let update = doc!{
        "$set": { RESET_TOKEN_HASH: token_hash, RESET_EXPIRES_AT: expires_at }
    };

    db.collection::<Document>(ACCOUNTS).update_one(filter, update, None).await?;

    Ok(())
}

///
/// Remove an expired or superseded reset token. The filter pins the hash so a
/// concurrent re-issue is never clobbered by a late clear.
///
pub async fn clear_reset_token(account_id: &str, token_hash: &str, db: &Database)
    -> Result<(), WardenError> {

    let filter = doc!{ ACCOUNT_ID: account_id, RESET_TOKEN_HASH: token_hash };

    let update = doc!{ "$unset": { RESET_TOKEN_HASH: "", RESET_EXPIRES_AT: "" } };

    db.collection::<Document>(ACCOUNTS).update_one(filter, update, None).await?;

    Ok(())
}

///
/// Soft delete: flag and stamp, erase nothing.
///
pub async fn deactivate(ctx: &ServiceContext, account_id: &str) -> Result<(), WardenError> {

    let filter = doc!{ ACCOUNT_ID: account_id };

    let update = doc!{
        "$set": { ACTIVE: false, DELETED_AT: bson::DateTime::from_chrono(ctx.now()) }
    };

    ctx.db().collection::<Document>(ACCOUNTS).update_one(filter, update, None).await?;

    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_filter_excludes_only_the_explicitly_deactivated() {
        // Accounts written before the flag existed have no 'active' field at
        // all - $ne keeps them visible. Only active: false is filtered out.
        assert_eq!(active_filter(), doc!{ "active": { "$ne": false } });
    }

    #[test]
    fn test_scoped_lookup_carries_both_predicates() {
        let filter = scoped(doc!{ "email": "player@example.com" });
        assert_eq!(filter.get_str("email").unwrap(), "player@example.com");
        assert!(filter.get_document("active").is_ok());
    }
}
