use derive_more::Display;
use rand::rngs::OsRng;
use rand_core::RngCore;
use sha2::{Digest, Sha256};
use chrono::{DateTime, Duration, Utc};
use crate::model::account::Account;
use crate::model::hasher::{self, Hasher};
use crate::utils::errors::WardenError;

// 256 bits of entropy - the plain token is only ever returned to the caller,
// never stored.
const RESET_TOKEN_BYTES: usize = 32;

// A reset token is consumable for a fixed window from issuance.
pub const RESET_WINDOW_MINUTES: i64 = 10;

// The change timestamp is backdated by this much. A session token minted in
// the same instant as the change must compare against the change consistently,
// not flap on sub-second ordering.
const CHANGE_STAMP_SKEW_SECONDS: i64 = 1;

///
/// The outcome of attempting to consume a reset token. A mismatch is a normal
/// negative result, not an error.
///
#[derive(Clone, Copy, Debug, Display, PartialEq)]
pub enum ResetOutcome {
    Accepted,
    Invalid,
    Expired,
}

///
/// Owns the account credential lifecycle: hashing, verification, change
/// stamping and reset tokens.
///
/// Operates on an Account in memory - persistence is the db layer's concern,
/// and "now" is always passed in so every rule is testable on a fixed clock.
///
#[derive(Clone, Copy, Debug)]
pub struct CredentialManager {
    hasher: Hasher,
}

impl Default for CredentialManager {
    fn default() -> Self {
        CredentialManager { hasher: Hasher::default() }
    }
}

impl CredentialManager {
    pub fn new(cost: u32) -> Self {
        CredentialManager { hasher: Hasher::new(cost) }
    }

    ///
    /// Hash a plain text password into a PHC string with a fresh salt.
    ///
    /// The plain text is dropped with the call frame - nothing here retains it.
    ///
    pub fn hash_password(&self, plain_text_password: &str) -> Result<String, WardenError> {
        self.hasher.hash_into_phc(plain_text_password)
    }

    ///
    /// Check a plain text password against a stored PHC string.
    ///
    /// Uses the algorithm's own comparison, never raw byte equality. False for
    /// a mismatch or a malformed stored hash.
    ///
    pub fn verify_password(plain_text_password: &str, phc: &str) -> bool {
        hasher::verify(plain_text_password, phc)
    }

    ///
    /// Replace the account's password hash and stamp the change.
    ///
    /// The stamp is backdated one second so tokens minted in the same instant
    /// as the change compare consistently against it.
    ///
    pub fn change_password(&self, account: &mut Account, plain_text_password: &str, now: DateTime<Utc>)
        -> Result<(), WardenError> {

        let phc = self.hasher.hash_into_phc(plain_text_password)?;

        account.phc = phc;
        account.password_changed_at = Some(bson::DateTime::from_chrono(
            now - Duration::seconds(CHANGE_STAMP_SKEW_SECONDS)));

        Ok(())
    }

    ///
    /// Mint a reset token for the account and return the plain token - the one
    /// and only time it exists in the clear.
    ///
    /// Only the token's hash and an absolute expiry are put on the account, so
    /// a leaked snapshot of the store cannot complete a reset.
    ///
    pub fn issue_reset_token(&self, account: &mut Account, now: DateTime<Utc>) -> String {
        let mut bytes = [0u8; RESET_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        account.reset_token_hash = Some(hash_reset_token(&token));
        account.reset_expires_at = Some(bson::DateTime::from_chrono(
            now + Duration::minutes(RESET_WINDOW_MINUTES)));

        token
    }

    ///
    /// Attempt to consume the account's outstanding reset token.
    ///
    /// An expired window reports Expired for any candidate and clears the token
    /// fields - a stale token must not linger as consumable state. A mismatch
    /// on a live window reports Invalid and leaves the window open. A match on
    /// a live window reports Accepted and clears the fields: single use.
    ///
    pub fn consume_reset_token(&self, account: &mut Account, candidate: &str, now: DateTime<Utc>)
        -> ResetOutcome {

        let (token_hash, expires_at) = match (&account.reset_token_hash, account.reset_expires_at) {
            (Some(hash), Some(expires_at)) => (hash.clone(), expires_at),
            _ => return ResetOutcome::Invalid, // No reset in progress.
        };

        if now > expires_at.to_chrono() {
            account.reset_token_hash = None;
            account.reset_expires_at = None;
            return ResetOutcome::Expired
        }

        if hash_reset_token(candidate) != token_hash {
            return ResetOutcome::Invalid
        }

        account.reset_token_hash = None;
        account.reset_expires_at = None;
        ResetOutcome::Accepted
    }
}

///
/// One-way hash applied to reset tokens before storage.
///
pub fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}


#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    fn manager() -> CredentialManager {
        CredentialManager::new(TEST_COST)
    }

    fn account_with_password(plain: &str, now: DateTime<Utc>) -> Account {
        let phc = manager().hash_password(plain).unwrap();
        Account::new("player@example.com", &phc, now)
    }

    fn fixed_now() -> DateTime<Utc> {
        "2021-08-23T09:30:00Z".parse().unwrap()
    }

    #[test]
    fn test_hash_verify_round_trip() -> Result<(), WardenError> {
        let phc = manager().hash_password("Secret123!")?;

        assert_eq!(CredentialManager::verify_password("Secret123!", &phc), true);
        assert_eq!(CredentialManager::verify_password("secret123!", &phc), false); // Case matters.
        assert_eq!(CredentialManager::verify_password("Secret123", &phc), false);  // So does the trailing mark.
        Ok(())
    }

    #[test]
    fn test_change_password_rehashes_and_backdates_the_stamp() -> Result<(), WardenError> {
        let now = fixed_now();
        let mut account = account_with_password("OldSecret1!", now);
        let old_phc = account.phc.clone();

        manager().change_password(&mut account, "NewSecret1!", now)?;

        assert_ne!(account.phc, old_phc);
        assert_eq!(CredentialManager::verify_password("NewSecret1!", &account.phc), true);
        assert_eq!(CredentialManager::verify_password("OldSecret1!", &account.phc), false);

        let changed_at = account.password_changed_at.expect("change was not stamped").to_chrono();
        assert_eq!(changed_at, now - Duration::seconds(1));
        Ok(())
    }

    #[test]
    fn test_change_invalidates_tokens_issued_before_it() -> Result<(), WardenError> {
        let now = fixed_now();
        let mut account = account_with_password("OldSecret1!", now);

        manager().change_password(&mut account, "NewSecret1!", now)?;

        // A session token from before the change is stale, one minted at the
        // change instant (or later) is not - that is what the backdated stamp
        // buys us.
        assert_eq!(account.changed_after(now - Duration::seconds(2)), true);
        assert_eq!(account.changed_after(now), false);
        assert_eq!(account.changed_after(now + Duration::minutes(5)), false);
        Ok(())
    }

    #[test]
    fn test_issued_token_is_not_stored_in_the_clear() {
        let now = fixed_now();
        let mut account = account_with_password("Secret123!", now);

        let token = manager().issue_reset_token(&mut account, now);

        let stored = account.reset_token_hash.clone().expect("no token hash stored");
        assert_ne!(stored, token);
        assert_eq!(stored, hash_reset_token(&token));

        let expires_at = account.reset_expires_at.expect("no expiry stored").to_chrono();
        assert_eq!(expires_at, now + Duration::minutes(RESET_WINDOW_MINUTES));
    }

    #[test]
    fn test_token_consumes_exactly_once() {
        let now = fixed_now();
        let mut account = account_with_password("Secret123!", now);
        let token = manager().issue_reset_token(&mut account, now);

        assert_eq!(manager().consume_reset_token(&mut account, &token, now), ResetOutcome::Accepted);
        assert!(account.reset_token_hash.is_none());
        assert!(account.reset_expires_at.is_none());

        // Replays fail - the state was cleared.
        assert_eq!(manager().consume_reset_token(&mut account, &token, now), ResetOutcome::Invalid);
    }

    #[test]
    fn test_mismatch_leaves_the_window_open() {
        let now = fixed_now();
        let mut account = account_with_password("Secret123!", now);
        let token = manager().issue_reset_token(&mut account, now);

        assert_eq!(manager().consume_reset_token(&mut account, "deadbeef", now), ResetOutcome::Invalid);

        // Still pending - the real token remains consumable.
        assert!(account.reset_token_hash.is_some());
        assert_eq!(manager().consume_reset_token(&mut account, &token, now), ResetOutcome::Accepted);
    }

    #[test]
    fn test_expired_token_is_cleared_not_just_rejected() {
        let now = fixed_now();
        let mut account = account_with_password("Secret123!", now);
        let token = manager().issue_reset_token(&mut account, now);

        let late = now + Duration::minutes(RESET_WINDOW_MINUTES) + Duration::seconds(1);
        assert_eq!(manager().consume_reset_token(&mut account, &token, late), ResetOutcome::Expired);
        assert!(account.reset_token_hash.is_none());
        assert!(account.reset_expires_at.is_none());

        // Even the correct token is now Invalid - and a fresh issue works.
        assert_eq!(manager().consume_reset_token(&mut account, &token, late), ResetOutcome::Invalid);
        let fresh = manager().issue_reset_token(&mut account, late);
        assert_eq!(manager().consume_reset_token(&mut account, &fresh, late), ResetOutcome::Accepted);
    }

    #[test]
    fn test_consumption_at_the_exact_expiry_instant_is_accepted() {
        let now = fixed_now();
        let mut account = account_with_password("Secret123!", now);
        let token = manager().issue_reset_token(&mut account, now);

        let at_expiry = now + Duration::minutes(RESET_WINDOW_MINUTES);
        assert_eq!(manager().consume_reset_token(&mut account, &token, at_expiry), ResetOutcome::Accepted);
    }

    #[test]
    fn test_two_issued_tokens_differ() {
        let now = fixed_now();
        let mut first = account_with_password("Secret123!", now);
        let mut second = account_with_password("Secret123!", now);

        let token_a = manager().issue_reset_token(&mut first, now);
        let token_b = manager().issue_reset_token(&mut second, now);

        assert_ne!(token_a, token_b);
        assert_eq!(token_a.len(), RESET_TOKEN_BYTES * 2); // hex
    }
}
