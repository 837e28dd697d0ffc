use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::utils;

///
/// An account document in the Accounts collection.
///
/// The phc, active and reset fields are credential state and must never reach
/// a caller-facing serialisation - expose an AccountView instead.
///
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Account {
    pub account_id: String,
    pub email: String,
    pub phc: String,
    pub password_changed_at: Option<bson::DateTime>,
    pub reset_token_hash: Option<String>,
    pub reset_expires_at: Option<bson::DateTime>,
    pub active: bool,
    pub deleted_at: Option<bson::DateTime>,
    pub created_at: bson::DateTime,
}

impl Account {
    ///
    /// A new, usable account - the password must already be hashed.
    ///
    /// The email is the login key and is case-normalised here, once, so every
    /// later lookup can compare verbatim.
    ///
    pub fn new(email: &str, phc: &str, now: DateTime<Utc>) -> Self {
        Account {
            account_id: utils::generate_id(),
            email: normalise_email(email),
            phc: phc.to_string(),
            password_changed_at: None, // Registration is not a change.
            reset_token_hash: None,
            reset_expires_at: None,
            active: true,
            deleted_at: None,
            created_at: bson::DateTime::from_chrono(now),
        }
    }

    ///
    /// True if the password was changed after the given token was issued.
    ///
    /// Used by the authorisation layer to reject tokens that pre-date the last
    /// password change. An account whose password never changed cannot have
    /// stale tokens, so the answer is false.
    ///
    pub fn changed_after(&self, token_issued_at: DateTime<Utc>) -> bool {
        match self.password_changed_at {
            Some(changed_at) => token_issued_at < changed_at.to_chrono(),
            None => false,
        }
    }

    ///
    /// Soft delete. The record stays put for referential integrity (past game
    /// sessions etc.) but drops out of every filtered lookup.
    ///
    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        self.active = false;
        self.deleted_at = Some(bson::DateTime::from_chrono(now));
    }
}

pub fn normalise_email(email: &str) -> String {
    email.trim().to_lowercase()
}

///
/// The read model handed back to callers - never carries the stored hash, the
/// reset fields or the soft-delete marker.
///
#[derive(Clone, Debug, Serialize)]
pub struct AccountView {
    pub account_id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        AccountView {
            account_id: account.account_id.clone(),
            email: account.email.clone(),
            created_at: account.created_at.to_chrono(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn test_account() -> Account {
        Account::new("someone@example.com", "$2b$04$fakefakefakefakefakefake", Utc::now())
    }

    #[test]
    fn test_email_is_case_normalised() {
        let account = Account::new("  Someone@Example.COM ", "phc", Utc::now());
        assert_eq!(account.email, "someone@example.com");
    }

    #[test]
    fn test_new_account_has_no_change_history_and_no_reset() {
        let account = test_account();
        assert!(account.password_changed_at.is_none());
        assert!(account.reset_token_hash.is_none());
        assert!(account.reset_expires_at.is_none());
        assert!(account.active);
        assert!(account.deleted_at.is_none());
    }

    #[test]
    fn test_changed_after_is_false_when_never_changed() {
        let account = test_account();
        assert_eq!(account.changed_after(Utc::now()), false);
    }

    #[test]
    fn test_changed_after_compares_against_the_recorded_instant() {
        let mut account = test_account();
        let changed_at = "2021-08-23T09:30:00Z".parse::<DateTime<Utc>>().unwrap();
        account.password_changed_at = Some(bson::DateTime::from_chrono(changed_at));

        assert_eq!(account.changed_after(changed_at - chrono::Duration::seconds(1)), true);
        assert_eq!(account.changed_after(changed_at), false);
        assert_eq!(account.changed_after(changed_at + chrono::Duration::seconds(1)), false);
    }

    #[test]
    fn test_deactivate_marks_but_does_not_erase() {
        let mut account = test_account();
        let now = Utc::now();

        account.deactivate(now);

        assert_eq!(account.active, false);
        assert!(account.deleted_at.is_some());
        assert!(!account.phc.is_empty()); // Nothing else is touched.
    }

    #[test]
    fn test_view_excludes_the_secret_fields() {
        let account = test_account();
        let view = AccountView::from(&account);

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("phc").is_none());
        assert!(json.get("active").is_none());
        assert!(json.get("reset_token_hash").is_none());
        assert!(json.get("reset_expires_at").is_none());
        assert_eq!(json.get("email").unwrap(), "someone@example.com");
    }
}
