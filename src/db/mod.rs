pub mod account;
pub mod mongo;

pub mod prelude {
    // Collection names.
    pub const ACCOUNTS: &str = "Accounts";

    // Field names.
    pub const ACCOUNT_ID:          &str = "account_id";
    pub const ACTIVE:              &str = "active";
    pub const CREATED_AT:          &str = "created_at";
    pub const DELETED_AT:          &str = "deleted_at";
    pub const EMAIL:               &str = "email";
    pub const PASSWORD_CHANGED_AT: &str = "password_changed_at";
    pub const PHC:                 &str = "phc";
    pub const RESET_EXPIRES_AT:    &str = "reset_expires_at";
    pub const RESET_TOKEN_HASH:    &str = "reset_token_hash";
}
