use mongodb::Database;
use parking_lot::RwLock;
use chrono::{DateTime, Utc};
use crate::model::credentials::CredentialManager;
use crate::utils::{config::Configuration, time_provider::TimeProvider};

///
/// The context is available to every service operation and gives it access to
/// the DB, the credential manager, config and the clock.
///
pub struct ServiceContext {
    db: Database,
    config: Configuration,
    credentials: CredentialManager,
    time_provider: RwLock<TimeProvider>,
}

impl ServiceContext {
    pub fn new(config: Configuration, db: Database) -> Self {
        ServiceContext {
            db,
            credentials: CredentialManager::new(config.bcrypt_cost),
            config,
            time_provider: RwLock::new(TimeProvider::default()),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.time_provider.read().now()
    }

    ///
    /// Set or clear the fixed time - tests use this to step through expiry
    /// windows without sleeping.
    ///
    pub fn set_now(&self, now: Option<DateTime<Utc>>) {
        self.time_provider.write().fix(now);
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn credentials(&self) -> &CredentialManager {
        &self.credentials
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }
}
