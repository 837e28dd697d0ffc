pub mod db;
pub mod model;
pub mod services;
pub mod utils;

pub use model::account::{Account, AccountView};
pub use model::credentials::{CredentialManager, ResetOutcome};
pub use utils::config::Configuration;
pub use utils::context::ServiceContext;
pub use utils::errors::{ErrorCode, WardenError};

const APP_NAME: &str = "Warden";

///
/// Bootstrap the crate for a hosting service: connect to MongoDB, bring the
/// schema (indexes) up to date and hand back the context every service
/// operation runs against.
///
pub async fn init(config: Configuration) -> Result<ServiceContext, WardenError> {

    // Create a MongoDB client and connect to it before proceeding.
    let db = db::mongo::get_mongo_db(APP_NAME, &config).await?;

    // Ensure the schema is in sync with the code.
    db::mongo::update_mongo(&db).await?;

    Ok(ServiceContext::new(config, db))
}
