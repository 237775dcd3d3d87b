//! MongoDB client setup.

use mongodb::options::ClientOptions;
use mongodb::{Client, Database};

use crate::domain::models::DocumentStoreConfig;

/// Build a client for the configured deployment and select its database.
///
/// The driver connects lazily; errors here come from parsing the URI or
/// resolving SRV records, not from the server itself.
pub async fn connect(config: &DocumentStoreConfig) -> mongodb::error::Result<Database> {
    let mut options = ClientOptions::parse(&config.uri).await?;
    if options.app_name.is_none() {
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
    }
    let client = Client::with_options(options)?;

    tracing::debug!(database = %config.database, "document store client ready");
    Ok(client.database(&config.database))
}
