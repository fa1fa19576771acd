use catalog_api_client::{ClientConfig, ClientError};
use log::warn;

use super::client;
use crate::Result;

pub async fn run(config: ClientConfig) -> Result<()> {
    let client = client(config)?;
    let outcome = match client.logout_and_forget().await {
        Ok(outcome) => outcome,
        Err(ClientError::NotLoggedIn) => {
            println!("Not logged in.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(reason) = &outcome.warning {
        warn!("logout failed: {reason}. Removed local credentials anyway.");
    }
    match outcome.server_url {
        Some(server) => println!("Logged out of {server}"),
        None => println!("Logged out"),
    }
    Ok(())
}
