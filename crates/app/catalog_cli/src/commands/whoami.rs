use catalog_api_client::ClientConfig;

use super::client;
use crate::Result;

pub async fn run(config: ClientConfig) -> Result<()> {
    let me = client(config)?.whoami().await?;

    println!("Server  : {}", me.server_url);
    println!("User ID : {}", me.user.id);
    println!("Username: {}", me.user.username);
    println!("Name    : {}", me.user.name);
    Ok(())
}
