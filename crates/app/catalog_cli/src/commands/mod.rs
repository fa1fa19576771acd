pub mod hashpw;
pub mod login;
pub mod logout;
pub mod whoami;

use std::io::BufRead;

use catalog_api_client::{AuthClient, ClientConfig, CredentialStore};

use crate::{Error, Result};

pub(crate) fn client(config: ClientConfig) -> Result<AuthClient> {
    let store = CredentialStore::from_default_location()?;
    Ok(AuthClient::new(store, config)?)
}

/// First line of stdin without its line ending.
pub(crate) fn read_stdin_line() -> Result<String> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let line = line.trim_end_matches(['\r', '\n']).to_string();
    if line.is_empty() {
        return Err(Error::Custom("no password on stdin".into()));
    }
    Ok(line)
}
