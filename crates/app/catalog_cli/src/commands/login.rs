use catalog_api_client::ClientConfig;
use dialoguer::Password;

use super::{client, read_stdin_line};
use crate::cli::LoginArgs;
use crate::{Error, Result};

pub async fn run(args: &LoginArgs, config: ClientConfig) -> Result<()> {
    let password = if args.password_stdin {
        read_stdin_line()?
    } else {
        Password::new().with_prompt("Password").interact()?
    };

    let client = client(config)?;
    let credentials = client
        .login_and_persist(&args.server, &args.username, &password)
        .await
        .map_err(|e| Error::Custom(format!("login failed: {e}")))?;

    println!(
        "Logged in to {} as {}",
        credentials.server_url, args.username
    );
    Ok(())
}
