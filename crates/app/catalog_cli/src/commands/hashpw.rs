use catalog_core::auth::password;
use dialoguer::Password;

use super::read_stdin_line;
use crate::cli::HashpwArgs;
use crate::{Error, Result};

pub fn run(args: &HashpwArgs) -> Result<()> {
    password::validate_cost(args.cost)?;

    let plain = if args.stdin {
        read_stdin_line()?
    } else {
        let mut prompt = Password::new().with_prompt("Password");
        if !args.no_confirm {
            prompt = prompt.with_confirmation("Confirm password", "Passwords do not match");
        }
        prompt.interact()?
    };
    if plain.is_empty() {
        return Err(Error::Custom("password must not be empty".into()));
    }

    println!("{}", password::hash_password(&plain, args.cost)?);
    Ok(())
}
