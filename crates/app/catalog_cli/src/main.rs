// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

use std::time::Duration;

use catalog_api_client::ClientConfig;
use clap::Parser;
use cli::{Cli, Commands};

mod cli;
mod commands;
mod logging;

fn main() -> Result<()> {
    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<()> {
    logging::init()?;

    let args = Cli::parse();
    let config = ClientConfig {
        timeout: Duration::from_secs(args.timeout),
        ..ClientConfig::default()
    };

    match &args.command {
        Commands::Login(login) => block_on(commands::login::run(login, config)),
        Commands::Logout => block_on(commands::logout::run(config)),
        Commands::Whoami => block_on(commands::whoami::run(config)),
        Commands::Hashpw(hashpw) => commands::hashpw::run(hashpw),
        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn block_on<F: std::future::Future<Output = Result<()>>>(future: F) -> Result<()> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(future)
}
