use clap::{Args, Parser, Subcommand};

use catalog_core::auth::password::DEFAULT_COST;

#[derive(Parser)]
#[command(name = "catalog", version, about = "Catalog API command line client")]
pub struct Cli {
    /// Per-request timeout in seconds
    #[arg(long, global = true, env = "CATALOG_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store credentials locally
    Login(LoginArgs),
    /// End the session on the server and remove local credentials
    Logout,
    /// Show the user the stored credentials belong to
    Whoami,
    /// Hash a password for the server's user file
    Hashpw(HashpwArgs),
    /// Print version information
    Version,
}

#[derive(Args)]
pub struct LoginArgs {
    /// Server base URL, e.g. https://catalog.example.com
    #[arg(long, env = "CATALOG_SERVER")]
    pub server: String,

    #[arg(long, short)]
    pub username: String,

    /// Read the password from the first line of stdin
    #[arg(long)]
    pub password_stdin: bool,
}

#[derive(Args)]
pub struct HashpwArgs {
    /// bcrypt cost (4..=31)
    #[arg(long, default_value_t = DEFAULT_COST)]
    pub cost: u32,

    /// Read the password from the first line of stdin
    #[arg(long)]
    pub stdin: bool,

    /// Skip the confirmation prompt
    #[arg(long)]
    pub no_confirm: bool,
}
