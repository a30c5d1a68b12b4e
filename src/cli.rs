use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "designmart")]
#[command(about = "Command-line client for the design marketplace API", long_about = None)]
pub struct Args {
    #[arg(
        long = "api-url",
        global = true,
        help = "API base URL (e.g., http://localhost:5000)"
    )]
    pub api_url: Option<String>,

    #[arg(
        long = "session-file",
        global = true,
        help = "Where the login session is kept"
    )]
    pub session_file: Option<PathBuf>,

    #[arg(short = 'v', long = "verbose", global = true, help = "Log requests and token renewals")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in with email and password
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "DESIGNMART_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Finish sign-up with the token from the verification email
    Register {
        token: String,
    },
    /// Log out and forget the local session
    Logout,
    /// Show the local session
    Status,
    /// Fetch the current user's profile from the server
    Whoami,
    /// Force a silent token refresh
    Refresh,
    /// GET an API path through the session gateway
    Get {
        path: String,
        #[arg(short, long = "query", value_parser = parse_key_value, help = "Query parameter as key=value")]
        query: Vec<(String, String)>,
    },
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))
}
