use clap::Parser;
use std::process;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use designmart::api::endpoints;
use designmart::cli::{Args, Command};
use designmart::config::Config;
use designmart::models::LoginData;
use designmart::ui::{display_error, display_json, display_session, display_success};
use designmart::{
    ApiRequest, AuthClient, FilesystemSessionStore, GatewayError, RefreshOutcome,
    ReqwestTransport, SessionGateway,
};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match Config::from_env_and_args(&args) {
        Ok(config) => config,
        Err(e) => {
            display_error(&format!("{:#}", e));
            process::exit(1);
        }
    };

    let default_level = if config.verbose { "designmart=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(args, config).await {
        display_error(&e.to_string());
        process::exit(1);
    }
}

async fn run(args: Args, config: Config) -> Result<(), GatewayError> {
    let Some(command) = args.command else {
        display_error("no command given, see --help");
        process::exit(1);
    };

    let store = Arc::new(FilesystemSessionStore::open(config.session_file.clone())?);
    let transport = Arc::new(ReqwestTransport::new(&config.api_url)?);
    let gateway = SessionGateway::new(transport, store.clone()).with_timeout(config.timeout);
    let auth = AuthClient::new(&gateway);

    tracing::debug!(api_url = %config.api_url, session_file = %store.path().display(), "client ready");

    match command {
        Command::Login { email, password } => {
            let user = auth.login(&LoginData { email, password }).await?;
            display_success(&format!("Logged in as {} ({})", user.name, user.role));
        }
        Command::Register { token } => {
            let user = auth.register_user(&token).await?;
            display_success(&format!("Welcome, {}", user.name));
        }
        Command::Logout => {
            auth.logout().await?;
            display_success("Logged out");
        }
        Command::Status => {
            display_session(&gateway.session(), store.updated_at());
        }
        Command::Whoami => {
            if !gateway.is_authenticated() {
                return Err(GatewayError::NotAuthenticated);
            }
            let profile = auth.current_user().await?;
            display_json(&profile);
        }
        Command::Refresh => match gateway.refresh_silently().await {
            RefreshOutcome::Renewed(_) => display_success("Access token renewed"),
            RefreshOutcome::Rejected => {
                return Err(GatewayError::Other(
                    "Session expired, please log in again".to_string(),
                ))
            }
        },
        Command::Get { path, query } => {
            let path = api_path(path);
            let request = query
                .into_iter()
                .fold(ApiRequest::get(path), |request, (key, value)| {
                    request.with_query(key, value)
                });
            let response = gateway.send(&request).await?;
            display_json(&response.body);
        }
    }

    Ok(())
}

/// Bare resource paths are taken relative to the API version prefix
fn api_path(path: String) -> String {
    if path.starts_with('/') || path.starts_with("http://") || path.starts_with("https://") {
        path
    } else {
        format!("{}/{}", endpoints::API_VERSION, path)
    }
}
