//! # Taskboard CLI
//!
//! Command-line front end for the Taskboard client core. Every invocation
//! loads configuration, runs the bootstrap (CSRF token, stored session
//! check) and then executes one command.
//!
//! ## Usage
//!
//! ```bash
//! TASKBOARD_API__BASE_URL=http://localhost:3000/api taskboard login --username ada
//! taskboard tasks list 4
//! RUST_LOG=taskboard_client=debug taskboard tasks status 12 done
//! ```

use clap::Parser;
use taskboard_client::{app::App, cli, config::Config};
use taskboard_shared::session::SessionEvent;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard_client=info,taskboard_shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = cli::Cli::parse();

    let config = match &args.config {
        Some(path) => {
            dotenvy::dotenv().ok();
            Config::load(Some(path))?
        }
        None => Config::from_env()?,
    };

    tracing::debug!(
        base_url = %config.api.base_url,
        "Taskboard CLI v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let app = App::new(config)?;

    let mut events = app.session.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let SessionEvent::Unauthorized { reason } = event {
                eprintln!("Session expired ({}). Run `taskboard login` to sign in again.", reason);
            }
        }
    });

    let outcome = app.bootstrap().await;
    tracing::debug!(authenticated = outcome.is_authenticated(), "Bootstrap finished");

    if let Err(e) = cli::run(&app, args.command).await {
        match e.downcast_ref::<taskboard_client::error::ClientError>() {
            Some(client_error) => eprintln!("Error: {}", client_error.user_message()),
            None => eprintln!("Error: {}", e),
        }
        std::process::exit(1);
    }

    Ok(())
}
