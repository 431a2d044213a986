use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use taskstream_api::ApiClient;
use taskstream_core::{Credential, SessionId, TaskstreamConfig, VisitorId};
use taskstream_sessions::ChatController;
use taskstream_transport::HttpTransport;

mod cli;
mod render;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries chat output only
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "taskstream_cli=info,taskstream_sessions=info,taskstream_transport=info,taskstream_api=info".into()
            }),
        )
        .init();

    let cli = Cli::parse();

    // load config: --config > TASKSTREAM_CONFIG env > ~/.taskstream/taskstream.toml
    let config_path = cli
        .config
        .clone()
        .or_else(|| std::env::var("TASKSTREAM_CONFIG").ok());
    let mut config = TaskstreamConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        warn!(code = e.code(), "Config load failed ({}), using defaults", e);
        TaskstreamConfig::default()
    });
    if let Some(base_url) = &cli.base_url {
        config.api.base_url = base_url.clone();
    }

    let credential = match (&cli.token, &cli.visitor) {
        (Some(token), _) => Some(Credential::Bearer(token.clone())),
        (None, Some(visitor)) => Some(Credential::Visitor(VisitorId::from(visitor))),
        (None, None) => config.auth.credential(),
    };

    match cli.command {
        Commands::Run { session, task } => {
            let controller = controller(&config, &session, credential)?;
            let events = controller.subscribe();
            let handle = controller
                .send_task(&task.join(" "))
                .context("could not start task")?;
            render::follow(&controller, handle, events).await
        }
        Commands::Report {
            session,
            spec,
            template,
        } => {
            let template = match template {
                Some(path) => Some(
                    tokio::fs::read_to_string(&path)
                        .await
                        .with_context(|| format!("reading template {}", path.display()))?,
                ),
                None => None,
            };
            let controller = controller(&config, &session, credential)?;
            let events = controller.subscribe();
            let handle = controller
                .send_report_task(&spec, template.as_deref())
                .context("could not start report")?;
            render::follow(&controller, handle, events).await
        }
        Commands::Sessions { page, per_page } => {
            let api = ApiClient::new(config.api.clone(), credential)?;
            let listing = api.list_sessions(page, per_page).await?;
            for s in &listing.data {
                println!("{}\t{}", s.session_id, s.name.as_deref().unwrap_or("(unnamed)"));
            }
            info!(shown = listing.data.len(), total = listing.total, "sessions listed");
            Ok(())
        }
    }
}

fn controller(
    config: &TaskstreamConfig,
    session: &str,
    credential: Option<Credential>,
) -> anyhow::Result<ChatController> {
    let transport = HttpTransport::new(Duration::from_secs(config.api.connect_timeout_secs))?;
    Ok(
        ChatController::new(SessionId::from(session), Arc::new(transport), config)
            .with_credential(credential),
    )
}
