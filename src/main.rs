//! Montage CLI
//!
//! Command-line access to the Montage video editor API: log in, list
//! projects and assets, and upload videos in chunks.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use montage_client::api::LoginRequest;
use montage_client::http::{ApiClient, LogErrors, TokenStore};
use montage_client::upload::{self, ProjectId, UploadableFile};
use montage_client::Config;

#[derive(Parser, Debug)]
#[command(name = "montage", version)]
#[command(about = "Montage video editor API client")]
struct Cli {
    /// API base URL (overrides MONTAGE_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Bearer token (overrides MONTAGE_API_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and print the access token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// List your projects
    Projects,

    /// List the assets of a project
    Assets {
        #[arg(long)]
        project: u64,
    },

    /// List the edit history of a project
    History {
        #[arg(long)]
        project: u64,
    },

    /// Upload a video to a project in chunks
    Upload {
        #[arg(long)]
        project: u64,

        /// Video file to upload
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "montage_client=info,montage=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = Config::from_env().context("Invalid configuration")?;
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }
    if let Some(token) = cli.token {
        config.api.token = Some(token);
    }

    let tokens = TokenStore::new();
    if let Some(token) = &config.api.token {
        tokens.set(token.clone());
    }

    let client = ApiClient::builder_from_config(&config.api)
        .credentials(tokens)
        .error_observer(LogErrors)
        .build()
        .context("Failed to build HTTP client")?;

    tracing::debug!(base_url = %client.base_url(), "Using API");

    match cli.command {
        Command::Login { email, password } => {
            let response = client
                .login(&LoginRequest { email, password })
                .await
                .context("Login failed")?;
            println!("{}", response.token);
        }
        Command::Projects => {
            let projects = client.list_projects().await.context("Failed to list projects")?;
            print_json(&projects)?;
        }
        Command::Assets { project } => {
            let assets = client
                .list_assets(ProjectId(project))
                .await
                .context("Failed to list assets")?;
            print_json(&assets)?;
        }
        Command::History { project } => {
            let history = client
                .list_history(ProjectId(project))
                .await
                .context("Failed to list history")?;
            print_json(&history)?;
        }
        Command::Upload { project, path } => {
            let file = UploadableFile::from_path(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;

            let report = |fraction: f64| {
                tracing::info!(progress = %format!("{:.1}%", fraction * 100.0), "Uploading");
            };

            let asset = upload::upload(
                &client,
                Some(ProjectId(project)),
                Some(&file),
                &config.upload,
                Some(&report),
            )
            .await
            .with_context(|| format!("Upload of {} failed", path.display()))?;

            print_json(&asset)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
