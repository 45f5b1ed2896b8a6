pub mod api;
pub mod cli;
pub mod clients;
pub mod config;
pub mod constants;
pub mod db;
pub mod domain;
pub mod entities;
pub mod library;
pub mod models;
pub mod parser;
pub mod quality;
pub mod scheduler;
pub mod services;
pub mod state;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands, IndexerCommands};
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub use config::Config;
use scheduler::Scheduler;
use state::SharedState;

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    run_with_config(config).await
}

pub async fn run_with_config(config: Config) -> anyhow::Result<()> {
    config.validate()?;

    let prometheus_handle = init_prometheus(&config)?;
    init_logging(&config)?;

    let cli = Cli::parse();
    execute_command(cli, config, prometheus_handle).await
}

fn init_prometheus(
    config: &Config,
) -> anyhow::Result<Option<metrics_exporter_prometheus::PrometheusHandle>> {
    if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Ok(Some(handle))
    } else {
        Ok(None)
    }
}

fn init_logging(config: &Config) -> anyhow::Result<()> {
    let mut log_level = config.general.log_level.clone();
    if config.general.suppress_connection_errors {
        log_level.push_str(",reqwest::retry=off,hyper_util=off");
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    let use_json = config.observability.loki_enabled
        || std::env::var("LOG_FORMAT").unwrap_or_default() == "json";

    if use_json {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false);

        if config.observability.loki_enabled {
            let url =
                url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

            let (loki_layer, task) = tracing_loki::builder()
                .label("app", "mediarr")?
                .extra_field("env", "production")?
                .extra_field("version", env!("CARGO_PKG_VERSION"))?
                .build_url(url)?;

            tokio::spawn(task);
            registry.with(fmt_layer).with(loki_layer).init();
            info!(
                "Loki logging initialized at {}",
                config.observability.loki_url
            );
        } else {
            registry.with(fmt_layer).init();
        }
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer().pretty();
        registry.with(fmt_layer).init();
    }
    Ok(())
}

async fn execute_command(
    cli: Cli,
    config: Config,
    prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
) -> anyhow::Result<()> {
    match cli.command {
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
            Ok(())
        }

        Some(Commands::Daemon) => run_daemon(config, prometheus_handle).await,

        Some(Commands::Check) => run_single_check(config).await,

        Some(Commands::Init) => {
            Config::create_default_if_missing()?;
            println!("Config file created. Edit config.toml and run again.");
            Ok(())
        }

        Some(Commands::Web) => {
            info!("Starting web server only mode...");
            let api_state =
                api::create_app_state_from_config(config.clone(), prometheus_handle).await?;
            let port = config.server.port;
            info!("Starting Web API on port {}", port);

            let app = api::router(api_state).await;
            let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
            axum::serve(listener, app).await?;
            Ok(())
        }

        Some(Commands::Scan { library }) => cli::cmd_scan(&config, library).await,

        Some(Commands::Search { query }) => cli::cmd_search(&config, &query.join(" ")).await,

        Some(Commands::Movies) => cli::cmd_list_movies(&config).await,
        Some(Commands::Shows) => cli::cmd_list_shows(&config).await,
        Some(Commands::Music) => cli::cmd_list_music(&config).await,
        Some(Commands::Books) => cli::cmd_list_books(&config).await,

        Some(Commands::Downloads) => cli::cmd_list_downloads(&config).await,
        Some(Commands::Import { download_id }) => cli::cmd_import(&config, download_id).await,
        Some(Commands::QualityPresets) => cli::cmd_quality_list(&config).await,

        Some(Commands::Indexer { command }) => match command {
            IndexerCommands::Add {
                name,
                indexer_type,
                url,
                api_key,
                categories,
                priority,
            } => {
                cli::cmd_indexer_add(&config, &name, &indexer_type, &url, api_key, categories, priority)
                    .await
            }
            IndexerCommands::List => cli::cmd_indexer_list(&config).await,
            IndexerCommands::Remove { id } => cli::cmd_indexer_remove(&config, id).await,
            IndexerCommands::Toggle { id, enabled } => {
                cli::cmd_indexer_toggle(&config, id, enabled).await
            }
            IndexerCommands::Test { id } => cli::cmd_indexer_test(&config, id).await,
        },

        Some(Commands::UpgradePause { id, paused }) => {
            cli::cmd_set_upgrade_paused(&config, id, paused).await
        }
        Some(Commands::UpgradeReset { id }) => cli::cmd_reset_upgrade(&config, id).await,
    }
}

async fn run_daemon(
    config: Config,
    prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
) -> anyhow::Result<()> {
    info!(
        "mediarr v{} starting in daemon mode...",
        env!("CARGO_PKG_VERSION")
    );

    let shared = Arc::new(SharedState::new(config.clone()).await?);

    let api_state = api::create_app_state(Arc::clone(&shared), prometheus_handle).await?;

    let scheduler = Scheduler::new(Arc::clone(&shared), config.scheduler.clone());
    let cancellation = CancellationToken::new();

    let scheduler_handle = {
        let sched_cancel = cancellation.clone();
        tokio::spawn(async move {
            if let Err(e) = scheduler.start(sched_cancel).await {
                error!("Scheduler error: {}", e);
            }
        })
    };

    let server_handle: Option<tokio::task::JoinHandle<()>> = if config.server.enabled {
        let port = config.server.port;
        info!("Starting Web API on port {}", port);

        let app = api::router(api_state).await;
        let addr = format!("0.0.0.0:{port}");
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        Some(tokio::spawn(async move {
            info!("Web server running at http://0.0.0.0:{}", port);
            if let Err(e) = axum::serve(listener, app).await {
                error!("Web server error: {}", e);
            }
        }))
    } else {
        None
    };

    info!("Daemon running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }

    cancellation.cancel();
    let _ = scheduler_handle.await;
    if let Some(handle) = server_handle {
        handle.abort();
    }
    info!("Daemon stopped");

    Ok(())
}

async fn run_single_check(config: Config) -> anyhow::Result<()> {
    info!("Running single check...");

    let shared = Arc::new(SharedState::new(config.clone()).await?);
    let scheduler = Scheduler::new(shared, config.scheduler.clone());

    scheduler.run_once().await?;

    info!("Check complete");
    Ok(())
}
