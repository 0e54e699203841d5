use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use axum::http::HeaderValue;
use clap::{Parser, Subcommand};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use platform_pulse::api::{build_router, state::AppState};
use platform_pulse::config::AppConfig;
use platform_pulse::fetch::{RawPlatformStats, StaticSource, StatsClient, StatsSource};
use platform_pulse::monitor::PlatformMonitor;
use platform_pulse::notify::NotificationSink;
use platform_pulse::parse_duration;

#[derive(Parser)]
#[command(name = "platform-pulse")]
#[command(about = "Marketing platform performance monitor")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the monitor headless against the campaign backend
    Monitor {
        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,

        /// Poll interval (e.g. "10s", "500ms"); overrides config
        #[arg(long)]
        interval: Option<String>,

        /// Backend base URL; overrides config
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Run the monitor with the REST API server
    Serve {
        /// Bind address; overrides config
        #[arg(long)]
        host: Option<String>,

        /// Port number; overrides config
        #[arg(long)]
        port: Option<u16>,
    },

    /// Replay a scripted ranking shakeup without a backend
    Demo,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting platform-pulse v{}", env!("CARGO_PKG_VERSION"));

    let config_path = PathBuf::from(&cli.config);
    let mut config = if config_path.exists() {
        AppConfig::from_file(&config_path)?
    } else {
        tracing::debug!("No config file at {}, using defaults", cli.config);
        AppConfig::default()
    };

    match cli.command {
        Commands::Monitor {
            once,
            interval,
            base_url,
        } => {
            if let Some(url) = base_url {
                config.backend.base_url = url;
            }
            if let Some(ref s) = interval {
                let duration = parse_duration(s)
                    .ok_or_else(|| anyhow::anyhow!("Invalid --interval: {}", s))?;
                config.monitor.poll_interval_ms = duration.as_millis() as u64;
            }
            config.validate()?;

            let source: Arc<dyn StatsSource> = Arc::new(StatsClient::new(&config.backend)?);
            let monitor = Arc::new(PlatformMonitor::new(
                config.monitor,
                source,
                NotificationSink::new(),
            ));

            if once {
                monitor.force_check().await;
                print_feed(&monitor).await;
                return Ok(());
            }

            monitor.clone().start().await;
            tokio::signal::ctrl_c().await?;
            monitor.stop().await;
        }

        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;

            let source: Arc<dyn StatsSource> = Arc::new(StatsClient::new(&config.backend)?);
            let monitor = Arc::new(PlatformMonitor::new(
                config.monitor.clone(),
                source,
                NotificationSink::new(),
            ));
            monitor.clone().start().await;

            let cors = if config.server.cors_origin == "*" {
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any)
            } else {
                let origin: HeaderValue = config.server.cors_origin.parse()?;
                CorsLayer::new()
                    .allow_origin(origin)
                    .allow_methods(Any)
                    .allow_headers(Any)
            };

            let app = build_router(AppState::new(monitor.clone()))
                .layer(cors)
                .layer(TraceLayer::new_for_http());

            let addr = format!("{}:{}", config.server.host, config.server.port);
            tracing::info!("Serving API on http://{}", addr);

            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = tokio::signal::ctrl_c().await;
                })
                .await?;

            monitor.stop().await;
        }

        Commands::Demo => {
            let cycles = vec![
                vec![
                    RawPlatformStats::new("Instagram", 1200.0, 45000.0, 90.0, 2.4),
                    RawPlatformStats::new("Facebook", 980.0, 38000.0, 70.0, 1.9),
                    RawPlatformStats::new("Twitter", 640.0, 22000.0, 35.0, 1.2),
                ],
                vec![
                    RawPlatformStats::new("Instagram", 1150.0, 44000.0, 85.0, 2.3),
                    RawPlatformStats::new("Facebook", 1400.0, 52000.0, 120.0, 2.8),
                    RawPlatformStats::new("Twitter", 700.0, 26000.0, 50.0, 1.5),
                ],
            ];

            let monitor = Arc::new(PlatformMonitor::new(
                config.monitor,
                Arc::new(StaticSource::new(cycles)),
                NotificationSink::new(),
            ));

            println!("Cycle 1: establishing baseline");
            monitor.force_check().await;
            println!("Cycle 2: Facebook takes the lead");
            monitor.force_check().await;
            println!("Forced shakeup: bottom platform promoted");
            monitor.force_ranking_change().await;

            print_feed(&monitor).await;
        }
    }

    Ok(())
}

async fn print_feed(monitor: &Arc<PlatformMonitor>) {
    println!("\nRankings:");
    for (idx, snap) in monitor.rankings().await.iter().enumerate() {
        println!(
            "  {}. {} ({:.0} pts)",
            idx + 1,
            snap.platform,
            snap.total_score
        );
    }

    println!("\nNotifications:");
    let history = monitor.sink().history().await;
    if history.is_empty() {
        println!("  (none)");
    }
    for n in &history {
        println!("  [{}] {}", n.timestamp, n.message);
    }
}
