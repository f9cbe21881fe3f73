//! Livechart - browser-based live chart of synthetic data
//!
//! `livechart serve` starts the HTTP server; open the printed address in a
//! browser. `livechart sample` runs ticks headlessly and prints the chart.

use clap::{Parser, Subcommand};
use livechart_core::{
    api::ApiServer,
    error::Result,
    ControlEvent, Dashboard, Mode, SampleGenerator, Settings,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(name = "livechart")]
#[command(about = "Browser-based live chart of synthetic data", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Set log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// TOML settings file (values are overridden by LIVECHART_* env vars and flags)
    #[arg(short, long, env = "LIVECHART_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard (default)
    Serve {
        /// Server address
        #[arg(long)]
        addr: Option<SocketAddr>,

        /// Samples kept on screen
        #[arg(long)]
        max_points: Option<usize>,

        /// Initial update interval in milliseconds (500-5000, step 500)
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Seed for the random walk
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run ticks without a browser and print the final chart as JSON
    Sample {
        /// Number of ticks
        #[arg(short, long, default_value = "60")]
        ticks: u64,

        /// Data source: random or sine
        #[arg(short, long, default_value = "random")]
        mode: String,

        /// Seed for the random walk
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Use the requested level for our crates, keep HTTP tracing at info unless asked
    let filter = EnvFilter::new(format!(
        "livechart={level},livechart_core={level},tower_http={http}",
        level = level.as_str().to_lowercase(),
        http = if level >= Level::DEBUG { "debug" } else { "info" },
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // Write logs to stderr, not stdout
        .init();

    debug!("Livechart v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        None => serve(settings).await,
        Some(Commands::Serve {
            addr,
            max_points,
            interval_ms,
            seed,
        }) => {
            if let Some(addr) = addr {
                settings.addr = addr;
            }
            if let Some(max_points) = max_points {
                settings.max_points = max_points;
            }
            if let Some(interval_ms) = interval_ms {
                settings.interval_ms = interval_ms;
            }
            if seed.is_some() {
                settings.seed = seed;
            }
            settings.validate()?;
            serve(settings).await
        }
        Some(Commands::Sample { ticks, mode, seed }) => {
            let generator = match seed.or(settings.seed) {
                Some(seed) => SampleGenerator::with_seed(seed),
                None => SampleGenerator::new(),
            };
            let mut dashboard = Dashboard::new(settings.max_points, settings.interval()?, generator);

            dashboard.dispatch(ControlEvent::ModeChanged(Mode::from_control_value(&mode)));
            for n_intervals in 0..ticks {
                dashboard.dispatch(ControlEvent::Tick { n_intervals });
            }

            println!("{}", serde_json::to_string_pretty(&dashboard.chart())?);
            Ok(())
        }
    }
}

async fn serve(settings: Settings) -> Result<()> {
    let server = ApiServer::new(&settings)?;
    let (listener, addr) = server.bind().await?;

    println!();
    println!("📈 Livechart");
    println!("   Address: http://{}", addr);
    println!("   Points kept: {}", settings.max_points);
    println!("   Update interval: {} ms", settings.interval_ms);
    println!();
    println!("   Endpoints:");
    println!("   • GET  /              - Dashboard page");
    println!("   • POST /api/tick      - Append one sample");
    println!("   • POST /api/mode      - Select data source");
    println!("   • POST /api/interval  - Select update interval");
    println!("   • GET  /api/chart     - Current chart");
    println!("   • GET  /api/controls  - Current controls");
    println!("   • GET  /events        - Server-Sent Events stream");
    println!("   • GET  /health        - Health check");
    println!();

    server.serve_with_listener(listener).await
}
