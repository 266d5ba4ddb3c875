//! CLI for streamdash: live streaming-media telemetry.

mod commands;
mod feed;
mod tui;

use clap::{Parser, Subcommand};

use streamdash_core::TimeRange;

#[derive(Parser)]
#[command(name = "streamdash")]
#[command(about = "streamdash: live streaming-media telemetry server and terminal dashboard")]
#[command(version = streamdash_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the telemetry server (/historical backfill and /metrics live feed)
    Server {
        /// Port to listen on
        #[arg(long, default_value = "3000")]
        port: u16,

        /// Bind address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Live terminal dashboard: KPI tiles, charts, health and export.
    /// Keys: t range, v view, d details, e export, q quit.
    Monitor {
        /// Server base URL
        #[arg(long, default_value = commands::DEFAULT_URL)]
        url: String,

        /// Retention window: 5m, 1h, 12h, 24h
        #[arg(long, default_value = "12h")]
        range: TimeRange,
    },

    /// Print live samples as JSON lines
    Tail {
        /// Server base URL
        #[arg(long, default_value = commands::DEFAULT_URL)]
        url: String,

        /// Stop after N samples (0 = until interrupted)
        #[arg(long, default_value = "0")]
        count: usize,
    },

    /// Fetch the historical backfill and summarize it
    Historical {
        /// Server base URL
        #[arg(long, default_value = commands::DEFAULT_URL)]
        url: String,

        /// Retention window: 5m, 1h, 12h, 24h
        #[arg(long, default_value = "12h")]
        range: TimeRange,

        /// Write the filtered samples as pretty JSON instead of printing a summary
        #[arg(long)]
        output: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Log lines would tear the alternate screen, so the dashboard only shows
    // warnings and above unless RUST_LOG says otherwise.
    let default_filter = match cli.command {
        Commands::Monitor { .. } => "warn",
        _ => "info",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Server { port, host } => commands::server::run(&host, port),
        Commands::Monitor { url, range } => commands::monitor::run(&url, range),
        Commands::Tail { url, count } => commands::tail::run(&url, count),
        Commands::Historical { url, range, output } => {
            commands::historical::run(&url, range, output.as_deref())
        }
    }
}
