//! tarbro CLI entrypoint.

use clap::Parser;

mod commands;
mod config;
mod handlers;
mod telemetry;

use commands::Commands;
use config::{LogConfig, ServerConfig};

#[derive(Parser)]
#[command(name = "tarbro")]
#[command(author, version, about = "Browse tar archives over HTTP", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            archive,
            bind,
        } => {
            let mut config = ServerConfig::load(config.as_deref())?;
            if let Some(archive) = archive {
                config.archive_path = Some(archive);
            }
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            telemetry::init(&config.log);
            handlers::serve(config).await?
        }
        Commands::Ls { archive, path } => {
            telemetry::init(&LogConfig::quiet());
            handlers::ls(&archive, &path).await?
        }
        Commands::Warm {
            archive,
            request_path,
            cache_dir,
            ttl,
        } => {
            telemetry::init(&LogConfig::default());
            handlers::warm(&archive, request_path, &cache_dir, ttl).await?
        }
        Commands::Purge { cache_dir } => {
            telemetry::init(&LogConfig::quiet());
            handlers::purge(&cache_dir).await?
        }
        Commands::Config { config } => {
            handlers::show_config(&ServerConfig::load(config.as_deref())?)?
        }
    }

    Ok(())
}
