//! CLI command definitions.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Serve an archive over HTTP
    Serve {
        /// Configuration file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Archive to serve, overriding the configuration
        #[arg(short, long)]
        archive: Option<PathBuf>,

        /// Address to bind, overriding the configuration
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// List a directory inside an archive
    Ls {
        /// Archive file
        archive: PathBuf,

        /// Path inside the archive
        #[arg(default_value = "")]
        path: String,
    },

    /// Precompute every cache entry of an archive
    Warm {
        /// Archive file
        archive: PathBuf,

        /// Request path the entries are keyed under (default: /<file name>)
        #[arg(long)]
        request_path: Option<String>,

        /// Filesystem cache directory
        #[arg(long)]
        cache_dir: PathBuf,

        /// Entry lifetime in seconds
        #[arg(long, default_value_t = 600)]
        ttl: u64,
    },

    /// Remove expired entries from a filesystem cache
    Purge {
        /// Filesystem cache directory
        #[arg(long)]
        cache_dir: PathBuf,
    },

    /// Show the effective configuration
    Config {
        /// Configuration file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
