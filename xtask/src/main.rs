//! Developer tasks for the niivue-vision workspace.
//!
//! ```text
//! cargo run -p vision-xtask -- serve-payloads --root ./data
//! cargo run -p vision-xtask -- bundle --release
//! ```

mod bundle;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "xtask", about = "niivue-vision developer tasks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve local volumes over HTTP with permissive CORS, for use as
    /// `?payload=http://HOST:PORT/get/?file_path=...`.
    ServePayloads {
        /// Address to bind.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Port to listen on.
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
        /// Directory requests are confined to.
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
    /// Build the web shell with the Dioxus CLI (`dx`).
    Bundle {
        /// Optimized build.
        #[arg(long)]
        release: bool,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    match Cli::parse().command {
        Command::ServePayloads { host, port, root } => {
            serve::run(&format!("{host}:{port}"), &root)
        }
        Command::Bundle { release } => bundle::run(release),
    }
}
