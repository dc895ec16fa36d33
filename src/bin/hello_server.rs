use clap::Parser;
use tracing_subscriber::EnvFilter;

use dolphot_explorer::server::{run_server, DEFAULT_PORT};

#[derive(Parser)]
#[command(name = "hello-server")]
#[command(about = "Minimal web server answering Hello World!", long_about = None)]
struct Cli {
    /// Interface to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    run_server(&cli.host, cli.port).await
}
