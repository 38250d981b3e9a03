mod cmd;

use clap::Parser;
use cmd::config::{Effective, ExportArgs};

#[derive(Parser)]
#[command(name = "csv-export", about = "Render a search response as CSV")]
struct Cli {
    #[command(flatten)]
    args: ExportArgs,
}

#[tokio::main]
async fn main() {
    // stdout carries the CSV, logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let eff = match Effective::new(&cli.args) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = cmd::export::run(&eff).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
