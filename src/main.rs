use clap::Parser;
use lifeplan::api::{Cli, Command, build_settings, run_http_server};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::Serve(args) => {
            let defaults = match build_settings(&args) {
                Ok(defaults) => defaults,
                Err(e) => {
                    eprintln!("Invalid configuration: {e}");
                    std::process::exit(2);
                }
            };
            if let Err(e) = run_http_server(args.host, args.port, defaults).await {
                tracing::error!(error = %e, "server error");
                std::process::exit(1);
            }
        }
    }
}
