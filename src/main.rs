use std::process;

use clap::Parser;
use gh_commit_stats::cli::{parse_exit_code, user_facing_message};
use gh_commit_stats::Cli;
use tracing::debug;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing subscriber with RUST_LOG environment variable support
    // Default to "warn" level if RUST_LOG is not set
    // Write to stderr so logs don't interfere with the report on stdout
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            process::exit(parse_exit_code(&e));
        }
    };

    if let Err(e) = cli.execute().await {
        eprintln!("Error: {}", user_facing_message(&e));

        // The full chain is only logged, never printed
        for (depth, cause) in e.chain().enumerate() {
            debug!(depth, "{cause}");
        }

        process::exit(1);
    }
}
