//! `nimbus` -- CLI binary for the nimbus cloud client pipeline.
//!
//! Provides the following subcommands:
//!
//! - `nimbus upload` -- Upload a file as a block blob.
//! - `nimbus classifications` -- List the log classifications usable with `--log`.

use clap::{Parser, Subcommand};

mod commands;

/// nimbus cloud client CLI.
#[derive(Parser)]
#[command(name = "nimbus", about = "nimbus cloud client CLI", version)]
struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Upload a file as a block blob.
    Upload(commands::upload::UploadArgs),

    /// List log classifications.
    Classifications,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "debug"
    } else {
        "info,nimbus::log=debug"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    match cli.command {
        Commands::Upload(args) => commands::upload::run(args, cli.verbose).await?,
        Commands::Classifications => commands::classifications::run(),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_upload() {
        let cli = Cli::try_parse_from([
            "nimbus",
            "upload",
            "--endpoint",
            "https://a.example/c/b",
            "--file",
            "b.txt",
            "--log",
            "http.request,http.retry",
        ])
        .unwrap();
        assert!(!cli.verbose);
        match cli.command {
            Commands::Upload(args) => {
                assert_eq!(args.endpoint, "https://a.example/c/b");
                assert_eq!(args.file.to_str(), Some("b.txt"));
                assert_eq!(args.log.as_deref(), Some("http.request,http.retry"));
                assert_eq!(args.content_type, "text/plain");
                assert!(args.token.is_none());
            }
            Commands::Classifications => panic!("expected upload"),
        }
    }

    #[test]
    fn parses_classifications_with_global_verbose() {
        let cli = Cli::try_parse_from(["nimbus", "classifications", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Classifications));
    }

    #[test]
    fn upload_requires_endpoint() {
        assert!(Cli::try_parse_from(["nimbus", "upload", "--file", "b.txt"]).is_err());
    }
}
