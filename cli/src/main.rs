//! notesheet CLI
//!
//! Command-line client for the notesheet backend: an interactive shell that
//! keeps one session across commands, plus one-shot commands for scripts.

use std::io;
use std::process::ExitCode;

use anyhow::Context;
use clap::builder::NonEmptyStringValueParser;
use clap::{Parser, Subcommand};
use notesheet_core::{HttpClientConfig, SessionApiClient};
use tracing_subscriber::EnvFilter;

mod render;
mod shell;

#[derive(Parser)]
#[command(name = "notesheet")]
#[command(about = "Client for the notesheet document backend", long_about = None)]
struct Cli {
    /// Backend base URL
    #[arg(long, env = "NOTESHEET_BASE_URL", default_value = "http://localhost:8080", global = true)]
    base_url: String,

    /// Whole-request timeout in seconds
    #[arg(long, env = "NOTESHEET_TIMEOUT_SECS", default_value = "60", global = true)]
    timeout_secs: u64,

    /// Connection timeout in seconds
    #[arg(long, default_value = "10", global = true)]
    connect_timeout_secs: u64,

    /// Log filter, e.g. `debug` or `notesheet_core=trace`
    #[arg(long, env = "RUST_LOG", default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive shell (default)
    Shell,
    /// Log in and list the supporting documents of a work item
    Docs {
        #[arg(long, value_parser = NonEmptyStringValueParser::new())]
        username: String,

        #[arg(
            long,
            env = "NOTESHEET_PASSWORD",
            hide_env_values = true,
            value_parser = NonEmptyStringValueParser::new()
        )]
        password: String,

        #[arg(value_parser = NonEmptyStringValueParser::new())]
        workitem_id: String,

        #[arg(value_parser = NonEmptyStringValueParser::new())]
        process_instance_id: String,
    },
    /// Create a PDF note for a work item
    PdfNote {
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        workitem_id: String,

        #[arg(value_parser = NonEmptyStringValueParser::new())]
        process_instance_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&cli.log_level)
                .with_context(|| format!("invalid log filter `{}`", cli.log_level))?,
        )
        .with_writer(io::stderr)
        .init();

    let config = HttpClientConfig {
        timeout_secs: cli.timeout_secs,
        connect_timeout_secs: cli.connect_timeout_secs,
        ..HttpClientConfig::default()
    };
    let mut client = SessionApiClient::connect(&cli.base_url, &config)
        .context("failed to create HTTP client")?;

    let mut stdout = io::stdout();
    let ok = match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => {
            shell::run(&mut client).await?;
            true
        }
        Commands::Docs {
            username,
            password,
            workitem_id,
            process_instance_id,
        } => {
            let login = shell::Command::Login { username, password };
            shell::execute(&mut client, login, &mut stdout).await?
                && shell::execute(
                    &mut client,
                    shell::Command::Docs {
                        workitem_id,
                        process_instance_id,
                    },
                    &mut stdout,
                )
                .await?
        }
        Commands::PdfNote {
            workitem_id,
            process_instance_id,
        } => {
            let command = shell::Command::PdfNote {
                workitem_id,
                process_instance_id,
            };
            shell::execute(&mut client, command, &mut stdout).await?
        }
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
