//! dynalookup CLI - batch entity lookups against DynamoDB
//!
//! Loads lookup options, runs one batch of PartiQL lookups and prints the
//! projected results as JSON.

mod commands;
mod options;

use clap::{Parser, Subcommand};
use commands::{LookupCommand, ValidateCommand};
use tracing_subscriber::{layer::SubscriberExt, Layer};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(
        long,
        default_value = "info",
        env = "DYNALOOKUP_LOG_LEVEL",
        global = true
    )]
    log_level: String,

    /// Log format: compact, full
    #[arg(
        long,
        default_value = "compact",
        env = "DYNALOOKUP_LOG_FORMAT",
        global = true
    )]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up entities and print the results
    Lookup(LookupCommand),
    /// Check an options file and show the compiled attribute rules
    Validate(ValidateCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG takes full control when set
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::try_from_default_env()?
    } else {
        tracing_subscriber::EnvFilter::try_new(format!(
            "dynalookup_cli={level},\
             dynalookup_query={level},\
             dynalookup_dynamodb={level},\
             aws_config=warn,\
             aws_smithy_runtime=warn,\
             aws_sdk_dynamodb=warn,\
             h2=warn,\
             hyper=warn,\
             rustls=warn",
            level = cli.log_level
        ))?
    };

    // Logs go to stderr so stdout carries only the JSON results
    let fmt_layer = match cli.log_format.as_str() {
        "full" => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed(),
        _ => tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Lookup(lookup_cmd) => lookup_cmd.execute(),
        Commands::Validate(validate_cmd) => validate_cmd.execute(),
    }
}
