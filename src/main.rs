//! storage-ops CLI
//!
//! Thin command-line surface over the library: wait for an operation, check a
//! version requirement, and parse or format sizes and durations. Every
//! command runs inside an error boundary; the result (or the failure report)
//! is printed as JSON.

use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use storage_ops::{
    await_operation, format_size, install_exception_hook, parse_duration, parse_size,
    version_satisfied, ClientConfig, ErrorBoundary, ReportContext, RestOperationsClient,
    SizeFactor, Verbosity,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// storage-ops - operation awaiting and diagnostics for storage orchestration APIs
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL of the orchestration API
    #[arg(long, env = "STORAGE_API_HOST", default_value = "http://localhost:8080/api/1.1")]
    api_host: String,

    /// Bearer token for the orchestration API
    #[arg(long, env = "STORAGE_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "STORAGE_REQUEST_TIMEOUT", default_value = "30")]
    request_timeout_secs: u64,

    /// Increase failure report detail (-v: details, -vv: traceback)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Failure report verbosity level, used when higher than -v
    #[arg(long, env = "STORAGE_OPS_VERBOSITY", default_value = "0")]
    verbosity: u8,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Wait until an operation succeeds or fails
    AwaitOperation {
        /// Operation identifier
        id: String,
        /// Return a failed operation instead of failing
        #[arg(long)]
        no_fail: bool,
    },
    /// Check a version against a requirement set such as ">=1.0, <2.0"
    CheckVersion { version: String, requirements: String },
    /// Parse a size such as "1.5G" into a plain number
    ParseSize {
        text: String,
        /// Use powers of 1000 instead of 1024
        #[arg(long)]
        decimal: bool,
    },
    /// Format a plain number with a magnitude suffix
    FormatSize {
        value: u64,
        /// Use powers of 1000 instead of 1024
        #[arg(long)]
        decimal: bool,
    },
    /// Parse a duration such as "1W2D" into minutes
    ParseDuration { text: String },
}

fn size_factor(decimal: bool) -> SizeFactor {
    if decimal {
        SizeFactor::Decimal
    } else {
        SizeFactor::Binary
    }
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args);

    let verbosity = Verbosity::from_level(args.verbose.max(args.verbosity));
    let boundary = install_exception_hook(ReportContext::new(verbosity));

    info!("storage-ops {} ({:?})", storage_ops::VERSION, verbosity);

    match run(&args, &boundary).await {
        Ok(output) => println!("{}", output),
        Err(report) => {
            println!(
                "{}",
                serde_json::to_string(&report).unwrap_or_else(|_| report.msg.clone())
            );
            std::process::exit(1);
        }
    }
}

async fn run(
    args: &Args,
    boundary: &ErrorBoundary,
) -> std::result::Result<serde_json::Value, storage_ops::FailureReport> {
    match &args.command {
        Command::AwaitOperation { id, no_fail } => {
            boundary
                .run(async {
                    let client = RestOperationsClient::new(ClientConfig {
                        api_host: args.api_host.clone(),
                        access_token: args.access_token.clone(),
                        request_timeout_secs: args.request_timeout_secs,
                        ..Default::default()
                    })?;
                    let op = await_operation(&client, id, !no_fail).await?;
                    Ok::<_, storage_ops::Error>(json!({"changed": false, "operation": op}))
                })
                .await
        }
        Command::CheckVersion {
            version,
            requirements,
        } => boundary.run_sync(|| {
            let satisfied = version_satisfied(version, requirements)?;
            Ok(json!({"version": version, "requirements": requirements, "satisfied": satisfied}))
        }),
        Command::ParseSize { text, decimal } => boundary.run_sync(|| {
            let value = parse_size(text, size_factor(*decimal))?;
            Ok(json!({"text": text, "value": value}))
        }),
        Command::FormatSize { value, decimal } => boundary.run_sync(|| {
            Ok(json!({"value": value, "text": format_size(*value, size_factor(*decimal))}))
        }),
        Command::ParseDuration { text } => boundary.run_sync(|| {
            let (components, minutes) = parse_duration(text)?;
            Ok(json!({
                "text": text,
                "minutes": minutes,
                "components": {
                    "years": components.years,
                    "weeks": components.weeks,
                    "days": components.days,
                    "hours": components.hours,
                    "minutes": components.minutes,
                }
            }))
        }),
    }
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let mut filter = EnvFilter::from_default_env().add_directive(level.into());
    for directive in ["hyper=warn", "reqwest=warn"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    // Logs go to stderr so stdout stays machine-readable
    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
