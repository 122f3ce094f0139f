//! `ecp`: drive a remote-control device from the command line.
//!
//! Usage: ecp --host <addr> <keypress|launch|query|type|parse> ...
//!
//! Exit codes: 0 on success, 1 when a device call fails, 2 on usage error.
//! A completed exchange exits 0 whatever its HTTP status; the status line is
//! printed to stderr.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use ecp_core::{
    parse_tokens, type_values, ActivityLog, EcpClient, EcpConfig, Key, Query, RequestOutcome,
    UsageError,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ecp")]
#[command(about = "Send keypresses, launches, and queries to a remote-control device")]
struct Args {
    /// Device address (IP or hostname).
    #[arg(long, env = "ECP_HOST", global = true, default_value = "")]
    host: String,

    /// Device port.
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Per-request timeout in milliseconds.
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Print the activity log after the command.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Press a named key (Home, Select, ...) or Lit_<char>.
    Keypress { key: String },

    /// Launch an application, with optional key=value parameters.
    Launch {
        app_id: String,
        #[arg(value_parser = parse_param)]
        params: Vec<(String, String)>,
    },

    /// Query device-info, apps, or active-app.
    Query { name: String },

    /// Parse integers from TEXT and type each one on the device.
    Type {
        text: String,

        /// Maximum number of values to type.
        #[arg(long)]
        limit: Option<usize>,

        /// Press Select after each value.
        #[arg(long)]
        select: bool,

        /// Delay between keypresses in milliseconds.
        #[arg(long)]
        pacing_ms: Option<u64>,
    },

    /// Parse integers from TEXT without contacting the device.
    Parse {
        text: String,

        /// Maximum number of values to accept.
        #[arg(long)]
        limit: Option<usize>,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got {raw:?}"))
}

/// How a command ended, mapped onto the process exit code.
enum Status {
    Ok,
    DeviceFailed,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(Status::Ok) => ExitCode::SUCCESS,
        Ok(Status::DeviceFailed) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

/// Environment (`ECP_*`) first, then command-line flags.
fn config(args: &Args) -> anyhow::Result<EcpConfig> {
    let mut config = EcpConfig::from_env().context("invalid environment")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(ms) = args.timeout_ms {
        config.timeout = Duration::from_millis(ms);
    }
    let (limit, pacing_ms) = match &args.command {
        Command::Type {
            limit, pacing_ms, ..
        } => (*limit, *pacing_ms),
        Command::Parse { limit, .. } => (*limit, None),
        _ => (None, None),
    };
    if let Some(limit) = limit {
        if limit == 0 {
            return Err(UsageError::ZeroLimit.into());
        }
        config.limit = limit;
    }
    if let Some(ms) = pacing_ms {
        config.pacing = Duration::from_millis(ms);
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn connect(args: &Args, config: &EcpConfig) -> Result<EcpClient, UsageError> {
    EcpClient::connect(&args.host, config)
}

fn run(args: &Args) -> anyhow::Result<Status> {
    let config = config(args)?;
    debug!(?config, "configuration loaded");
    let mut log = ActivityLog::new();

    let status = match &args.command {
        Command::Parse { text, json, .. } => {
            let result = parse_tokens(text, config.limit);
            if *json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                result.log_to(config.limit, &mut log);
                for entry in log.entries() {
                    println!("{}", entry.message);
                }
            }
            Status::Ok
        }
        Command::Keypress { key } => {
            let key: Key = key.parse()?;
            let client = connect(args, &config)?;
            report(client.keypress(&key, &mut log))
        }
        Command::Launch { app_id, params } => {
            let client = connect(args, &config)?;
            report(client.launch(app_id, params, &mut log)?)
        }
        Command::Query { name } => {
            let query: Query = name.parse()?;
            let client = connect(args, &config)?;
            let outcome = client.query(query, &mut log);
            if let Some(body) = outcome.body_text() {
                println!("{body}");
            }
            report(outcome)
        }
        Command::Type { text, select, .. } => {
            let client = connect(args, &config)?;
            let parsed = parse_tokens(text, config.limit);
            parsed.log_to(config.limit, &mut log);
            let summary = type_values(
                client.transport(),
                &parsed.values,
                *select,
                config.pacing,
                &mut log,
            );
            info!(completed = summary.completed_presses, "typing finished");
            println!("{} key presses sent", summary.completed_presses);
            match summary.failure {
                Some(failure) => {
                    eprintln!("stopped: {failure}");
                    Status::DeviceFailed
                }
                None => Status::Ok,
            }
        }
    };

    if args.verbose {
        for line in log.lines() {
            eprintln!("{line}");
        }
    }
    Ok(status)
}

fn report(outcome: RequestOutcome) -> Status {
    match outcome {
        RequestOutcome::Success {
            status_code,
            status_text,
            ..
        } => {
            eprintln!("{status_code} {status_text}");
            Status::Ok
        }
        RequestOutcome::Failure(failure) => {
            eprintln!("failed: {failure}");
            Status::DeviceFailed
        }
    }
}
