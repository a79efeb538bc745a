//! # VIGIL Server
//!
//! Collision-warning HTTP server.
//!
//! ## Usage
//!
//! ```bash
//! vigil_server --config config/vigil.toml --bind 127.0.0.1:5000
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info,tower_http=debug`).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

struct CliArgs {
    config: Option<PathBuf>,
    bind: Option<SocketAddr>,
}

fn print_usage() {
    println!("Usage: vigil_server [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config <FILE>        TOML configuration file");
    println!("  -b, --bind <ADDR>          Address to bind (default: 0.0.0.0:5000)");
    println!("  -h, --help                 Show this help");
}

/// `Ok(None)` means help was printed.
fn parse_args() -> Result<Option<CliArgs>, String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut parsed = CliArgs {
        config: None,
        bind: None,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let value = iter.next().ok_or("--config needs a file path")?;
                parsed.config = Some(PathBuf::from(value));
            }
            "--bind" | "-b" => {
                let value = iter.next().ok_or("--bind needs an address")?;
                let addr = value
                    .parse::<SocketAddr>()
                    .map_err(|e| format!("invalid bind address {value}: {e}"))?;
                parsed.bind = Some(addr);
            }
            "--help" | "-h" => {
                print_usage();
                return Ok(None);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
    }

    Ok(Some(parsed))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    // Already set when embedded in tests.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn main() -> ExitCode {
    init_tracing();

    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => return ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            print_usage();
            return ExitCode::from(2);
        }
    };

    let mut config = match vigil_server::load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    if let Some(bind) = args.bind {
        config.server.bind_address = bind;
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.worker_threads)
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "failed to start runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(vigil_server::serve(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}
