//! Binary entry point for the workload contrast demonstration.
//!
//! This module is excluded from mutation testing because testing process entry/exit behavior
//! is impractical - it requires spawning subprocesses and checking exit codes.

use std::io;
use std::process::ExitCode;
use std::time::Duration;

use argh::FromArgs;
use tracing_subscriber::EnvFilter;
use workload_contrast::{DemoConfig, Error, require_non_zero, run_demo};

/// Used when `RUST_LOG` is not set, so that stdout carries only the demo output.
const DEFAULT_LOG_FILTER: &str = "warn";

/// Times CPU-bound and I/O-bound workloads sequentially and on a worker pool, then demonstrates
/// interleaved writes into a shared log. Every option defaults to the classic demonstration.
#[derive(FromArgs)]
struct Args {
    /// loop iterations performed by each CPU-bound task (default 5000000)
    #[argh(option)]
    cpu_iterations: Option<u64>,

    /// number of CPU-bound tasks and pool workers (default 2)
    #[argh(option)]
    cpu_tasks: Option<usize>,

    /// number of I/O-bound tasks and pool workers (default 3)
    #[argh(option)]
    io_tasks: Option<usize>,

    /// how long each simulated I/O round trip blocks, in milliseconds (default 1000)
    #[argh(option)]
    io_delay_ms: Option<u64>,

    /// perform real HTTP requests to this URL instead of simulating the round trips
    #[cfg(feature = "network")]
    #[argh(option)]
    network_url: Option<String>,

    /// bounded wait for one HTTP request, in milliseconds (default 3000)
    #[cfg(feature = "network")]
    #[argh(option)]
    io_timeout_ms: Option<u64>,

    /// number of shared-log workers (default 3)
    #[argh(option)]
    log_workers: Option<usize>,

    /// entries appended by each shared-log worker (default 5)
    #[argh(option)]
    log_steps: Option<usize>,

    /// pause after each shared-log append, in milliseconds (default 100)
    #[argh(option)]
    log_pause_ms: Option<u64>,
}

// Binary entry point - mutations would require subprocess testing which is impractical.
#[cfg_attr(test, mutants::skip)]
fn main() -> ExitCode {
    init_tracing();

    let args: Args = argh::from_env();

    let config = match config_from_args(args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run_demo(&config, &mut io::stdout().lock()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg_attr(test, mutants::skip)] // Global subscriber installation cannot be observed in tests.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_not_set| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();
}

fn config_from_args(args: Args) -> Result<DemoConfig, Error> {
    let mut config = DemoConfig::default();

    if let Some(iterations) = args.cpu_iterations {
        config.cpu_iterations = iterations;
    }

    if let Some(count) = args.cpu_tasks {
        config.cpu_tasks = require_non_zero("cpu-tasks", count)?;
    }

    if let Some(count) = args.io_tasks {
        config.io_tasks = require_non_zero("io-tasks", count)?;
    }

    if let Some(delay_ms) = args.io_delay_ms {
        config.io_delay = Duration::from_millis(delay_ms);
        // A failed call should cost about as much as a successful one.
        config.fallback_delay = config.io_delay;
    }

    #[cfg(feature = "network")]
    {
        if args.network_url.is_some() {
            config.network_url = args.network_url;
        }

        if let Some(timeout_ms) = args.io_timeout_ms {
            config.io_timeout = Duration::from_millis(timeout_ms);
        }
    }

    if let Some(count) = args.log_workers {
        config.log_workers = require_non_zero("log-workers", count)?;
    }

    if let Some(count) = args.log_steps {
        config.log_steps = require_non_zero("log-steps", count)?;
    }

    if let Some(pause_ms) = args.log_pause_ms {
        config.log_pause = Duration::from_millis(pause_ms);
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::from_args(&["workload_contrast"], args)
            .unwrap_or_else(|early_exit| panic!("arguments must parse: {}", early_exit.output))
    }

    #[test]
    fn no_flags_yield_defaults() {
        let config = config_from_args(parse(&[])).unwrap();

        assert_eq!(config, DemoConfig::default());
    }

    #[test]
    fn flags_override_defaults() {
        let config = config_from_args(parse(&[
            "--cpu-tasks",
            "4",
            "--io-delay-ms",
            "250",
            "--log-steps",
            "2",
        ]))
        .unwrap();

        assert_eq!(config.cpu_tasks.get(), 4);
        assert_eq!(config.io_delay, Duration::from_millis(250));
        assert_eq!(config.fallback_delay, Duration::from_millis(250));
        assert_eq!(config.log_steps.get(), 2);
        assert_eq!(config.io_tasks, DemoConfig::default().io_tasks);
    }

    #[test]
    fn zero_worker_count_is_rejected() {
        let error = config_from_args(parse(&["--io-tasks", "0"])).unwrap_err();

        assert!(matches!(error, Error::InvalidConfig { field: "io-tasks", .. }));
    }

    #[cfg(feature = "network")]
    #[test]
    fn network_flags_set_url_and_timeout() {
        let config = config_from_args(parse(&[
            "--network-url",
            "http://127.0.0.1:9/",
            "--io-timeout-ms",
            "250",
        ]))
        .unwrap();

        assert_eq!(config.network_url.as_deref(), Some("http://127.0.0.1:9/"));
        assert_eq!(config.io_timeout, Duration::from_millis(250));
    }

    #[cfg(not(feature = "network"))]
    #[test]
    fn network_flags_are_rejected_without_network_feature() {
        for flags in [
            ["--network-url", "http://127.0.0.1:9/"],
            ["--io-timeout-ms", "250"],
        ] {
            let early_exit = Args::from_args(&["workload_contrast"], &flags)
                .err()
                .unwrap_or_else(|| panic!("{} must not be accepted", flags[0]));

            assert!(early_exit.status.is_err(), "{} must be a usage error", flags[0]);
        }
    }
}
