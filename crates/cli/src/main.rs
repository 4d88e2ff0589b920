// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! t3270 - scripted 3270 terminal workflows and load generation

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use t3270_adapters::{S3270Adapter, SysinfoProbe};
use t3270_core::{Configuration, InjectionTable, SystemClock};
use t3270_engine::{
    run_load, run_single, summary, DashboardSink, RunContext, RunOptions, TelemetryMode,
};

#[derive(Parser, Debug)]
#[command(
    name = "t3270",
    version,
    about = "Scripted 3270 terminal workflows and load generation"
)]
struct Cli {
    /// Workflow configuration file (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Number of concurrent virtual users
    #[arg(long, default_value_t = 1)]
    workers: usize,

    /// Load run duration in seconds; omit to run the workflow once
    #[arg(long, value_name = "SECS")]
    runtime: Option<u64>,

    /// Drive the headless s3270 emulator instead of a GUI terminal
    #[arg(long)]
    headless: bool,

    /// Emit text telemetry rows instead of progress bars
    #[arg(long)]
    text: bool,

    /// Count connect failures as workflow failures
    #[arg(long = "show-connect-errors")]
    show_connect_errors: bool,

    /// Hard per-workflow timeout in seconds (0 disables)
    #[arg(long, value_name = "SECS", default_value_t = 0)]
    workflow_timeout: u64,

    /// Injection table file rotating {{placeholder}} values (JSON)
    #[arg(long, value_name = "FILE")]
    injection_file: Option<PathBuf>,

    /// Script ports are allocated above this port
    #[arg(long, default_value_t = t3270_engine::run::DEFAULT_START_PORT)]
    start_port: u16,

    /// Raw capture output instead of HTML
    #[arg(long)]
    api: bool,

    /// Override the shared dashboard metrics directory
    #[arg(long, value_name = "DIR")]
    dashboard_dir: Option<PathBuf>,

    /// Directory for per-PID log and summary files
    #[arg(long, value_name = "DIR", default_value = "logs")]
    log_dir: PathBuf,

    /// Enable debug logging
    #[arg(long)]
    verbose: bool,
}

fn banner() -> String {
    format!(
        "t3270 {} - 3270 terminal load generator",
        env!("CARGO_PKG_VERSION")
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    println!("{}", banner());

    let _log_guard = setup_logging(&cli.log_dir, cli.verbose)?;

    // Configuration errors abort before Init with a non-zero exit.
    let config = Configuration::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    config.validate().context("invalid configuration")?;

    // A broken injection table degrades to no substitution; the run itself
    // still proceeds.
    let injection = match &cli.injection_file {
        Some(path) => InjectionTable::load(path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "injection table unusable, continuing without");
            InjectionTable::default()
        }),
        None => InjectionTable::default(),
    };

    let options = RunOptions {
        concurrency: cli.workers.max(1),
        runtime: Duration::from_secs(cli.runtime.unwrap_or(0)),
        headless: cli.headless,
        show_connection_errors: cli.show_connect_errors,
        workflow_timeout: (cli.workflow_timeout > 0)
            .then(|| Duration::from_secs(cli.workflow_timeout)),
        api_mode: cli.api,
        start_port: cli.start_port,
        config_file_path: Some(cli.config.clone()),
        params: format!(
            "workers={} runtime={}s",
            cli.workers.max(1),
            cli.runtime.unwrap_or(0)
        ),
        log_dir: cli.log_dir.clone(),
    };

    let ctx = Arc::new(RunContext::new(options, config.output_file_path.clone()));
    let sink = Arc::new(DashboardSink::new(
        cli.dashboard_dir.unwrap_or_else(DashboardSink::default_dir),
        Arc::new(SysinfoProbe),
        Arc::new(SystemClock),
    ));

    // An external interrupt is a kill request: finish in-flight work and go.
    let interrupt_shutdown = ctx.shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, shutting down");
            interrupt_shutdown.request();
        }
    });

    let summary = if ctx.options.runtime.is_zero() {
        let adapter = S3270Adapter::new(ctx.options.headless, ctx.shutdown.clone());
        run_single(&adapter, &config, &ctx).await;
        summary::build(&ctx.metrics)
    } else {
        let telemetry = if cli.text {
            TelemetryMode::Text
        } else {
            TelemetryMode::Progress
        };
        let headless = ctx.options.headless;
        let make_adapter = {
            let shutdown = ctx.shutdown.clone();
            move |_worker: usize| S3270Adapter::new(headless, shutdown.clone())
        };
        run_load(
            &config,
            &injection,
            make_adapter,
            Arc::clone(&ctx),
            Arc::clone(&sink),
            telemetry,
        )
        .await
    };

    println!();
    print!("{}", summary::render(&summary));

    // Workflow failures are results, not process failures.
    Ok(())
}

fn setup_logging(
    log_dir: &std::path::Path,
    verbose: bool,
) -> anyhow::Result<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(
        log_dir,
        format!("logs_{}.json", std::process::id()),
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_writer(non_blocking))
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    Ok(guard)
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
