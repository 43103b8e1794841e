// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scantext — extract and filter the text of scanned PDF documents.
//
// Entry point. Parses arguments, initialises logging on stderr, and runs the
// blocking extraction on a tokio blocking thread while watching for Ctrl-C
// and SIGTERM.

mod args;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use scantext_core::config::ExtractConfig;
use scantext_core::error::{Result, ScantextError};
use scantext_core::human_errors::humanize_error;
use scantext_document::scratch::{self, ScratchDir};
use scantext_engine::ExtractionReport;

use args::Args;

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(args.log_level())),
        )
        .init();

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => return fail(&e),
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => return fail(&ScantextError::Io(e)),
    };

    let outcome = runtime.block_on(run_until_signal(config));
    // An interrupted extraction is still running on a blocking thread;
    // do not wait for it.
    runtime.shutdown_background();

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

/// Print the error once, with a hint, and pick the exit status.
fn fail(err: &ScantextError) -> ExitCode {
    let human = humanize_error(err);
    eprintln!("ERROR: {}", human.message);
    if let Some(suggestion) = &human.suggestion {
        eprintln!("hint: {suggestion}");
    }
    ExitCode::from(u8::try_from(human.exit_code).unwrap_or(1))
}

async fn run_until_signal(config: ExtractConfig) -> Result<()> {
    let scratch = ScratchDir::new()?;
    let scratch_path = scratch.path().to_path_buf();

    let task = tokio::task::spawn_blocking(move || extract(&config, scratch));
    race_interrupt(task, shutdown_signal(), &scratch_path).await
}

/// Wait for `task` unless `signal` resolves first; then drop the scratch
/// directory and report the interruption.
async fn race_interrupt<S>(task: JoinHandle<Result<()>>, signal: S, scratch_path: &Path) -> Result<()>
where
    S: Future<Output = &'static str>,
{
    tokio::select! {
        joined = task => match joined {
            Ok(result) => result,
            Err(e) => Err(ScantextError::Internal(format!("extraction task failed: {e}"))),
        },
        signal = signal => {
            info!(signal, "interrupted; removing scratch directory");
            scratch::remove_best_effort(scratch_path);
            Err(ScantextError::Interrupted)
        }
    }
}

/// Resolve on Ctrl-C or SIGTERM, naming the signal received.
async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}

/// The blocking part: open the sink, run, write the report, clean up.
fn extract(config: &ExtractConfig, scratch: ScratchDir) -> Result<()> {
    let result = match &config.output {
        Some(path) => extract_to_file(config, &scratch, path),
        None => {
            let stdout = io::stdout();
            let mut sink = stdout.lock();
            scantext_engine::run(config, &scratch, &mut sink)
        }
    };

    if let Err(e) = scratch.close() {
        warn!(error = %e, "failed to remove scratch directory");
    }

    let report = result?;
    if let Some(path) = &config.report {
        report.write_json(path)?;
    }
    info!(
        pages = report.pages,
        bytes = report.output_bytes,
        elapsed_ms = report.elapsed_ms(),
        "extraction finished"
    );
    Ok(())
}

/// Run into `path`, removing the file again if the run fails.
fn extract_to_file(config: &ExtractConfig, scratch: &ScratchDir, path: &Path) -> Result<ExtractionReport> {
    let file = File::create(path).map_err(ScantextError::OutputWrite)?;
    let mut sink = BufWriter::new(file);

    let result = scantext_engine::run(config, scratch, &mut sink).and_then(|report| {
        sink.flush().map_err(ScantextError::OutputWrite)?;
        Ok(report)
    });

    if result.is_err() {
        drop(sink);
        remove_partial_output(path);
    }
    result
}

fn remove_partial_output(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        warn!(path = %path.display(), error = %e, "failed to remove incomplete output file");
    }
}
