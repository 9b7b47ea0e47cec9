//! `pharmstock-desktop`
//!
//! **Responsibility:** Thin console front end over the inventory store.
//!
//! This crate provides:
//! - One-shot commands (`list`, `search`, `add`, `update`, `low-stock`, `stats`)
//! - An interactive shell that keeps the store open with auto-save running
//! - Plain-text tables or `--json` output
//!
//! All inventory state lives in the store service; this crate only turns
//! console input into store requests and renders the replies.

pub mod cli;
pub mod commands;
pub mod config;
pub mod render;
pub mod shell;

use std::io::Write;

use anyhow::Context;
use tokio::io::BufReader;

use pharmstock_infra::{LoadOrigin, OpenReport, open_file_store};

use crate::cli::{Cli, Command};

/// Open the store, run the requested command and save on the way out.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = config::store_config(&cli)?;
    let (handle, join, report) = open_file_store(&config).with_context(|| {
        format!(
            "failed to open inventory at {}",
            config.data_file.display()
        )
    })?;
    announce(&report, &config.data_file);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let outcome = match cli.command {
        Command::Store(command) => commands::execute(&handle, command, cli.json, &mut out).await,
        Command::Shell => {
            let input = BufReader::new(tokio::io::stdin());
            shell::run(&handle, input, &mut out, cli.json).await
        }
    };
    out.flush()?;

    let closed = handle.shutdown().await;
    join.await.context("inventory store task failed")?;

    outcome?;
    closed.context("failed to save inventory on exit")?;
    Ok(())
}

fn announce(report: &OpenReport, path: &std::path::Path) {
    match report.origin {
        LoadOrigin::Persisted => {}
        LoadOrigin::Seeded { persisted: true } => {
            tracing::info!(path = %path.display(), "no inventory found; created sample items");
        }
        LoadOrigin::Seeded { persisted: false } => {
            tracing::warn!(
                path = %path.display(),
                "no inventory found; sample items could not be saved"
            );
        }
    }

    for skipped in &report.skipped {
        eprintln!(
            "warning: skipped line {} of {}: {}",
            skipped.line,
            path.display(),
            skipped.reason
        );
    }
}
