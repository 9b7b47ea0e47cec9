//! Interactive console over a running store service.

use std::io::Write;

use clap::Parser;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use pharmstock_infra::StoreHandle;
use pharmstock_inventory::KNOWN_CATEGORIES;

use crate::cli::{ShellCommand, ShellLine, StoreCommand};
use crate::commands;

const PROMPT: &str = "pharmstock> ";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    #[error("unterminated quote")]
    UnterminatedQuote,
}

/// Split a console line on whitespace; double quotes group words and
/// `\"` inside quotes is a literal quote.
pub fn tokenize(line: &str) -> Result<Vec<String>, TokenizeError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                in_token = true;
            }
            '\\' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            c if c.is_whitespace() && !in_quotes => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if in_quotes {
        return Err(TokenizeError::UnterminatedQuote);
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Read commands from `input` until `quit` or end of input.
///
/// Command failures are printed and the loop carries on; only I/O errors on
/// the console itself end it early.
pub async fn run<R>(
    handle: &StoreHandle,
    input: R,
    out: &mut dyn Write,
    json: bool,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    commands::execute(handle, StoreCommand::LowStock { below: None }, json, out).await?;

    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };

        let tokens = match tokenize(&line) {
            Ok(tokens) if tokens.is_empty() => continue,
            Ok(tokens) => tokens,
            Err(err) => {
                writeln!(out, "error: {err}")?;
                continue;
            }
        };

        let command = match ShellLine::try_parse_from(tokens) {
            Ok(parsed) => parsed.command,
            Err(err) => {
                // Covers `help` as well as real parse errors.
                write!(out, "{}", err.render())?;
                continue;
            }
        };

        tracing::debug!(?command, "shell command");

        match command {
            ShellCommand::Quit => break,
            ShellCommand::Categories => {
                for category in KNOWN_CATEGORIES {
                    writeln!(out, "{category}")?;
                }
            }
            ShellCommand::Save => match handle.save().await {
                Ok(()) => writeln!(out, "Inventory saved.")?,
                Err(err) => writeln!(out, "error: {err}")?,
            },
            ShellCommand::Threshold { value: Some(threshold) } => {
                handle.set_low_stock_threshold(threshold).await?;
                writeln!(out, "Low-stock threshold set to {threshold}.")?;
            }
            ShellCommand::Threshold { value: None } => {
                let threshold = handle.low_stock_threshold().await?;
                writeln!(out, "Low-stock threshold is {threshold}.")?;
            }
            ShellCommand::Store(command) => {
                if let Err(err) = commands::execute(handle, command, json, out).await {
                    writeln!(out, "error: {err:#}")?;
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use pharmstock_infra::{InMemoryRepository, InventoryStore, StoreService};
    use pharmstock_inventory::FixedClock;

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(
            tokenize("  update   1001 20 ").unwrap(),
            vec!["update", "1001", "20"]
        );
    }

    #[test]
    fn quotes_group_words() {
        assert_eq!(
            tokenize(r#"add --name "Vitamin D" --category "Other""#).unwrap(),
            vec!["add", "--name", "Vitamin D", "--category", "Other"]
        );
    }

    #[test]
    fn empty_quotes_make_an_empty_token() {
        assert_eq!(tokenize(r#"search """#).unwrap(), vec!["search", ""]);
    }

    #[test]
    fn escaped_quote_inside_quotes() {
        assert_eq!(
            tokenize(r#"search "5\" tube""#).unwrap(),
            vec!["search", "5\" tube"]
        );
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        assert_eq!(
            tokenize(r#"search "open"#),
            Err(TokenizeError::UnterminatedQuote)
        );
    }

    async fn session(script: &str) -> (String, Arc<InMemoryRepository>) {
        let repo = Arc::new(InMemoryRepository::new());
        let clock = Arc::new(FixedClock::on("2024-08-15".parse().unwrap()));
        let (store, _) = InventoryStore::open(repo.clone(), clock, 10).unwrap();
        let (handle, _join) = StoreService::spawn(store, None);

        let mut out = Vec::new();
        run(&handle, script.as_bytes(), &mut out, false)
            .await
            .unwrap();
        (String::from_utf8(out).unwrap(), repo)
    }

    #[tokio::test]
    async fn starts_with_low_stock_alert() {
        let (output, _) = session("quit\n").await;
        assert!(output.starts_with("The following items are low in stock:\n"));
        assert!(output.contains("Ventolin (ID: 1004): 5 remaining"));
    }

    #[tokio::test]
    async fn runs_commands_until_quit() {
        let script = "\
add --id 2001 --name \"Vitamin D\" --quantity 2 --price 3.10\n\
update 1004 50\n\
quit\n\
stats\n";
        let (output, repo) = session(script).await;

        assert!(output.contains("Item added successfully!"));
        assert!(output.contains("Ventolin (ID: 1004): 50"));
        assert!(!output.contains("Inventory Statistics"));

        let saved = String::from_utf8(repo.contents().unwrap()).unwrap();
        assert!(saved.contains("2001,Vitamin D,2,3.10,Other,2024-08-15"));
        assert!(saved.contains("1004,Ventolin,50,23.40,Asthma,2024-08-15"));
    }

    #[tokio::test]
    async fn errors_do_not_end_the_session() {
        let script = "update 9999 1\nfrobnicate\nsearch \"open\nstats\n";
        let (output, _) = session(script).await;

        assert!(output.contains("item not found: 9999"));
        assert!(output.contains("unrecognized subcommand"));
        assert!(output.contains("error: unterminated quote"));
        assert!(output.contains("Total Items:     5"));
    }

    #[tokio::test]
    async fn threshold_changes_apply_to_later_alerts() {
        let script = "threshold 30\nlow-stock\nthreshold\n";
        let (output, _) = session(script).await;

        assert!(output.contains("Low-stock threshold set to 30."));
        assert!(output.contains("Lipitor (ID: 1003): 22 remaining"));
        assert!(output.contains("Low-stock threshold is 30."));
    }

    #[tokio::test]
    async fn categories_and_help_mention_known_categories() {
        let (output, _) = session("categories\nhelp add\n").await;

        assert!(output.contains("Pain Relief\nAntibiotic\nCholesterol\nAsthma\nDiabetes\nOther\n"));
        assert!(output.contains("usually one of: Pain Relief, Antibiotic"));
    }

    #[tokio::test]
    async fn save_command_persists() {
        let (output, repo) = session("save\n").await;
        assert!(output.contains("Inventory saved."));
        assert!(repo.save_count() >= 2);
    }
}
