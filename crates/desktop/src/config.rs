//! Turn command-line flags (and their env fallbacks) into a store configuration.

use std::time::Duration;

use pharmstock_infra::{StoreConfig, default_data_file};

use crate::cli::{Cli, Command};

/// Resolve the store configuration for this invocation.
///
/// One-shot commands never auto-save; the interactive shell does unless the
/// period is zero.
pub fn store_config(cli: &Cli) -> anyhow::Result<StoreConfig> {
    let data_file = match &cli.data_file {
        Some(path) => path.clone(),
        None => default_data_file()?,
    };

    let mut config = StoreConfig::new(data_file);
    if let Some(threshold) = cli.threshold {
        config = config.with_low_stock_threshold(threshold);
    }

    config = match (&cli.command, cli.autosave_secs) {
        (Command::Shell, Some(secs)) => config.with_autosave_interval(Duration::from_secs(secs)),
        (Command::Shell, None) => config,
        (Command::Store(_), _) => config.without_autosave(),
    };

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pharmstock_infra::DEFAULT_AUTOSAVE_INTERVAL;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("pharmstock").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn explicit_flags_win() {
        let cli = parse(&[
            "--data-file",
            "/tmp/stock.csv",
            "--threshold",
            "3",
            "--autosave-secs",
            "5",
            "shell",
        ]);
        let config = store_config(&cli).unwrap();

        assert_eq!(config.data_file, std::path::PathBuf::from("/tmp/stock.csv"));
        assert_eq!(config.low_stock_threshold, 3);
        assert_eq!(config.autosave_interval, Some(Duration::from_secs(5)));
    }

    #[test]
    fn shell_defaults_to_periodic_save() {
        let cli = parse(&["--data-file", "stock.csv", "shell"]);
        let config = store_config(&cli).unwrap();
        assert_eq!(config.autosave_interval, Some(DEFAULT_AUTOSAVE_INTERVAL));
    }

    #[test]
    fn zero_period_disables_autosave_in_shell() {
        let cli = parse(&["--data-file", "stock.csv", "--autosave-secs", "0", "shell"]);
        assert_eq!(store_config(&cli).unwrap().autosave_interval, None);
    }

    #[test]
    fn one_shot_commands_do_not_autosave() {
        let cli = parse(&["--data-file", "stock.csv", "--autosave-secs", "5", "list"]);
        assert_eq!(store_config(&cli).unwrap().autosave_interval, None);
    }
}
