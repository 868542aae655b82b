//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::config::Config;

/// Shift Bot - photo-confirmed shift check-ins for Telegram teams
#[derive(Parser, Debug)]
#[command(name = "shift-bot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the bot (polling, scheduler and health endpoint)
    Run(RunArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Insert demo data
    Seed,

    /// Run a scheduled job once
    Jobs(JobsArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Health endpoint host (overrides HEALTH_HOST)
    #[arg(long)]
    pub health_host: Option<String>,

    /// Health endpoint port (overrides HEALTH_PORT)
    #[arg(long)]
    pub health_port: Option<u16>,
}

impl RunArgs {
    /// Bind address, falling back to the configured one.
    pub fn health_addr(&self, config: &Config) -> String {
        format!(
            "{}:{}",
            self.health_host.as_deref().unwrap_or(&config.health_host),
            self.health_port.unwrap_or(config.health_port)
        )
    }
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

/// Arguments for the jobs command
#[derive(Parser, Debug)]
pub struct JobsArgs {
    #[command(subcommand)]
    pub action: JobsAction,
}

/// One-off job runs
#[derive(Subcommand, Debug)]
pub enum JobsAction {
    /// Send due check-in reminders
    Remind,
    /// Aggregate daily statistics
    Aggregate {
        /// Day to aggregate (default: each chat's local yesterday)
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<NaiveDate>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_aggregate_with_date() {
        let cli = Cli::try_parse_from(["shift-bot", "jobs", "aggregate", "--date", "2024-05-01"])
            .unwrap();
        match cli.command {
            Commands::Jobs(JobsArgs {
                action: JobsAction::Aggregate { date },
            }) => assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 1)),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_health_addr_overrides_config() {
        let config = Config::default();
        let cli = Cli::try_parse_from(["shift-bot", "run", "--health-port", "9000"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.health_addr(&config), "0.0.0.0:9000");
        assert_eq!(RunArgs { health_host: None, health_port: None }.health_addr(&config), config.health_addr());
    }

    #[test]
    fn test_parse_verbose_migrate() {
        let cli = Cli::try_parse_from(["shift-bot", "--verbose", "migrate", "status"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Migrate(MigrateArgs {
                action: MigrateAction::Status
            })
        ));
    }
}
