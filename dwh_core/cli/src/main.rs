mod commands;

use crate::commands::{
    handle_create_tables, handle_etl, handle_status, handle_up, ConfigPaths, StatusArgs, UpArgs,
};
use clap::{Parser, Subcommand};
use common::error::DwhError;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "dwh",
    about = "Provision a Redshift warehouse and load the star schema"
)]
pub struct Cli {
    #[arg(
        long = "config-path",
        short = 'c',
        help = "directory holding dwh.toml",
        global = true
    )]
    pub config_path: Option<PathBuf>,
    #[arg(
        long = "secrets-path",
        help = "credentials file (defaults to aws-secret.toml next to dwh.toml)",
        global = true
    )]
    pub secrets_path: Option<PathBuf>,
    #[arg(
        long = "log-level",
        help = "log filter, overrides RUST_LOG",
        global = true
    )]
    pub log_level: Option<String>,
    #[command(subcommand)]
    pub command: Option<Cmd>,
}

#[derive(Subcommand)]
pub enum Cmd {
    /// Provision, wait for the cluster, then rebuild and load the warehouse (default)
    Up(UpArgs),
    /// Report whether the role and the cluster exist
    Status(StatusArgs),
    /// Drop and recreate every table
    CreateTables,
    /// Load the staging tables, fill the star schema and deduplicate it
    Etl,
}

fn run_cmd(func: Result<(), DwhError>) {
    if let Err(e) = func {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init_logger(cli.log_level.as_deref());

    let paths = ConfigPaths::new(cli.config_path, cli.secrets_path);
    match cli.command.unwrap_or_else(|| Cmd::Up(UpArgs::default())) {
        Cmd::Up(args) => run_cmd(handle_up(&args, &paths)),
        Cmd::Status(args) => run_cmd(handle_status(&args, &paths)),
        Cmd::CreateTables => run_cmd(handle_create_tables(&paths)),
        Cmd::Etl => run_cmd(handle_etl(&paths)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_up() {
        let cli = Cli::try_parse_from(["dwh", "-c", "/tmp/project"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config_path, Some(PathBuf::from("/tmp/project")));
    }

    #[test]
    fn yes_and_no_conflict() {
        assert!(Cli::try_parse_from(["dwh", "up", "--yes", "--no"]).is_err());
    }

    #[test]
    fn up_flags_are_parsed() {
        let cli = Cli::try_parse_from([
            "dwh",
            "up",
            "--yes",
            "--poll-interval-secs",
            "5",
            "--wait-timeout-secs",
            "600",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Some(Cmd::Up(args)) => {
                assert!(args.yes);
                assert!(!args.no);
                assert_eq!(args.poll_interval_secs, 5);
                assert_eq!(args.wait_timeout_secs, Some(600));
            }
            _ => panic!("expected the up subcommand"),
        }
    }

    #[test]
    fn status_accepts_details() {
        let cli = Cli::try_parse_from(["dwh", "status", "--details"]).unwrap();
        assert!(matches!(cli.command, Some(Cmd::Status(StatusArgs { details: true }))));
    }
}
