//! Applies or rolls back the schema migrations.
//!
//! The database URL comes from the regular configuration layers, so `APP__DATABASE_URL`
//! overrides it.

use clap::{Parser, Subcommand};
use crm_api::{config, db, migrator::Migrator};
use sea_orm_migration::MigratorTrait;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "migration", about = "Manage the crm-api database schema", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Apply pending migrations (default)
    Up {
        #[arg(short, long, help = "Number of pending migrations to apply; all when omitted")]
        num: Option<u32>,
    },
    /// Roll back applied migrations
    Down {
        #[arg(short, long, default_value_t = 1, help = "Number of migrations to roll back")]
        num: u32,
    },
    /// Show which migrations are applied
    Status,
    /// Drop every table and reapply all migrations
    Fresh,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Up { num: None });

    let cfg = config::load_config()?;
    config::init_tracing(&cfg.log_level, cfg.log_json);
    info!(?command, "Starting database migration");

    let pool = db::establish_connection_from_app_config(&cfg).await?;

    let result = match command {
        Command::Up { num } => Migrator::up(&pool, num).await,
        Command::Down { num } => Migrator::down(&pool, Some(num)).await,
        Command::Status => Migrator::status(&pool).await,
        Command::Fresh => Migrator::fresh(&pool).await,
    };

    match result {
        Ok(()) => {
            info!(?command, "Migration command completed successfully");
            Ok(())
        }
        Err(e) => {
            error!(?command, error = %e, "Migration command failed");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Option<Command>, clap::Error> {
        Cli::try_parse_from(std::iter::once("migration").chain(args.iter().copied()))
            .map(|cli| cli.command)
    }

    #[test]
    fn no_subcommand_means_up() {
        assert_eq!(parse(&[]).unwrap(), None);
    }

    #[test]
    fn down_takes_a_step_count() {
        assert_eq!(parse(&["down"]).unwrap(), Some(Command::Down { num: 1 }));
        assert_eq!(
            parse(&["down", "--num", "3"]).unwrap(),
            Some(Command::Down { num: 3 })
        );
    }

    #[test]
    fn unknown_input_is_rejected() {
        assert!(parse(&["sideways"]).is_err());
        assert!(parse(&["down", "3"]).is_err());
    }
}
