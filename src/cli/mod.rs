pub mod process;
pub mod today;

use std::env;

use anyhow::Result;
use clap::{Parser, Subcommand};
use process::{kill_previous_daemons, restart_daemon};
use today::{process_today_command, TodayCommand};
use tracing::level_filters::LevelFilter;

use crate::{
    daemon::start_daemon,
    utils::{
        dir::create_application_default_path,
        logging::{enable_logging, CLI_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "Dwell", version, long_about = None)]
#[command(about = "Tally of how long you were actively at the screen today", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Starts a daemon for the application")]
    Init {},
    #[command(about = "Print the tallied screen time for a day")]
    Today {
        #[command(flatten)]
        command: TodayCommand,
    },
    #[command(
        about = "Run a daemon directly in current console with a live counter. Used for creating a daemon internally and for debugging"
    )]
    Serve {},
    #[command(about = "Stop currently running daemon.")]
    Stop {},
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(
        CLI_PREFIX,
        &create_application_default_path()?,
        logging_level,
        args.log,
    )?;

    match args.commands {
        Commands::Init {} => {
            restart_daemon()?;
            Ok(())
        }
        Commands::Stop {} => {
            let process_name = env::current_exe().expect("Can't operate without an executable");
            kill_previous_daemons(&process_name);
            Ok(())
        }
        Commands::Serve {} => {
            start_daemon(create_application_default_path()?).await?;
            Ok(())
        }
        Commands::Today { command } => process_today_command(command).await,
    }
}
