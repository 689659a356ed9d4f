use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ht_cli::commands::export::SystemClipboard;
use ht_cli::commands::{clear, delete, export, list, rename, start, status, stop, watch};
use ht_cli::{Cli, Commands, Config, Session};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let mut session = Session::open(&config)?;
    let now = Utc::now();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::Start(args) => start::run(&mut out, args, session.store_mut(), now)?,
        Commands::Stop(args) => stop::run(&mut out, args, session.store_mut(), now)?,
        Commands::Rename(args) => rename::run(&mut out, args, session.store_mut())?,
        Commands::Delete(args) => delete::run(&mut out, args, session.store_mut())?,
        Commands::Clear(args) => {
            let mut input = std::io::stdin().lock();
            clear::run(&mut input, &mut out, args, session.store_mut())?;
        }
        Commands::List(args) => list::run(&mut out, args, session.store().forest(), now)?,
        Commands::Status => status::run(&mut out, session.store().forest(), &config.default_title, now)?,
        Commands::Export(args) => {
            export::run(&mut out, args, session.store().forest(), &SystemClipboard, now)?;
        }
        Commands::Watch => {
            drop(out);
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("failed to start runtime")?;
            runtime.block_on(watch::run(&mut session, &config))?;
            return session.flush();
        }
    }

    session.flush()
}
