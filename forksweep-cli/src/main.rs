//! forksweep CLI - find forks and checkouts that are safe to delete
//!
//! `remote` classifies the account's GitHub forks, `local` scans git
//! checkouts under a directory. Nothing is deleted or archived unless asked.

mod commands;

use clap::{Parser, Subcommand};
use forksweep_core::{CliOverrides, Config};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{LocalArgs, RemoteArgs};

/// forksweep: find forks and local checkouts that are safe to delete
#[derive(Parser, Debug)]
#[command(name = "forksweep")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// GitHub API base URL (overrides config and env)
    #[arg(long, global = true, env = "FORKSWEEP_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Classify the account's forks on GitHub
    #[command(visible_alias = "r")]
    Remote(RemoteArgs),

    /// Scan local checkouts for unmerged work
    #[command(visible_alias = "l")]
    Local(LocalArgs),

    /// Show current configuration
    Config,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        let mut overrides = CliOverrides {
            api_url: self.api_url.clone(),
            ..Default::default()
        };
        match &self.command {
            Some(Commands::Remote(args)) => overrides.skip_upstream = args.skip_upstream,
            Some(Commands::Local(args)) => {
                overrides.workers = args.workers;
                overrides.task_timeout = args.timeout;
            }
            _ => {}
        }
        overrides
    }
}

fn init_tracing(verbose: bool) {
    let filter = if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load_with_overrides(cli.overrides())?;

    tracing::debug!(
        workers = config.scan.workers,
        task_timeout = ?config.scan.task_timeout,
        host = %config.github.host,
        api_url = ?config.github.api_url,
        "Configuration loaded"
    );

    match cli.command {
        Some(Commands::Version) => {
            println!("forksweep {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Remote(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Local(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Config) => {
            print_config(&config);
        }
        None => {
            println!("forksweep - find forks and checkouts that are safe to delete");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn print_config(config: &Config) {
    let filter = &config.filter;
    println!("forksweep Configuration");
    println!("=======================");
    println!();
    println!("Filter:");
    if filter.blacklist.is_empty() {
        println!("  blacklist: (none)");
    } else {
        let names: Vec<&str> = filter.blacklist.iter().map(String::as_str).collect();
        println!("  blacklist: {}", names.join(", "));
    }
    println!("  include_private: {}", filter.include_private);
    println!("  include_starred: {}", filter.include_starred);
    println!("  include_forked: {}", filter.include_forked);
    println!("  exclude_commits_ahead: {}", filter.exclude_commits_ahead);
    println!(
        "  since: {}",
        humantime_serde::re::humantime::format_duration(filter.since)
    );
    println!();
    println!("Scan:");
    println!("  workers: {}", config.scan.workers);
    match config.scan.effective_timeout() {
        Some(t) => println!(
            "  task_timeout: {}",
            humantime_serde::re::humantime::format_duration(t)
        ),
        None => println!("  task_timeout: (disabled)"),
    }
    println!();
    println!("GitHub:");
    println!("  host: {}", config.github.host);
    println!(
        "  api_url: {}",
        config.github.api_url.as_deref().unwrap_or("(default)")
    );
    println!("  skip_upstream: {}", config.github.skip_upstream);
    println!();
    if let Some(path) = Config::default_config_path() {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
}
