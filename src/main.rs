// src/main.rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use satchel::{CapKind, DuplicatePolicy, Options, RepositoryRegistry, RequestParser, Session};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "satchel")]
#[command(author, version, about = "Package request parsing and transfer recovery front end", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse package arguments into install/remove requests
    Request {
        /// Package arguments, e.g. '+vim', '-emacs', 'satchel>=1.2.15'
        args: Vec<String>,
        /// Kind of resolvable the command operates on
        #[arg(short = 't', long = "type", default_value = "package")]
        kind: CapKind,
        /// Repository definitions (TOML) used to resolve 'repo:' prefixes
        #[arg(long)]
        repos: Option<PathBuf>,
        /// How to treat a capability requested both for install and removal
        #[arg(long, default_value = "retain")]
        duplicates: DuplicatePolicy,
        /// Answer prompts with their defaults instead of asking
        #[arg(long)]
        non_interactive: bool,
    },
    /// List the configured repositories
    Repos {
        /// Repository definitions (TOML)
        #[arg(long)]
        repos: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Request {
            args,
            kind,
            repos,
            duplicates,
            non_interactive,
        }) => {
            let registry = match repos {
                Some(path) => RepositoryRegistry::load(&path)?,
                None => RepositoryRegistry::new(),
            };
            info!(
                "parsing {} argument(s) against {} repositories",
                args.len(),
                registry.repositories().len()
            );

            let mut session = Session::new(Options {
                non_interactive,
                ..Options::default()
            });
            let requests = RequestParser::new(&mut session, &registry, kind)
                .duplicate_policy(duplicates)
                .parse(&args)?;

            if requests.is_empty() {
                println!("Nothing requested.");
                return Ok(());
            }
            if !requests.wanted().is_empty() {
                println!("Wanted:");
                for pair in requests.wanted() {
                    println!("  {}", pair);
                }
            }
            if !requests.unwanted().is_empty() {
                println!("Unwanted:");
                for pair in requests.unwanted() {
                    println!("  {}", pair);
                }
            }
            Ok(())
        }
        Some(Commands::Repos { repos }) => {
            let registry = RepositoryRegistry::load(&repos)?;
            for (n, repo) in registry.repositories().iter().enumerate() {
                println!(
                    "{:2}  {:10}  {:24}  {}  {}",
                    n + 1,
                    repo.alias,
                    repo.name,
                    if repo.enabled { "enabled " } else { "disabled" },
                    repo.url
                );
            }
            Ok(())
        }
        None => {
            println!("satchel v{}", env!("CARGO_PKG_VERSION"));
            println!("Run 'satchel --help' for usage information");
            Ok(())
        }
    }
}
