use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use chainconf_tools::config::{self, ConfigInputs, ConfigOverrides};
use chainconf_tools::extensions::{self, DirectorySource};
use chainconf_tools::{assembler, logger, rpc, tasks, Network, TaskRegistry};

#[derive(Parser)]
#[command(name = "chainconf")]
#[command(about = "Network, account and explorer configuration for smart-contract toolchains")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Overrides file (defaults to ./chainconf.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory of task manifests
    #[arg(long, env = "CHAINCONF_TASKS_DIR", default_value = extensions::DEFAULT_TASKS_DIR, global = true)]
    tasks_dir: PathBuf,

    /// Refuse to start when the configuration has validation issues
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Json,
    Toml,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a redacted configuration summary
    Show {
        /// Only show this network
        #[arg(short, long)]
        network: Option<Network>,
    },
    /// Export the configuration record for the toolchain
    Export {
        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Keep mnemonics, private keys and API keys in the output
        #[arg(long)]
        include_secrets: bool,
    },
    /// Check configuration invariants
    Validate,
    /// List tasks registered by extensions
    Tasks,
    /// Run a registered task
    Run {
        task: String,
        /// Network to run against (defaults to the task's own)
        #[arg(short, long)]
        network: Option<Network>,
    },
    /// Compare each network's reported chain id with the configured one
    ChainIds {
        /// Networks to check (all remote networks when omitted)
        #[arg(short, long)]
        network: Vec<Network>,
        #[arg(long, default_value_t = rpc::DEFAULT_TIMEOUT.as_millis() as u64)]
        timeout_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Before parsing: clap and the logger read CHAINCONF_* variables.
    let dotenv = config::load_dotenv();
    let cli = Cli::parse();

    logger::init(logger::level_from_verbosity(cli.verbose))?;
    if let Some(path) = dotenv {
        debug!(path = %path.display(), "loaded .env");
    }

    let overrides = ConfigOverrides::load(cli.config.as_deref())?;
    let inputs = ConfigInputs::from_env().with_overrides(overrides);

    let mut registry = TaskRegistry::new();
    let source = DirectorySource::new(&cli.tasks_dir);
    extensions::load_extensions(&source, inputs.skip_load, &mut registry)
        .with_context(|| format!("loading extensions from {}", cli.tasks_dir.display()))?;

    let record = if cli.strict {
        assembler::assemble_strict(&inputs)?
    } else {
        assembler::assemble(&inputs)
    };
    debug!(tasks = registry.len(), "startup complete");

    match cli.command {
        Commands::Show { network } => {
            record.print_summary(network);
            Ok(())
        }
        Commands::Export {
            format,
            output,
            include_secrets,
        } => {
            let record = if include_secrets {
                record
            } else {
                record.redacted()
            };
            let text = match format {
                ExportFormat::Json => record.to_json()?,
                ExportFormat::Toml => record.to_toml()?,
            };
            match output {
                Some(path) => {
                    std::fs::write(&path, text)
                        .with_context(|| format!("writing {}", path.display()))?;
                    info!(path = %path.display(), "configuration exported");
                }
                None => println!("{text}"),
            }
            Ok(())
        }
        Commands::Validate => {
            let issues = record.validate();
            if issues.is_empty() {
                println!("Configuration is valid");
                return Ok(());
            }
            for issue in &issues {
                println!("  ✗ {issue}");
            }
            println!("{} issue(s) found", issues.len());
            std::process::exit(1);
        }
        Commands::Tasks => {
            if registry.is_empty() {
                println!("No tasks registered");
            }
            for task in registry.iter() {
                println!(
                    "  {:<20} {}",
                    task.manifest.name,
                    task.manifest.description.as_deref().unwrap_or("")
                );
            }
            Ok(())
        }
        Commands::Run { task, network } => {
            let status = tasks::run_task(&registry, &task, &record, network)?;
            if !status.success() {
                std::process::exit(status.code().unwrap_or(1));
            }
            Ok(())
        }
        Commands::ChainIds {
            network,
            timeout_ms,
        } => {
            let networks = if network.is_empty() {
                Network::ALL.to_vec()
            } else {
                network
            };
            let results =
                rpc::check_chain_ids(&record, &networks, Duration::from_millis(timeout_ms))
                    .await?;

            let mut mismatches = 0;
            for result in &results {
                match &result.reported {
                    Ok(id) if result.matches() => {
                        println!("  ✓ {:<16} {id}", result.network.as_str())
                    }
                    Ok(id) => {
                        mismatches += 1;
                        println!(
                            "  ✗ {:<16} reported {id}, configured {}",
                            result.network.as_str(),
                            result.declared
                        );
                    }
                    Err(e) => {
                        mismatches += 1;
                        println!("  ✗ {:<16} {e}", result.network.as_str());
                    }
                }
            }
            if mismatches > 0 {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
