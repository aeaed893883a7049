use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use spoolyard_client::{contract, Client};
use spoolyard_ids::Id;
use spoolyard_models::{FilamentCreate, SpoolCreate, VendorCreate};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "spoolyard",
    about = "Command line interface for the Spoolyard inventory API",
    version,
    arg_required_else_help = true
)]
struct Cli {
    /// Base URL of the Spoolyard server.
    #[arg(long, env = "SPOOLYARD_URL", default_value = "http://localhost:7912")]
    url: String,

    /// Pretty-print JSON output.
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Vendor commands.
    Vendor {
        #[command(subcommand)]
        command: VendorCommands,
    },

    /// Filament commands.
    Filament {
        #[command(subcommand)]
        command: FilamentCommands,
    },

    /// Spool commands.
    Spool {
        #[command(subcommand)]
        command: SpoolCommands,
    },

    /// Run the identifier contract scenarios against the server.
    Check,

    /// Print version information.
    Version,
}

#[derive(Subcommand)]
enum VendorCommands {
    Create {
        name: String,
        #[arg(long)]
        comment: Option<String>,
        #[arg(long)]
        external_id: Option<String>,
    },
    List,
    Get {
        id: Id,
    },
    Delete {
        id: Id,
    },
}

#[derive(Subcommand)]
enum FilamentCommands {
    Create {
        /// Vendor id.
        #[arg(long)]
        vendor: Id,
        /// Density in g/cm³.
        #[arg(long)]
        density: f64,
        /// Diameter in mm.
        #[arg(long, default_value_t = 1.75)]
        diameter: f64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        material: Option<String>,
        /// Net filament weight per spool in grams.
        #[arg(long)]
        weight: Option<f64>,
    },
    List {
        /// Only filaments of this vendor.
        #[arg(long)]
        vendor: Option<Id>,
    },
    Delete {
        id: Id,
    },
}

#[derive(Subcommand)]
enum SpoolCommands {
    Create {
        /// Filament id.
        #[arg(long)]
        filament: Id,
        #[arg(long)]
        initial_weight: Option<f64>,
        #[arg(long)]
        location: Option<String>,
    },
    List {
        /// Only spools of this filament.
        #[arg(long)]
        filament: Option<Id>,
    },
    Delete {
        id: Id,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let client =
        Client::new(&cli.url).with_context(|| format!("Invalid server URL '{}'", cli.url))?;
    let pretty = cli.pretty;

    match cli.command {
        Commands::Vendor { command } => match command {
            VendorCommands::Create {
                name,
                comment,
                external_id,
            } => {
                let mut input = VendorCreate::new(name);
                input.comment = comment;
                input.external_id = external_id;
                print_json(&client.create_vendor(&input).await?, pretty)?;
            }
            VendorCommands::List => print_json(&client.list_vendors().await?, pretty)?,
            VendorCommands::Get { id } => print_json(&client.get_vendor(id).await?, pretty)?,
            VendorCommands::Delete { id } => {
                client.delete_vendor(id).await?;
                eprintln!("Deleted vendor {id}");
            }
        },
        Commands::Filament { command } => match command {
            FilamentCommands::Create {
                vendor,
                density,
                diameter,
                name,
                material,
                weight,
            } => {
                let mut input = FilamentCreate::new(vendor, density, diameter);
                input.name = name;
                input.material = material;
                input.weight = weight;
                print_json(&client.create_filament(&input).await?, pretty)?;
            }
            FilamentCommands::List { vendor } => {
                print_json(&client.list_filaments(vendor).await?, pretty)?
            }
            FilamentCommands::Delete { id } => {
                client.delete_filament(id).await?;
                eprintln!("Deleted filament {id}");
            }
        },
        Commands::Spool { command } => match command {
            SpoolCommands::Create {
                filament,
                initial_weight,
                location,
            } => {
                let mut input = SpoolCreate::new(filament);
                input.initial_weight = initial_weight;
                input.location = location;
                print_json(&client.create_spool(&input).await?, pretty)?;
            }
            SpoolCommands::List { filament } => {
                print_json(&client.list_spools(filament).await?, pretty)?
            }
            SpoolCommands::Delete { id } => {
                client.delete_spool(id).await?;
                eprintln!("Deleted spool {id}");
            }
        },
        Commands::Check => run_check(&client).await?,
        Commands::Version => {}
    }

    Ok(())
}

async fn run_check(client: &Client) -> Result<()> {
    let report = contract::run_all(client)
        .await
        .with_context(|| format!("Identifier contract failed against {}", client.base_url()))?;

    for scenario in &report.scenarios {
        let created = scenario
            .created
            .iter()
            .map(|(kind, id)| format!("{kind} {id}"))
            .collect::<Vec<_>>()
            .join(", ");
        println!("ok  {:<24} {}", scenario.name, created);
    }
    println!("{} scenarios passed", report.scenarios.len());
    Ok(())
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    if pretty {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", serde_json::to_string(value)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ids_are_parsed_with_the_codec() {
        let cli = Cli::try_parse_from(["spoolyard", "vendor", "get", "9007199254740993"]).unwrap();
        match cli.command {
            Commands::Vendor {
                command: VendorCommands::Get { id },
            } => assert_eq!(id.get(), 9_007_199_254_740_993),
            _ => panic!("unexpected command"),
        }

        assert!(Cli::try_parse_from(["spoolyard", "vendor", "get", "-1"]).is_err());
    }
}
