mod app;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use hopmap_core::{Category, Coordinates, Venue, VenuePatch};
use hopmap_discovery::DiscoveryClient;
use hopmap_store::FileStore;

use app::{App, CheckOutcome, SearchOutcome};

#[derive(Debug, Parser)]
#[command(name = "hopmap")]
#[command(about = "Curate a local map of craft-beer venues")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Import venues from a KML file
    Import { file: PathBuf },
    /// Export all venues to a KML file
    Export {
        /// Directory the export file is written into
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// List the committed collection
    List,
    /// Add a venue manually
    Add {
        name: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        website: Option<String>,
        #[arg(long)]
        maps_uri: Option<String>,
    },
    /// Edit fields of an existing venue
    Edit {
        id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        lng: Option<f64>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        website: Option<String>,
        #[arg(long)]
        maps_uri: Option<String>,
    },
    /// Remove a venue permanently
    Remove { id: Uuid },
    /// Ask the discovery service for new venues and stage the finds
    Search {
        query: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        lng: Option<f64>,
        /// Promote every staged find into the committed collection
        #[arg(long)]
        promote_all: bool,
    },
    /// Ask the discovery service whether a venue still operates
    Check { id: Uuid },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = hopmap_core::load_app_config()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let discovery = match config.discovery_url.as_deref() {
        Some(url) => Some(
            DiscoveryClient::new(
                url,
                config.discovery_api_key.as_deref(),
                config.discovery_timeout_secs,
                &config.user_agent,
            )?
            .with_retry_policy(
                config.discovery_max_retries,
                config.discovery_retry_backoff_ms,
            ),
        ),
        None => None,
    };

    let store = FileStore::new(&config.store_path);
    let mut app = App::new(store, discovery);
    app.bootstrap(&config.bootstrap_kml_path).await;

    match cli.command {
        Commands::Import { file } => {
            let text = tokio::fs::read_to_string(&file).await?;
            match app.import_kml(&text).await {
                Ok(added) => println!("imported {added} new venue(s)"),
                Err(e) => println!("import failed, collection unchanged: {e}"),
            }
        }
        Commands::Export { out_dir } => {
            let (filename, doc) = app.export_kml();
            let path = out_dir.join(filename);
            tokio::fs::write(&path, doc).await?;
            println!("exported {} venue(s) to {}", app.committed().len(), path.display());
        }
        Commands::List => {
            print_venues(app.committed());
        }
        Commands::Add {
            name,
            lat,
            lng,
            category,
            description,
            address,
            website,
            maps_uri,
        } => {
            let mut venue = Venue::new(name, Coordinates::new(lat, lng)?);
            venue.category = category.as_deref().map_or(Category::Common, Category::from_label);
            venue.description = description.unwrap_or_default();
            venue.address = address;
            venue.website = website;
            venue.maps_uri = maps_uri;

            let name = venue.name.clone();
            if app.add_venue(venue).await {
                println!("added \"{name}\"");
            } else {
                println!("a venue named \"{name}\" already exists; nothing added");
            }
        }
        Commands::Edit {
            id,
            name,
            lat,
            lng,
            category,
            description,
            address,
            website,
            maps_uri,
        } => {
            let coordinates = match (lat, lng) {
                (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)?),
                (None, None) => None,
                _ => anyhow::bail!("--lat and --lng must be provided together"),
            };
            let patch = VenuePatch {
                name,
                description,
                category: category.as_deref().map(Category::from_label),
                coordinates,
                address,
                website,
                maps_uri,
            };
            match app.edit_venue(id, patch).await {
                Ok(()) => println!("updated {id}"),
                Err(e) => println!("edit rejected, collection unchanged: {e}"),
            }
        }
        Commands::Remove { id } => {
            if app.delete_venue(id).await {
                println!("removed {id}");
            } else {
                println!("no venue with id {id}");
            }
        }
        Commands::Search {
            query,
            lat,
            lng,
            promote_all,
        } => {
            let origin = match (lat, lng) {
                (Some(lat), Some(lng)) => Some((lat, lng)),
                (None, None) => None,
                _ => anyhow::bail!("--lat and --lng must be provided together"),
            };
            match app.search(&query, origin).await {
                SearchOutcome::Staged {
                    summary,
                    staged,
                    sources,
                } => {
                    println!("{summary}");
                    println!("staged {staged} new find(s):");
                    print_venues(app.found());
                    for source in sources {
                        println!("source: {source}");
                    }
                    if promote_all {
                        let ids: Vec<Uuid> = app.found().iter().map(|v| v.id).collect();
                        for id in ids {
                            app.promote(id).await;
                        }
                        println!("promoted all finds; collection now holds {} venue(s)", app.committed().len());
                    }
                }
                SearchOutcome::Failed { advisory } => println!("{advisory}"),
                SearchOutcome::Stale => println!("search superseded; result discarded"),
            }
        }
        Commands::Check { id } => match app.check_health(id).await {
            CheckOutcome::Updated { status, reason } => {
                let reason = reason.unwrap_or_else(|| "no reason given".to_string());
                println!("{id}: {status} ({reason})");
            }
            CheckOutcome::AlreadyRunning => println!("a check for {id} is already running"),
            CheckOutcome::NotFound => println!("no venue with id {id}"),
            CheckOutcome::Failed { advisory } => println!("{advisory}"),
        },
    }

    Ok(())
}

fn print_venues(venues: &[Venue]) {
    if venues.is_empty() {
        println!("(no venues)");
        return;
    }
    for v in venues {
        let address = v.address.as_deref().unwrap_or("-");
        println!(
            "{}  {:<30}  {:<8}  {:>9.4},{:>9.4}  {:<8}  {}",
            v.id,
            v.name,
            v.category,
            v.coordinates.latitude,
            v.coordinates.longitude,
            v.alive_status,
            address
        );
    }
}
