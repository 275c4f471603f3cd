use clap::{Parser, Subcommand};
use pantry::catalog::{self, Catalog, FoodItem, FoodKind, ItemName, ItemPatch};
use pantry::control::{self, ControlCommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pantry", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Catalog file to edit (defaults to the handsort data directory)
    #[arg(short = 'f', long, global = true)]
    catalog: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// List the food items in the catalog
    List,
    /// Add a food item, named after its image unless --name is given
    Add {
        image: PathBuf,
        #[arg(short = 'n', long)]
        name: Option<String>,
        /// veg or non-veg
        #[arg(short = 'k', long, default_value = "veg")]
        kind: FoodKind,
    },
    /// Remove the food item at INDEX
    Remove { index: usize },
    /// Change the category of the food item at INDEX
    Kind { index: usize, kind: FoodKind },
    /// Start a new game
    Start,
    /// Pause the running game
    Pause,
    /// Resume a paused game
    Resume,
    /// Abandon the current game and return to the menu
    Stop,
    /// Shut the game down
    Quit,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Start => control::send(ControlCommand::Start),
        Commands::Pause => control::send(ControlCommand::Pause),
        Commands::Resume => control::send(ControlCommand::Resume),
        Commands::Stop => control::send(ControlCommand::Stop),
        Commands::Quit => control::send(ControlCommand::Quit),
        Commands::List => list(&open(cli.catalog)?),
        Commands::Add { image, name, kind } => {
            let mut item = FoodItem::from_image(image, kind);
            if let Some(name) = name {
                item.name = ItemName::new(name);
            }
            if item.name.is_empty() {
                anyhow::bail!("Could not derive a name from the image path; pass --name.");
            }
            let mut catalog = open(cli.catalog)?;
            let index = catalog.add(item)?;
            log::info!("Added item {} to {}", index, catalog.path().display());
            Ok(())
        }
        Commands::Remove { index } => {
            let item = open(cli.catalog)?.remove(index)?;
            log::info!("Removed '{}'", item.name);
            Ok(())
        }
        Commands::Kind { index, kind } => {
            let patch = ItemPatch {
                kind: Some(kind),
                ..Default::default()
            };
            let mut catalog = open(cli.catalog)?;
            let item = catalog.update(index, patch)?;
            log::info!("'{}' is now {}", item.name, item.kind);
            Ok(())
        }
    }
}

fn open(path: Option<PathBuf>) -> anyhow::Result<Catalog> {
    let path = match path {
        Some(p) => p,
        None => catalog::default_catalog_path()?,
    };
    Ok(Catalog::load(path)?)
}

fn list(catalog: &Catalog) -> anyhow::Result<()> {
    if catalog.is_empty() {
        println!("{} is empty", catalog.path().display());
    }
    for (i, item) in catalog.items().iter().enumerate() {
        println!(
            "{:<3} {:<20} {:<8} {}",
            i,
            item.name,
            item.kind,
            item.image.display()
        );
    }
    Ok(())
}
