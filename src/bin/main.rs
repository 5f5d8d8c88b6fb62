//! Pack Resolver CLI
//!
//! Inspect resource pack configuration and resolve block textures.

use clap::{Parser, Subcommand, ValueEnum};
use pack_resolver::{
    EngineSettings, Face, PackConfigLoader, ResolutionEngine, SelectedPackPolicy,
};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pack-resolver")]
#[command(author, version, about = "Resolve block textures across resource packs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one or more block identifiers
    Resolve {
        /// Block identifiers (e.g., "minecraft:stone" or "stone")
        #[arg(required = true)]
        blocks: Vec<String>,

        /// Directory containing one subdirectory per pack
        #[arg(short, long)]
        textures: PathBuf,

        /// Pack configuration file (resourcepack.json)
        #[arg(short, long)]
        config: PathBuf,

        /// Default texture used when no pack supplies one
        #[arg(short, long)]
        default: Option<PathBuf>,

        /// Resolve a specific face instead of the plain block texture
        #[arg(short, long, value_enum)]
        face: Option<FaceArg>,

        /// Let list order win over the selected pack
        #[arg(long)]
        list_order: bool,
    },

    /// Show the search order and metadata of a pack configuration
    Info {
        /// Directory containing one subdirectory per pack
        #[arg(short, long)]
        textures: PathBuf,

        /// Pack configuration file (resourcepack.json)
        #[arg(short, long)]
        config: PathBuf,

        /// Let list order win over the selected pack
        #[arg(long)]
        list_order: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum FaceArg {
    Top,
    Bottom,
    Side,
    Front,
}

impl From<FaceArg> for Face {
    fn from(face: FaceArg) -> Self {
        match face {
            FaceArg::Top => Face::Top,
            FaceArg::Bottom => Face::Bottom,
            FaceArg::Side => Face::Side,
            FaceArg::Front => Face::Front,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve {
            blocks,
            textures,
            config,
            default,
            face,
            list_order,
        } => {
            let mut settings = EngineSettings::new(textures).with_policy(policy(list_order));
            if let Some(default) = default {
                settings = settings.with_default_texture(default);
            }
            resolve_blocks(settings, &config, &blocks, face.map(Face::from))?;
        }
        Commands::Info {
            textures,
            config,
            list_order,
        } => {
            show_config_info(textures, &config, policy(list_order))?;
        }
    }

    Ok(())
}

fn policy(list_order: bool) -> SelectedPackPolicy {
    if list_order {
        SelectedPackPolicy::ListOrder
    } else {
        SelectedPackPolicy::Promote
    }
}

fn resolve_blocks(
    settings: EngineSettings,
    config_path: &PathBuf,
    blocks: &[String],
    face: Option<Face>,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = ResolutionEngine::load_from_path(settings, config_path)?;

    for block in blocks {
        let result = match face {
            Some(face) => engine.resolve_face(block, face),
            None => engine.resolve(block),
        };
        match result {
            Ok(result) => println!("{}: {}", block, result),
            Err(e) => println!("{}: {}", block, e),
        }
    }

    let stats = engine.stats();
    println!("\nResolution Stats:");
    for (pack, count) in &stats.per_pack {
        println!("  {}: {}", pack, count);
    }
    println!("  Fallback: {}", stats.fallback);
    println!("  Not found: {}", stats.not_found);
    println!("  Invalid: {}", stats.invalid);
    println!("  Probes: {} ({} failed)", stats.probes, stats.probe_errors);

    Ok(())
}

fn show_config_info(
    textures_root: PathBuf,
    config_path: &PathBuf,
    policy: SelectedPackPolicy,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading pack configuration from {:?}...", config_path);
    let data = fs::read(config_path)?;
    let (config, warnings) = PackConfigLoader::load_with_warnings(&data)?;

    println!("\nPack Configuration:");
    println!("  Selected: {}", config.selected_pack().unwrap_or("(none)"));
    println!("  Search order:");
    for (i, pack) in config
        .search_order(policy)
        .iter()
        .enumerate()
    {
        let present = if textures_root.join(pack).is_dir() {
            ""
        } else {
            " [missing]"
        };
        println!(
            "    {}. {} ({}px){}",
            i + 1,
            pack,
            config.texture_size_for(pack),
            present
        );
        if let Some(description) = config.description_for(pack) {
            println!("       {}", description);
        }
    }

    if !warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &warnings {
            println!("  - {}", warning);
        }
    }

    Ok(())
}
