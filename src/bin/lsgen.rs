use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lsystem_turtle::bounds::BoundingBox;
use lsystem_turtle::cache::{CachedVertices, VertexCache};
use lsystem_turtle::catalog::{self, SystemId};
use lsystem_turtle::config::Config;
use lsystem_turtle::export;
use lsystem_turtle::l_system::LSystem;
use lsystem_turtle::logging::init_logging;
use nalgebra::Point3;

#[derive(Parser)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    /// RON config file
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Overrides the configured cache directory
    #[clap(long)]
    cache_dir: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the predefined systems and their ids
    List,
    /// Generate (or load from cache) a catalog system
    Draw {
        /// Numeric id or name, e.g. 4 or dragon_curve
        system: String,
        iterations: u32,
        /// Also write the drawing as SVG
        #[clap(long)]
        svg: Option<PathBuf>,
    },
    /// Generate a grammar from a RON file into the scratch slot
    Custom {
        grammar: PathBuf,
        iterations: u32,
        #[clap(long)]
        svg: Option<PathBuf>,
    },
    /// Keep the scratch file under a name of its own
    Save {
        /// File name in the cache directory, `.bin` is added when missing
        #[clap(required_unless_present = "canonical")]
        name: Option<String>,
        /// Save under the catalog name of SYSTEM at ITERATIONS instead
        #[clap(long, num_args = 2, value_names = ["SYSTEM", "ITERATIONS"], conflicts_with = "name")]
        canonical: Option<Vec<String>>,
    },
    /// Read a file from the cache directory and report its bounds
    Load {
        file: String,
        #[clap(long)]
        svg: Option<PathBuf>,
    },
}

fn report(cached: &CachedVertices) {
    println!(
        "{} -> {} ({:?}, {} vertices)",
        cached.system,
        cached.path.display(),
        cached.status,
        cached.vertices.len()
    );
    report_bounds(&cached.vertices);
}

fn report_bounds(vertices: &[Point3<f32>]) {
    if let Some(bbox) = BoundingBox::from_vertices(vertices) {
        println!(
            "bounds: min ({}, {}, {}) max ({}, {}, {})",
            bbox.min.x, bbox.min.y, bbox.min.z, bbox.max.x, bbox.max.y, bbox.max.z
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load_or_default(cli.config.as_deref())?;
    if let Some(dir) = cli.cache_dir {
        config.cache_dir = dir;
    }
    init_logging(&config.log_filter);
    let cache = VertexCache::from_config(&config);

    let (vertices, svg) = match cli.command {
        Command::List => {
            println!("{}", catalog::listing());
            return Ok(());
        }
        Command::Draw {
            system,
            iterations,
            svg,
        } => {
            let system: SystemId = system.parse()?;
            let cached = cache.get_vertices(system.id(), iterations)?;
            report(&cached);
            (cached.vertices, svg)
        }
        Command::Custom {
            grammar,
            iterations,
            svg,
        } => {
            let cached = cache.get_custom(LSystem::from_file(&grammar)?, iterations)?;
            report(&cached);
            (cached.vertices, svg)
        }
        Command::Save { name, canonical } => {
            let path = match canonical.as_deref() {
                Some([system, iterations]) => {
                    let system: SystemId = system.parse()?;
                    let iterations: u32 = iterations
                        .parse()
                        .with_context(|| format!("bad iteration count '{}'", iterations))?;
                    cache.save_scratch(None, system, iterations)?
                }
                _ => cache.save_scratch(name.as_deref(), SystemId::Custom, 0)?,
            };
            println!("saved {}", path.display());
            return Ok(());
        }
        Command::Load { file, svg } => {
            let vertices = cache.load_file(&file)?;
            println!("{} ({} vertices)", cache.path_for(&file).display(), vertices.len());
            report_bounds(&vertices);
            (vertices, svg)
        }
    };

    if let Some(path) = svg {
        export::svg::save(&path, &vertices, config.svg_stroke_width)?;
    }
    Ok(())
}
