mod churn;
mod scenarios;

use clap::{Parser, ValueEnum};
use hoard_arena::{BumpArena, Global, PageArena};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ArenaKind {
    Global,
    Page,
    Bump,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of entries used by the collision and churn runs.
    #[clap(short = 'n', long, default_value = "100")]
    entries: usize,
    /// Seed for the churn run.
    #[clap(short = 's', long, default_value = "25")]
    seed: u64,
    /// Allocator backing the churn run.
    #[clap(short = 'a', long, value_enum, default_value = "page")]
    arena: ArenaKind,
}

fn main() -> color_eyre::Result<()> {
    let args = Args::parse();

    color_eyre::install()?;
    hoard_logger::setup();

    scenarios::hash_map(args.entries)?;
    scenarios::hash_set()?;
    scenarios::growable_array()?;
    scenarios::arenas()?;

    let stats = match args.arena {
        ArenaKind::Global => churn::run::<Global>(args.entries, args.seed)?,
        ArenaKind::Page => churn::run::<PageArena>(args.entries, args.seed)?,
        ArenaKind::Bump => churn::run::<BumpArena>(args.entries, args.seed)?,
    };
    log::info!(
        "churn on {:?} arena done: {} bytes used, {} bytes reserved",
        args.arena,
        stats.used,
        stats.reserved
    );

    Ok(())
}
