//! dupengine CLI: a thin `clap`-derived front end over the library engine,
//! grounded on the teacher's `engine::arg_parser`/`engine::cli` split
//! (subcommand enum parsed by `clap::Parser`, dispatched to library calls).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use dupengine::{
    all_drives, find_by_size, find_by_type, find_duplicates, format_size, spawn_startup_sweep,
    CacheStats, CancelToken, HashCache, KeepStrategy, NullProgress, SizeCondition, SizeUnit,
};

#[derive(Parser)]
#[command(name = "dupengine")]
#[command(about = "Find duplicate, oversized, or by-type files across one or more directories.")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose logging.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Path to the hash cache database. Default: the per-user app-data dir.
    #[arg(long, global = true)]
    cache: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Find groups of content-identical files.
    Dup {
        /// Root directories to scan.
        roots: Vec<PathBuf>,
        /// Ignore files smaller than this many bytes.
        #[arg(long, default_value_t = 0)]
        min_size: u64,
        /// Print the candidate-to-remove list for each group (keeping the newest).
        #[arg(long)]
        show_removal_candidates: bool,
    },
    /// Find files matching a size condition.
    Size {
        roots: Vec<PathBuf>,
        #[arg(long, value_enum)]
        condition: SizeConditionArg,
        #[arg(long)]
        value: f64,
        #[arg(long, value_enum)]
        unit: SizeUnitArg,
    },
    /// Find files by type category.
    Type {
        roots: Vec<PathBuf>,
        /// Category keys, e.g. images videos documents.
        #[arg(long, num_args = 1.., required = true)]
        categories: Vec<String>,
    },
    /// List mountable drive roots on this host.
    Drives,
    /// Hash cache maintenance.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    Stats,
    CleanupOrphaned,
    CleanupStale,
    Vacuum,
    Clear,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum SizeConditionArg {
    LargerThan,
    SmallerThan,
    Exactly,
}

impl From<SizeConditionArg> for SizeCondition {
    fn from(v: SizeConditionArg) -> Self {
        match v {
            SizeConditionArg::LargerThan => SizeCondition::LargerThan,
            SizeConditionArg::SmallerThan => SizeCondition::SmallerThan,
            SizeConditionArg::Exactly => SizeCondition::Exactly,
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum SizeUnitArg {
    B,
    Kb,
    Mb,
    Gb,
    Tb,
}

impl From<SizeUnitArg> for SizeUnit {
    fn from(v: SizeUnitArg) -> Self {
        match v {
            SizeUnitArg::B => SizeUnit::B,
            SizeUnitArg::Kb => SizeUnit::KB,
            SizeUnitArg::Mb => SizeUnit::MB,
            SizeUnitArg::Gb => SizeUnit::GB,
            SizeUnitArg::Tb => SizeUnit::TB,
        }
    }
}

fn default_cache_path() -> PathBuf {
    dupengine::config::PackagePaths::get()
        .app_data_dir()
        .join(dupengine::config::PackagePaths::get().db_filename())
}

fn open_cache(path: &Option<PathBuf>) -> Result<Arc<HashCache>> {
    let path = path.clone().unwrap_or_else(default_cache_path);
    let cache = HashCache::open(&path)
        .with_context(|| format!("open hash cache at {}", path.display()))?;
    Ok(Arc::new(cache))
}

fn print_cache_stats(stats: &CacheStats) {
    println!(
        "{} entries, {} on disk ({})",
        stats.entries,
        format_size(stats.bytes),
        stats.path.display()
    );
}

fn main() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();
    dupengine::logger::setup_logging(cli.verbose);

    let cancel = CancelToken::new();
    cancel.install_ctrlc_handler();

    match cli.command {
        Command::Dup {
            roots,
            min_size,
            show_removal_candidates,
        } => {
            let cache = open_cache(&cli.cache)?;
            spawn_startup_sweep(Arc::clone(&cache));
            let (groups, stats) =
                find_duplicates(&roots, min_size, &cache, &cancel, &NullProgress)?;
            println!(
                "{} duplicate group(s) across {} file(s) scanned",
                groups.len().to_string().green(),
                stats.files_observed
            );
            for group in &groups {
                println!(
                    "- {} ({} copies, {} each)",
                    format!("{:016x}", group.full_hash).cyan(),
                    group.files.len(),
                    format_size(group.size)
                );
                for file in &group.files {
                    println!("    {}", file.path.display());
                }
                if show_removal_candidates {
                    for candidate in group.candidates_to_remove(KeepStrategy::Newest) {
                        println!("    {} {}", "remove:".yellow(), candidate.display());
                    }
                }
            }
        }
        Command::Size {
            roots,
            condition,
            value,
            unit,
        } => {
            let found = find_by_size(&roots, condition.into(), value, unit.into(), &cancel, &NullProgress)?;
            println!("{} file(s) matched", found.len());
            for file in &found {
                println!("  {} ({})", file.path.display(), format_size(file.size));
            }
        }
        Command::Type { roots, categories } => {
            let keys: Vec<&str> = categories.iter().map(String::as_str).collect();
            let found = find_by_type(&roots, &keys, &cancel, &NullProgress)?;
            println!("{} file(s) matched", found.len());
            for file in &found {
                let label = file.group_label.as_deref().unwrap_or("?");
                println!("  [{label}] {}", file.path.display());
            }
        }
        Command::Drives => {
            for drive in all_drives() {
                let dtype = dupengine::drive_type_for_path(&drive);
                println!("{} ({:?})", drive.display(), dtype);
            }
        }
        Command::Cache { action } => {
            let cache = open_cache(&cli.cache)?;
            match action {
                CacheAction::Stats => print_cache_stats(&cache.stats()),
                CacheAction::CleanupOrphaned => {
                    let removed = dupengine::sweep_orphans(&cache);
                    println!("removed {removed} orphaned entr(y/ies)");
                }
                CacheAction::CleanupStale => {
                    let removed = dupengine::sweep_stale(&cache);
                    println!("removed {removed} stale entr(y/ies)");
                }
                CacheAction::Vacuum => {
                    cache.vacuum();
                    println!("vacuumed");
                }
                CacheAction::Clear => {
                    cache.clear_all()?;
                    println!("cache cleared");
                }
            }
        }
    }

    log::debug!("total time: {:?}", start.elapsed());
    Ok(())
}
