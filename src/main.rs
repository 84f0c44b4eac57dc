//! twinpane - directory list engine with a command-line front end.
//!
//! Usage:
//!   twinpane [PATH]                 List a directory
//!   twinpane ls [PATH]              List a directory (explicit)
//!   twinpane stats [PATH]           Show aggregate statistics only
//!   twinpane --help                 Show help

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};

use twinpane_core::{ListConfigBuilder, SortColumn, SortConfig};
use twinpane_list::{FileList, LocalProvider};

#[derive(Parser)]
#[command(
    name = "twinpane",
    version,
    about = "Directory list engine",
    long_about = "twinpane loads a directory the way a two-pane file manager \
                  does: hidden-entry policy applied, entries sorted with \
                  directories first, sizes and statistics aggregated."
)]
struct Cli {
    /// Path to list (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Show hidden entries
    #[arg(short = 'a', long)]
    all: bool,

    /// Column to sort by
    #[arg(short, long, default_value = "name")]
    sort: SortField,

    /// Reverse the sort direction
    #[arg(short, long)]
    reverse: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List a directory
    Ls {
        /// Path to list
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Show hidden entries
        #[arg(short = 'a', long)]
        all: bool,

        /// Column to sort by
        #[arg(short, long, default_value = "name")]
        sort: SortField,

        /// Reverse the sort direction
        #[arg(short, long)]
        reverse: bool,
    },

    /// Show aggregate statistics for a directory
    Stats {
        /// Path to list
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Show hidden entries
        #[arg(short = 'a', long)]
        all: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum SortField {
    #[default]
    Name,
    Extension,
    Size,
    Mode,
    Time,
}

impl From<SortField> for SortColumn {
    fn from(field: SortField) -> Self {
        match field {
            SortField::Name => SortColumn::Name,
            SortField::Extension => SortColumn::Extension,
            SortField::Size => SortColumn::Size,
            SortField::Mode => SortColumn::Mode,
            SortField::Time => SortColumn::Time,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    match cli.command {
        Some(Command::Ls {
            path,
            all,
            sort,
            reverse,
        }) => run_list(&path, all, sort, reverse).await,
        Some(Command::Stats { path, all }) => run_stats(&path, all).await,
        None => run_list(&cli.path, cli.all, cli.sort, cli.reverse).await,
    }
}

/// Load a directory and print its sorted listing.
async fn run_list(path: &PathBuf, all: bool, sort: SortField, reverse: bool) -> Result<()> {
    let list = load(path, all, sort, reverse).await?;

    for id in list.sorted_top_level() {
        let Some(entry) = list.entry(id) else {
            continue;
        };
        let marker = if entry.is_dir() {
            "/"
        } else if entry.is_link {
            "@"
        } else {
            ""
        };
        println!("{:>10}  {}{}", entry.size_label, entry.file_name(), marker);
    }

    print_stats(&list);

    if !list.warnings().is_empty() {
        eprintln!("{} warning(s) while loading", list.warnings().len());
    }

    Ok(())
}

/// Load a directory and print aggregate statistics only.
async fn run_stats(path: &PathBuf, all: bool) -> Result<()> {
    let list = load(path, all, SortField::Name, false).await?;
    print_stats(&list);
    Ok(())
}

async fn load(path: &PathBuf, all: bool, sort: SortField, reverse: bool) -> Result<FileList> {
    let path = path.canonicalize().context("Invalid path")?;

    let config = ListConfigBuilder::default()
        .show_hidden(all)
        .build()
        .context("Invalid configuration")?;

    let mut list = FileList::new(Arc::new(LocalProvider::new()), config);
    list.set_sort_config(SortConfig {
        column: sort.into(),
        ascending: !reverse,
        ..SortConfig::default()
    });

    list.change_path(path, None).await.context("Load failed")?;
    list.wait_for_load().await.context("Load failed")?;
    Ok(list)
}

fn print_stats(list: &FileList) {
    let stats = list.stats();
    println!();
    println!("{}", "─".repeat(60));
    println!(
        " {} - {}",
        list.path().display(),
        humansize::format_size(stats.size_total, humansize::BINARY)
    );
    println!(
        " {} files, {} directories",
        stats.files_count, stats.dirs_count
    );
    println!("{}", "─".repeat(60));
}
