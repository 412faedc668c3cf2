#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::fs::File;
    use std::io::BufReader;
    use std::path::{Path, PathBuf};

    use anyhow::{Context, Result};
    use clap::{Parser, Subcommand};
    use serde::{Deserialize, Serialize};
    use tracing::{info, Level};

    use record_shelf::{compare, compute_stats, CatalogItem};

    #[derive(Parser, Debug)]
    #[command(name = "record-shelf", about = "Collection analytics over catalog dumps")]
    struct CliArgs {
        /// Pretty-print the JSON output.
        #[arg(long, global = true)]
        pretty: bool,

        /// Log verbosity when RUST_LOG is unset.
        #[arg(long, global = true, default_value_t = Level::WARN)]
        log_level: Level,

        #[command(subcommand)]
        command: Command,
    }

    #[derive(Subcommand, Debug)]
    enum Command {
        /// Stats for one collection.
        Stats { collection: PathBuf },
        /// Overlap and similarity between two collections.
        Compare { first: PathBuf, second: PathBuf },
    }

    /// Either a bare item list or a catalog page with a `releases` field.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum CatalogDump {
        Items(Vec<CatalogItem>),
        Page { releases: Vec<CatalogItem> },
    }

    fn load_items(path: &Path) -> Result<Vec<CatalogItem>> {
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let dump: CatalogDump = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        let items = match dump {
            CatalogDump::Items(items) => items,
            CatalogDump::Page { releases } => releases,
        };
        info!(path = %path.display(), items = items.len(), "loaded collection");
        Ok(items)
    }

    fn emit<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
        let out = if pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        println!("{}", out);
        Ok(())
    }

    pub fn run() -> Result<()> {
        let args = CliArgs::parse();
        record_shelf::logging::init(args.log_level);

        match args.command {
            Command::Stats { collection } => {
                let items = load_items(&collection)?;
                emit(&compute_stats(&items), args.pretty)
            }
            Command::Compare { first, second } => {
                let a = load_items(&first)?;
                let b = load_items(&second)?;
                emit(&compare(&a, &b), args.pretty)
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    cli::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    record_shelf::logging::init(tracing::Level::INFO);
}
