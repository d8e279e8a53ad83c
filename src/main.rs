//! maigus-formats - format legality checks from the command line
//!
//! ## Usage
//!
//! ```text
//! maigus-formats --formats res/formats --catalog cards.json list
//! maigus-formats --formats res/formats --catalog cards.json archived
//! maigus-formats --formats res/formats --catalog cards.json check deck.json [--format Modern] [--exhaustive]
//! maigus-formats --formats res/formats --catalog cards.json card "Lightning Bolt" --set M10
//! ```
//!
//! `cards.json` is a serialized catalog (editions and printings), decks are
//! serialized `Deck` values. Set `RUST_LOG=debug` to see loader details.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use maigus_formats::{
    CardCatalog, Deck, FormatReader, FormatRegistry, FormatRule, InMemoryCatalog, ReaderOptions,
    check_deck,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "maigus-formats", about = "Check decks and cards against game formats")]
struct Cli {
    /// Directory of bundled format definitions
    #[arg(long)]
    formats: PathBuf,

    /// Directory of user-defined format definitions
    #[arg(long)]
    user_formats: Option<PathBuf>,

    /// Card catalog JSON file
    #[arg(long)]
    catalog: PathBuf,

    /// Only load the core formats, skipping archived ones
    #[arg(long)]
    core_only: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every loaded format in registry order
    List,
    /// List archived formats grouped by category
    Archived,
    /// Check a deck against one format, or classify it against all of them
    Check {
        deck: PathBuf,
        #[arg(long)]
        format: Option<String>,
        #[arg(long)]
        exhaustive: bool,
    },
    /// Show every format a card is legal in
    Card {
        name: String,
        #[arg(long)]
        set: String,
    },
}

fn load_catalog(path: &Path) -> Result<InMemoryCatalog, String> {
    let text = fs::read_to_string(path)
        .map_err(|err| format!("Failed to open {}: {err}", path.display()))?;
    InMemoryCatalog::from_json(&text)
        .map_err(|err| format!("Failed to parse {}: {err}", path.display()))
}

fn load_deck(path: &Path) -> Result<Deck, String> {
    let text = fs::read_to_string(path)
        .map_err(|err| format!("Failed to open {}: {err}", path.display()))?;
    serde_json::from_str(&text).map_err(|err| format!("Failed to parse {}: {err}", path.display()))
}

fn load_registry(cli: &Cli) -> Result<FormatRegistry, String> {
    let catalog = Arc::new(load_catalog(&cli.catalog)?);

    let options = ReaderOptions {
        include_archived: !cli.core_only,
        ..ReaderOptions::default()
    };
    let mut reader = FormatReader::new(&cli.formats).with_options(options);
    if let Some(user_dir) = &cli.user_formats {
        reader = reader.with_user_dir(user_dir);
    }

    let report = reader.read_all(catalog.as_ref());
    for (path, err) in &report.skipped {
        eprintln!("Skipped {}: {err}", path.display());
    }
    for (path, notice) in &report.notices {
        eprintln!("Note {}: {notice}", path.display());
    }
    Ok(report.into_registry(catalog))
}

fn describe(rule: &FormatRule) -> String {
    format!(
        "{} [{}/{}]",
        rule,
        rule.format_type().key(),
        rule.format_subtype().key()
    )
}

fn run_check(
    registry: &FormatRegistry,
    deck: &Deck,
    format: Option<&str>,
    exhaustive: bool,
) -> Result<(), String> {
    let Some(name) = format else {
        println!("Most recent format: {}", registry.most_recent_legal_format(deck));
        println!("Legal in:");
        for rule in registry.classify_deck(deck, exhaustive) {
            println!("  {}", describe(&rule));
        }
        return Ok(());
    };

    let rule = registry
        .get(name)
        .ok_or_else(|| format!("Unknown format: '{name}'"))?;
    match check_deck(rule, Some(deck), registry.catalog()) {
        Ok(()) => println!("{} is legal in {}", deck.name, rule),
        Err(err) => println!("{} {}", deck.name, err),
    }
    Ok(())
}

fn run_card(registry: &FormatRegistry, name: &str, set: &str) -> Result<(), String> {
    let card = registry
        .catalog()
        .cards_in_set(set)
        .into_iter()
        .find(|card| card.name == name)
        .ok_or_else(|| format!("No printing of '{name}' in {set}"))?;

    for rule in registry.all_formats_legal_for_card(&card) {
        let printing = if rule.is_printing_legal(&card, registry.catalog()) {
            ""
        } else {
            " (this printing is not)"
        };
        println!("{}{printing}", describe(&rule));
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), String> {
    let registry = load_registry(&cli)?;

    match cli.command {
        Command::List => {
            for rule in registry.ordered_view() {
                println!("{}", describe(rule));
            }
        }
        Command::Archived => {
            for (category, rules) in registry.archived_by_category() {
                println!("{category}");
                for rule in rules {
                    println!("  {rule}");
                }
            }
        }
        Command::Check {
            deck,
            format,
            exhaustive,
        } => {
            let deck = load_deck(&deck)?;
            run_check(&registry, &deck, format.as_deref(), exhaustive)?;
        }
        Command::Card { name, set } => run_card(&registry, &name, &set)?,
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
