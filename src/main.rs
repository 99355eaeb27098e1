// =============================================================================
// FOODATLAS — Point d'entrée : interrogation du jeu FAO en ligne de commande
// =============================================================================
//
// Exemples :
//   foodatlas --source FAO.csv items
//   foodatlas --source FAO.csv locations --from 1985 --to 2005
//   foodatlas --source FAO.csv series --item Eggs --country Brazil
//   foodatlas --source FAO.csv --format json overview
//
// "overview" reproduit la page du tableau de bord : la carte des totaux par
// pays pour la fenêtre choisie, puis une série par produit par défaut,
// mondiale tant qu'aucun pays n'est sélectionné. La page sort en un seul
// document (un objet JSON, une table CSV).
//
// =============================================================================

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use foodatlas::backend::{Format, Overview, SeriesScope};
use foodatlas::config::Config;
use foodatlas::core::cache::QueryCache;
use foodatlas::core::dataset::load_dataset_with;
use foodatlas::core::query::YearRange;

#[derive(Debug, Parser)]
#[command(name = "foodatlas", version, about = "Agrégations sur la production alimentaire FAO")]
struct Cli {
    /// Fichier source (FAO.csv)
    #[arg(long, short)]
    source: PathBuf,

    /// Configuration TOML optionnelle
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Format de sortie
    #[arg(long, short, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Niveau de log si RUST_LOG n'est pas défini
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

impl From<OutputFormat> for Format {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Text => Format::Text,
            OutputFormat::Json => Format::Json,
            OutputFormat::Csv => Format::Csv,
        }
    }
}

/// Fenêtre d'années ; les bornes absentes viennent de la configuration.
#[derive(Debug, clap::Args)]
struct Window {
    #[arg(long)]
    from: Option<i32>,
    #[arg(long)]
    to: Option<i32>,
}

impl Window {
    fn resolve(&self, default: YearRange) -> YearRange {
        YearRange::new(self.from.unwrap_or(default.from), self.to.unwrap_or(default.to))
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Liste les produits connus
    Items,
    /// Production totale par pays
    Locations {
        #[command(flatten)]
        window: Window,
    },
    /// Série temporelle d'un produit
    Series {
        #[arg(long)]
        item: String,
        #[command(flatten)]
        window: Window,
        /// Libellé exact du pays (monde entier si absent)
        #[arg(long)]
        country: Option<String>,
    },
    /// Carte + séries des produits par défaut
    Overview {
        #[command(flatten)]
        window: Window,
        #[arg(long)]
        country: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("configuration {}", path.display()))?,
        None => Config::default(),
    };

    let dataset = load_dataset_with(&cli.source, &config.source)
        .with_context(|| format!("chargement de {}", cli.source.display()))?;

    let cache = QueryCache::new(Arc::new(dataset));
    let exporter = Format::from(cli.format).exporter();
    let default_window = config.view.window();

    match &cli.command {
        Command::Items => {
            print!("{}", exporter.render_items(&cache.list_known_items())?);
        }
        Command::Locations { window } => {
            let rows = cache.aggregate_by_location(window.resolve(default_window));
            print!("{}", exporter.render_locations(&rows)?);
        }
        Command::Series { item, window, country } => {
            let points = cache.aggregate_time_series(item, window.resolve(default_window), country.as_deref());
            let scope = SeriesScope { item, country: country.as_deref() };
            print!("{}", exporter.render_series(scope, &points)?);
        }
        Command::Overview { window, country } => {
            let overview = Overview::collect(
                &cache,
                window.resolve(default_window),
                country.as_deref(),
                &config.view.default_items,
            );
            print!("{}", exporter.render_overview(&overview)?);
        }
    }

    let stats = cache.stats();
    info!(hits = stats.hits, misses = stats.misses, "requêtes servies");
    Ok(())
}
