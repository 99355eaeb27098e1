// =============================================================================
// BACKEND — Rendu des résultats de requêtes
// =============================================================================
//
// Le moteur (core) ne sait rien de l'affichage. Un Exporter transforme les
// lignes résultat en un document textuel :
//   - TextExporter : tableau aligné lisible dans un terminal
//   - JsonExporter : tableaux JSON (serde_json)
//   - CsvExporter  : CSV avec en-tête (csv::Writer)
//
// Un résultat vide reste un document valide : "[]", un CSV réduit à son
// en-tête, ou la mention "pas de données pour cette sélection".
//
// Une Overview (la page du tableau de bord : carte + séries) est rendue en
// UN seul document, quel que soit le format.
//
// =============================================================================

pub mod text;
pub mod json;
pub mod delimited;

use crate::core::cache::QueryCache;
use crate::core::query::{LocationTotal, YearAmount, YearRange};

pub use delimited::CsvExporter;
pub use json::JsonExporter;
pub use text::TextExporter;

/// Erreurs de rendu.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("sérialisation JSON : {0}")]
    Json(#[from] serde_json::Error),
    #[error("écriture CSV : {0}")]
    Csv(#[from] csv::Error),
    #[error("sortie CSV non UTF-8 : {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("écriture CSV : {0}")]
    Io(#[from] std::io::Error),
}

/// Ce qu'une série représente : un produit, dans un pays ou dans le monde.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesScope<'a> {
    pub item: &'a str,
    /// None = monde entier
    pub country: Option<&'a str>,
}

impl std::fmt::Display for SeriesScope<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.country {
            Some(country) => write!(f, "{} ({})", self.item, country),
            None => write!(f, "{} (monde entier)", self.item),
        }
    }
}

/// Série d'un produit dans une Overview.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPanel {
    pub item: String,
    pub points: Vec<YearAmount>,
}

/// La page du tableau de bord : totaux par pays, puis une série par produit.
#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub years: YearRange,
    /// None = monde entier
    pub country: Option<String>,
    pub locations: Vec<LocationTotal>,
    pub series: Vec<SeriesPanel>,
}

impl Overview {
    /// Exécute la requête A puis une requête B par produit.
    pub fn collect(cache: &QueryCache, years: YearRange, country: Option<&str>, items: &[String]) -> Self {
        Overview {
            years,
            country: country.map(str::to_string),
            locations: cache.aggregate_by_location(years),
            series: items
                .iter()
                .map(|item| SeriesPanel {
                    item: item.clone(),
                    points: cache.aggregate_time_series(item, years, country),
                })
                .collect(),
        }
    }

    /// Périmètre d'une des séries
    pub fn scope<'a>(&'a self, panel: &'a SeriesPanel) -> SeriesScope<'a> {
        SeriesScope {
            item: &panel.item,
            country: self.country.as_deref(),
        }
    }
}

/// Trait commun à tous les formats de sortie.
pub trait Exporter {
    /// Rend le résultat de la requête A.
    fn render_locations(&self, rows: &[LocationTotal]) -> Result<String, ExportError>;

    /// Rend le résultat de la requête B.
    fn render_series(&self, scope: SeriesScope<'_>, points: &[YearAmount]) -> Result<String, ExportError>;

    /// Rend la liste des produits connus.
    fn render_items(&self, items: &[String]) -> Result<String, ExportError>;

    /// Rend une Overview complète en un seul document.
    fn render_overview(&self, overview: &Overview) -> Result<String, ExportError>;

    /// Nom du format
    fn name(&self) -> &str;
}

/// Formats disponibles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Text,
    Json,
    Csv,
}

impl Format {
    pub fn exporter(self) -> Box<dyn Exporter> {
        match self {
            Format::Text => Box::new(TextExporter::default()),
            Format::Json => Box::new(JsonExporter::default()),
            Format::Csv => Box::new(CsvExporter::default()),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names() {
        assert_eq!(Format::Text.exporter().name(), "text");
        assert_eq!(Format::Json.exporter().name(), "json");
        assert_eq!(Format::Csv.exporter().name(), "csv");
    }

    #[test]
    fn test_series_scope_display() {
        let world = SeriesScope { item: "Eggs", country: None };
        let brazil = SeriesScope { item: "Eggs", country: Some("Brazil") };
        assert_eq!(world.to_string(), "Eggs (monde entier)");
        assert_eq!(brazil.to_string(), "Eggs (Brazil)");
    }

    #[test]
    fn test_overview_collects_every_default_item() {
        use crate::core::dataset::{Dataset, Record};
        use std::sync::Arc;

        let ds = Dataset::from_records(
            "test",
            YearRange::new(1990, 1991),
            vec![
                Record::new("Brazil", "Eggs", -14.24, -51.93, 1990, 10.0),
                Record::new("France", "Eggs", 46.23, 2.21, 1991, 5.0),
            ],
        )
        .unwrap();
        let cache = QueryCache::new(Arc::new(ds));
        let items = vec!["Eggs".to_string(), "Cloves".to_string()];
        let overview = Overview::collect(&cache, YearRange::new(1990, 1991), Some("Brazil"), &items);

        assert_eq!(overview.locations.len(), 2);
        assert_eq!(overview.series.len(), 2);
        assert_eq!(overview.series[0].points, vec![YearAmount { year: 1990, amount: 10.0 }]);
        assert!(overview.series[1].points.is_empty());
        assert_eq!(overview.scope(&overview.series[0]).to_string(), "Eggs (Brazil)");
    }

    #[test]
    fn test_every_format_renders_empty_results() {
        let scope = SeriesScope { item: "Nonexistent Item", country: None };
        for format in [Format::Text, Format::Json, Format::Csv] {
            let exporter = format.exporter();
            assert!(!exporter.render_locations(&[]).unwrap().is_empty());
            assert!(!exporter.render_series(scope, &[]).unwrap().is_empty());
            assert!(!exporter.render_items(&[]).unwrap().is_empty());
        }
    }
}
