// =============================================================================
// DATASET — Les enregistrements en format long, construits une seule fois
// =============================================================================
//
// Le Dataset est la SEULE donnée partagée du moteur :
//   - construit une fois au démarrage (source → normalize → reshape)
//   - jamais modifié ensuite (aucune méthode &mut)
//   - lu par toutes les requêtes, éventuellement depuis plusieurs threads
//
// Ce n'est pas un singleton : c'est une valeur explicite, passée par
// référence (ou Arc), et plusieurs Datasets peuvent coexister.
//
// INVARIANTS (vérifiés par validate) :
//   - (country, item, year) est unique
//   - latitude/longitude ne dépendent que du pays
//   - amount ≥ 0 et fini
//   - year ∈ [min_year, max_year]
//
// =============================================================================

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{ConfigError, SourceConfig};
use super::normalize::normalize;
use super::query::YearRange;
use super::reshape::melt;
use super::schema::SchemaError;
use super::source::{read_table, RawTable, SourceError};
use super::validate::{validate_records, ValidationError};

/// Un enregistrement : la production d'un produit, dans un pays, une année.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub country: Arc<str>,
    pub item: Arc<str>,
    pub latitude: f64,
    pub longitude: f64,
    pub year: i32,
    pub amount: f64,
}

impl Record {
    pub fn new(country: &str, item: &str, latitude: f64, longitude: f64, year: i32, amount: f64) -> Self {
        Record {
            country: Arc::from(country),
            item: Arc::from(item),
            latitude,
            longitude,
            year,
            amount,
        }
    }
}

/// Erreurs de chargement : toutes fatales au démarrage.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("schéma invalide : {0}")]
    Schema(#[from] SchemaError),
    #[error("{} violation(s) d'invariant dans le Dataset", .0.len())]
    Invariant(Vec<ValidationError>),
}

/// Le jeu de données immuable.
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    years: YearRange,
    records: Vec<Record>,
    items: BTreeSet<String>,
    coordinates: BTreeMap<String, (f64, f64)>,
}

impl Dataset {
    /// Construit un Dataset à partir d'enregistrements en format long.
    ///
    /// Les doublons (country, item, year) sont fusionnés par somme : c'est
    /// ce que produit un regroupement sur ces clés. Toute autre violation
    /// d'invariant est renvoyée.
    pub fn from_records(
        name: &str,
        years: YearRange,
        records: Vec<Record>,
    ) -> Result<Self, Vec<ValidationError>> {
        validate_records(&records, years)?;

        let before = records.len();
        let records = merge_duplicates(records);
        if records.len() < before {
            warn!(merged = before - records.len(), "doublons (country, item, year) fusionnés");
        }

        let mut items: BTreeSet<String> = BTreeSet::new();
        let mut coordinates: BTreeMap<String, (f64, f64)> = BTreeMap::new();
        for r in &records {
            if !items.contains(&*r.item) {
                items.insert(r.item.to_string());
            }
            if !coordinates.contains_key(&*r.country) {
                coordinates.insert(r.country.to_string(), (r.latitude, r.longitude));
            }
        }

        Ok(Dataset {
            name: name.to_string(),
            years,
            records,
            items,
            coordinates,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bornes d'années de la source
    pub fn years(&self) -> YearRange {
        self.years
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Libellés canoniques distincts, triés
    pub fn known_items(&self) -> &BTreeSet<String> {
        &self.items
    }

    /// Pays distincts, triés
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.coordinates.keys().map(String::as_str)
    }

    pub fn coordinates(&self, country: &str) -> Option<(f64, f64)> {
        self.coordinates.get(country).copied()
    }

    /// Σ amount sur tout le Dataset
    pub fn total_amount(&self) -> f64 {
        self.records.iter().map(|r| r.amount).sum()
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "dataset {} : {} enregistrements, {} pays, {} produits, années {}",
            self.name,
            self.records.len(),
            self.coordinates.len(),
            self.items.len(),
            self.years
        )
    }
}

/// Fusionne les enregistrements de même (country, item, year) ; le premier
/// rencontré garde sa position et ses coordonnées.
fn merge_duplicates(records: Vec<Record>) -> Vec<Record> {
    let mut index: HashMap<(Arc<str>, Arc<str>, i32), usize> = HashMap::with_capacity(records.len());
    let mut merged: Vec<Record> = Vec::with_capacity(records.len());

    for r in records {
        let key = (Arc::clone(&r.country), Arc::clone(&r.item), r.year);
        match index.get(&key) {
            Some(&i) => merged[i].amount += r.amount,
            None => {
                index.insert(key, merged.len());
                merged.push(r);
            }
        }
    }
    merged
}

// =============================================================================
// Chargement
// =============================================================================

/// Construit le Dataset depuis une table brute déjà lue.
///
/// La configuration est revérifiée ici : une `SourceConfig` construite à la
/// main n'est pas passée par `Config::validate`.
pub fn build_dataset(name: &str, raw: &RawTable, config: &SourceConfig) -> Result<Dataset, LoadError> {
    config.validate()?;
    let mapping = config.label_mapping();
    let (wide, _report) = normalize(raw, config, &mapping)?;
    let records = melt(&wide);
    let dataset = Dataset::from_records(name, config.years(), records).map_err(LoadError::Invariant)?;
    info!("{}", dataset);
    Ok(dataset)
}

/// Charge la source avec une configuration explicite.
pub fn load_dataset_with(path: &Path, config: &SourceConfig) -> Result<Dataset, LoadError> {
    let raw = read_table(path, config.delimiter_byte()?, config.encoding()?)?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string());
    build_dataset(&name, &raw, config)
}

/// Charge la source FAO avec la configuration par défaut.
pub fn load_dataset(path: &Path) -> Result<Dataset, LoadError> {
    load_dataset_with(path, &SourceConfig::default())
}
