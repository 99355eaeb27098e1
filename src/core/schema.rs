// =============================================================================
// SCHEMA — Les colonnes attendues de la source et leur résolution
// =============================================================================
//
// La table brute FAO a la forme :
//
//   Area Abbreviation | Area Code | Area | Item Code | Item | Element Code |
//   Element | Unit | latitude | longitude | Y1961 | Y1962 | ... | Y2013
//
// Ce module résout ces en-têtes en un ColumnLayout : la position de chaque
// colonne utile, plus la liste des colonnes d'années dont le préfixe a été
// retiré ("Y1990" → 1990). Si une colonne indispensable manque, c'est une
// SchemaError et le chargement s'arrête : il n'y a pas de chargement partiel.
//
// Colonne d'année = préfixe + exactement 4 chiffres ASCII. "Yield" ou
// "Y19" ne sont PAS des années et passent sans modification.
//
// =============================================================================

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::SourceConfig;

/// Erreurs fatales de schéma.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("la source n'a pas de ligne d'en-tête")]
    EmptySource,
    #[error("colonne discriminante '{0}' absente")]
    MissingDiscriminator(String),
    #[error("colonne obligatoire '{0}' absente")]
    MissingColumn(String),
    #[error("colonne d'année attendue '{0}' absente")]
    MissingYear(String),
    #[error("colonne '{column}' : l'année {year} sort des bornes [{min}, {max}]")]
    YearOutOfRange {
        column: String,
        year: i32,
        min: i32,
        max: i32,
    },
}

/// Une colonne d'année : sa position dans la table brute et l'année
/// obtenue en retirant le préfixe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearColumn {
    pub index: usize,
    pub year: i32,
}

/// Positions des colonnes utiles dans la table brute.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    pub element: usize,
    pub country: usize,
    pub item: usize,
    pub latitude: usize,
    pub longitude: usize,
    /// Triées par année croissante
    pub years: Vec<YearColumn>,
    /// Colonnes ni utilisées ni explicitement ignorées
    pub passthrough: Vec<String>,
}

impl ColumnLayout {
    /// Résout les en-têtes selon la configuration.
    pub fn resolve(headers: &[String], config: &SourceConfig) -> Result<Self, SchemaError> {
        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(SchemaError::EmptySource);
        }

        let find = |name: &str| headers.iter().position(|h| h == name);

        let element = find(&config.element_column)
            .ok_or_else(|| SchemaError::MissingDiscriminator(config.element_column.clone()))?;
        let required = |name: &str| find(name).ok_or_else(|| SchemaError::MissingColumn(name.to_string()));
        let country = required(&config.area_column)?;
        let item = required(&config.item_column)?;
        let latitude = required(&config.latitude_column)?;
        let longitude = required(&config.longitude_column)?;

        let mut by_year: BTreeMap<i32, usize> = BTreeMap::new();
        let mut passthrough = Vec::new();
        for (index, header) in headers.iter().enumerate() {
            if let Some(year) = strip_year_prefix(header, &config.year_prefix) {
                if !config.years().contains(year) {
                    return Err(SchemaError::YearOutOfRange {
                        column: header.clone(),
                        year,
                        min: config.min_year,
                        max: config.max_year,
                    });
                }
                // En cas de doublon, la première colonne fait foi
                by_year.entry(year).or_insert(index);
            } else if ![element, country, item, latitude, longitude].contains(&index)
                && !config.is_dropped(header)
            {
                passthrough.push(header.clone());
            }
        }

        for year in config.years().iter() {
            if !by_year.contains_key(&year) {
                return Err(SchemaError::MissingYear(format!("{}{}", config.year_prefix, year)));
            }
        }

        if !passthrough.is_empty() {
            debug!(columns = ?passthrough, "colonnes inconnues ignorées");
        }

        Ok(ColumnLayout {
            element,
            country,
            item,
            latitude,
            longitude,
            years: by_year
                .into_iter()
                .map(|(year, index)| YearColumn { index, year })
                .collect(),
            passthrough,
        })
    }

    /// Les années, dans l'ordre des colonnes de la table large.
    pub fn year_labels(&self) -> Vec<i32> {
        self.years.iter().map(|c| c.year).collect()
    }
}

/// Retire le préfixe d'une colonne d'année : "Y1990" → Some(1990).
///
/// Toute autre colonne → None (elle garde son nom).
pub fn strip_year_prefix(column: &str, prefix: &str) -> Option<i32> {
    let digits = column.strip_prefix(prefix)?;
    if digits.len() == 4 && digits.bytes().all(|b| b.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}

/// Nom d'une colonne après retrait du préfixe d'année.
pub fn renamed_column(column: &str, prefix: &str) -> String {
    match strip_year_prefix(column, prefix) {
        Some(year) => year.to_string(),
        None => column.to_string(),
    }
}
