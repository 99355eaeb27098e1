// =============================================================================
// VALIDATE — Vérification des invariants du Dataset
// =============================================================================
//
// Ce module vérifie que les enregistrements en format long respectent :
//   - amount fini et ≥ 0
//   - year dans les bornes de la source
//   - une seule paire (latitude, longitude) par pays
//   - (country, item, year) unique (sur un Dataset déjà construit)
//
// La normalisation garantit déjà les deux premiers points ; la validation
// reste le filet qui refuse un Dataset incohérent au démarrage.
//
// =============================================================================

use std::collections::{HashMap, HashSet};

use super::dataset::{Dataset, Record};
use super::query::YearRange;

/// Violation d'un invariant.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{country}/{item}/{year} : quantité invalide {amount}")]
    InvalidAmount {
        country: String,
        item: String,
        year: i32,
        amount: f64,
    },
    #[error("{country}/{item} : année {year} hors de {range}")]
    YearOutOfRange {
        country: String,
        item: String,
        year: i32,
        range: YearRange,
    },
    #[error("{country} : coordonnées incohérentes {first:?} et {other:?}")]
    InconsistentCoordinates {
        country: String,
        first: (f64, f64),
        other: (f64, f64),
    },
    #[error("{country}/{item}/{year} : clé en double")]
    DuplicateKey {
        country: String,
        item: String,
        year: i32,
    },
}

/// Vérifie des enregistrements avant construction du Dataset.
///
/// Les doublons ne sont pas signalés ici : ils sont fusionnés ensuite.
pub fn validate_records(records: &[Record], years: YearRange) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut coordinates: HashMap<&str, (f64, f64)> = HashMap::new();
    let mut reported: HashSet<&str> = HashSet::new();

    for r in records {
        if !r.amount.is_finite() || r.amount < 0.0 {
            errors.push(ValidationError::InvalidAmount {
                country: r.country.to_string(),
                item: r.item.to_string(),
                year: r.year,
                amount: r.amount,
            });
        }
        if !years.contains(r.year) {
            errors.push(ValidationError::YearOutOfRange {
                country: r.country.to_string(),
                item: r.item.to_string(),
                year: r.year,
                range: years,
            });
        }

        let country: &str = &r.country;
        let coords = (r.latitude, r.longitude);
        let first = *coordinates.entry(country).or_insert(coords);
        if first != coords && reported.insert(country) {
            errors.push(ValidationError::InconsistentCoordinates {
                country: r.country.to_string(),
                first,
                other: coords,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Vérifie tous les invariants d'un Dataset construit.
pub fn validate_dataset(dataset: &Dataset) -> Result<(), Vec<ValidationError>> {
    let mut errors = match validate_records(dataset.records(), dataset.years()) {
        Ok(()) => Vec::new(),
        Err(errors) => errors,
    };

    let mut seen: HashSet<(&str, &str, i32)> = HashSet::with_capacity(dataset.len());
    for r in dataset.records() {
        if !seen.insert((&*r.country, &*r.item, r.year)) {
            errors.push(ValidationError::DuplicateKey {
                country: r.country.to_string(),
                item: r.item.to_string(),
                year: r.year,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
