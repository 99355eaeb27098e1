// =============================================================================
// NORMALIZE — De la table brute à la table large propre
// =============================================================================
//
// Étapes, dans l'ordre :
//   1. Résoudre les colonnes (schema::ColumnLayout) → SchemaError si manque
//   2. Ne garder que les lignes dont Element == "Food" (filtre dur)
//   3. Projeter : Country, Item, latitude, longitude, <années...>
//      (les colonnes administratives disparaissent, "Area" devient Country,
//       "Y1990" devient 1990)
//   4. Canonicaliser le libellé du produit (mapping::LabelMapping)
//   5. Convertir les cellules numériques, avec la politique suivante :
//
//        cellule vide / absente   → 0.0
//        texte non numérique      → 0.0
//        NaN, ±inf                → 0.0
//        quantité négative        → 0.0   (amount ≥ 0 toujours)
//
//      Une cellule vide signifie "production nulle", jamais "inconnue".
//      La politique est totale : elle ne lève jamais d'erreur. Chaque
//      conversion forcée est comptée dans le NormalizeReport.
//
// =============================================================================

use tracing::{info, warn};

use crate::config::SourceConfig;
use super::mapping::LabelMapping;
use super::schema::{ColumnLayout, SchemaError};
use super::source::RawTable;

/// Seule valeur de la colonne discriminante conservée. Ce n'est pas un réglage.
pub const FOOD_ELEMENT: &str = "Food";

/// Une ligne de la table large : un (pays, produit) et une quantité par année.
#[derive(Debug, Clone, PartialEq)]
pub struct WideRow {
    pub country: String,
    pub item: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Alignées sur `WideTable::years`
    pub amounts: Vec<f64>,
}

impl WideRow {
    pub fn total(&self) -> f64 {
        self.amounts.iter().sum()
    }
}

/// La table large normalisée.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WideTable {
    /// Années des colonnes, préfixe retiré
    pub years: Vec<i32>,
    pub rows: Vec<WideRow>,
}

impl WideTable {
    pub fn new(years: Vec<i32>) -> Self {
        WideTable { years, rows: Vec::new() }
    }

    /// Somme de toutes les quantités de la table
    pub fn total_amount(&self) -> f64 {
        self.rows.iter().map(WideRow::total).sum()
    }

    /// Noms de colonnes de la table large, dans l'ordre
    pub fn column_names(&self) -> Vec<String> {
        let mut names: Vec<String> = ["Country", "Item", "latitude", "longitude"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        names.extend(self.years.iter().map(|y| y.to_string()));
        names
    }

    /// Réapplique une table de libellés (sert à vérifier l'idempotence).
    pub fn relabel(&self, mapping: &LabelMapping) -> WideTable {
        WideTable {
            years: self.years.clone(),
            rows: self
                .rows
                .iter()
                .map(|row| WideRow {
                    item: mapping.apply(&row.item).to_string(),
                    ..row.clone()
                })
                .collect(),
        }
    }
}

/// Compteurs de la normalisation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    /// Lignes d'un autre type (Feed, Seed...)
    pub rows_discarded: usize,
    pub labels_rewritten: usize,
    /// Cellules vides, absentes ou illisibles remplacées par 0
    pub cells_zero_filled: usize,
    pub cells_malformed: usize,
    pub negatives_clamped: usize,
}

/// Normalise une table brute.
pub fn normalize(
    raw: &RawTable,
    config: &SourceConfig,
    mapping: &LabelMapping,
) -> Result<(WideTable, NormalizeReport), SchemaError> {
    let layout = ColumnLayout::resolve(&raw.headers, config)?;
    let mut table = WideTable::new(layout.year_labels());
    let mut report = NormalizeReport {
        rows_read: raw.rows.len(),
        ..NormalizeReport::default()
    };

    for row in &raw.rows {
        if cell(row, layout.element) != FOOD_ELEMENT {
            report.rows_discarded += 1;
            continue;
        }

        let raw_item = cell(row, layout.item);
        let item = mapping.apply(raw_item);
        if item != raw_item {
            report.labels_rewritten += 1;
        }

        let latitude = parse_number(cell(row, layout.latitude), &mut report);
        let longitude = parse_number(cell(row, layout.longitude), &mut report);
        let amounts = layout
            .years
            .iter()
            .map(|col| parse_amount(cell(row, col.index), &mut report))
            .collect();

        table.rows.push(WideRow {
            country: cell(row, layout.country).to_string(),
            item: item.to_string(),
            latitude,
            longitude,
            amounts,
        });
        report.rows_kept += 1;
    }

    if report.cells_malformed > 0 {
        warn!(cells = report.cells_malformed, "cellules numériques illisibles remplacées par 0");
    }
    if report.negatives_clamped > 0 {
        warn!(cells = report.negatives_clamped, "quantités négatives ramenées à 0");
    }
    info!(
        read = report.rows_read,
        kept = report.rows_kept,
        discarded = report.rows_discarded,
        relabeled = report.labels_rewritten,
        years = table.years.len(),
        "normalisation terminée"
    );

    Ok((table, report))
}

/// Une cellule, ou "" si la ligne est trop courte.
fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}

/// Conversion d'une coordonnée : vide ou illisible → 0.0, le signe est conservé.
fn parse_number(text: &str, report: &mut NormalizeReport) -> f64 {
    if text.is_empty() {
        report.cells_zero_filled += 1;
        return 0.0;
    }
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => {
            report.cells_zero_filled += 1;
            report.cells_malformed += 1;
            0.0
        }
    }
}

/// Conversion d'une quantité : comme une coordonnée, mais jamais négative.
fn parse_amount(text: &str, report: &mut NormalizeReport) -> f64 {
    let v = parse_number(text, report);
    if v < 0.0 {
        report.negatives_clamped += 1;
        0.0
    } else {
        // -0.0 devient 0.0
        v + 0.0
    }
}
