// =============================================================================
// EVAL — Le moteur d'agrégation
// =============================================================================
//
// Deux requêtes en lecture seule sur le Dataset immuable, plus la liste des
// produits connus. Ce sont des fonctions pures : mêmes Dataset et mêmes
// paramètres → même résultat. Aucune ne renvoie d'erreur ; une sélection
// sans données donne simplement un résultat vide :
//
//   fenêtre inversée (from > to)      → vide
//   fenêtre hors des années connues   → vide
//   produit inconnu                   → vide
//   pays inconnu                      → vide
//
// Filtrage par égalité EXACTE des libellés : le libellé `country` renvoyé
// par la requête A est précisément celui qu'accepte la requête B.
//
// Les résultats sont triés (pays, puis année croissante) ; les appelants
// ne doivent pas en dépendre pour autant.
//
// =============================================================================

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::debug;

use super::dataset::{Dataset, Record};
use super::query::{LocationTotal, Query, QueryOutput, YearAmount, YearRange};

/// Requête A : production totale par lieu sur la fenêtre.
///
/// Somme sur TOUS les produits et TOUTES les années de la fenêtre, une ligne
/// par pays. Un pays sans enregistrement dans la fenêtre n'apparaît pas.
pub fn aggregate_by_location(dataset: &Dataset, years: YearRange) -> Vec<LocationTotal> {
    if years.is_empty() {
        return Vec::new();
    }
    let start = Instant::now();

    let mut groups: BTreeMap<&str, LocationTotal> = BTreeMap::new();
    let mut scanned = 0usize;
    for r in dataset.records().iter().filter(|r| years.contains(r.year)) {
        scanned += 1;
        groups
            .entry(&*r.country)
            .or_insert_with(|| LocationTotal {
                country: r.country.to_string(),
                latitude: r.latitude,
                longitude: r.longitude,
                total_amount: 0.0,
            })
            .total_amount += r.amount;
    }

    let totals: Vec<LocationTotal> = groups.into_values().collect();
    debug!(
        %years,
        scanned,
        returned = totals.len(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "aggregate_by_location"
    );
    totals
}

/// Requête B : série temporelle d'un produit, mondiale ou pour un pays.
///
/// Un point par année présente dans les données filtrées ; une année dont
/// le total est nul est omise.
pub fn aggregate_time_series(
    dataset: &Dataset,
    item: &str,
    years: YearRange,
    country: Option<&str>,
) -> Vec<YearAmount> {
    if years.is_empty() {
        return Vec::new();
    }
    let start = Instant::now();

    let selected = |r: &&Record| {
        years.contains(r.year)
            && &*r.item == item
            && country.map_or(true, |c| &*r.country == c)
    };

    let mut by_year: BTreeMap<i32, f64> = BTreeMap::new();
    let mut scanned = 0usize;
    for r in dataset.records().iter().filter(selected) {
        scanned += 1;
        *by_year.entry(r.year).or_insert(0.0) += r.amount;
    }

    let series: Vec<YearAmount> = by_year
        .into_iter()
        .filter(|&(_, amount)| amount > 0.0)
        .map(|(year, amount)| YearAmount { year, amount })
        .collect();
    debug!(
        item,
        country = country.unwrap_or("*"),
        %years,
        scanned,
        returned = series.len(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "aggregate_time_series"
    );
    series
}

/// Libellés canoniques distincts, triés (pour peupler les listes de choix).
pub fn list_known_items(dataset: &Dataset) -> Vec<String> {
    dataset.known_items().iter().cloned().collect()
}

/// Évalue un descripteur de requête.
pub fn run(query: &Query, dataset: &Dataset) -> QueryOutput {
    match query {
        Query::LocationTotals { years } => QueryOutput::Locations(aggregate_by_location(dataset, *years)),
        Query::TimeSeries { item, years, country } => QueryOutput::Series(aggregate_time_series(
            dataset,
            item,
            *years,
            country.as_deref(),
        )),
        Query::KnownItems => QueryOutput::Items(list_known_items(dataset)),
    }
}
