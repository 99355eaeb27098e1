// =============================================================================
// RESHAPE — Pivot "melt" : format large → format long
// =============================================================================
//
// Format large (une ligne par pays × produit) :
//
//   Country | Item | latitude | longitude | 1990 | 1991
//   Brazil  | Eggs |  -14.24  |  -51.93   |  10  |  20
//
// Format long (une ligne par pays × produit × année) :
//
//   Brazil | Eggs | -14.24 | -51.93 | 1990 | 10
//   Brazil | Eggs | -14.24 | -51.93 | 1991 | 20
//
// C'est un pur changement de forme :
//   - lignes après = lignes avant × nombre de colonnes d'années
//   - les colonnes d'identité sont recopiées telles quelles
//   - Σ amount est conservée (aucune agrégation ici)
//
// L'ordre d'émission n'est pas garanti ; les consommateurs trient ou
// regroupent eux-mêmes.
//
// =============================================================================

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::dataset::Record;
use super::normalize::{WideRow, WideTable};

/// Déplie toute la table large.
///
/// Les libellés de pays et de produits sont partagés (`Arc<str>`) entre
/// tous les enregistrements qui les portent.
pub fn melt(table: &WideTable) -> Vec<Record> {
    let mut interner = Interner::default();
    let mut records = Vec::with_capacity(table.rows.len() * table.years.len());

    for row in &table.rows {
        let country = interner.intern(&row.country);
        let item = interner.intern(&row.item);
        records.extend(melt_row(row, &table.years, &country, &item));
    }

    debug!(
        wide_rows = table.rows.len(),
        year_columns = table.years.len(),
        records = records.len(),
        "melt terminé"
    );
    records
}

/// Déplie une seule ligne : un Record par colonne d'année.
pub fn melt_row<'a>(
    row: &'a WideRow,
    years: &'a [i32],
    country: &'a Arc<str>,
    item: &'a Arc<str>,
) -> impl Iterator<Item = Record> + 'a {
    years.iter().zip(&row.amounts).map(move |(&year, &amount)| Record {
        country: Arc::clone(country),
        item: Arc::clone(item),
        latitude: row.latitude,
        longitude: row.longitude,
        year,
        amount,
    })
}

/// Partage les chaînes identiques.
#[derive(Default)]
struct Interner {
    strings: HashMap<String, Arc<str>>,
}

impl Interner {
    fn intern(&mut self, s: &str) -> Arc<str> {
        if let Some(existing) = self.strings.get(s) {
            return Arc::clone(existing);
        }
        let shared: Arc<str> = Arc::from(s);
        self.strings.insert(s.to_string(), Arc::clone(&shared));
        shared
    }
}
