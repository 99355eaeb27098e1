// =============================================================================
// BACKEND CSV — Résultats en CSV avec en-tête
// =============================================================================
//
// Les lignes sont sérialisées par serde : les en-têtes viennent des noms de
// champs de LocationTotal / YearAmount. Les en-têtes sont écrits même quand
// le résultat est vide.
//
// Une Overview tient dans une seule table :
//   item,country,latitude,longitude,year,amount
// Les lignes de la carte n'ont ni produit ni année (amount = total de la
// fenêtre) ; les lignes de série n'ont pas de coordonnées, et leur pays est
// vide pour une série mondiale.
//
// =============================================================================

use serde::Serialize;

use crate::core::query::{LocationTotal, YearAmount};
use crate::backend::{ExportError, Exporter, Overview, SeriesScope};

/// Rendu CSV.
#[derive(Debug, Clone, Copy)]
pub struct CsvExporter {
    pub delimiter: u8,
}

impl Default for CsvExporter {
    fn default() -> Self {
        CsvExporter { delimiter: b',' }
    }
}

/// Ligne de la table d'une Overview.
#[derive(Serialize)]
struct OverviewRow<'a> {
    item: Option<&'a str>,
    country: Option<&'a str>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    year: Option<i32>,
    amount: f64,
}

impl CsvExporter {
    fn write<T: Serialize>(&self, headers: &[&str], rows: &[T]) -> Result<String, ExportError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .from_writer(Vec::new());
        writer.write_record(headers)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        let bytes = writer.into_inner().map_err(|e| e.into_error())?;
        Ok(String::from_utf8(bytes)?)
    }
}

impl Exporter for CsvExporter {
    fn render_locations(&self, rows: &[LocationTotal]) -> Result<String, ExportError> {
        self.write(&["country", "latitude", "longitude", "total_amount"], rows)
    }

    fn render_series(&self, _scope: SeriesScope<'_>, points: &[YearAmount]) -> Result<String, ExportError> {
        self.write(&["year", "amount"], points)
    }

    fn render_items(&self, items: &[String]) -> Result<String, ExportError> {
        let rows: Vec<(&str,)> = items.iter().map(|i| (i.as_str(),)).collect();
        self.write(&["item"], &rows)
    }

    fn render_overview(&self, overview: &Overview) -> Result<String, ExportError> {
        let country = overview.country.as_deref();
        let mut rows: Vec<OverviewRow<'_>> = overview
            .locations
            .iter()
            .map(|l| OverviewRow {
                item: None,
                country: Some(l.country.as_str()),
                latitude: Some(l.latitude),
                longitude: Some(l.longitude),
                year: None,
                amount: l.total_amount,
            })
            .collect();
        for panel in &overview.series {
            rows.extend(panel.points.iter().map(|p| OverviewRow {
                item: Some(panel.item.as_str()),
                country,
                latitude: None,
                longitude: None,
                year: Some(p.year),
                amount: p.amount,
            }));
        }
        self.write(&["item", "country", "latitude", "longitude", "year", "amount"], &rows)
    }

    fn name(&self) -> &str {
        "csv"
    }
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SeriesPanel;

    #[test]
    fn test_render_locations() {
        let out = CsvExporter::default()
            .render_locations(&[LocationTotal {
                country: "Korea, Republic of".into(),
                latitude: 35.9,
                longitude: 127.76,
                total_amount: 12.5,
            }])
            .unwrap();
        assert_eq!(
            out,
            "country,latitude,longitude,total_amount\n\"Korea, Republic of\",35.9,127.76,12.5\n"
        );
    }

    #[test]
    fn test_render_series_and_items() {
        let c = CsvExporter::default();
        let series = c
            .render_series(
                SeriesScope { item: "Eggs", country: None },
                &[YearAmount { year: 1990, amount: 15.0 }],
            )
            .unwrap();
        assert_eq!(series, "year,amount\n1990,15.0\n");
        let items = c.render_items(&["Cloves".into(), "Eggs".into()]).unwrap();
        assert_eq!(items, "item\nCloves\nEggs\n");
    }

    #[test]
    fn test_render_overview_single_table() {
        let overview = Overview {
            years: crate::core::query::YearRange::new(1985, 2005),
            country: None,
            locations: vec![LocationTotal {
                country: "France".into(),
                latitude: 46.23,
                longitude: 2.21,
                total_amount: 5.0,
            }],
            series: vec![SeriesPanel { item: "Eggs".into(), points: vec![YearAmount { year: 1990, amount: 15.0 }] }],
        };
        let out = CsvExporter::default().render_overview(&overview).unwrap();
        assert_eq!(
            out,
            "item,country,latitude,longitude,year,amount\n,France,46.23,2.21,,5.0\nEggs,,,,1990,15.0\n"
        );
    }

    #[test]
    fn test_empty_keeps_header() {
        assert_eq!(CsvExporter::default().render_locations(&[]).unwrap(), "country,latitude,longitude,total_amount\n");
    }
}
