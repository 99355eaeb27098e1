// =============================================================================
// BACKEND JSON — Sérialisation serde_json des résultats
// =============================================================================

use serde::Serialize;

use crate::core::query::{LocationTotal, YearAmount};
use crate::backend::{ExportError, Exporter, Overview, SeriesScope};

/// Rendu JSON.
#[derive(Debug, Clone, Default)]
pub struct JsonExporter {
    pub pretty: bool,
}

/// Document d'une série : son périmètre puis ses points.
#[derive(Serialize)]
struct SeriesDocument<'a> {
    item: &'a str,
    country: Option<&'a str>,
    points: &'a [YearAmount],
}

/// Document d'une Overview : la fenêtre, la carte, puis les séries.
#[derive(Serialize)]
struct OverviewDocument<'a> {
    from: i32,
    to: i32,
    country: Option<&'a str>,
    locations: &'a [LocationTotal],
    series: Vec<SeriesDocument<'a>>,
}

impl JsonExporter {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, ExportError> {
        let text = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(text)
    }
}

impl Exporter for JsonExporter {
    fn render_locations(&self, rows: &[LocationTotal]) -> Result<String, ExportError> {
        self.encode(rows)
    }

    fn render_series(&self, scope: SeriesScope<'_>, points: &[YearAmount]) -> Result<String, ExportError> {
        self.encode(&SeriesDocument {
            item: scope.item,
            country: scope.country,
            points,
        })
    }

    fn render_items(&self, items: &[String]) -> Result<String, ExportError> {
        self.encode(items)
    }

    fn render_overview(&self, overview: &Overview) -> Result<String, ExportError> {
        self.encode(&OverviewDocument {
            from: overview.years.from,
            to: overview.years.to,
            country: overview.country.as_deref(),
            locations: &overview.locations,
            series: overview
                .series
                .iter()
                .map(|panel| SeriesDocument {
                    item: &panel.item,
                    country: overview.country.as_deref(),
                    points: &panel.points,
                })
                .collect(),
        })
    }

    fn name(&self) -> &str {
        "json"
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
        let out = JsonExporter::default()
            .render_locations(&[LocationTotal {
                country: "France".into(),
                latitude: 46.23,
                longitude: 2.21,
                total_amount: 5.0,
            }])
            .unwrap();
        assert_eq!(
            out,
            r#"[{"country":"France","latitude":46.23,"longitude":2.21,"total_amount":5.0}]"#
        );
    }

    #[test]
    fn test_render_worldwide_series() {
        let out = JsonExporter::default()
            .render_series(
                SeriesScope { item: "Eggs", country: None },
                &[YearAmount { year: 1990, amount: 15.0 }],
            )
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["item"], "Eggs");
        assert!(value["country"].is_null());
        assert_eq!(value["points"][0]["year"], 1990);
        assert_eq!(value["points"][0]["amount"], 15.0);
    }

    #[test]
    fn test_render_overview_is_one_document() {
        let overview = Overview {
            years: crate::core::query::YearRange::new(1985, 2005),
            country: Some("Brazil".into()),
            locations: vec![LocationTotal {
                country: "Brazil".into(),
                latitude: -14.24,
                longitude: -51.93,
                total_amount: 30.0,
            }],
            series: vec![
                SeriesPanel { item: "Eggs".into(), points: vec![YearAmount { year: 1990, amount: 10.0 }] },
                SeriesPanel { item: "Cloves".into(), points: vec![] },
            ],
        };
        let out = JsonExporter::default().render_overview(&overview).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["from"], 1985);
        assert_eq!(value["to"], 2005);
        assert_eq!(value["country"], "Brazil");
        assert_eq!(value["locations"][0]["total_amount"], 30.0);
        assert_eq!(value["series"][0]["item"], "Eggs");
        assert_eq!(value["series"][0]["country"], "Brazil");
        assert_eq!(value["series"][1]["points"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_empty_is_empty_array() {
        let j = JsonExporter::default();
        assert_eq!(j.render_locations(&[]).unwrap(), "[]");
        assert_eq!(j.render_items(&[]).unwrap(), "[]");
    }
}
