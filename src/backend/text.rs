// =============================================================================
// BACKEND TEXT — Tableaux alignés pour le terminal
// =============================================================================

use crate::core::query::{LocationTotal, YearAmount};
use crate::backend::{ExportError, Exporter, Overview, SeriesScope};

/// Message affiché pour un résultat vide
pub const NO_DATA: &str = "pas de données pour cette sélection";

/// Rendu texte.
#[derive(Debug, Clone)]
pub struct TextExporter {
    /// Unité affichée dans les en-têtes de quantités
    pub unit: String,
    /// Décimales des quantités
    pub precision: usize,
}

impl Default for TextExporter {
    fn default() -> Self {
        TextExporter {
            unit: "1000 tonnes".into(),
            precision: 2,
        }
    }
}

impl TextExporter {
    fn amount_header(&self) -> String {
        format!("Amount ({})", self.unit)
    }
}

impl Exporter for TextExporter {
    fn render_locations(&self, rows: &[LocationTotal]) -> Result<String, ExportError> {
        if rows.is_empty() {
            return Ok(format!("{}\n", NO_DATA));
        }
        let width = rows.iter().map(|r| r.country.chars().count()).max().unwrap_or(0).max(7);
        let mut out = format!(
            "{:<width$}  {:>9}  {:>10}  {:>20}\n",
            "Country", "latitude", "longitude", self.amount_header(),
            width = width,
        );
        for r in rows {
            out.push_str(&format!(
                "{:<width$}  {:>9.4}  {:>10.4}  {:>20.prec$}\n",
                r.country, r.latitude, r.longitude, r.total_amount,
                width = width,
                prec = self.precision,
            ));
        }
        Ok(out)
    }

    fn render_series(&self, scope: SeriesScope<'_>, points: &[YearAmount]) -> Result<String, ExportError> {
        let mut out = format!("{}\n", scope);
        if points.is_empty() {
            out.push_str(&format!("  {}\n", NO_DATA));
            return Ok(out);
        }
        out.push_str(&format!("  {:<4}  {:>20}\n", "Year", self.amount_header()));
        for p in points {
            out.push_str(&format!("  {:<4}  {:>20.prec$}\n", p.year, p.amount, prec = self.precision));
        }
        Ok(out)
    }

    fn render_items(&self, items: &[String]) -> Result<String, ExportError> {
        if items.is_empty() {
            return Ok(format!("{}\n", NO_DATA));
        }
        Ok(items.iter().map(|i| format!("{}\n", i)).collect())
    }

    fn render_overview(&self, overview: &Overview) -> Result<String, ExportError> {
        let mut out = format!("Période : {} à {}\n", overview.years.from, overview.years.to);
        match &overview.country {
            Some(c) => out.push_str(&format!("Pays choisi : {}\n", c)),
            None => out.push_str("Aucun pays choisi : production mondiale\n"),
        }
        out.push('\n');
        out.push_str(&self.render_locations(&overview.locations)?);
        for panel in &overview.series {
            out.push('\n');
            out.push_str(&self.render_series(overview.scope(panel), &panel.points)?);
        }
        Ok(out)
    }

    fn name(&self) -> &str {
        "text"
    }
}
