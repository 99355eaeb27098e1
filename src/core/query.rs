// =============================================================================
// QUERY — Fenêtres d'années, descripteurs de requêtes et lignes résultat
// =============================================================================
//
// Les deux formes de requêtes du moteur :
//
//   A. Totaux par lieu :
//        from r : Record
//        where yearFrom <= r.year <= yearTo
//        group by r.country, r.latitude, r.longitude
//        return sum(r.amount)
//
//   B. Série temporelle d'un produit :
//        from r : Record
//        where yearFrom <= r.year <= yearTo
//        where r.item = item
//        where r.country = country        (optionnel)
//        group by r.year
//        return sum(r.amount)
//
// Un `Query` est une valeur hachable : elle sert de clé au cache.
//
// =============================================================================

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// Fenêtre d'agrégation `[from, to]`, bornes incluses.
///
/// Une fenêtre inversée (`from > to`) est valide : elle est simplement vide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct YearRange {
    pub from: i32,
    pub to: i32,
}

impl YearRange {
    pub fn new(from: i32, to: i32) -> Self {
        YearRange { from, to }
    }

    /// Fenêtre réduite à une seule année
    pub fn single(year: i32) -> Self {
        YearRange { from: year, to: year }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.from <= year && year <= self.to
    }

    pub fn is_empty(&self) -> bool {
        self.from > self.to
    }

    /// Nombre d'années couvertes (0 si la fenêtre est inversée)
    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (i64::from(self.to) - i64::from(self.from)) as usize + 1
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> {
        self.from..=self.to
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{}]", self.from, self.to)
    }
}

/// Une ligne de la requête A : production totale d'un pays sur la fenêtre.
///
/// `country` est le libellé exact à renvoyer tel quel dans le filtre
/// `country` de la requête B.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationTotal {
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub total_amount: f64,
}

/// Un point de la requête B.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearAmount {
    pub year: i32,
    pub amount: f64,
}

/// Descripteur d'une requête sur le Dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Query {
    /// Requête A
    LocationTotals { years: YearRange },
    /// Requête B ; `country: None` = monde entier
    TimeSeries {
        item: String,
        years: YearRange,
        country: Option<String>,
    },
    /// Libellés canoniques distincts
    KnownItems,
}

impl Query {
    pub fn location_totals(years: YearRange) -> Self {
        Query::LocationTotals { years }
    }

    pub fn time_series(item: &str, years: YearRange, country: Option<&str>) -> Self {
        Query::TimeSeries {
            item: item.to_string(),
            years,
            country: country.map(|c| c.to_string()),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::LocationTotals { years } => write!(f, "location_totals {}", years),
            Query::TimeSeries { item, years, country } => {
                write!(f, "time_series \"{}\" {}", item, years)?;
                if let Some(c) = country {
                    write!(f, " country=\"{}\"", c)?;
                }
                Ok(())
            }
            Query::KnownItems => write!(f, "known_items"),
        }
    }
}

/// Résultat d'une requête, quel que soit son type.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    Locations(Vec<LocationTotal>),
    Series(Vec<YearAmount>),
    Items(Vec<String>),
}

impl QueryOutput {
    /// Nombre de lignes produites
    pub fn len(&self) -> usize {
        match self {
            QueryOutput::Locations(rows) => rows.len(),
            QueryOutput::Series(points) => points.len(),
            QueryOutput::Items(items) => items.len(),
        }
    }

    /// Un résultat vide est un état normal ("pas de données pour cette sélection").
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Résultat partagé, tel que le rend le cache.
pub type SharedOutput = Arc<QueryOutput>;

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_year_range_bounds_are_inclusive() {
        let r = YearRange::new(1990, 1992);
        assert!(r.contains(1990));
        assert!(r.contains(1992));
        assert!(!r.contains(1989));
        assert!(!r.contains(1993));
        assert_eq!(r.len(), 3);
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![1990, 1991, 1992]);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let r = YearRange::new(2000, 1999);
        assert!(r.is_empty());
        assert_eq!(r.len(), 0);
        assert!(!r.contains(2000));
        assert!(!r.contains(1999));
        assert_eq!(r.iter().count(), 0);
    }

    #[test]
    fn test_queries_are_usable_as_keys() {
        let mut keys = HashSet::new();
        keys.insert(Query::time_series("Eggs", YearRange::new(1990, 1991), None));
        keys.insert(Query::time_series("Eggs", YearRange::new(1990, 1991), None));
        keys.insert(Query::time_series("Eggs", YearRange::new(1990, 1991), Some("Brazil")));
        keys.insert(Query::location_totals(YearRange::new(1990, 1991)));
        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn test_query_display() {
        let q = Query::time_series("Eggs", YearRange::new(1990, 1991), Some("Brazil"));
        assert_eq!(q.to_string(), "time_series \"Eggs\" [1990..1991] country=\"Brazil\"");
        assert_eq!(Query::KnownItems.to_string(), "known_items");
    }
}
