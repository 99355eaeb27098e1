// =============================================================================
// CONFIG — Description de la source FAO et valeurs par défaut de la vue
// =============================================================================
//
// Toutes les constantes de la source (noms de colonnes, préfixe des années,
// bornes, libellés à corriger) sont regroupées ici. Les valeurs par défaut
// décrivent exactement le fichier FAO.csv ; un fichier TOML peut en
// surcharger une partie :
//
// ```toml
// [source]
// encoding = "ISO-8859-1"
// min_year = 1961
// max_year = 2013
//
// [source.item_labels]
// "Rice (Milled Equivalent)" = "Rice (milled)"
//
// [view]
// default_window = [1985, 2005]
// default_items = ["Rye and products", "Cloves", "Soyabeans"]
// ```
//
// Les entrées de [source.item_labels] s'ajoutent aux six corrections FAO
// par défaut (et remplacent celle de même source) ; elles ne les effacent pas.
//
// =============================================================================

use std::collections::BTreeMap;
use std::path::Path;

use encoding_rs::Encoding;
use serde::{Deserialize, Deserializer};

use crate::core::mapping::LabelMapping;
use crate::core::query::YearRange;

/// Erreurs de configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("lecture de la configuration impossible : {0}")]
    Io(#[from] std::io::Error),
    #[error("configuration TOML invalide : {0}")]
    Toml(#[from] toml::de::Error),
    #[error("encodage inconnu : '{0}'")]
    UnknownEncoding(String),
    #[error("le délimiteur doit tenir sur un octet : '{0}'")]
    InvalidDelimiter(char),
    #[error("bornes d'années inversées : {min} > {max}")]
    InvertedYearBounds { min: i32, max: i32 },
    #[error("table de libellés non idempotente : '{label}' est à la fois cible et source")]
    NonIdempotentLabels { label: String },
}

/// Configuration complète : la source et la vue.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub view: ViewConfig,
}

/// Comment lire et normaliser la table brute.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Libellé d'encodage (WHATWG), ex: "ISO-8859-1"
    pub encoding: String,
    pub delimiter: char,
    /// Colonne discriminante ; seules les lignes "Food" sont conservées
    pub element_column: String,
    pub area_column: String,
    pub item_column: String,
    pub latitude_column: String,
    pub longitude_column: String,
    /// Préfixe des colonnes d'années ("Y1961" → 1961)
    pub year_prefix: String,
    pub min_year: i32,
    pub max_year: i32,
    /// Colonnes administratives ignorées sans bruit
    pub dropped_columns: Vec<String>,
    /// Corrections de libellés : ancien → canonique
    #[serde(deserialize_with = "merge_item_labels")]
    pub item_labels: BTreeMap<String, String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            encoding: "ISO-8859-1".into(),
            delimiter: ',',
            element_column: "Element".into(),
            area_column: "Area".into(),
            item_column: "Item".into(),
            latitude_column: "latitude".into(),
            longitude_column: "longitude".into(),
            year_prefix: "Y".into(),
            min_year: 1961,
            max_year: 2013,
            dropped_columns: vec![
                "Area Abbreviation".into(),
                "Area Code".into(),
                "Item Code".into(),
                "Element Code".into(),
                "Unit".into(),
            ],
            item_labels: fao_item_labels(),
        }
    }
}

/// Les corrections de libellés propres au fichier FAO.
fn fao_item_labels() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("Coconuts - Incl Copra".into(), "Coconuts (incl Copra)".into()),
        ("Tea (including mate)".into(), "Tea (incl Mate)".into()),
        ("Olives (including preserved)".into(), "Olives (incl Preserved)".into()),
        ("Milk - Excluding Butter".into(), "Tea Milk (excl Butter)".into()),
        ("Cereals - Excluding Beer".into(), "Cereals (excl Beer)".into()),
        ("Fruits - Excluding Wine".into(), "Fruits (excl Wine)".into()),
    ])
}

/// Fusionne la table TOML par-dessus les corrections FAO.
fn merge_item_labels<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut labels = fao_item_labels();
    labels.extend(BTreeMap::<String, String>::deserialize(deserializer)?);
    Ok(labels)
}

impl SourceConfig {
    /// Résout le libellé d'encodage.
    pub fn encoding(&self) -> Result<&'static Encoding, ConfigError> {
        Encoding::for_label(self.encoding.as_bytes())
            .ok_or_else(|| ConfigError::UnknownEncoding(self.encoding.clone()))
    }

    /// Délimiteur sous forme d'octet, comme l'attend `csv`.
    pub fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(|b| b.is_ascii())
            .ok_or(ConfigError::InvalidDelimiter(self.delimiter))
    }

    /// Toutes les années attendues, bornes incluses.
    pub fn years(&self) -> YearRange {
        YearRange::new(self.min_year, self.max_year)
    }

    /// Construit la table de libellés à partir de `item_labels`.
    pub fn label_mapping(&self) -> LabelMapping {
        let mut mapping = LabelMapping::new();
        for (old, new) in &self.item_labels {
            mapping.map_label(old, new);
        }
        mapping
    }

    /// Vérifie la description de la source avant tout chargement.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.encoding()?;
        self.delimiter_byte()?;
        if self.min_year > self.max_year {
            return Err(ConfigError::InvertedYearBounds {
                min: self.min_year,
                max: self.max_year,
            });
        }
        if let Err(label) = self.label_mapping().check_idempotent() {
            return Err(ConfigError::NonIdempotentLabels { label });
        }
        Ok(())
    }

    /// La colonne doit-elle disparaître sans être signalée ?
    pub fn is_dropped(&self, column: &str) -> bool {
        column == self.element_column || self.dropped_columns.iter().any(|c| c == column)
    }
}

/// Valeurs par défaut de la couche de présentation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub default_window: (i32, i32),
    pub default_items: Vec<String>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            default_window: (1985, 2005),
            default_items: vec![
                "Rye and products".into(),
                "Cloves".into(),
                "Soyabeans".into(),
            ],
        }
    }
}

impl ViewConfig {
    pub fn window(&self) -> YearRange {
        YearRange::new(self.default_window.0, self.default_window.1)
    }
}

impl Config {
    /// Parse une configuration TOML puis la valide.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Lit et valide un fichier TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Vérifie la cohérence de la configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.source.validate()
    }
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.source.years().len(), 53);
        assert_eq!(config.source.encoding().unwrap(), encoding_rs::WINDOWS_1252);
        assert_eq!(config.view.window(), YearRange::new(1985, 2005));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [source]
            min_year = 1990
            max_year = 1995

            [view]
            default_items = ["Eggs"]
            "#,
        )
        .unwrap();
        assert_eq!(config.source.years(), YearRange::new(1990, 1995));
        assert_eq!(config.source.element_column, "Element");
        assert_eq!(config.view.default_items, vec!["Eggs".to_string()]);
        assert_eq!(config.view.default_window, (1985, 2005));
    }

    #[test]
    fn test_rejects_unknown_encoding() {
        let err = Config::from_toml_str("[source]\nencoding = \"klingon\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownEncoding(_)));
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let err = Config::from_toml_str("[source]\nmin_year = 2000\nmax_year = 1999\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvertedYearBounds { min: 2000, max: 1999 }));
    }

    #[test]
    fn test_rejects_chained_labels() {
        // "A" → "B" puis "B" → "C" : appliquer deux fois changerait le résultat
        let err = Config::from_toml_str(
            "[source.item_labels]\nA = \"B\"\nB = \"C\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::NonIdempotentLabels { .. }));
    }

    #[test]
    fn test_item_labels_extend_fao_defaults() {
        let config = Config::from_toml_str(
            r#"
            [source.item_labels]
            "Rice (Milled Equivalent)" = "Rice (milled)"
            "Fruits - Excluding Wine" = "Fruits (no Wine)"
            "#,
        )
        .unwrap();
        let labels = &config.source.item_labels;
        assert_eq!(labels.len(), 7);
        assert_eq!(labels["Rice (Milled Equivalent)"], "Rice (milled)");
        assert_eq!(labels["Fruits - Excluding Wine"], "Fruits (no Wine)");
        assert_eq!(labels["Coconuts - Incl Copra"], "Coconuts (incl Copra)");

        let mapping = config.source.label_mapping();
        assert_eq!(mapping.apply("Cereals - Excluding Beer"), "Cereals (excl Beer)");
    }

    #[test]
    fn test_item_labels_cannot_chain_onto_defaults() {
        // "Cereals (excl Beer)" est déjà une cible FAO
        let err = Config::from_toml_str(
            r#"
            [source.item_labels]
            "Cereals (excl Beer)" = "Cereals"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::NonIdempotentLabels { .. }));
    }

    #[test]
    fn test_rejects_multibyte_delimiter() {
        let err = Config::from_toml_str("[source]\ndelimiter = \"é\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDelimiter('é')));
    }
}
