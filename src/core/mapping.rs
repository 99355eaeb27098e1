// =============================================================================
// MAPPING — Canonicalisation des libellés de produits
// =============================================================================
//
// La source orthographie certains produits de plusieurs façons
// ("Coconuts - Incl Copra" vs "Coconuts (incl Copra)"). Un LabelMapping
// envoie chaque variante connue vers UN libellé canonique, par égalité
// exacte de chaînes. Les libellés absents de la table passent inchangés.
//
// PROPRIÉTÉ : la table doit être idempotente.
//   apply(apply(x)) = apply(x)   pour tout x
// Concrètement : aucune cible ne peut être elle-même une source renvoyant
// ailleurs. `check_idempotent` le vérifie.
//
// Le renommage est appliqué une fois pour toutes pendant la normalisation,
// jamais à la lecture.
//
// =============================================================================

use std::collections::HashMap;

/// Table de correspondance ancien libellé → libellé canonique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelMapping {
    labels: HashMap<String, String>,
}

impl LabelMapping {
    /// Crée une table vide (identité)
    pub fn new() -> Self {
        LabelMapping { labels: HashMap::new() }
    }

    /// Ajoute une correspondance. Une correspondance identique est ignorée.
    pub fn map_label(&mut self, old: &str, new: &str) -> &mut Self {
        if old != new {
            self.labels.insert(old.to_string(), new.to_string());
        }
        self
    }

    /// Libellé canonique de `label`.
    pub fn apply<'a>(&'a self, label: &'a str) -> &'a str {
        self.labels.get(label).map(String::as_str).unwrap_or(label)
    }

    /// Le libellé est-il une variante connue ?
    pub fn is_variant(&self, label: &str) -> bool {
        self.labels.contains_key(label)
    }

    /// Vérifie l'idempotence : renvoie la première cible qui est aussi une source.
    pub fn check_idempotent(&self) -> Result<(), String> {
        let mut targets: Vec<&String> = self
            .labels
            .values()
            .filter(|target| self.labels.contains_key(target.as_str()))
            .collect();
        targets.sort();
        match targets.first() {
            Some(label) => Err((*label).clone()),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl std::fmt::Display for LabelMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut pairs: Vec<_> = self.labels.iter().collect();
        pairs.sort();
        writeln!(f, "labels = {{")?;
        for (old, new) in pairs {
            writeln!(f, "  \"{}\" -> \"{}\"", old, new)?;
        }
        write!(f, "}}")
    }
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceConfig;

    #[test]
    fn test_default_fao_mapping() {
        let m = SourceConfig::default().label_mapping();
        assert_eq!(m.len(), 6);
        assert_eq!(m.apply("Coconuts - Incl Copra"), "Coconuts (incl Copra)");
        assert_eq!(m.apply("Fruits - Excluding Wine"), "Fruits (excl Wine)");
        assert_eq!(m.apply("Eggs"), "Eggs");
        assert!(m.check_idempotent().is_ok());
    }

    #[test]
    fn test_apply_twice_is_apply_once() {
        let m = SourceConfig::default().label_mapping();
        for label in [
            "Coconuts - Incl Copra",
            "Tea (including mate)",
            "Olives (including preserved)",
            "Milk - Excluding Butter",
            "Cereals - Excluding Beer",
            "Fruits - Excluding Wine",
            "Rye and products",
            "Coconuts (incl Copra)",
        ] {
            let once = m.apply(label);
            assert_eq!(m.apply(once), once, "libellé {}", label);
        }
    }

    #[test]
    fn test_exact_match_only() {
        let mut m = LabelMapping::new();
        m.map_label("Coconuts - Incl Copra", "Coconuts (incl Copra)");
        assert_eq!(m.apply("coconuts - incl copra"), "coconuts - incl copra");
        assert_eq!(m.apply("Coconuts - Incl Copra "), "Coconuts - Incl Copra ");
    }

    #[test]
    fn test_chained_mapping_is_rejected() {
        let mut m = LabelMapping::new();
        m.map_label("A", "B").map_label("B", "C");
        assert_eq!(m.check_idempotent(), Err("B".to_string()));
    }

    #[test]
    fn test_identity_pair_is_ignored() {
        let mut m = LabelMapping::new();
        m.map_label("Eggs", "Eggs");
        assert!(m.is_empty());
        assert!(m.check_idempotent().is_ok());
    }
}
