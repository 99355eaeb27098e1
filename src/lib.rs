// =============================================================================
// FOODATLAS — Moteur d'agrégation sur la production alimentaire FAO
// =============================================================================
//
// Foodatlas charge UNE fois la table FAO (production par pays, produit et
// année), la normalise, la passe en format long, puis répond à deux formes
// de requêtes d'agrégation en lecture seule.
//
// Architecture :
//   core/     → Le moteur pur : chargement, normalisation, requêtes
//   backend/  → Rendu des résultats (texte, JSON, CSV)
//   config    → Configuration de la source et des valeurs par défaut
//
// Flux de données :
//   CSV brut → normalize → reshape → Dataset (immuable) → eval → backend
//
// =============================================================================

pub mod config;
pub mod core;
pub mod backend;
