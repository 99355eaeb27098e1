// =============================================================================
// CORE — Le moteur de normalisation et d'agrégation
// =============================================================================
//
// Tout ce qui compte vit ici. Le reste (rendu, CLI) ne fait qu'appeler
// ces fonctions et afficher leurs résultats.
//
// Architecture :
//   source     → lecture du fichier délimité (tolérant au Latin-1)
//   schema     → résolution des colonnes attendues, SchemaError
//   mapping    → canonicalisation des libellés de produits
//   normalize  → filtre "Food", projection, zéro pour les cellules vides
//   reshape    → melt : format large → format long (Record)
//   dataset    → le Dataset immuable + load_dataset
//   validate   → vérification des invariants du Dataset
//   query      → fenêtre d'années, descripteurs de requêtes, lignes résultat
//   eval       → les deux agrégations (par lieu, série temporelle)
//   cache      → mémoïsation optionnelle des requêtes
//
// =============================================================================

pub mod source;
pub mod schema;
pub mod mapping;
pub mod normalize;
pub mod reshape;
pub mod dataset;
pub mod validate;
pub mod query;
pub mod eval;
pub mod cache;
