// =============================================================================
// SOURCE — Lecture de la table brute
// =============================================================================
//
// La source FAO est un CSV encodé en ISO-8859-1 : on lit des octets bruts
// (csv::ByteRecord) et on décode chaque champ avec encoding_rs. Un octet
// Latin-1 isolé ("Côte d'Ivoire") n'est donc jamais une erreur.
//
// Le résultat est une RawTable : en-têtes + lignes de chaînes, sans aucune
// interprétation : les cellules sont gardées telles quelles, espaces compris.
// Toute la sémantique vient ensuite (schema, normalize).
//
// =============================================================================

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use encoding_rs::Encoding;
use tracing::{debug, info};

/// Erreurs de lecture de la source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("ouverture de la source impossible : {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV illisible : {0}")]
    Csv(#[from] csv::Error),
}

/// Table brute, telle que lue dans le fichier.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    /// Noms de colonnes, première ligne du fichier
    pub headers: Vec<String>,
    /// Une entrée par ligne de données ; une ligne courte reste courte
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        RawTable { headers, rows: Vec::new() }
    }

    /// Ajoute une ligne (utile pour construire des tables à la main)
    pub fn push_row<S: Into<String>>(&mut self, row: Vec<S>) -> &mut Self {
        self.rows.push(row.into_iter().map(Into::into).collect());
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Lit un fichier délimité et décode ses champs.
pub fn read_table(
    path: &Path,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<RawTable, SourceError> {
    let file = File::open(path)?;
    info!(path = %path.display(), encoding = encoding.name(), "lecture de la source");
    read_table_from(BufReader::new(file), delimiter, encoding)
}

/// Variante sur un lecteur quelconque.
pub fn read_table_from<R: Read>(
    reader: R,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<RawTable, SourceError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = decode_record(csv_reader.byte_headers()?, encoding);
    let mut table = RawTable::new(headers);

    let mut record = csv::ByteRecord::new();
    while csv_reader.read_byte_record(&mut record)? {
        table.rows.push(decode_record(&record, encoding));
    }

    debug!(columns = table.headers.len(), rows = table.rows.len(), "source lue");
    Ok(table)
}

/// Décode tous les champs d'un enregistrement.
///
/// Les séquences invalides sont remplacées (U+FFFD) plutôt que rejetées.
fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Vec<String> {
    record
        .iter()
        .map(|field| {
            let (decoded, _, _) = encoding.decode(field);
            decoded.into_owned()
        })
        .collect()
}
