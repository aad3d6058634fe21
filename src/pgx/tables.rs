//! Loading of curated allele definition and translation tables.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{common::io::open_read_maybe_gz, err::PgxError, pgx::loci::Gene};

/// Default directory with the reference data files.
pub const DEFAULT_DATA_DIR: &str = "data/pgx";

/// Keys starting with this prefix are metadata in key/value documents.
pub const DEFAULT_METADATA_PREFIX: &str = "_";

/// Marker for placeholder rows in allele definition tables.
const INERT: &str = "-";

/// Module with code supporting the parsing.
mod input {
    use serde::Deserialize;

    /// One row of an allele definition TSV file.
    #[derive(Debug, Deserialize)]
    pub struct Record {
        /// Star allele label, e.g., `*2`
        pub allele: String,
        /// Defining rsID or `-`
        pub rsid: String,
        /// Required alternate base or `-`
        pub alt: String,
        /// Functional class
        #[serde(default)]
        pub function: Option<String>,
    }
}

/// One defining variant of a star allele.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlleleDefinition {
    pub gene: Gene,
    /// Star allele label, e.g., `*2`.
    pub allele: String,
    /// The defining rsID.
    pub rsid: String,
    /// The alternate base required for the allele.
    pub alt: String,
    /// Functional class, if given.
    pub function: Option<String>,
}

/// Key to display label mapping with metadata entries removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationTable {
    entries: IndexMap<String, String>,
}

impl TranslationTable {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for TranslationTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        TranslationTable {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Phenotype to drug to guideline text mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidelineTable {
    entries: IndexMap<String, IndexMap<String, String>>,
}

impl GuidelineTable {
    /// Guideline for `phenotype` and `drug`; drug names are compared case-insensitively.
    pub fn get(&self, phenotype: &str, drug: &str) -> Option<&str> {
        let drug = drug.trim().to_lowercase();
        self.entries.get(phenotype).and_then(|drugs| {
            drugs
                .iter()
                .find(|(name, _)| name.to_lowercase() == drug)
                .map(|(_, text)| text.as_str())
        })
    }
}

/// The curated tables of one star-allele gene.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneTables {
    pub gene: Gene,
    pub definitions: Vec<AlleleDefinition>,
    pub translation: TranslationTable,
}

/// Access to the reference data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceData {
    dir: PathBuf,
    metadata_prefix: String,
}

impl Default for ReferenceData {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

impl ReferenceData {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            dir: dir.into(),
            metadata_prefix: DEFAULT_METADATA_PREFIX.to_owned(),
        }
    }

    pub fn with_metadata_prefix(mut self, prefix: &str) -> Self {
        self.metadata_prefix = prefix.to_owned();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a reference file in the data directory.
    pub fn path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Load `<gene>_allele_definitions.tsv`, skipping inert rows.
    pub fn load_allele_definitions(&self, gene: Gene) -> Result<Vec<AlleleDefinition>, PgxError> {
        let path = self.path(&format!("{}_allele_definitions.tsv", gene.file_stem()));
        tracing::debug!("loading allele definitions from {:?}", &path);

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(b'\t')
            .comment(Some(b'#'))
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(open_read_maybe_gz(&path)?);

        let mut result = Vec::new();
        for record in reader.deserialize() {
            let record: input::Record = record
                .map_err(|e| PgxError::Processing(format!("problem reading {:?}: {}", &path, e)))?;
            if record.rsid == INERT || record.alt == INERT {
                tracing::trace!("skipping inert row for {} {}", gene, &record.allele);
                continue;
            }
            if record.allele == "*1" {
                tracing::warn!("ignoring explicit *1 row in {:?}", &path);
                continue;
            }
            result.push(AlleleDefinition {
                gene,
                allele: record.allele,
                rsid: record.rsid,
                alt: record.alt,
                function: record.function.filter(|f| !f.is_empty()),
            });
        }

        Ok(result)
    }

    /// Load the JSON document `file_name` with metadata keys removed.
    fn load_document(
        &self,
        file_name: &str,
    ) -> Result<IndexMap<String, serde_json::Value>, PgxError> {
        let path = self.path(file_name);
        tracing::debug!("loading key/value document {:?}", &path);

        let reader = open_read_maybe_gz(&path)?;
        let document: IndexMap<String, serde_json::Value> = serde_json::from_reader(reader)
            .map_err(|e| PgxError::Processing(format!("problem decoding {:?}: {}", &path, e)))?;

        Ok(document
            .into_iter()
            .filter(|(key, _)| !key.starts_with(&self.metadata_prefix))
            .collect())
    }

    /// Load a flat key to label document, e.g., `warfarin_dosing.json`.
    pub fn load_key_value(&self, file_name: &str) -> Result<TranslationTable, PgxError> {
        self.load_document(file_name)?
            .into_iter()
            .map(|(key, value)| match value {
                serde_json::Value::String(label) => Ok((key, label)),
                other => Err(PgxError::Processing(format!(
                    "value of {:?} in {} is not a string: {}",
                    &key, file_name, other
                ))),
            })
            .collect()
    }

    /// Load the diplotype translation table `<gene>_phenotypes.json`.
    pub fn load_translation(&self, gene: Gene) -> Result<TranslationTable, PgxError> {
        self.load_key_value(&format!("{}_phenotypes.json", gene.file_stem()))
    }

    /// Load a nested phenotype to drug to guideline document.
    pub fn load_guidelines(&self, file_name: &str) -> Result<GuidelineTable, PgxError> {
        let entries = self
            .load_document(file_name)?
            .into_iter()
            .map(|(phenotype, drugs)| {
                serde_json::from_value::<IndexMap<String, String>>(drugs)
                    .map(|drugs| (phenotype, drugs))
                    .map_err(|e| {
                        PgxError::Processing(format!("problem decoding {}: {}", file_name, e))
                    })
            })
            .collect::<Result<_, _>>()?;
        Ok(GuidelineTable { entries })
    }

    /// Load both curated tables of `gene`.
    pub fn load_gene_tables(&self, gene: Gene) -> Result<GeneTables, PgxError> {
        Ok(GeneTables {
            gene,
            definitions: self.load_allele_definitions(gene)?,
            translation: self.load_translation(gene)?,
        })
    }
}

/// Load the curated tables of `gene` from `base_dir` or the default data directory.
pub fn load_gene_tables(gene: Gene, base_dir: Option<&Path>) -> Result<GeneTables, PgxError> {
    base_dir
        .map(ReferenceData::new)
        .unwrap_or_default()
        .load_gene_tables(gene)
}

/// Turn "file not found" into `None`, meaning that no curated data is available.
pub fn optional<T>(result: Result<T, PgxError>) -> Result<Option<T>, PgxError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(PgxError::NotFound(path)) => {
            tracing::debug!("no curated data at {:?}", &path);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
