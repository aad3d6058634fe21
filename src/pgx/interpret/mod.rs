//! Gene-specific interpreters on top of the curated tables.
//!
//! All interpreters return `Ok(None)` when their reference tables are missing so the
//! caller can fall back to the activity score classifier.

pub mod cyp2c19;
pub mod slco1b1;
pub mod warfarin;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    err::PgxError,
    pgx::{
        caller::{
            build_diplotype_presence, build_diplotype_sorted, call_alleles_dosage,
            call_alleles_presence,
        },
        input::{GenotypeCall, VariantInput},
        loci::Gene,
        phenotype::{normalize_phenotype, translate_diplotype, MetabolizerStatus},
        tables::{optional, GeneTables, ReferenceData},
    },
};

/// Result of interpreting one star-allele gene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarGeneResult {
    pub gene: Gene,
    pub diplotype: String,
    pub phenotype: String,
    pub status: MetabolizerStatus,
}

impl StarGeneResult {
    fn from_diplotype(tables: &GeneTables, diplotype: String) -> Self {
        let phenotype = translate_diplotype(&tables.translation, &diplotype);
        let status = normalize_phenotype(&phenotype);
        tracing::debug!("{}: {} => {} ({})", tables.gene, &diplotype, &phenotype, status);
        StarGeneResult {
            gene: tables.gene,
            diplotype,
            phenotype,
            status,
        }
    }
}

/// Interpret full genotype calls with dosage-aware calling.
pub fn interpret_full(tables: &GeneTables, calls: &IndexMap<String, GenotypeCall>) -> StarGeneResult {
    let counts = call_alleles_dosage(&tables.definitions, calls);
    StarGeneResult::from_diplotype(tables, build_diplotype_sorted(&counts))
}

/// Interpret observed bases with presence-only calling.
pub fn interpret_simple(tables: &GeneTables, bases: &IndexMap<String, String>) -> StarGeneResult {
    let alleles = call_alleles_presence(&tables.definitions, bases);
    StarGeneResult::from_diplotype(tables, build_diplotype_presence(&alleles))
}

/// Interpret `input` with already loaded tables, picking the call mode by input kind.
pub fn interpret_with_tables(tables: &GeneTables, input: &VariantInput) -> StarGeneResult {
    match input {
        VariantInput::Full(calls) => interpret_full(tables, calls),
        VariantInput::Simple(bases) => interpret_simple(tables, bases),
    }
}

/// Load the tables of `gene` and interpret `input`; `None` without curated data.
pub fn interpret_star_gene(
    gene: Gene,
    input: &VariantInput,
    data: &ReferenceData,
) -> Result<Option<StarGeneResult>, PgxError> {
    Ok(optional(data.load_gene_tables(gene))?
        .map(|tables| interpret_with_tables(&tables, input)))
}
