//! Warfarin dosing from the CYP2C9 diplotype and the VKORC1 promoter genotype.

use indexmap::IndexMap;
use itertools::Itertools;
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
        tables::{optional, AlleleDefinition, ReferenceData, TranslationTable},
    },
};

/// The VKORC1 -1639G>A promoter variant.
pub const VKORC1_RSID: &str = "rs9923231";

/// File name of the dosing table.
pub const WARFARIN_DOSING_FILE: &str = "warfarin_dosing.json";

/// Returned for combinations missing from the dosing table.
pub const UNKNOWN_COMBINATION: &str = "Unknown combination, consult CPIC guideline";

/// VKORC1 genotype assumed when the variant was not observed.
const VKORC1_REFERENCE: &str = "GG";

/// Result of the warfarin composite interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarfarinResult {
    pub cyp2c9_diplotype: String,
    pub vkorc1_genotype: String,
    /// Key into the dosing table.
    pub key: String,
    pub recommendation: String,
}

/// CYP2C9 diplotype from observed bases, presence-only.
pub fn cyp2c9_diplotype_simple(
    definitions: &[AlleleDefinition],
    bases: &IndexMap<String, String>,
) -> String {
    build_diplotype_presence(&call_alleles_presence(definitions, bases))
}

/// CYP2C9 diplotype from full genotypes, e.g., `*1/*2` for one and `*2/*2` for two copies.
pub fn cyp2c9_diplotype_full(
    definitions: &[AlleleDefinition],
    calls: &IndexMap<String, GenotypeCall>,
) -> String {
    build_diplotype_sorted(&call_alleles_dosage(definitions, calls))
}

/// VKORC1 genotype from an observed base string.
///
/// A bare `A` is read as heterozygous `GA`, a bare `G` as `GG`; `X,Y` is joined to `XY`.
pub fn vkorc1_genotype_simple(bases: &IndexMap<String, String>) -> String {
    match bases.get(VKORC1_RSID).map(|s| s.trim()) {
        None | Some("") | Some("G") => VKORC1_REFERENCE.to_owned(),
        Some("A") => "GA".to_owned(),
        Some(s) if s.contains(',') => s.split(',').map(|b| b.trim()).join(""),
        Some(s) => s.to_owned(),
    }
}

/// VKORC1 genotype from a full genotype call, by dosage.
pub fn vkorc1_genotype_full(calls: &IndexMap<String, GenotypeCall>) -> String {
    calls
        .get(VKORC1_RSID)
        .and_then(|call| call.bases_by_dosage())
        .unwrap_or_else(|| VKORC1_REFERENCE.to_owned())
}

/// Composite key into the dosing table.
pub fn dosing_key(cyp2c9_diplotype: &str, vkorc1_genotype: &str) -> String {
    format!("CYP2C9 {} + VKORC1 {}", cyp2c9_diplotype, vkorc1_genotype)
}

/// Interpret with loaded tables; `input` holds the CYP2C9 and the VKORC1 variants.
pub fn interpret_with_tables(
    definitions: &[AlleleDefinition],
    dosing: &TranslationTable,
    input: &VariantInput,
) -> WarfarinResult {
    let (cyp2c9_diplotype, vkorc1_genotype) = match input {
        VariantInput::Full(calls) => (
            cyp2c9_diplotype_full(definitions, calls),
            vkorc1_genotype_full(calls),
        ),
        VariantInput::Simple(bases) => (
            cyp2c9_diplotype_simple(definitions, bases),
            vkorc1_genotype_simple(bases),
        ),
    };
    let key = dosing_key(&cyp2c9_diplotype, &vkorc1_genotype);
    let recommendation = dosing.get(&key).unwrap_or(UNKNOWN_COMBINATION).to_owned();
    tracing::debug!("warfarin: {} => {}", &key, &recommendation);

    WarfarinResult {
        cyp2c9_diplotype,
        vkorc1_genotype,
        key,
        recommendation,
    }
}

/// Run the warfarin interpretation; `None` if CYP2C9 definitions or the dosing table
/// are missing.
pub fn interpret_warfarin(
    input: &VariantInput,
    data: &ReferenceData,
) -> Result<Option<WarfarinResult>, PgxError> {
    let Some(definitions) = optional(data.load_allele_definitions(Gene::Cyp2c9))? else {
        return Ok(None);
    };
    let Some(dosing) = optional(data.load_key_value(WARFARIN_DOSING_FILE))? else {
        return Ok(None);
    };
    Ok(Some(interpret_with_tables(&definitions, &dosing, input)))
}
