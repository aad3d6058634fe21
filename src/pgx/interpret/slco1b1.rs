//! SLCO1B1 transporter function and statin guidance.

use serde::{Deserialize, Serialize};

use crate::{
    err::PgxError,
    pgx::{
        input::VariantInput,
        phenotype::{normalize_phenotype, MetabolizerStatus},
        tables::{optional, GuidelineTable, ReferenceData, TranslationTable},
    },
};

/// The SLCO1B1 c.521T>C variant defining the decreased function alleles.
pub const SLCO1B1_RSID: &str = "rs4149056";

pub const SLCO1B1_PHENOTYPES_FILE: &str = "slco1b1_phenotypes.json";
pub const SLCO1B1_GUIDELINES_FILE: &str = "slco1b1_guidelines.json";

/// Returned when no guideline exists for the phenotype and drug.
pub const NO_GUIDELINE: &str = "No guideline available.";

/// Returned for genotypes missing from the phenotype table.
pub const UNKNOWN_FUNCTION: &str = "Unknown";

const REF_BASE: &str = "T";
const ALT_BASE: &str = "C";

/// Result of the SLCO1B1 interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slco1b1Result {
    /// Genotype such as `TC`, `None` for a no-call.
    pub genotype: Option<String>,
    pub phenotype: String,
    pub status: MetabolizerStatus,
    /// The drug guidance was requested for.
    pub drug: Option<String>,
    pub guideline: Option<String>,
}

/// Two-letter rs4149056 genotype.
///
/// Full calls are converted by dosage; an absent variant means `TT`.  Simple input
/// accepts a bare base (`T` is `TT`, `C` is the heterozygous `TC`) or `X,Y`.
pub fn slco1b1_genotype(input: &VariantInput) -> Option<String> {
    let reference = format!("{}{}", REF_BASE, REF_BASE);
    match input {
        VariantInput::Full(calls) => match calls.get(SLCO1B1_RSID) {
            Some(call) => call.bases_by_dosage(),
            None => Some(reference),
        },
        VariantInput::Simple(bases) => match bases.get(SLCO1B1_RSID).map(|s| s.trim()) {
            None | Some("") => Some(reference),
            Some(REF_BASE) => Some(reference),
            Some(ALT_BASE) => Some(format!("{}{}", REF_BASE, ALT_BASE)),
            Some(s) if s.contains(',') => Some(s.split(',').map(|b| b.trim()).collect()),
            Some(s) => Some(s.to_owned()),
        },
    }
}

/// Interpret with loaded tables.
pub fn interpret_with_tables(
    phenotypes: &TranslationTable,
    guidelines: Option<&GuidelineTable>,
    input: &VariantInput,
    drug: Option<&str>,
) -> Slco1b1Result {
    let genotype = slco1b1_genotype(input);
    let phenotype = genotype
        .as_deref()
        .and_then(|genotype| phenotypes.get(genotype))
        .unwrap_or(UNKNOWN_FUNCTION)
        .to_owned();
    let guideline = drug.map(|drug| {
        guidelines
            .and_then(|table| table.get(&phenotype, drug))
            .unwrap_or(NO_GUIDELINE)
            .to_owned()
    });
    tracing::debug!("SLCO1B1: {:?} => {}", &genotype, &phenotype);

    Slco1b1Result {
        status: normalize_phenotype(&phenotype),
        genotype,
        phenotype,
        drug: drug.map(|s| s.to_owned()),
        guideline,
    }
}

/// Run the SLCO1B1 interpretation; `None` if the phenotype table is missing.
///
/// The guideline table is only read if a drug is given; without it every drug yields
/// `NO_GUIDELINE`.
pub fn interpret_slco1b1(
    input: &VariantInput,
    drug: Option<&str>,
    data: &ReferenceData,
) -> Result<Option<Slco1b1Result>, PgxError> {
    let Some(phenotypes) = optional(data.load_key_value(SLCO1B1_PHENOTYPES_FILE))? else {
        return Ok(None);
    };
    let guidelines = match drug {
        Some(_) => optional(data.load_guidelines(SLCO1B1_GUIDELINES_FILE))?,
        None => None,
    };
    Ok(Some(interpret_with_tables(
        &phenotypes,
        guidelines.as_ref(),
        input,
        drug,
    )))
}
