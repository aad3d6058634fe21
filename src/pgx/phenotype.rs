//! Diplotype translation and normalization of display phenotypes.

use serde::{Deserialize, Serialize};

use crate::pgx::tables::TranslationTable;

/// Label used for diplotypes missing from the translation table.
pub const UNKNOWN_PHENOTYPE: &str = "Unknown Metabolizer Status";

/// Normalized metabolizer status, comparable across genes and classification paths.
#[derive(
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Clone,
    Copy,
    Debug,
    Default,
    strum::Display,
    strum::EnumString,
)]
pub enum MetabolizerStatus {
    #[serde(rename = "poor_metabolizer")]
    #[strum(serialize = "poor_metabolizer")]
    Poor,
    #[serde(rename = "intermediate_metabolizer")]
    #[strum(serialize = "intermediate_metabolizer")]
    Intermediate,
    #[default]
    #[serde(rename = "extensive_metabolizer")]
    #[strum(serialize = "extensive_metabolizer")]
    Extensive,
    #[serde(rename = "ultra_rapid_metabolizer")]
    #[strum(serialize = "ultra_rapid_metabolizer")]
    UltraRapid,
    #[serde(rename = "unknown")]
    #[strum(serialize = "unknown")]
    Unknown,
}

impl MetabolizerStatus {
    /// Human readable form used in flattened profiles.
    pub fn description(&self) -> &'static str {
        match self {
            MetabolizerStatus::Poor => "poor metabolizer",
            MetabolizerStatus::Intermediate => "intermediate metabolizer",
            MetabolizerStatus::Extensive => "extensive metabolizer",
            MetabolizerStatus::UltraRapid => "ultra-rapid metabolizer",
            MetabolizerStatus::Unknown => "unknown metabolizer status",
        }
    }
}

/// Look up the display phenotype of `diplotype`.
pub fn translate_diplotype(table: &TranslationTable, diplotype: &str) -> String {
    table
        .get(diplotype.trim())
        .unwrap_or(UNKNOWN_PHENOTYPE)
        .to_owned()
}

/// Map a display phenotype to the normalized status.
///
/// The checks run in a fixed order; rapid (but not ultrarapid) metabolizers are
/// folded into extensive.
pub fn normalize_phenotype(label: &str) -> MetabolizerStatus {
    let label = label.to_lowercase();
    if label.contains("normal") {
        MetabolizerStatus::Extensive
    } else if label.contains("intermediate") {
        MetabolizerStatus::Intermediate
    } else if label.contains("poor") {
        MetabolizerStatus::Poor
    } else if label.contains("rapid") && !label.contains("ultra") {
        MetabolizerStatus::Extensive
    } else if label.contains("ultra") {
        MetabolizerStatus::UltraRapid
    } else {
        MetabolizerStatus::Unknown
    }
}
