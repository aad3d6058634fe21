//! Tagged variant input of the interpreters.
//!
//! Variants either come with full genotypes (from variant files) or as a simple
//! rsID to observed base mapping (benchmark cases without zygosity).  The branch is
//! chosen by the caller when building the input, never inside the matching code.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{common::genotype_dosage, pgx::extract::ExtractedRegion};

/// Reference base, alternate base(s) and `GT` string at one rsID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenotypeCall {
    pub reference: String,
    pub alternative: String,
    pub genotype: String,
}

impl GenotypeCall {
    pub fn new(reference: &str, alternative: &str, genotype: &str) -> Self {
        Self {
            reference: reference.to_owned(),
            alternative: alternative.to_owned(),
            genotype: genotype.to_owned(),
        }
    }

    /// Alternate allele dosage, see `common::genotype_dosage`.
    pub fn dosage(&self) -> Option<u8> {
        genotype_dosage(&self.genotype)
    }

    /// Bases on the called chromosome copies; copies with missing or invalid allele
    /// index are left out.
    pub fn copies(&self) -> Vec<&str> {
        let alts = self.alternative.split(',').collect::<Vec<_>>();
        self.genotype
            .split(['/', '|'])
            .filter_map(|idx| idx.trim().parse::<usize>().ok())
            .filter_map(|idx| match idx {
                0 => Some(self.reference.as_str()),
                n => alts.get(n - 1).copied(),
            })
            .collect()
    }

    /// Two-letter genotype by dosage, e.g., `TC` for a het. `T>C` call.
    pub fn bases_by_dosage(&self) -> Option<String> {
        self.dosage().map(|dosage| match dosage {
            0 => format!("{}{}", self.reference, self.reference),
            1 => format!("{}{}", self.reference, self.alternative),
            _ => format!("{}{}", self.alternative, self.alternative),
        })
    }
}

/// Variants of one sample at the rsIDs of one gene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "variants", rename_all = "snake_case")]
pub enum VariantInput {
    /// rsID to full genotype call
    Full(IndexMap<String, GenotypeCall>),
    /// rsID to observed base, without zygosity
    Simple(IndexMap<String, String>),
}

impl VariantInput {
    /// Construct input with full genotypes.
    pub fn full<I, K>(calls: I) -> Self
    where
        I: IntoIterator<Item = (K, GenotypeCall)>,
        K: Into<String>,
    {
        VariantInput::Full(calls.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Construct presence-only input.
    pub fn simple<I, K, V>(bases: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        VariantInput::Simple(
            bases
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Full genotype input of `sample` from the records in `region` that have an rsID.
    ///
    /// If an rsID occurs more than once, a variant-carrying call wins.
    pub fn from_region(region: &ExtractedRegion, sample: &str) -> Self {
        Self::from_regions(&[region], sample)
    }

    /// Like `from_region` but merge the records of several regions, e.g., CYP2C9 and
    /// VKORC1 for warfarin.
    pub fn from_regions(regions: &[&ExtractedRegion], sample: &str) -> Self {
        let mut calls: IndexMap<String, GenotypeCall> = IndexMap::new();
        for record in regions.iter().flat_map(|region| region.records.iter()) {
            let (Some(rsid), Some(gt)) = (record.rsid(), record.genotype_str(sample)) else {
                continue;
            };
            let call = GenotypeCall::new(&record.reference, &record.alternative, gt);
            match calls.get(rsid) {
                Some(prev) if prev.dosage().unwrap_or(0) >= call.dosage().unwrap_or(0) => {
                    tracing::trace!("keeping earlier call for duplicate {}", rsid)
                }
                _ => {
                    calls.insert(rsid.to_owned(), call);
                }
            }
        }
        VariantInput::Full(calls)
    }

    pub fn contains(&self, rsid: &str) -> bool {
        match self {
            VariantInput::Full(calls) => calls.contains_key(rsid),
            VariantInput::Simple(bases) => bases.contains_key(rsid),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            VariantInput::Full(calls) => calls.is_empty(),
            VariantInput::Simple(bases) => bases.is_empty(),
        }
    }
}
