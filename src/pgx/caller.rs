//! Star allele calling and diplotype building.
//!
//! There are two call modes.  The dosage-aware mode counts chromosome copies and is
//! used for full genotypes; the presence-only mode is used when only observed bases
//! are known.  Their diplotype builders differ on purpose: the dosage-aware builder
//! sorts, the presence-only builder keeps definition row order.

use indexmap::IndexMap;
use itertools::Itertools;

use crate::pgx::{input::GenotypeCall, tables::AlleleDefinition};

/// The implicit reference allele.
pub const REFERENCE_ALLELE: &str = "*1";

/// Count the copies of each star allele in full genotype calls.
///
/// Counts are summed over all definition rows of the same allele.
pub fn call_alleles_dosage(
    definitions: &[AlleleDefinition],
    calls: &IndexMap<String, GenotypeCall>,
) -> IndexMap<String, usize> {
    let mut result: IndexMap<String, usize> = IndexMap::new();
    for definition in definitions {
        let Some(call) = calls.get(&definition.rsid) else {
            continue;
        };
        let count = call
            .copies()
            .into_iter()
            .filter(|base| *base == definition.alt)
            .count();
        if count > 0 {
            tracing::trace!(
                "{} {}: {} cop(ies) of {}",
                definition.gene,
                &definition.rsid,
                count,
                &definition.allele
            );
            *result.entry(definition.allele.clone()).or_default() += count;
        }
    }
    result
}

/// Detect star alleles whose defining base is observed, in definition row order.
///
/// Returns `["*1"]` if nothing matches.
pub fn call_alleles_presence(
    definitions: &[AlleleDefinition],
    bases: &IndexMap<String, String>,
) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();
    for definition in definitions {
        if bases.get(&definition.rsid).map(|s| s.as_str()) == Some(definition.alt.as_str())
            && !result.contains(&definition.allele)
        {
            result.push(definition.allele.clone());
        }
    }
    if result.is_empty() {
        vec![REFERENCE_ALLELE.to_owned()]
    } else {
        result
    }
}

/// Build the diplotype from allele copy counts: one entry per copy, padded with `*1`,
/// sorted lexicographically.
pub fn build_diplotype_sorted(counts: &IndexMap<String, usize>) -> String {
    let mut alleles = counts
        .iter()
        .flat_map(|(allele, count)| std::iter::repeat(allele.clone()).take(*count))
        .collect::<Vec<_>>();
    while alleles.len() < 2 {
        alleles.push(REFERENCE_ALLELE.to_owned());
    }
    alleles.sort();
    alleles.iter().take(2).join("/")
}

/// Build the diplotype from detected alleles without sorting.
pub fn build_diplotype_presence(alleles: &[String]) -> String {
    let detected = alleles
        .iter()
        .filter(|allele| allele.as_str() != REFERENCE_ALLELE)
        .collect::<Vec<_>>();
    match detected.as_slice() {
        [] => format!("{0}/{0}", REFERENCE_ALLELE),
        [allele] => format!("{}/{}", REFERENCE_ALLELE, allele),
        [first, second, ..] => format!("{}/{}", first, second),
    }
}
