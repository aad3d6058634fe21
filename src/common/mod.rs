//! Common functionality.

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

pub mod io;

/// Commonly used command line arguments.
#[derive(Parser, Debug)]
pub struct Args {
    /// Verbosity of the program
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            verbose: Verbosity::new(0, 0),
        }
    }
}

/// Helper to print the current memory resident set size via `tracing`.
pub fn trace_rss_now() {
    let rss = procfs::process::Process::myself()
        .and_then(|me| me.stat())
        .map(|stat| stat.rss * procfs::page_size());
    match rss {
        Ok(rss) => tracing::debug!("RSS now: {}", bytesize::ByteSize::b(rss).to_string_as(true)),
        Err(e) => tracing::trace!("could not determine RSS: {}", e),
    }
}

/// Normalize a chromosome name for comparison, e.g., `chr10` and `10` become `10`.
pub fn normalize_chrom(chrom: &str) -> String {
    let upper = chrom.trim().to_ascii_uppercase();
    match upper.strip_prefix("CHR") {
        Some(stripped) => stripped.to_owned(),
        None => upper,
    }
}

/// Helper type for encoding genotypes in parsing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Genotype {
    /// hom. ref.
    HomRef,
    /// het.
    Het,
    /// hom. alt.
    HomAlt,
    /// other, includes no-call and anything unrecognized
    WithNoCall,
}

impl Genotype {
    /// Interpret a diploid genotype string; phased calls are treated as unphased.
    ///
    /// This never fails, unknown separators and missing calls map to `WithNoCall`.
    pub fn from_gt(gt: &str) -> Self {
        match gt.trim().replace('|', "/").as_str() {
            "0/0" => Genotype::HomRef,
            "0/1" | "1/0" => Genotype::Het,
            "1/1" => Genotype::HomAlt,
            _ => Genotype::WithNoCall,
        }
    }

    /// Number of alternate allele copies, `None` if unknown.
    pub fn dosage(&self) -> Option<u8> {
        match self {
            Genotype::HomRef => Some(0),
            Genotype::Het => Some(1),
            Genotype::HomAlt => Some(2),
            Genotype::WithNoCall => None,
        }
    }
}

impl std::str::FromStr for Genotype {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Genotype::from_gt(s))
    }
}

/// Alternate allele dosage of the genotype string `gt`.
pub fn genotype_dosage(gt: &str) -> Option<u8> {
    Genotype::from_gt(gt).dosage()
}

/// Number of non-reference allele indices in `gt`, of any ploidy.
///
/// Missing (`.`) and unparseable indices are skipped, so `1/2` counts two and `0/2` one.
pub fn non_ref_allele_count(gt: &str) -> usize {
    gt.trim()
        .split(['/', '|'])
        .filter_map(|idx| idx.parse::<u32>().ok())
        .filter(|idx| *idx > 0)
        .count()
}

/// Whether `gt` carries at least one non-reference allele.
pub fn carries_non_ref(gt: &str) -> bool {
    non_ref_allele_count(gt) > 0
}

/// The version of `pgx-worker` package.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Return the version of the `pgx-worker` crate and `x.y.z` in tests.
pub fn worker_version() -> &'static str {
    if cfg!(test) {
        "x.y.z"
    } else {
        VERSION
    }
}
