//! The closed set of supported pharmacogenes and their coordinate windows.

use serde::{Deserialize, Serialize};

use crate::{common::normalize_chrom, err::PgxError};

/// Enumeration of the configured pharmacogenes.
///
/// The discriminant order must match `GENE_LOCI`.
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
    strum::EnumString,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Gene {
    Cyp2d6,
    Cyp2c19,
    Cyp2c9,
    Cyp3a5,
    Tpmt,
    Slco1b1,
    Vkorc1,
}

impl Gene {
    /// Parse a gene symbol, failing with `PgxError::UnsupportedGene` outside the locus set.
    pub fn from_symbol(symbol: &str) -> Result<Self, PgxError> {
        symbol
            .trim()
            .parse()
            .map_err(|_| PgxError::UnsupportedGene(symbol.to_owned()))
    }

    /// All configured genes, in registry order.
    pub fn all() -> Vec<Gene> {
        use strum::IntoEnumIterator;
        Gene::iter().collect()
    }

    /// Genes that receive a metabolizer status in a patient profile.
    ///
    /// VKORC1 only contributes to the warfarin composite.
    pub fn profiled() -> Vec<Gene> {
        Gene::all()
            .into_iter()
            .filter(|gene| *gene != Gene::Vkorc1)
            .collect()
    }

    /// The gene symbol, e.g., `CYP2C19`.
    pub fn symbol(&self) -> String {
        self.to_string()
    }

    /// Prefix of the reference data file names, e.g., `cyp2c19`.
    pub fn file_stem(&self) -> String {
        self.symbol().to_lowercase()
    }

    pub fn locus(&self) -> &'static GeneLocus {
        &GENE_LOCI[*self as usize]
    }
}

/// Coordinates of one gene on GRCh38, 1-based and inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneLocus {
    pub gene: Gene,
    pub chrom: &'static str,
    pub start: u64,
    pub end: u64,
}

impl GeneLocus {
    /// Whether `chrom:pos` falls into the window; `chr` prefixes are ignored.
    pub fn contains(&self, chrom: &str, pos: u64) -> bool {
        normalize_chrom(chrom) == normalize_chrom(self.chrom) && self.start <= pos && pos <= self.end
    }
}

/// Coordinate windows on GRCh38, including the upstream promoter of VKORC1.
pub static GENE_LOCI: &[GeneLocus] = &[
    GeneLocus {
        gene: Gene::Cyp2d6,
        chrom: "chr22",
        start: 42_126_000,
        end: 42_132_000,
    },
    GeneLocus {
        gene: Gene::Cyp2c19,
        chrom: "chr10",
        start: 94_758_000,
        end: 94_855_547,
    },
    GeneLocus {
        gene: Gene::Cyp2c9,
        chrom: "chr10",
        start: 94_938_658,
        end: 94_990_091,
    },
    GeneLocus {
        gene: Gene::Cyp3a5,
        chrom: "chr7",
        start: 99_645_193,
        end: 99_679_998,
    },
    GeneLocus {
        gene: Gene::Tpmt,
        chrom: "chr6",
        start: 18_128_311,
        end: 18_155_305,
    },
    GeneLocus {
        gene: Gene::Slco1b1,
        chrom: "chr12",
        start: 21_128_193,
        end: 21_242_796,
    },
    GeneLocus {
        gene: Gene::Vkorc1,
        chrom: "chr16",
        start: 31_089_000,
        end: 31_098_000,
    },
];

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::Gene;

    #[test]
    fn registry_order_matches_enum() {
        for gene in Gene::all() {
            assert_eq!(gene.locus().gene, gene);
        }
        assert_eq!(super::GENE_LOCI.len(), Gene::all().len());
    }

    #[rstest::rstest]
    #[case("CYP2C19", Gene::Cyp2c19)]
    #[case("cyp2c9", Gene::Cyp2c9)]
    #[case(" SLCO1B1 ", Gene::Slco1b1)]
    fn from_symbol(#[case] symbol: &str, #[case] expected: Gene) -> Result<(), anyhow::Error> {
        assert_eq!(Gene::from_symbol(symbol)?, expected);
        Ok(())
    }

    #[test]
    fn from_symbol_unsupported() {
        let err = Gene::from_symbol("BRCA1").unwrap_err();
        assert!(matches!(err, crate::err::PgxError::UnsupportedGene(s) if s == "BRCA1"));
    }

    #[test]
    fn symbol_and_file_stem() {
        assert_eq!(Gene::Cyp2c19.symbol(), "CYP2C19");
        assert_eq!(Gene::Slco1b1.file_stem(), "slco1b1");
    }

    #[test]
    fn profiled_excludes_vkorc1() {
        assert!(!Gene::profiled().contains(&Gene::Vkorc1));
        assert_eq!(Gene::profiled().len(), 6);
    }

    #[rstest::rstest]
    #[case("chr10", 94_781_859, true)]
    #[case("10", 94_781_859, true)]
    #[case("chr10", 94_758_000, true)]
    #[case("chr10", 94_855_547, true)]
    #[case("chr10", 94_855_548, false)]
    #[case("chr11", 94_781_859, false)]
    fn cyp2c19_window(#[case] chrom: &str, #[case] pos: u64, #[case] expected: bool) {
        assert_eq!(Gene::Cyp2c19.locus().contains(chrom, pos), expected);
    }
}
