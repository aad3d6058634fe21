//! Additive activity score classification for genes without curated tables.
//!
//! Each matched star allele contributes its activity value, missing copies are
//! filled with the fully functional `*1` and structural events scale the sum.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::pgx::{
    caller::REFERENCE_ALLELE, extract::ExtractedRegion, extract::VariantRecord, loci::Gene,
    phenotype::MetabolizerStatus,
};

/// Copy number of an unaffected diploid locus.
pub const DIPLOID: u32 = 2;

/// Scores above this are ultra-rapid.
pub const THRESHOLD_ULTRA_RAPID: f64 = 2.0;
/// Lower bound (inclusive) for extensive.
pub const THRESHOLD_EXTENSIVE: f64 = 1.5;
/// Lower bound (inclusive) for intermediate.
pub const THRESHOLD_INTERMEDIATE: f64 = 0.5;

/// One entry of the fallback knowledge base.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActivityScoreEntry {
    pub gene: Gene,
    pub rsid: &'static str,
    pub star_allele: &'static str,
    pub function: &'static str,
    /// Activity value in `[0.0, 1.0]`.
    pub score: f64,
}

macro_rules! entry {
    ($gene:ident, $rsid:literal, $allele:literal, $function:literal, $score:literal) => {
        ActivityScoreEntry {
            gene: Gene::$gene,
            rsid: $rsid,
            star_allele: $allele,
            function: $function,
            score: $score,
        }
    };
}

/// The static fallback knowledge base.
pub static ACTIVITY_SCORES: &[ActivityScoreEntry] = &[
    entry!(Cyp2d6, "rs3892097", "*4", "no function", 0.0),
    entry!(Cyp2d6, "rs5030655", "*6", "no function", 0.0),
    entry!(Cyp2d6, "rs35742686", "*3", "no function", 0.0),
    entry!(Cyp2d6, "rs1065852", "*10", "decreased function", 0.25),
    entry!(Cyp2d6, "rs28371725", "*41", "decreased function", 0.5),
    entry!(Cyp2d6, "rs16947", "*2", "normal function", 1.0),
    entry!(Cyp2c19, "rs4244285", "*2", "no function", 0.0),
    entry!(Cyp2c19, "rs4986893", "*3", "no function", 0.0),
    entry!(Cyp2c19, "rs12248560", "*17", "increased function", 1.0),
    entry!(Cyp2c9, "rs1799853", "*2", "decreased function", 0.5),
    entry!(Cyp2c9, "rs1057910", "*3", "no function", 0.0),
    entry!(Cyp3a5, "rs776746", "*3", "no function", 0.0),
    entry!(Cyp3a5, "rs10264272", "*6", "no function", 0.0),
    entry!(Cyp3a5, "rs41303343", "*7", "no function", 0.0),
    entry!(Tpmt, "rs1800462", "*2", "no function", 0.0),
    entry!(Tpmt, "rs1800460", "*3B", "no function", 0.0),
    entry!(Tpmt, "rs1142345", "*3C", "no function", 0.0),
    entry!(Slco1b1, "rs4149056", "*5", "decreased function", 0.5),
];

static RE_CN_INFO: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"(?:^|;)CN=(\d+)(?:;|$)").expect("invalid regex in source code")
});
static RE_CN_ALT: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"<CN(\d+)>").expect("invalid regex in source code"));

/// Knowledge base entry of `rsid` in `gene`.
pub fn lookup(gene: Gene, rsid: &str) -> Option<&'static ActivityScoreEntry> {
    ACTIVITY_SCORES
        .iter()
        .find(|entry| entry.gene == gene && entry.rsid == rsid)
}

/// Activity value of `star_allele`; `*1` is always 1.0 and unknown alleles count 0.0.
pub fn allele_score(gene: Gene, star_allele: &str) -> f64 {
    if star_allele == REFERENCE_ALLELE {
        return 1.0;
    }
    ACTIVITY_SCORES
        .iter()
        .find(|entry| entry.gene == gene && entry.star_allele == star_allele)
        .map(|entry| entry.score)
        .unwrap_or(0.0)
}

/// Map an activity score to the metabolizer status.
pub fn classify_score(score: f64) -> MetabolizerStatus {
    if score > THRESHOLD_ULTRA_RAPID {
        MetabolizerStatus::UltraRapid
    } else if score >= THRESHOLD_EXTENSIVE {
        MetabolizerStatus::Extensive
    } else if score >= THRESHOLD_INTERMEDIATE {
        MetabolizerStatus::Intermediate
    } else {
        MetabolizerStatus::Poor
    }
}

/// Structural interpretation of a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Structural {
    Deletion,
    /// Copy number of at least three.
    Duplication(u32),
    SingleCopy,
}

fn copy_number_token(record: &VariantRecord) -> Option<u32> {
    RE_CN_INFO
        .captures(&record.info)
        .or_else(|| RE_CN_ALT.captures(&record.alternative))
        .and_then(|caps| caps[1].parse().ok())
}

fn has_info_flag(record: &VariantRecord, flag: &str) -> bool {
    record.info.split(';').any(|kv| kv.trim() == flag)
}

fn structural(record: &VariantRecord) -> Option<Structural> {
    let copy_number = copy_number_token(record);
    if record.alternative.contains("<DEL")
        || has_info_flag(record, "SVTYPE=DEL")
        || copy_number == Some(0)
    {
        Some(Structural::Deletion)
    } else if record.alternative.contains("<DUP")
        || has_info_flag(record, "SVTYPE=DUP")
        || copy_number.map(|n| n >= 3).unwrap_or(false)
    {
        Some(Structural::Duplication(copy_number.unwrap_or(3).max(3)))
    } else if copy_number == Some(1) {
        Some(Structural::SingleCopy)
    } else {
        None
    }
}

/// Evidence collected for one sample in one gene window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEvidence {
    /// Matched star alleles, once per carried copy.
    pub alleles: Vec<String>,
    pub deletion: bool,
    pub copy_number: u32,
}

impl Default for ActivityEvidence {
    fn default() -> Self {
        Self {
            alleles: Vec::new(),
            deletion: false,
            copy_number: DIPLOID,
        }
    }
}

impl ActivityEvidence {
    /// Collect the evidence of `sample` from the records of `gene` in `region`.
    pub fn collect(gene: Gene, region: &ExtractedRegion, sample: &str) -> Self {
        let mut result = Self::default();
        for record in region.carried_by(sample) {
            match structural(record) {
                Some(Structural::Deletion) => {
                    tracing::trace!("{}: deletion at {}:{}", gene, &record.chrom, record.pos);
                    result.deletion = true;
                    result.copy_number = 0;
                }
                Some(_) if result.deletion => (),
                Some(Structural::Duplication(n)) => {
                    result.copy_number = if result.copy_number >= 3 {
                        result.copy_number.max(n)
                    } else {
                        n
                    };
                }
                Some(Structural::SingleCopy) => {
                    if result.copy_number < 3 {
                        result.copy_number = 1;
                    }
                }
                None => {
                    let Some(entry) = record.rsid().and_then(|rsid| lookup(gene, rsid)) else {
                        continue;
                    };
                    for _ in 0..record.non_ref_copies(sample) {
                        result.alleles.push(entry.star_allele.to_owned());
                    }
                }
            }
        }
        result
    }

    /// The additive activity score of this evidence.
    pub fn score(&self, gene: Gene) -> f64 {
        if self.deletion {
            return 0.0;
        }
        if self.alleles.is_empty() {
            return f64::from(self.copy_number);
        }

        let summed = score_from_alleles(gene, &self.alleles);
        match self.copy_number {
            n if n >= 3 => summed * f64::from(n) / f64::from(DIPLOID),
            1 => summed * 0.5,
            _ => summed,
        }
    }
}

/// Sum the activity values of `alleles`, padded with `*1` to two entries.
pub fn score_from_alleles<S: AsRef<str>>(gene: Gene, alleles: &[S]) -> f64 {
    let padding = DIPLOID as usize - alleles.len().min(DIPLOID as usize);
    alleles
        .iter()
        .map(|allele| allele_score(gene, allele.as_ref()))
        .sum::<f64>()
        + padding as f64 * allele_score(gene, REFERENCE_ALLELE)
}

/// Result of the fallback classification for one gene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityResult {
    pub gene: Gene,
    pub alleles: Vec<String>,
    pub deletion: bool,
    pub copy_number: u32,
    pub score: f64,
    pub status: MetabolizerStatus,
}

/// Classify `sample` in `gene` from the records of `region`.
pub fn classify_region(gene: Gene, region: &ExtractedRegion, sample: &str) -> ActivityResult {
    let evidence = ActivityEvidence::collect(gene, region, sample);
    let score = evidence.score(gene);
    let status = classify_score(score);
    tracing::debug!(
        "{}: activity score {} from {:?} (copy number {}) => {}",
        gene,
        score,
        &evidence.alleles,
        evidence.copy_number,
        status
    );
    ActivityResult {
        gene,
        alleles: evidence.alleles,
        deletion: evidence.deletion,
        copy_number: evidence.copy_number,
        score,
        status,
    }
}
