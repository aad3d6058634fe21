//! Assembly of the multi-gene patient profile.

use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use clap::Parser;
use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    common::{trace_rss_now, worker_version},
    err::PgxError,
    pgx::{
        activity::classify_region,
        conf::{ConfArgs, PgxConf},
        extract::{extract_region, read_samples, ExtractedRegion},
        input::VariantInput,
        interpret::{
            interpret_star_gene,
            slco1b1::{interpret_slco1b1, Slco1b1Result},
            warfarin::{interpret_warfarin, WarfarinResult},
        },
        loci::Gene,
        phenotype::MetabolizerStatus,
        tables::ReferenceData,
    },
};

/// Statement used when no gene deviates from the extensive metabolizer default.
pub const ALL_EXTENSIVE: &str = "extensive metabolizer for all tested genes";

/// Patient metadata as read from the optional JSON file.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientMetadata {
    #[serde(default)]
    pub sample_id: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub lifestyle: IndexMap<String, String>,
}

impl PatientMetadata {
    /// Load patient metadata from the JSON file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PgxError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PgxError::NotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path).map_err(PgxError::processing)?;
        serde_json::from_str(&contents).map_err(PgxError::processing)
    }
}

/// How the status of a gene was determined.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ClassificationSource {
    /// Curated allele definition and translation tables.
    Curated,
    /// Additive activity score fallback.
    ActivityScore,
    /// No evidence or no data, extensive metabolizer assumed.
    Default,
}

/// Per-gene classification result.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GeneResult {
    pub gene: Gene,
    pub status: MetabolizerStatus,
    pub source: ClassificationSource,
    /// Diplotype or genotype, if determined from curated tables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diplotype: Option<String>,
    /// Display phenotype from the translation table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phenotype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_score: Option<f64>,
}

impl GeneResult {
    /// Extensive metabolizer without evidence.
    pub fn default_for(gene: Gene) -> Self {
        Self {
            gene,
            status: MetabolizerStatus::Extensive,
            source: ClassificationSource::Default,
            diplotype: None,
            phenotype: None,
            activity_score: None,
        }
    }
}

/// The consolidated profile of one patient.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PatientGeneticProfile {
    pub sample_id: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub lifestyle: IndexMap<String, String>,
    /// Metabolizer status per profiled gene.
    pub metabolizer_status: IndexMap<Gene, MetabolizerStatus>,
    /// Details per profiled gene, same order as `metabolizer_status`.
    pub genes: Vec<GeneResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warfarin: Option<WarfarinResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slco1b1: Option<Slco1b1Result>,
    /// Origin of the variant data, e.g., `vcf:sample.vcf.gz`.
    pub provenance: String,
    pub worker_version: String,
}

impl PatientGeneticProfile {
    /// Genes whose status differs from extensive, in profile order.
    pub fn non_extensive(&self) -> impl Iterator<Item = (&Gene, &MetabolizerStatus)> {
        self.metabolizer_status
            .iter()
            .filter(|(_, status)| **status != MetabolizerStatus::Extensive)
    }

    /// The pharmacogenomic statement, e.g., `CYP2C19: poor metabolizer`.
    pub fn pgx_statement(&self) -> String {
        let flagged = self
            .non_extensive()
            .map(|(gene, status)| format!("{}: {}", gene, status.description()))
            .join("; ");
        if flagged.is_empty() {
            ALL_EXTENSIVE.to_owned()
        } else {
            flagged
        }
    }

    /// Flattened text form of the profile.
    pub fn flattened_text(&self) -> String {
        let mut lines = vec![format!("Patient: {}", &self.sample_id)];
        if let Some(age) = self.age {
            lines.push(format!("Age: {}", age));
        }
        if !self.conditions.is_empty() {
            lines.push(format!("Conditions: {}", self.conditions.join(", ")));
        }
        if !self.lifestyle.is_empty() {
            lines.push(format!(
                "Lifestyle: {}",
                self.lifestyle
                    .iter()
                    .map(|(key, value)| format!("{}: {}", key, value))
                    .join(", ")
            ));
        }
        lines.push(format!("Pharmacogenomics: {}", self.pgx_statement()));
        if let Some(warfarin) = &self.warfarin {
            lines.push(format!(
                "Warfarin: {} ({})",
                &warfarin.recommendation, &warfarin.key
            ));
        }
        if let Some(slco1b1) = &self.slco1b1 {
            match (&slco1b1.drug, &slco1b1.guideline) {
                (Some(drug), Some(guideline)) => lines.push(format!(
                    "SLCO1B1: {} ({}): {}",
                    &slco1b1.phenotype, drug, guideline
                )),
                _ => lines.push(format!("SLCO1B1: {}", &slco1b1.phenotype)),
            }
        }
        lines.join("\n")
    }
}

/// Everything needed to build a profile.
#[derive(Debug, Clone)]
pub struct ProfileRequest {
    /// Primary variant file, used for all genes without a dedicated file.
    pub path_primary: PathBuf,
    /// Dedicated variant files per gene.
    pub gene_paths: IndexMap<Gene, PathBuf>,
    /// Sample to profile, the first sample of the primary file by default.
    pub sample: Option<String>,
    pub metadata: PatientMetadata,
    /// Drug for the SLCO1B1 guideline lookup.
    pub drug: Option<String>,
    pub conf: PgxConf,
}

impl ProfileRequest {
    pub fn new<P: Into<PathBuf>>(path_primary: P) -> Self {
        Self {
            path_primary: path_primary.into(),
            gene_paths: IndexMap::new(),
            sample: None,
            metadata: PatientMetadata::default(),
            drug: None,
            conf: PgxConf::default(),
        }
    }

    /// The variant file to read for `gene`.
    fn path_for(&self, gene: Gene) -> &Path {
        self.gene_paths
            .get(&gene)
            .map(|p| p.as_path())
            .unwrap_or(self.path_primary.as_path())
    }

    /// Extract the region of `gene`.
    ///
    /// Returns `Ok(None)` if a dedicated per-gene file is missing and fails only if the
    /// primary file is missing.
    fn extract(&self, gene: Gene) -> Result<Option<ExtractedRegion>, PgxError> {
        let path = self.path_for(gene);
        match extract_region(path, gene, self.conf.sample_limit) {
            Ok(region) => Ok(Some(region)),
            Err(e) if e.is_not_found() && path != self.path_primary.as_path() => {
                warn!("{}: variant file {:?} not found, assuming extensive", gene, path);
                Ok(None)
            }
            Err(e) if e.is_not_found() => Err(e),
            Err(e) => {
                warn!("{}: could not extract variants: {}", gene, e);
                Ok(None)
            }
        }
    }
}

/// Classify one gene from its extracted region.
///
/// The SLCO1B1 result is returned as well as it carries the drug guidance.
pub fn classify_gene(
    gene: Gene,
    region: &ExtractedRegion,
    sample: &str,
    data: &ReferenceData,
    drug: Option<&str>,
) -> Result<(GeneResult, Option<Slco1b1Result>), PgxError> {
    let input = VariantInput::from_region(region, sample);

    let slco1b1 = if gene == Gene::Slco1b1 {
        interpret_slco1b1(&input, drug, data)?
    } else {
        None
    };

    if region.carried_by(sample).next().is_none() {
        tracing::debug!("{}: no variants for {}, assuming extensive", gene, sample);
        return Ok((GeneResult::default_for(gene), slco1b1));
    }

    if let Some(result) = &slco1b1 {
        let gene_result = GeneResult {
            gene,
            status: result.status,
            source: ClassificationSource::Curated,
            diplotype: result.genotype.clone(),
            phenotype: Some(result.phenotype.clone()),
            activity_score: None,
        };
        return Ok((gene_result, slco1b1));
    }

    let gene_result = match interpret_star_gene(gene, &input, data)? {
        Some(result) => GeneResult {
            gene,
            status: result.status,
            source: ClassificationSource::Curated,
            diplotype: Some(result.diplotype),
            phenotype: Some(result.phenotype),
            activity_score: None,
        },
        None => {
            let result = classify_region(gene, region, sample);
            GeneResult {
                gene,
                status: result.status,
                source: ClassificationSource::ActivityScore,
                diplotype: None,
                phenotype: None,
                activity_score: Some(result.score),
            }
        }
    };
    Ok((gene_result, slco1b1))
}

/// Build the profile described by `request`.
///
/// Only a missing primary variant file is an error; problems with single genes are
/// logged and the gene is reported as extensive metabolizer.
pub fn build_profile(request: &ProfileRequest) -> Result<PatientGeneticProfile, PgxError> {
    if !request.path_primary.exists() {
        return Err(PgxError::NotFound(request.path_primary.clone()));
    }
    let sample = match &request.sample {
        Some(sample) => sample.clone(),
        None => read_samples(&request.path_primary, Some(1))?
            .into_iter()
            .next()
            .ok_or_else(|| PgxError::Processing("no samples in variant file".to_owned()))?,
    };
    info!("building profile for sample {}", &sample);
    let data = request.conf.reference_data();
    tracing::debug!("reference data from {}", data.dir().display());

    let mut regions: IndexMap<Gene, ExtractedRegion> = IndexMap::new();
    let mut metabolizer_status = IndexMap::new();
    let mut genes = Vec::new();
    let mut slco1b1 = None;
    for gene in request
        .conf
        .genes
        .iter()
        .copied()
        .unique()
        .filter(|gene| *gene != Gene::Vkorc1)
    {
        let gene_result = match request.extract(gene)? {
            None => GeneResult::default_for(gene),
            Some(region) => {
                let result =
                    match classify_gene(gene, &region, &sample, &data, request.drug.as_deref()) {
                        Ok((gene_result, slco1b1_result)) => {
                            slco1b1 = slco1b1.or(slco1b1_result);
                            gene_result
                        }
                        Err(e) => {
                            warn!("{}: classification failed, assuming extensive: {}", gene, e);
                            GeneResult::default_for(gene)
                        }
                    };
                regions.insert(gene, region);
                result
            }
        };
        info!("{}: {} ({})", gene, gene_result.status, gene_result.source);
        metabolizer_status.insert(gene, gene_result.status);
        genes.push(gene_result);
    }

    let warfarin = if request.conf.genes.contains(&Gene::Cyp2c9)
        && request.conf.genes.contains(&Gene::Vkorc1)
    {
        warfarin_for(request, &mut regions, &sample, &data)?
    } else {
        None
    };
    trace_rss_now();

    let file_name = request
        .path_primary
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    Ok(PatientGeneticProfile {
        sample_id: request.metadata.sample_id.clone().unwrap_or(sample),
        age: request.metadata.age,
        conditions: request.metadata.conditions.clone(),
        lifestyle: request.metadata.lifestyle.clone(),
        metabolizer_status,
        genes,
        warfarin,
        slco1b1,
        provenance: format!("vcf:{}", file_name),
        worker_version: worker_version().to_owned(),
    })
}

/// Run the warfarin composite on the CYP2C9 and VKORC1 regions.
fn warfarin_for(
    request: &ProfileRequest,
    regions: &mut IndexMap<Gene, ExtractedRegion>,
    sample: &str,
    data: &ReferenceData,
) -> Result<Option<WarfarinResult>, PgxError> {
    for gene in [Gene::Cyp2c9, Gene::Vkorc1] {
        if !regions.contains_key(&gene) {
            match request.extract(gene)? {
                Some(region) => {
                    regions.insert(gene, region);
                }
                None => return Ok(None),
            }
        }
    }
    let (Some(cyp2c9), Some(vkorc1)) = (regions.get(&Gene::Cyp2c9), regions.get(&Gene::Vkorc1))
    else {
        return Ok(None);
    };
    let input = VariantInput::from_regions(&[cyp2c9, vkorc1], sample);
    match interpret_warfarin(&input, data) {
        Ok(result) => Ok(result),
        Err(e) => {
            warn!("warfarin interpretation failed: {}", e);
            Ok(None)
        }
    }
}

/// Parse a `GENE=PATH` command line value.
pub fn parse_gene_path(value: &str) -> Result<(Gene, PathBuf), PgxError> {
    let (gene, path) = value
        .split_once('=')
        .ok_or_else(|| PgxError::Processing(format!("expected GENE=PATH, got {:?}", value)))?;
    Ok((Gene::from_symbol(gene)?, PathBuf::from(path.trim())))
}

/// Command line arguments for `pgx profile` sub command.
#[derive(Parser, Debug)]
#[command(author, version, about = "Build the pharmacogenomic profile of a patient", long_about = None)]
pub struct Args {
    /// Path to the primary variant file.
    #[arg(long, required = true)]
    pub path_input: String,
    /// Dedicated variant file for one gene as `GENE=PATH`, may be given multiple times.
    #[arg(long, value_parser = parse_gene_path)]
    pub path_gene: Vec<(Gene, PathBuf)>,
    /// Sample to profile, defaults to the first sample.
    #[arg(long)]
    pub sample: Option<String>,
    /// Path to a JSON file with patient metadata.
    #[arg(long)]
    pub path_patient: Option<String>,
    /// Drug for the SLCO1B1 guideline lookup, e.g., `simvastatin`.
    #[arg(long)]
    pub drug: Option<String>,
    /// Path to the output JSON file, stdout if omitted.
    #[arg(long)]
    pub path_output: Option<String>,

    #[command(flatten)]
    pub conf: ConfArgs,
}

/// Main entry point for `pgx profile` sub command.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = Instant::now();
    info!("args_common = {:?}", &args_common);
    info!("args = {:?}", &args);

    let metadata = match &args.path_patient {
        Some(path) => PatientMetadata::load(path)?,
        None => PatientMetadata::default(),
    };
    let request = ProfileRequest {
        path_primary: PathBuf::from(&args.path_input),
        gene_paths: args.path_gene.iter().cloned().collect(),
        sample: args.sample.clone(),
        metadata,
        drug: args.drug.clone(),
        conf: args.conf.resolve()?,
    };

    let profile = build_profile(&request)?;
    info!("profile:\n{}", profile.flattened_text());

    let json = serde_json::to_string_pretty(&profile)?;
    match &args.path_output {
        Some(path) => std::fs::write(path, json + "\n")?,
        None => println!("{}", json),
    }

    info!(
        "All of `pgx profile` completed in {:?}",
        before_anything.elapsed()
    );
    Ok(())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    const PANEL: &str = "tests/pgx/panel.vcf";

    fn request(sample: &str) -> ProfileRequest {
        ProfileRequest {
            sample: Some(sample.to_owned()),
            ..ProfileRequest::new(PANEL)
        }
    }

    fn statuses(profile: &PatientGeneticProfile) -> Vec<(Gene, MetabolizerStatus)> {
        profile
            .metabolizer_status
            .iter()
            .map(|(gene, status)| (*gene, *status))
            .collect()
    }

    #[test]
    fn profile_s1() -> Result<(), anyhow::Error> {
        let profile = build_profile(&ProfileRequest {
            drug: Some("simvastatin".to_owned()),
            ..request("S1")
        })?;

        assert_eq!(
            statuses(&profile),
            vec![
                (Gene::Cyp2d6, MetabolizerStatus::Intermediate),
                (Gene::Cyp2c19, MetabolizerStatus::Intermediate),
                (Gene::Cyp2c9, MetabolizerStatus::Intermediate),
                (Gene::Cyp3a5, MetabolizerStatus::Poor),
                (Gene::Tpmt, MetabolizerStatus::Extensive),
                (Gene::Slco1b1, MetabolizerStatus::Poor),
            ]
        );
        assert_eq!(
            profile
                .genes
                .iter()
                .map(|g| g.source)
                .collect::<Vec<_>>(),
            vec![
                ClassificationSource::ActivityScore,
                ClassificationSource::Curated,
                ClassificationSource::Curated,
                ClassificationSource::ActivityScore,
                ClassificationSource::Default,
                ClassificationSource::Curated,
            ]
        );
        assert_eq!(profile.genes[1].diplotype.as_deref(), Some("*1/*2"));
        assert_eq!(profile.provenance, "vcf:panel.vcf");

        let warfarin = profile.warfarin.as_ref().expect("warfarin tables");
        assert_eq!(warfarin.key, "CYP2C9 *1/*2 + VKORC1 GA");
        let slco1b1 = profile.slco1b1.as_ref().expect("slco1b1 tables");
        assert_eq!(slco1b1.genotype.as_deref(), Some("CC"));
        assert_eq!(
            slco1b1.guideline.as_deref(),
            Some("Prescribe an alternative statin depending on the desired potency.")
        );

        Ok(())
    }

    #[test]
    fn profile_s2_deletion_and_star17() -> Result<(), anyhow::Error> {
        let profile = build_profile(&request("S2"))?;

        assert_eq!(
            statuses(&profile),
            vec![
                (Gene::Cyp2d6, MetabolizerStatus::Poor),
                (Gene::Cyp2c19, MetabolizerStatus::UltraRapid),
                (Gene::Cyp2c9, MetabolizerStatus::Extensive),
                (Gene::Cyp3a5, MetabolizerStatus::Intermediate),
                (Gene::Tpmt, MetabolizerStatus::Intermediate),
                (Gene::Slco1b1, MetabolizerStatus::Intermediate),
            ]
        );
        assert_eq!(
            profile.warfarin.as_ref().map(|w| w.key.as_str()),
            Some("CYP2C9 *1/*1 + VKORC1 AA")
        );

        Ok(())
    }

    /// Primary file with multi-allelic, haploid and malformed genotype calls.
    const MULTIALLELIC: &str = "tests/pgx/multiallelic.vcf";

    #[rstest::rstest]
    #[case(
        "M1",
        vec![
            (MetabolizerStatus::Poor, ClassificationSource::ActivityScore),
            (MetabolizerStatus::Intermediate, ClassificationSource::Curated),
            (MetabolizerStatus::Extensive, ClassificationSource::Default),
        ],
        Some("*1/*2"),
    )]
    #[case(
        "M2",
        vec![
            (MetabolizerStatus::Extensive, ClassificationSource::Default),
            (MetabolizerStatus::Extensive, ClassificationSource::Curated),
            (MetabolizerStatus::Extensive, ClassificationSource::Default),
        ],
        Some("*1/*1"),
    )]
    #[case(
        "M3",
        vec![
            (MetabolizerStatus::Intermediate, ClassificationSource::ActivityScore),
            (MetabolizerStatus::Extensive, ClassificationSource::Default),
            (MetabolizerStatus::Poor, ClassificationSource::ActivityScore),
        ],
        None,
    )]
    fn profile_non_biallelic_calls(
        #[case] sample: &str,
        #[case] expected: Vec<(MetabolizerStatus, ClassificationSource)>,
        #[case] cyp2c19_diplotype: Option<&str>,
    ) -> Result<(), anyhow::Error> {
        let mut request = ProfileRequest {
            sample: Some(sample.to_owned()),
            ..ProfileRequest::new(MULTIALLELIC)
        };
        request.conf.genes = vec![Gene::Cyp2d6, Gene::Cyp2c19, Gene::Tpmt];

        let profile = build_profile(&request)?;

        assert_eq!(
            profile
                .genes
                .iter()
                .map(|g| (g.status, g.source))
                .collect::<Vec<_>>(),
            expected
        );
        assert_eq!(profile.genes[1].diplotype.as_deref(), cyp2c19_diplotype);

        Ok(())
    }

    #[test]
    fn classify_gene_multi_allelic_is_curated() -> Result<(), anyhow::Error> {
        let samples = vec!["S1".to_owned()];
        let region = ExtractedRegion {
            records: vec![crate::pgx::extract::parse_line(
                "chr10\t94781859\trs4244285\tG\tA,T\t50\tPASS\t.\tGT\t1/2",
                &samples,
            )
            .expect("valid line")],
            samples,
        };

        let (result, slco1b1) =
            classify_gene(Gene::Cyp2c19, &region, "S1", &ReferenceData::default(), None)?;

        assert_eq!(result.status, MetabolizerStatus::Intermediate);
        assert_eq!(result.source, ClassificationSource::Curated);
        assert_eq!(result.diplotype.as_deref(), Some("*1/*2"));
        assert_eq!(slco1b1, None);

        Ok(())
    }

    #[test]
    #[tracing_test::traced_test]
    fn default_sample_is_first() -> Result<(), anyhow::Error> {
        let profile = build_profile(&ProfileRequest::new(PANEL))?;

        assert_eq!(profile.sample_id, "S1");
        assert!(logs_contain("reference data from data/pgx"));

        Ok(())
    }

    #[test]
    fn zero_variants_is_extensive() -> Result<(), anyhow::Error> {
        let mut request = request("S3");
        request.conf.genes = vec![Gene::Cyp2c19, Gene::Cyp2c9, Gene::Tpmt, Gene::Slco1b1];

        let profile = build_profile(&request)?;

        assert!(profile
            .genes
            .iter()
            .all(|g| g.status == MetabolizerStatus::Extensive
                && g.source == ClassificationSource::Default));
        assert_eq!(profile.pgx_statement(), ALL_EXTENSIVE);
        assert_eq!(profile.warfarin, None);

        Ok(())
    }

    #[test]
    fn duplication_is_ultra_rapid() -> Result<(), anyhow::Error> {
        let mut request = request("S3");
        request.conf.genes = vec![Gene::Cyp2d6];

        let profile = build_profile(&request)?;

        assert_eq!(
            statuses(&profile),
            vec![(Gene::Cyp2d6, MetabolizerStatus::UltraRapid)]
        );
        assert_eq!(profile.pgx_statement(), "CYP2D6: ultra-rapid metabolizer");

        Ok(())
    }

    #[test]
    fn missing_gene_file_is_extensive() -> Result<(), anyhow::Error> {
        let mut request = request("S1");
        request
            .gene_paths
            .insert(Gene::Cyp2c19, PathBuf::from("tests/pgx/missing.vcf"));

        let profile = build_profile(&request)?;

        assert_eq!(
            profile.metabolizer_status[&Gene::Cyp2c19],
            MetabolizerStatus::Extensive
        );
        assert_eq!(
            profile.metabolizer_status[&Gene::Cyp2c9],
            MetabolizerStatus::Intermediate
        );

        Ok(())
    }

    #[test]
    fn missing_primary_file_fails() {
        let res = build_profile(&ProfileRequest::new("tests/pgx/missing.vcf"));
        assert!(matches!(res, Err(PgxError::NotFound(_))));
    }

    #[test]
    fn missing_reference_data_falls_back() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let mut request = request("S2");
        request.conf.data_dir = tmp_dir.to_path_buf();

        let profile = build_profile(&request)?;

        // *17/*17 scores 2.0 in the fallback, which is not above the ultra-rapid threshold.
        assert_eq!(
            profile.metabolizer_status[&Gene::Cyp2c19],
            MetabolizerStatus::Extensive
        );
        assert_eq!(profile.genes[1].source, ClassificationSource::ActivityScore);
        assert_eq!(profile.genes[1].activity_score, Some(2.0));
        assert_eq!(profile.warfarin, None);
        assert_eq!(profile.slco1b1, None);

        Ok(())
    }

    #[test]
    fn flattened_text() -> Result<(), anyhow::Error> {
        let profile = build_profile(&ProfileRequest {
            metadata: PatientMetadata::load("tests/pgx/patient.json")?,
            drug: Some("simvastatin".to_owned()),
            ..request("S1")
        })?;

        insta::assert_snapshot!(profile.flattened_text(), @r###"
        Patient: patient-001
        Age: 67
        Conditions: atrial fibrillation, hypercholesterolemia
        Lifestyle: smoking: former, alcohol: moderate
        Pharmacogenomics: CYP2D6: intermediate metabolizer; CYP2C19: intermediate metabolizer; CYP2C9: intermediate metabolizer; CYP3A5: poor metabolizer; SLCO1B1: poor metabolizer
        Warfarin: Expected maintenance dose 3-4 mg/day (CYP2C9 *1/*2 + VKORC1 GA)
        SLCO1B1: Poor Function (simvastatin): Prescribe an alternative statin depending on the desired potency.
        "###);

        Ok(())
    }

    #[test]
    fn profile_json_keys() -> Result<(), anyhow::Error> {
        let profile = build_profile(&request("S2"))?;

        let value = serde_json::to_value(&profile)?;
        assert_eq!(value["metabolizer_status"]["CYP2D6"], "poor_metabolizer");
        assert_eq!(value["genes"][0]["source"], "activity_score");
        assert_eq!(value["worker_version"], "x.y.z");

        Ok(())
    }

    #[rstest::rstest]
    #[case("CYP2C19=a.vcf", Some((Gene::Cyp2c19, "a.vcf")))]
    #[case("vkorc1=/data/b.vcf.gz", Some((Gene::Vkorc1, "/data/b.vcf.gz")))]
    #[case("BRCA1=c.vcf", None)]
    #[case("CYP2C19", None)]
    fn gene_path(#[case] value: &str, #[case] expected: Option<(Gene, &str)>) {
        assert_eq!(
            parse_gene_path(value).ok(),
            expected.map(|(gene, path)| (gene, PathBuf::from(path)))
        );
    }
}
