//! Classification of a single gene for a single sample.

use std::time::Instant;

use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    common::trace_rss_now,
    err::PgxError,
    pgx::{
        conf::{ConfArgs, PgxConf},
        extract::{extract_region, read_samples},
        interpret::slco1b1::Slco1b1Result,
        loci::Gene,
        profile::{classify_gene, GeneResult},
    },
};

/// Result of `pgx call` for one sample and gene.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CallResult {
    pub sample: String,
    #[serde(flatten)]
    pub result: GeneResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slco1b1: Option<Slco1b1Result>,
}

/// Classify `gene` for `sample` (default: first sample) from the variant file at `path`.
pub fn call_gene(
    path: &str,
    gene: Gene,
    sample: Option<&str>,
    drug: Option<&str>,
    conf: &PgxConf,
) -> Result<CallResult, PgxError> {
    if gene == Gene::Vkorc1 {
        return Err(PgxError::UnsupportedGene(format!(
            "{} is only interpreted in the warfarin composite",
            gene
        )));
    }
    let region = extract_region(path, gene, conf.sample_limit)?;
    let sample = match sample {
        Some(sample) => sample.to_owned(),
        None => read_samples(path, Some(1))?
            .into_iter()
            .next()
            .ok_or_else(|| PgxError::Processing("no samples in variant file".to_owned()))?,
    };
    if !region.samples.contains(&sample) {
        tracing::warn!("sample {} not found in {}", &sample, path);
    }

    let (result, slco1b1) =
        classify_gene(gene, &region, &sample, &conf.reference_data(), drug)?;
    Ok(CallResult {
        sample,
        result,
        slco1b1,
    })
}

/// Command line arguments for `pgx call` sub command.
#[derive(Parser, Debug)]
#[command(author, version, about = "Classify one gene for one sample", long_about = None)]
pub struct Args {
    /// Path to the input variant file.
    #[arg(long, required = true)]
    pub path_input: String,
    /// Gene to classify.
    #[arg(long, required = true, value_parser = Gene::from_symbol)]
    pub gene: Gene,
    /// Sample to classify, defaults to the first sample.
    #[arg(long)]
    pub sample: Option<String>,
    /// Drug for the SLCO1B1 guideline lookup.
    #[arg(long)]
    pub drug: Option<String>,

    #[command(flatten)]
    pub conf: ConfArgs,
}

/// Main entry point for `pgx call` sub command.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = Instant::now();
    info!("args_common = {:?}", &args_common);
    info!("args = {:?}", &args);

    let conf = args.conf.resolve()?;
    let result = call_gene(
        &args.path_input,
        args.gene,
        args.sample.as_deref(),
        args.drug.as_deref(),
        &conf,
    )?;
    trace_rss_now();
    println!("{}", serde_json::to_string_pretty(&result)?);

    info!(
        "All of `pgx call` completed in {:?}",
        before_anything.elapsed()
    );
    Ok(())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::pgx::{phenotype::MetabolizerStatus, profile::ClassificationSource};

    #[test]
    fn call_cyp2c19_default_sample() -> Result<(), anyhow::Error> {
        let result = call_gene(
            "tests/pgx/panel.vcf",
            Gene::Cyp2c19,
            None,
            None,
            &PgxConf::default(),
        )?;

        assert_eq!(result.sample, "S1");
        assert_eq!(result.result.diplotype.as_deref(), Some("*1/*2"));
        assert_eq!(result.result.status, MetabolizerStatus::Intermediate);

        let value = serde_json::to_value(&result)?;
        assert_eq!(value["gene"], "CYP2C19");
        assert_eq!(value["status"], "intermediate_metabolizer");
        assert_eq!(value["source"], "curated");

        Ok(())
    }

    #[test]
    fn call_tpmt_fallback() -> Result<(), anyhow::Error> {
        let result = call_gene(
            "tests/pgx/panel.vcf",
            Gene::Tpmt,
            Some("S2"),
            None,
            &PgxConf::default(),
        )?;

        assert_eq!(result.result.source, ClassificationSource::ActivityScore);
        assert_eq!(result.result.status, MetabolizerStatus::Intermediate);

        Ok(())
    }

    #[test]
    fn call_slco1b1_with_drug() -> Result<(), anyhow::Error> {
        let result = call_gene(
            "tests/pgx/panel.vcf",
            Gene::Slco1b1,
            Some("S2"),
            Some("Atorvastatin"),
            &PgxConf::default(),
        )?;

        let slco1b1 = result.slco1b1.expect("slco1b1 tables");
        assert_eq!(slco1b1.genotype.as_deref(), Some("TC"));
        assert_eq!(
            slco1b1.guideline.as_deref(),
            Some("Prescribe <=40 mg as a starting dose and adjust doses based on disease-specific guidelines.")
        );

        Ok(())
    }

    #[test]
    fn call_vkorc1_rejected() {
        let res = call_gene(
            "tests/pgx/panel.vcf",
            Gene::Vkorc1,
            None,
            None,
            &PgxConf::default(),
        );
        assert!(matches!(res, Err(PgxError::UnsupportedGene(_))));
    }

    #[test]
    fn call_missing_file() {
        let res = call_gene(
            "tests/pgx/missing.vcf",
            Gene::Cyp2c19,
            None,
            None,
            &PgxConf::default(),
        );
        assert!(matches!(res, Err(PgxError::NotFound(_))));
    }
}
