//! Evaluation of predicted against expected phenotypes on a set of curated cases.

use std::{path::Path, str::FromStr, time::Instant};

use clap::Parser;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thousands::Separable;
use tracing::{debug, info, warn};

use crate::{
    err::PgxError,
    pgx::{
        conf::ConfArgs,
        input::VariantInput,
        interpret::{interpret_star_gene, slco1b1::interpret_slco1b1},
        loci::Gene,
        phenotype::{normalize_phenotype, MetabolizerStatus},
        tables::ReferenceData,
    },
};

mod input {
    use indexmap::IndexMap;
    use serde::Deserialize;

    /// A benchmark case as read from the JSON file.
    #[derive(Debug, Deserialize, Clone)]
    pub struct Case {
        pub id: String,
        pub gene: String,
        #[serde(default)]
        pub variants: IndexMap<String, String>,
        pub expected_phenotype: String,
    }
}

pub use input::Case;

/// Load the cases from the JSON array at `path`.
pub fn load_cases<P: AsRef<Path>>(path: P) -> Result<Vec<Case>, PgxError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(PgxError::NotFound(path.to_path_buf()));
    }
    let contents = std::fs::read_to_string(path).map_err(PgxError::processing)?;
    serde_json::from_str(&contents).map_err(PgxError::processing)
}

/// Status of an expected label, either a serialized status or a display phenotype.
pub fn expected_status(label: &str) -> MetabolizerStatus {
    MetabolizerStatus::from_str(label.trim()).unwrap_or_else(|_| normalize_phenotype(label))
}

/// Prediction for one case.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    /// Diplotype or genotype.
    pub call: Option<String>,
    pub phenotype: String,
    pub status: MetabolizerStatus,
}

/// Predict the phenotype of `gene` from observed bases; `None` without curated tables.
pub fn predict(
    gene: Gene,
    variants: &IndexMap<String, String>,
    data: &ReferenceData,
) -> Result<Option<Prediction>, PgxError> {
    let input = VariantInput::Simple(variants.clone());
    match gene {
        Gene::Vkorc1 => Ok(None),
        Gene::Slco1b1 => Ok(interpret_slco1b1(&input, None, data)?.map(|result| Prediction {
            call: result.genotype,
            phenotype: result.phenotype,
            status: result.status,
        })),
        _ => Ok(interpret_star_gene(gene, &input, data)?.map(|result| Prediction {
            call: Some(result.diplotype),
            phenotype: result.phenotype,
            status: result.status,
        })),
    }
}

/// Outcome of one case.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CaseOutcome {
    pub id: String,
    pub gene: Gene,
    pub expected: MetabolizerStatus,
    /// `None` if the case was skipped.
    pub prediction: Option<Prediction>,
    pub matched: bool,
}

/// Counts for one gene or overall.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct Tally {
    /// Number of evaluated cases.
    pub total: usize,
    pub matches: usize,
    /// Cases without curated tables.
    pub skipped: usize,
    pub match_rate: f64,
}

impl Tally {
    fn add(&mut self, outcome: &CaseOutcome) {
        if outcome.prediction.is_none() {
            self.skipped += 1;
        } else {
            self.total += 1;
            if outcome.matched {
                self.matches += 1;
            }
        }
        self.match_rate = if self.total == 0 {
            0.0
        } else {
            self.matches as f64 / self.total as f64
        };
    }
}

/// The benchmark report.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct BenchmarkReport {
    pub overall: Tally,
    pub per_gene: IndexMap<Gene, Tally>,
    pub cases: Vec<CaseOutcome>,
}

/// Evaluate all `cases` against the tables in `data`.
pub fn run_benchmark(cases: &[Case], data: &ReferenceData) -> Result<BenchmarkReport, PgxError> {
    let mut report = BenchmarkReport::default();
    for case in cases {
        let gene = Gene::from_symbol(&case.gene)?;
        let expected = expected_status(&case.expected_phenotype);
        let prediction = predict(gene, &case.variants, data)?;
        let matched = prediction
            .as_ref()
            .map(|prediction| prediction.status == expected)
            .unwrap_or(false);
        match &prediction {
            Some(prediction) if !matched => debug!(
                "case {}: predicted {} ({:?}), expected {}",
                &case.id, prediction.status, &prediction.call, expected
            ),
            None => warn!("case {}: no curated tables for {}, skipping", &case.id, gene),
            _ => (),
        }

        let outcome = CaseOutcome {
            id: case.id.clone(),
            gene,
            expected,
            prediction,
            matched,
        };
        report.overall.add(&outcome);
        report.per_gene.entry(gene).or_default().add(&outcome);
        report.cases.push(outcome);
    }
    Ok(report)
}

/// Command line arguments for `pgx benchmark` sub command.
#[derive(Parser, Debug)]
#[command(author, version, about = "Evaluate phenotype predictions on benchmark cases", long_about = None)]
pub struct Args {
    /// Path to the JSON file with the benchmark cases.
    #[arg(long, required = true)]
    pub path_cases: String,
    /// Path to the output JSON report, stdout if omitted.
    #[arg(long)]
    pub path_output: Option<String>,

    #[command(flatten)]
    pub conf: ConfArgs,
}

/// Main entry point for `pgx benchmark` sub command.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = Instant::now();
    info!("args_common = {:?}", &args_common);
    info!("args = {:?}", &args);

    let conf = args.conf.resolve()?;
    let cases = load_cases(&args.path_cases)?;
    info!("loaded {} cases", cases.len().separate_with_commas());

    let report = run_benchmark(&cases, &conf.reference_data())?;
    for (gene, tally) in &report.per_gene {
        info!(
            "{}: {} of {} match ({:.1}%), {} skipped",
            gene,
            tally.matches,
            tally.total,
            100.0 * tally.match_rate,
            tally.skipped
        );
    }
    info!(
        "overall: {} of {} match ({:.1}%), {} skipped",
        report.overall.matches.separate_with_commas(),
        report.overall.total.separate_with_commas(),
        100.0 * report.overall.match_rate,
        report.overall.skipped.separate_with_commas(),
    );

    let json = serde_json::to_string_pretty(&report)?;
    match &args.path_output {
        Some(path) => std::fs::write(path, json + "\n")?,
        None => println!("{}", json),
    }

    info!(
        "All of `pgx benchmark` completed in {:?}",
        before_anything.elapsed()
    );
    Ok(())
}

#[cfg(test)]
mod test {
    use float_cmp::approx_eq;
    use pretty_assertions::assert_eq;

    use super::*;

    #[rstest::rstest]
    #[case("poor_metabolizer", MetabolizerStatus::Poor)]
    #[case("extensive_metabolizer", MetabolizerStatus::Extensive)]
    #[case("Normal Metabolizer", MetabolizerStatus::Extensive)]
    #[case("Rapid Metabolizer", MetabolizerStatus::Extensive)]
    #[case("Ultrarapid Metabolizer", MetabolizerStatus::UltraRapid)]
    #[case("Poor Function", MetabolizerStatus::Poor)]
    #[case("n/a", MetabolizerStatus::Unknown)]
    fn expected_labels(#[case] label: &str, #[case] status: MetabolizerStatus) {
        assert_eq!(expected_status(label), status);
    }

    #[test]
    fn benchmark_cases() -> Result<(), anyhow::Error> {
        let cases = load_cases("tests/pgx/benchmark_cases.json")?;

        let report = run_benchmark(&cases, &ReferenceData::default())?;

        assert_eq!(report.cases.len(), 7);
        assert_eq!(report.overall.total, 6);
        assert_eq!(report.overall.matches, 5);
        assert_eq!(report.overall.skipped, 1);
        assert!(approx_eq!(f64, report.overall.match_rate, 5.0 / 6.0, ulps = 2));

        let cyp2c9 = report.per_gene[&Gene::Cyp2c9];
        assert_eq!((cyp2c9.total, cyp2c9.matches), (2, 1));
        assert!(approx_eq!(f64, cyp2c9.match_rate, 0.5, ulps = 2));
        let cyp2d6 = report.per_gene[&Gene::Cyp2d6];
        assert_eq!((cyp2d6.total, cyp2d6.skipped), (0, 1));
        assert!(approx_eq!(f64, cyp2d6.match_rate, 0.0, ulps = 2));

        assert_eq!(
            report
                .cases
                .iter()
                .filter(|outcome| !outcome.matched)
                .map(|outcome| outcome.id.as_str())
                .collect::<Vec<_>>(),
            vec!["c5", "c7"]
        );

        Ok(())
    }

    #[test]
    fn presence_diplotype_keeps_row_order() -> Result<(), anyhow::Error> {
        let variants: IndexMap<String, String> = [
            ("rs12248560".to_string(), "T".to_string()),
            ("rs4244285".to_string(), "A".to_string()),
        ]
        .into_iter()
        .collect();

        let prediction =
            predict(Gene::Cyp2c19, &variants, &ReferenceData::default())?.expect("tables");

        assert_eq!(prediction.call.as_deref(), Some("*2/*17"));
        assert_eq!(prediction.status, MetabolizerStatus::Intermediate);

        Ok(())
    }

    #[test]
    fn unsupported_gene_is_fatal() {
        let cases = vec![Case {
            id: "x".to_owned(),
            gene: "BRCA1".to_owned(),
            variants: IndexMap::new(),
            expected_phenotype: "Poor Metabolizer".to_owned(),
        }];

        let res = run_benchmark(&cases, &ReferenceData::default());

        assert!(matches!(res, Err(PgxError::UnsupportedGene(_))));
    }

    #[test]
    fn missing_cases_file() {
        assert!(matches!(
            load_cases("tests/pgx/missing.json"),
            Err(PgxError::NotFound(_))
        ));
    }
}
