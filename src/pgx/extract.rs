//! Streaming extraction of variant records in a gene window.

use std::{path::Path, time::Instant};

use clap::Parser;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thousands::Separable;
use tracing::{debug, info, trace};

use crate::{
    common::{io::open_read_maybe_gz, io::open_write_maybe_gz, non_ref_allele_count, trace_rss_now},
    err::PgxError,
    pgx::loci::Gene,
};

/// Number of fixed columns in a variant line (CHROM to INFO).
const FIXED_COLUMNS: usize = 8;

/// One variant line, restricted to the genotype calls of the selected samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantRecord {
    /// Chromosome name as written in the file.
    pub chrom: String,
    /// 1-based position.
    pub pos: u64,
    /// Identifier, an rsID or `"."`.
    pub id: String,
    /// Reference bases.
    pub reference: String,
    /// Alternate bases, comma-separated if multi-allelic.
    pub alternative: String,
    pub qual: String,
    pub filter: String,
    pub info: String,
    /// Sample name to `GT` string, in header order.
    pub genotypes: IndexMap<String, String>,
}

impl VariantRecord {
    /// The rsID of the record, `None` for `"."`.
    pub fn rsid(&self) -> Option<&str> {
        match self.id.as_str() {
            "." | "" => None,
            id => Some(id),
        }
    }

    /// Raw `GT` string of `sample`.
    pub fn genotype_str(&self, sample: &str) -> Option<&str> {
        self.genotypes.get(sample).map(|s| s.as_str())
    }

    /// Number of non-reference allele copies `sample` carries, counting any ALT index.
    pub fn non_ref_copies(&self, sample: &str) -> usize {
        self.genotype_str(sample).map(non_ref_allele_count).unwrap_or(0)
    }
}

/// Records of one gene window, together with the selected sample names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedRegion {
    pub samples: Vec<String>,
    pub records: Vec<VariantRecord>,
}

impl ExtractedRegion {
    /// Records for which `sample` carries at least one non-reference allele.
    ///
    /// Multi-allelic (`1/2`, `0/2`) and haploid calls count, only hom-ref and missing calls
    /// are skipped.
    pub fn carried_by<'a>(&'a self, sample: &'a str) -> impl Iterator<Item = &'a VariantRecord> {
        self.records
            .iter()
            .filter(move |record| record.non_ref_copies(sample) > 0)
    }
}

/// Counters for one extraction pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractStats {
    pub count_lines: usize,
    pub count_malformed: usize,
    pub count_retained: usize,
}

/// Parse the sample names from the `#CHROM` header line, keeping at most `limit`.
fn parse_header(line: &str, limit: Option<usize>) -> Vec<String> {
    line.split('\t')
        .skip(FIXED_COLUMNS + 1)
        .take(limit.unwrap_or(usize::MAX))
        .map(|s| s.trim().to_owned())
        .collect()
}

/// Parse one data line; `None` if the line is malformed.
pub fn parse_line(line: &str, samples: &[String]) -> Option<VariantRecord> {
    let fields = line.trim_end_matches(['\r', '\n']).split('\t').collect::<Vec<_>>();
    if fields.len() < FIXED_COLUMNS {
        return None;
    }
    let pos = fields[1].trim().parse::<u64>().ok()?;

    let gt_idx = fields
        .get(FIXED_COLUMNS)
        .and_then(|format| format.split(':').position(|key| key == "GT"))
        .unwrap_or(0);
    let genotypes = samples
        .iter()
        .enumerate()
        .map(|(i, sample)| {
            let gt = fields
                .get(FIXED_COLUMNS + 1 + i)
                .and_then(|value| value.split(':').nth(gt_idx))
                .unwrap_or("./.");
            (sample.clone(), gt.to_owned())
        })
        .collect();

    Some(VariantRecord {
        chrom: fields[0].to_owned(),
        pos,
        id: fields[2].to_owned(),
        reference: fields[3].to_owned(),
        alternative: fields[4].to_owned(),
        qual: fields[5].to_owned(),
        filter: fields[6].to_owned(),
        info: fields[7].to_owned(),
        genotypes,
    })
}

/// Stream the variant file at `path` once and keep the records in the window of `gene`.
///
/// Only a missing `path` is reported as `PgxError::NotFound`; malformed lines are skipped
/// and any other read failure becomes `PgxError::Processing`.
pub fn extract_region<P>(
    path: P,
    gene: Gene,
    sample_limit: Option<usize>,
) -> Result<ExtractedRegion, PgxError>
where
    P: AsRef<Path>,
{
    let (region, stats) = extract_region_with_stats(path, gene, sample_limit)?;
    debug!(
        "{}: retained {} of {} lines ({} malformed)",
        gene,
        stats.count_retained.separate_with_commas(),
        stats.count_lines.separate_with_commas(),
        stats.count_malformed.separate_with_commas(),
    );
    Ok(region)
}

/// Like `extract_region` but also return the counters.
pub fn extract_region_with_stats<P>(
    path: P,
    gene: Gene,
    sample_limit: Option<usize>,
) -> Result<(ExtractedRegion, ExtractStats), PgxError>
where
    P: AsRef<Path>,
{
    let locus = gene.locus();
    let reader = open_read_maybe_gz(&path)?;

    let mut region = ExtractedRegion::default();
    let mut stats = ExtractStats::default();
    for line in std::io::BufRead::lines(reader) {
        let line = line.map_err(PgxError::processing)?;
        stats.count_lines += 1;
        if line.starts_with("#CHROM") {
            region.samples = parse_header(&line, sample_limit);
            continue;
        } else if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }

        match parse_line(&line, &region.samples) {
            Some(record) if locus.contains(&record.chrom, record.pos) => {
                trace!("retaining {}:{} {}", &record.chrom, record.pos, &record.id);
                stats.count_retained += 1;
                region.records.push(record);
            }
            Some(_) => (),
            None => stats.count_malformed += 1,
        }
    }

    Ok((region, stats))
}

/// Read the sample names from the header of the variant file at `path`.
///
/// Stops at the `#CHROM` line; a file without one yields no samples.
pub fn read_samples<P>(path: P, sample_limit: Option<usize>) -> Result<Vec<String>, PgxError>
where
    P: AsRef<Path>,
{
    let reader = open_read_maybe_gz(&path)?;
    for line in std::io::BufRead::lines(reader) {
        let line = line.map_err(PgxError::processing)?;
        if line.starts_with("#CHROM") {
            return Ok(parse_header(&line, sample_limit));
        } else if !line.starts_with('#') {
            break;
        }
    }
    Ok(Vec::new())
}

/// Command line arguments for `pgx extract` sub command.
#[derive(Parser, Debug)]
#[command(author, version, about = "Extract the variants of one gene window", long_about = None)]
pub struct Args {
    /// Path to the input variant file (plain or gzip-compressed).
    #[arg(long, required = true)]
    pub path_input: String,
    /// Gene whose window to extract.
    #[arg(long, required = true, value_parser = Gene::from_symbol)]
    pub gene: Gene,
    /// Path to the output TSV file, compressed if ending in `.gz`.
    #[arg(long, required = true)]
    pub path_output: String,
    /// Maximal number of samples to keep.
    #[arg(long)]
    pub max_samples: Option<usize>,
}

/// Write `region` as a TSV file to `path`.
pub fn write_region_tsv<P: AsRef<Path>>(
    region: &ExtractedRegion,
    path: P,
) -> Result<(), anyhow::Error> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(open_write_maybe_gz(path)?);

    let mut header = vec!["chrom", "pos", "id", "ref", "alt", "qual", "filter", "info"];
    header.extend(region.samples.iter().map(|s| s.as_str()));
    writer.write_record(&header)?;

    for record in &region.records {
        let pos = record.pos.to_string();
        let mut row = vec![
            record.chrom.as_str(),
            pos.as_str(),
            record.id.as_str(),
            record.reference.as_str(),
            record.alternative.as_str(),
            record.qual.as_str(),
            record.filter.as_str(),
            record.info.as_str(),
        ];
        row.extend(
            region
                .samples
                .iter()
                .map(|sample| record.genotype_str(sample).unwrap_or("./.")),
        );
        writer.write_record(&row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Main entry point for `pgx extract` sub command.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = Instant::now();
    info!("args_common = {:?}", &args_common);
    info!("args = {:?}", &args);

    let (region, stats) = extract_region_with_stats(&args.path_input, args.gene, args.max_samples)?;
    info!(
        "retained {} records for {} samples ({} lines, {} malformed)",
        stats.count_retained.separate_with_commas(),
        region.samples.len(),
        stats.count_lines.separate_with_commas(),
        stats.count_malformed.separate_with_commas(),
    );
    trace_rss_now();

    write_region_tsv(&region, &args.path_output)?;

    info!(
        "All of `pgx extract` completed in {:?}",
        before_anything.elapsed()
    );
    Ok(())
}
