//! Pharmacogenomic genotype to phenotype interpretation.
//!
//! Variants of the configured loci are extracted from VCF-like files, star alleles are
//! called against the curated allele definitions and translated into metabolizer
//! status.  Genes without curated tables are classified by the additive activity score.

pub mod activity;
pub mod benchmark;
pub mod call;
pub mod caller;
pub mod conf;
pub mod extract;
pub mod input;
pub mod interpret;
pub mod loci;
pub mod phenotype;
pub mod profile;
pub mod tables;
