//! Configuration of the ``pgx`` sub commands.

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::pgx::{
    loci::Gene,
    tables::{ReferenceData, DEFAULT_DATA_DIR, DEFAULT_METADATA_PREFIX},
};

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_genes() -> Vec<Gene> {
    Gene::all()
}

fn default_metadata_prefix() -> String {
    DEFAULT_METADATA_PREFIX.to_owned()
}

/// Configuration as read from the TOML file.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct PgxConf {
    /// Directory with the curated reference tables.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Maximal number of samples read from variant files.
    #[serde(default)]
    pub sample_limit: Option<usize>,
    /// Genes to process, must be a subset of the supported loci.
    #[serde(default = "default_genes")]
    pub genes: Vec<Gene>,
    /// Prefix of metadata keys in the JSON tables.
    #[serde(default = "default_metadata_prefix")]
    pub metadata_prefix: String,
}

impl Default for PgxConf {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            sample_limit: None,
            genes: default_genes(),
            metadata_prefix: default_metadata_prefix(),
        }
    }
}

impl PgxConf {
    /// Load the configuration from the TOML file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let toml_str = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            anyhow::anyhow!("could not read configuration {:?}: {}", path.as_ref(), e)
        })?;
        let conf: PgxConf = toml::from_str(&toml_str)?;
        Ok(conf)
    }

    /// Access to the reference tables as configured.
    pub fn reference_data(&self) -> ReferenceData {
        ReferenceData::new(self.data_dir.clone()).with_metadata_prefix(&self.metadata_prefix)
    }
}

/// Command line arguments shared by the sub commands that read reference tables.
#[derive(Parser, Debug, Clone, Default)]
pub struct ConfArgs {
    /// Path to the TOML configuration file.
    #[arg(long)]
    pub path_conf: Option<String>,
    /// Directory with the reference tables, overrides the configuration.
    #[arg(long)]
    pub path_data_dir: Option<String>,
    /// Maximal number of samples to read, overrides the configuration.
    #[arg(long)]
    pub max_samples: Option<usize>,
}

impl ConfArgs {
    /// Load the configuration file (if any) and apply the overrides from the command line.
    pub fn resolve(&self) -> Result<PgxConf, anyhow::Error> {
        let mut conf = match &self.path_conf {
            Some(path_conf) => PgxConf::load(path_conf)?,
            None => PgxConf::default(),
        };
        if let Some(path_data_dir) = &self.path_data_dir {
            conf.data_dir = PathBuf::from(path_data_dir);
        }
        if self.max_samples.is_some() {
            conf.sample_limit = self.max_samples;
        }
        tracing::debug!("configuration = {:?}", &conf);
        Ok(conf)
    }
}
