use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// File name of the persisted configuration inside a working directory
pub const CONFIG_FILENAME: &str = "config.yaml";

const TEMPLATE: &str = include_str!("template.yaml");

/// Configuration handed to the workflow engine.
///
/// Only the fields written by nanomerge are typed. Every other key found in a
/// loaded file is kept in `extra` and written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub input_directory: String,

    #[serde(default)]
    pub input_pattern: String,

    #[serde(default)]
    pub samplesheet: String,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub sub_sample_summary: SubSampleSummary,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubSampleSummary {
    /// Percentage of the summary file to keep, in [1, 100]
    #[serde(default)]
    pub percentage: Option<u32>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl RunConfig {
    /// Starting configuration of a fresh run
    pub fn template() -> Result<Self> {
        serde_yaml::from_str(TEMPLATE).context("Invalid built-in configuration template")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let handle =
            File::open(path).with_context(|| format!("Could not open {}", path.display()))?;
        serde_yaml::from_reader(BufReader::new(handle))
            .with_context(|| format!("Could not parse {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let handle =
            File::create(path).with_context(|| format!("Could not create {}", path.display()))?;
        let mut writer = BufWriter::new(handle);
        serde_yaml::to_writer(&mut writer, self)
            .with_context(|| format!("Could not write {}", path.display()))?;
        writer.flush()?;
        Ok(())
    }
}
