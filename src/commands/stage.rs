use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use log::{info, warn};

use super::utils::copy_file;
use crate::{config::RunConfig, error::StageError};

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

const SAMPLESHEET_PURPOSE: &str = "Requested to perform the merge of FastQ files";
const SUMMARY_PURPOSE: &str = "Check your input filename";

/// Percentage forced by `--promethion`
pub const PROMETHION_PERCENTAGE: u32 = 10;

/// How much of the sequencing summary file the pipeline should keep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubsamplePolicy {
    /// Size ceiling (GB) above which the summary is sub-sampled
    pub max_gb: f64,

    /// Percentage chosen by the user, used as is
    pub percentage: Option<u32>,

    /// Overrides everything with [`PROMETHION_PERCENTAGE`]
    pub promethion: bool,
}
impl Default for SubsamplePolicy {
    fn default() -> Self {
        Self {
            max_gb: 16.0,
            percentage: None,
            promethion: false,
        }
    }
}

/// Percentage of a summary file of `size` bytes to keep so that the retained
/// part stays under `max_gb`.
///
/// The result is always in [1, 100]. An empty file needs no sub-sampling.
pub fn subsample_percentage(size: u64, max_gb: f64) -> u32 {
    if size == 0 {
        return 100;
    }
    let size_gb = size as f64 / BYTES_PER_GB;
    let percentage = (max_gb / size_gb * 100.0).round();
    percentage.clamp(1.0, 100.0) as u32
}

/// Fails on the first input that a later staging step would not find, before
/// anything is written.
pub fn check_inputs(samplesheet: Option<&Path>, summary: Option<&Path>) -> Result<()> {
    let inputs = samplesheet
        .map(|path| (path, SAMPLESHEET_PURPOSE))
        .into_iter()
        .chain(summary.map(|path| (path, SUMMARY_PURPOSE)));
    for (path, purpose) in inputs {
        if !path.is_file() {
            return Err(StageError::missing(path, purpose).into());
        }
    }
    Ok(())
}

/// Copies user inputs into a working directory and records them in the run
/// configuration.
///
/// Every operation consumes the configuration and hands back the updated one.
pub struct InputStager<'a> {
    workdir: &'a Path,
}
impl<'a> InputStager<'a> {
    pub fn new(workdir: &'a Path) -> Self {
        Self { workdir }
    }

    /// Copies an existing regular file into the working directory and returns
    /// its base name.
    fn copy_in(&self, path: &Path, purpose: &str) -> Result<String> {
        if !path.is_file() {
            return Err(StageError::missing(path, purpose).into());
        }
        let name = path
            .file_name()
            .ok_or_else(|| anyhow!("{} has no file name", path.display()))?;
        copy_file(path, &self.workdir.join(name))?;
        Ok(name.to_string_lossy().into_owned())
    }

    pub fn stage_samplesheet(&self, mut config: RunConfig, path: &Path) -> Result<RunConfig> {
        config.samplesheet = self.copy_in(path, SAMPLESHEET_PURPOSE)?;
        Ok(config)
    }

    pub fn stage_summary(
        &self,
        mut config: RunConfig,
        path: Option<&Path>,
        policy: SubsamplePolicy,
    ) -> Result<RunConfig> {
        let Some(path) = path else {
            config.summary = None;
            return Ok(config);
        };
        config.summary = Some(self.copy_in(path, SUMMARY_PURPOSE)?);

        let percentage = if let Some(percentage) = policy.percentage {
            percentage
        } else {
            let size = fs::metadata(path)
                .with_context(|| format!("Could not read the size of {}", path.display()))?
                .len();
            let percentage = subsample_percentage(size, policy.max_gb);
            if percentage < 100 {
                warn!(
                    "Input file size is {:.2}Gb, which is larger than {}Gb. Will use {}% of the data",
                    size as f64 / BYTES_PER_GB,
                    policy.max_gb,
                    percentage
                );
            }
            percentage
        };
        let percentage = if policy.promethion {
            PROMETHION_PERCENTAGE
        } else {
            percentage
        };
        info!("Keeping {percentage}% of the sequencing summary");
        config.sub_sample_summary.percentage = Some(percentage);
        Ok(config)
    }

    pub fn stage_input_directory(&self, mut config: RunConfig, path: &Path) -> Result<RunConfig> {
        let absolute = std::path::absolute(path)
            .with_context(|| format!("Could not resolve {}", path.display()))?;
        config.input_directory = absolute.to_string_lossy().into_owned();
        Ok(config)
    }

    pub fn stage_input_pattern(&self, mut config: RunConfig, pattern: &str) -> RunConfig {
        config.input_pattern = pattern.to_string();
        config
    }
}
