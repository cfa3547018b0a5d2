use std::path::PathBuf;

use clap::Parser;

use crate::commands::SubsamplePolicy;

#[derive(Parser, Debug)]
#[clap(next_help_heading = "PIPELINE SPECIFIC")]
pub struct PipelineOptions {
    /// A CSV with 3 columns named project,sample,barcode
    #[clap(long = "sample-sheet", default_value = "SampleSheet.csv")]
    pub samplesheet: PathBuf,

    #[clap(flatten)]
    pub summary: SummaryOptions,
}

#[derive(Parser, Debug)]
pub struct SummaryOptions {
    /// A sequencing summary file generated by albacore or guppy
    #[clap(long)]
    pub summary: Option<PathBuf>,

    /// Percentage of the sequencing summary file to process.
    ///
    /// If unset, the percentage is chosen so that the processed data does not
    /// exceed --summary-max-gb.
    #[clap(long, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub summary_percentage: Option<u32>,

    /// Max size (GB) of the summary file before sub-sampling automatically
    #[clap(long, default_value = "16", value_parser = positive_gb)]
    pub summary_max_gb: f64,

    /// Set the summary percentage to 10%
    #[clap(long)]
    pub promethion: bool,
}
impl SummaryOptions {
    pub fn policy(&self) -> SubsamplePolicy {
        SubsamplePolicy {
            max_gb: self.summary_max_gb,
            percentage: self.summary_percentage,
            promethion: self.promethion,
        }
    }
}

fn positive_gb(value: &str) -> Result<f64, String> {
    let size: f64 = value
        .parse()
        .map_err(|_| format!("{value} is not a number"))?;
    if size.is_finite() && size > 0.0 {
        Ok(size)
    } else {
        Err(format!("{value} must be a positive size in GB"))
    }
}
