use std::path::Path;

use anyhow::Result;
use log::{debug, info, warn};

use super::{
    inputs::discover_inputs,
    samplesheet,
    stage::{check_inputs, InputStager},
};
use crate::{cli::Invocation, config::RunConfig, manager::PipelineManager};

pub fn run(invocation: &Invocation) -> Result<()> {
    let args = &invocation.cli;
    let selected = invocation.selected();

    // nothing is written before every input to stage is known to exist
    check_inputs(
        Some(args.pipeline.samplesheet.as_path()).filter(|_| selected.samplesheet),
        args.pipeline
            .summary
            .summary
            .as_deref()
            .filter(|_| selected.summary),
    )?;

    let (manager, config) = PipelineManager::setup(&args.workflow, &invocation.command_line)?;
    let result = stage(invocation, manager.workdir(), config).and_then(|config| {
        report_samplesheet(&config, manager.workdir());
        report_inputs(&config);
        manager.teardown(&config)
    });
    if result.is_err() {
        manager.discard();
    }
    result
}

fn stage(invocation: &Invocation, workdir: &Path, config: RunConfig) -> Result<RunConfig> {
    let args = &invocation.cli;
    let selected = invocation.selected();
    let stager = InputStager::new(workdir);

    let mut config = config;
    if selected.input_directory {
        config = stager.stage_input_directory(config, &args.input.input_directory)?;
    }
    if selected.input_pattern {
        config = stager.stage_input_pattern(config, &args.input.input_pattern);
    }
    if selected.samplesheet {
        config = stager.stage_samplesheet(config, &args.pipeline.samplesheet)?;
    }
    if selected.summary {
        config = stager.stage_summary(
            config,
            args.pipeline.summary.summary.as_deref(),
            args.pipeline.summary.policy(),
        )?;
    }
    Ok(config)
}

fn report_samplesheet(config: &RunConfig, workdir: &Path) {
    if config.samplesheet.is_empty() {
        return;
    }
    match samplesheet::inspect(&workdir.join(&config.samplesheet)) {
        Ok(report) => {
            info!("Sample sheet lists {} samples", report.num_samples);
            if !report.missing_columns.is_empty() {
                warn!(
                    "Sample sheet {} is missing the column(s): {}",
                    config.samplesheet,
                    report.missing_columns.join(",")
                );
            }
        }
        Err(err) => warn!("Could not read sample sheet {}: {err:#}", config.samplesheet),
    }
}

fn report_inputs(config: &RunConfig) {
    if config.input_directory.is_empty() {
        return;
    }
    match discover_inputs(Path::new(&config.input_directory), &config.input_pattern) {
        Ok(files) if files.is_empty() => warn!(
            "No input files match {} in {}",
            config.input_pattern, config.input_directory
        ),
        Ok(files) => {
            info!("Found {} input files", files.len());
            for file in &files {
                debug!("input: {}", file.display());
            }
        }
        Err(err) => warn!("Could not scan {}: {err:#}", config.input_directory),
    }
}
