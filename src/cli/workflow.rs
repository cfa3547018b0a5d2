use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

#[derive(Parser, Debug)]
#[clap(next_help_heading = "WORKFLOW OPTIONS")]
pub struct WorkflowOptions {
    /// Where the run is prepared (config and launch script)
    #[clap(long, default_value = "nanomerge")]
    pub working_directory: PathBuf,

    /// Overwrite an existing working directory
    #[clap(long)]
    pub force: bool,

    /// Modify the configuration of an existing project.
    ///
    /// Only the options given on this command line are staged again; every
    /// other value is kept from the project's config.yaml.
    #[clap(long, value_name = "DIR")]
    pub from_project: Option<PathBuf>,

    /// Workflow file to run instead of the built-in one
    #[clap(long, env = "NANOMERGE_WORKFLOW", value_name = "FILE")]
    pub workflow: Option<PathBuf>,

    /// Number of jobs given to the workflow engine (0 for all cores)
    #[clap(short = 'j', long, default_value = "4")]
    jobs: usize,
}
impl WorkflowOptions {
    /// Returns the number of jobs to run the workflow with
    ///
    /// 0 sets to maximum, and all other values are clamped to maximum.
    pub fn jobs(&self) -> usize {
        match self.jobs {
            0 => num_cpus::get(),
            n => n.min(num_cpus::get()),
        }
    }
}

#[derive(Parser, Debug)]
#[clap(next_help_heading = "GENERAL OPTIONS")]
pub struct GeneralOptions {
    /// Logging level (overridden by NANOMERGE_LOG)
    #[clap(long, default_value = "info")]
    pub level: LevelFilter,
}
