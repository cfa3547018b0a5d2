use std::ffi::OsString;

use clap::{
    builder::{
        styling::{AnsiColor, Effects},
        Styles,
    },
    parser::ValueSource,
    ArgMatches, CommandFactory, FromArgMatches, Parser,
};

use super::{GeneralOptions, InputOptions, PipelineOptions, WorkflowOptions};

// Configures Clap v3-style help menu colors
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// Prepare a working directory and configuration for the nanomerge pipeline.
#[derive(Parser, Debug)]
#[command(styles = STYLES)]
#[clap(name = "nanomerge", version, about, long_about = None)]
pub struct Cli {
    #[clap(flatten)]
    pub workflow: WorkflowOptions,

    #[clap(flatten)]
    pub input: InputOptions,

    #[clap(flatten)]
    pub pipeline: PipelineOptions,

    #[clap(flatten)]
    pub general: GeneralOptions,
}

/// Which staged options were given on the command line rather than left at
/// their defaults.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExplicitArgs {
    pub samplesheet: bool,
    pub summary: bool,
    pub input_directory: bool,
    pub input_pattern: bool,
}
impl ExplicitArgs {
    pub fn all() -> Self {
        Self {
            samplesheet: true,
            summary: true,
            input_directory: true,
            input_pattern: true,
        }
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        let on_command_line =
            |id: &str| matches!(matches.value_source(id), Some(ValueSource::CommandLine));
        Self {
            samplesheet: on_command_line("samplesheet"),
            summary: on_command_line("summary"),
            input_directory: on_command_line("input_directory"),
            input_pattern: on_command_line("input_pattern"),
        }
    }
}

/// Parsed arguments together with what clap knows about where they came from.
#[derive(Debug)]
pub struct Invocation {
    pub cli: Cli,
    pub explicit: ExplicitArgs,
    pub command_line: Vec<OsString>,
}
impl Invocation {
    pub fn parse() -> Self {
        Self::try_parse_from(std::env::args_os()).unwrap_or_else(|err| err.exit())
    }

    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let command_line: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let matches = Cli::command().try_get_matches_from(&command_line)?;
        let cli = Cli::from_arg_matches(&matches)?;
        Ok(Self {
            cli,
            explicit: ExplicitArgs::from_matches(&matches),
            command_line,
        })
    }

    /// Options to stage during this run: everything for a fresh run, only the
    /// explicitly supplied ones when modifying an existing project.
    pub fn selected(&self) -> ExplicitArgs {
        if self.cli.workflow.from_project.is_some() {
            self.explicit
        } else {
            ExplicitArgs::all()
        }
    }
}
