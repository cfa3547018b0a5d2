use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::{debug, info, warn};

use crate::{
    cli::WorkflowOptions,
    commands::{copy_file, same_file},
    config::{RunConfig, CONFIG_FILENAME},
    error::StageError,
};

pub const PIPELINE_NAME: &str = "nanomerge";

/// File name of the workflow inside a working directory
pub const WORKFLOW_FILENAME: &str = "nanomerge.rules";

const BUILTIN_WORKFLOW: &str = include_str!("workflow/nanomerge.rules");

const WORKFLOW_PURPOSE: &str = "Check the path given to --workflow or NANOMERGE_WORKFLOW";

/// Owns the working directory of a run: creates it, provides the starting
/// configuration and writes the final artifacts.
#[derive(Debug)]
pub struct PipelineManager {
    workdir: PathBuf,
    created: bool,
    workflow: Option<PathBuf>,
    jobs: usize,
    command_line: String,
}
impl PipelineManager {
    /// Prepares the working directory and returns the configuration to stage
    /// inputs into.
    pub fn setup(opts: &WorkflowOptions, command_line: &[OsString]) -> Result<(Self, RunConfig)> {
        if let Some(workflow) = opts.workflow.as_deref() {
            if !workflow.is_file() {
                return Err(StageError::missing(workflow, WORKFLOW_PURPOSE).into());
            }
        }

        let workdir = opts.working_directory.clone();
        let in_place = opts
            .from_project
            .as_deref()
            .is_some_and(|project| same_file(project, &workdir));

        let created = !workdir.exists();
        if !created && !in_place && !opts.force {
            bail!(
                "{} already exists. Use --force to reuse it",
                workdir.display()
            );
        }

        let config = match opts.from_project.as_deref() {
            Some(project) => load_project(project)?,
            None => RunConfig::template()?,
        };

        fs::create_dir_all(&workdir)
            .with_context(|| format!("Could not create {}", workdir.display()))?;
        let manager = Self {
            workdir,
            created,
            workflow: opts.workflow.clone(),
            jobs: opts.jobs(),
            command_line: display_command_line(command_line),
        };
        if let Some(project) = opts.from_project.as_deref().filter(|_| !in_place) {
            if let Err(err) = carry_over(project, &manager.workdir, &config) {
                manager.discard();
                return Err(err);
            }
        }
        info!("Preparing {PIPELINE_NAME} in {}", manager.workdir.display());
        Ok((manager, config))
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Persists the configuration, the workflow and the launch script.
    pub fn teardown(&self, config: &RunConfig) -> Result<()> {
        let config_path = self.workdir.join(CONFIG_FILENAME);
        config.save(&config_path)?;
        debug!("Saved {}", config_path.display());

        self.write_workflow()?;
        write_script(&self.script_path(), &self.launch_script())?;

        info!(
            "Run prepared. To start it: cd {}; ./{}.sh",
            self.workdir.display(),
            PIPELINE_NAME
        );
        Ok(())
    }

    /// Removes the working directory if this run created it.
    pub fn discard(self) {
        if !self.created {
            return;
        }
        match fs::remove_dir_all(&self.workdir) {
            Ok(()) => debug!("Removed {}", self.workdir.display()),
            Err(err) => warn!("Could not remove {}: {err}", self.workdir.display()),
        }
    }

    fn write_workflow(&self) -> Result<()> {
        let destination = self.workdir.join(WORKFLOW_FILENAME);
        match self.workflow.as_deref() {
            Some(workflow) if !workflow.is_file() => {
                Err(StageError::missing(workflow, WORKFLOW_PURPOSE).into())
            }
            Some(workflow) => copy_file(workflow, &destination),
            None => fs::write(&destination, BUILTIN_WORKFLOW)
                .with_context(|| format!("Could not write {}", destination.display())),
        }
    }

    fn script_path(&self) -> PathBuf {
        self.workdir.join(format!("{PIPELINE_NAME}.sh"))
    }

    fn launch_script(&self) -> String {
        format!(
            "#!/bin/bash\n\
             # {command}\n\
             snakemake -s {workflow} --configfile {config} --cores {jobs} \"$@\"\n",
            command = self.command_line,
            workflow = WORKFLOW_FILENAME,
            config = CONFIG_FILENAME,
            jobs = self.jobs,
        )
    }
}

/// Renders arguments the way they would be typed in a shell, on a single line.
fn display_command_line(args: &[OsString]) -> String {
    args.iter()
        .map(|arg| shell_quote(&arg.to_string_lossy()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    let quoted = if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    };
    quoted.replace('\n', "\\n").replace('\r', "\\r")
}

fn load_project(project: &Path) -> Result<RunConfig> {
    let path = project.join(CONFIG_FILENAME);
    if !path.is_file() {
        return Err(StageError::missing(&path, "Is --from-project an existing project?").into());
    }
    info!("Modifying the configuration of {}", project.display());
    RunConfig::load(&path)
}

/// Copies the files staged in `project` that its configuration refers to.
fn carry_over(project: &Path, workdir: &Path, config: &RunConfig) -> Result<()> {
    let staged = std::iter::once(config.samplesheet.as_str())
        .chain(config.summary.as_deref())
        .filter(|name| !name.is_empty());
    for name in staged {
        let source = project.join(name);
        if source.is_file() {
            copy_file(&source, &workdir.join(name))?;
        }
    }
    Ok(())
}

fn write_script(path: &Path, content: &str) -> Result<()> {
    let mut handle =
        fs::File::create(path).with_context(|| format!("Could not create {}", path.display()))?;
    handle.write_all(content.as_bytes())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn options(args: &[&str]) -> WorkflowOptions {
        let mut argv = vec!["nanomerge"];
        argv.extend_from_slice(args);
        WorkflowOptions::parse_from(argv)
    }

    #[test]
    fn test_fresh_setup_and_teardown() {
        let root = tempfile::tempdir().unwrap();
        let workdir = root.path().join("run");
        let opts = options(&["--working-directory", workdir.to_str().unwrap()]);

        let (manager, config) = PipelineManager::setup(&opts, &["nanomerge".into()]).unwrap();
        assert!(workdir.is_dir());
        assert_eq!(config, RunConfig::template().unwrap());

        manager.teardown(&config).unwrap();
        assert_eq!(
            RunConfig::load(&workdir.join(CONFIG_FILENAME)).unwrap(),
            config
        );
        let script = fs::read_to_string(workdir.join("nanomerge.sh")).unwrap();
        assert!(script.starts_with("#!/bin/bash\n# nanomerge\n"));
        assert!(script.contains("--configfile config.yaml --cores"));

        // started as ./nanomerge.sh
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(workdir.join("nanomerge.sh"))
                .unwrap()
                .permissions()
                .mode();
            assert_eq!(mode & 0o111, 0o111);
        }

        // the script runs the workflow written next to it
        assert!(script.contains(&format!("snakemake -s {WORKFLOW_FILENAME} ")));
        assert_eq!(
            fs::read_to_string(workdir.join(WORKFLOW_FILENAME)).unwrap(),
            BUILTIN_WORKFLOW
        );
    }

    #[test]
    fn test_custom_workflow_is_copied() {
        let root = tempfile::tempdir().unwrap();
        let custom = root.path().join("custom.smk");
        fs::write(&custom, "rule all:\n    input: []\n").unwrap();
        let workdir = root.path().join("run");
        let opts = options(&[
            "--working-directory",
            workdir.to_str().unwrap(),
            "--workflow",
            custom.to_str().unwrap(),
        ]);

        let (manager, config) = PipelineManager::setup(&opts, &[]).unwrap();
        manager.teardown(&config).unwrap();
        assert_eq!(
            fs::read_to_string(workdir.join(WORKFLOW_FILENAME)).unwrap(),
            "rule all:\n    input: []\n"
        );
    }

    #[test]
    fn test_missing_workflow_fails_before_creating_workdir() {
        let root = tempfile::tempdir().unwrap();
        let workdir = root.path().join("run");
        let opts = options(&[
            "--working-directory",
            workdir.to_str().unwrap(),
            "--workflow",
            root.path().join("absent.smk").to_str().unwrap(),
        ]);
        let err = PipelineManager::setup(&opts, &[]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StageError>(),
            Some(StageError::MissingFile { .. })
        ));
        assert!(!workdir.exists());
    }

    #[test]
    fn test_discard_only_removes_created_workdir() {
        let root = tempfile::tempdir().unwrap();
        let workdir = root.path().join("run");
        let opts = options(&["--working-directory", workdir.to_str().unwrap()]);
        let (manager, _) = PipelineManager::setup(&opts, &[]).unwrap();
        fs::write(workdir.join("samples.csv"), "").unwrap();
        manager.discard();
        assert!(!workdir.exists());

        let existing = root.path().to_str().unwrap();
        let opts = options(&["--working-directory", existing, "--force"]);
        let (manager, _) = PipelineManager::setup(&opts, &[]).unwrap();
        manager.discard();
        assert!(root.path().is_dir());
    }

    #[test]
    fn test_command_line_comment_is_one_line() {
        let args: Vec<OsString> = ["nanomerge", "--input-pattern", "*.fq\nrm -rf x", "it's"]
            .into_iter()
            .map(OsString::from)
            .collect();
        let line = display_command_line(&args);
        assert_eq!(line, r"nanomerge --input-pattern '*.fq\nrm -rf x' 'it'\''s'");

        let root = tempfile::tempdir().unwrap();
        let workdir = root.path().join("run");
        let opts = options(&["--working-directory", workdir.to_str().unwrap()]);
        let (manager, config) = PipelineManager::setup(&opts, &args).unwrap();
        manager.teardown(&config).unwrap();
        let script = fs::read_to_string(workdir.join("nanomerge.sh")).unwrap();
        assert_eq!(script.lines().count(), 3);
        assert!(script.lines().nth(1).unwrap().starts_with("# nanomerge"));
    }

    #[test]
    fn test_existing_workdir_requires_force() {
        let root = tempfile::tempdir().unwrap();
        let workdir = root.path().to_str().unwrap();

        let opts = options(&["--working-directory", workdir]);
        assert!(PipelineManager::setup(&opts, &[]).is_err());

        let opts = options(&["--working-directory", workdir, "--force"]);
        assert!(PipelineManager::setup(&opts, &[]).is_ok());
    }

    #[test]
    fn test_from_project_in_place() {
        let root = tempfile::tempdir().unwrap();
        let project = root.path().to_str().unwrap();
        let mut config = RunConfig::template().unwrap();
        config.samplesheet = "samples.csv".to_string();
        config.save(&root.path().join(CONFIG_FILENAME)).unwrap();

        let opts = options(&["--working-directory", project, "--from-project", project]);
        let (_, loaded) = PipelineManager::setup(&opts, &[]).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_from_project_into_new_directory() {
        let root = tempfile::tempdir().unwrap();
        let project = root.path().join("old");
        let workdir = root.path().join("new");
        fs::create_dir(&project).unwrap();
        fs::write(project.join("samples.csv"), "project,sample,barcode\n").unwrap();
        let mut config = RunConfig::template().unwrap();
        config.samplesheet = "samples.csv".to_string();
        config.summary = Some("summary.txt".to_string());
        config.save(&project.join(CONFIG_FILENAME)).unwrap();

        let opts = options(&[
            "--working-directory",
            workdir.to_str().unwrap(),
            "--from-project",
            project.to_str().unwrap(),
        ]);
        let (manager, loaded) = PipelineManager::setup(&opts, &[]).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(manager.workdir(), workdir.as_path());
        assert!(workdir.join("samples.csv").is_file());
    }

    #[test]
    fn test_from_project_without_config() {
        let root = tempfile::tempdir().unwrap();
        let project = root.path().to_str().unwrap();
        let opts = options(&["--working-directory", project, "--from-project", project]);
        let err = PipelineManager::setup(&opts, &[]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StageError>(),
            Some(StageError::MissingFile { .. })
        ));
    }
}
