use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use anyhow::Result;
use bon::builder;
use serde_yaml::Value;

pub const COMMAND_PATH: &str = env!("CARGO_BIN_EXE_nanomerge");

/// Size of the summary files written by [`write_summary`] (1 MiB)
pub const SUMMARY_SIZE: usize = 1024 * 1024;

/// Ceiling that is exactly half of [`SUMMARY_SIZE`], in GB
pub const HALF_SUMMARY_GB: f64 = 1.0 / 2048.0;

pub fn write_samplesheet(dir: &Path, name: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(
        &path,
        "project,sample,barcode\nP1,s1,barcode01\nP1,s2,barcode02\n",
    )?;
    Ok(path)
}

pub fn write_summary(dir: &Path, name: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    let header = b"filename\tread_id\tchannel\tsequence_length_template\n";
    let mut content = header.to_vec();
    content.resize(SUMMARY_SIZE, b'0');
    fs::write(&path, content)?;
    Ok(path)
}

pub fn write_inputs(dir: &Path) -> Result<PathBuf> {
    let inputs = dir.join("fastq_pass");
    for barcode in ["barcode01", "barcode02"] {
        let sub = inputs.join(barcode);
        fs::create_dir_all(&sub)?;
        fs::write(sub.join(format!("{barcode}_0.fastq.gz")), b"")?;
    }
    Ok(inputs)
}

pub fn load_config(workdir: &Path) -> Result<Value> {
    let content = fs::read_to_string(workdir.join("config.yaml"))?;
    Ok(serde_yaml::from_str(&content)?)
}

pub fn percentage(config: &Value) -> Option<u64> {
    config["sub_sample_summary"]["percentage"].as_u64()
}

#[builder]
pub fn run_nanomerge(
    workdir: &Path,
    input_directory: Option<&Path>,
    input_pattern: Option<&str>,
    samplesheet: Option<&Path>,
    summary: Option<&Path>,
    summary_percentage: Option<u32>,
    summary_max_gb: Option<f64>,
    from_project: Option<&Path>,
    #[builder(default)] promethion: bool,
    #[builder(default)] force: bool,
) -> Result<Output> {
    let mut args = vec![
        "--working-directory".to_string(),
        workdir.display().to_string(),
    ];
    let mut push = |flag: &str, value: String| {
        args.push(flag.to_string());
        args.push(value);
    };
    if let Some(path) = input_directory {
        push("--input-directory", path.display().to_string());
    }
    if let Some(pattern) = input_pattern {
        push("--input-pattern", pattern.to_string());
    }
    if let Some(path) = samplesheet {
        push("--sample-sheet", path.display().to_string());
    }
    if let Some(path) = summary {
        push("--summary", path.display().to_string());
    }
    if let Some(pct) = summary_percentage {
        push("--summary-percentage", pct.to_string());
    }
    if let Some(gb) = summary_max_gb {
        push("--summary-max-gb", gb.to_string());
    }
    if let Some(path) = from_project {
        push("--from-project", path.display().to_string());
    }
    if promethion {
        args.push("--promethion".to_string());
    }
    if force {
        args.push("--force".to_string());
    }
    eprintln!("Args: {args:#?}");
    let output = Command::new(COMMAND_PATH)
        .args(&args)
        .env_remove("NANOMERGE_LOG")
        .env_remove("NANOMERGE_WORKFLOW")
        .output()?;
    eprintln!("{}", String::from_utf8_lossy(&output.stderr));
    Ok(output)
}
